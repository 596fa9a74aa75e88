use super::*;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn server_with_ping() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_json(json!(["PING"])))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": "PONG"})))
        .mount(&server)
        .await;
    server
}

async fn connect(server: &MockServer) -> RemoteCache {
    RemoteCache::connect(server.uri(), Some("token".to_string()), Duration::from_secs(2))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_connect_pings_with_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("authorization", "Bearer secret"))
        .and(body_json(json!(["PING"])))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": "PONG"})))
        .expect(1)
        .mount(&server)
        .await;

    let cache = RemoteCache::connect(server.uri(), Some("secret".to_string()), Duration::from_secs(2))
        .await
        .unwrap();
    assert_eq!(cache.id(), "remote");
}

#[tokio::test]
async fn test_connect_unreachable() {
    let result = RemoteCache::connect("http://127.0.0.1:1", None, Duration::from_millis(500)).await;
    assert!(matches!(result, Err(CacheError::BackendUnavailable(_))));
}

#[tokio::test]
async fn test_connect_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "unauthorized"})))
        .mount(&server)
        .await;

    let result = RemoteCache::connect(server.uri(), None, Duration::from_secs(2)).await;
    match result {
        Err(CacheError::BackendUnavailable(msg)) => assert!(msg.contains("unauthorized")),
        _ => panic!("expected BackendUnavailable"),
    }
}

#[tokio::test]
async fn test_set_with_ttl_sends_ex() {
    let server = server_with_ping().await;
    Mock::given(method("POST"))
        .and(body_json(json!(["SET", "k", "{\"a\":1}", "EX", 2])))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": "OK"})))
        .expect(1)
        .mount(&server)
        .await;

    let cache = connect(&server).await;
    cache
        .set("k", json!({"a": 1}), Some(Duration::from_millis(1500)))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_set_without_ttl() {
    let server = server_with_ping().await;
    Mock::given(method("POST"))
        .and(body_json(json!(["SET", "k", "5"])))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": "OK"})))
        .expect(1)
        .mount(&server)
        .await;

    let cache = connect(&server).await;
    cache.set("k", json!(5), Some(Duration::ZERO)).await.unwrap();
}

#[tokio::test]
async fn test_get_hit_and_miss() {
    let server = server_with_ping().await;
    Mock::given(method("POST"))
        .and(body_json(json!(["GET", "hit"])))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": "[1,2]"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_json(json!(["GET", "miss"])))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": null})))
        .mount(&server)
        .await;

    let cache = connect(&server).await;
    assert_eq!(cache.get("hit").await.unwrap(), Some(json!([1, 2])));
    assert_eq!(cache.get("miss").await.unwrap(), None);
}

#[tokio::test]
async fn test_command_error_reply() {
    let server = server_with_ping().await;
    Mock::given(method("POST"))
        .and(body_json(json!(["DEL", "k"])))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"error": "ERR wrong"})))
        .mount(&server)
        .await;

    let cache = connect(&server).await;
    let result = cache.delete("k").await;
    assert!(matches!(result, Err(CacheError::Backend(msg)) if msg == "ERR wrong"));
}

#[tokio::test]
async fn test_exists_and_clear() {
    let server = server_with_ping().await;
    Mock::given(method("POST"))
        .and(body_json(json!(["EXISTS", "k"])))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": 1})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_json(json!(["FLUSHDB"])))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": "OK"})))
        .expect(1)
        .mount(&server)
        .await;

    let cache = connect(&server).await;
    assert!(cache.exists("k").await.unwrap());
    cache.clear().await.unwrap();
}

#[tokio::test]
async fn test_timeout_is_request_error() {
    let server = server_with_ping().await;
    Mock::given(method("POST"))
        .and(body_json(json!(["GET", "slow"])))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"result": null}))
                .set_delay(Duration::from_millis(800)),
        )
        .mount(&server)
        .await;

    let cache = RemoteCache::connect(server.uri(), None, Duration::from_millis(200))
        .await
        .unwrap();
    let result = cache.get("slow").await;
    assert!(matches!(result, Err(CacheError::Request(_))));
}

#[test]
fn test_ttl_seconds_rounds_up() {
    assert_eq!(RemoteCache::ttl_seconds(Duration::from_secs(3)), 3);
    assert_eq!(RemoteCache::ttl_seconds(Duration::from_millis(1)), 1);
    assert_eq!(RemoteCache::ttl_seconds(Duration::from_millis(2500)), 3);
}
