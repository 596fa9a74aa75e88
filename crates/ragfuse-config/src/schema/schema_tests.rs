use super::*;

#[test]
fn test_config_defaults() {
    let config = Config::default();
    assert_eq!(config.retriever.over_fetch, 4);
    assert_eq!(config.retriever.dedup_prefix_chars, 100);
    assert!((config.retriever.default_alpha - 0.8).abs() < f32::EPSILON);
    assert_eq!(config.vector_store.backend, "flat");
    assert_eq!(config.cache.backend, "memory");
    assert!(config.cache.enabled);
}

#[test]
fn test_empty_toml_uses_defaults() {
    let config: Config = toml::from_str("").unwrap();
    assert_eq!(config.retriever.default_k, 5);
    assert_eq!(config.boosts.summary_filename, "summary.md");
    assert_eq!(config.dates.journal_type, "journal");
    assert_eq!(config.cache.remote.timeout_seconds, 5);
}

#[test]
fn test_boost_defaults() {
    let boosts = BoostConfig::default();
    assert!((boosts.short_document - 0.3).abs() < f32::EPSILON);
    assert!((boosts.summary_match - 3.5).abs() < f32::EPSILON);
    assert!((boosts.combined_entity_file - 2.0).abs() < f32::EPSILON);
    assert!(boosts.entity_aliases.is_empty());
    assert!(boosts.file_keywords.is_empty());
    assert!(boosts.cost_terms.iter().any(|t| t == "€"));
}

#[test]
fn test_boost_increments_listed() {
    let boosts = BoostConfig::default();
    let increments = boosts.increments();
    assert!(increments.iter().all(|(_, v)| *v >= 0.0));
    assert!(increments.iter().any(|(name, _)| *name == "date_exact"));
}

#[test]
fn test_parse_aliases_and_file_keywords() {
    let content = r#"
        [boosts.entity_aliases]
        acme = "Acme"
        "acme corp" = "Acme"

        [[boosts.file_keywords]]
        keyword = "competitor"
        filename = "competitors.md"

        [[boosts.file_keywords]]
        keyword = "account"
        filename = "accounts.md"
    "#;
    let config: Config = toml::from_str(content).unwrap();
    assert_eq!(config.boosts.entity_aliases.get("acme corp").map(String::as_str), Some("Acme"));
    assert_eq!(config.boosts.file_keywords.len(), 2);
    assert_eq!(
        config.boosts.file_keywords[0],
        FileKeyword::new("competitor", "competitors.md")
    );
}

#[test]
fn test_month_names_cover_both_languages() {
    let dates = DateConfig::default();
    assert_eq!(dates.month_names.get("luglio"), Some(&7));
    assert_eq!(dates.month_names.get("july"), Some(&7));
    assert_eq!(dates.month_names.get("dicembre"), Some(&12));
    assert_eq!(dates.month_names.len(), 24);
}

#[test]
fn test_relative_terms() {
    let dates = DateConfig::default();
    assert_eq!(dates.relative_terms.get("ieri"), Some(&-1));
    assert_eq!(dates.relative_terms.get("tomorrow"), Some(&1));
}

#[test]
fn test_disk_path_default_under_cache_dir() {
    let disk = DiskCacheConfig::default();
    assert!(disk.path.ends_with("ragfuse/cache"));
}

#[test]
fn test_cache_config_roundtrip() {
    let mut config = CacheConfig::default();
    config.backend = "remote".to_string();
    config.remote.url = Some("http://localhost:8079".to_string());
    config.ttl_seconds = Some(60);

    let serialized = toml::to_string(&config).unwrap();
    let parsed: CacheConfig = toml::from_str(&serialized).unwrap();
    assert_eq!(parsed.backend, "remote");
    assert_eq!(parsed.remote.url.as_deref(), Some("http://localhost:8079"));
    assert_eq!(parsed.ttl_seconds, Some(60));
}

#[test]
fn test_vector_store_path() {
    let content = r#"
        [vector_store]
        backend = "sqlite"
        path = "/tmp/index.db"
    "#;
    let config: Config = toml::from_str(content).unwrap();
    assert_eq!(config.vector_store.backend, "sqlite");
    assert_eq!(
        config.vector_store.path.as_deref(),
        Some(std::path::Path::new("/tmp/index.db"))
    );
}
