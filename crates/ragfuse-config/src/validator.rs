//! Configuration validation.

use crate::error::ConfigError;
use crate::schema::Config;

/// Vector store backends known to the store factory.
pub const VECTOR_STORE_BACKENDS: &[&str] = &["flat", "sqlite"];

/// Cache backends known to the cache factory.
pub const CACHE_BACKENDS: &[&str] = &["memory", "disk", "remote", "null"];

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Turn collected errors into a single [`ConfigError::Rejected`].
    ///
    /// Warnings are handed back so the caller can log them.
    pub fn into_result(self) -> Result<Vec<ValidationWarning>, ConfigError> {
        if self.errors.is_empty() {
            return Ok(self.warnings);
        }
        let message = self
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.path, e.message))
            .collect::<Vec<_>>()
            .join("; ");
        Err(ConfigError::Rejected(message))
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> ValidationResult {
        let mut result = ValidationResult::default();

        Self::validate_retriever(config, &mut result);
        Self::validate_boosts(config, &mut result);
        Self::validate_dates(config, &mut result);
        Self::validate_vector_store(config, &mut result);
        Self::validate_cache(config, &mut result);

        result
    }

    fn validate_retriever(config: &Config, result: &mut ValidationResult) {
        let retriever = &config.retriever;

        if !(0.0..=1.0).contains(&retriever.default_alpha) {
            result.add_error(ValidationError::new(
                "retriever.default_alpha",
                "default_alpha must be within [0, 1]",
            ));
        }

        if retriever.over_fetch == 0 {
            result.add_error(ValidationError::new(
                "retriever.over_fetch",
                "over_fetch must be at least 1",
            ));
        }

        if retriever.dedup_prefix_chars == 0 {
            result.add_error(ValidationError::new(
                "retriever.dedup_prefix_chars",
                "dedup_prefix_chars must be greater than 0",
            ));
        }

        if retriever.default_k == 0 {
            result.add_warning(ValidationWarning::new(
                "retriever.default_k",
                "default_k is 0, searches without an explicit k return nothing",
            ));
        }
    }

    fn validate_boosts(config: &Config, result: &mut ValidationResult) {
        let boosts = &config.boosts;

        for (name, value) in boosts.increments() {
            if !value.is_finite() || value < 0.0 {
                result.add_error(ValidationError::new(
                    format!("boosts.{name}"),
                    "increment must be a finite, non-negative number",
                ));
            }
        }

        for (alias, canonical) in &boosts.entity_aliases {
            if alias.trim().is_empty() || canonical.trim().is_empty() {
                result.add_error(ValidationError::new(
                    "boosts.entity_aliases",
                    "aliases and canonical names cannot be empty",
                ));
                break;
            }
        }

        for (i, entry) in boosts.file_keywords.iter().enumerate() {
            if entry.keyword.trim().is_empty() || entry.filename.trim().is_empty() {
                result.add_error(ValidationError::new(
                    format!("boosts.file_keywords[{i}]"),
                    "keyword and filename cannot be empty",
                ));
            }
        }

        if boosts.summary_filename.is_empty() {
            result.add_warning(ValidationWarning::new(
                "boosts.summary_filename",
                "summary_filename is empty, the summary boost never applies",
            ));
        }
    }

    fn validate_dates(config: &Config, result: &mut ValidationResult) {
        for (name, month) in &config.dates.month_names {
            if !(1..=12).contains(month) {
                result.add_error(ValidationError::new(
                    format!("dates.month_names.{name}"),
                    "month number must be within 1..=12",
                ));
            }
        }
    }

    fn validate_vector_store(config: &Config, result: &mut ValidationResult) {
        let store = &config.vector_store;

        if !VECTOR_STORE_BACKENDS.contains(&store.backend.as_str()) {
            result.add_error(ValidationError::new(
                "vector_store.backend",
                format!(
                    "Unknown vector store backend '{}', expected one of {:?}",
                    store.backend, VECTOR_STORE_BACKENDS
                ),
            ));
        }

        if store.backend == "sqlite" && store.path.is_none() {
            result.add_warning(ValidationWarning::new(
                "vector_store.path",
                "sqlite backend without a path uses an in-memory database",
            ));
        }

        if store.embedding_dimension == 0 {
            result.add_error(ValidationError::new(
                "vector_store.embedding_dimension",
                "embedding_dimension must be greater than 0",
            ));
        }
    }

    fn validate_cache(config: &Config, result: &mut ValidationResult) {
        let cache = &config.cache;

        if !CACHE_BACKENDS.contains(&cache.backend.as_str()) {
            result.add_error(ValidationError::new(
                "cache.backend",
                format!(
                    "Unknown cache backend '{}', expected one of {:?}",
                    cache.backend, CACHE_BACKENDS
                ),
            ));
        }

        if !cache.enabled || cache.backend != "remote" {
            return;
        }

        match cache.remote.url.as_deref() {
            None => result.add_error(ValidationError::new(
                "cache.remote.url",
                "url is required for the remote backend",
            )),
            Some(url) if !url.starts_with("http://") && !url.starts_with("https://") => {
                result.add_error(ValidationError::new(
                    "cache.remote.url",
                    "url must start with http:// or https://",
                ));
            }
            Some(_) => {}
        }

        if cache.remote.timeout_seconds == 0 {
            result.add_error(ValidationError::new(
                "cache.remote.timeout_seconds",
                "timeout_seconds must be greater than 0",
            ));
        }

        if cache.remote.token.is_none() {
            result.add_warning(ValidationWarning::new(
                "cache.remote.token",
                "remote cache configured without a token",
            ));
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
