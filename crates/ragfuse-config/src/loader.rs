//! Configuration loader.

use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ConfigError;
use crate::schema::Config;

static ENV_VAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var pattern"));

/// Reads `ragfuse.toml` files, substituting `${VAR}` references and
/// expanding `~` in path fields.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Read and parse a TOML file. A missing file is [`ConfigError::NotFound`].
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        Self::load_str(&fs::read_to_string(path)?)
    }

    /// Parse TOML text.
    pub fn load_str(content: &str) -> Result<Config, ConfigError> {
        let mut config: Config = toml::from_str(&Self::substitute_env(content)?)?;
        Self::expand_paths(&mut config);
        Ok(config)
    }

    /// Replace every `${VAR}` with its value; an unset variable is an error.
    fn substitute_env(content: &str) -> Result<String, ConfigError> {
        let mut substituted = content.to_string();
        for caps in ENV_VAR.captures_iter(content) {
            let name = &caps[1];
            let value =
                std::env::var(name).map_err(|_| ConfigError::EnvVarNotSet(name.to_string()))?;
            substituted = substituted.replace(&caps[0], &value);
        }
        Ok(substituted)
    }

    fn expand_paths(config: &mut Config) {
        if let Some(path) = config.vector_store.path.take() {
            config.vector_store.path = Some(Self::expand_pathbuf(&path));
        }
        config.cache.disk.path = Self::expand_pathbuf(&config.cache.disk.path);
    }

    fn expand_pathbuf(path: &Path) -> PathBuf {
        PathBuf::from(Self::expand_path(&path.to_string_lossy()))
    }

    /// Expand shell-style paths (e.g., `~/.cache/ragfuse`).
    pub fn expand_path(path: &str) -> String {
        shellexpand::tilde(path).to_string()
    }
}
