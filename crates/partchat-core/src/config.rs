use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::provider::Provider;

/// Backend used when nothing overrides it.
pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:8000";

/// Environment variable that replaces the default endpoint.
pub const API_BASE_ENV: &str = "PARTCHAT_API_BASE";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// On-disk settings. Read-only: nothing the client does is written back.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub api_base: Option<String>,
    pub provider: Option<String>,
}

impl Config {
    /// Load from the user config directory, or defaults if there is no file.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("partchat").join("config.json"))
    }

    /// Resolve the backend base URL.
    ///
    /// Order: explicit override (CLI flag), `PARTCHAT_API_BASE`, config file,
    /// then [`DEFAULT_API_BASE`]. Blank values are skipped and a trailing
    /// slash is dropped so `{base}/chat` stays well-formed.
    pub fn resolve_api_base(&self, cli_override: Option<&str>) -> String {
        let env_value = std::env::var(API_BASE_ENV).ok();
        self.resolve_api_base_with(cli_override, env_value.as_deref())
    }

    fn resolve_api_base_with(&self, cli_override: Option<&str>, env_value: Option<&str>) -> String {
        [cli_override, env_value, self.api_base.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|v| !v.is_empty())
            .unwrap_or(DEFAULT_API_BASE)
            .trim_end_matches('/')
            .to_string()
    }

    /// Resolve the initial provider: explicit choice, config file, default.
    pub fn resolve_provider(&self, cli_override: Option<Provider>) -> Provider {
        if let Some(provider) = cli_override {
            return provider;
        }

        match self.provider.as_deref().map(str::parse::<Provider>) {
            Some(Ok(provider)) => provider,
            Some(Err(err)) => {
                tracing::warn!(%err, "ignoring provider from config file");
                Provider::default()
            }
            None => Provider::default(),
        }
    }
}
