use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{HubError, Result};

pub const DEFAULT_ENDPOINT: &str = "http://localhost:4000";
pub const ENDPOINT_ENV: &str = "HUBPROFILE_ENDPOINT";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct GeneralConfig {
    pub endpoint: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
}

fn config_path() -> Option<PathBuf> {
    let config_dir = dirs::config_dir()?;
    Some(config_dir.join("hubprofile").join("config.toml"))
}

impl Config {
    /// Load from the default location. A missing or malformed file yields
    /// the defaults.
    pub fn load() -> Self {
        let Some(path) = config_path() else {
            return Config::default();
        };

        let Ok(content) = std::fs::read_to_string(&path) else {
            return Config::default();
        };

        match toml::from_str::<Config>(&content) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "ignoring malformed config");
                Config::default()
            }
        }
    }

    /// Load from an explicitly requested file, which must exist and parse.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| HubError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Backend URL by precedence: CLI flag, environment, config file, default.
    pub fn endpoint(&self, cli: Option<&str>, env: Option<&str>) -> String {
        [cli, env, self.general.endpoint.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|e| !e.is_empty())
            .unwrap_or(DEFAULT_ENDPOINT)
            .trim_end_matches('/')
            .to_string()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.general.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }
}
