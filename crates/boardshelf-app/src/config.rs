use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::AppError;

/// Config file looked up in the working directory.
pub const CONFIG_FILE: &str = "boardshelf.toml";

/// Top-level application configuration, loaded from `boardshelf.toml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Mount point of the router, e.g. `/catalog`.
    pub base_path: String,
    /// URL the app opens on.
    pub start_url: String,
    pub log: LogConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_path: "/".to_string(),
            start_url: "/".to_string(),
            log: LogConfig::default(),
        }
    }
}

/// Logging output settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
    /// Filter directive used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            json: false,
            filter: "info".to_string(),
        }
    }
}

/// Where the loaded configuration came from.
///
/// Returned alongside the config so it can be logged once the subscriber
/// (which itself depends on the config) is installed.
#[derive(Debug)]
pub enum ConfigSource {
    File(PathBuf),
    Missing(PathBuf),
    Invalid { path: PathBuf, error: String },
}

impl ConfigSource {
    pub fn log(&self) {
        match self {
            Self::File(path) => {
                tracing::info!(path = %path.display(), "Loaded configuration");
            },
            Self::Missing(path) => {
                tracing::info!(path = %path.display(), "No config file found, using defaults");
            },
            Self::Invalid { path, error } => {
                tracing::warn!(path = %path.display(), "Failed to parse config: {error}, using defaults");
            },
        }
    }
}

impl AppConfig {
    /// Check values that would otherwise fail later in surprising ways.
    pub fn validate(&self) -> Result<(), AppError> {
        if !self.base_path.starts_with('/') {
            return Err(AppError::InvalidConfig(format!(
                "base_path must start with '/', got {:?}",
                self.base_path
            )));
        }
        if !self.start_url.starts_with('/') {
            return Err(AppError::InvalidConfig(format!(
                "start_url must start with '/', got {:?}",
                self.start_url
            )));
        }
        if let Err(e) = tracing_subscriber::EnvFilter::try_new(&self.log.filter) {
            return Err(AppError::InvalidConfig(format!(
                "log.filter {:?} is not a valid directive: {e}",
                self.log.filter
            )));
        }
        Ok(())
    }

    /// Load `boardshelf.toml` from the working directory, then apply
    /// environment variable overrides.
    pub fn load() -> (Self, ConfigSource) {
        let (mut config, source) = Self::load_from(Path::new(CONFIG_FILE));
        config.apply_overrides(|key| std::env::var(key).ok());
        (config, source)
    }

    /// Load from an explicit path. Missing or unparseable files fall back to
    /// defaults.
    pub fn load_from(path: &Path) -> (Self, ConfigSource) {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str::<AppConfig>(&content) {
                Ok(cfg) => (cfg, ConfigSource::File(path.to_path_buf())),
                Err(e) => (
                    AppConfig::default(),
                    ConfigSource::Invalid {
                        path: path.to_path_buf(),
                        error: e.to_string(),
                    },
                ),
            },
            Err(_) => (AppConfig::default(), ConfigSource::Missing(path.to_path_buf())),
        }
    }

    /// Apply `BOARDSHELF_*` overrides read through `var`.
    pub fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(base) = var("BOARDSHELF_BASE_PATH")
            && !base.is_empty()
        {
            self.base_path = base;
        }
        if let Some(url) = var("BOARDSHELF_START_URL")
            && !url.is_empty()
        {
            self.start_url = url;
        }
        if let Some(json) = var("BOARDSHELF_LOG_JSON") {
            self.log.json = matches!(json.as_str(), "1" | "true" | "yes");
        }
    }
}
