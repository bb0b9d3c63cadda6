use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use intake_engine::{BackendSettings, UploadSettings};
use intake_logging::{intake_info, intake_warn};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
    #[error("invalid {field} url {value:?}: {source}")]
    InvalidUrl {
        field: &'static str,
        value: String,
        source: url::ParseError,
    },
    #[error("unknown log level {0:?}")]
    InvalidLogLevel(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub backend: BackendConfig,
    pub upload: UploadConfig,
    pub log_level: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub credential_url: String,
    pub api_base: String,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    pub notify_stage: bool,
    pub step_timeout_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            upload: UploadConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            credential_url: "http://localhost:8080/upload-url".to_string(),
            api_base: "http://localhost:8080".to_string(),
            connect_timeout_ms: 10_000,
            request_timeout_ms: 120_000,
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        let defaults = UploadSettings::default();
        Self {
            notify_stage: defaults.notify_stage,
            step_timeout_ms: defaults.step_timeout.as_millis() as u64,
        }
    }
}

impl AppConfig {
    pub fn backend_settings(&self) -> Result<BackendSettings, ConfigError> {
        let credential_url = parse_url("credential_url", &self.backend.credential_url)?;
        let api_base = parse_url("api_base", &self.backend.api_base)?;
        let mut settings = BackendSettings::new(credential_url, api_base);
        settings.connect_timeout = Duration::from_millis(self.backend.connect_timeout_ms);
        settings.request_timeout = Duration::from_millis(self.backend.request_timeout_ms);
        Ok(settings)
    }

    pub fn upload_settings(&self) -> UploadSettings {
        UploadSettings {
            notify_stage: self.upload.notify_stage,
            step_timeout: Duration::from_millis(self.upload.step_timeout_ms),
        }
    }

    pub fn level(&self) -> Result<LevelFilter, ConfigError> {
        self.log_level
            .parse()
            .map_err(|_| ConfigError::InvalidLogLevel(self.log_level.clone()))
    }
}

fn parse_url(field: &'static str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|source| ConfigError::InvalidUrl {
        field,
        value: value.to_string(),
        source,
    })
}

/// Something `load` observed that belongs in the log. Logging is not yet
/// initialized while the config is read, so these are logged by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigNote {
    Defaults(PathBuf),
    ZeroStepTimeout,
    Loaded(PathBuf),
}

impl ConfigNote {
    pub fn log(&self) {
        match self {
            Self::Defaults(path) => intake_info!("No config at {:?}; using defaults", path),
            Self::ZeroStepTimeout => {
                intake_warn!("step_timeout_ms is 0; every remote step will time out")
            }
            Self::Loaded(path) => intake_info!("Loaded config from {:?}", path),
        }
    }
}

#[derive(Debug)]
pub struct LoadedConfig {
    pub config: AppConfig,
    pub notes: Vec<ConfigNote>,
}

/// Loads the configuration at `path`; a missing file yields the defaults.
pub fn load(path: &Path) -> Result<LoadedConfig, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Ok(LoadedConfig {
                config: AppConfig::default(),
                notes: vec![ConfigNote::Defaults(path.to_path_buf())],
            });
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let config: AppConfig = ron::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    let mut notes = Vec::new();
    if config.upload.step_timeout_ms == 0 {
        notes.push(ConfigNote::ZeroStepTimeout);
    }
    notes.push(ConfigNote::Loaded(path.to_path_buf()));
    Ok(LoadedConfig { config, notes })
}
