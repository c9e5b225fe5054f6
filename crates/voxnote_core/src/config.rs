//! Application configuration.
//!
//! # Responsibility
//! - Provide defaults for every tunable so an absent config file is valid.
//! - Load overrides from an optional JSON file.
//!
//! # Invariants
//! - Unknown keys are rejected so typos do not silently fall back to defaults.

use crate::dictation::capability::RecognitionConfig;
use crate::logging::default_log_level;
use crate::repo::note_repo::NOTES_STORAGE_KEY;
use log::info;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_LOCALE: &str = "pt-BR";
const DEFAULT_PERMISSION_TIMEOUT_MS: u64 = 30_000;

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Key of the key-value slot holding the note snapshot.
    pub storage_key: String,
    /// One of `trace|debug|info|warn|error`.
    pub log_level: String,
    pub dictation: DictationConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage_key: NOTES_STORAGE_KEY.to_string(),
            log_level: default_log_level().to_string(),
            dictation: DictationConfig::default(),
        }
    }
}

/// Dictation tunables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DictationConfig {
    pub locale: String,
    pub continuous: bool,
    pub interim_results: bool,
    pub max_alternatives: u32,
    /// How long a session may wait for a permission answer.
    pub permission_timeout_ms: u64,
}

impl Default for DictationConfig {
    fn default() -> Self {
        Self {
            locale: DEFAULT_LOCALE.to_string(),
            continuous: true,
            interim_results: true,
            max_alternatives: 1,
            permission_timeout_ms: DEFAULT_PERMISSION_TIMEOUT_MS,
        }
    }
}

impl DictationConfig {
    pub fn recognition_config(&self) -> RecognitionConfig {
        RecognitionConfig {
            lang: self.locale.clone(),
            continuous: self.continuous,
            interim_results: self.interim_results,
            max_alternatives: self.max_alternatives.max(1),
        }
    }

    pub fn permission_timeout(&self) -> Duration {
        Duration::from_millis(self.permission_timeout_ms)
    }
}

/// Configuration loading errors.
#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: serde_json::Error },
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "invalid config `{}`: {source}", path.display())
            }
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Invalid(_) => None,
        }
    }
}

impl AppConfig {
    /// Parses a JSON config document.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw).map_err(|source| ConfigError::Parse {
            path: PathBuf::from("<inline>"),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `path` when it exists; returns defaults otherwise.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            info!(
                "event=config_load module=config status=ok source=default path={}",
                path.display()
            );
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        info!(
            "event=config_load module=config status=ok source=file path={}",
            path.display()
        );
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.storage_key.trim().is_empty() {
            return Err(ConfigError::Invalid("storage_key must not be empty".to_string()));
        }
        if self.dictation.locale.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "dictation.locale must not be empty".to_string(),
            ));
        }
        if self.dictation.permission_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "dictation.permission_timeout_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
