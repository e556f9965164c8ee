//! Application configuration from an optional TOML file.
//!
//! Every field has a default, so an empty file (or none at all) is valid.
//!
//! ```toml
//! bank_dir = "data/banks"
//! data_dir = ".aws-exam-prep"
//!
//! [quota]
//! max_attempts = 3
//!
//! [quick]
//! question_count = 20
//! time_limit_secs = 720
//!
//! [full]
//! question_count = 65
//! time_limit_secs = 2400
//!
//! [ad]
//! load_delay_ms = 500
//! view_secs = 5
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::ads::AdConfig;
use crate::models::QuizMode;
use crate::quota::QuotaConfig;

/// Environment variable naming the config file when `--config` is absent.
pub const CONFIG_ENV: &str = "AWS_EXAM_PREP_CONFIG";

/// Why the config file could not be used.
#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: io::Error },
    Parse { path: PathBuf, source: toml::de::Error },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "failed to read config {}: {}", path.display(), source)
            }
            ConfigError::Parse { path, source } => {
                write!(f, "failed to parse config {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ModeConfig {
    pub question_count: usize,
    pub time_limit_secs: u32,
}

impl ModeConfig {
    pub fn for_mode(mode: QuizMode) -> Self {
        Self {
            question_count: mode.default_question_count(),
            time_limit_secs: mode.default_time_limit_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub bank_dir: PathBuf,
    pub data_dir: PathBuf,
    pub quota: QuotaConfig,
    pub quick: ModeConfig,
    pub full: ModeConfig,
    pub ad: AdConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bank_dir: PathBuf::from("data/banks"),
            data_dir: PathBuf::from(".aws-exam-prep"),
            quota: QuotaConfig::default(),
            quick: ModeConfig::for_mode(QuizMode::Quick),
            full: ModeConfig::for_mode(QuizMode::Full),
            ad: AdConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn mode(&self, mode: QuizMode) -> ModeConfig {
        match mode {
            QuizMode::Quick => self.quick,
            QuizMode::Full => self.full,
        }
    }

    pub fn quota_path(&self) -> PathBuf {
        self.data_dir.join("quota.json")
    }

    pub fn results_path(&self) -> PathBuf {
        self.data_dir.join("results.json")
    }

    pub fn from_toml(path: &Path, content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Reads the file given on the command line, else the one named by
/// [`CONFIG_ENV`], else returns defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let path = match explicit {
        Some(p) => Some(p.to_path_buf()),
        None => std::env::var_os(CONFIG_ENV).map(PathBuf::from),
    };

    let Some(path) = path else {
        return Ok(AppConfig::default());
    };

    let content = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    AppConfig::from_toml(&path, &content)
}
