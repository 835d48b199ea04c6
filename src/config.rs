//! Configuration loading from file, environment, and CLI arguments.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::engine::TerminationCriteria;
use crate::types::{AbilityEstimate, CatError, CatResult};

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "CAT_DATA_DIR";

/// Starting ability for learners with no history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriorConfig {
    #[serde(default)]
    pub theta: f64,
    #[serde(default = "default_prior_se")]
    pub standard_error: f64,
}

fn default_prior_se() -> f64 {
    1.0
}

impl Default for PriorConfig {
    fn default() -> Self {
        Self {
            theta: 0.0,
            standard_error: default_prior_se(),
        }
    }
}

impl PriorConfig {
    pub fn estimate(&self) -> AbilityEstimate {
        AbilityEstimate::prior(self.theta, self.standard_error)
    }
}

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Stop conditions for adaptive sessions.
    #[serde(default)]
    pub termination: TerminationCriteria,
    /// Ability prior for new sessions.
    #[serde(default)]
    pub prior: PriorConfig,
    /// Days after which an unpractised concept has fully decayed.
    #[serde(default = "default_decay_window_days")]
    pub decay_window_days: f64,
    /// Decay risk at or above which a concept is reported at risk.
    #[serde(default = "default_at_risk_threshold")]
    pub at_risk_threshold: f64,
    /// Where the JSON store keeps its documents.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    /// Log level.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_decay_window_days() -> f64 {
    14.0
}

fn default_at_risk_threshold() -> f64 {
    0.5
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            termination: TerminationCriteria::default(),
            prior: PriorConfig::default(),
            decay_window_days: default_decay_window_days(),
            at_risk_threshold: default_at_risk_threshold(),
            data_dir: None,
            log_level: default_log_level(),
        }
    }
}

impl EngineConfig {
    /// Parse configuration from TOML text and validate it.
    pub fn from_toml(content: &str) -> CatResult<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| CatError::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine would refuse later.
    pub fn validate(&self) -> CatResult<()> {
        self.termination.validate()?;
        if !self.decay_window_days.is_finite() || self.decay_window_days <= 0.0 {
            return Err(CatError::InvalidDecayWindow(self.decay_window_days));
        }
        if !(0.0..=1.0).contains(&self.at_risk_threshold) {
            return Err(CatError::Config(format!(
                "at_risk_threshold must be within [0, 1], got {}",
                self.at_risk_threshold
            )));
        }
        if !self.prior.theta.is_finite() || !self.prior.standard_error.is_finite() {
            return Err(CatError::Config("prior must be finite".to_string()));
        }
        Ok(())
    }

    /// Data directory: explicit argument, then config file, then environment, then home.
    pub fn data_dir(&self, explicit: Option<&Path>) -> PathBuf {
        match explicit {
            Some(path) => path.to_path_buf(),
            None => resolve_data_dir(self.data_dir.as_deref()),
        }
    }
}

/// Load configuration from a TOML file.
pub fn load_config(path: &Path) -> CatResult<EngineConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        CatError::Io(std::io::Error::other(format!(
            "Failed to read config file {}: {e}",
            path.display()
        )))
    })?;
    EngineConfig::from_toml(&content)
}

/// Load from `path` when given, otherwise use defaults.
pub fn load_or_default(path: Option<&Path>) -> CatResult<EngineConfig> {
    match path {
        Some(path) => load_config(path),
        None => Ok(EngineConfig::default()),
    }
}

/// Resolve the data directory using priority order:
/// 1. Explicit path (CLI arg)
/// 2. CAT_DATA_DIR environment variable
/// 3. $HOME/.local/share/CatAdaptive/data
pub fn resolve_data_dir(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }

    if let Ok(env_path) = std::env::var(DATA_DIR_ENV) {
        if !env_path.trim().is_empty() {
            return PathBuf::from(env_path);
        }
    }

    default_data_dir()
}

fn default_data_dir() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());

    PathBuf::from(home).join(".local/share/CatAdaptive/data")
}
