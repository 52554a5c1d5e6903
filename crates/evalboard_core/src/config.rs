//! Engine configuration.
//!
//! # Responsibility
//! - Collect the one-time policy decisions (mean rounding, ranking rule,
//!   storage retries) and the process settings (database path, logging).
//! - Load them from `EVALBOARD_*` environment variables.
//!
//! # Invariants
//! - Unset variables fall back to documented defaults; set-but-invalid
//!   values are rejected, never silently replaced.
//! - `storage_retry_attempts` is at least 1.

use crate::logging::default_log_level;
use crate::scoring::{MeanRounding, RankingPolicy};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_DB: &str = "EVALBOARD_DB";
pub const ENV_LOG_LEVEL: &str = "EVALBOARD_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "EVALBOARD_LOG_DIR";
pub const ENV_MEAN_ROUNDING: &str = "EVALBOARD_MEAN_ROUNDING";
pub const ENV_RANKING: &str = "EVALBOARD_RANKING";
pub const ENV_STORAGE_RETRIES: &str = "EVALBOARD_STORAGE_RETRIES";

pub const DEFAULT_DB_PATH: &str = "evalboard.sqlite3";
pub const DEFAULT_STORAGE_RETRIES: u32 = 3;

/// Aggregation and ranking rules shared by every results call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoringPolicy {
    pub mean_rounding: MeanRounding,
    pub ranking: RankingPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    /// Logging stays off when unset.
    pub log_dir: Option<PathBuf>,
    pub policy: ScoringPolicy,
    pub storage_retry_attempts: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            log_level: default_log_level().to_string(),
            log_dir: None,
            policy: ScoringPolicy::default(),
            storage_retry_attempts: DEFAULT_STORAGE_RETRIES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue {
        variable: &'static str,
        value: String,
        expected: &'static str,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue {
                variable,
                value,
                expected,
            } => write!(f, "invalid {variable}=`{value}`; expected {expected}"),
        }
    }
}

impl Error for ConfigError {}

impl EngineConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`; blank values count as unset.
    pub fn from_lookup<F>(mut lookup: F) -> Result<Self, ConfigError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let mut config = Self::default();

        if let Some(path) = read(ENV_DB) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(level) = read(ENV_LOG_LEVEL) {
            config.log_level = level;
        }
        config.log_dir = read(ENV_LOG_DIR).map(PathBuf::from);

        if let Some(value) = read(ENV_MEAN_ROUNDING) {
            config.policy.mean_rounding =
                MeanRounding::parse(&value).ok_or(ConfigError::InvalidValue {
                    variable: ENV_MEAN_ROUNDING,
                    value,
                    expected: "round|truncate",
                })?;
        }
        if let Some(value) = read(ENV_RANKING) {
            config.policy.ranking =
                RankingPolicy::parse(&value).ok_or(ConfigError::InvalidValue {
                    variable: ENV_RANKING,
                    value,
                    expected: "sequential|shared",
                })?;
        }
        if let Some(value) = read(ENV_STORAGE_RETRIES) {
            config.storage_retry_attempts = match value.parse::<u32>() {
                Ok(attempts) if attempts >= 1 => attempts,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        variable: ENV_STORAGE_RETRIES,
                        value,
                        expected: "an integer >= 1",
                    })
                }
            };
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, EngineConfig, ScoringPolicy, ENV_RANKING, ENV_STORAGE_RETRIES};
    use crate::scoring::{MeanRounding, RankingPolicy};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn load(pairs: &[(&str, &str)]) -> Result<EngineConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        EngineConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.policy, ScoringPolicy::default());
        assert_eq!(config.storage_retry_attempts, 3);
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn reads_every_variable() {
        let config = load(&[
            ("EVALBOARD_DB", "/tmp/panel.sqlite3"),
            ("EVALBOARD_LOG_LEVEL", "warn"),
            ("EVALBOARD_LOG_DIR", "/tmp/evalboard-logs"),
            ("EVALBOARD_MEAN_ROUNDING", "Truncate"),
            ("EVALBOARD_RANKING", "shared"),
            ("EVALBOARD_STORAGE_RETRIES", "5"),
        ])
        .unwrap();
        assert_eq!(config.db_path, PathBuf::from("/tmp/panel.sqlite3"));
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir, Some(PathBuf::from("/tmp/evalboard-logs")));
        assert_eq!(config.policy.mean_rounding, MeanRounding::Truncate);
        assert_eq!(config.policy.ranking, RankingPolicy::Shared);
        assert_eq!(config.storage_retry_attempts, 5);
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = load(&[("EVALBOARD_LOG_DIR", "  "), ("EVALBOARD_RANKING", "")]).unwrap();
        assert!(config.log_dir.is_none());
        assert_eq!(config.policy.ranking, RankingPolicy::Sequential);
    }

    #[test]
    fn rejects_invalid_policy_values() {
        let err = load(&[(ENV_RANKING, "olympic")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { variable, .. } if variable == ENV_RANKING
        ));

        for retries in ["0", "-1", "many"] {
            let err = load(&[(ENV_STORAGE_RETRIES, retries)]).unwrap_err();
            assert!(err.to_string().contains(ENV_STORAGE_RETRIES));
        }
    }
}
