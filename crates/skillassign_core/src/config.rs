//! TOML configuration for the assignment engine and its binaries.
//!
//! # Responsibility
//! - Hold policy constants (quotas, score thresholds) outside of code.
//! - Hold process settings shared by the server and CLI (db path, logging).
//!
//! # Invariants
//! - Every field has a default; an empty file yields `AppConfig::default()`.
//! - A loaded config has passed `AppConfig::validate()`.

use crate::policy::quota::{QuotaPolicy, QuotaPolicyError};
use crate::policy::scoring::{ScoringPolicy, ScoringPolicyError};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub quota: QuotaPolicy,
    pub scoring: ScoringPolicy,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub bind: String,
    pub db_path: PathBuf,
    /// Allowed browser origins. Empty disables the CORS layer.
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
            db_path: PathBuf::from("skillassign.sqlite3"),
            cors_origins: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub level: String,
    /// Absolute directory for rolling log files. Empty keeps file logging off.
    pub dir: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: crate::logging::default_log_level().to_string(),
            dir: String::new(),
        }
    }
}

impl AppConfig {
    /// Parses and validates config text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(text).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.quota.validate()?;
        self.scoring.validate()?;
        Ok(())
    }
}

/// Loads config from `path`, or defaults when no path is given.
///
/// A given path that cannot be read is an error; silently running with
/// default quotas would hide a deployment mistake.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let Some(path) = path else {
        return Ok(AppConfig::default());
    };
    let text = std::fs::read_to_string(path).map_err(|err| ConfigError::Read {
        path: path.to_path_buf(),
        source: err,
    })?;
    AppConfig::from_toml_str(&text)
}

#[derive(Debug)]
pub enum ConfigError {
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(toml::de::Error),
    Quota(QuotaPolicyError),
    Scoring(ScoringPolicyError),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config: {err}"),
            Self::Quota(err) => write!(f, "{err}"),
            Self::Scoring(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Quota(err) => Some(err),
            Self::Scoring(err) => Some(err),
        }
    }
}

impl From<QuotaPolicyError> for ConfigError {
    fn from(value: QuotaPolicyError) -> Self {
        Self::Quota(value)
    }
}

impl From<ScoringPolicyError> for ConfigError {
    fn from(value: ScoringPolicyError) -> Self {
        Self::Scoring(value)
    }
}

#[cfg(test)]
mod tests {
    use super::{load_config, AppConfig, ConfigError};
    use std::io::Write;

    #[test]
    fn empty_text_yields_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.quota.beginner, 3);
        assert_eq!(config.scoring.advanced_min_score, 80);
    }

    #[test]
    fn partial_tables_keep_remaining_defaults() {
        let config = AppConfig::from_toml_str(
            "[quota]\nadvanced = 2\n\n[server]\nbind = \"0.0.0.0:9000\"\n",
        )
        .unwrap();
        assert_eq!(config.quota.advanced, 2);
        assert_eq!(config.quota.intermediate, 2);
        assert_eq!(config.server.bind, "0.0.0.0:9000");
        assert!(config.server.cors_origins.is_empty());
    }

    #[test]
    fn zero_quota_is_rejected() {
        let err = AppConfig::from_toml_str("[quota]\nbeginner = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Quota(_)));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = AppConfig::from_toml_str("[quota]\nexpert = 5\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_config_reads_file_and_reports_missing_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[scoring]\nintermediate_min_score = 50").unwrap();
        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.scoring.intermediate_min_score, 50);

        let missing = file.path().with_extension("missing");
        let err = load_config(Some(&missing)).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));

        assert_eq!(load_config(None).unwrap(), AppConfig::default());
    }
}
