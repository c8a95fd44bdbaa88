//! Core configuration resolved from the process environment.
//!
//! | Variable                 | Meaning                                   |
//! |--------------------------|-------------------------------------------|
//! | `TABULACION_DB_PATH`     | SQLite file; unset means in-memory        |
//! | `TABULACION_LOG_LEVEL`   | `trace|debug|info|warn|error`             |
//! | `TABULACION_LOG_DIR`     | absolute log directory; unset disables logs |

use crate::logging::{LogLevel, LoggingError};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "TABULACION_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "TABULACION_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "TABULACION_LOG_DIR";

/// File logging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub log_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: Option<PathBuf>,
    pub logging: Option<LoggingConfig>,
}

impl CoreConfig {
    /// Reads configuration from environment variables.
    pub fn from_env() -> Result<Self, LoggingError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, LoggingError> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let level = match read(ENV_LOG_LEVEL) {
            Some(value) => value.parse()?,
            None => LogLevel::default_for_build(),
        };
        let logging = read(ENV_LOG_DIR).map(|dir| LoggingConfig {
            level,
            log_dir: PathBuf::from(dir),
        });

        Ok(Self {
            db_path: read(ENV_DB_PATH).map(PathBuf::from),
            logging,
        })
    }
}
