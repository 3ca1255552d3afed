use std::path::PathBuf;

use crate::env::{
    env_opt, env_or, PARTITION_LOG_APP_GROUP_ENV, PARTITION_LOG_APP_NAME_ENV,
    PARTITION_LOG_FORMAT_ENV, PARTITION_LOG_LEVEL_ENV, PARTITION_LOG_ROOT_ENV,
    PARTITION_LOG_ROUTE_ENV, PARTITION_LOG_TYPE_EXTRA_ENV,
};
use crate::level::{ParseSeverityError, Severity};
use crate::record::{ParseFormatError, RecordFormat, RoutingMetadata};

pub const DEFAULT_ROOT: &str = "logs";
pub const DEFAULT_APP_NAME: &str = "noAppName";
pub const DEFAULT_APP_GROUP: &str = "default";

/// Logger configuration.
///
/// **Fields**
/// - `root`: directory every partition is created under.
/// - `type_extra`: optional directory inserted directly below `root`.
/// - `app_name`, `app_group`, `route`: routing defaults, restored whenever
///   the corresponding runtime setting is cleared.
/// - `min_level`: initial severity threshold.
/// - `format`: line format written by the logger.
/// - `dir_mode`, `file_mode`: permissions applied to newly created
///   directories and files regardless of the process umask (unix only).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoggerConfig {
    pub root: PathBuf,
    pub type_extra: Option<String>,
    pub app_name: String,
    pub app_group: String,
    pub route: String,
    pub min_level: Severity,
    pub format: RecordFormat,
    pub dir_mode: u32,
    pub file_mode: u32,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_ROOT),
            type_extra: None,
            app_name: DEFAULT_APP_NAME.to_string(),
            app_group: DEFAULT_APP_GROUP.to_string(),
            route: String::new(),
            min_level: Severity::Debug,
            format: RecordFormat::Json,
            dir_mode: 0o777,
            file_mode: 0o666,
        }
    }
}

/// Error returned when an environment value cannot be parsed.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("invalid {var}: {source}")]
    Level {
        var: &'static str,
        #[source]
        source: ParseSeverityError,
    },

    #[error("invalid {var}: {source}")]
    Format {
        var: &'static str,
        #[source]
        source: ParseFormatError,
    },
}

impl LoggerConfig {
    /// Build a configuration from `PARTITION_LOG_*` variables, using the
    /// defaults for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let min_level = match env_opt(PARTITION_LOG_LEVEL_ENV) {
            Some(raw) => raw.parse().map_err(|source| ConfigError::Level {
                var: PARTITION_LOG_LEVEL_ENV,
                source,
            })?,
            None => defaults.min_level,
        };
        let format = match env_opt(PARTITION_LOG_FORMAT_ENV) {
            Some(raw) => raw.parse().map_err(|source| ConfigError::Format {
                var: PARTITION_LOG_FORMAT_ENV,
                source,
            })?,
            None => defaults.format,
        };

        Ok(Self {
            root: PathBuf::from(env_or(PARTITION_LOG_ROOT_ENV, DEFAULT_ROOT)),
            type_extra: env_opt(PARTITION_LOG_TYPE_EXTRA_ENV),
            app_name: env_or(PARTITION_LOG_APP_NAME_ENV, DEFAULT_APP_NAME),
            app_group: env_or(PARTITION_LOG_APP_GROUP_ENV, DEFAULT_APP_GROUP),
            route: env_or(PARTITION_LOG_ROUTE_ENV, ""),
            min_level,
            format,
            ..defaults
        })
    }

    /// Routing defaults carried by this configuration.
    pub fn routing(&self) -> RoutingMetadata {
        RoutingMetadata {
            app_name: self.app_name.clone(),
            app_group: self.app_group.clone(),
            route: self.route.clone(),
        }
    }
}
