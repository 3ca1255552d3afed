//! Environment variable names read by [`LoggerConfig::from_env`].
//!
//! The logger itself never touches the environment after construction;
//! these are conveniences for services that configure it at startup.
//!
//! [`LoggerConfig::from_env`]: crate::config::LoggerConfig::from_env

/// Root directory all partitions live under, e.g. `/var/log/app`.
pub const PARTITION_LOG_ROOT_ENV: &str = "PARTITION_LOG_ROOT";

/// Optional extra directory inserted directly below the root.
pub const PARTITION_LOG_TYPE_EXTRA_ENV: &str = "PARTITION_LOG_TYPE_EXTRA";

/// Default application name.
pub const PARTITION_LOG_APP_NAME_ENV: &str = "PARTITION_LOG_APP_NAME";

/// Default application group; may contain `/`.
pub const PARTITION_LOG_APP_GROUP_ENV: &str = "PARTITION_LOG_APP_GROUP";

/// Default call-site route recorded on every record.
pub const PARTITION_LOG_ROUTE_ENV: &str = "PARTITION_LOG_ROUTE";

/// Minimum severity, one of `debug` .. `emergency`.
pub const PARTITION_LOG_LEVEL_ENV: &str = "PARTITION_LOG_LEVEL";

/// Line format, `json` or `plain`.
pub const PARTITION_LOG_FORMAT_ENV: &str = "PARTITION_LOG_FORMAT";

/// Read an environment variable or fall back to a provided default.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Read an environment variable, treating unset and empty alike.
pub fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}
