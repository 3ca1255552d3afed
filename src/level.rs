use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Severity of a log record.
///
/// Variants are declared in ascending order, so the derived `Ord` compares
/// by position in the fixed sequence `debug < info < ... < emergency`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Debug,
    Info,
    Notice,
    Warning,
    Error,
    Critical,
    Alert,
    Emergency,
}

impl Severity {
    /// All severities, lowest first.
    pub const ALL: [Severity; 8] = [
        Severity::Debug,
        Severity::Info,
        Severity::Notice,
        Severity::Warning,
        Severity::Error,
        Severity::Critical,
        Severity::Alert,
        Severity::Emergency,
    ];

    /// Position in the fixed ordering, `0` for debug.
    pub fn index(self) -> u8 {
        self as u8
    }

    /// Inverse of [`Severity::index`].
    pub fn from_index(index: u8) -> Option<Severity> {
        Self::ALL.get(index as usize).copied()
    }

    /// Lower-case name, used for default log file names.
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Notice => "notice",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Critical => "critical",
            Severity::Alert => "alert",
            Severity::Emergency => "emergency",
        }
    }

    /// Upper-case name, used in rendered records.
    pub fn as_upper(self) -> &'static str {
        match self {
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Notice => "NOTICE",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
            Severity::Critical => "CRITICAL",
            Severity::Alert => "ALERT",
            Severity::Emergency => "EMERGENCY",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a severity name is not one of the eight known levels.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown severity `{0}`")]
pub struct ParseSeverityError(pub String);

impl FromStr for Severity {
    type Err = ParseSeverityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|level| level.as_str() == lower)
            .ok_or_else(|| ParseSeverityError(s.to_string()))
    }
}

/// `true` iff `level` is at or above `threshold` in the fixed ordering.
pub fn should_emit(level: Severity, threshold: Severity) -> bool {
    level.index() >= threshold.index()
}
