use crate::record::LogRecord;
use std::io;
use std::path::PathBuf;

/// Synchronous destination for rendered [`LogRecord`]s.
///
/// Implementations receive the record (for routing decisions) together
/// with the finished line. The logger calls `write` on the caller's thread
/// and returns only after it completes, so records from one thread land in
/// call order.
pub trait LogSink: Send + Sync {
    /// Persist one record.
    ///
    /// **Parameters**
    /// - `record`: the built record, used for routing (date, level,
    ///   application names, custom log type).
    /// - `line`: the record rendered in the logger's [`RecordFormat`](crate::record::RecordFormat),
    ///   without a trailing newline.
    ///
    /// **Returns**
    /// - `Ok(())` once the line has been handed to the backend.
    /// - `Err(..)` on storage failure. The logger counts and reports it but
    ///   never retries.
    fn write(&self, record: &LogRecord, line: &str) -> Result<(), StorageError>;
}

/// Storage failure reported by a [`LogSink`].
#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("failed to create log directory {path:?}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to open log file {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to append to {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
