use crate::record::LogRecord;
use crate::sink::{LogSink, StorageError};

/// A sink that simply drops all records.
///
/// Useful for measuring the overhead of the formatting pipeline without any
/// file I/O, and for tests that don't care about persistence.
#[derive(Clone, Debug, Default)]
pub struct NoopSink;

impl LogSink for NoopSink {
    fn write(&self, _record: &LogRecord, _line: &str) -> Result<(), StorageError> {
        Ok(())
    }
}
