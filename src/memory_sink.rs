use std::sync::{Mutex, PoisonError};

use crate::record::LogRecord;
use crate::sink::{LogSink, StorageError};

/// A sink that keeps every record and line in memory.
///
/// Intended for tests and for embedding the logger where records are
/// inspected in-process rather than written to disk.
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<(LogRecord, String)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rendered lines, in write order.
    pub fn lines(&self) -> Vec<String> {
        self.lock().iter().map(|(_, line)| line.clone()).collect()
    }

    /// Built records, in write order.
    pub fn records(&self) -> Vec<LogRecord> {
        self.lock().iter().map(|(record, _)| record.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(LogRecord, String)>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl LogSink for MemorySink {
    fn write(&self, record: &LogRecord, line: &str) -> Result<(), StorageError> {
        self.lock().push((record.clone(), line.to_string()));
        Ok(())
    }
}
