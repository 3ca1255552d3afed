use crate::sink::StorageError;

/// Error returned by a logging call.
///
/// Neither variant leaves shared logger state modified. Formatting itself
/// never fails; `Storage` only means the finished line was lost.
#[derive(thiserror::Error, Debug)]
pub enum LogError {
    /// The custom path was called without a usable log type.
    #[error("custom log type must not be empty")]
    EmptyLogType,

    #[error(transparent)]
    Storage(#[from] StorageError),
}
