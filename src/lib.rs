//! Structured logging to level/date-partitioned files.
//!
//! A call flows through the severity filter, the [`RecordBuilder`] (template
//! substitution and context normalization), the minifying encoder and
//! finally a [`LogSink`], by default the [`FileRouter`].

pub mod level;
pub mod value;
pub mod encode;
pub mod pretty;
pub mod template;
pub mod normalize;
pub mod record;
pub mod request_id;

pub mod env;
pub mod config;
pub mod error;

pub mod sink;
pub mod router;
pub mod noop_sink;
pub mod memory_sink;

pub mod logger;
pub mod layer;
pub mod init;

pub use config::LoggerConfig;
pub use error::LogError;
pub use level::Severity;
pub use logger::{Logger, Outcome};
pub use record::{LogOptions, LogRecord, RecordBuilder, RecordFormat, RoutingMetadata};
pub use router::FileRouter;
pub use sink::{LogSink, StorageError};
pub use value::{Key, Value};
