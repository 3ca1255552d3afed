use std::sync::Arc;

use partition_log::{LogRecord, LogSink, Logger, LoggerConfig, RecordFormat, StorageError};
use serde_json::json;

/// Example of plugging in a destination other than the file router by
/// implementing the `LogSink` trait directly. Imagine this forwards to a
/// proprietary collector; for the sake of example it prints each line.
struct StdoutSink;

impl LogSink for StdoutSink {
    fn write(&self, record: &LogRecord, line: &str) -> Result<(), StorageError> {
        println!("[{}] {}", record.file_name(), line);
        Ok(())
    }
}

fn main() {
    let config = LoggerConfig {
        format: RecordFormat::Plain,
        ..LoggerConfig::default()
    };
    let logger = Logger::new(config, Arc::new(StdoutSink));
    logger.set_app_name("shop");
    logger.set_route("Common.Order.Pay");

    let _ = logger.info("custom sink example started", ());
    let _ = logger.error(
        "order {<id>} failed",
        json!({"id": "42", "detail": {"code": 500}}),
    );
    let _ = logger.api_error("upstream {<service>} timed out", json!({"service": "billing"}));
}
