use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

use crate::level::Severity;
use crate::logger::Logger;
use crate::record::LogOptions;
use crate::value::{Key, Value};

/// Events from this crate's own modules are never forwarded, so a failing
/// sink cannot feed its warnings back into itself.
const OWN_TARGET: &str = "partition_log";

/// Field that routes an event through the custom log-type path.
pub const LOG_TYPE_FIELD: &str = "log_type";

/// `tracing_subscriber` layer that turns `tracing` events into records of a
/// [`Logger`].
///
/// The `message` field becomes the raw title, a `log_type` field (string,
/// `%display` or `?debug`) selects the custom file, and every other field goes into the context
/// mapping. Forwarding is synchronous: the record is on disk (or lost)
/// before the event macro returns.
pub struct PartitionLayer {
    logger: Arc<Logger>,
    /// Events handed to the logger.
    pub forwarded_events: Arc<AtomicU64>,
    /// Events the logger rejected or failed to store.
    pub rejected_events: Arc<AtomicU64>,
}

impl PartitionLayer {
    pub fn new(logger: Arc<Logger>) -> Self {
        Self {
            logger,
            forwarded_events: Arc::new(AtomicU64::new(0)),
            rejected_events: Arc::new(AtomicU64::new(0)),
        }
    }
}

/// Map a `tracing` level onto the fixed severity ordering.
pub fn severity_for(level: Level) -> Severity {
    match level {
        Level::TRACE | Level::DEBUG => Severity::Debug,
        Level::INFO => Severity::Info,
        Level::WARN => Severity::Warning,
        Level::ERROR => Severity::Error,
    }
}

impl<S> Layer<S> for PartitionLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        if meta.target().starts_with(OWN_TARGET) {
            return;
        }

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let message = visitor.message.unwrap_or_else(|| meta.name().to_string());
        let context = if visitor.fields.is_empty() {
            Value::Null
        } else {
            Value::from_entries(visitor.fields)
        };
        let options = LogOptions {
            log_type: visitor.log_type,
            file_prefix: None,
        };

        self.forwarded_events.fetch_add(1, Ordering::Relaxed);
        if self
            .logger
            .log_with(severity_for(*meta.level()), &message, context, &options)
            .is_err()
        {
            self.rejected_events.fetch_add(1, Ordering::Relaxed);
        }
    }
}

#[derive(Default)]
pub struct FieldVisitor {
    pub fields: Vec<(Key, Value)>,
    pub message: Option<String>,
    pub log_type: Option<String>,
}

impl FieldVisitor {
    fn insert(&mut self, field: &Field, value: Value) {
        self.fields.push((Key::from(field.name()), value));
    }
}

impl Visit for FieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "message" => self.message = Some(value.to_string()),
            LOG_TYPE_FIELD => self.log_type = Some(value.to_string()),
            _ => self.insert(field, Value::from(value)),
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.insert(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, Value::from(value));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        match field.name() {
            "message" => self.message = Some(format!("{:?}", value)),
            LOG_TYPE_FIELD => self.log_type = Some(format!("{:?}", value)),
            _ => self.insert(field, Value::from(format!("{:?}", value))),
        }
    }
}
