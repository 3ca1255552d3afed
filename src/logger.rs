use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use tracing::{debug, warn};

use crate::config::{ConfigError, LoggerConfig};
use crate::error::LogError;
use crate::level::{should_emit, Severity};
use crate::record::{LogOptions, RecordBuilder, RoutingMetadata};
use crate::request_id;
use crate::router::FileRouter;
use crate::sink::LogSink;
use crate::value::Value;

/// Log type used by [`Logger::api_error`].
pub const API_ERROR_LOG_TYPE: &str = "apierror";

/// What a logging call did with its record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The record was rendered and handed to the sink.
    Written,
    /// The severity was below the threshold; nothing was built.
    Filtered,
}

/// Running counters, updated with relaxed atomics.
#[derive(Debug, Default)]
pub struct LoggerStats {
    /// Calls seen, before filtering or validation.
    pub total: AtomicU64,
    /// Records the sink accepted.
    pub emitted: AtomicU64,
    /// Calls dropped by the severity threshold.
    pub filtered: AtomicU64,
    /// Records lost to storage failures.
    pub failed: AtomicU64,
}

#[derive(Debug, Default)]
struct Correlation {
    request_id: Option<String>,
    client_hint: Option<String>,
}

/// Structured logger.
///
/// Owns what would otherwise be process-wide state: the severity threshold,
/// routing metadata and the request correlation id. Share it behind an
/// `Arc`; setters are meant for request/session boundaries and take effect
/// on subsequent calls only.
pub struct Logger {
    config: LoggerConfig,
    sink: Arc<dyn LogSink>,
    threshold: AtomicU8,
    routing: RwLock<RoutingMetadata>,
    correlation: Mutex<Correlation>,
    pub stats: LoggerStats,
}

impl Logger {
    pub fn new(config: LoggerConfig, sink: Arc<dyn LogSink>) -> Self {
        Self {
            threshold: AtomicU8::new(config.min_level.index()),
            routing: RwLock::new(config.routing()),
            correlation: Mutex::new(Correlation::default()),
            stats: LoggerStats::default(),
            sink,
            config,
        }
    }

    /// Logger writing to a [`FileRouter`] built from the same configuration.
    pub fn with_file_router(config: LoggerConfig) -> Self {
        let router = FileRouter::from_config(&config);
        Self::new(config, Arc::new(router))
    }

    /// [`Logger::with_file_router`] over [`LoggerConfig::from_env`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self::with_file_router(LoggerConfig::from_env()?))
    }

    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }

    /// Current severity threshold.
    pub fn level(&self) -> Severity {
        Severity::from_index(self.threshold.load(Ordering::Relaxed)).unwrap_or(Severity::Debug)
    }

    pub fn set_level(&self, level: Severity) {
        self.threshold.store(level.index(), Ordering::Relaxed);
        debug!(level = %level, "log threshold changed");
    }

    /// Snapshot of the current routing metadata.
    pub fn routing(&self) -> RoutingMetadata {
        self.routing
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Set the application group. An empty value restores the configured
    /// default.
    pub fn set_app_group(&self, app_group: impl Into<String>) {
        let app_group = non_empty_or(app_group.into(), &self.config.app_group);
        self.routing_mut().app_group = app_group;
    }

    /// Set the application name. An empty value restores the configured
    /// default.
    pub fn set_app_name(&self, app_name: impl Into<String>) {
        let app_name = non_empty_or(app_name.into(), &self.config.app_name);
        self.routing_mut().app_name = app_name;
    }

    /// Set the call-site route. An empty value restores the configured
    /// default.
    pub fn set_route(&self, route: impl Into<String>) {
        let route = non_empty_or(route.into(), &self.config.route);
        self.routing_mut().route = route;
    }

    /// Set the client hint (e.g. a forwarded-for address) mixed into
    /// generated request ids.
    pub fn set_client_hint(&self, hint: Option<String>) {
        self.correlation().client_hint = hint.filter(|h| !h.is_empty());
    }

    /// Current request id, generated on first access.
    pub fn request_id(&self) -> String {
        let mut correlation = self.correlation();
        if let Some(id) = &correlation.request_id {
            return id.clone();
        }
        let id = request_id::generate(correlation.client_hint.as_deref());
        correlation.request_id = Some(id.clone());
        id
    }

    /// Replace the request id with `explicit`, or with a freshly generated
    /// one when `explicit` is `None` or empty.
    pub fn refresh_request_id(&self, explicit: Option<&str>) -> String {
        let mut correlation = self.correlation();
        let id = match explicit.filter(|id| !id.is_empty()) {
            Some(id) => id.to_string(),
            None => request_id::generate(correlation.client_hint.as_deref()),
        };
        debug!(request_id = %id, "request id refreshed");
        correlation.request_id = Some(id.clone());
        id
    }

    pub fn log(
        &self,
        level: Severity,
        message: &str,
        context: impl Into<Value>,
    ) -> Result<Outcome, LogError> {
        self.log_with(level, message, context, &LogOptions::default())
    }

    /// Log with per-call overrides.
    ///
    /// **Returns**
    /// - `Ok(Outcome::Filtered)` when `level` is below the threshold; the
    ///   context is not even converted.
    /// - `Ok(Outcome::Written)` once the sink accepted the line.
    /// - `Err(LogError::EmptyLogType)` when `options.log_type` is set but
    ///   blank. Nothing is written.
    /// - `Err(LogError::Storage(..))` when the sink failed. The record is
    ///   lost; callers may ignore this.
    pub fn log_with(
        &self,
        level: Severity,
        message: &str,
        context: impl Into<Value>,
        options: &LogOptions,
    ) -> Result<Outcome, LogError> {
        self.stats.total.fetch_add(1, Ordering::Relaxed);

        if options.log_type.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(LogError::EmptyLogType);
        }
        if !should_emit(level, self.level()) {
            self.stats.filtered.fetch_add(1, Ordering::Relaxed);
            return Ok(Outcome::Filtered);
        }

        let routing = self.routing();
        let request_id = self.request_id();
        let record =
            RecordBuilder::new(&routing, &request_id, options).build(level, message, context.into());
        let line = record.render(self.config.format);

        match self.sink.write(&record, &line) {
            Ok(()) => {
                self.stats.emitted.fetch_add(1, Ordering::Relaxed);
                Ok(Outcome::Written)
            }
            Err(e) => {
                self.stats.failed.fetch_add(1, Ordering::Relaxed);
                warn!(error = %e, level = %level, "dropping log record");
                Err(e.into())
            }
        }
    }

    pub fn debug(&self, message: &str, context: impl Into<Value>) -> Result<Outcome, LogError> {
        self.log(Severity::Debug, message, context)
    }

    pub fn info(&self, message: &str, context: impl Into<Value>) -> Result<Outcome, LogError> {
        self.log(Severity::Info, message, context)
    }

    pub fn notice(&self, message: &str, context: impl Into<Value>) -> Result<Outcome, LogError> {
        self.log(Severity::Notice, message, context)
    }

    pub fn warning(&self, message: &str, context: impl Into<Value>) -> Result<Outcome, LogError> {
        self.log(Severity::Warning, message, context)
    }

    pub fn error(&self, message: &str, context: impl Into<Value>) -> Result<Outcome, LogError> {
        self.log(Severity::Error, message, context)
    }

    pub fn critical(&self, message: &str, context: impl Into<Value>) -> Result<Outcome, LogError> {
        self.log(Severity::Critical, message, context)
    }

    pub fn alert(&self, message: &str, context: impl Into<Value>) -> Result<Outcome, LogError> {
        self.log(Severity::Alert, message, context)
    }

    pub fn emergency(&self, message: &str, context: impl Into<Value>) -> Result<Outcome, LogError> {
        self.log(Severity::Emergency, message, context)
    }

    /// Info-level record written to `<log_type>` instead of `info`.
    /// A blank `log_type` is rejected with [`LogError::EmptyLogType`].
    pub fn custom(
        &self,
        message: &str,
        context: impl Into<Value>,
        log_type: &str,
    ) -> Result<Outcome, LogError> {
        self.log_with(Severity::Info, message, context, &LogOptions::custom(log_type))
    }

    /// Custom record under [`API_ERROR_LOG_TYPE`].
    pub fn api_error(&self, message: &str, context: impl Into<Value>) -> Result<Outcome, LogError> {
        self.custom(message, context, API_ERROR_LOG_TYPE)
    }

    /// Info-level record whose file name is prefixed with the route's last
    /// segment.
    pub fn info_ext(&self, message: &str, context: impl Into<Value>) -> Result<Outcome, LogError> {
        let action = self.routing().action().to_string();
        let options = if action.is_empty() {
            LogOptions::default()
        } else {
            LogOptions::prefixed(action)
        };
        self.log_with(Severity::Info, message, context, &options)
    }

    fn routing_mut(&self) -> std::sync::RwLockWriteGuard<'_, RoutingMetadata> {
        self.routing.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn correlation(&self) -> MutexGuard<'_, Correlation> {
        self.correlation.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn non_empty_or(value: String, default: &str) -> String {
    if value.is_empty() {
        default.to_string()
    } else {
        value
    }
}
