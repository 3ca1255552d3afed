use chrono::{DateTime, Local};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::encode::encode;
use crate::level::Severity;
use crate::normalize::{normalize, Description};
use crate::template::render;
use crate::value::{Key, Value};

/// Format of `log_time`: second resolution plus a `.mmm` fragment.
pub const LOG_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Identifiers that decide where a record is stored and how it is labelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoutingMetadata {
    pub app_name: String,
    /// May contain `/` to nest group directories.
    pub app_group: String,
    /// Dotted or slashed call-site path, e.g. `Common.Order.Pay`.
    pub route: String,
}

impl RoutingMetadata {
    /// Last segment of the route, used as the filename prefix of the
    /// `info_ext` variant.
    pub fn action(&self) -> &str {
        self.route
            .rsplit(['.', '/'])
            .find(|segment| !segment.is_empty())
            .unwrap_or("")
    }
}

/// Per-call overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogOptions {
    /// Replaces the severity name as the log file's base name.
    pub log_type: Option<String>,
    /// Prepended (with `_`) to the file's base name.
    pub file_prefix: Option<String>,
}

impl LogOptions {
    pub fn custom(log_type: impl Into<String>) -> Self {
        Self {
            log_type: Some(log_type.into()),
            file_prefix: None,
        }
    }

    pub fn prefixed(prefix: impl Into<String>) -> Self {
        Self {
            log_type: None,
            file_prefix: Some(prefix.into()),
        }
    }
}

/// A fully rendered log record. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogRecord {
    #[serde(skip)]
    pub timestamp: DateTime<Local>,
    pub log_time: String,
    pub log_level: Severity,
    pub log_type: Option<String>,
    pub route: String,
    pub request_id: String,
    pub appname: String,
    pub appgroup: String,
    pub title_q: String,
    pub title: String,
    pub description: Description,
    #[serde(skip)]
    pub file_prefix: Option<String>,
}

impl LogRecord {
    pub fn level(&self) -> Severity {
        self.log_level
    }

    /// Base name of the destination file: the custom log type when set,
    /// the severity name otherwise.
    pub fn file_name(&self) -> &str {
        self.log_type
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| self.log_level.as_str())
    }

    /// The record as an encodable mapping, keys in output order.
    pub fn to_value(&self) -> Value {
        let field = |name: &str, value: Value| (Key::Name(name.to_string()), value);
        Value::Map(vec![
            field("log_time", Value::from(self.log_time.as_str())),
            field("log_level", Value::from(self.log_level.as_upper())),
            field("log_type", Value::from(self.log_type.clone())),
            field("route", Value::from(self.route.as_str())),
            field("request_id", Value::from(self.request_id.as_str())),
            field("appname", Value::from(self.appname.as_str())),
            field("appgroup", Value::from(self.appgroup.as_str())),
            field("title_q", Value::from(self.title_q.as_str())),
            field("title", Value::from(self.title.as_str())),
            field("description", self.description.to_value()),
        ])
    }

    /// Render one output line, without the trailing newline.
    pub fn render(&self, format: RecordFormat) -> String {
        match format {
            RecordFormat::Json => encode(&self.to_value()),
            RecordFormat::Plain => {
                let description = match &self.description {
                    Description::Full(text) => text.clone(),
                    flat @ Description::Flat(_) => encode(&flat.to_value()),
                };
                [
                    self.log_time.as_str(),
                    self.route.as_str(),
                    self.log_level.as_upper(),
                    self.request_id.as_str(),
                    self.title.replace('\n', "\\n").as_str(),
                    description.as_str(),
                ]
                .join("|")
            }
        }
    }
}

/// Line format of rendered records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RecordFormat {
    #[default]
    Json,
    Plain,
}

impl fmt::Display for RecordFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordFormat::Json => f.write_str("json"),
            RecordFormat::Plain => f.write_str("plain"),
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown record format `{0}` (expected `json` or `plain`)")]
pub struct ParseFormatError(pub String);

impl FromStr for RecordFormat {
    type Err = ParseFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(RecordFormat::Json),
            "plain" => Ok(RecordFormat::Plain),
            _ => Err(ParseFormatError(s.to_string())),
        }
    }
}

/// Assembles [`LogRecord`]s from a snapshot of the logger's settings.
///
/// Holds no mutable state; building the same inputs twice yields the same
/// title and description.
#[derive(Debug, Clone, Copy)]
pub struct RecordBuilder<'a> {
    pub routing: &'a RoutingMetadata,
    pub request_id: &'a str,
    pub options: &'a LogOptions,
}

impl<'a> RecordBuilder<'a> {
    pub fn new(routing: &'a RoutingMetadata, request_id: &'a str, options: &'a LogOptions) -> Self {
        Self {
            routing,
            request_id,
            options,
        }
    }

    /// Build a record stamped with the current local time.
    pub fn build(&self, level: Severity, raw_title: &str, context: Value) -> LogRecord {
        self.build_at(Local::now(), level, raw_title, context)
    }

    pub fn build_at(
        &self,
        timestamp: DateTime<Local>,
        level: Severity,
        raw_title: &str,
        context: Value,
    ) -> LogRecord {
        let title = render(raw_title, &context);
        let description = normalize(context);

        LogRecord {
            timestamp,
            log_time: timestamp.format(LOG_TIME_FORMAT).to_string(),
            log_level: level,
            log_type: self.options.log_type.clone(),
            route: self.routing.route.clone(),
            request_id: self.request_id.to_string(),
            appname: self.routing.app_name.clone(),
            appgroup: self.routing.app_group.clone(),
            title_q: raw_title.to_string(),
            title,
            description,
            file_prefix: self.options.file_prefix.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn routing() -> RoutingMetadata {
        RoutingMetadata {
            app_name: "shop".into(),
            app_group: "orders/pay".into(),
            route: "Common.Order.Pay".into(),
        }
    }

    fn fixed_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2016, 7, 8, 12, 4, 50).unwrap()
    }

    #[test]
    fn builds_title_and_description() {
        let routing = routing();
        let options = LogOptions::default();
        let builder = RecordBuilder::new(&routing, "rid", &options);
        let record = builder.build_at(
            fixed_time(),
            Severity::Error,
            "order {<id>} failed",
            Value::from(json!({"id": "42", "detail": {"code": 500}})),
        );

        assert_eq!(record.log_time, "2016-07-08 12:04:50.000");
        assert_eq!(record.title, "order 42 failed");
        assert_eq!(record.title_q, "order {<id>} failed");
        assert_eq!(
            record.description,
            Description::Flat(vec![
                ("detail".into(), "{\n\t\"code\": 500\n}".into()),
                ("id".into(), "42".into()),
            ])
        );
        assert_eq!(record.file_name(), "error");
    }

    #[test]
    fn plain_line_layout() {
        let routing = routing();
        let options = LogOptions::default();
        let record = RecordBuilder::new(&routing, "rid", &options).build_at(
            fixed_time(),
            Severity::Info,
            "two\nlines",
            Value::from("ctx"),
        );
        assert_eq!(
            record.render(RecordFormat::Plain),
            "2016-07-08 12:04:50.000|Common.Order.Pay|INFO|rid|two\\nlines|ctx"
        );
    }

    #[test]
    fn json_line_matches_serde_shape() {
        let routing = routing();
        let options = LogOptions::custom("apierror");
        let record = RecordBuilder::new(&routing, "rid", &options).build_at(
            fixed_time(),
            Severity::Info,
            "hi",
            Value::from(json!({"a": [1]})),
        );
        let line = record.render(RecordFormat::Json);
        let parsed: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed, serde_json::to_value(&record).unwrap());
        assert_eq!(parsed["log_level"], "INFO");
        assert_eq!(parsed["log_type"], "apierror");
        assert_eq!(parsed["description"]["a"], "[\n\t1\n]");
        assert!(line.starts_with(r#"{"log_time":"2016-07-08 12:04:50.000","log_level":"INFO""#));
        assert_eq!(record.file_name(), "apierror");
    }

    #[test]
    fn build_is_deterministic_apart_from_time() {
        let routing = routing();
        let options = LogOptions::default();
        let builder = RecordBuilder::new(&routing, "rid", &options);
        let ctx = Value::from(json!({"k": {"n": [1, 2]}, "s": "v"}));
        let a = builder.build(Severity::Debug, "x {<s>}", ctx.clone());
        let b = builder.build(Severity::Debug, "x {<s>}", ctx);
        assert_eq!(a.title, b.title);
        assert_eq!(a.description, b.description);
    }

    #[test]
    fn action_is_last_route_segment() {
        let mut r = routing();
        assert_eq!(r.action(), "Pay");
        r.route = "api/v1/orders/".into();
        assert_eq!(r.action(), "orders");
        r.route.clear();
        assert_eq!(r.action(), "");
    }

    #[test]
    fn format_parsing() {
        assert_eq!("PLAIN".parse::<RecordFormat>(), Ok(RecordFormat::Plain));
        assert!("xml".parse::<RecordFormat>().is_err());
    }
}
