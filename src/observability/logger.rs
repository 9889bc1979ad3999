//! Structured JSON logger
//!
//! - One log line = one event
//! - `event` first, then `severity`, then fields sorted by key, then `ts`
//! - Synchronous, no buffering

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};

use super::events::Event;
use super::sink::{LogSink, StderrSink, StdoutSink};

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Normal operations
    Info = 0,
    /// Recoverable issues
    Warn = 1,
    /// Operation failures
    Error = 2,
}

impl Severity {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single structured log record
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub severity: Severity,
    pub event: Event,
    /// Sorted by key
    pub fields: Vec<(String, String)>,
    pub timestamp: DateTime<Utc>,
}

impl LogRecord {
    pub fn new(event: Event, fields: &[(&str, &str)], timestamp: DateTime<Utc>) -> Self {
        let mut fields: Vec<(String, String)> = fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));

        Self {
            severity: event.severity(),
            event,
            fields,
            timestamp,
        }
    }

    /// Look up a field value by key
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Render as a single JSON line (with trailing newline)
    pub fn to_json_line(&self) -> String {
        let mut object = Map::new();
        object.insert("event".into(), Value::from(self.event.as_str()));
        object.insert("severity".into(), Value::from(self.severity.as_str()));
        for (key, value) in &self.fields {
            object.insert(key.clone(), Value::from(value.as_str()));
        }
        object.insert(
            "ts".into(),
            Value::from(self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)),
        );

        let mut line = Value::Object(object).to_string();
        line.push('\n');
        line
    }
}

/// Logger handle passed to every component that reports events.
///
/// Cheap to clone; all clones share one sink.
#[derive(Clone)]
pub struct Logger {
    sink: Arc<dyn LogSink>,
}

impl Logger {
    /// Logger writing to stdout (stderr for errors)
    pub fn stdout() -> Self {
        Self::with_sink(Arc::new(StdoutSink))
    }

    /// Logger writing everything to stderr
    pub fn stderr() -> Self {
        Self::with_sink(Arc::new(StderrSink))
    }

    pub fn with_sink(sink: Arc<dyn LogSink>) -> Self {
        Self { sink }
    }

    /// Log an event with fields at the event's severity
    pub fn log(&self, event: Event, fields: &[(&str, &str)]) {
        let record = LogRecord::new(event, fields, Utc::now());
        self.sink.write(&record);
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::stdout()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Info < Severity::Warn);
        assert!(Severity::Warn < Severity::Error);
    }

    #[test]
    fn test_log_json_format() {
        let line = LogRecord::new(Event::FetchComplete, &[], fixed_ts()).to_json_line();

        let parsed: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed["event"], "FETCH_COMPLETE");
        assert_eq!(parsed["severity"], "INFO");
        assert_eq!(parsed["ts"], "2024-05-01T12:00:00.000Z");
    }

    #[test]
    fn test_log_deterministic_ordering() {
        let a = LogRecord::new(
            Event::FetchMissingEntity,
            &[("zebra", "1"), ("apple", "2"), ("mango", "3")],
            fixed_ts(),
        );
        let b = LogRecord::new(
            Event::FetchMissingEntity,
            &[("apple", "2"), ("mango", "3"), ("zebra", "1")],
            fixed_ts(),
        );
        let line = a.to_json_line();
        assert_eq!(line, b.to_json_line());

        let event_pos = line.find("\"event\"").unwrap();
        let severity_pos = line.find("\"severity\"").unwrap();
        let apple_pos = line.find("apple").unwrap();
        let zebra_pos = line.find("zebra").unwrap();
        assert!(event_pos < severity_pos);
        assert!(severity_pos < apple_pos);
        assert!(apple_pos < zebra_pos);
    }

    #[test]
    fn test_log_escapes_special_chars() {
        let line = LogRecord::new(
            Event::FetchInvalidColumn,
            &[("field", "x\"; DROP TABLE\nfoo")],
            fixed_ts(),
        )
        .to_json_line();

        assert_eq!(line.matches('\n').count(), 1);
        let parsed: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed["field"], "x\"; DROP TABLE\nfoo");
    }

    #[test]
    fn test_record_field_lookup() {
        let record = LogRecord::new(Event::FetchMissingTable, &[("entity", "Invoice")], fixed_ts());
        assert_eq!(record.field("entity"), Some("Invoice"));
        assert_eq!(record.field("table"), None);
        assert_eq!(record.severity, Severity::Warn);
    }
}
