//! Log sinks
//!
//! `StdoutSink` for long-running processes, `StderrSink` for one-shot
//! commands whose stdout carries the response, `MemorySink` for tests and
//! embedding hosts that want to inspect diagnostics.

use std::io::{self, Write};
use std::sync::Mutex;

use super::events::Event;
use super::logger::{LogRecord, Severity};

/// Destination for structured log records
pub trait LogSink: Send + Sync {
    fn write(&self, record: &LogRecord);
}

/// Writes one JSON line per record; errors go to stderr
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl LogSink for StdoutSink {
    fn write(&self, record: &LogRecord) {
        let line = record.to_json_line();
        // Write failures are ignored.
        if record.severity >= Severity::Error {
            let mut stderr = io::stderr().lock();
            let _ = stderr.write_all(line.as_bytes());
            let _ = stderr.flush();
        } else {
            let mut stdout = io::stdout().lock();
            let _ = stdout.write_all(line.as_bytes());
            let _ = stdout.flush();
        }
    }
}

/// Writes every record to stderr
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrSink;

impl LogSink for StderrSink {
    fn write(&self, record: &LogRecord) {
        let mut stderr = io::stderr().lock();
        let _ = stderr.write_all(record.to_json_line().as_bytes());
        let _ = stderr.flush();
    }
}

/// Keeps every record in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<LogRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all records written so far
    pub fn records(&self) -> Vec<LogRecord> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    /// Records of one event type
    pub fn events(&self, event: Event) -> Vec<LogRecord> {
        self.records()
            .into_iter()
            .filter(|r| r.event == event)
            .collect()
    }

    /// Records reporting a degraded fetch
    pub fn diagnostics(&self) -> Vec<LogRecord> {
        self.records()
            .into_iter()
            .filter(|r| r.event.is_diagnostic())
            .collect()
    }

    pub fn clear(&self) {
        if let Ok(mut records) = self.records.lock() {
            records.clear();
        }
    }
}

impl LogSink for MemorySink {
    fn write(&self, record: &LogRecord) {
        if let Ok(mut records) = self.records.lock() {
            records.push(record.clone());
        }
    }
}
