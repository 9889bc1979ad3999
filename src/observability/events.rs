//! Observable events for tablefetch
//!
//! Events are explicit and typed. Every log line carries exactly one.

use std::fmt;

use super::logger::Severity;

/// Observable events in the fetch service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Lifecycle
    /// Configuration loaded
    ConfigLoaded,
    /// HTTP server bound and serving
    ServerStart,

    // Fetch soft failures
    /// Entity name failed the identifier pattern
    FetchInvalidEntity,
    /// Entity unknown to the catalog
    FetchMissingEntity,
    /// Entity known but its physical table is absent
    FetchMissingTable,
    /// Requested column not present on the table, dropped
    FetchInvalidColumn,
    /// Sort column not present on the table, skipped
    FetchInvalidSortColumn,

    // Fetch outcomes
    /// Query executed
    FetchComplete,
    /// Request rejected by validation
    FetchRejected,
    /// Backing store failed while executing
    FetchFailed,
}

impl Event {
    /// Returns the event name
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::ServerStart => "SERVER_START",
            Event::FetchInvalidEntity => "FETCH_INVALID_ENTITY",
            Event::FetchMissingEntity => "FETCH_MISSING_ENTITY",
            Event::FetchMissingTable => "FETCH_MISSING_TABLE",
            Event::FetchInvalidColumn => "FETCH_INVALID_COLUMN",
            Event::FetchInvalidSortColumn => "FETCH_INVALID_SORT_COLUMN",
            Event::FetchComplete => "FETCH_COMPLETE",
            Event::FetchRejected => "FETCH_REJECTED",
            Event::FetchFailed => "FETCH_FAILED",
        }
    }

    /// Severity this event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::ConfigLoaded | Event::ServerStart | Event::FetchComplete => Severity::Info,
            Event::FetchInvalidEntity
            | Event::FetchMissingEntity
            | Event::FetchMissingTable
            | Event::FetchInvalidColumn
            | Event::FetchInvalidSortColumn
            | Event::FetchRejected => Severity::Warn,
            Event::FetchFailed => Severity::Error,
        }
    }

    /// Whether this event reports a degraded (soft-failed) fetch
    pub fn is_diagnostic(&self) -> bool {
        matches!(
            self,
            Event::FetchInvalidEntity
                | Event::FetchMissingEntity
                | Event::FetchMissingTable
                | Event::FetchInvalidColumn
                | Event::FetchInvalidSortColumn
        )
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
