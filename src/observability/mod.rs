//! Observability for tablefetch
//!
//! Structured JSON logging of typed lifecycle and fetch events.
//!
//! # Usage
//!
//! ```ignore
//! use tablefetch::observability::{Event, Logger};
//!
//! let logger = Logger::stdout();
//! logger.log(Event::FetchMissingEntity, &[("entity", "Invoice")]);
//! ```

mod events;
mod logger;
mod sink;

pub use events::Event;
pub use logger::{LogRecord, Logger, Severity};
pub use sink::{LogSink, MemorySink, StderrSink, StdoutSink};
