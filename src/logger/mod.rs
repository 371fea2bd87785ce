//! Structured logging for the airdrop tracker
//!
//! Every pipeline component receives a `Logger` handle and writes
//! level/tag-annotated events through it. Where the events end up is
//! decided by the caller through the `LogSink` it wraps:
//!
//! ```rust,ignore
//! use airdrop_tracker::logger::{ConsoleSink, LogLevel, LogTag, Logger};
//!
//! let logger = Logger::new(ConsoleSink::new(LogLevel::Info));
//! logger.info(LogTag::Receipts, "Fetching 8 transaction receipts");
//! logger.warning(LogTag::Holders, "Holder listing ended early");
//! ```
//!
//! Runs never share a sink unless the caller wires one in on purpose, so
//! concurrent runs cannot interleave each other's progress streams.

mod format;
mod levels;
mod sink;
mod tags;

use std::sync::Arc;

pub use levels::LogLevel;
pub use sink::{ConsoleSink, FanoutSink, LogEvent, LogSink, MemorySink, NullSink};
pub use tags::LogTag;

/// Cheap-to-clone handle over a shared sink
#[derive(Clone)]
pub struct Logger {
    sink: Arc<dyn LogSink>,
}

impl Logger {
    pub fn new<S: LogSink + 'static>(sink: S) -> Self {
        Self {
            sink: Arc::new(sink),
        }
    }

    pub fn from_arc(sink: Arc<dyn LogSink>) -> Self {
        Self { sink }
    }

    /// Logger that drops every event
    pub fn null() -> Self {
        Self::new(NullSink)
    }

    pub fn log(&self, tag: LogTag, level: LogLevel, message: &str) {
        self.sink.record(LogEvent::new(tag, level, message));
    }

    /// Log at ERROR level (run-aborting conditions)
    pub fn error(&self, tag: LogTag, message: &str) {
        self.log(tag, LogLevel::Error, message);
    }

    /// Log at WARNING level (degraded or skipped data)
    pub fn warning(&self, tag: LogTag, message: &str) {
        self.log(tag, LogLevel::Warning, message);
    }

    /// Log at INFO level (pipeline progress)
    pub fn info(&self, tag: LogTag, message: &str) {
        self.log(tag, LogLevel::Info, message);
    }

    /// Log at DEBUG level (per-request details)
    pub fn debug(&self, tag: LogTag, message: &str) {
        self.log(tag, LogLevel::Debug, message);
    }

    /// Log at VERBOSE level (raw payloads)
    pub fn verbose(&self, tag: LogTag, message: &str) {
        self.log(tag, LogLevel::Verbose, message);
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger").finish_non_exhaustive()
    }
}
