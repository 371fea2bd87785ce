/// Log sinks: destinations for structured log events
///
/// The pipeline never prints directly. It writes `LogEvent`s into whatever
/// sink the caller hands it, so a CLI can print colored lines while a job
/// runner keeps an in-memory stream it can poll for progress.
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::Arc;

use super::format;
use super::levels::LogLevel;
use super::tags::LogTag;

#[derive(Debug, Clone, serde::Serialize)]
pub struct LogEvent {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub tag: LogTag,
    pub message: String,
}

impl LogEvent {
    pub fn new(tag: LogTag, level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            tag,
            message: message.into(),
        }
    }
}

/// Destination for log events. Implementations must tolerate concurrent writers.
pub trait LogSink: Send + Sync {
    fn record(&self, event: LogEvent);
}

/// Colored console output filtered by a minimum level
pub struct ConsoleSink {
    min_level: LogLevel,
}

impl ConsoleSink {
    pub fn new(min_level: LogLevel) -> Self {
        Self { min_level }
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new(LogLevel::Info)
    }
}

impl LogSink for ConsoleSink {
    fn record(&self, event: LogEvent) {
        // Errors always print
        if event.level != LogLevel::Error && event.level > self.min_level {
            return;
        }
        format::print_event(&event);
    }
}

/// Append-only in-memory event stream
///
/// Readers keep a cursor and call `events_since` to pick up only what is new.
#[derive(Default)]
pub struct MemorySink {
    events: Mutex<Vec<LogEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    pub fn snapshot(&self) -> Vec<LogEvent> {
        self.events.lock().clone()
    }

    /// Events appended after `cursor`, plus the new cursor
    pub fn events_since(&self, cursor: usize) -> (Vec<LogEvent>, usize) {
        let events = self.events.lock();
        let start = cursor.min(events.len());
        (events[start..].to_vec(), events.len())
    }

    /// Plain text rendering of every event, one per line
    pub fn render_plain(&self) -> String {
        self.events
            .lock()
            .iter()
            .map(format::format_plain)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn count_at(&self, level: LogLevel) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|e| e.level == level)
            .count()
    }
}

impl LogSink for MemorySink {
    fn record(&self, event: LogEvent) {
        self.events.lock().push(event);
    }
}

/// Forwards every event to several sinks
pub struct FanoutSink {
    sinks: Vec<Arc<dyn LogSink>>,
}

impl FanoutSink {
    pub fn new(sinks: Vec<Arc<dyn LogSink>>) -> Self {
        Self { sinks }
    }
}

impl LogSink for FanoutSink {
    fn record(&self, event: LogEvent) {
        if let Some((last, rest)) = self.sinks.split_last() {
            for sink in rest {
                sink.record(event.clone());
            }
            last.record(event);
        }
    }
}

/// Discards everything
pub struct NullSink;

impl LogSink for NullSink {
    fn record(&self, _event: LogEvent) {}
}
