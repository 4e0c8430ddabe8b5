//! Observability for the decision engine
//!
//! This module is the debug/log channel:
//! - Structured, named log events
//! - Deterministic field ordering
//! - Timing for trace steps
//!
//! Observability is read-only. Nothing here influences a decision, and a
//! failure to log never fails the calling operation.
//!
//! # Usage
//!
//! ```ignore
//! use xp_engine::observability::{log_event_with_fields, LogEvent};
//!
//! log_event_with_fields(LogEvent::ImpressionRecorded, &[("experience", "welcome")]);
//! ```

mod events;
mod logger;
mod timer;

pub use events::LogEvent;
pub use logger::{Logger, Severity};
pub use timer::Timer;

/// Log an event with fields at its default severity
pub fn log_event_with_fields(event: LogEvent, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event, fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event_with_fields() {
        log_event_with_fields(LogEvent::CounterMalformed, &[("key", "xp:freq:welcome")]);
    }
}
