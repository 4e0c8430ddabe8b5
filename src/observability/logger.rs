//! Structured logger for the decision engine
//!
//! - One log record = one event
//! - Explicit severity levels
//! - Deterministic field ordering (alphabetical by key)
//! - Records are handed to `tracing`; the host installs the subscriber

use super::events::LogEvent;

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Verbose per-call detail, emitted only when `debug` is configured
    Debug,
    /// Normal lifecycle operations
    Info,
    /// Degraded but recovered conditions
    Warn,
    /// Failures in code the engine calls out to
    Error,
}

/// Structured logger facade over `tracing`
pub struct Logger;

impl Logger {
    /// Log an event with the given severity and fields
    pub fn log(severity: Severity, event: LogEvent, fields: &[(&str, &str)]) {
        let rendered = render_fields(fields);
        let name = event.as_str();
        match severity {
            Severity::Debug => tracing::debug!(target: "xp_engine", event = name, "{}", rendered),
            Severity::Info => tracing::info!(target: "xp_engine", event = name, "{}", rendered),
            Severity::Warn => tracing::warn!(target: "xp_engine", event = name, "{}", rendered),
            Severity::Error => tracing::error!(target: "xp_engine", event = name, "{}", rendered),
        }
    }
}

/// Render fields as `key=value` pairs sorted by key.
///
/// Values containing whitespace, quotes or `=` are quoted and escaped.
pub(crate) fn render_fields(fields: &[(&str, &str)]) -> String {
    let mut sorted: Vec<_> = fields.iter().collect();
    sorted.sort_by_key(|(k, _)| *k);

    let mut output = String::with_capacity(64);
    for (i, (key, value)) in sorted.into_iter().enumerate() {
        if i > 0 {
            output.push(' ');
        }
        output.push_str(key);
        output.push('=');
        if needs_quoting(value) {
            output.push_str(&format!("{:?}", value));
        } else {
            output.push_str(value);
        }
    }
    output
}

fn needs_quoting(value: &str) -> bool {
    value.is_empty()
        || value
            .chars()
            .any(|c| c.is_whitespace() || c == '"' || c == '=' || c.is_control())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Debug < Severity::Info);
        assert!(Severity::Info < Severity::Warn);
        assert!(Severity::Warn < Severity::Error);
    }

    #[test]
    fn test_severity_display() {
        assert_eq!(Severity::Debug.to_string(), "DEBUG");
        assert_eq!(Severity::Warn.as_str(), "WARN");
    }

    #[test]
    fn test_render_deterministic_ordering() {
        let a = render_fields(&[("zebra", "1"), ("apple", "2"), ("mango", "3")]);
        let b = render_fields(&[("mango", "3"), ("zebra", "1"), ("apple", "2")]);
        assert_eq!(a, b);
        assert_eq!(a, "apple=2 mango=3 zebra=1");
    }

    #[test]
    fn test_render_quotes_values() {
        let out = render_fields(&[("reason", "no URL in context"), ("id", "welcome")]);
        assert_eq!(out, "id=welcome reason=\"no URL in context\"");

        let empty = render_fields(&[("url", "")]);
        assert_eq!(empty, "url=\"\"");
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render_fields(&[]), "");
    }

    #[test]
    fn test_log_does_not_panic_without_subscriber() {
        Logger::log(Severity::Info, LogEvent::EngineInit, &[("namespace", "xp")]);
        Logger::log(Severity::Warn, LogEvent::StorageReadFailed, &[("key", "xp:freq:a")]);
    }
}
