//! Observable log events for the decision engine
//!
//! Every record written to the debug/log channel names one of these.
//! Events are explicit and typed.

use std::fmt;

use super::logger::Severity;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogEvent {
    // Lifecycle
    /// Runtime moved to ready
    EngineInit,
    /// `init` called on a ready runtime; configuration replaced
    EngineReconfigured,
    /// Runtime torn down
    EngineDestroyed,
    /// Operation rejected because the runtime is not ready
    EngineNotInitialized,

    // Registry
    /// New experience registered
    ExperienceRegistered,
    /// Existing experience definition replaced
    ExperienceOverwritten,

    // Decisions
    /// `evaluate` produced a decision
    DecisionEvaluated,
    /// `explain` produced a dry-run decision
    DecisionExplained,
    /// `explain` asked for an id that is not registered
    ExplainUnknownExperience,

    // Frequency tracking
    /// Impression counter incremented
    ImpressionRecorded,
    /// Counter window elapsed and was reset
    CounterRollover,
    /// Stored counter could not be decoded
    CounterMalformed,
    /// Storage read failed; treated as no prior impressions
    StorageReadFailed,
    /// Storage write failed; impression not persisted
    StorageWriteFailed,

    // Events
    /// A subscriber panicked during dispatch
    SubscriberPanicked,
}

impl LogEvent {
    /// Returns the event name
    pub fn as_str(&self) -> &'static str {
        match self {
            LogEvent::EngineInit => "ENGINE_INIT",
            LogEvent::EngineReconfigured => "ENGINE_RECONFIGURED",
            LogEvent::EngineDestroyed => "ENGINE_DESTROYED",
            LogEvent::EngineNotInitialized => "ENGINE_NOT_INITIALIZED",
            LogEvent::ExperienceRegistered => "EXPERIENCE_REGISTERED",
            LogEvent::ExperienceOverwritten => "EXPERIENCE_OVERWRITTEN",
            LogEvent::DecisionEvaluated => "DECISION_EVALUATED",
            LogEvent::DecisionExplained => "DECISION_EXPLAINED",
            LogEvent::ExplainUnknownExperience => "EXPLAIN_UNKNOWN_EXPERIENCE",
            LogEvent::ImpressionRecorded => "IMPRESSION_RECORDED",
            LogEvent::CounterRollover => "COUNTER_ROLLOVER",
            LogEvent::CounterMalformed => "COUNTER_MALFORMED",
            LogEvent::StorageReadFailed => "STORAGE_READ_FAILED",
            LogEvent::StorageWriteFailed => "STORAGE_WRITE_FAILED",
            LogEvent::SubscriberPanicked => "SUBSCRIBER_PANICKED",
        }
    }

    /// Severity the event is normally logged at
    pub fn severity(&self) -> Severity {
        match self {
            LogEvent::EngineInit
            | LogEvent::EngineReconfigured
            | LogEvent::EngineDestroyed => Severity::Info,
            LogEvent::CounterMalformed
            | LogEvent::StorageReadFailed
            | LogEvent::StorageWriteFailed
            | LogEvent::EngineNotInitialized => Severity::Warn,
            LogEvent::SubscriberPanicked => Severity::Error,
            _ => Severity::Debug,
        }
    }
}

impl fmt::Display for LogEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names_are_screaming_snake() {
        for event in [
            LogEvent::EngineInit,
            LogEvent::DecisionEvaluated,
            LogEvent::StorageReadFailed,
            LogEvent::SubscriberPanicked,
        ] {
            let name = event.as_str();
            assert!(name.chars().all(|c| c.is_ascii_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_severity_table() {
        assert_eq!(LogEvent::SubscriberPanicked.severity(), Severity::Error);
        assert_eq!(LogEvent::StorageReadFailed.severity(), Severity::Warn);
        assert_eq!(LogEvent::StorageWriteFailed.severity(), Severity::Warn);
        assert_eq!(LogEvent::CounterMalformed.severity(), Severity::Warn);
        assert_eq!(LogEvent::EngineNotInitialized.severity(), Severity::Warn);
        assert_eq!(LogEvent::EngineInit.severity(), Severity::Info);
        assert_eq!(LogEvent::EngineDestroyed.severity(), Severity::Info);
        assert_eq!(LogEvent::ImpressionRecorded.severity(), Severity::Debug);
        assert_eq!(LogEvent::DecisionEvaluated.severity(), Severity::Debug);
    }
}
