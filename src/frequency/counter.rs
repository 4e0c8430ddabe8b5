//! # Impression Counters

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::experience::FrequencyWindow;

/// Persisted counter for one experience, scope and window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterRecord {
    pub count: u32,
    pub window_start: DateTime<Utc>,
}

impl CounterRecord {
    /// First impression of a fresh window
    pub fn first(now: DateTime<Utc>) -> Self {
        Self {
            count: 1,
            window_start: now,
        }
    }

    /// Whether the window this record counts in has elapsed at `now`.
    ///
    /// Session windows never elapse here; they end with the session backend.
    pub fn is_expired(&self, window: FrequencyWindow, now: DateTime<Utc>) -> bool {
        window
            .length()
            .map(|length| now - self.window_start >= length)
            .unwrap_or(false)
    }
}

/// Read-only view of a counter at evaluation time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterSnapshot {
    pub count: u32,
    /// `None` when no impression has been recorded in the current window
    pub window_start: Option<DateTime<Utc>>,
}

impl CounterSnapshot {
    /// No impressions in the current window
    pub fn empty() -> Self {
        Self {
            count: 0,
            window_start: None,
        }
    }
}

impl From<CounterRecord> for CounterSnapshot {
    fn from(record: CounterRecord) -> Self {
        Self {
            count: record.count,
            window_start: Some(record.window_start),
        }
    }
}

/// Which cap a counter belongs to. The rule-level cap
/// (`targeting.frequency`) and the experience-level cap (`frequency`) are
/// counted independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CounterScope {
    Targeting,
    Experience,
}

impl CounterScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            CounterScope::Targeting => "targeting",
            CounterScope::Experience => "experience",
        }
    }
}

impl fmt::Display for CounterScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_day_window_expiry_boundary() {
        let start = Utc.with_ymd_and_hms(2024, 2, 1, 8, 0, 0).unwrap();
        let record = CounterRecord::first(start);

        assert!(!record.is_expired(FrequencyWindow::Day, start + Duration::hours(23)));
        assert!(record.is_expired(FrequencyWindow::Day, start + Duration::hours(24)));
        assert!(!record.is_expired(FrequencyWindow::Week, start + Duration::days(6)));
        assert!(record.is_expired(FrequencyWindow::Week, start + Duration::days(7)));
    }

    #[test]
    fn test_session_window_never_expires() {
        let start = Utc.with_ymd_and_hms(2024, 2, 1, 8, 0, 0).unwrap();
        let record = CounterRecord::first(start);
        assert!(!record.is_expired(FrequencyWindow::Session, start + Duration::days(400)));
    }

    #[test]
    fn test_record_round_trips_through_json() {
        let start = Utc.with_ymd_and_hms(2024, 2, 1, 8, 0, 0).unwrap();
        let record = CounterRecord {
            count: 4,
            window_start: start,
        };
        let value = serde_json::to_value(record).unwrap();
        assert_eq!(value["count"], 4);
        let back: CounterRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back, record);
    }
}
