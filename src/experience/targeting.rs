//! # Targeting Rules

use std::fmt;

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Rules an evaluation context must satisfy before an experience is shown
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetingRules {
    /// URL constraint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<UrlRule>,

    /// Rule-level frequency cap, counted apart from the experience-level cap
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<FrequencyRule>,
}

impl TargetingRules {
    /// Targeting with only a URL rule
    pub fn url(rule: UrlRule) -> Self {
        Self {
            url: Some(rule),
            frequency: None,
        }
    }

    /// Add a rule-level frequency cap
    pub fn with_frequency(mut self, rule: FrequencyRule) -> Self {
        self.frequency = Some(rule);
        self
    }
}

/// URL constraint. Every field that is set must match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlRule {
    /// Substring the URL must contain (case-sensitive)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contains: Option<String>,

    /// Exact URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equals: Option<String>,

    /// Regular expression the URL must match
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matches: Option<String>,
}

impl UrlRule {
    pub fn contains(fragment: impl Into<String>) -> Self {
        Self {
            contains: Some(fragment.into()),
            ..Self::default()
        }
    }

    pub fn equals(url: impl Into<String>) -> Self {
        Self {
            equals: Some(url.into()),
            ..Self::default()
        }
    }

    pub fn matches(pattern: impl Into<String>) -> Self {
        Self {
            matches: Some(pattern.into()),
            ..Self::default()
        }
    }

    /// True when no sub-field is set
    pub fn is_unconstrained(&self) -> bool {
        self.contains.is_none() && self.equals.is_none() && self.matches.is_none()
    }
}

/// Impression cap: at most `max` shows per `per` window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyRule {
    pub max: u32,
    pub per: FrequencyWindow,
}

impl FrequencyRule {
    pub fn new(max: u32, per: FrequencyWindow) -> Self {
        Self { max, per }
    }

    pub fn per_session(max: u32) -> Self {
        Self::new(max, FrequencyWindow::Session)
    }

    pub fn per_day(max: u32) -> Self {
        Self::new(max, FrequencyWindow::Day)
    }

    pub fn per_week(max: u32) -> Self {
        Self::new(max, FrequencyWindow::Week)
    }
}

/// Time window a frequency counter is scoped to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrequencyWindow {
    Session,
    Day,
    Week,
}

impl FrequencyWindow {
    pub fn as_str(&self) -> &'static str {
        match self {
            FrequencyWindow::Session => "session",
            FrequencyWindow::Day => "day",
            FrequencyWindow::Week => "week",
        }
    }

    /// Window length. Sessions have none: they last as long as the
    /// session backend does.
    pub fn length(&self) -> Option<Duration> {
        match self {
            FrequencyWindow::Session => None,
            FrequencyWindow::Day => Some(Duration::hours(24)),
            FrequencyWindow::Week => Some(Duration::hours(7 * 24)),
        }
    }

    /// Phrase used in human-readable reasons ("shown this session")
    pub fn phrase(&self) -> &'static str {
        match self {
            FrequencyWindow::Session => "this session",
            FrequencyWindow::Day => "today",
            FrequencyWindow::Week => "this week",
        }
    }
}

impl fmt::Display for FrequencyWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
