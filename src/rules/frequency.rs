//! # Frequency Rule

use super::outcome::RuleOutcome;
use crate::experience::FrequencyRule;
use crate::frequency::CounterSnapshot;

/// Test a frequency cap against a counter snapshot. Read-only.
pub fn evaluate_frequency_rule(rule: &FrequencyRule, snapshot: &CounterSnapshot) -> RuleOutcome {
    if rule.max == 0 {
        return RuleOutcome::failed(format!(
            "invalid frequency rule: max must be greater than 0 (per {})",
            rule.per
        ));
    }

    let progress = format!(
        "{} of {} shown {}",
        snapshot.count,
        rule.max,
        rule.per.phrase()
    );

    if snapshot.count < rule.max {
        RuleOutcome::passed(progress)
    } else {
        RuleOutcome::failed(format!("frequency cap reached: {}", progress))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::experience::FrequencyWindow;

    fn snapshot(count: u32) -> CounterSnapshot {
        CounterSnapshot {
            count,
            window_start: None,
        }
    }

    #[test]
    fn test_under_cap_passes_with_progress() {
        let outcome = evaluate_frequency_rule(&FrequencyRule::per_session(3), &snapshot(2));
        assert_eq!(outcome, RuleOutcome::passed("2 of 3 shown this session"));
    }

    #[test]
    fn test_at_cap_fails() {
        let outcome = evaluate_frequency_rule(&FrequencyRule::per_session(3), &snapshot(3));
        assert!(!outcome.is_passed());
        assert!(outcome.reason().contains("3 of 3 shown this session"));
    }

    #[test]
    fn test_window_phrases() {
        let day = evaluate_frequency_rule(&FrequencyRule::per_day(1), &snapshot(0));
        assert_eq!(day.reason(), "0 of 1 shown today");
        let week = evaluate_frequency_rule(&FrequencyRule::new(2, FrequencyWindow::Week), &snapshot(1));
        assert_eq!(week.reason(), "1 of 2 shown this week");
    }

    #[test]
    fn test_zero_max_is_definition_error() {
        let outcome = evaluate_frequency_rule(&FrequencyRule::per_day(0), &snapshot(0));
        assert!(!outcome.is_passed());
        assert!(outcome.reason().starts_with("invalid frequency rule"));
    }
}
