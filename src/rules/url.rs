//! # URL Rule
//!
//! Sub-fields are checked in order `contains`, `equals`, `matches`; the
//! first failure decides. A malformed pattern fails the rule instead of
//! aborting evaluation.

use regex::Regex;

use super::outcome::RuleOutcome;
use crate::context::Context;
use crate::experience::UrlRule;

/// Test a URL rule against the context URL
pub fn evaluate_url_rule(rule: &UrlRule, context: &Context) -> RuleOutcome {
    if rule.is_unconstrained() {
        return RuleOutcome::passed("no URL restriction");
    }

    let Some(url) = context.url() else {
        return RuleOutcome::failed("no URL in context");
    };

    let mut matched = Vec::with_capacity(3);

    if let Some(fragment) = &rule.contains {
        if !url.contains(fragment.as_str()) {
            return RuleOutcome::failed(format!("URL does not contain \"{}\"", fragment));
        }
        matched.push(format!("URL contains \"{}\"", fragment));
    }

    if let Some(expected) = &rule.equals {
        if url != expected {
            return RuleOutcome::failed(format!("URL does not equal \"{}\"", expected));
        }
        matched.push(format!("URL equals \"{}\"", expected));
    }

    if let Some(pattern) = &rule.matches {
        let regex = match Regex::new(pattern) {
            Ok(regex) => regex,
            Err(e) => {
                return RuleOutcome::failed(format!(
                    "invalid URL pattern \"{}\": {}",
                    pattern,
                    one_line(&e.to_string())
                ))
            }
        };
        if !regex.is_match(url) {
            return RuleOutcome::failed(format!("URL does not match pattern \"{}\"", pattern));
        }
        matched.push(format!("URL matches pattern \"{}\"", pattern));
    }

    RuleOutcome::passed(matched.join(", "))
}

// regex errors render as multi-line diagrams; reasons stay on one line
fn one_line(message: &str) -> &str {
    message
        .lines()
        .map(str::trim)
        .rfind(|line| line.starts_with("error:"))
        .unwrap_or_else(|| message.lines().next().unwrap_or(message))
}
