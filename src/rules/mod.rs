//! # Rule Evaluator
//!
//! Pure checks of one targeting rule against context or counter state.
//! No side effects: the same evaluators serve both `evaluate` and the
//! dry-run `explain`.

mod frequency;
mod outcome;
mod url;

pub use frequency::evaluate_frequency_rule;
pub use outcome::RuleOutcome;
pub use url::evaluate_url_rule;
