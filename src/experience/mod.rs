//! # Experiences
//!
//! Data model for targetable content units and the registry that owns
//! them.

mod definition;
mod registry;
mod targeting;

pub use definition::{validate_id, Experience, ExperienceDefinition, ExperienceType};
pub use registry::{ExperienceRegistry, Registration};
pub use targeting::{FrequencyRule, FrequencyWindow, TargetingRules, UrlRule};
