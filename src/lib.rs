//! xp-engine - An explainable, deterministic decision engine
//!
//! Given a set of registered experiences (banners, modals, tooltips,
//! inline content), a context and persisted impression counters, the
//! engine picks at most one experience to show and explains why, with a
//! step-by-step trace of every rule it checked.
//!
//! ```ignore
//! use xp_engine::{EngineConfig, ExperienceDefinition, ExperienceType, Runtime};
//!
//! let runtime = Runtime::in_memory();
//! runtime.init(EngineConfig::default()).await?;
//! runtime.register("welcome", ExperienceDefinition::new(ExperienceType::Modal))?;
//!
//! let decision = runtime.evaluate("https://example.com/")?;
//! for reason in &decision.reasons {
//!     println!("{}", reason);
//! }
//! ```

pub mod cli;
pub mod clock;
pub mod context;
pub mod decision;
pub mod experience;
pub mod frequency;
pub mod observability;
pub mod rules;
pub mod runtime;
pub mod storage;

pub use clock::{Clock, ManualClock, SystemClock};
pub use context::{Context, PartialContext};
pub use decision::{Decision, DecisionMetadata, TraceStep};
pub use experience::{
    Experience, ExperienceDefinition, ExperienceType, FrequencyRule, FrequencyWindow,
    TargetingRules, UrlRule,
};
pub use runtime::{
    default_runtime, EngineConfig, EngineError, EngineResult, EventKind, Runtime, RuntimeEvent,
    RuntimeState, Subscription,
};
pub use storage::{Backend, FileStorage, MemoryStorage, StorageAccessor, StorageError};
