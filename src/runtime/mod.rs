//! # Runtime
//!
//! Public façade of the engine: lifecycle, registration, evaluation,
//! explanation, state inspection and events.
//!
//! ```ignore
//! let runtime = Runtime::in_memory();
//! runtime.init(EngineConfig::default()).await?;
//! runtime.register("welcome", definition)?;
//! let decision = runtime.evaluate("https://example.com/")?;
//! ```

mod config;
mod consumer;
mod engine;
mod errors;
mod events;
mod global;
mod state;

pub use config::EngineConfig;
pub use consumer::ConsumerStorage;
pub use engine::{CounterView, Runtime};
pub use errors::{EngineError, EngineResult};
pub use events::{EventBus, EventHandler, EventKind, RuntimeEvent, Subscription};
pub use global::default_runtime;
pub use state::RuntimeState;
