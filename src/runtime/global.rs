//! # Default Runtime
//!
//! Optional process-wide instance for hosts that want one. Built on first
//! use over in-memory storage and the system clock. `destroy().await`
//! tears it down; the instance itself stays and can be initialized again.

use std::sync::OnceLock;

use super::engine::Runtime;

static DEFAULT_RUNTIME: OnceLock<Runtime> = OnceLock::new();

/// The process-wide runtime
pub fn default_runtime() -> &'static Runtime {
    DEFAULT_RUNTIME.get_or_init(Runtime::in_memory)
}
