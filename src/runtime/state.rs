//! # Runtime State Snapshot

use serde::Serialize;

use super::config::EngineConfig;
use crate::decision::Decision;
use crate::experience::Experience;

/// Point-in-time copy of a runtime. Mutating it does not affect the runtime.
#[derive(Debug, Clone, Serialize)]
pub struct RuntimeState {
    pub initialized: bool,
    /// Registered experiences in registration order
    pub experiences: Vec<Experience>,
    /// Recent decisions, oldest first
    pub decisions: Vec<Decision>,
    pub config: EngineConfig,
}

impl RuntimeState {
    pub fn experience(&self, id: &str) -> Option<&Experience> {
        self.experiences.iter().find(|e| e.id == id)
    }

    pub fn last_decision(&self) -> Option<&Decision> {
        self.decisions.last()
    }
}
