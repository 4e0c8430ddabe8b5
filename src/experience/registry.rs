//! # Experience Registry
//!
//! Maps experience id to definition and remembers registration order,
//! which breaks priority ties during evaluation.

use std::collections::HashMap;

use super::definition::Experience;

/// Outcome of a registration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// The id was new
    Inserted,
    /// The id existed; its definition was replaced
    Replaced,
}

/// Registry of experiences
#[derive(Debug, Clone, Default)]
pub struct ExperienceRegistry {
    /// Experiences by id
    by_id: HashMap<String, Experience>,

    /// Ids in first-registration order
    order: Vec<String>,
}

impl ExperienceRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an experience.
    ///
    /// An existing id is overwritten (last write wins, no merge) and keeps
    /// its original position in registration order.
    pub fn register(&mut self, experience: Experience) -> Registration {
        let id = experience.id.clone();
        match self.by_id.insert(id.clone(), experience) {
            Some(_) => Registration::Replaced,
            None => {
                self.order.push(id);
                Registration::Inserted
            }
        }
    }

    /// Get an experience by id
    pub fn get(&self, id: &str) -> Option<&Experience> {
        self.by_id.get(id)
    }

    /// Check if an id is registered
    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Position of an id in registration order
    pub fn position(&self, id: &str) -> Option<usize> {
        self.order.iter().position(|i| i == id)
    }

    /// Experiences in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Experience> {
        self.order.iter().filter_map(|id| self.by_id.get(id))
    }

    /// Experiences in evaluation order: priority descending, ties broken
    /// by registration order.
    pub fn ranked(&self) -> Vec<&Experience> {
        let mut ranked: Vec<&Experience> = self.iter().collect();
        // sort_by is stable, so equal priorities keep registration order
        ranked.sort_by(|a, b| b.priority().cmp(&a.priority()));
        ranked
    }

    /// Remove everything
    pub fn clear(&mut self) {
        self.by_id.clear();
        self.order.clear();
    }

    /// Number of registered experiences
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::experience::{ExperienceDefinition, ExperienceType};

    fn experience(id: &str, priority: i32) -> Experience {
        Experience::new(
            id,
            ExperienceDefinition::new(ExperienceType::Banner).with_priority(priority),
        )
    }

    #[test]
    fn test_register_and_get() {
        let mut registry = ExperienceRegistry::new();
        assert_eq!(registry.register(experience("a", 0)), Registration::Inserted);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("a").unwrap().id, "a");
        assert!(registry.get("b").is_none());
    }

    #[test]
    fn test_overwrite_keeps_position() {
        let mut registry = ExperienceRegistry::new();
        registry.register(experience("a", 0));
        registry.register(experience("b", 0));
        assert_eq!(registry.register(experience("a", 7)), Registration::Replaced);

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("a").unwrap().priority(), 7);
        assert_eq!(registry.position("a"), Some(0));
        let ids: Vec<_> = registry.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_ranked_priority_then_registration() {
        let mut registry = ExperienceRegistry::new();
        registry.register(experience("low", 1));
        registry.register(experience("first-mid", 5));
        registry.register(experience("high", 10));
        registry.register(experience("second-mid", 5));
        registry.register(experience("negative", -3));

        let ids: Vec<_> = registry.ranked().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["high", "first-mid", "second-mid", "low", "negative"]
        );
    }

    #[test]
    fn test_clear() {
        let mut registry = ExperienceRegistry::new();
        registry.register(experience("a", 0));
        registry.clear();
        assert!(registry.is_empty());
        assert_eq!(registry.iter().count(), 0);
    }
}
