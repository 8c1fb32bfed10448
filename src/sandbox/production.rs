//! Production queues and unit requests for the sandbox

use std::collections::VecDeque;

use ahash::{AHashMap, AHashSet};

use crate::world::ProductionControl;

#[derive(Debug, Clone)]
pub struct SandboxProduction {
    /// Queue name -> unit types it can build
    queues: AHashMap<String, AHashSet<String>>,
    /// Whether the unit-request collaborator is enabled
    pub enabled: bool,
    /// Submitted, unfulfilled requests, oldest first
    pending: VecDeque<String>,
    /// Every request ever submitted
    pub submitted: Vec<String>,
}

impl Default for SandboxProduction {
    fn default() -> Self {
        Self {
            queues: AHashMap::new(),
            enabled: true,
            pending: VecDeque::new(),
            submitted: Vec::new(),
        }
    }
}

impl SandboxProduction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a queue that can build the given unit types
    pub fn with_queue(mut self, name: &str, buildable: &[&str]) -> Self {
        self.queues.insert(
            name.to_string(),
            buildable.iter().map(|t| t.to_string()).collect(),
        );
        self
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Fulfil the oldest request, returning its unit type
    pub fn complete_next(&mut self) -> Option<String> {
        self.pending.pop_front()
    }
}

impl ProductionControl for SandboxProduction {
    fn queue_can_build(&self, queue: &str, unit_type: &str) -> Option<bool> {
        self.queues.get(queue).map(|types| types.contains(unit_type))
    }

    fn requests_enabled(&self) -> bool {
        self.enabled
    }

    fn outstanding_requests(&self, unit_type: &str) -> usize {
        self.pending.iter().filter(|t| *t == unit_type).count()
    }

    fn request_unit(&mut self, unit_type: &str) {
        self.pending.push_back(unit_type.to_string());
        self.submitted.push(unit_type.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_queue_is_none() {
        let production = SandboxProduction::new().with_queue("vehicle", &["mcv"]);
        assert_eq!(production.queue_can_build("infantry", "mcv"), None);
        assert_eq!(production.queue_can_build("vehicle", "mcv"), Some(true));
        assert_eq!(production.queue_can_build("vehicle", "tank"), Some(false));
    }

    #[test]
    fn test_requests_tracked_until_completed() {
        let mut production = SandboxProduction::new();
        production.request_unit("mcv");
        assert_eq!(production.outstanding_requests("mcv"), 1);
        assert_eq!(production.complete_next().as_deref(), Some("mcv"));
        assert_eq!(production.outstanding_requests("mcv"), 0);
        assert_eq!(production.submitted.len(), 1);
    }
}
