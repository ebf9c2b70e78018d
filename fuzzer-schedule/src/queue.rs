use std::collections::{BTreeMap, VecDeque};

use fuzzer_model::ExternalOp;
use uuid::Uuid;

use crate::op_case::OperationCase;
use crate::scenario::TestScenario;

/// Default `MAX_SCENARIOS` (§3).
pub const MAX_SCENARIOS: usize = 114;
/// Default `MAX_OPS_PER_METHOD` (§3).
pub const MAX_OPS_PER_METHOD: usize = 7;

/// The prioritized scenario queue (§3). Ordering/culling (§4.1): when
/// energy-based ordering is enabled, the queue is sorted by `energy`
/// descending before being truncated to capacity; otherwise insertion
/// order (FIFO) is preserved and low-priority tail entries are dropped.
#[derive(Debug, Clone)]
pub struct ScenarioQueue {
    items: VecDeque<TestScenario>,
    capacity: usize,
    energy_based_ordering: bool,
}

impl ScenarioQueue {
    pub fn new(capacity: usize, energy_based_ordering: bool) -> Self {
        Self {
            items: VecDeque::new(),
            capacity,
            energy_based_ordering,
        }
    }

    pub fn with_default_capacity() -> Self {
        Self::new(MAX_SCENARIOS, true)
    }

    /// Push, then immediately re-order and cull (§4.1: "After any push,
    /// re-order and cull the queue").
    pub fn push(&mut self, scenario: TestScenario) {
        self.items.push_back(scenario);
        self.reorder_and_cull();
    }

    pub fn pop_front(&mut self) -> Option<TestScenario> {
        self.items.pop_front()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn reorder_and_cull(&mut self) {
        if self.energy_based_ordering {
            let mut sorted: Vec<TestScenario> = self.items.drain(..).collect();
            sorted.sort_by(|a, b| b.energy.cmp(&a.energy));
            self.items = sorted.into();
        }
        while self.items.len() > self.capacity {
            self.items.pop_back();
        }
    }
}

/// Map from `ExternalOp` to op cases already executed at least once (§3).
/// `BTreeMap` rather than `HashMap` for the same reason as
/// `fuzzer_model::DependencyGraph` — `ExternalOp` has a total `Ord` but
/// isn't `Hash` (its schemas are raw `serde_json::Value`).
#[derive(Debug, Clone)]
pub struct PerOperationQueue {
    queues: BTreeMap<ExternalOp, Vec<OperationCase>>,
    capacity: usize,
}

impl PerOperationQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            queues: BTreeMap::new(),
            capacity,
        }
    }

    pub fn with_default_capacity() -> Self {
        Self::new(MAX_OPS_PER_METHOD)
    }

    /// Push a case, keep the per-op list sorted by energy descending (so
    /// "first" always means "highest energy"), then cull to capacity.
    pub fn push(&mut self, op: &ExternalOp, case: OperationCase) {
        let entries = self.queues.entry(op.clone()).or_default();
        entries.push(case);
        entries.sort_by(|a, b| b.energy.cmp(&a.energy));
        entries.truncate(self.capacity);
    }

    /// Clone of the first (highest-energy) case for `op`, without removing
    /// it — used while building extension candidate drafts (§4.1.1), which
    /// must not mutate the queue until a case is actually selected.
    pub fn peek_first(&self, op: &ExternalOp) -> Option<OperationCase> {
        self.queues.get(op).and_then(|v| v.first()).cloned()
    }

    /// Remove the case matching `id` from `op`'s queue. Must be called
    /// before mutating a selected draft (§9: "delete from the per-op queue
    /// before mutating the selected draft") so a failure mid-mutation can
    /// never leave a dangling or double-used case.
    pub fn remove_by_id(&mut self, op: &ExternalOp, id: Uuid) -> Option<OperationCase> {
        let entries = self.queues.get_mut(op)?;
        let index = entries.iter().position(|c| c.id == id)?;
        Some(entries.remove(index))
    }

    pub fn len(&self, op: &ExternalOp) -> usize {
        self.queues.get(op).map(Vec::len).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fuzzer_model::ExternalOp;

    fn scenario(energy: i32) -> TestScenario {
        let mut s = TestScenario::new(vec![OperationCase::new(ExternalOp::new("/a", "GET"))]);
        s.energy = energy;
        s
    }

    #[test]
    fn scenario_queue_truncates_to_capacity() {
        let mut queue = ScenarioQueue::new(2, false);
        queue.push(scenario(1));
        queue.push(scenario(2));
        queue.push(scenario(3));
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn scenario_queue_orders_by_energy_descending_when_enabled() {
        let mut queue = ScenarioQueue::new(10, true);
        queue.push(scenario(1));
        queue.push(scenario(5));
        queue.push(scenario(3));
        let first = queue.pop_front().unwrap();
        assert_eq!(first.energy, 5);
    }

    #[test]
    fn per_operation_queue_truncates_and_keeps_highest_energy_first() {
        let op = ExternalOp::new("/a", "GET");
        let mut queue = PerOperationQueue::new(1);
        let mut low = OperationCase::new(op.clone());
        low.energy = 1;
        let mut high = OperationCase::new(op.clone());
        high.energy = 10;
        queue.push(&op, low);
        queue.push(&op, high.clone());
        assert_eq!(queue.len(&op), 1);
        assert_eq!(queue.peek_first(&op).unwrap().id, high.id);
    }

    #[test]
    fn remove_by_id_takes_the_case_out() {
        let op = ExternalOp::new("/a", "GET");
        let mut queue = PerOperationQueue::new(5);
        let case = OperationCase::new(op.clone());
        let id = case.id;
        queue.push(&op, case);
        assert!(queue.remove_by_id(&op, id).is_some());
        assert_eq!(queue.len(&op), 0);
    }
}
