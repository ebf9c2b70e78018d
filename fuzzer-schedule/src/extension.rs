use std::collections::BTreeSet;

use fuzzer_model::{ExternalOp, StaticModel};
use fuzzer_graph::ReachabilityMap;
use rand::Rng;

use crate::op_case::OperationCase;
use crate::queue::PerOperationQueue;
use crate::scenario::TestScenario;

/// Default `MAX_OPS_PER_SCEN` (§4.1.1).
pub const MAX_OPS_PER_SCEN: usize = 10;

/// Tunables for extension that aren't part of the static model (§4.1.1).
#[derive(Debug, Clone, Copy)]
pub struct ExtensionConfig {
    pub max_ops_per_scenario: usize,
    /// Gates Pass B's use of the static dataflow graph's internal
    /// consumers (§4.1.1: "optional, gated by an 'use internal deps' flag").
    pub use_internal_deps: bool,
    /// Selects the max-energy draft (true) vs. a uniformly random one
    /// (false) among extension candidates (§4.1.1).
    pub energy_based_op_selection: bool,
}

impl Default for ExtensionConfig {
    fn default() -> Self {
        Self {
            max_ops_per_scenario: MAX_OPS_PER_SCEN,
            use_internal_deps: true,
            energy_based_op_selection: true,
        }
    }
}

/// Scenario extension (§4.1.1), the hardest algorithm in the Case Manager.
/// Returns `None` when extension's preconditions fail or no candidate can
/// be produced; otherwise a fresh, unpopulated child scenario one op
/// longer than `scenario`.
pub fn try_extend(
    scenario: &TestScenario,
    model: &StaticModel,
    reachability: &ReachabilityMap,
    per_op_queue: &mut PerOperationQueue,
    config: &ExtensionConfig,
    rng: &mut impl Rng,
) -> Option<TestScenario> {
    if !scenario.succeeded() || scenario.len() >= config.max_ops_per_scenario {
        return None;
    }

    let candidates = candidate_external_ops(scenario, model, reachability, config, rng);
    if candidates.is_empty() {
        return None;
    }

    let mut candidate_ops: Vec<(ExternalOp, OperationCase, bool)> = Vec::new();
    for op in candidates {
        if let Some(draft) = per_op_queue.peek_first(&op) {
            candidate_ops.push((op, draft, true));
        } else {
            candidate_ops.push((op.clone(), OperationCase::new(op), false));
        }
    }
    if candidate_ops.is_empty() {
        return None;
    }

    let selected_index = if config.energy_based_op_selection {
        candidate_ops
            .iter()
            .enumerate()
            .max_by_key(|(_, (_, case, _))| case.energy)
            .map(|(i, _)| i)
            .expect("candidate_ops is non-empty")
    } else {
        rng.gen_range(0..candidate_ops.len())
    };
    let (op, selected_case, from_queue) = candidate_ops.remove(selected_index);

    // §9: remove from the per-op queue before mutating the draft so a
    // failure mid-mutation can never leave a dangling or double-used case.
    if from_queue {
        per_op_queue.remove_by_id(&op, selected_case.id);
    }

    Some(build_child(scenario, selected_case))
}

/// Build the candidate `ExternalOp` set via the three-pass algorithm
/// (§4.1.1), deduplicated by `ExternalOp`'s total order.
fn candidate_external_ops(
    scenario: &TestScenario,
    model: &StaticModel,
    reachability: &ReachabilityMap,
    config: &ExtensionConfig,
    rng: &mut impl Rng,
) -> BTreeSet<ExternalOp> {
    let mut candidates = BTreeSet::new();

    // Pass A: static producer/consumer.
    for case in &scenario.ops {
        for consumer in model.dependency_graph.consumers_of(&case.op) {
            candidates.insert(consumer.clone());
        }
    }

    // Pass B: internal-reachability-augmented consumers.
    let mut internal_reach = BTreeSet::new();
    for case in &scenario.ops {
        for internal in reachability.reachable_internals(&case.op, true) {
            internal_reach.insert(internal);
        }
    }

    if config.use_internal_deps {
        for internal in &internal_reach {
            for internal_consumer in model.internal_consumers_of(internal) {
                for external in &model.external_ops {
                    if candidates.contains(external) {
                        continue;
                    }
                    if reachability
                        .reachable_internals(external, false)
                        .contains(internal_consumer)
                    {
                        candidates.insert(external.clone());
                        break;
                    }
                }
            }
        }
    }

    // Pass C: fallback to a uniformly random external op.
    if candidates.is_empty() && !model.external_ops.is_empty() {
        let idx = rng.gen_range(0..model.external_ops.len());
        candidates.insert(model.external_ops[idx].clone());
    }

    candidates
}

/// Deep-copy the parent, reset every cloned op and the scenario itself to
/// fresh identity/zeroed counters, halve the scenario's energy, and append
/// the selected candidate op (§4.1.1).
fn build_child(scenario: &TestScenario, selected: OperationCase) -> TestScenario {
    let mut ops: Vec<OperationCase> = scenario.ops.clone();
    for op in ops.iter_mut() {
        op.reset();
    }
    ops.push(selected);

    let mut child = TestScenario::new(ops);
    child.energy = scenario.energy / 2;
    child
}
