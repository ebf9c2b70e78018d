use std::collections::HashMap;

use fuzzer_graph::ReachabilityMap;
use fuzzer_model::{ParamLocation, StaticModel};
use fuzzer_pool::ResourcePool;
use fuzzer_strategy::{ValueStrategy, ValueStrategyConfig};

use crate::energy::{self, EnergyConfig};
use crate::error::ScheduleError;
use crate::extension::{self, ExtensionConfig};
use crate::op_case::OperationCase;
use crate::queue::{PerOperationQueue, ScenarioQueue};
use crate::scenario::TestScenario;

/// Default `MAX_SCEN_EXEC` (§4.1).
pub const MAX_SCEN_EXEC: u32 = 3;
/// Default `MAX_OP_EXEC` (§4.1).
pub const MAX_OP_EXEC: u32 = 7;

/// Tunables that parameterize the Case Manager beyond the static model
/// (§4.1): how many times a scenario/op-case may re-execute with no new
/// coverage before it's dropped, plus the sub-component configs.
#[derive(Debug, Clone)]
pub struct CaseManagerConfig {
    pub max_scen_exec: u32,
    pub max_op_exec: u32,
    pub energy: EnergyConfig,
    pub value_strategy: ValueStrategyConfig,
    pub extension: ExtensionConfig,
    pub extra_headers: HashMap<String, String>,
}

impl Default for CaseManagerConfig {
    fn default() -> Self {
        Self {
            max_scen_exec: MAX_SCEN_EXEC,
            max_op_exec: MAX_OP_EXEC,
            energy: EnergyConfig::default(),
            value_strategy: ValueStrategyConfig::default(),
            extension: ExtensionConfig::default(),
            extra_headers: HashMap::new(),
        }
    }
}

/// The Case Manager (§4.1): the prioritized scenario/operation-case queues,
/// population, energy update, and scenario extension.
pub struct CaseManager {
    model: StaticModel,
    pool: ResourcePool,
    scenarios: ScenarioQueue,
    per_op: PerOperationQueue,
    value_strategy: ValueStrategy,
    config: CaseManagerConfig,
}

impl CaseManager {
    pub fn new(model: StaticModel, pool: ResourcePool, config: CaseManagerConfig) -> Self {
        let value_strategy = ValueStrategy::new(config.value_strategy);
        Self {
            model,
            pool,
            scenarios: ScenarioQueue::with_default_capacity(),
            per_op: PerOperationQueue::with_default_capacity(),
            value_strategy,
            config,
        }
    }

    pub fn pool(&self) -> &ResourcePool {
        &self.pool
    }

    pub fn model(&self) -> &StaticModel {
        &self.model
    }

    pub fn scenario_queue_len(&self) -> usize {
        self.scenarios.len()
    }

    /// `initFromDoc` (§4.1): one-op scenario per declared `ExternalOp`,
    /// initial energy 0.
    pub fn init_from_doc(&mut self) {
        for op in self.model.external_ops.clone() {
            let scenario = TestScenario::new(vec![OperationCase::new(op)]);
            self.scenarios.push(scenario);
        }
    }

    /// `popAndPopulate` (§4.1): remove the first scenario, fill every
    /// op-case's request fields via the Value Strategy. A malformed schema
    /// aborts only this scenario — the caller decides what "aborts" means
    /// (the fuzzer loop simply drops it and continues).
    pub fn pop_and_populate(&mut self) -> Option<Result<TestScenario, ScheduleError>> {
        let mut scenario = self.scenarios.pop_front()?;
        let mut rng = rand::thread_rng();

        for case in scenario.ops.iter_mut() {
            if let Err(err) = populate_case(case, &self.value_strategy, &self.pool, &self.config.extra_headers, &mut rng) {
                return Some(Err(err));
            }
        }
        Some(Ok(scenario))
    }

    /// `evaluateScenarioAndTryUpdate` (§4.1).
    pub fn evaluate_scenario_and_try_update(
        &mut self,
        gained_new_coverage: bool,
        mut scenario: TestScenario,
        reachability: &ReachabilityMap,
    ) {
        let mut rng = rand::thread_rng();
        scenario.executed_count += 1;
        scenario.energy = energy::update_energy(scenario.energy, gained_new_coverage, &self.config.energy, &mut rng);

        if gained_new_coverage || scenario.executed_count < self.config.max_scen_exec {
            self.scenarios.push(scenario.clone());
        }

        if let Some(child) = extension::try_extend(
            &scenario,
            &self.model,
            reachability,
            &mut self.per_op,
            &self.config.extension,
            &mut rng,
        ) {
            self.scenarios.push(child);
        }
    }

    /// `evaluateOperationCaseAndTryUpdate` (§4.1): analogous per-op-case
    /// bookkeeping against the per-operation queue.
    pub fn evaluate_operation_case_and_try_update(&mut self, gained_new_coverage: bool, mut case: OperationCase) {
        let mut rng = rand::thread_rng();
        case.executed_count += 1;
        case.energy = energy::update_energy(case.energy, gained_new_coverage, &self.config.energy, &mut rng);

        if gained_new_coverage || case.executed_count < self.config.max_op_exec {
            let op = case.op.clone();
            self.per_op.push(&op, case);
        }
    }
}

/// One op-case's population pass (§4.1 `popAndPopulate` step list).
fn populate_case(
    case: &mut OperationCase,
    value_strategy: &ValueStrategy,
    pool: &ResourcePool,
    extra_headers: &HashMap<String, String>,
    rng: &mut impl rand::Rng,
) -> Result<(), ScheduleError> {
    for param in case.op.parameters.clone() {
        match param.location {
            ParamLocation::Path => {
                let resource = value_strategy.generate(&param.name, &param.schema, pool, rng);
                case.set_path_param(param.name, resource);
            }
            ParamLocation::Query => {
                let resource = value_strategy.generate(&param.name, &param.schema, pool, rng);
                case.set_query_param(param.name, resource);
            }
            ParamLocation::Header => {
                tracing::debug!(param = %param.name, endpoint = %case.op.endpoint, "skipping header parameter, unsupported location for population");
            }
        }
    }

    case.headers = extra_headers.clone();

    if let Some(schema) = case.op.request_body_schema.clone() {
        let resource = value_strategy.generate("body", &schema, pool, rng);
        case.set_body(resource);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fuzzer_model::{ExternalOp, ParamSpec};
    use serde_json::json;

    fn model_with_one_op() -> StaticModel {
        let mut op = ExternalOp::new("/a/{id}", "GET");
        op.parameters.push(ParamSpec {
            name: "id".into(),
            location: ParamLocation::Path,
            schema: json!({"type": "string"}),
            required: true,
        });
        StaticModel::build(vec![op], vec![])
    }

    #[test]
    fn init_from_doc_creates_one_scenario_per_external_op() {
        let mut manager = CaseManager::new(model_with_one_op(), ResourcePool::new(), CaseManagerConfig::default());
        manager.init_from_doc();
        assert_eq!(manager.scenario_queue_len(), 1);
    }

    #[test]
    fn pop_and_populate_fills_every_declared_path_param() {
        let mut manager = CaseManager::new(model_with_one_op(), ResourcePool::new(), CaseManagerConfig::default());
        manager.init_from_doc();
        let scenario = manager.pop_and_populate().unwrap().unwrap();
        assert!(scenario.ops[0].path_params.contains_key("id"));
        assert!(scenario.ops[0].request_views_are_consistent());
    }

    #[test]
    fn evaluate_scenario_requeues_below_max_exec_even_without_new_coverage() {
        let mut manager = CaseManager::new(model_with_one_op(), ResourcePool::new(), CaseManagerConfig::default());
        manager.init_from_doc();
        let scenario = manager.pop_and_populate().unwrap().unwrap();
        let reachability = ReachabilityMap::new();
        manager.evaluate_scenario_and_try_update(false, scenario, &reachability);
        assert!(manager.scenario_queue_len() >= 1);
    }

    #[test]
    fn evaluate_scenario_drops_after_max_exec_with_no_new_coverage() {
        let mut manager = CaseManager::new(model_with_one_op(), ResourcePool::new(), CaseManagerConfig::default());
        manager.init_from_doc();
        let reachability = ReachabilityMap::new();
        for _ in 0..MAX_SCEN_EXEC {
            let scenario = manager.pop_and_populate().unwrap().unwrap();
            manager.evaluate_scenario_and_try_update(false, scenario, &reachability);
        }
        assert_eq!(manager.scenario_queue_len(), 0);
    }
}
