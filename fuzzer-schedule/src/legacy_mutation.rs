//! Deprecated scenario-level mutation pass (§4.1.2), kept behind a feature
//! flag for backward compatibility with deployments that still schedule by
//! per-case mutation rather than the energy/extension algorithm in
//! `extension.rs`.

use fuzzer_strategy::{MutateConfig, MutateStrategy};
use rand::Rng;

use crate::op_case::OperationCase;

/// Mutate every already-populated parameter/body resource on `case` in
/// place, writing the scalar projections back through the normal setters
/// so the resource-view/scalar invariant (§8) still holds afterward.
pub fn mutate_case(case: &mut OperationCase, strategy: &MutateStrategy, rng: &mut impl Rng) {
    let path_names: Vec<String> = case.path_param_resources.keys().cloned().collect();
    for name in path_names {
        if let Some(mut resource) = case.path_param_resources.remove(&name) {
            strategy.mutate(&mut resource, rng);
            case.set_path_param(name, resource);
        }
    }

    let query_names: Vec<String> = case.query_param_resources.keys().cloned().collect();
    for name in query_names {
        if let Some(mut resource) = case.query_param_resources.remove(&name) {
            strategy.mutate(&mut resource, rng);
            case.set_query_param(name, resource);
        }
    }

    if let Some(mut resource) = case.body_resource.take() {
        strategy.mutate(&mut resource, rng);
        case.set_body(resource);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fuzzer_model::{ExternalOp, Resource};

    #[test]
    fn mutation_keeps_the_resource_view_invariant_intact() {
        let mut case = OperationCase::new(ExternalOp::new("/a/{id}", "GET"));
        case.set_path_param("id", Resource::String("hello".into()));
        case.set_query_param("tag", Resource::String("world".into()));
        case.set_body(Resource::from_value(&serde_json::json!({"n": 1})));

        let strategy = MutateStrategy::new(MutateConfig {
            random_primitive_weight: 1,
            structure_object_weight: 0,
            none_weight: 0,
            ..MutateConfig::default()
        });
        let mut rng = rand::thread_rng();
        mutate_case(&mut case, &strategy, &mut rng);

        assert!(case.request_views_are_consistent());
    }
}
