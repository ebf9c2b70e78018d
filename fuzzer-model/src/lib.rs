//! Static model for the trace-guided fuzzer (spec §3): `ExternalOp`,
//! `InternalEndpoint`, `Resource`, and the dataflow/dependency graphs. This
//! crate is built once at startup and never mutated afterward — everything
//! that evolves during a run lives in `fuzzer-pool`, `fuzzer-schedule`, and
//! `fuzzer-graph` instead.

mod dependency;
mod dependency_file;
mod error;
mod internal_op;
mod op;
mod openapi;
mod property;
mod resource;

pub use dependency::{infer_dependency_graph, DependencyGraph};
pub use dependency_file::{load_into as load_dependency_file, DependencyFileType};
pub use error::ModelError;
pub use internal_op::{infer_dataflow_edges, InternalOperation};
pub use op::{normalize_service_name, ExternalOp, InternalEndpoint, ParamLocation, ParamSpec};
pub use openapi::{load_external_ops, load_internal_ops, load_internal_service_map};
pub use property::SimpleProperty;
pub use resource::Resource;

/// The immutable static model described in spec §2.1/§3: external
/// operations, internal operations, the internal dataflow graph, and the
/// external dependency graph.
#[derive(Debug, Clone, Default)]
pub struct StaticModel {
    pub external_ops: Vec<ExternalOp>,
    pub internal_ops: Vec<InternalOperation>,
    pub dataflow_edges: Vec<(InternalEndpoint, InternalEndpoint)>,
    pub dependency_graph: DependencyGraph,
}

impl StaticModel {
    /// Build the static model from already-loaded external/internal
    /// operations, inferring both graphs by name-matching (§3) and
    /// optionally merging a RESTler dependency file on top.
    pub fn build(external_ops: Vec<ExternalOp>, internal_ops: Vec<InternalOperation>) -> Self {
        let dataflow_edges = infer_dataflow_edges(&internal_ops);
        let dependency_graph = infer_dependency_graph(&external_ops);
        Self {
            external_ops,
            internal_ops,
            dataflow_edges,
            dependency_graph,
        }
    }

    pub fn merge_dependency_file(
        &mut self,
        path: &std::path::Path,
        file_type: DependencyFileType,
    ) -> Result<(), ModelError> {
        load_dependency_file(&mut self.dependency_graph, path, file_type)
    }

    /// Internal consumers of `target` per the static dataflow graph (used
    /// by extension Pass B, §4.1.1).
    pub fn internal_consumers_of<'a>(
        &'a self,
        target: &InternalEndpoint,
    ) -> impl Iterator<Item = &'a InternalEndpoint> {
        self.dataflow_edges
            .iter()
            .filter(move |(src, _)| src == target)
            .map(|(_, dst)| dst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn static_model_builds_both_graphs_from_name_matching() {
        let mut producer = ExternalOp::new("/a", "POST");
        producer
            .responses
            .insert("201".into(), json!({"properties": {"id": {"type": "string"}}}));
        let mut consumer = ExternalOp::new("/b/{id}", "GET");
        consumer.parameters.push(ParamSpec {
            name: "id".into(),
            location: ParamLocation::Path,
            schema: json!({"type": "string"}),
            required: true,
        });

        let model = StaticModel::build(vec![producer.clone(), consumer.clone()], vec![]);
        assert_eq!(model.dependency_graph.consumers_of(&producer), &[consumer]);
        assert!(model.dataflow_edges.is_empty());
    }
}
