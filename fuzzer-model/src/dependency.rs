use std::collections::BTreeMap;

use crate::op::{ExternalOp, ParamLocation};

/// Producer -> consumer edges between external operations (§3). Populated
/// by name-matching inference (below) and merged with an optional
/// RESTler-style dependency file (§6).
///
/// Keyed with a `BTreeMap` over `ExternalOp`'s `(endpoint, method)` total
/// order rather than a `HashMap`, since schemas (`serde_json::Value`) in
/// the key aren't `Hash` and every op is uniquely identified by its
/// `(endpoint, method)` pair anyway.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    edges: BTreeMap<ExternalOp, Vec<ExternalOp>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_edge(&mut self, producer: ExternalOp, consumer: ExternalOp) {
        let consumers = self.edges.entry(producer).or_default();
        if !consumers.contains(&consumer) {
            consumers.push(consumer);
        }
    }

    /// Declared consumers of `producer`, or an empty slice if none.
    pub fn consumers_of(&self, producer: &ExternalOp) -> &[ExternalOp] {
        self.edges.get(producer).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.edges.values().all(Vec::is_empty)
    }
}

/// Infer producer/consumer edges between external operations whenever a 2xx
/// response property name matches a path/query parameter or request-body
/// property name of another operation (§1 Non-goals: "beyond name-matching
/// ... is out of scope" — this *is* the name-matching this system is
/// allowed to do).
pub fn infer_dependency_graph(ops: &[ExternalOp]) -> DependencyGraph {
    let mut graph = DependencyGraph::new();
    for producer in ops {
        let produced = producer.produced_property_names();
        if produced.is_empty() {
            continue;
        }
        for consumer in ops {
            if consumer == producer {
                continue;
            }
            let mut consumed: Vec<String> = consumer
                .param_names(ParamLocation::Path)
                .into_iter()
                .chain(consumer.param_names(ParamLocation::Query))
                .map(String::from)
                .collect();
            consumed.extend(consumer.body_property_names());

            if produced.iter().any(|p| consumed.iter().any(|c| c == p)) {
                graph.add_edge(producer.clone(), consumer.clone());
            }
        }
    }
    graph
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn producer_consumer_inferred_by_name_match() {
        let mut producer = ExternalOp::new("/a", "POST");
        producer
            .responses
            .insert("201".into(), serde_json::json!({"properties": {"id": {"type": "string"}}}));

        let mut consumer = ExternalOp::new("/b/{id}", "GET");
        consumer.parameters.push(crate::op::ParamSpec {
            name: "id".into(),
            location: ParamLocation::Path,
            schema: serde_json::json!({"type": "string"}),
            required: true,
        });

        let graph = infer_dependency_graph(&[producer.clone(), consumer.clone()]);
        assert_eq!(graph.consumers_of(&producer), &[consumer]);
    }
}
