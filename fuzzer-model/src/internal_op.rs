use std::collections::HashMap;

use serde_json::Value;

use crate::op::{InternalEndpoint, ParamLocation, ParamSpec};

/// The operation-shaped payload of an internal service endpoint — same
/// shape as `ExternalOp` (parameters, request body schema, responses), but
/// keyed by `InternalEndpoint` (service-qualified) rather than bare
/// `(endpoint, method)`.
#[derive(Debug, Clone, PartialEq)]
pub struct InternalOperation {
    pub key: InternalEndpoint,
    pub parameters: Vec<ParamSpec>,
    pub request_body_schema: Option<Value>,
    pub responses: HashMap<String, Value>,
}

impl InternalOperation {
    pub fn new(key: InternalEndpoint) -> Self {
        Self {
            key,
            parameters: Vec::new(),
            request_body_schema: None,
            responses: HashMap::new(),
        }
    }

    pub fn param_names(&self, location: ParamLocation) -> Vec<&str> {
        self.parameters
            .iter()
            .filter(|p| p.location == location)
            .map(|p| p.name.as_str())
            .collect()
    }

    /// Path and query parameter names combined (§4.7 reachability seeding).
    pub fn param_names_all(&self) -> Vec<&str> {
        self.parameters
            .iter()
            .filter(|p| p.location != ParamLocation::Header)
            .map(|p| p.name.as_str())
            .collect()
    }

    pub fn body_property_names(&self) -> Vec<String> {
        self.request_body_schema
            .as_ref()
            .and_then(|s| s.get("properties"))
            .and_then(Value::as_object)
            .map(|props| props.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn produced_property_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        for (status, schema) in &self.responses {
            if status.as_bytes().first() != Some(&b'2') {
                continue;
            }
            if let Some(props) = schema.get("properties").and_then(Value::as_object) {
                names.extend(props.keys().cloned());
            }
        }
        names
    }

    /// All parameter/body/produced names this operation either consumes or
    /// produces, used as the matching surface for dataflow-edge inference.
    fn consumed_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .param_names(ParamLocation::Path)
            .into_iter()
            .chain(self.param_names(ParamLocation::Query))
            .map(String::from)
            .collect();
        names.extend(self.body_property_names());
        names
    }
}

/// Infer dataflow edges between internal operations in *different*
/// services whenever a parameter/body name on one side matches a
/// parameter/body/produced name on the other (§3: "edges inferred by
/// parameter-name matching between service pairs"). Non-goals (§1) forbid
/// inferring edges any other way.
pub fn infer_dataflow_edges(ops: &[InternalOperation]) -> Vec<(InternalEndpoint, InternalEndpoint)> {
    let mut edges = Vec::new();
    for producer in ops {
        let produced = producer.produced_property_names();
        if produced.is_empty() {
            continue;
        }
        for consumer in ops {
            if consumer.key.service == producer.key.service {
                continue;
            }
            let consumed = consumer.consumed_names();
            if produced.iter().any(|p| consumed.iter().any(|c| c == p)) {
                edges.push((producer.key.clone(), consumer.key.clone()));
            }
        }
    }
    edges
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn op(service: &str, endpoint: &str, method: &str) -> InternalOperation {
        InternalOperation::new(InternalEndpoint::new(service, endpoint, method))
    }

    #[test]
    fn edges_require_different_services_and_a_name_match() {
        let mut producer = op("cart", "/cart", "POST");
        producer.responses.insert(
            "200".into(),
            json!({"properties": {"cartId": {"type": "string"}}}),
        );

        let mut consumer = op("checkout", "/checkout/{cartId}", "POST");
        consumer.parameters.push(ParamSpec {
            name: "cartId".into(),
            location: ParamLocation::Path,
            schema: json!({"type": "string"}),
            required: true,
        });

        let same_service_consumer = {
            let mut c = op("cart", "/cart/{cartId}", "GET");
            c.parameters.push(ParamSpec {
                name: "cartId".into(),
                location: ParamLocation::Path,
                schema: json!({"type": "string"}),
                required: true,
            });
            c
        };

        let edges = infer_dataflow_edges(&[producer.clone(), consumer.clone(), same_service_consumer]);
        assert_eq!(edges, vec![(producer.key, consumer.key)]);
    }
}
