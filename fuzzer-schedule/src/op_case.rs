use std::collections::HashMap;

use fuzzer_model::{ExternalOp, Resource};
use uuid::Uuid;

/// Default `energy` bounds (§3: `MIN_OP_ENERGY..MAX_OP_ENERGY`, default `0..20`).
pub const MIN_OP_ENERGY: i32 = 0;
pub const MAX_OP_ENERGY: i32 = 20;

/// Mutable container for one invocation of an `ExternalOp` (§3).
///
/// Invariant (§3/§8): `path_params`/`query_params` are always the string
/// projection of `path_param_resources`/`query_param_resources`; the only
/// way to set either side is through `set_path_param`/`set_query_param`/
/// `set_body`, which update both together.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationCase {
    pub id: Uuid,
    pub op: ExternalOp,
    pub executed_count: u32,
    pub energy: i32,

    pub headers: HashMap<String, String>,
    pub path_params: HashMap<String, String>,
    pub query_params: HashMap<String, String>,
    pub body: Option<Vec<u8>>,

    pub path_param_resources: HashMap<String, Resource>,
    pub query_param_resources: HashMap<String, Resource>,
    pub body_resource: Option<Resource>,

    pub response_status: Option<u16>,
    pub response_headers: HashMap<String, String>,
    pub response_body: Vec<u8>,
}

impl OperationCase {
    pub fn new(op: ExternalOp) -> Self {
        Self {
            id: Uuid::new_v4(),
            op,
            executed_count: 0,
            energy: 0,
            headers: HashMap::new(),
            path_params: HashMap::new(),
            query_params: HashMap::new(),
            body: None,
            path_param_resources: HashMap::new(),
            query_param_resources: HashMap::new(),
            body_resource: None,
            response_status: None,
            response_headers: HashMap::new(),
            response_body: Vec::new(),
        }
    }

    /// `SetRequestPathByResources` (§3): sets both the resource view and its
    /// string projection together. Arrays project as a comma-joined string,
    /// never JSON (`Resource::raw_string`).
    pub fn set_path_param(&mut self, name: impl Into<String>, resource: Resource) {
        let name = name.into();
        self.path_params.insert(name.clone(), resource.raw_string());
        self.path_param_resources.insert(name, resource);
    }

    /// `SetRequestQueryByResources` (§3).
    pub fn set_query_param(&mut self, name: impl Into<String>, resource: Resource) {
        let name = name.into();
        self.query_params.insert(name.clone(), resource.raw_string());
        self.query_param_resources.insert(name, resource);
    }

    /// `SetRequestBodyByResource` (§3): the body's scalar projection is its
    /// JSON encoding, not a raw string, since the body is always sent as a
    /// JSON document.
    pub fn set_body(&mut self, resource: Resource) {
        self.body = serde_json::to_vec(&resource.to_json()).ok();
        self.body_resource = Some(resource);
    }

    /// Whether the invariant holds: every scalar param map entry equals the
    /// string projection of its resource-view counterpart (§8).
    pub fn request_views_are_consistent(&self) -> bool {
        self.path_param_resources
            .iter()
            .all(|(name, resource)| self.path_params.get(name) == Some(&resource.raw_string()))
            && self
                .query_param_resources
                .iter()
                .all(|(name, resource)| self.query_params.get(name) == Some(&resource.raw_string()))
    }

    /// Reset for a freshly-extended scenario (§4.1.1): fresh identity, zero
    /// execution count and energy. Request/response state is left as-is —
    /// it is repopulated by the next `populate()` pass.
    pub fn reset(&mut self) {
        self.id = Uuid::new_v4();
        self.executed_count = 0;
        self.energy = MIN_OP_ENERGY;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn set_path_param_keeps_scalar_and_resource_views_in_sync() {
        let mut case = OperationCase::new(ExternalOp::new("/a/{id}", "GET"));
        case.set_path_param("id", Resource::String("x".into()));
        assert_eq!(case.path_params.get("id"), Some(&"x".to_string()));
        assert!(case.request_views_are_consistent());
    }

    #[test]
    fn array_path_param_projects_as_comma_joined_not_json() {
        let mut case = OperationCase::new(ExternalOp::new("/a", "GET"));
        case.set_query_param(
            "tags",
            Resource::Array(vec![Resource::String("a".into()), Resource::String("b".into())]),
        );
        assert_eq!(case.query_params.get("tags"), Some(&"a,b".to_string()));
    }

    #[test]
    fn set_body_encodes_as_json() {
        let mut case = OperationCase::new(ExternalOp::new("/a", "POST"));
        case.set_body(Resource::from_value(&json!({"id": "x"})));
        assert_eq!(case.body, Some(br#"{"id":"x"}"#.to_vec()));
    }

    #[test]
    fn reset_assigns_a_fresh_id_and_zeroes_execution_state() {
        let mut case = OperationCase::new(ExternalOp::new("/a", "GET"));
        case.executed_count = 3;
        case.energy = 10;
        let old_id = case.id;
        case.reset();
        assert_ne!(case.id, old_id);
        assert_eq!(case.executed_count, 0);
        assert_eq!(case.energy, MIN_OP_ENERGY);
    }
}
