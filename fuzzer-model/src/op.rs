use std::cmp::Ordering;
use std::collections::HashMap;

use serde_json::Value;

/// Where a parameter is carried on the wire. Only `Path` and `Query` are
/// supported by request population (§4.1); `Header` is recognized so it can
/// be logged and skipped rather than silently misplaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamLocation {
    Path,
    Query,
    Header,
}

impl ParamLocation {
    pub fn from_openapi_str(s: &str) -> Option<ParamLocation> {
        match s {
            "path" => Some(ParamLocation::Path),
            "query" => Some(ParamLocation::Query),
            "header" => Some(ParamLocation::Header),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub name: String,
    pub location: ParamLocation,
    pub schema: Value,
    pub required: bool,
}

/// One `(endpoint, method)` pair declared in the system's public OpenAPI
/// document. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalOp {
    /// e.g. `/orders/{id}`.
    pub endpoint: String,
    /// Uppercase HTTP verb, e.g. `GET`.
    pub method: String,
    pub parameters: Vec<ParamSpec>,
    /// First `application/json` request-body schema, if declared.
    pub request_body_schema: Option<Value>,
    /// Status string (e.g. `"200"`) or `"default"` -> response schema
    /// (unused by the core beyond key presence, kept for completeness).
    pub responses: HashMap<String, Value>,
}

impl ExternalOp {
    pub fn new(endpoint: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            method: method.into().to_uppercase(),
            parameters: Vec::new(),
            request_body_schema: None,
            responses: HashMap::new(),
        }
    }

    /// Declared status codes, excluding `"default"`, as the numeric class
    /// digit (`2`, `4`, `5`, ...). Used by the Response Processor to
    /// initialize hit-count keys (§4.4).
    pub fn declared_status_codes(&self) -> Vec<&str> {
        self.responses
            .keys()
            .filter(|k| k.as_str() != "default")
            .map(String::as_str)
            .collect()
    }

    /// Parameter names in the given location, used by dataflow/dependency
    /// inference (parameter-name matching, §3).
    pub fn param_names(&self, location: ParamLocation) -> Vec<&str> {
        self.parameters
            .iter()
            .filter(|p| p.location == location)
            .map(|p| p.name.as_str())
            .collect()
    }

    /// Path and query parameter names combined, used by reachability
    /// seeding (§4.7) where the parameter's `in` doesn't matter, only its
    /// name.
    pub fn param_names_all(&self) -> Vec<&str> {
        self.parameters
            .iter()
            .filter(|p| p.location != ParamLocation::Header)
            .map(|p| p.name.as_str())
            .collect()
    }

    /// Property names declared by the request body schema (top-level
    /// `properties` keys), used for producer/consumer matching.
    pub fn body_property_names(&self) -> Vec<String> {
        self.request_body_schema
            .as_ref()
            .and_then(|s| s.get("properties"))
            .and_then(Value::as_object)
            .map(|props| props.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Property names declared in 2xx response schemas — the "produced"
    /// resource names used for the static dependency graph.
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
}

impl Eq for ExternalOp {}

impl PartialOrd for ExternalOp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Total order over `ExternalOp`s: lexicographic over endpoint then method,
/// used to deterministically deduplicate extension candidate sets (§4.1.1).
impl Ord for ExternalOp {
    fn cmp(&self, other: &Self) -> Ordering {
        self.endpoint
            .cmp(&other.endpoint)
            .then_with(|| self.method.cmp(&other.method))
    }
}

/// `(serviceName, endpoint, method)` triple declared in an internal
/// service's OpenAPI document. Service names are normalized on ingest via
/// [`normalize_service_name`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InternalEndpoint {
    pub service: String,
    pub endpoint: String,
    pub method: String,
}

impl InternalEndpoint {
    pub fn new(service: impl Into<String>, endpoint: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            service: normalize_service_name(&service.into()),
            endpoint: endpoint.into(),
            method: method.into().to_uppercase(),
        }
    }
}

/// `standardCase = lower(strip_non_alnum)` with a trailing `"service"`
/// stripped. A single pure function used uniformly at edge construction and
/// call-info matching (§4.6, §9) so "CartService" and "cart-service" always
/// collapse to the same key. Idempotent (§8).
pub fn normalize_service_name(name: &str) -> String {
    let lower: String = name
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(|c| c.to_lowercase())
        .collect();
    lower.strip_suffix("service").unwrap_or(&lower).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_collapses_casing_and_separators() {
        assert_eq!(normalize_service_name("CartService"), "cart");
        assert_eq!(normalize_service_name("cart-service"), "cart");
        assert_eq!(normalize_service_name("cart_service"), "cart");
        assert_eq!(normalize_service_name("Cart"), "cart");
    }

    #[test]
    fn normalization_is_idempotent() {
        let once = normalize_service_name("CartService");
        let twice = normalize_service_name(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn external_op_total_order_is_lexicographic() {
        let a = ExternalOp::new("/a", "GET");
        let b = ExternalOp::new("/a", "POST");
        let c = ExternalOp::new("/b", "GET");
        assert!(a < b);
        assert!(b < c);
    }
}
