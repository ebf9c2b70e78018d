use std::collections::HashMap;

use serde_json::Value;

/// Span kind, normalized from whatever vocabulary the backend uses (OTel
/// span kinds, Jaeger tags, Zipkin annotations, ...) into the six values
/// the core cares about (§4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanKind {
    Internal,
    Server,
    Client,
    Producer,
    Consumer,
    Unspecified,
}

impl SpanKind {
    pub fn from_str(s: &str) -> SpanKind {
        match s.to_ascii_lowercase().as_str() {
            "internal" => SpanKind::Internal,
            "server" => SpanKind::Server,
            "client" => SpanKind::Client,
            "producer" => SpanKind::Producer,
            "consumer" => SpanKind::Consumer,
            _ => SpanKind::Unspecified,
        }
    }
}

/// A span reference, e.g. `CHILD_OF` / `FOLLOWS_FROM` in Jaeger vocabulary.
#[derive(Debug, Clone, PartialEq)]
pub struct SpanReference {
    pub ref_type: String,
    pub span_id: String,
}

/// Backend-agnostic span shape every `TraceBackend` implementation must
/// normalize its native response into before it reaches the core (§4.5/§6).
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub trace_id: String,
    pub span_id: String,
    pub parent_id: Option<String>,
    pub operation_name: String,
    pub kind: SpanKind,
    pub start_time: i64,
    pub duration: i64,
    pub references: Vec<SpanReference>,
    pub tags: HashMap<String, Value>,
    pub service_name: String,
}

impl Span {
    /// Best-effort RPC/HTTP method name from this span's tags (§4.5: "an
    /// RPC/HTTP attribute from tags"). Tries the common vocabularies in
    /// order and falls back to the bare operation name.
    pub fn retrieve_called_method(&self) -> Option<String> {
        for key in ["rpc.method", "http.route", "http.target", "http.url"] {
            if let Some(Value::String(s)) = self.tags.get(key) {
                if !s.is_empty() {
                    return Some(s.clone());
                }
            }
        }
        if !self.operation_name.is_empty() {
            return Some(self.operation_name.clone());
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn span(tags: HashMap<String, Value>, operation_name: &str) -> Span {
        Span {
            trace_id: "t1".into(),
            span_id: "s1".into(),
            parent_id: None,
            operation_name: operation_name.into(),
            kind: SpanKind::Server,
            start_time: 0,
            duration: 0,
            references: vec![],
            tags,
            service_name: "cart".into(),
        }
    }

    #[test]
    fn retrieve_called_method_prefers_rpc_method_tag() {
        let tags = HashMap::from([("rpc.method".to_string(), json!("GetCart"))]);
        assert_eq!(span(tags, "ignored").retrieve_called_method(), Some("GetCart".into()));
    }

    #[test]
    fn retrieve_called_method_falls_back_to_operation_name() {
        let s = span(HashMap::new(), "/pkg.Svc/Ping");
        assert_eq!(s.retrieve_called_method(), Some("/pkg.Svc/Ping".into()));
    }

    #[test]
    fn retrieve_called_method_is_none_when_both_empty() {
        let s = span(HashMap::new(), "");
        assert_eq!(s.retrieve_called_method(), None);
    }
}
