use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use crate::error::TraceError;
use crate::span::{Span, SpanKind, SpanReference};
use crate::trace::Trace;

/// Jaeger's `/api/traces/...` JSON shape. Grafana Tempo's query-frontend
/// mirrors this shape for Jaeger-compatibility, so both backends share this
/// parser (§6: both must normalize into the Simplified form before the
/// core sees them).
#[derive(Debug, Deserialize)]
pub struct JaegerEnvelope {
    pub data: Vec<JaegerTrace>,
}

#[derive(Debug, Deserialize)]
pub struct JaegerTrace {
    #[serde(rename = "traceID")]
    pub trace_id: String,
    pub spans: Vec<JaegerSpan>,
    #[serde(default)]
    pub processes: HashMap<String, JaegerProcess>,
}

#[derive(Debug, Deserialize)]
pub struct JaegerSpan {
    #[serde(rename = "spanID")]
    pub span_id: String,
    #[serde(rename = "operationName")]
    pub operation_name: String,
    #[serde(rename = "startTime")]
    pub start_time: i64,
    pub duration: i64,
    #[serde(default)]
    pub references: Vec<JaegerReference>,
    #[serde(default)]
    pub tags: Vec<JaegerTag>,
    #[serde(rename = "processID")]
    pub process_id: String,
}

#[derive(Debug, Deserialize)]
pub struct JaegerReference {
    #[serde(rename = "refType")]
    pub ref_type: String,
    #[serde(rename = "spanID")]
    pub span_id: String,
}

#[derive(Debug, Deserialize)]
pub struct JaegerTag {
    pub key: String,
    pub value: Value,
}

#[derive(Debug, Deserialize)]
pub struct JaegerProcess {
    #[serde(rename = "serviceName")]
    pub service_name: String,
}

/// Parse a full `/api/traces` (or `/api/traces/{id}`) response body into
/// zero or more Simplified `Trace`s.
pub fn parse_traces(body: &str) -> Result<Vec<Trace>, TraceError> {
    let envelope: JaegerEnvelope =
        serde_json::from_str(body).map_err(|e| TraceError::Parse(e.to_string()))?;
    Ok(envelope.data.into_iter().map(parse_trace).collect())
}

fn parse_trace(raw: JaegerTrace) -> Trace {
    let mut trace = Trace::new(raw.trace_id.clone());
    for span in raw.spans {
        let service_name = raw
            .processes
            .get(&span.process_id)
            .map(|p| p.service_name.clone())
            .unwrap_or_default();

        let tags: HashMap<String, Value> = span
            .tags
            .iter()
            .map(|t| (t.key.clone(), t.value.clone()))
            .collect();

        let kind = tags
            .get("span.kind")
            .and_then(Value::as_str)
            .map(SpanKind::from_str)
            .unwrap_or(SpanKind::Unspecified);

        let parent_id = span
            .references
            .iter()
            .find(|r| r.ref_type == "CHILD_OF")
            .map(|r| r.span_id.clone());

        trace.insert(Span {
            trace_id: raw.trace_id.clone(),
            span_id: span.span_id,
            parent_id,
            operation_name: span.operation_name,
            kind,
            start_time: span.start_time,
            duration: span.duration,
            references: span
                .references
                .into_iter()
                .map(|r| SpanReference {
                    ref_type: r.ref_type,
                    span_id: r.span_id,
                })
                .collect(),
            tags,
            service_name,
        });
    }
    trace
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_jaeger_envelope_into_simplified_traces() {
        let body = r#"{"data":[{"traceID":"t1","processes":{"p1":{"serviceName":"frontend"}},
            "spans":[{"spanID":"s1","operationName":"/ping","startTime":1,"duration":2,
            "references":[],"tags":[{"key":"span.kind","value":"server"}],"processID":"p1"}]}]}"#;
        let traces = parse_traces(body).unwrap();
        assert_eq!(traces.len(), 1);
        let span = &traces[0].spans["s1"];
        assert_eq!(span.service_name, "frontend");
        assert_eq!(span.kind, SpanKind::Server);
    }
}
