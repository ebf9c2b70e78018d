use crate::span::SpanKind;
use crate::trace::Trace;

/// A single observed cross-service call, emitted by trace conversion
/// (§4.5). Not yet matched against the static dataflow graph — that
/// happens in `fuzzer-graph::CallInfoGraph::update_from_call_infos`.
#[derive(Debug, Clone, PartialEq)]
pub struct CallInfo {
    pub source_service: String,
    pub target_service: String,
    pub method_trace_name: String,
}

/// Trace -> CallInfo conversion (§4.5): for every non-internal span with a
/// non-internal, different-service parent, emit one `CallInfo`.
pub fn to_call_infos(traces: &[Trace]) -> Vec<CallInfo> {
    let mut out = Vec::new();
    for trace in traces {
        for span in trace.spans.values() {
            if span.kind == SpanKind::Internal {
                continue;
            }
            let Some(parent_id) = &span.parent_id else { continue };
            let Some(parent) = trace.spans.get(parent_id) else { continue };
            if parent.kind == SpanKind::Internal {
                continue;
            }
            if parent.service_name == span.service_name {
                continue;
            }
            let Some(method_trace_name) = parent
                .retrieve_called_method()
                .or_else(|| span.retrieve_called_method())
            else {
                continue;
            };
            out.push(CallInfo {
                source_service: parent.service_name.clone(),
                target_service: span.service_name.clone(),
                method_trace_name,
            });
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::Span;
    use std::collections::HashMap;

    fn span(id: &str, parent: Option<&str>, service: &str, kind: SpanKind, op: &str) -> Span {
        Span {
            trace_id: "t1".into(),
            span_id: id.into(),
            parent_id: parent.map(String::from),
            operation_name: op.into(),
            kind,
            start_time: 0,
            duration: 0,
            references: vec![],
            tags: HashMap::new(),
            service_name: service.into(),
        }
    }

    #[test]
    fn emits_call_info_across_a_server_client_hop() {
        let mut trace = Trace::new("t1");
        trace.insert(span("a", None, "frontend", SpanKind::Server, "/pkg.Svc/Ping"));
        trace.insert(span("b", Some("a"), "backend", SpanKind::Client, "ignored"));

        let infos = to_call_infos(&[trace]);
        assert_eq!(infos.len(), 1);
        assert_eq!(infos[0].source_service, "frontend");
        assert_eq!(infos[0].target_service, "backend");
        assert_eq!(infos[0].method_trace_name, "/pkg.Svc/Ping");
    }

    #[test]
    fn skips_intra_service_hops() {
        let mut trace = Trace::new("t1");
        trace.insert(span("a", None, "cart", SpanKind::Server, "op"));
        trace.insert(span("b", Some("a"), "cart", SpanKind::Client, "op"));
        assert!(to_call_infos(&[trace]).is_empty());
    }

    #[test]
    fn skips_internal_parent_or_span() {
        let mut trace = Trace::new("t1");
        trace.insert(span("a", None, "cart", SpanKind::Internal, "op"));
        trace.insert(span("b", Some("a"), "checkout", SpanKind::Client, "op"));
        assert!(to_call_infos(&[trace]).is_empty());
    }
}
