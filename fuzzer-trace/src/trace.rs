use std::collections::HashMap;

use crate::span::Span;

/// A collection of spans sharing a trace id (§2/§4.5): `spanMap` keyed by
/// span id, the shape every backend normalizes into.
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    pub trace_id: String,
    pub spans: HashMap<String, Span>,
}

impl Trace {
    pub fn new(trace_id: impl Into<String>) -> Self {
        Self {
            trace_id: trace_id.into(),
            spans: HashMap::new(),
        }
    }

    pub fn insert(&mut self, span: Span) {
        self.spans.insert(span.span_id.clone(), span);
    }
}
