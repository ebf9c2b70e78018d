//! Distributed trace ingestion (spec §4.5): the backend-agnostic
//! `Trace`/`Span` model, Jaeger/Tempo clients, trace deduplication, and the
//! trace -> `CallInfo` conversion consumed by `fuzzer-graph`.

mod backend;
mod call_info;
mod error;
mod manager;
mod span;
mod trace;

pub use backend::{AnyTraceBackend, JaegerBackend, TempoBackend, TraceBackend};
pub use call_info::{to_call_infos, CallInfo};
pub use error::TraceError;
pub use manager::{TraceManager, DEFAULT_TRACE_SETTLE_MS};
pub use span::{Span, SpanKind, SpanReference};
pub use trace::Trace;
