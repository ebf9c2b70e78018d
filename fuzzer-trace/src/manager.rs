use std::collections::HashMap;
use std::time::Duration;

use tracing::{info, warn};

use crate::backend::{AnyTraceBackend, TraceBackend};
use crate::call_info::{to_call_infos, CallInfo};
use crate::error::TraceError;
use crate::trace::Trace;

/// Default settle delay before fetching a trace by id (§4.5), chosen from
/// the middle of the configurable 500-3000ms range.
pub const DEFAULT_TRACE_SETTLE_MS: u64 = 1000;

/// Fetches traces by id (after a settle delay) or in bulk, deduplicating by
/// trace id in an in-memory store (§4.5).
pub struct TraceManager {
    backend: AnyTraceBackend,
    settle: Duration,
    seen: HashMap<String, Trace>,
}

impl TraceManager {
    pub fn new(backend: AnyTraceBackend, settle_ms: u64) -> Self {
        Self {
            backend,
            settle: Duration::from_millis(settle_ms),
            seen: HashMap::new(),
        }
    }

    /// Sleep `TRACE_SETTLE` then fetch the trace by id, deduplicating
    /// against traces already ingested this run. Returns `None` (and logs)
    /// on any backend error or missing trace — §7 treats this as
    /// "continue, no graph update", never fatal.
    pub async fn fetch_by_id(&mut self, trace_id: &str) -> Option<Trace> {
        if let Some(existing) = self.seen.get(trace_id) {
            return Some(existing.clone());
        }

        tokio::time::sleep(self.settle).await;

        match self.backend.fetch_by_id(trace_id).await {
            Ok(Some(trace)) => {
                self.seen.insert(trace.trace_id.clone(), trace.clone());
                Some(trace)
            }
            Ok(None) => {
                warn!(trace_id, "trace not found at backend after settle delay");
                None
            }
            Err(err) => {
                warn!(trace_id, error = %err, "trace fetch failed");
                None
            }
        }
    }

    pub async fn fetch_all(&mut self) -> Vec<Trace> {
        match self.backend.fetch_all().await {
            Ok(traces) => {
                for trace in &traces {
                    self.seen.insert(trace.trace_id.clone(), trace.clone());
                }
                info!(count = traces.len(), "fetched all traces from backend");
                traces
            }
            Err(err) => {
                warn!(error = %err, "bulk trace fetch failed");
                Vec::new()
            }
        }
    }

    /// Trace -> CallInfo conversion (§4.5), exposed on the manager so the
    /// fuzzer loop doesn't need to import `call_info` directly.
    pub fn to_call_infos(&self, traces: &[Trace]) -> Vec<CallInfo> {
        to_call_infos(traces)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::JaegerBackend;

    #[tokio::test]
    async fn dedupes_traces_already_seen_without_refetching() {
        let mut manager = TraceManager::new(
            AnyTraceBackend::Jaeger(JaegerBackend::new("http://unreachable.invalid")),
            0,
        );
        manager.seen.insert("t1".into(), Trace::new("t1"));
        let fetched = manager.fetch_by_id("t1").await;
        assert_eq!(fetched.map(|t| t.trace_id), Some("t1".to_string()));
    }
}
