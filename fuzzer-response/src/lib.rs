//! Response Processor (spec §4.4): status-code hit counting and
//! resource extraction from 2xx bodies into the resource pool.

use std::collections::HashMap;

use fuzzer_model::ExternalOp;
use fuzzer_pool::ResourcePool;
use tracing::warn;

/// Per-`(op, statusCode)` hit counts, pre-seeded from declared responses
/// at construction (§4.4: "the inner map must exist from construction").
#[derive(Debug, Clone, Default)]
pub struct ResponseProcessor {
    hit_counts: HashMap<ExternalOpKey, HashMap<String, u64>>,
}

/// `ExternalOp` isn't `Hash` (it carries `serde_json::Value` schemas), so
/// the processor indexes on its `(endpoint, method)` identity instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ExternalOpKey {
    endpoint: String,
    method: String,
}

impl From<&ExternalOp> for ExternalOpKey {
    fn from(op: &ExternalOp) -> Self {
        ExternalOpKey {
            endpoint: op.endpoint.clone(),
            method: op.method.clone(),
        }
    }
}

impl ResponseProcessor {
    /// Initialize one hit-count entry per declared numeric status string
    /// for every external op, ignoring `"default"` (§4.4).
    pub fn new(external_ops: &[ExternalOp]) -> Self {
        let mut hit_counts = HashMap::new();
        for op in external_ops {
            let statuses = op
                .declared_status_codes()
                .into_iter()
                .map(|s| (s.to_string(), 0u64))
                .collect();
            hit_counts.insert(ExternalOpKey::from(op), statuses);
        }
        Self { hit_counts }
    }

    /// `process(op, statusCode, body)` (§4.4). Never rejects the run: an
    /// undeclared op is logged and skipped (step 1); a non-JSON 2xx body is
    /// logged and resource extraction is skipped (§7).
    pub fn process(&mut self, op: &ExternalOp, status_code: u16, body: &[u8], pool: &ResourcePool) {
        let key = ExternalOpKey::from(op);
        let Some(statuses) = self.hit_counts.get_mut(&key) else {
            warn!(endpoint = %op.endpoint, method = %op.method, "response for an operation not declared in the OpenAPI document");
            return;
        };

        *statuses.entry(status_code.to_string()).or_insert(0) += 1;

        if status_class(status_code) != Some(2) {
            return;
        }

        let Ok(value) = serde_json::from_slice::<serde_json::Value>(body) else {
            warn!(endpoint = %op.endpoint, "2xx response body is not valid JSON, skipping resource extraction");
            return;
        };

        let root_name = last_path_segment(&op.endpoint);
        pool.insert_from_json(root_name, &value);
    }

    /// `coveredStatusCodeCount()` (§4.4): count of `(op, statusCode)` pairs
    /// with `hitCount > 0`.
    pub fn covered_status_code_count(&self) -> usize {
        self.hit_counts
            .values()
            .flat_map(|statuses| statuses.values())
            .filter(|&&count| count > 0)
            .count()
    }

    pub fn hit_count(&self, op: &ExternalOp, status_code: &str) -> u64 {
        self.hit_counts
            .get(&ExternalOpKey::from(op))
            .and_then(|statuses| statuses.get(status_code))
            .copied()
            .unwrap_or(0)
    }

    /// Every `(endpoint, method)` and its per-status hit counts, for the
    /// persisted system report (§6) — the only reason this needs to be
    /// public beyond `covered_status_code_count`.
    pub fn iter_hit_counts(&self) -> impl Iterator<Item = (&str, &str, &HashMap<String, u64>)> {
        self.hit_counts
            .iter()
            .map(|(key, statuses)| (key.endpoint.as_str(), key.method.as_str(), statuses))
    }
}

/// First digit of a valid 2xx/4xx/... status, or `None` for the
/// not-a-valid-class sentinel `0` used on HTTP failure (§7).
fn status_class(status_code: u16) -> Option<u16> {
    if status_code == 0 {
        return None;
    }
    Some(status_code / 100)
}

fn last_path_segment(endpoint: &str) -> &str {
    endpoint.trim_end_matches('/').rsplit('/').next().unwrap_or(endpoint)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fuzzer_model::Resource;
    use serde_json::json;

    fn op() -> ExternalOp {
        let mut op = ExternalOp::new("/orders", "POST");
        op.responses.insert("201".into(), json!({}));
        op.responses.insert("400".into(), json!({}));
        op.responses.insert("default".into(), json!({}));
        op
    }

    #[test]
    fn undeclared_op_is_skipped_without_panicking() {
        let mut processor = ResponseProcessor::new(&[]);
        let pool = ResourcePool::new();
        processor.process(&op(), 201, b"{}", &pool);
        assert_eq!(processor.covered_status_code_count(), 0);
    }

    #[test]
    fn declared_status_keys_start_at_zero_and_default_is_ignored() {
        let processor = ResponseProcessor::new(&[op()]);
        assert_eq!(processor.hit_count(&op(), "201"), 0);
        assert_eq!(processor.hit_count(&op(), "400"), 0);
        assert_eq!(processor.covered_status_code_count(), 0);
    }

    #[test]
    fn two_xx_response_extracts_resources_under_last_path_segment() {
        let mut processor = ResponseProcessor::new(&[op()]);
        let pool = ResourcePool::new();
        processor.process(&op(), 201, br#"{"id": "o1"}"#, &pool);

        assert_eq!(processor.hit_count(&op(), "201"), 1);
        assert_eq!(processor.covered_status_code_count(), 1);
        assert_eq!(pool.by_name("id"), vec![Resource::String("o1".into())]);
        assert_eq!(pool.by_name("orders").len(), 1);
    }

    #[test]
    fn non_json_2xx_body_skips_extraction_but_still_counts_hit() {
        let mut processor = ResponseProcessor::new(&[op()]);
        let pool = ResourcePool::new();
        processor.process(&op(), 201, b"not json", &pool);
        assert_eq!(processor.hit_count(&op(), "201"), 1);
        assert!(pool.is_empty());
    }

    #[test]
    fn zero_status_from_http_failure_is_never_counted_as_coverage() {
        let mut processor = ResponseProcessor::new(&[op()]);
        let pool = ResourcePool::new();
        processor.process(&op(), 0, b"", &pool);
        assert_eq!(processor.covered_status_code_count(), 0);
    }
}
