use fuzzer_graph::{CallInfoGraph, ReachabilityMap};
use fuzzer_response::ResponseProcessor;

/// Scalar coverage summary at loop exit (§4.9), embedded in [`LoopOutput`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LoopReport {
    pub covered_status_code_count: usize,
    pub covered_edge_count: usize,
    pub edge_coverage: f64,
    pub total_edges: usize,
}

/// Everything [`crate::FuzzerLoop::run`] hands back at loop exit: the
/// scalar summary plus the owned final state of every coverage-bearing
/// component, so `fuzzer-cli::report` can build the full persisted JSON
/// documents (§6) without the loop needing to know their shape.
pub struct LoopOutput {
    pub report: LoopReport,
    pub response_processor: ResponseProcessor,
    pub call_info_graph: CallInfoGraph,
    pub reachability: ReachabilityMap,
}
