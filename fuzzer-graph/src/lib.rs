//! Runtime graphs fed by trace ingestion (spec §4.6-4.8): the call-info
//! graph, the bidirectional reachability map, and the fuzzing snapshot that
//! turns both into the `gainedNewCoverage` signal.

mod call_info;
mod reachability;
mod snapshot;

pub use call_info::{CallInfoEdge, CallInfoGraph};
pub use reachability::ReachabilityMap;
pub use snapshot::FuzzingSnapshot;
