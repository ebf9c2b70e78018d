use std::collections::HashMap;

use fuzzer_model::{normalize_service_name, InternalEndpoint};
use fuzzer_trace::CallInfo;

/// One edge of the runtime call-info graph (§4.6), initialized from the
/// static dataflow graph and scored by hit count as traces are observed.
#[derive(Debug, Clone, PartialEq)]
pub struct CallInfoEdge {
    pub source: InternalEndpoint,
    pub target: InternalEndpoint,
    pub hit_count: u64,
}

/// Directed multigraph over internal endpoints (§4.6). `InternalEndpoint`
/// already carries a normalized service name (constructed via
/// `InternalEndpoint::new`), so edge construction and call-info matching
/// both go through the same `normalize_service_name` function (§9).
#[derive(Debug, Clone, Default)]
pub struct CallInfoGraph {
    edges: Vec<CallInfoEdge>,
}

impl CallInfoGraph {
    /// Build from the static dataflow graph (§3): one zero-hit edge per
    /// `(source, target)` pair.
    pub fn from_dataflow_edges(edges: &[(InternalEndpoint, InternalEndpoint)]) -> Self {
        Self {
            edges: edges
                .iter()
                .map(|(source, target)| CallInfoEdge {
                    source: source.clone(),
                    target: target.clone(),
                    hit_count: 0,
                })
                .collect(),
        }
    }

    pub fn edges(&self) -> &[CallInfoEdge] {
        &self.edges
    }

    /// §4.6: group call infos by (normalized) source service, then for
    /// every existing edge whose source matches, bump its hit count when
    /// the target service matches and the trace's method name's last
    /// `./`-separated segment equals either the edge's target *or* source
    /// method (§9: both directions preserved, open question resolved as OR).
    pub fn update_from_call_infos(&mut self, call_infos: &[CallInfo]) {
        let mut by_source: HashMap<String, Vec<&CallInfo>> = HashMap::new();
        for info in call_infos {
            by_source
                .entry(normalize_service_name(&info.source_service))
                .or_default()
                .push(info);
        }

        for edge in &mut self.edges {
            let Some(candidates) = by_source.get(&edge.source.service) else {
                continue;
            };
            for call_info in candidates {
                if normalize_service_name(&call_info.target_service) != edge.target.service {
                    continue;
                }
                let method_segment = last_path_segment(&call_info.method_trace_name);
                if method_segment == edge.target.method || method_segment == edge.source.method {
                    edge.hit_count += 1;
                }
            }
        }
    }

    /// Count of edges with `hit_count > 0` (§4.6 "edge coverage" numerator;
    /// used by `FuzzingSnapshot` as the raw edge count, not the ratio).
    pub fn covered_edge_count(&self) -> usize {
        self.edges.iter().filter(|e| e.hit_count > 0).count()
    }

    /// `edgeCoverage() = |{e : hitCount>0}| / |E|` (§4.6).
    pub fn edge_coverage(&self) -> f64 {
        if self.edges.is_empty() {
            return 0.0;
        }
        self.covered_edge_count() as f64 / self.edges.len() as f64
    }
}

/// Last segment after splitting on `.` or `/` (§4.6).
fn last_path_segment(name: &str) -> &str {
    name.rsplit(['.', '/']).next().unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fuzzer_model::InternalEndpoint;

    fn endpoint(service: &str, method: &str) -> InternalEndpoint {
        InternalEndpoint::new(service, "/op", method)
    }

    #[test]
    fn bumps_hit_count_when_target_method_matches() {
        let edges = vec![(endpoint("frontend", "Ping"), endpoint("backend", "GET"))];
        let mut graph = CallInfoGraph::from_dataflow_edges(&edges);

        graph.update_from_call_infos(&[CallInfo {
            source_service: "FrontendService".into(),
            target_service: "backend-service".into(),
            method_trace_name: "/pkg.Svc/GET".into(),
        }]);

        assert_eq!(graph.edges()[0].hit_count, 1);
    }

    #[test]
    fn matches_source_method_as_well_as_target_per_open_question() {
        let edges = vec![(endpoint("frontend", "Ping"), endpoint("backend", "Get"))];
        let mut graph = CallInfoGraph::from_dataflow_edges(&edges);

        graph.update_from_call_infos(&[CallInfo {
            source_service: "frontend".into(),
            target_service: "backend".into(),
            method_trace_name: "Ping".into(),
        }]);

        assert_eq!(graph.edges()[0].hit_count, 1);
    }

    #[test]
    fn non_matching_service_pair_does_not_bump() {
        let edges = vec![(endpoint("frontend", "Ping"), endpoint("backend", "Get"))];
        let mut graph = CallInfoGraph::from_dataflow_edges(&edges);

        graph.update_from_call_infos(&[CallInfo {
            source_service: "frontend".into(),
            target_service: "other".into(),
            method_trace_name: "Get".into(),
        }]);

        assert_eq!(graph.edges()[0].hit_count, 0);
    }

    #[test]
    fn edge_coverage_is_covered_over_total() {
        let edges = vec![
            (endpoint("a", "m1"), endpoint("b", "m2")),
            (endpoint("c", "m3"), endpoint("d", "m4")),
        ];
        let mut graph = CallInfoGraph::from_dataflow_edges(&edges);
        graph.update_from_call_infos(&[CallInfo {
            source_service: "a".into(),
            target_service: "b".into(),
            method_trace_name: "m2".into(),
        }]);
        assert_eq!(graph.edge_coverage(), 0.5);
    }
}
