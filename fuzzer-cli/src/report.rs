use std::collections::HashMap;
use std::path::Path;

use chrono::Utc;
use fuzzer_core::LoopOutput;
use serde::Serialize;

/// `system_report_<RFC3339>.json` (§6 persisted outputs): per-operation
/// status-class coverage and the overall scalar summary.
#[derive(Debug, Serialize)]
pub struct SystemReport {
    pub covered_status_code_count: usize,
    pub covered_edge_count: usize,
    pub edge_coverage: f64,
    pub total_edges: usize,
    pub operations: Vec<OperationCoverage>,
}

#[derive(Debug, Serialize)]
pub struct OperationCoverage {
    pub endpoint: String,
    pub method: String,
    pub status_hit_counts: HashMap<String, u64>,
}

/// `internal_service_report_<RFC3339>.json` (§6 persisted outputs): the
/// final call-info graph and the high-confidence reachability map.
#[derive(Debug, Serialize)]
pub struct InternalServiceReport {
    pub edges: Vec<CallInfoEdgeReport>,
    pub high_confidence_reachability: Vec<ReachabilityPairReport>,
}

#[derive(Debug, Serialize)]
pub struct CallInfoEdgeReport {
    pub source_service: String,
    pub source_method: String,
    pub target_service: String,
    pub target_method: String,
    pub hit_count: u64,
}

#[derive(Debug, Serialize)]
pub struct ReachabilityPairReport {
    pub external_endpoint: String,
    pub external_method: String,
    pub internal_service: String,
    pub internal_endpoint: String,
    pub internal_method: String,
}

impl SystemReport {
    pub fn from_loop_output(output: &LoopOutput) -> Self {
        let operations = output
            .response_processor
            .iter_hit_counts()
            .map(|(endpoint, method, statuses)| OperationCoverage {
                endpoint: endpoint.to_string(),
                method: method.to_string(),
                status_hit_counts: statuses.clone(),
            })
            .collect();

        Self {
            covered_status_code_count: output.report.covered_status_code_count,
            covered_edge_count: output.report.covered_edge_count,
            edge_coverage: output.report.edge_coverage,
            total_edges: output.report.total_edges,
            operations,
        }
    }
}

impl InternalServiceReport {
    pub fn from_loop_output(output: &LoopOutput) -> Self {
        let edges = output
            .call_info_graph
            .edges()
            .iter()
            .map(|edge| CallInfoEdgeReport {
                source_service: edge.source.service.clone(),
                source_method: edge.source.method.clone(),
                target_service: edge.target.service.clone(),
                target_method: edge.target.method.clone(),
                hit_count: edge.hit_count,
            })
            .collect();

        let high_confidence_reachability = output
            .reachability
            .high_confidence_pairs()
            .into_iter()
            .map(|(external, internal)| ReachabilityPairReport {
                external_endpoint: external.endpoint,
                external_method: external.method,
                internal_service: internal.service,
                internal_endpoint: internal.endpoint,
                internal_method: internal.method,
            })
            .collect();

        Self {
            edges,
            high_confidence_reachability,
        }
    }
}

/// Write both persisted reports under `output_dir`, timestamped with the
/// same RFC3339 instant (§6: `system_report_<RFC3339>.json` /
/// `internal_service_report_<RFC3339>.json`).
pub fn write_reports(output: &LoopOutput, output_dir: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(output_dir)?;
    let timestamp = Utc::now().to_rfc3339();

    let system_report = SystemReport::from_loop_output(output);
    let system_path = output_dir.join(format!("system_report_{timestamp}.json"));
    std::fs::write(&system_path, serde_json::to_vec_pretty(&system_report)?)?;
    tracing::info!(path = %system_path.display(), "wrote system report");

    let internal_report = InternalServiceReport::from_loop_output(output);
    let internal_path = output_dir.join(format!("internal_service_report_{timestamp}.json"));
    std::fs::write(&internal_path, serde_json::to_vec_pretty(&internal_report)?)?;
    tracing::info!(path = %internal_path.display(), "wrote internal service report");

    Ok(())
}
