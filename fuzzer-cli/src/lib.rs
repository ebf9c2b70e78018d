//! Binary entry point (SPEC_FULL CLI module): parse flags, resolve the
//! layered configuration, build the static model and runtime components,
//! run the fuzzer loop to budget exhaustion, and persist the two JSON
//! reports.
//!
//! Split into a library target (this crate) plus a thin `main.rs` so the
//! wiring below is reachable from integration tests under `tests/`.

pub mod args;
pub mod config;
pub mod error;
pub mod logging;
pub mod report;

use fuzzer_core::FuzzerLoop;
use fuzzer_graph::ReachabilityMap;
use fuzzer_http::{HttpClient, HttpClientConfig};
use fuzzer_model::{DependencyFileType, StaticModel};
use fuzzer_pool::{ResourcePool, SeedEntry};
use fuzzer_schedule::CaseManagerConfig;
use fuzzer_trace::{AnyTraceBackend, JaegerBackend, TempoBackend, TraceManager, DEFAULT_TRACE_SETTLE_MS};
use tracing::{info, warn};

use crate::args::{DependencyFileTypeArg, TraceBackendTypeArg};
use crate::config::FuzzerConfig;

/// Build every runtime component from `config`, run the fuzzer loop to
/// budget exhaustion, and persist the two JSON reports under
/// `config.output_dir`.
pub async fn run(config: FuzzerConfig) -> anyhow::Result<()> {
    if let Some(script) = &config.http_middleware_script {
        warn!(path = %script.display(), "http-middleware-script is accepted but not executed by this build");
    }

    let model = build_static_model(&config)?;
    let pool = build_resource_pool(&config)?;
    let reachability = build_reachability(&model);

    let case_manager_config = CaseManagerConfig {
        extra_headers: config.extra_headers.clone(),
        ..CaseManagerConfig::default()
    };

    let http_client = HttpClient::new(&config.server_base_url, HttpClientConfig::new(&config.trace_id_header_key))?;
    let trace_manager = TraceManager::new(build_trace_backend(&config), DEFAULT_TRACE_SETTLE_MS);

    let mut fuzzer_loop = FuzzerLoop::new(
        model,
        pool,
        case_manager_config,
        trace_manager,
        http_client,
        reachability,
        config.trace_id_header_key.clone(),
        config.fuzzer_budget,
    );

    fuzzer_loop.init_from_doc();

    info!(budget_secs = config.fuzzer_budget.as_secs(), "starting fuzzer loop");
    let output = fuzzer_loop.run().await;
    info!(
        covered_status_code_count = output.report.covered_status_code_count,
        covered_edge_count = output.report.covered_edge_count,
        edge_coverage = output.report.edge_coverage,
        "fuzzer loop finished"
    );

    report::write_reports(&output, &config.output_dir)?;
    Ok(())
}

fn build_static_model(config: &FuzzerConfig) -> anyhow::Result<StaticModel> {
    let external_ops = fuzzer_model::load_external_ops(&config.openapi_spec)?;

    let mut internal_ops = Vec::new();
    if let Some(raw) = &config.internal_service_openapi_spec {
        let service_map = fuzzer_model::load_internal_service_map(raw)?;
        for (service, path) in service_map {
            let ops = fuzzer_model::load_internal_ops(&service, std::path::Path::new(&path))?;
            internal_ops.extend(ops);
        }
    }

    let mut model = StaticModel::build(external_ops, internal_ops);

    if let Some(dependency_file) = &config.dependency_file {
        let file_type = match config.dependency_file_type {
            DependencyFileTypeArg::Restler => DependencyFileType::Restler,
        };
        model.merge_dependency_file(dependency_file, file_type)?;
    }

    Ok(model)
}

fn build_resource_pool(config: &FuzzerConfig) -> anyhow::Result<ResourcePool> {
    let pool = ResourcePool::new();
    if let Some(path) = &config.fuzz_value_dict_file {
        let raw = std::fs::read_to_string(path)?;
        let entries: Vec<SeedEntry> = serde_json::from_str(&raw)?;
        pool.seed(entries);
    }
    Ok(pool)
}

/// Seed the low-confidence reachability layer from static dataflow BFS
/// (§4.7) before the loop starts; the high-confidence layer is populated
/// only at runtime as traces come in.
fn build_reachability(model: &StaticModel) -> ReachabilityMap {
    let mut reachability = ReachabilityMap::new();
    reachability.seed_low_confidence(&model.external_ops, &model.internal_ops, &model.dataflow_edges);
    reachability
}

fn build_trace_backend(config: &FuzzerConfig) -> AnyTraceBackend {
    match config.trace_backend_type {
        TraceBackendTypeArg::Jaeger => AnyTraceBackend::Jaeger(JaegerBackend::new(config.trace_backend_url.clone())),
        TraceBackendTypeArg::Tempo => AnyTraceBackend::Tempo(TempoBackend::new(config.trace_backend_url.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fuzzer_model::ExternalOp;

    #[test]
    fn build_reachability_seeds_low_confidence_from_name_matching() {
        let mut external = ExternalOp::new("/a/{id}", "GET");
        external.parameters.push(fuzzer_model::ParamSpec {
            name: "id".into(),
            location: fuzzer_model::ParamLocation::Path,
            schema: serde_json::json!({"type": "string"}),
            required: true,
        });
        let model = StaticModel::build(vec![external.clone()], vec![]);

        let reachability = build_reachability(&model);
        assert!(reachability.reachable_internals(&external, false).is_empty());
    }
}
