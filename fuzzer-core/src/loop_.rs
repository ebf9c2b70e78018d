use std::time::{Duration, Instant};

use fuzzer_graph::{CallInfoGraph, FuzzingSnapshot, ReachabilityMap};
use fuzzer_http::HttpClient;
use fuzzer_model::{InternalOperation, StaticModel};
use fuzzer_pool::ResourcePool;
use fuzzer_response::ResponseProcessor;
use fuzzer_schedule::{CaseManager, OperationCase};
use fuzzer_trace::TraceManager;
use tracing::{info, warn};

use crate::report::{LoopOutput, LoopReport};

/// Wires every runtime component into one fuzzing run (§4.9). The loop
/// itself owns no scheduling or coverage logic — it only sequences calls
/// against the components that do, exactly as the pseudocode in §4.9
/// describes.
pub struct FuzzerLoop {
    case_manager: CaseManager,
    response_processor: ResponseProcessor,
    trace_manager: TraceManager,
    call_info_graph: CallInfoGraph,
    reachability: ReachabilityMap,
    snapshot: FuzzingSnapshot,
    http_client: HttpClient,
    internal_ops: Vec<InternalOperation>,
    trace_id_header: String,
    budget: Duration,
}

impl FuzzerLoop {
    pub fn new(
        model: StaticModel,
        pool: ResourcePool,
        case_manager_config: fuzzer_schedule::CaseManagerConfig,
        trace_manager: TraceManager,
        http_client: HttpClient,
        reachability: ReachabilityMap,
        trace_id_header: String,
        budget: Duration,
    ) -> Self {
        let response_processor = ResponseProcessor::new(&model.external_ops);
        let call_info_graph = CallInfoGraph::from_dataflow_edges(&model.dataflow_edges);
        let internal_ops = model.internal_ops.clone();
        let case_manager = CaseManager::new(model, pool, case_manager_config);

        Self {
            case_manager,
            response_processor,
            trace_manager,
            call_info_graph,
            reachability,
            snapshot: FuzzingSnapshot::new(),
            http_client,
            internal_ops,
            trace_id_header,
            budget,
        }
    }

    /// `initFromDoc` (§4.1), exposed so a caller outside this crate (the
    /// `fuzzer-cli` binary) can seed the scenario queue before `run`
    /// without reaching into the private `CaseManager` field.
    pub fn init_from_doc(&mut self) {
        self.case_manager.init_from_doc();
    }

    /// Run until the budget elapses or the scenario queue is exhausted
    /// (§4.9/§7: pop failure is the only condition that exits before the
    /// budget).
    pub async fn run(mut self) -> LoopOutput {
        let start = Instant::now();

        loop {
            if start.elapsed() >= self.budget {
                info!("fuzzer budget exhausted, stopping");
                break;
            }

            let scenario = match self.case_manager.pop_and_populate() {
                None => {
                    info!("scenario queue empty, stopping");
                    break;
                }
                Some(Err(err)) => {
                    warn!(error = %err, "scenario population failed, dropping this scenario");
                    continue;
                }
                Some(Ok(scenario)) => scenario,
            };

            let mut scenario = scenario;
            for case in scenario.ops.iter_mut() {
                self.execute_case(case).await;
            }

            let new_coverage = self.snapshot.update(
                self.call_info_graph.covered_edge_count(),
                self.response_processor.covered_status_code_count(),
            );
            self.case_manager
                .evaluate_scenario_and_try_update(new_coverage, scenario, &self.reachability);
        }

        self.build_output()
    }

    /// One `opCase`'s execution slice of §4.9: HTTP call, response
    /// processing, and (when a trace id is present) trace fetch + graph
    /// update. Every failure here is logged and non-fatal per §7.
    async fn execute_case(&mut self, case: &mut OperationCase) {
        let response = self
            .http_client
            .perform(
                &case.op.endpoint,
                &case.op.method,
                &case.headers,
                &case.path_params,
                &case.query_params,
                case.body.clone(),
            )
            .await;

        case.response_status = Some(response.status);
        case.response_headers = response.headers.clone();
        case.response_body = response.body.clone();

        self.response_processor
            .process(&case.op, response.status, &response.body, self.case_manager.pool());

        let Some(trace_id) = response.headers.get(&self.trace_id_header) else {
            return;
        };

        let Some(trace) = self.trace_manager.fetch_by_id(trace_id).await else {
            return;
        };

        let call_infos = self.trace_manager.to_call_infos(std::slice::from_ref(&trace));
        self.call_info_graph.update_from_call_infos(&call_infos);
        update_reachability(&case.op, &call_infos, &self.internal_ops, &mut self.reachability);
    }

    fn build_output(self) -> LoopOutput {
        let report = LoopReport {
            covered_status_code_count: self.response_processor.covered_status_code_count(),
            covered_edge_count: self.call_info_graph.covered_edge_count(),
            edge_coverage: self.call_info_graph.edge_coverage(),
            total_edges: self.call_info_graph.edges().len(),
        };
        LoopOutput {
            report,
            response_processor: self.response_processor,
            call_info_graph: self.call_info_graph,
            reachability: self.reachability,
        }
    }
}

/// Populate the reachability map's high-confidence layer from one
/// scenario op's observed call infos (§4.7: "populated from successful
/// execution + trace conversion"): match each call info's normalized
/// target service/method against the known internal operations, and
/// record the executing `ExternalOp` as reaching that `InternalEndpoint`.
fn update_reachability(
    external: &fuzzer_model::ExternalOp,
    call_infos: &[fuzzer_trace::CallInfo],
    internal_ops: &[InternalOperation],
    reachability: &mut ReachabilityMap,
) {
    for call_info in call_infos {
        let target_service = fuzzer_model::normalize_service_name(&call_info.target_service);
        let method_segment = call_info
            .method_trace_name
            .rsplit(['.', '/'])
            .next()
            .unwrap_or(&call_info.method_trace_name);

        for internal in internal_ops {
            if internal.key.service != target_service {
                continue;
            }
            if internal.key.method == method_segment {
                reachability.insert(external.clone(), internal.key.clone(), true);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fuzzer_http::HttpClientConfig;
    use fuzzer_model::{ExternalOp, InternalEndpoint};
    use fuzzer_schedule::CaseManagerConfig;
    use fuzzer_trace::{AnyTraceBackend, JaegerBackend};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn single_op_budget_exhausts_and_reports_status_coverage() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ping"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .mount(&server)
            .await;

        let mut op = ExternalOp::new("/ping", "GET");
        op.responses.insert("200".into(), serde_json::json!({}));
        let model = StaticModel::build(vec![op], vec![]);

        let http_client = HttpClient::new(&server.uri(), HttpClientConfig::new("X-Trace-Id")).unwrap();
        let trace_manager = TraceManager::new(AnyTraceBackend::Jaeger(JaegerBackend::new("http://unreachable.invalid")), 0);

        let fuzzer_loop = FuzzerLoop::new(
            model,
            ResourcePool::new(),
            CaseManagerConfig::default(),
            trace_manager,
            http_client,
            ReachabilityMap::new(),
            "X-Trace-Id".to_string(),
            Duration::from_millis(200),
        );

        let mut fuzzer_loop = fuzzer_loop;
        fuzzer_loop.case_manager.init_from_doc();
        let report = fuzzer_loop.run().await;

        assert_eq!(report.covered_status_code_count, 1);
    }

    #[tokio::test]
    async fn missing_trace_id_header_skips_trace_fetch_without_failing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ping"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .mount(&server)
            .await;

        let mut op = ExternalOp::new("/ping", "GET");
        op.responses.insert("200".into(), serde_json::json!({}));
        let model = StaticModel::build(vec![op], vec![]);

        let http_client = HttpClient::new(&server.uri(), HttpClientConfig::new("X-Trace-Id")).unwrap();
        let trace_manager = TraceManager::new(AnyTraceBackend::Jaeger(JaegerBackend::new("http://unreachable.invalid")), 0);

        let mut fuzzer_loop = FuzzerLoop::new(
            model,
            ResourcePool::new(),
            CaseManagerConfig::default(),
            trace_manager,
            http_client,
            ReachabilityMap::new(),
            "X-Trace-Id".to_string(),
            Duration::from_millis(100),
        );
        fuzzer_loop.case_manager.init_from_doc();

        let report = fuzzer_loop.run().await;
        assert_eq!(report.total_edges, 0);
    }

    #[test]
    fn reachability_is_populated_only_on_matching_service_and_method() {
        let external = ExternalOp::new("/ping", "GET");
        let internal_ops = vec![InternalOperation::new(InternalEndpoint::new("cart", "/x", "GET"))];
        let call_infos = vec![fuzzer_trace::CallInfo {
            source_service: "frontend".into(),
            target_service: "CartService".into(),
            method_trace_name: "/pkg.Cart/GET".into(),
        }];

        let mut reachability = ReachabilityMap::new();
        update_reachability(&external, &call_infos, &internal_ops, &mut reachability);

        assert_eq!(reachability.reachable_internals(&external, true).len(), 1);
    }
}
