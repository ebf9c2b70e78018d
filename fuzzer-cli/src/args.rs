use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Trace-guided REST API fuzzer (spec §6): loads a static model from an
/// OpenAPI document, drives requests against a running deployment, and
/// feeds distributed traces back into the scheduler until the budget runs
/// out.
///
/// Every flag here may also be set through a `FUZZER_`-prefixed
/// environment variable, or through the JSON file passed via `--config`,
/// which takes precedence over both (see `fuzzer_cli::config`).
#[derive(Debug, Parser)]
#[command(name = "fuzzer", version, about, long_about = None)]
pub struct Cli {
    /// Path to the external OpenAPI document describing the system under test.
    #[arg(long)]
    pub openapi_spec: Option<PathBuf>,

    /// Internal service OpenAPI docs: a JSON object `{service: path}`, or a
    /// path to a file containing one.
    #[arg(long)]
    pub internal_service_openapi_spec: Option<String>,

    /// Base URL the HTTP client issues external requests against.
    #[arg(long)]
    pub server_base_url: Option<String>,

    /// Total wall-clock fuzzing budget, in seconds.
    #[arg(long)]
    pub fuzzer_budget: Option<u64>,

    /// Loop flavor; only `basic` is implemented.
    #[arg(long, value_enum)]
    pub fuzzer_type: Option<FuzzerTypeArg>,

    /// Optional RESTler-style static dependency file.
    #[arg(long)]
    pub dependency_file: Option<PathBuf>,

    /// Format of `--dependency-file`.
    #[arg(long, value_enum)]
    pub dependency_file_type: Option<DependencyFileTypeArg>,

    /// JSON object (string -> string) merged into every outgoing request's headers.
    #[arg(long)]
    pub extra_headers: Option<String>,

    /// Which trace backend to query.
    #[arg(long, value_enum)]
    pub trace_backend_type: Option<TraceBackendTypeArg>,

    /// Base URL of the trace backend.
    #[arg(long)]
    pub trace_backend_url: Option<String>,

    /// Response header carrying the trace id (default `X-Trace-Id`).
    #[arg(long)]
    pub trace_id_header_key: Option<String>,

    /// Path to a seed resource dictionary (§6 seed dictionary format).
    #[arg(long)]
    pub fuzz_value_dict_file: Option<PathBuf>,

    /// Optional middleware script path. Accepted for forward compatibility;
    /// this build has no script engine, so a configured script only logs a
    /// warning at startup and is never executed.
    #[arg(long)]
    pub http_middleware_script: Option<PathBuf>,

    /// Log level filter, e.g. `info`, `debug`, `fuzzer_core=trace`.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Write logs to a rolling file under `--output-dir` instead of stderr.
    #[arg(long)]
    pub log_to_file: bool,

    /// Directory for logs (when `--log-to-file`) and persisted reports.
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// JSON configuration file. Its fields override both flags and
    /// environment variables for every key it sets.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "PascalCase")]
pub enum FuzzerTypeArg {
    Basic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "PascalCase")]
pub enum DependencyFileTypeArg {
    Restler,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "PascalCase")]
pub enum TraceBackendTypeArg {
    Jaeger,
    Tempo,
}
