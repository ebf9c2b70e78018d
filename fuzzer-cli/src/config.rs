use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;
use serde::Deserialize;

use crate::args::{Cli, DependencyFileTypeArg, FuzzerTypeArg, TraceBackendTypeArg};
use crate::error::ConfigError;

/// The fully resolved configuration the rest of the binary runs on. Plain
/// data, no framework magic — a `Debug + Clone` struct built by a loader
/// function rather than carrying derive-driven validation itself.
#[derive(Debug, Clone)]
pub struct FuzzerConfig {
    pub openapi_spec: PathBuf,
    pub internal_service_openapi_spec: Option<String>,
    pub server_base_url: String,
    pub fuzzer_budget: Duration,
    pub fuzzer_type: FuzzerTypeArg,
    pub dependency_file: Option<PathBuf>,
    pub dependency_file_type: DependencyFileTypeArg,
    pub extra_headers: HashMap<String, String>,
    pub trace_backend_type: TraceBackendTypeArg,
    pub trace_backend_url: String,
    pub trace_id_header_key: String,
    pub fuzz_value_dict_file: Option<PathBuf>,
    pub http_middleware_script: Option<PathBuf>,
    pub log_level: String,
    pub log_to_file: bool,
    pub output_dir: PathBuf,
}

/// Every field the JSON config file may set, in the same precedence layer
/// as `--config` (highest: file overrides env overrides flags, per
/// SPEC_FULL's configuration module). Fields absent from the file leave
/// the lower layers untouched.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct FileConfig {
    openapi_spec: Option<PathBuf>,
    internal_service_openapi_spec: Option<String>,
    server_base_url: Option<String>,
    fuzzer_budget: Option<u64>,
    fuzzer_type: Option<String>,
    dependency_file: Option<PathBuf>,
    dependency_file_type: Option<String>,
    extra_headers: Option<HashMap<String, String>>,
    trace_backend_type: Option<String>,
    trace_backend_url: Option<String>,
    trace_id_header_key: Option<String>,
    fuzz_value_dict_file: Option<PathBuf>,
    http_middleware_script: Option<PathBuf>,
    log_level: Option<String>,
    log_to_file: Option<bool>,
    output_dir: Option<PathBuf>,
}

/// Resolve `FuzzerConfig` from the three layers in SPEC_FULL's
/// configuration module: CLI flags (base), `FUZZER_*` environment
/// variables (override flags), then `--config`'s JSON file (overrides
/// both). Missing `--openapi-spec`/`--server-base-url` after merging all
/// three is a fatal `ConfigError` (§7).
pub fn resolve(cli: Cli) -> Result<FuzzerConfig, ConfigError> {
    let file = match &cli.config {
        Some(path) => load_file_config(path)?,
        None => FileConfig::default(),
    };

    let openapi_spec = pick_path(file.openapi_spec, env_str("OPENAPI_SPEC"), cli.openapi_spec)
        .ok_or(ConfigError::MissingRequired("--openapi-spec"))?;

    let server_base_url = pick_string(
        file.server_base_url,
        env_str("SERVER_BASE_URL"),
        cli.server_base_url,
    )
    .ok_or(ConfigError::MissingRequired("--server-base-url"))?;

    let trace_backend_url = pick_string(
        file.trace_backend_url,
        env_str("TRACE_BACKEND_URL"),
        cli.trace_backend_url,
    )
    .ok_or(ConfigError::MissingRequired("--trace-backend-url"))?;

    let fuzzer_budget_secs = pick(
        file.fuzzer_budget,
        env_str("FUZZER_BUDGET").and_then(|s| s.parse().ok()),
        cli.fuzzer_budget,
    )
    .ok_or(ConfigError::MissingRequired("--fuzzer-budget"))?;

    let fuzzer_type = match pick_string(file.fuzzer_type, env_str("FUZZER_TYPE"), cli.fuzzer_type.map(enum_to_string)) {
        Some(s) => parse_enum::<FuzzerTypeArg>("--fuzzer-type", &s)?,
        None => FuzzerTypeArg::Basic,
    };

    let dependency_file_type = match pick_string(
        file.dependency_file_type,
        env_str("DEPENDENCY_FILE_TYPE"),
        cli.dependency_file_type.map(enum_to_string),
    ) {
        Some(s) => parse_enum::<DependencyFileTypeArg>("--dependency-file-type", &s)?,
        None => DependencyFileTypeArg::Restler,
    };

    let trace_backend_type = match pick_string(
        file.trace_backend_type,
        env_str("TRACE_BACKEND_TYPE"),
        cli.trace_backend_type.map(enum_to_string),
    ) {
        Some(s) => parse_enum::<TraceBackendTypeArg>("--trace-backend-type", &s)?,
        None => {
            return Err(ConfigError::MissingRequired("--trace-backend-type"));
        }
    };

    let extra_headers = file.extra_headers.unwrap_or_else(|| {
        pick_string(None, env_str("EXTRA_HEADERS"), cli.extra_headers)
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    });

    let trace_id_header_key = pick_string(
        file.trace_id_header_key,
        env_str("TRACE_ID_HEADER_KEY"),
        cli.trace_id_header_key,
    )
    .unwrap_or_else(|| "X-Trace-Id".to_string());

    let log_level = pick_string(file.log_level, env_str("LOG_LEVEL"), cli.log_level).unwrap_or_else(|| "info".to_string());

    let log_to_file = file.log_to_file.unwrap_or(cli.log_to_file || env_bool("LOG_TO_FILE"));

    let output_dir = pick_path(file.output_dir, env_str("OUTPUT_DIR"), cli.output_dir)
        .unwrap_or_else(|| PathBuf::from("."));

    Ok(FuzzerConfig {
        openapi_spec,
        internal_service_openapi_spec: pick_string(
            file.internal_service_openapi_spec,
            env_str("INTERNAL_SERVICE_OPENAPI_SPEC"),
            cli.internal_service_openapi_spec,
        ),
        server_base_url,
        fuzzer_budget: Duration::from_secs(fuzzer_budget_secs),
        fuzzer_type,
        dependency_file: pick_path(file.dependency_file, env_str("DEPENDENCY_FILE"), cli.dependency_file),
        dependency_file_type,
        extra_headers,
        trace_backend_type,
        trace_backend_url,
        trace_id_header_key,
        fuzz_value_dict_file: pick_path(
            file.fuzz_value_dict_file,
            env_str("FUZZ_VALUE_DICT_FILE"),
            cli.fuzz_value_dict_file,
        ),
        http_middleware_script: pick_path(
            file.http_middleware_script,
            env_str("HTTP_MIDDLEWARE_SCRIPT"),
            cli.http_middleware_script,
        ),
        log_level,
        log_to_file,
        output_dir,
    })
}

fn load_file_config(path: &std::path::Path) -> Result<FileConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ConfigError::ParseFile {
        path: path.display().to_string(),
        source,
    })
}

/// Later arguments are lower precedence: file beats env beats flags, so
/// this reads `pick(file, env, cli)` top to bottom and returns the first
/// `Some`.
fn pick<T>(file: Option<T>, env: Option<T>, cli: Option<T>) -> Option<T> {
    file.or(env).or(cli)
}

fn pick_string(file: Option<String>, env: Option<String>, cli: Option<String>) -> Option<String> {
    pick(file, env, cli)
}

fn pick_path(file: Option<PathBuf>, env: Option<String>, cli: Option<PathBuf>) -> Option<PathBuf> {
    pick(file, env.map(PathBuf::from), cli)
}

fn env_str(flag_suffix: &str) -> Option<String> {
    std::env::var(format!("FUZZER_{flag_suffix}")).ok()
}

fn env_bool(flag_suffix: &str) -> bool {
    env_str(flag_suffix).is_some_and(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
}

fn enum_to_string<E: ValueEnum>(value: E) -> String {
    value.to_possible_value().map(|v| v.get_name().to_string()).unwrap_or_default()
}

fn parse_enum<E: ValueEnum>(field: &'static str, raw: &str) -> Result<E, ConfigError> {
    E::from_str(raw, true).map_err(|message| ConfigError::InvalidValue { field, message })
}
