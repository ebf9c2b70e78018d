use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Initialize the global `tracing` subscriber: an `EnvFilter` (default
/// `info`, overridable by `--log-level`/`RUST_LOG`) writing to stderr, or
/// to a rolling file under `output_dir` when `log_to_file` is set.
///
/// This process only *consumes* traces (Jaeger/Tempo), never produces
/// them, so there is no OTel export layer here — just the filter and the
/// fmt layer.
pub fn init(log_level: &str, log_to_file: bool, output_dir: &Path) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    if log_to_file {
        let file_appender = tracing_appender::rolling::daily(output_dir, "fuzzer.log");
        let (writer, guard) = tracing_appender::non_blocking(file_appender);
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(writer)
            .with_ansi(false)
            .init();
        Some(guard)
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
        None
    }
}
