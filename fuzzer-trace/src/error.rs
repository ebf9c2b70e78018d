use thiserror::Error;

/// Errors raised while fetching or parsing traces. Per §7 these are logged
/// and degrade to "no graph update" — never fatal to the fuzzing loop.
#[derive(Debug, Error)]
pub enum TraceError {
    #[error("trace backend request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("failed to parse trace backend response: {0}")]
    Parse(String),

    #[error("trace {0} not found")]
    NotFound(String),
}
