use thiserror::Error;

/// Errors raised while building the HTTP client or its configured base URL.
/// Per §7 these are configuration errors: fatal at startup, never raised
/// once the fuzzing loop is running (a failed in-flight request degrades
/// to a status-0 `HttpResponse` instead, see `client::HttpResponse`).
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid server base URL {0:?}: {1}")]
    InvalidBaseUrl(String, #[source] url::ParseError),

    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
}
