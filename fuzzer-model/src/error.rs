use thiserror::Error;

/// Errors raised while building or querying the static model.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to read OpenAPI document at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse OpenAPI document at {path}: {message}")]
    Parse { path: String, message: String },

    #[error("malformed dependency file at {path}: {message}")]
    DependencyFile { path: String, message: String },
}
