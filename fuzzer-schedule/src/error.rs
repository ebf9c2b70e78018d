use thiserror::Error;

/// Errors raised while populating a scenario (§4.1/§7). A populate error
/// aborts only the scenario currently being populated — never the loop.
#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("malformed schema for parameter {name:?} on {endpoint} {method}: {message}")]
    MalformedSchema {
        endpoint: String,
        method: String,
        name: String,
        message: String,
    },
}
