mod format;
mod jaeger;
mod tempo;

pub use jaeger::JaegerBackend;
pub use tempo::TempoBackend;

use crate::error::TraceError;
use crate::trace::Trace;

/// The external trace-backend contract (§6): `fetchByID` and `fetchAll`,
/// implemented by a concrete backend per `--trace-backend-type`.
pub trait TraceBackend: Send + Sync {
    fn fetch_by_id(&self, id: &str) -> impl std::future::Future<Output = Result<Option<Trace>, TraceError>> + Send;
    fn fetch_all(&self) -> impl std::future::Future<Output = Result<Vec<Trace>, TraceError>> + Send;
}

/// Enum dispatch over the two concrete backends, selected by
/// `--trace-backend-type` (§6). Kept as a plain enum rather than a trait
/// object since there are exactly two implementations and neither the core
/// nor `fuzzer-cli` needs to add backends at runtime.
pub enum AnyTraceBackend {
    Jaeger(JaegerBackend),
    Tempo(TempoBackend),
}

impl TraceBackend for AnyTraceBackend {
    async fn fetch_by_id(&self, id: &str) -> Result<Option<Trace>, TraceError> {
        match self {
            AnyTraceBackend::Jaeger(b) => b.fetch_by_id(id).await,
            AnyTraceBackend::Tempo(b) => b.fetch_by_id(id).await,
        }
    }

    async fn fetch_all(&self) -> Result<Vec<Trace>, TraceError> {
        match self {
            AnyTraceBackend::Jaeger(b) => b.fetch_all().await,
            AnyTraceBackend::Tempo(b) => b.fetch_all().await,
        }
    }
}
