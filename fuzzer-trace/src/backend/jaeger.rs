use crate::backend::format::parse_traces;
use crate::error::TraceError;
use crate::trace::Trace;

/// Jaeger query-service client (§6), hitting the native `/api/traces` HTTP
/// API and normalizing the response into the Simplified `Trace` form.
#[derive(Debug, Clone)]
pub struct JaegerBackend {
    client: reqwest::Client,
    base_url: String,
    service_name: Option<String>,
}

impl JaegerBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            service_name: None,
        }
    }

    /// `fetchAll` scopes its search to a service when one is configured,
    /// matching Jaeger's query API requiring a `service` parameter.
    pub fn with_service_name(mut self, service_name: impl Into<String>) -> Self {
        self.service_name = Some(service_name.into());
        self
    }

    pub async fn fetch_by_id(&self, id: &str) -> Result<Option<Trace>, TraceError> {
        let url = format!("{}/api/traces/{id}", self.base_url.trim_end_matches('/'));
        let resp = self.client.get(&url).send().await?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body = resp.error_for_status()?.text().await?;
        let traces = parse_traces(&body)?;
        Ok(traces.into_iter().next())
    }

    pub async fn fetch_all(&self) -> Result<Vec<Trace>, TraceError> {
        let mut url = format!("{}/api/traces", self.base_url.trim_end_matches('/'));
        if let Some(service) = &self.service_name {
            url = format!("{url}?service={service}");
        }
        let body = self.client.get(&url).send().await?.error_for_status()?.text().await?;
        parse_traces(&body)
    }
}
