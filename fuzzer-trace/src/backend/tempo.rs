use crate::backend::format::parse_traces;
use crate::error::TraceError;
use crate::trace::Trace;

/// Grafana Tempo client (§6). Tempo's query-frontend exposes a
/// Jaeger-compatible `/api/traces/{id}` endpoint for single-trace lookup
/// and a TraceQL `/api/search` endpoint for discovery; this backend uses
/// the former directly and resolves `fetchAll` through the latter plus one
/// by-id fetch per match.
#[derive(Debug, Clone)]
pub struct TempoBackend {
    client: reqwest::Client,
    base_url: String,
    search_query: String,
}

impl TempoBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            search_query: "{}".to_string(),
        }
    }

    pub fn with_search_query(mut self, query: impl Into<String>) -> Self {
        self.search_query = query.into();
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
        let search_url = format!(
            "{}/api/search?q={}",
            self.base_url.trim_end_matches('/'),
            urlencoding_query(&self.search_query)
        );
        let body = self
            .client
            .get(&search_url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        let ids = parse_search_trace_ids(&body)?;

        let mut traces = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(trace) = self.fetch_by_id(&id).await? {
                traces.push(trace);
            }
        }
        Ok(traces)
    }
}

fn urlencoding_query(q: &str) -> String {
    form_urlencoded::byte_serialize(q.as_bytes()).collect()
}

fn parse_search_trace_ids(body: &str) -> Result<Vec<String>, TraceError> {
    #[derive(serde::Deserialize)]
    struct SearchResponse {
        traces: Vec<SearchTrace>,
    }
    #[derive(serde::Deserialize)]
    struct SearchTrace {
        #[serde(rename = "traceID")]
        trace_id: String,
    }
    let parsed: SearchResponse =
        serde_json::from_str(body).map_err(|e| TraceError::Parse(e.to_string()))?;
    Ok(parsed.traces.into_iter().map(|t| t.trace_id).collect())
}
