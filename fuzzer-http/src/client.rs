use std::collections::HashMap;
use std::time::Duration;

use reqwest::Url;
use tracing::warn;

use crate::error::HttpError;

/// `perform()`'s configurable knobs (§6/SPEC_FULL HTTP client module):
/// request timeout, bounded retry count with exponential backoff, and the
/// response-header capture allow-list (always including the trace-id
/// header so the loop can pull it regardless of other configuration).
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub timeout: Duration,
    pub max_retries: u32,
    pub retry_base_delay: Duration,
    pub captured_headers: Vec<String>,
}

impl HttpClientConfig {
    pub fn new(trace_id_header: &str) -> Self {
        Self {
            timeout: Duration::from_secs(10),
            max_retries: 2,
            retry_base_delay: Duration::from_millis(100),
            captured_headers: vec![trace_id_header.to_string()],
        }
    }
}

/// The result of a single `perform()` call. A failed call (after
/// exhausting retries) is represented as `status: 0` with an empty body
/// and the error message recorded for logging, matching §7's "HTTP
/// errors... status=0, empty headers/body; scenario continues" policy —
/// this function itself never returns `Err` once the client is built.
#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
    pub error: Option<String>,
}

/// The §6 HTTP client contract, reqwest-backed.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    base_url: Url,
    config: HttpClientConfig,
}

impl HttpClient {
    pub fn new(base_url: &str, config: HttpClientConfig) -> Result<Self, HttpError> {
        let base_url =
            Url::parse(base_url).map_err(|e| HttpError::InvalidBaseUrl(base_url.to_string(), e))?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(HttpError::ClientBuild)?;
        Ok(Self { client, base_url, config })
    }

    /// `perform(path, method, headers, pathParams, queryParams, body)` (§6):
    /// substitutes `{x}` path placeholders, URL-encodes query params, merges
    /// headers, retries transient failures with exponential backoff, and
    /// captures only the configured response headers.
    pub async fn perform(
        &self,
        path: &str,
        method: &str,
        headers: &HashMap<String, String>,
        path_params: &HashMap<String, String>,
        query_params: &HashMap<String, String>,
        body: Option<Vec<u8>>,
    ) -> HttpResponse {
        let url = match self.build_url(path, path_params, query_params) {
            Ok(url) => url,
            Err(message) => {
                warn!(path, error = %message, "failed to build request URL");
                return HttpResponse { error: Some(message), ..Default::default() };
            }
        };

        let method = match method.parse::<reqwest::Method>() {
            Ok(m) => m,
            Err(e) => {
                return HttpResponse {
                    error: Some(format!("invalid HTTP method {method:?}: {e}")),
                    ..Default::default()
                }
            }
        };

        let mut attempt = 0;
        loop {
            let mut request = self.client.request(method.clone(), url.clone());
            for (k, v) in headers {
                request = request.header(k, v);
            }
            if let Some(body) = &body {
                request = request.body(body.clone());
            }

            match request.send().await {
                Ok(response) => return self.into_captured(response).await,
                Err(err) if attempt < self.config.max_retries => {
                    warn!(attempt, error = %err, "request failed, retrying");
                    tokio::time::sleep(self.config.retry_base_delay * 2u32.pow(attempt)).await;
                    attempt += 1;
                }
                Err(err) => {
                    warn!(error = %err, "request failed after exhausting retries");
                    return HttpResponse { error: Some(err.to_string()), ..Default::default() };
                }
            }
        }
    }

    async fn into_captured(&self, response: reqwest::Response) -> HttpResponse {
        let status = response.status().as_u16();
        let mut headers = HashMap::new();
        for name in &self.config.captured_headers {
            if let Some(value) = response.headers().get(name.as_str()) {
                if let Ok(value) = value.to_str() {
                    headers.insert(name.clone(), value.to_string());
                }
            }
        }
        let body = response.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
        HttpResponse { status, headers, body, error: None }
    }

    fn build_url(
        &self,
        path: &str,
        path_params: &HashMap<String, String>,
        query_params: &HashMap<String, String>,
    ) -> Result<Url, String> {
        let substituted = substitute_path_params(path, path_params);
        let joined = self
            .base_url
            .join(substituted.trim_start_matches('/'))
            .map_err(|e| e.to_string())?;

        if query_params.is_empty() {
            return Ok(joined);
        }
        let query: String = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(query_params.iter())
            .finish();
        let mut url = joined;
        url.set_query(Some(&query));
        Ok(url)
    }
}

/// Replace every `{x}` placeholder with the URL-encoded value of
/// `pathParams[x]` (§6). A placeholder with no matching param is left
/// untouched — the request will most likely 404, which is an observable
/// outcome, not a reason to abort.
fn substitute_path_params(path: &str, path_params: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(path.len());
    let mut rest = path;
    while let Some(start) = rest.find('{') {
        let Some(end) = rest[start..].find('}') else {
            out.push_str(rest);
            return out;
        };
        out.push_str(&rest[..start]);
        let name = &rest[start + 1..start + end];
        match path_params.get(name) {
            Some(value) => {
                let encoded: String = form_urlencoded::byte_serialize(value.as_bytes()).collect();
                out.push_str(&encoded);
            }
            None => {
                out.push('{');
                out.push_str(name);
                out.push('}');
            }
        }
        rest = &rest[start + end + 1..];
    }
    out.push_str(rest);
    out
}
