use std::time::Duration;

use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use reqwest::{Client, Method};
use serde::{Serialize, de::DeserializeOwned};

use crate::error::{CoreResult, SkillwireError};

/// Raw HTTP response: status, headers, body. Non-2xx/3xx statuses are
/// normal values here; interpreting them is the caller's concern.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json<T: DeserializeOwned>(&self) -> CoreResult<T> {
        serde_json::from_slice(&self.body).map_err(|e| SkillwireError::Other(e.into()))
    }
}

/// Configurable REST client shared by all provider services.
///
/// Holds a base URL, headers, default query parameters, a timeout, and a
/// linear transport-level retry policy. Setters chain; the final values
/// are whatever the last call left behind.
#[derive(Debug, Clone)]
pub struct HttpClient {
    base_url: String,
    headers: Vec<(String, String)>,
    default_params: Vec<(String, String)>,
    timeout: Duration,
    retry_times: u32,
    retry_delay: Duration,
    verify_ssl: bool,
}

impl HttpClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            headers: Vec::new(),
            default_params: Vec::new(),
            timeout: Duration::from_secs(30),
            retry_times: 0,
            retry_delay: Duration::from_millis(100),
            verify_ssl: true,
        }
    }

    pub fn set_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        upsert(&mut self.headers, key.into(), value.into());
        self
    }

    pub fn set_headers<I>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (k, v) in headers {
            upsert(&mut self.headers, k, v);
        }
        self
    }

    pub fn set_default_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        upsert(&mut self.default_params, key.into(), value.into());
        self
    }

    pub fn set_default_params<I>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (k, v) in params {
            upsert(&mut self.default_params, k, v);
        }
        self
    }

    /// Request timeout in seconds.
    pub fn set_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    /// `times` attempts with `delay_ms` between them. Zero means a single
    /// attempt with no retry.
    pub fn set_retry(mut self, times: u32, delay_ms: u64) -> Self {
        self.retry_times = times;
        self.retry_delay = Duration::from_millis(delay_ms);
        self
    }

    pub fn disable_ssl_verification(mut self) -> Self {
        self.verify_ssl = false;
        self
    }

    pub fn enable_ssl_verification(mut self) -> Self {
        self.verify_ssl = true;
        self
    }

    pub async fn get(&self, endpoint: &str, params: &[(&str, &str)]) -> CoreResult<ApiResponse> {
        let merged = self.merge_params(params);
        self.execute(Method::GET, endpoint, Some(&merged), None).await
    }

    pub async fn delete(&self, endpoint: &str, params: &[(&str, &str)]) -> CoreResult<ApiResponse> {
        let merged = self.merge_params(params);
        self.execute(Method::DELETE, endpoint, Some(&merged), None)
            .await
    }

    pub async fn post<T: Serialize>(
        &self,
        endpoint: &str,
        data: &T,
        params: &[(&str, &str)],
    ) -> CoreResult<ApiResponse> {
        self.send_with_body(Method::POST, endpoint, data, params).await
    }

    pub async fn put<T: Serialize>(
        &self,
        endpoint: &str,
        data: &T,
        params: &[(&str, &str)],
    ) -> CoreResult<ApiResponse> {
        self.send_with_body(Method::PUT, endpoint, data, params).await
    }

    pub async fn patch<T: Serialize>(
        &self,
        endpoint: &str,
        data: &T,
        params: &[(&str, &str)],
    ) -> CoreResult<ApiResponse> {
        self.send_with_body(Method::PATCH, endpoint, data, params).await
    }

    /// Body-carrying verbs put the merged params on the path as a literal
    /// query string; the JSON body stays a separate payload.
    async fn send_with_body<T: Serialize>(
        &self,
        method: Method,
        endpoint: &str,
        data: &T,
        params: &[(&str, &str)],
    ) -> CoreResult<ApiResponse> {
        let merged = self.merge_params(params);
        let target = if merged.is_empty() {
            endpoint.to_string()
        } else {
            format!("{}?{}", endpoint, encode_query(&merged))
        };
        let body = serde_json::to_value(data).map_err(|e| SkillwireError::Other(e.into()))?;
        self.execute(method, &target, None, Some(body)).await
    }

    /// Defaults first; call-supplied values win on key collision.
    fn merge_params(&self, params: &[(&str, &str)]) -> Vec<(String, String)> {
        let mut merged = self.default_params.clone();
        for (k, v) in params {
            upsert(&mut merged, (*k).to_string(), (*v).to_string());
        }
        merged
    }

    /// Fresh client per request so setter changes (timeout, TLS mode)
    /// always apply.
    fn build_client(&self) -> Result<Client, reqwest::Error> {
        let mut builder = Client::builder().timeout(self.timeout);
        if !self.verify_ssl {
            builder = builder.danger_accept_invalid_certs(true);
        }
        builder.build()
    }

    async fn execute(
        &self,
        method: Method,
        endpoint: &str,
        query: Option<&[(String, String)]>,
        body: Option<serde_json::Value>,
    ) -> CoreResult<ApiResponse> {
        let url = format!("{}{}", self.base_url, endpoint);
        let attempts = self.retry_times.max(1);
        let mut attempt = 1;
        loop {
            match self.attempt(method.clone(), &url, query, body.as_ref()).await {
                Ok(resp) => {
                    tracing::debug!(%method, %url, status = %resp.status, "request complete");
                    return Ok(resp);
                }
                Err(e) if attempt < attempts => {
                    tracing::warn!(%method, %url, attempt, error = %e, "transport failure, retrying");
                    tokio::time::sleep(self.retry_delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(SkillwireError::Transport(e)),
            }
        }
    }

    async fn attempt(
        &self,
        method: Method,
        url: &str,
        query: Option<&[(String, String)]>,
        body: Option<&serde_json::Value>,
    ) -> Result<ApiResponse, reqwest::Error> {
        let client = self.build_client()?;
        let mut req = client.request(method, url);
        for (k, v) in &self.headers {
            req = req.header(k.as_str(), v.as_str());
        }
        if let Some(q) = query {
            req = req.query(q);
        }
        if let Some(b) = body {
            req = req.json(b);
        }
        let resp = req.send().await?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp.bytes().await?;
        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }
}

fn upsert(pairs: &mut Vec<(String, String)>, key: String, value: String) {
    match pairs.iter_mut().find(|(k, _)| *k == key) {
        Some(entry) => entry.1 = value,
        None => pairs.push((key, value)),
    }
}

fn encode_query(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::Method::{DELETE, GET, POST, PUT};
    use httpmock::MockServer;
    use serde_json::json;
    use std::time::Instant;

    #[test]
    fn call_params_override_defaults_in_merge() {
        let client = HttpClient::new("http://unused").set_default_param("version", "v1");
        let merged = client.merge_params(&[("version", "v2"), ("foo", "bar")]);
        assert_eq!(
            merged,
            vec![
                ("version".to_string(), "v2".to_string()),
                ("foo".to_string(), "bar".to_string()),
            ]
        );
    }

    #[test]
    fn encode_query_percent_encodes() {
        let pairs = vec![("q".to_string(), "a b&c".to_string())];
        assert_eq!(encode_query(&pairs), "q=a%20b%26c");
    }

    #[tokio::test]
    async fn get_sends_defaults_and_call_params() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(GET)
                .path("/skills")
                .query_param("a", "1")
                .query_param("b", "2");
            then.status(200).json_body(json!({"ok": true}));
        });

        let client = HttpClient::new(server.base_url()).set_default_param("b", "2");
        let resp = client.get("/skills", &[("a", "1")]).await.unwrap();

        assert!(resp.is_success());
        m.assert();
    }

    #[tokio::test]
    async fn post_appends_query_to_path_and_sends_json_body() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(POST)
                .path("/items")
                .query_param("version", "v1")
                .json_body(json!({"x": 1}));
            then.status(201).body("created");
        });

        let client = HttpClient::new(server.base_url()).set_default_param("version", "v1");
        let resp = client.post("/items", &json!({"x": 1}), &[]).await.unwrap();

        assert_eq!(resp.status.as_u16(), 201);
        assert_eq!(resp.text(), "created");
        m.assert();
    }

    #[tokio::test]
    async fn post_without_params_keeps_path_bare() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(POST).path("/items").json_body(json!({"x": 1}));
            then.status(200).body("{}");
        });

        let client = HttpClient::new(server.base_url());
        client.post("/items", &json!({"x": 1}), &[]).await.unwrap();
        m.assert();
    }

    #[tokio::test]
    async fn put_merges_call_params_over_defaults() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(PUT)
                .path("/items/7")
                .query_param("version", "v2")
                .json_body(json!({"name": "n"}));
            then.status(200).body("{}");
        });

        let client = HttpClient::new(server.base_url()).set_default_param("version", "v1");
        client
            .put("/items/7", &json!({"name": "n"}), &[("version", "v2")])
            .await
            .unwrap();
        m.assert();
    }

    #[tokio::test]
    async fn delete_uses_query_mechanism() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(DELETE).path("/items/7").query_param("force", "1");
            then.status(204);
        });

        let client = HttpClient::new(server.base_url());
        let resp = client.delete("/items/7", &[("force", "1")]).await.unwrap();
        assert_eq!(resp.status.as_u16(), 204);
        m.assert();
    }

    #[tokio::test]
    async fn headers_are_applied() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(GET)
                .path("/skills")
                .header("Authorization", "Bearer token")
                .header("Accept", "application/json");
            then.status(200).body("[]");
        });

        let client = HttpClient::new(server.base_url())
            .set_header("Accept", "application/json")
            .set_header("Authorization", "Bearer token");
        client.get("/skills", &[]).await.unwrap();
        m.assert();
    }

    #[tokio::test]
    async fn non_success_status_is_a_normal_response() {
        let server = MockServer::start();
        let _m = server.mock(|when, then| {
            when.method(GET).path("/skills");
            then.status(404).body("missing");
        });

        let client = HttpClient::new(server.base_url());
        let resp = client.get("/skills", &[]).await.unwrap();

        assert_eq!(resp.status.as_u16(), 404);
        assert!(!resp.is_success());
        assert_eq!(resp.text(), "missing");
    }

    #[tokio::test]
    async fn http_status_is_never_retried() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(GET).path("/skills");
            then.status(500).body("boom");
        });

        let client = HttpClient::new(server.base_url()).set_retry(3, 10);
        let resp = client.get("/skills", &[]).await.unwrap();

        assert_eq!(resp.status.as_u16(), 500);
        assert_eq!(m.hits(), 1);
    }

    #[tokio::test]
    async fn transport_failure_surfaces_after_retries() {
        // Port 9 (discard) is typically closed; connecting fails fast.
        let client = HttpClient::new("http://127.0.0.1:9").set_retry(3, 20);
        let start = Instant::now();
        let err = client.get("/skills", &[]).await.unwrap_err();

        assert!(matches!(err, SkillwireError::Transport(_)));
        // Two inter-attempt delays of 20ms must have elapsed.
        assert!(start.elapsed() >= Duration::from_millis(40));
    }

    #[tokio::test]
    async fn zero_retry_times_means_single_attempt() {
        let client = HttpClient::new("http://127.0.0.1:9").set_retry(0, 5_000);
        let start = Instant::now();
        let err = client.get("/skills", &[]).await.unwrap_err();

        assert!(matches!(err, SkillwireError::Transport(_)));
        // No retry, so the 5s inter-attempt delay never runs.
        assert!(start.elapsed() < Duration::from_secs(4));
    }

    #[tokio::test]
    async fn timeout_exhaustion_is_a_transport_failure() {
        let server = MockServer::start();
        let _m = server.mock(|when, then| {
            when.method(GET).path("/slow");
            then.status(200).body("late").delay(Duration::from_secs(3));
        });

        let client = HttpClient::new(server.base_url()).set_timeout(1);
        let err = client.get("/slow", &[]).await.unwrap_err();
        assert!(matches!(err, SkillwireError::Transport(_)));
    }

    #[tokio::test]
    async fn response_json_decodes_body() {
        let server = MockServer::start();
        let _m = server.mock(|when, then| {
            when.method(GET).path("/skills");
            then.status(200).json_body(json!({"skills": ["rust"]}));
        });

        let client = HttpClient::new(server.base_url());
        let resp = client.get("/skills", &[]).await.unwrap();
        let parsed: serde_json::Value = resp.json().unwrap();
        assert_eq!(parsed["skills"][0], "rust");
    }
}
