use async_trait::async_trait;
use secrecy::ExposeSecret;

use crate::config::ServicesCfg;
use crate::error::CoreResult;
use crate::http_client::{ApiResponse, HttpClient};
use crate::naming;
use crate::provider::Provider;

/// Client for the Sharp skills API.
#[derive(Debug)]
pub struct SharpApiService {
    http: HttpClient,
    skills_path: String,
}

impl SharpApiService {
    pub const TYPE_NAME: &'static str = "SharpApiService";

    /// Reads the `sharp_api` service block (a missing block or missing
    /// keys fall back to their documented defaults) and wires the client
    /// from it.
    pub fn new(services: &ServicesCfg) -> Self {
        let cfg = services.for_type(Self::TYPE_NAME);
        let http = HttpClient::new(cfg.base_url)
            .set_header("Accept", "application/json")
            .set_header("Content-Type", "application/json")
            .set_header(
                "Authorization",
                format!("Bearer {}", cfg.api_key.expose_secret()),
            )
            .set_default_param("version", cfg.version)
            .set_timeout(cfg.timeout)
            .set_retry(cfg.retry_times, cfg.retry_delay);
        Self {
            http,
            skills_path: cfg.skills_path,
        }
    }
}

#[async_trait]
impl Provider for SharpApiService {
    async fn fetch_skills(&self, params: &[(&str, &str)]) -> CoreResult<ApiResponse> {
        self.http.get(&self.skills_path, params).await
    }

    fn provider_name(&self) -> String {
        naming::provider_name_for(Self::TYPE_NAME)
    }
}
