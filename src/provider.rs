use async_trait::async_trait;

use crate::error::CoreResult;
use crate::http_client::ApiResponse;

/// Contract every provider service implements.
#[async_trait]
pub trait Provider: Send + Sync + std::fmt::Debug {
    /// Issue the provider-specific skill-listing request. Params pass
    /// through as query parameters merged with the service's defaults;
    /// the response comes back raw, with no domain-level parsing.
    async fn fetch_skills(&self, params: &[(&str, &str)]) -> CoreResult<ApiResponse>;

    /// Human-readable identifier derived from the service type name
    /// (trailing `Service` characters trimmed).
    fn provider_name(&self) -> String;
}
