//! Application state shared by all handlers

use axum::http::HeaderName;
use intake_core::Config;
use intake_services::IngestionService;

/// How request identity and origin are read from incoming requests.
#[derive(Clone, Debug)]
pub struct RequestConfig {
    /// Header carrying the authenticated principal id, set by the identity layer in front
    pub principal_header: HeaderName,
    pub trusted_proxy_count: usize,
}

impl RequestConfig {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let principal_header = HeaderName::try_from(config.principal_header().to_lowercase())
            .map_err(|e| {
                anyhow::anyhow!(
                    "PRINCIPAL_HEADER '{}' is not a valid header name: {}",
                    config.principal_header(),
                    e
                )
            })?;

        Ok(Self {
            principal_header,
            trusted_proxy_count: config.trusted_proxy_count(),
        })
    }
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            principal_header: HeaderName::from_static("x-principal-id"),
            trusted_proxy_count: 0,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub ingestion: IngestionService,
    pub request: RequestConfig,
    pub is_production: bool,
}
