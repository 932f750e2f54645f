//! Service interfaces and HTTP clients for the generator backend.
//!
//! The orchestration core talks to two external collaborators through the
//! traits defined here: the [`GenerationService`] (turns a PDF + error +
//! model triple into an [`Article`] and owns the device-type catalog) and
//! the [`PublishingService`] (persists an article to the CMS). The
//! `reqwest`-backed [`BackendClient`] implements both against the backend's
//! JSON API.

mod generation;
mod publishing;

pub use generation::{DeviceTypeInfo, GenerationService, HealthStatus};
pub use publishing::{PublishRequest, PublishedPost, PublishingService};

use std::time::Duration;

use helpforge_shared::{BackendConfig, HelpForgeError, Result};

/// User-Agent string for backend requests.
const USER_AGENT: &str = concat!("HelpForge/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// BackendClient
// ---------------------------------------------------------------------------

/// HTTP client for the article generator backend.
///
/// Cheap to clone — the inner `reqwest::Client` is reference-counted.
#[derive(Debug, Clone)]
pub struct BackendClient {
    base_url: String,
    client: reqwest::Client,
}

impl BackendClient {
    /// Create a client from backend configuration.
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(HelpForgeError::config("backend base_url must not be empty"));
        }

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| HelpForgeError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { base_url, client })
    }

    /// Full URL for a backend endpoint path.
    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.client
    }

    /// Read a response body as JSON, mapping HTTP errors to [`HelpForgeError::Api`].
    pub(crate) async fn read_json<T: serde::de::DeserializeOwned>(
        endpoint: &str,
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(HelpForgeError::api(
                endpoint,
                format!("HTTP {status}: {body}"),
            ));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| HelpForgeError::api(endpoint, format!("invalid JSON response: {e}")))
    }
}
