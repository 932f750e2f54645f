//! Generation Service interface and its HTTP implementation.

use std::collections::BTreeMap;
use std::future::Future;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use helpforge_shared::{Article, HelpForgeError, Result, validate_article};

use crate::BackendClient;

// ---------------------------------------------------------------------------
// Catalog types
// ---------------------------------------------------------------------------

/// Catalog entry for one device type, as served by `GET /device_types`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceTypeInfo {
    /// Human-readable name (e.g. "Alexa / Echo").
    pub name: String,
    /// Number of predefined errors for this device type.
    pub errors_count: usize,
    /// A few example errors shown in pickers.
    #[serde(default)]
    pub sample_errors: Vec<String>,
}

/// Backend health response.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

// ---------------------------------------------------------------------------
// GenerationService
// ---------------------------------------------------------------------------

/// External collaborator that turns a PDF + error + model triple into an
/// article, and owns the device-type catalog.
///
/// The catalog is operational data held by the backend; it is never
/// embedded in the orchestration core.
pub trait GenerationService {
    /// Generate one article. A failure here is an item-level failure: the
    /// batch orchestrator records it and moves on.
    fn generate(
        &self,
        pdf_url: &str,
        error: &str,
        model: &str,
    ) -> impl Future<Output = Result<Article>> + Send;

    /// List the device-type catalog.
    fn list_device_types(
        &self,
    ) -> impl Future<Output = Result<BTreeMap<String, DeviceTypeInfo>>> + Send;

    /// Fetch the full predefined error list for one device type.
    fn device_errors(&self, device_type: &str) -> impl Future<Output = Result<Vec<String>>> + Send;
}

// ---------------------------------------------------------------------------
// HTTP implementation
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    pdf_url: &'a str,
    error: &'a str,
    model: &'a str,
}

#[derive(Debug, Deserialize)]
struct DeviceErrorsResponse {
    errors: Vec<String>,
}

impl GenerationService for BackendClient {
    #[instrument(skip(self), fields(error = %error, model = %model))]
    async fn generate(&self, pdf_url: &str, error: &str, model: &str) -> Result<Article> {
        let endpoint = self.endpoint("/generate_article");

        let response = self
            .http()
            .post(&endpoint)
            .json(&GenerateRequest {
                pdf_url,
                error,
                model,
            })
            .send()
            .await
            .map_err(|e| HelpForgeError::Network(format!("{endpoint}: {e}")))?;

        let raw: serde_json::Value = Self::read_json(&endpoint, response).await?;
        let article = validate_article(&raw)?;

        debug!(title = %article.title, chunks = article.metadata.pdf_chunks, "article generated");
        Ok(article)
    }

    async fn list_device_types(&self) -> Result<BTreeMap<String, DeviceTypeInfo>> {
        let endpoint = self.endpoint("/device_types");

        let response = self
            .http()
            .get(&endpoint)
            .send()
            .await
            .map_err(|e| HelpForgeError::Network(format!("{endpoint}: {e}")))?;

        Self::read_json(&endpoint, response).await
    }

    async fn device_errors(&self, device_type: &str) -> Result<Vec<String>> {
        let endpoint = self.endpoint(&format!("/device_types/{device_type}/errors"));

        let response = self
            .http()
            .get(&endpoint)
            .send()
            .await
            .map_err(|e| HelpForgeError::Network(format!("{endpoint}: {e}")))?;

        let parsed: DeviceErrorsResponse = Self::read_json(&endpoint, response).await?;
        Ok(parsed.errors)
    }
}

impl BackendClient {
    /// Check backend liveness via `GET /health`.
    pub async fn health(&self) -> Result<HealthStatus> {
        let endpoint = self.endpoint("/health");

        let response = self
            .http()
            .get(&endpoint)
            .send()
            .await
            .map_err(|e| HelpForgeError::Network(format!("{endpoint}: {e}")))?;

        Self::read_json(&endpoint, response).await
    }
}
