//! Batch generation orchestrator: one device, many errors, one PDF.
//!
//! Generation calls within a batch are strictly sequential — the backend
//! reuses PDF parsing state across calls for the same URL, so concurrent
//! calls would duplicate parsing work or race on that shared state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, instrument, warn};
use url::Url;

use helpforge_services::GenerationService;
use helpforge_shared::{Article, ArticleStatus, HelpForgeError, Result};

use crate::cancel::CancelToken;
use crate::progress::ProgressReporter;

/// Maximum number of custom errors accepted per batch.
pub const MAX_BATCH_ERRORS: usize = 10;

// ---------------------------------------------------------------------------
// BatchRequest
// ---------------------------------------------------------------------------

/// Where the batch's error list comes from.
///
/// A tagged variant instead of a `device_type` + `use_common_errors` pair:
/// selecting a device type and supplying custom errors are mutually
/// exclusive, and this makes the invalid combination unrepresentable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorSource {
    /// Caller-supplied error descriptions (1..=10 after trimming).
    Explicit(Vec<String>),
    /// Use the predefined error set of a catalog device type.
    ByDeviceType(String),
}

/// One batch submission: a device, its manual, and the errors to cover.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRequest {
    /// URL of the device's PDF manual.
    pub pdf_url: String,
    /// Device model (e.g. "Echo Dot 4").
    pub model: String,
    /// Error list source.
    pub source: ErrorSource,
}

impl BatchRequest {
    /// Validate the request shape. Always runs first inside `run_batch`;
    /// callers may also invoke it directly to fail fast before any
    /// network activity of their own.
    pub fn validate(&self) -> Result<()> {
        if self.pdf_url.trim().is_empty() {
            return Err(HelpForgeError::validation("pdf_url must not be empty"));
        }
        Url::parse(&self.pdf_url)
            .map_err(|e| HelpForgeError::validation(format!("invalid pdf_url: {e}")))?;

        if self.model.trim().is_empty() {
            return Err(HelpForgeError::validation("model must not be empty"));
        }

        if let ErrorSource::Explicit(errors) = &self.source {
            if !errors.iter().any(|e| !e.trim().is_empty()) {
                return Err(HelpForgeError::validation(
                    "at least one non-blank error is required",
                ));
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// BatchResult
// ---------------------------------------------------------------------------

/// One failed item in a batch, in input order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchItemError {
    /// The error description that failed to generate.
    pub error: String,
    /// Failure detail from the Generation Service.
    pub detail: String,
}

/// Outcome of one batch submission. Freshly allocated per run, immutable
/// after return.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResult {
    /// Items attempted (`successful + failed`).
    pub total: usize,
    /// Articles generated.
    pub successful: usize,
    /// Items that failed.
    pub failed: usize,
    /// The generated articles (successes only).
    pub articles: Vec<Article>,
    /// Per-item failures, in input order.
    pub errors_log: Vec<BatchItemError>,
    /// When the batch started.
    pub started_at: DateTime<Utc>,
    /// When the batch finished (also set on early cancellation).
    pub completed_at: Option<DateTime<Utc>>,
}

impl BatchResult {
    fn new() -> Self {
        Self {
            total: 0,
            successful: 0,
            failed: 0,
            articles: Vec::new(),
            errors_log: Vec::new(),
            started_at: Utc::now(),
            completed_at: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// Drives N sequential generation calls for one device.
///
/// Progress counters are instance-scoped, so only one batch may be in
/// flight per orchestrator; a second `run_batch` while one runs fails
/// with [`HelpForgeError::BatchInFlight`].
#[derive(Debug, Default)]
pub struct Orchestrator {
    in_flight: AtomicBool,
}

/// Clears the in-flight flag when the batch returns, on every exit path.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Orchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one batch: validate, resolve the error list, then generate
    /// sequentially, accumulating per-item successes and failures.
    ///
    /// A single item's failure never aborts the batch. Only pre-flight
    /// validation (and the in-flight guard) can raise out of this method.
    #[instrument(skip_all, fields(model = %request.model))]
    pub async fn run_batch<G: GenerationService>(
        &self,
        service: &G,
        request: &BatchRequest,
        progress: &dyn ProgressReporter,
        cancel: &CancelToken,
    ) -> Result<BatchResult> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| HelpForgeError::BatchInFlight)?;
        let _guard = InFlightGuard(&self.in_flight);

        request.validate()?;
        let errors = resolve_errors(service, &request.source).await?;
        let total = errors.len();

        info!(total, pdf_url = %request.pdf_url, "starting batch generation");
        progress.batch_started(total);

        let mut result = BatchResult::new();

        for (index, error) in errors.iter().enumerate() {
            if cancel.is_cancelled() {
                warn!(
                    attempted = index,
                    remaining = total - index,
                    "batch cancelled, returning partial result"
                );
                break;
            }

            let current = index + 1;
            progress.item_started(current, total, error);

            match service.generate(&request.pdf_url, error, &request.model).await {
                Ok(mut article) => {
                    article.status = ArticleStatus::Draft;
                    result.articles.push(article);
                    result.successful += 1;
                    progress.item_finished(current, total, error, true);
                }
                Err(e) => {
                    let detail = match e {
                        HelpForgeError::Generation { detail, .. } => detail,
                        other => other.to_string(),
                    };
                    warn!(error = %error, detail = %detail, "item generation failed");
                    result.errors_log.push(BatchItemError {
                        error: error.clone(),
                        detail,
                    });
                    result.failed += 1;
                    progress.item_finished(current, total, error, false);
                }
            }
        }

        result.total = result.successful + result.failed;
        result.completed_at = Some(Utc::now());
        progress.done(&result);

        info!(
            total = result.total,
            successful = result.successful,
            failed = result.failed,
            "batch generation complete"
        );

        Ok(result)
    }
}

/// Resolve the working error list for a batch.
///
/// Explicit entries are trimmed, blanks dropped, and capped at
/// [`MAX_BATCH_ERRORS`]; a device type's catalog list is used verbatim.
/// An empty resolved list is a validation failure, reported before any
/// generation call.
async fn resolve_errors<G: GenerationService>(
    service: &G,
    source: &ErrorSource,
) -> Result<Vec<String>> {
    let errors = match source {
        ErrorSource::Explicit(raw) => raw
            .iter()
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty())
            .take(MAX_BATCH_ERRORS)
            .collect::<Vec<_>>(),
        ErrorSource::ByDeviceType(device_type) => service.device_errors(device_type).await?,
    };

    if errors.is_empty() {
        return Err(HelpForgeError::validation(match source {
            ErrorSource::Explicit(_) => "no usable errors after trimming".to_string(),
            ErrorSource::ByDeviceType(key) => {
                format!("device type '{key}' has no predefined errors")
            }
        }));
    }

    Ok(errors)
}
