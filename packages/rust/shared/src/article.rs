//! Core domain types for generated help articles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{HelpForgeError, Result};

// ---------------------------------------------------------------------------
// ArticleStatus
// ---------------------------------------------------------------------------

/// Lifecycle tag of a generated article.
///
/// `Draft` and `Publish` are the target visibility states the CMS accepts;
/// `Failed` marks an article that could not be generated. A failed article
/// never carries content — the failure detail lives in the batch error log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleStatus {
    Draft,
    Publish,
    Failed,
}

impl Default for ArticleStatus {
    fn default() -> Self {
        Self::Draft
    }
}

impl std::fmt::Display for ArticleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Draft => "draft",
            Self::Publish => "publish",
            Self::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for ArticleStatus {
    type Err = HelpForgeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "draft" => Ok(Self::Draft),
            "publish" => Ok(Self::Publish),
            "failed" => Ok(Self::Failed),
            other => Err(HelpForgeError::validation(format!(
                "unknown article status '{other}': expected 'draft', 'publish', or 'failed'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// ArticleContent
// ---------------------------------------------------------------------------

/// The sectioned body of a help article.
///
/// Every section except the introduction is optional; serializers omit
/// absent or empty sections entirely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleContent {
    /// Opening paragraph. Always present — summaries rely on it.
    pub introduction: String,
    /// Explanation of what the error code means.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_meaning: Option<String>,
    /// How to diagnose the root cause.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<String>,
    /// Ordered repair steps.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub solution_steps: Vec<String>,
    /// Related failures the reader may also be hitting.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub common_failures: Vec<String>,
}

// ---------------------------------------------------------------------------
// AffiliateLink
// ---------------------------------------------------------------------------

/// A recommended product with its affiliate URL, produced by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AffiliateLink {
    /// Product name.
    pub name: String,
    /// Product category (e.g. "repuesto", "herramienta").
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Why this product helps with the error.
    #[serde(default)]
    pub reason: String,
    /// Tagged store URL.
    pub affiliate_link: String,
}

// ---------------------------------------------------------------------------
// ArticleMetadata
// ---------------------------------------------------------------------------

/// Provenance metadata attached to every generated article.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleMetadata {
    /// Device model the article was generated for.
    pub model: String,
    /// Error description that drove the generation.
    pub error: String,
    /// Number of PDF chunks the backend retrieved from.
    #[serde(default)]
    pub pdf_chunks: u32,
    /// Length of the source text in characters.
    #[serde(default)]
    pub text_length: u64,
    /// When the backend produced the article.
    pub generated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Article
// ---------------------------------------------------------------------------

/// A structured help article as returned by the Generation Service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    /// Article title (non-empty).
    pub title: String,
    /// Sectioned body.
    pub content: ArticleContent,
    /// Recommended products (possibly empty).
    #[serde(default)]
    pub affiliate_links: Vec<AffiliateLink>,
    /// Provenance metadata.
    pub metadata: ArticleMetadata,
    /// Lifecycle tag.
    #[serde(default)]
    pub status: ArticleStatus,
}

/// Validate a raw JSON value as an [`Article`].
///
/// Pure construction: rejects a missing or blank `title`, a missing
/// `content` object, and a missing introduction. The input is not mutated.
pub fn validate_article(raw: &serde_json::Value) -> Result<Article> {
    let article: Article = serde_json::from_value(raw.clone())
        .map_err(|e| HelpForgeError::validation(format!("malformed article: {e}")))?;

    if article.title.trim().is_empty() {
        return Err(HelpForgeError::validation("article title must not be empty"));
    }
    if article.content.introduction.trim().is_empty() {
        return Err(HelpForgeError::validation(
            "article content must include an introduction",
        ));
    }

    Ok(article)
}
