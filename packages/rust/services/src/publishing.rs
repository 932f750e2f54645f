//! Publishing Service interface and its HTTP implementation.

use std::future::Future;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use helpforge_shared::{
    AffiliateLink, Article, ArticleContent, ArticleStatus, HelpForgeError, Result,
};

use crate::BackendClient;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Payload for `POST /publish_to_wordpress`.
#[derive(Debug, Clone, Serialize)]
pub struct PublishRequest {
    pub title: String,
    pub content: ArticleContent,
    pub affiliate_links: Vec<AffiliateLink>,
    pub error: String,
    pub model: String,
    pub status: ArticleStatus,
}

impl PublishRequest {
    /// Build a publish payload from a generated article and a target status.
    ///
    /// The status is caller-selected and uniform for a whole publish run;
    /// the article's own lifecycle tag is not consulted.
    pub fn from_article(article: &Article, status: ArticleStatus) -> Self {
        Self {
            title: article.title.clone(),
            content: article.content.clone(),
            affiliate_links: article.affiliate_links.clone(),
            error: article.metadata.error.clone(),
            model: article.metadata.model.clone(),
            status,
        }
    }
}

/// Response from a successful publish.
#[derive(Debug, Clone, Deserialize)]
pub struct PublishedPost {
    /// Canonical URL of the created post.
    pub url: String,
    /// CMS post identifier.
    #[serde(default)]
    pub post_id: u64,
}

#[derive(Debug, Deserialize)]
struct PublishResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    url: String,
    #[serde(default)]
    post_id: u64,
    #[serde(default)]
    error: Option<String>,
}

// ---------------------------------------------------------------------------
// PublishingService
// ---------------------------------------------------------------------------

/// External collaborator that persists an article to the CMS.
pub trait PublishingService {
    /// Publish one article. A failure here is an item-level failure: the
    /// publish aggregator counts it and continues with the rest.
    fn publish(
        &self,
        request: &PublishRequest,
    ) -> impl Future<Output = Result<PublishedPost>> + Send;
}

impl PublishingService for BackendClient {
    #[instrument(skip(self, request), fields(title = %request.title, status = %request.status))]
    async fn publish(&self, request: &PublishRequest) -> Result<PublishedPost> {
        let endpoint = self.endpoint("/publish_to_wordpress");

        let response = self
            .http()
            .post(&endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| HelpForgeError::Network(format!("{endpoint}: {e}")))?;

        let parsed: PublishResponse = Self::read_json(&endpoint, response).await?;

        if !parsed.success {
            return Err(HelpForgeError::Publish {
                title: request.title.clone(),
                detail: parsed.error.unwrap_or_else(|| "unknown publish error".into()),
            });
        }

        debug!(url = %parsed.url, post_id = parsed.post_id, "article published");
        Ok(PublishedPost {
            url: parsed.url,
            post_id: parsed.post_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use helpforge_shared::ArticleMetadata;

    fn sample_article() -> Article {
        Article {
            title: "Error R01 en Archer C7".into(),
            content: ArticleContent {
                introduction: "El router no tiene salida a Internet.".into(),
                error_meaning: None,
                diagnosis: None,
                solution_steps: vec!["Reinicia el router".into()],
                common_failures: vec![],
            },
            affiliate_links: vec![],
            metadata: ArticleMetadata {
                model: "TP-Link Archer C7".into(),
                error: "Error R01".into(),
                pdf_chunks: 8,
                text_length: 20930,
                generated_at: Utc::now(),
            },
            status: ArticleStatus::Draft,
        }
    }

    #[test]
    fn publish_request_carries_article_fields() {
        let request = PublishRequest::from_article(&sample_article(), ArticleStatus::Publish);
        assert_eq!(request.error, "Error R01");
        assert_eq!(request.model, "TP-Link Archer C7");
        assert_eq!(request.status, ArticleStatus::Publish);

        let json = serde_json::to_value(&request).expect("serialize");
        assert_eq!(json["status"], "publish");
        assert_eq!(json["content"]["introduction"], "El router no tiene salida a Internet.");
    }

    #[test]
    fn failed_publish_response_deserializes() {
        let json = r#"{"success": false, "error": "invalid credentials"}"#;
        let parsed: PublishResponse = serde_json::from_str(json).expect("parse");
        assert!(!parsed.success);
        assert_eq!(parsed.error.as_deref(), Some("invalid credentials"));
        assert_eq!(parsed.post_id, 0);
    }
}
