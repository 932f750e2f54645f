//! Publish aggregator: persist a set of articles to the CMS.
//!
//! Unlike generation, publish calls have no cross-item ordering
//! dependency, so they are dispatched with bounded parallelism.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};

use helpforge_services::{PublishRequest, PublishingService};
use helpforge_shared::{Article, ArticleStatus};

use crate::cancel::CancelToken;

/// Hard cap on simultaneous publish requests, to avoid overwhelming the CMS.
pub const MAX_PUBLISH_CONCURRENCY: usize = 5;

// ---------------------------------------------------------------------------
// PublishSummary
// ---------------------------------------------------------------------------

/// Aggregate outcome of one publish-all invocation. Only counts are
/// retained; per-item detail is logged, not returned.
#[derive(Debug, Clone, Serialize)]
pub struct PublishSummary {
    /// True iff no item failed.
    pub success: bool,
    /// Articles published.
    pub published: usize,
    /// Articles that failed to publish.
    pub failed: usize,
}

// ---------------------------------------------------------------------------
// publish_batch
// ---------------------------------------------------------------------------

/// Publish every article with the given target status, counting successes
/// and failures. A per-item failure never stops the remaining publishes;
/// cancellation stops dispatching new items (in-flight ones finish).
#[instrument(skip_all, fields(count = articles.len(), status = %status))]
pub async fn publish_batch<P>(
    publisher: &P,
    articles: &[Article],
    status: ArticleStatus,
    concurrency: usize,
    cancel: &CancelToken,
) -> PublishSummary
where
    P: PublishingService + Clone + Send + Sync + 'static,
{
    let concurrency = concurrency.clamp(1, MAX_PUBLISH_CONCURRENCY);
    let semaphore = Arc::new(Semaphore::new(concurrency));
    let mut tasks: JoinSet<Result<String, (String, String)>> = JoinSet::new();

    info!(concurrency, "starting batch publish");

    for article in articles {
        if cancel.is_cancelled() {
            warn!("publish cancelled, remaining articles not attempted");
            break;
        }

        let permit = semaphore
            .clone()
            .acquire_owned()
            .await
            .expect("semaphore closed");
        let publisher = publisher.clone();
        let request = PublishRequest::from_article(article, status);

        tasks.spawn(async move {
            let _permit = permit;
            let title = request.title.clone();
            match publisher.publish(&request).await {
                Ok(post) => {
                    debug!(title = %title, url = %post.url, "article published");
                    Ok(title)
                }
                Err(e) => Err((title, e.to_string())),
            }
        });
    }

    let mut published = 0;
    let mut failed = 0;

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Ok(_title)) => published += 1,
            Ok(Err((title, detail))) => {
                warn!(title = %title, detail = %detail, "item publish failed");
                failed += 1;
            }
            Err(e) => {
                warn!(error = %e, "publish task failed to run");
                failed += 1;
            }
        }
    }

    info!(published, failed, "batch publish complete");

    PublishSummary {
        success: failed == 0,
        published,
        failed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use helpforge_services::PublishedPost;
    use helpforge_shared::{
        ArticleContent, ArticleMetadata, HelpForgeError, Result as ForgeResult,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn article(title: &str) -> Article {
        Article {
            title: title.into(),
            content: ArticleContent {
                introduction: "Introducción.".into(),
                error_meaning: None,
                diagnosis: None,
                solution_steps: vec![],
                common_failures: vec![],
            },
            affiliate_links: vec![],
            metadata: ArticleMetadata {
                model: "Echo Dot 4".into(),
                error: "E01".into(),
                pdf_chunks: 1,
                text_length: 100,
                generated_at: Utc::now(),
            },
            status: ArticleStatus::Draft,
        }
    }

    /// Scripted publisher: fails listed titles, tracks peak concurrency.
    #[derive(Clone, Default)]
    struct MockPublisher {
        fail_titles: Vec<String>,
        active: Arc<AtomicUsize>,
        peak: Arc<AtomicUsize>,
    }

    impl PublishingService for MockPublisher {
        async fn publish(&self, request: &PublishRequest) -> ForgeResult<PublishedPost> {
            let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(active, Ordering::SeqCst);
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            self.active.fetch_sub(1, Ordering::SeqCst);

            if self.fail_titles.iter().any(|t| t == &request.title) {
                return Err(HelpForgeError::Publish {
                    title: request.title.clone(),
                    detail: "invalid credentials".into(),
                });
            }
            Ok(PublishedPost {
                url: format!("https://cms.example.com/{}", request.title),
                post_id: 42,
            })
        }
    }

    #[tokio::test]
    async fn second_failure_is_counted_not_fatal() {
        let publisher = MockPublisher {
            fail_titles: vec!["two".into()],
            ..Default::default()
        };
        let articles = vec![article("one"), article("two"), article("three")];

        let summary = publish_batch(
            &publisher,
            &articles,
            ArticleStatus::Draft,
            5,
            &CancelToken::new(),
        )
        .await;

        assert!(!summary.success);
        assert_eq!(summary.published, 2);
        assert_eq!(summary.failed, 1);
    }

    #[tokio::test]
    async fn all_successes_report_success() {
        let publisher = MockPublisher::default();
        let articles = vec![article("one"), article("two")];

        let summary = publish_batch(
            &publisher,
            &articles,
            ArticleStatus::Publish,
            5,
            &CancelToken::new(),
        )
        .await;

        assert!(summary.success);
        assert_eq!(summary.published, 2);
        assert_eq!(summary.failed, 0);
    }

    #[tokio::test]
    async fn concurrency_stays_within_the_cap() {
        let publisher = MockPublisher::default();
        let articles: Vec<Article> = (0..8).map(|i| article(&format!("a{i}"))).collect();

        publish_batch(
            &publisher,
            &articles,
            ArticleStatus::Draft,
            2,
            &CancelToken::new(),
        )
        .await;

        assert!(publisher.peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn oversized_concurrency_is_clamped() {
        let publisher = MockPublisher::default();
        let articles: Vec<Article> = (0..12).map(|i| article(&format!("a{i}"))).collect();

        publish_batch(
            &publisher,
            &articles,
            ArticleStatus::Draft,
            100,
            &CancelToken::new(),
        )
        .await;

        assert!(publisher.peak.load(Ordering::SeqCst) <= MAX_PUBLISH_CONCURRENCY);
    }

    #[tokio::test]
    async fn cancelled_before_start_publishes_nothing() {
        let publisher = MockPublisher::default();
        let articles = vec![article("one"), article("two")];
        let cancel = CancelToken::new();
        cancel.cancel();

        let summary =
            publish_batch(&publisher, &articles, ArticleStatus::Draft, 5, &cancel).await;

        assert_eq!(summary.published, 0);
        assert_eq!(summary.failed, 0);
        assert_eq!(publisher.active.load(Ordering::SeqCst), 0);
    }
}
