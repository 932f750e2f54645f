//! Batch orchestration and publish aggregation for HelpForge.
//!
//! This crate ties the Generation and Publishing services into the two
//! end-to-end workflows: `run_batch` (generate N articles for one device)
//! and `publish_batch` (persist a set of articles to the CMS).

pub mod batch;
pub mod cancel;
pub mod progress;
pub mod publish;

pub use batch::{
    BatchItemError, BatchRequest, BatchResult, ErrorSource, MAX_BATCH_ERRORS, Orchestrator,
};
pub use cancel::CancelToken;
pub use progress::{ProgressReporter, SilentProgress};
pub use publish::{MAX_PUBLISH_CONCURRENCY, PublishSummary, publish_batch};
