//! Shared types, error model, and configuration for HelpForge.
//!
//! This crate is the foundation depended on by all other HelpForge crates.
//! It provides:
//! - [`HelpForgeError`] — the unified error type
//! - The article domain model ([`Article`], [`ArticleContent`], [`ArticleStatus`])
//! - Configuration ([`AppConfig`], config loading)

pub mod article;
pub mod config;
pub mod error;

// Re-export public API at crate root for ergonomic imports.
pub use article::{
    AffiliateLink, Article, ArticleContent, ArticleMetadata, ArticleStatus, validate_article,
};
pub use config::{
    AppConfig, BackendConfig, DefaultsConfig, config_dir, config_file_path, expand_home,
    init_config, load_config, load_config_from,
};
pub use error::{HelpForgeError, Result};
