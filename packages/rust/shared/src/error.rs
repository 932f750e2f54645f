//! Error types for HelpForge.
//!
//! Library crates use [`HelpForgeError`] via `thiserror`.
//! The app crate (cli) wraps this with `color-eyre` for rich diagnostics.

/// Top-level error type for all HelpForge operations.
#[derive(Debug, thiserror::Error)]
pub enum HelpForgeError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error talking to the generator backend or the CMS.
    #[error("network error: {0}")]
    Network(String),

    /// The backend answered, but with an error response.
    #[error("api error ({endpoint}): {message}")]
    Api { endpoint: String, message: String },

    /// Request validation error, raised before any network activity.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// A single article could not be generated. Recorded in the batch
    /// error log, never raised out of `run_batch`.
    #[error("generation failed for '{error}': {detail}")]
    Generation { error: String, detail: String },

    /// A single article could not be published. Counted by the publish
    /// aggregator, never raised out of `publish_batch`.
    #[error("publish failed for '{title}': {detail}")]
    Publish { title: String, detail: String },

    /// A second batch was started while one is still in flight.
    #[error("a batch is already running on this orchestrator")]
    BatchInFlight,

    /// Filesystem I/O error (config files, article export).
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: std::path::PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, HelpForgeError>;

impl HelpForgeError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Create an API error for a given backend endpoint.
    pub fn api(endpoint: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Api {
            endpoint: endpoint.into(),
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<std::path::PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = HelpForgeError::config("missing backend URL");
        assert_eq!(err.to_string(), "config error: missing backend URL");

        let err = HelpForgeError::validation("errors list is empty");
        assert!(err.to_string().contains("errors list is empty"));
    }

    #[test]
    fn generation_error_carries_item() {
        let err = HelpForgeError::Generation {
            error: "Error E07".into(),
            detail: "timeout".into(),
        };
        assert_eq!(err.to_string(), "generation failed for 'Error E07': timeout");
    }
}
