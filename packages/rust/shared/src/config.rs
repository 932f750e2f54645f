//! Application configuration for HelpForge.
//!
//! User config lives at `~/.helpforge/helpforge.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{HelpForgeError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "helpforge.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".helpforge";

// ---------------------------------------------------------------------------
// Config structs (matching helpforge.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Generator backend settings.
    #[serde(default)]
    pub backend: BackendConfig,

    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

/// `[backend]` section — the article generator API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the generator backend.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".into()
}
fn default_timeout_secs() -> u64 {
    120
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Default target status when publishing ("draft" or "publish").
    #[serde(default = "default_status")]
    pub status: String,

    /// Maximum simultaneous publish requests.
    #[serde(default = "default_publish_concurrency")]
    pub publish_concurrency: u32,

    /// Default directory for exported article files.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            status: default_status(),
            publish_concurrency: default_publish_concurrency(),
            output_dir: default_output_dir(),
        }
    }
}

fn default_status() -> String {
    "draft".into()
}
fn default_publish_concurrency() -> u32 {
    5
}
fn default_output_dir() -> String {
    "~/helpforge-articles".into()
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.helpforge/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| HelpForgeError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.helpforge/helpforge.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| HelpForgeError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        HelpForgeError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Expand a leading `~/` in a configured path to the user's home directory.
pub fn expand_home(path: &str) -> Result<PathBuf> {
    match path.strip_prefix("~/") {
        Some(rest) => {
            let home = dirs::home_dir()
                .ok_or_else(|| HelpForgeError::config("could not determine home directory"))?;
            Ok(home.join(rest))
        }
        None => Ok(PathBuf::from(path)),
    }
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| HelpForgeError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| HelpForgeError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| HelpForgeError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("base_url"));
        assert!(toml_str.contains("publish_concurrency"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.backend.base_url, "http://localhost:8000");
        assert_eq!(parsed.defaults.publish_concurrency, 5);
        assert_eq!(parsed.defaults.status, "draft");
    }

    #[test]
    fn expand_home_only_touches_tilde_prefix() {
        let expanded = expand_home("~/helpforge-articles").expect("expand");
        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.ends_with("helpforge-articles"));

        let plain = expand_home("/tmp/articles").expect("expand");
        assert_eq!(plain, PathBuf::from("/tmp/articles"));
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[backend]
base_url = "https://generator.example.com"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.backend.base_url, "https://generator.example.com");
        assert_eq!(config.backend.timeout_secs, 120);
        assert_eq!(config.defaults.status, "draft");
    }
}
