//! Application configuration for internwatch.
//!
//! Config lives in `internwatch.toml` in the working directory (optional).
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{InternwatchError, Result};

/// Default configuration file name, resolved against the working directory.
pub const CONFIG_FILE_NAME: &str = "internwatch.toml";

/// Upstream listings feed.
pub const DEFAULT_SOURCE_URL: &str = "https://raw.githubusercontent.com/SimplifyJobs/Summer2026-Internships/refs/heads/dev/.github/scripts/listings.json";

// ---------------------------------------------------------------------------
// Config structs (matching internwatch.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Where listings are fetched from.
    #[serde(default)]
    pub source: SourceConfig,

    /// Local files read and written by a run.
    #[serde(default)]
    pub paths: PathsConfig,

    /// README table settings.
    #[serde(default)]
    pub readme: ReadmeConfig,
}

/// `[source]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// URL of the JSON listings document.
    #[serde(default = "default_source_url")]
    pub url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User-Agent header sent with the request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: default_source_url(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_source_url() -> String {
    DEFAULT_SOURCE_URL.into()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_user_agent() -> String {
    concat!("internwatch/", env!("CARGO_PKG_VERSION")).into()
}

/// `[paths]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Filtered, sorted snapshot of open postings.
    #[serde(default = "default_current_path")]
    pub current: PathBuf,

    /// Accumulating history of every posting ever seen.
    #[serde(default = "default_archive_path")]
    pub archive: PathBuf,

    /// Document holding the published table.
    #[serde(default = "default_readme_path")]
    pub readme: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            current: default_current_path(),
            archive: default_archive_path(),
            readme: default_readme_path(),
        }
    }
}

fn default_current_path() -> PathBuf {
    PathBuf::from("data").join("current.json")
}
fn default_archive_path() -> PathBuf {
    PathBuf::from("data").join("archived.json")
}
fn default_readme_path() -> PathBuf {
    PathBuf::from("README.md")
}

/// `[readme]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadmeConfig {
    /// Heading that introduces the listings table.
    #[serde(default = "default_marker")]
    pub marker: String,
}

impl Default for ReadmeConfig {
    fn default() -> Self {
        Self {
            marker: default_marker(),
        }
    }
}

fn default_marker() -> String {
    "## Latest Internships".into()
}

// ---------------------------------------------------------------------------
// Run config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// CLI-provided values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct RunOverrides {
    pub source_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub current: Option<PathBuf>,
    pub archive: Option<PathBuf>,
    pub readme: Option<PathBuf>,
    pub dry_run: bool,
}

/// Runtime configuration for a single sync run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Validated listings URL.
    pub source_url: Url,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// User-Agent header value.
    pub user_agent: String,
    /// Path of `current.json`.
    pub current_path: PathBuf,
    /// Path of `archived.json`.
    pub archive_path: PathBuf,
    /// Path of the README to splice.
    pub readme_path: PathBuf,
    /// Table marker heading.
    pub marker: String,
    /// Compute and report without writing anything.
    pub dry_run: bool,
}

impl RunConfig {
    /// Merge file config with CLI overrides and validate the result.
    pub fn resolve(config: &AppConfig, overrides: &RunOverrides) -> Result<Self> {
        let raw_url = overrides
            .source_url
            .as_deref()
            .unwrap_or(&config.source.url);
        let source_url = Url::parse(raw_url)
            .map_err(|e| InternwatchError::config(format!("invalid source url '{raw_url}': {e}")))?;

        if !matches!(source_url.scheme(), "http" | "https") {
            return Err(InternwatchError::config(format!(
                "source url must be http(s), got '{}'",
                source_url.scheme()
            )));
        }

        let timeout_secs = overrides.timeout_secs.unwrap_or(config.source.timeout_secs);
        if timeout_secs == 0 {
            return Err(InternwatchError::config("timeout_secs must be greater than 0"));
        }

        if config.readme.marker.trim().is_empty() {
            return Err(InternwatchError::config("readme marker must not be empty"));
        }

        Ok(Self {
            source_url,
            timeout_secs,
            user_agent: config.source.user_agent.clone(),
            current_path: overrides
                .current
                .clone()
                .unwrap_or_else(|| config.paths.current.clone()),
            archive_path: overrides
                .archive
                .clone()
                .unwrap_or_else(|| config.paths.archive.clone()),
            readme_path: overrides
                .readme
                .clone()
                .unwrap_or_else(|| config.paths.readme.clone()),
            marker: config.readme.marker.clone(),
            dry_run: overrides.dry_run,
        })
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load `internwatch.toml` from the working directory. Returns defaults if the
/// file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = Path::new(CONFIG_FILE_NAME);

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| InternwatchError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        InternwatchError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Write a default config file at `path`. Refuses to overwrite an existing file.
pub fn init_config(path: &Path) -> Result<()> {
    if path.exists() {
        return Err(InternwatchError::config(format!(
            "{} already exists",
            path.display()
        )));
    }

    let content = toml::to_string_pretty(&AppConfig::default())
        .map_err(|e| InternwatchError::config(e.to_string()))?;

    std::fs::write(path, content).map_err(|e| InternwatchError::io(path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(())
}
