//! Application configuration for the CDP assistant.
//!
//! User config lives at `~/.cdp-assistant/cdp-assistant.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AssistantError, Result};
use crate::types::Platform;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "cdp-assistant.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".cdp-assistant";

// ---------------------------------------------------------------------------
// Config structs (matching cdp-assistant.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Where the scraped document set lives.
    #[serde(default)]
    pub data: DataConfig,

    /// Crawl limits and politeness.
    #[serde(default)]
    pub crawl: CrawlPoliciesConfig,

    /// Ranking and result limits.
    #[serde(default)]
    pub search: SearchConfig,

    /// Documentation seed URLs, one per platform.
    #[serde(default = "default_sources")]
    pub sources: Vec<SourceEntry>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data: DataConfig::default(),
            crawl: CrawlPoliciesConfig::default(),
            search: SearchConfig::default(),
            sources: default_sources(),
        }
    }
}

/// `[data]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Directory holding one `<platform>.json` file per platform.
    #[serde(default = "default_data_dir")]
    pub dir: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: default_data_dir(),
        }
    }
}

fn default_data_dir() -> String {
    "data".into()
}

/// `[crawl]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlPoliciesConfig {
    /// Stop a platform crawl after this many pages.
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    /// Minimum ms between requests.
    #[serde(default = "default_rate_limit")]
    pub rate_limit_ms: u64,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// URL path exclude patterns (globs).
    #[serde(default)]
    pub exclude_patterns: Vec<String>,
}

impl Default for CrawlPoliciesConfig {
    fn default() -> Self {
        Self {
            max_pages: default_max_pages(),
            rate_limit_ms: default_rate_limit(),
            timeout_secs: default_timeout_secs(),
            exclude_patterns: Vec::new(),
        }
    }
}

fn default_max_pages() -> usize {
    10
}
fn default_rate_limit() -> u64 {
    200
}
fn default_timeout_secs() -> u64 {
    30
}

/// `[search]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Maximum results returned per query.
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Score multiplier for title matches.
    #[serde(default = "default_title_boost")]
    pub title_boost: f32,

    /// Score multiplier for platform-name matches.
    #[serde(default = "default_platform_boost")]
    pub platform_boost: f32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
            title_boost: default_title_boost(),
            platform_boost: default_platform_boost(),
        }
    }
}

fn default_max_results() -> usize {
    5
}
fn default_title_boost() -> f32 {
    10.0
}
fn default_platform_boost() -> f32 {
    5.0
}

/// `[[sources]]` entry: where crawling starts for one platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceEntry {
    pub platform: Platform,
    pub url: String,
}

impl SourceEntry {
    /// Parse the seed URL.
    pub fn seed_url(&self) -> Result<Url> {
        Url::parse(&self.url).map_err(|e| {
            AssistantError::config(format!(
                "invalid seed URL '{}' for {}: {e}",
                self.url, self.platform
            ))
        })
    }
}

fn default_sources() -> Vec<SourceEntry> {
    [
        (Platform::Segment, "https://segment.com/docs/"),
        (Platform::Mparticle, "https://docs.mparticle.com/"),
        (Platform::Lytics, "https://docs.lytics.com/"),
        (Platform::Zeotap, "https://docs.zeotap.com/home/en-us/"),
    ]
    .into_iter()
    .map(|(platform, url)| SourceEntry {
        platform,
        url: url.into(),
    })
    .collect()
}

// ---------------------------------------------------------------------------
// Crawl config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime crawl configuration, merged from the config file and CLI flags.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Page cap per platform.
    pub max_pages: usize,
    /// Rate limit in ms between requests.
    pub rate_limit_ms: u64,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// URL path exclude glob patterns.
    pub exclude_patterns: Vec<String>,
}

impl From<&AppConfig> for CrawlConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            max_pages: config.crawl.max_pages,
            rate_limit_ms: config.crawl.rate_limit_ms,
            timeout_secs: config.crawl.timeout_secs,
            exclude_patterns: config.crawl.exclude_patterns.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.cdp-assistant/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| AssistantError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.cdp-assistant/cdp-assistant.toml`).
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
    let content = std::fs::read_to_string(path).map_err(|e| AssistantError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        AssistantError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| AssistantError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| AssistantError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| AssistantError::io(&path, e))?;
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
        assert!(toml_str.contains("max_pages"));
        assert!(toml_str.contains("https://docs.mparticle.com/"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.crawl.max_pages, 10);
        assert_eq!(parsed.search.max_results, 5);
        assert_eq!(parsed.sources.len(), 4);
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let toml_str = r#"
[data]
dir = "/srv/cdp-docs"

[search]
max_results = 3
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.data.dir, "/srv/cdp-docs");
        assert_eq!(config.search.max_results, 3);
        assert_eq!(config.search.title_boost, 10.0);
        assert_eq!(config.crawl.rate_limit_ms, 200);
        assert_eq!(config.sources.len(), 4);
    }

    #[test]
    fn custom_sources_replace_defaults() {
        let toml_str = r#"
[[sources]]
platform = "lytics"
url = "https://docs.lytics.com/product/"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.sources.len(), 1);
        assert_eq!(config.sources[0].platform, Platform::Lytics);
        assert_eq!(config.sources[0].seed_url().unwrap().path(), "/product/");
    }

    #[test]
    fn invalid_seed_url_is_config_error() {
        let entry = SourceEntry {
            platform: Platform::Zeotap,
            url: "not a url".into(),
        };
        let err = entry.seed_url().unwrap_err();
        assert!(err.to_string().contains("zeotap"));
    }

    #[test]
    fn crawl_config_from_app_config() {
        let app = AppConfig::default();
        let crawl = CrawlConfig::from(&app);
        assert_eq!(crawl.max_pages, 10);
        assert_eq!(crawl.rate_limit_ms, 200);
        assert_eq!(crawl.timeout_secs, 30);
        assert!(crawl.exclude_patterns.is_empty());
    }
}
