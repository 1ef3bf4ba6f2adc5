//! Breadth-first documentation crawler.
//!
//! The crawler starts from a platform's seed URL, follows same-origin links in
//! BFS order, and stops once it has collected `max_pages` pages or the queue
//! runs dry. Page failures are logged and recorded; they never abort a crawl.

use std::collections::{HashSet, VecDeque};
use std::net::IpAddr;
use std::time::{Duration, Instant};

use reqwest::Client;
use scraper::Html;
use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument, warn};
use url::Url;

use cdp_assistant_shared::{AssistantError, CrawlConfig, DocumentEntry, Platform, Result};

use crate::extract::{ExtractedPage, extract_page};

/// User-Agent string for crawl requests.
const USER_AGENT: &str = concat!("CdpAssistant/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// CrawlResult
// ---------------------------------------------------------------------------

/// Summary of a completed platform crawl.
#[derive(Debug, Clone)]
pub struct CrawlResult {
    /// Platform the pages belong to.
    pub platform: Platform,
    /// Pages collected, in BFS order.
    pub pages: Vec<DocumentEntry>,
    /// URLs skipped (already visited, out of scope, blocked, duplicate body).
    pub pages_skipped: usize,
    /// Fetch failures (URL, error message).
    pub errors: Vec<(String, String)>,
    /// Total duration of the crawl.
    pub duration: Duration,
}

/// A fetched page with its extracted text.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// The URL that was requested.
    pub url: Url,
    /// SHA-256 of the raw body.
    pub content_hash: String,
    /// Title, text and links.
    pub page: ExtractedPage,
}

// ---------------------------------------------------------------------------
// Crawler
// ---------------------------------------------------------------------------

/// Sequential BFS crawler with a per-platform page cap.
pub struct Crawler {
    config: CrawlConfig,
    client: Client,
    /// Allow localhost/private IPs (for integration tests with mock servers).
    allow_localhost: bool,
}

impl Crawler {
    /// Create a new crawler with the given configuration.
    pub fn new(config: CrawlConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AssistantError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            config,
            client,
            allow_localhost: false,
        })
    }

    /// Allow crawling localhost/private IPs (for tests against mock servers).
    #[cfg(any(test, feature = "test-util"))]
    pub fn allow_localhost(mut self) -> Self {
        self.allow_localhost = true;
        self
    }

    /// Crawl `platform`'s documentation starting at `seed`.
    #[instrument(skip_all, fields(platform = %platform, seed = %seed))]
    pub async fn crawl(&self, platform: Platform, seed: &Url) -> CrawlResult {
        let start_time = Instant::now();

        let scope = CrawlScope::new(seed, &self.config);
        let mut queue: VecDeque<Url> = VecDeque::from([seed.clone()]);
        let mut visited: HashSet<String> = HashSet::new();
        let mut seen_bodies: HashSet<String> = HashSet::new();
        let mut pages: Vec<DocumentEntry> = Vec::new();
        let mut errors: Vec<(String, String)> = Vec::new();
        let mut pages_skipped: usize = 0;
        let mut requests: usize = 0;

        info!(
            max_pages = self.config.max_pages,
            rate_limit_ms = self.config.rate_limit_ms,
            "starting crawl"
        );

        while pages.len() < self.config.max_pages {
            let Some(url) = queue.pop_front() else {
                break;
            };

            if !visited.insert(normalize_url(&url)) {
                pages_skipped += 1;
                continue;
            }

            if !scope.in_scope(&url) {
                debug!(%url, "out of scope, skipping");
                pages_skipped += 1;
                continue;
            }

            if !self.allow_localhost && is_ssrf_target(&url) {
                warn!(%url, "SSRF protection: blocked");
                pages_skipped += 1;
                continue;
            }

            if requests > 0 && self.config.rate_limit_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.config.rate_limit_ms)).await;
            }
            requests += 1;

            match scrape_page(&self.client, &url).await {
                Ok(fetched) => {
                    if !seen_bodies.insert(fetched.content_hash.clone()) {
                        debug!(%url, "body already collected under another URL");
                        pages_skipped += 1;
                        continue;
                    }

                    for link in &fetched.page.links {
                        if !visited.contains(&normalize_url(link)) {
                            queue.push_back(link.clone());
                        }
                    }

                    pages.push(DocumentEntry {
                        title: fetched.page.title,
                        content: fetched.page.content,
                        url: fetched.url.to_string(),
                        platform,
                    });
                }
                Err(e) => {
                    warn!(%url, error = %e, "failed to scrape page");
                    errors.push((url.to_string(), e.to_string()));
                }
            }
        }

        let result = CrawlResult {
            platform,
            pages,
            pages_skipped,
            errors,
            duration: start_time.elapsed(),
        };

        info!(
            pages = result.pages.len(),
            pages_skipped = result.pages_skipped,
            errors = result.errors.len(),
            duration_ms = result.duration.as_millis(),
            "crawl completed"
        );

        result
    }
}

// ---------------------------------------------------------------------------
// Scope checking
// ---------------------------------------------------------------------------

/// Determines which URLs are "in scope" for a crawl.
struct CrawlScope {
    /// Host that URLs must match.
    base_host: String,
    /// Exclude patterns (if the path matches any, it's excluded).
    exclude_patterns: Vec<regex::Regex>,
}

impl CrawlScope {
    fn new(seed: &Url, config: &CrawlConfig) -> Self {
        let exclude_patterns = config
            .exclude_patterns
            .iter()
            .filter_map(|p| glob_to_regex(p))
            .collect();

        Self {
            base_host: seed.host_str().unwrap_or("").to_string(),
            exclude_patterns,
        }
    }

    fn in_scope(&self, url: &Url) -> bool {
        if url.scheme() != "http" && url.scheme() != "https" {
            return false;
        }

        if url.host_str().unwrap_or("") != self.base_host {
            return false;
        }

        let path = url.path();
        !self.exclude_patterns.iter().any(|p| p.is_match(path))
    }
}

/// Convert a glob-like pattern to a regex.
fn glob_to_regex(pattern: &str) -> Option<regex::Regex> {
    let escaped = regex::escape(pattern)
        .replace(r"\*\*", ".*")
        .replace(r"\*", "[^/]*")
        .replace(r"\?", ".");
    regex::Regex::new(&format!("^{escaped}$")).ok()
}

// ---------------------------------------------------------------------------
// SSRF protection
// ---------------------------------------------------------------------------

/// Check if a URL targets a potentially dangerous resource.
fn is_ssrf_target(url: &Url) -> bool {
    match url.scheme() {
        "http" | "https" => {}
        _ => return true,
    }

    if let Some(host) = url.host_str() {
        let bare = host.trim_start_matches('[').trim_end_matches(']');
        if let Ok(ip) = bare.parse::<IpAddr>() {
            return is_private_ip(&ip);
        }
        if host == "localhost" || host.ends_with(".local") || host.ends_with(".internal") {
            return true;
        }
    }

    false
}

/// Check if an IP is in a private/reserved range.
fn is_private_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            v4.is_loopback()
                || v4.is_private()
                || v4.is_link_local()
                || v4.is_broadcast()
                || v4.is_unspecified()
                // 100.64.0.0/10 (Carrier-grade NAT)
                || (v4.octets()[0] == 100 && (v4.octets()[1] & 0xC0) == 64)
        }
        IpAddr::V6(v6) => v6.is_loopback() || v6.is_unspecified(),
    }
}

// ---------------------------------------------------------------------------
// Page fetching
// ---------------------------------------------------------------------------

/// Fetch a single page and extract its title, text and links.
pub async fn scrape_page(client: &Client, url: &Url) -> Result<FetchedPage> {
    debug!(%url, "fetching page");

    let response = client
        .get(url.as_str())
        .send()
        .await
        .map_err(|e| AssistantError::Network(format!("{url}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(AssistantError::Network(format!("{url}: HTTP {status}")));
    }

    let body = response
        .text()
        .await
        .map_err(|e| AssistantError::Network(format!("{url}: body read failed: {e}")))?;

    let doc = Html::parse_document(&body);
    let page = extract_page(&doc, url);

    Ok(FetchedPage {
        url: url.clone(),
        content_hash: compute_hash(&body),
        page,
    })
}

/// Normalize a URL for deduplication (strip fragment and trailing slash).
fn normalize_url(url: &Url) -> String {
    let mut normalized = url.clone();
    normalized.set_fragment(None);
    let mut s = normalized.to_string();
    // Keep the root path's slash
    if s.ends_with('/') && s.matches('/').count() > 3 {
        s.pop();
    }
    s
}

/// Compute SHA-256 hash of content.
fn compute_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}
