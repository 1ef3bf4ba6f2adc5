//! End-to-end `scrape` pipeline: seed URLs → crawl → `<data_dir>/<platform>.json`.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use cdp_assistant_crawler::Crawler;
use cdp_assistant_shared::{AssistantError, Platform, Result, SourceEntry};
use tracing::{info, instrument, warn};

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when a platform crawl starts.
    fn phase(&self, name: &str);
    /// Called when a platform finishes, successfully or not.
    fn platform_done(&self, outcome: &PlatformOutcome);
    /// Called when the pipeline completes.
    fn done(&self, summary: &ScrapeSummary);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn platform_done(&self, _outcome: &PlatformOutcome) {}
    fn done(&self, _summary: &ScrapeSummary) {}
}

/// What happened to one platform.
#[derive(Debug, Clone)]
pub struct PlatformOutcome {
    pub platform: Platform,
    /// Pages collected.
    pub pages: usize,
    /// URLs skipped during the crawl.
    pub pages_skipped: usize,
    /// Pages that failed to fetch.
    pub page_errors: usize,
    /// File written, if any.
    pub path: Option<PathBuf>,
    /// Why nothing was written, if so.
    pub failure: Option<String>,
}

/// Result of [`scrape_all`].
#[derive(Debug, Clone)]
pub struct ScrapeSummary {
    pub outcomes: Vec<PlatformOutcome>,
    pub elapsed: Duration,
}

impl ScrapeSummary {
    /// Pages collected across all platforms.
    pub fn total_pages(&self) -> usize {
        self.outcomes.iter().map(|o| o.pages).sum()
    }

    /// Platforms that produced no file.
    pub fn failed(&self) -> impl Iterator<Item = &PlatformOutcome> {
        self.outcomes.iter().filter(|o| o.failure.is_some())
    }
}

/// Crawl every configured source (or just `only`) and save one file per platform.
///
/// A platform that fails (bad seed URL, no pages, write error) is logged and
/// recorded in the summary; the remaining platforms still run. A platform that
/// collects no pages leaves any existing file untouched.
#[instrument(skip_all, fields(data_dir = %data_dir.display()))]
pub async fn scrape_all(
    crawler: &Crawler,
    sources: &[SourceEntry],
    only: Option<Platform>,
    data_dir: &Path,
    progress: &dyn ProgressReporter,
) -> Result<ScrapeSummary> {
    let start = Instant::now();

    let selected: Vec<&SourceEntry> = sources
        .iter()
        .filter(|s| only.is_none_or(|p| s.platform == p))
        .collect();

    if selected.is_empty() {
        return Err(AssistantError::validation(match only {
            Some(p) => format!("no documentation source configured for {p}"),
            None => "no documentation sources configured".to_string(),
        }));
    }

    let mut outcomes = Vec::with_capacity(selected.len());
    for source in selected {
        progress.phase(&format!("Scraping {} documentation", source.platform));
        info!(platform = %source.platform, url = %source.url, "starting platform scrape");

        let outcome = scrape_platform(crawler, source, data_dir).await;
        match &outcome.failure {
            Some(reason) => warn!(platform = %outcome.platform, reason, "platform scrape failed"),
            None => info!(
                platform = %outcome.platform,
                pages = outcome.pages,
                "saved platform documents"
            ),
        }
        progress.platform_done(&outcome);
        outcomes.push(outcome);
    }

    let summary = ScrapeSummary {
        outcomes,
        elapsed: start.elapsed(),
    };
    progress.done(&summary);

    info!(
        total_pages = summary.total_pages(),
        elapsed_ms = summary.elapsed.as_millis(),
        "scraping completed"
    );

    Ok(summary)
}

async fn scrape_platform(crawler: &Crawler, source: &SourceEntry, data_dir: &Path) -> PlatformOutcome {
    let mut outcome = PlatformOutcome {
        platform: source.platform,
        pages: 0,
        pages_skipped: 0,
        page_errors: 0,
        path: None,
        failure: None,
    };

    let seed = match source.seed_url() {
        Ok(url) => url,
        Err(e) => {
            outcome.failure = Some(e.to_string());
            return outcome;
        }
    };

    let result = crawler.crawl(source.platform, &seed).await;
    outcome.pages = result.pages.len();
    outcome.pages_skipped = result.pages_skipped;
    outcome.page_errors = result.errors.len();

    if result.pages.is_empty() {
        outcome.failure = Some(format!("no pages collected from {seed}"));
        return outcome;
    }

    match cdp_assistant_store::write_platform(data_dir, source.platform, &result.pages) {
        Ok(path) => outcome.path = Some(path),
        Err(e) => outcome.failure = Some(e.to_string()),
    }
    outcome
}
