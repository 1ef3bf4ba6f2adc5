//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use cdp_assistant_core::scrape::{self, PlatformOutcome, ProgressReporter, ScrapeSummary};
use cdp_assistant_crawler::Crawler;
use cdp_assistant_search::{DocumentSearch, SearchIndex};
use cdp_assistant_shared::{
    AppConfig, CrawlConfig, Platform, PlatformFilter, SearchResult, init_config, load_config,
    load_config_from,
};
use cdp_assistant_store::DocumentStore;
use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

/// Characters of content shown per related document.
const PREVIEW_CHARS: usize = 150;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Answers CDP how-to questions from scraped documentation.
#[derive(Parser)]
#[command(
    name = "cdp-assistant",
    version,
    about = "Scrape Segment, mParticle, Lytics and Zeotap docs and answer questions from them.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.cdp-assistant/cdp-assistant.toml.
    #[arg(long, global = true, env = "CDP_ASSISTANT_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Crawl the configured documentation sites into the data directory.
    Scrape {
        /// Only scrape this platform.
        #[arg(short, long)]
        platform: Option<String>,

        /// Page cap per platform (overrides config).
        #[arg(long)]
        max_pages: Option<usize>,

        /// Output directory (overrides config).
        #[arg(short, long)]
        data_dir: Option<PathBuf>,
    },

    /// Ask a question and print the assistant's answer.
    Ask {
        /// The question, e.g. "How do I set up a new source in Segment?"
        question: String,

        /// Restrict to one platform, or "all".
        #[arg(short, long, default_value = "all")]
        platform: String,

        /// Document directory (overrides config).
        #[arg(short, long)]
        data_dir: Option<PathBuf>,

        /// Print the reply as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Run a raw search and print ranked results with scores.
    Search {
        /// Search terms.
        query: String,

        /// Restrict to one platform, or "all".
        #[arg(short, long, default_value = "all")]
        platform: String,

        /// Document directory (overrides config).
        #[arg(short, long)]
        data_dir: Option<PathBuf>,

        /// Print results as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show the loaded document set.
    Docs {
        /// Document directory (overrides config).
        #[arg(short, long)]
        data_dir: Option<PathBuf>,

        /// Also list document titles for this platform, or "all".
        #[arg(long)]
        titles: Option<String>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "cdp_assistant=info",
        1 => "cdp_assistant=debug",
        _ => "cdp_assistant=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };

    match cli.command {
        Command::Scrape {
            platform,
            max_pages,
            data_dir,
        } => cmd_scrape(&config, platform.as_deref(), max_pages, data_dir).await,
        Command::Ask {
            question,
            platform,
            data_dir,
            json,
        } => cmd_ask(&config, &question, &platform, data_dir, json),
        Command::Search {
            query,
            platform,
            data_dir,
            json,
        } => cmd_search(&config, &query, &platform, data_dir, json),
        Command::Docs { data_dir, titles } => cmd_docs(&config, data_dir, titles.as_deref()),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(&config),
        },
    }
}

/// Flag value if given, otherwise the configured data directory.
fn resolve_data_dir(config: &AppConfig, flag: Option<PathBuf>) -> PathBuf {
    flag.unwrap_or_else(|| PathBuf::from(&config.data.dir))
}

// ---------------------------------------------------------------------------
// scrape
// ---------------------------------------------------------------------------

async fn cmd_scrape(
    config: &AppConfig,
    platform: Option<&str>,
    max_pages: Option<usize>,
    data_dir: Option<PathBuf>,
) -> Result<()> {
    let only = platform.map(str::parse::<Platform>).transpose()?;
    let data_dir = resolve_data_dir(config, data_dir);

    let mut crawl_config = CrawlConfig::from(config);
    if let Some(n) = max_pages {
        crawl_config.max_pages = n;
    }

    info!(
        data_dir = %data_dir.display(),
        max_pages = crawl_config.max_pages,
        platform = platform.unwrap_or("all"),
        "scraping documentation"
    );

    let crawler = Crawler::new(crawl_config)?;
    let reporter = CliProgress::new();
    let summary =
        scrape::scrape_all(&crawler, &config.sources, only, &data_dir, &reporter).await?;

    println!();
    for outcome in &summary.outcomes {
        match (&outcome.path, &outcome.failure) {
            (Some(path), _) => println!(
                "  {:<10} {:>3} pages  -> {}",
                outcome.platform,
                outcome.pages,
                path.display()
            ),
            (None, Some(reason)) => println!("  {:<10} failed: {reason}", outcome.platform),
            (None, None) => println!("  {:<10} nothing written", outcome.platform),
        }
    }
    println!();
    println!(
        "  Scraping completed: {} pages in {:.1}s",
        summary.total_pages(),
        summary.elapsed.as_secs_f64()
    );
    println!();

    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            spinner.set_style(style.tick_strings(&[
                "⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏",
            ]));
        }
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn platform_done(&self, outcome: &PlatformOutcome) {
        self.spinner.println(format!(
            "  {} done: {} pages, {} skipped, {} errors",
            outcome.platform, outcome.pages, outcome.pages_skipped, outcome.page_errors
        ));
    }

    fn done(&self, _summary: &ScrapeSummary) {
        self.spinner.finish_and_clear();
    }
}

// ---------------------------------------------------------------------------
// ask / search
// ---------------------------------------------------------------------------

fn cmd_ask(
    config: &AppConfig,
    question: &str,
    platform: &str,
    data_dir: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let filter: PlatformFilter = platform.parse()?;
    let data_dir = resolve_data_dir(config, data_dir);
    let (assistant, _store) = cdp_assistant_core::load_assistant(&data_dir, &config.search)?;

    info!(question, %filter, "answering question");
    let reply = assistant.generate_response(question, filter);

    if json {
        println!("{}", serde_json::to_string_pretty(&reply)?);
        return Ok(());
    }

    println!();
    println!("{}", reply.message.content);
    if !reply.results.is_empty() {
        println!();
        println!("Related Documentation:");
        print_results(&reply.results, false);
    }
    println!();

    Ok(())
}

fn cmd_search(
    config: &AppConfig,
    query: &str,
    platform: &str,
    data_dir: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let filter: PlatformFilter = platform.parse()?;
    let store = DocumentStore::load_or_bundled(&resolve_data_dir(config, data_dir))?;
    let index = SearchIndex::build(&store, &config.search)?;

    let results = index.search(query, filter);

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else if results.is_empty() {
        println!("No results for '{query}'.");
    } else {
        print_results(&results, true);
    }

    Ok(())
}

fn print_results(results: &[SearchResult], with_score: bool) {
    for (i, result) in results.iter().enumerate() {
        let score = if with_score {
            format!("  (score {:.3})", result.score)
        } else {
            String::new()
        };
        println!();
        println!(
            "  {}. {} [{}]{score}",
            i + 1,
            result.title,
            result.platform.capitalized()
        );
        println!("     {}", result.preview(PREVIEW_CHARS));
        println!("     {}", result.url);
    }
}

// ---------------------------------------------------------------------------
// docs
// ---------------------------------------------------------------------------

fn cmd_docs(config: &AppConfig, data_dir: Option<PathBuf>, titles: Option<&str>) -> Result<()> {
    let data_dir = resolve_data_dir(config, data_dir);
    let store = DocumentStore::load_or_bundled(&data_dir)?;

    println!();
    println!("  Documents ({}):", data_dir.display());
    for (platform, count) in store.count_by_platform() {
        println!("  {:<10} {count:>4}", platform.as_str());
    }
    println!("  {:<10} {:>4}", "total", store.len());

    if let Some(filter) = titles {
        let filter: PlatformFilter = filter.parse()?;
        println!();
        for doc in store.by_platform(filter) {
            println!("  [{}] {}  <{}>", doc.platform, doc.title, doc.url);
        }
    }
    println!();

    Ok(())
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config: &AppConfig) -> Result<()> {
    let toml_str = toml::to_string_pretty(config)?;
    println!("{toml_str}");
    Ok(())
}
