//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use docharvest_archive::RepoLoader;
use docharvest_crawler::{CrawlEngine, CrawlParams, ProgressReporter};
use docharvest_shared::{CrawlOutcome, RULES_FILE_NAME, default_rules_json, load_rules};
use docharvest_storage::CollectionStore;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// DocHarvest — turn documentation sites into Markdown collections.
#[derive(Parser)]
#[command(
    name = "docharvest",
    version,
    about = "Crawl documentation sites into local Markdown collections.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

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
    /// Crawl a documentation site into a collection.
    Crawl {
        /// Collection name (output lands in data/collections/<name>/).
        collection: String,

        /// Seed URL of the documentation site.
        url: String,

        /// Documentation version to stay on (e.g. 3.11).
        #[arg(long = "docs-version")]
        version: Option<String>,

        /// Do not score pages or follow links; save fetched pages as-is.
        #[arg(long)]
        no_follow: bool,

        /// Concurrent fetches per batch.
        #[arg(long, default_value_t = 5)]
        batch_size: usize,

        /// Page budget. 1 means crawl until the frontier drains.
        #[arg(long, default_value_t = 1)]
        depth: usize,

        /// Skip the headless-browser fallback (HTTP client only).
        #[arg(long)]
        no_browser: bool,

        /// Rule file with URL shapes and scoring weights.
        #[arg(long, default_value = RULES_FILE_NAME)]
        rules: PathBuf,

        /// Root directory for collections and repos.
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,
    },

    /// Download a GitHub repository as a ZIP into data/repos/.
    FetchRepo {
        /// Repository URL, e.g. https://github.com/user/repo.
        url: String,

        /// Root directory for collections and repos.
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,
    },

    /// Rule-file management.
    Rules {
        /// Rules subcommand.
        #[command(subcommand)]
        action: RulesAction,
    },
}

/// Rules subcommands.
#[derive(Subcommand)]
pub(crate) enum RulesAction {
    /// Write a default config_urls.json to the working directory.
    Init,
    /// Show the resolved rule config.
    Show {
        /// Rule file to resolve.
        #[arg(long, default_value = RULES_FILE_NAME)]
        rules: PathBuf,
    },
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Crawl {
            collection,
            url,
            version,
            no_follow,
            batch_size,
            depth,
            no_browser,
            rules,
            data_dir,
        } => {
            cmd_crawl(CrawlArgs {
                collection,
                url,
                version,
                no_follow,
                batch_size,
                depth,
                no_browser,
                rules,
                data_dir,
            })
            .await
        }
        Command::FetchRepo { url, data_dir } => cmd_fetch_repo(&url, &data_dir).await,
        Command::Rules { action } => match action {
            RulesAction::Init => cmd_rules_init(),
            RulesAction::Show { rules } => cmd_rules_show(&rules),
        },
    }
}

struct CrawlArgs {
    collection: String,
    url: String,
    version: Option<String>,
    no_follow: bool,
    batch_size: usize,
    depth: usize,
    no_browser: bool,
    rules: PathBuf,
    data_dir: PathBuf,
}

async fn cmd_crawl(args: CrawlArgs) -> Result<()> {
    let rules = load_rules(&args.rules)?;
    let store = CollectionStore::new(&args.data_dir);
    let engine = CrawlEngine::new(rules, store);

    let mut params = CrawlParams::new(&args.collection, &args.url);
    params.version = args.version;
    params.follow_links = !args.no_follow;
    params.batch_size = args.batch_size;
    params.depth_budget = args.depth;
    params.use_browser = !args.no_browser;

    info!(
        collection = %args.collection,
        url = %args.url,
        batch_size = params.batch_size,
        depth = params.depth_budget,
        "starting crawl"
    );

    let reporter = CliProgress::new();
    let outcome = engine.run(&params, &reporter).await?;
    reporter.finish();

    match outcome {
        CrawlOutcome::Completed(summary) => {
            println!();
            println!("  Crawl finished!");
            println!("  Collection: {}", args.collection);
            println!("  Seen:       {}", summary.seen.len());
            println!("  Queued:     {}", summary.to_visit.len());
            println!("  Rejected:   {}", summary.rejected.len());
            println!(
                "  Output:     {}",
                args.data_dir
                    .join("collections")
                    .join(&args.collection)
                    .display()
            );
            println!();
            Ok(())
        }
        CrawlOutcome::SeedRejected(reason) => Err(eyre!(reason)),
    }
}

async fn cmd_fetch_repo(url: &str, data_dir: &PathBuf) -> Result<()> {
    let loader = RepoLoader::new()?;
    let dest = loader.download(url, data_dir).await?;
    println!("Repository extracted to: {}", dest.display());
    Ok(())
}

fn cmd_rules_init() -> Result<()> {
    let path = PathBuf::from(RULES_FILE_NAME);
    if path.exists() {
        return Err(eyre!("{RULES_FILE_NAME} already exists, not overwriting"));
    }
    std::fs::write(&path, default_rules_json()?)?;
    println!("Rule file written to: {}", path.display());
    Ok(())
}

fn cmd_rules_show(rules_path: &PathBuf) -> Result<()> {
    let rules = load_rules(rules_path)?;
    println!("{}", serde_json::to_string_pretty(&rules)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// Spinner-based progress for interactive runs.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .expect("valid template")
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }

    fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn page_fetched(&self, url: &str, current: usize, batch: usize) {
        self.spinner
            .set_message(format!("Processing [{current}/{batch}] {url}"));
    }

    fn page_saved(&self, file_name: &str, total: usize) {
        self.spinner
            .set_message(format!("Saved {total} page(s), last: {file_name}"));
    }
}
