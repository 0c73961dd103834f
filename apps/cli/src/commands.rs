//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use internwatch_core::{ProgressReporter, PublishOutcome, SyncReport};
use internwatch_shared::{
    AppConfig, CONFIG_FILE_NAME, RunConfig, RunOverrides, init_config, load_config,
    load_config_from,
};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// internwatch: keep a public internship listing fresh.
#[derive(Parser)]
#[command(
    name = "internwatch",
    version,
    about = "Fetch internship listings, archive them, and publish the open ones.",
    long_about = None,
    args_conflicts_with_subcommands = true,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file (defaults to ./internwatch.toml when present).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// `run` flags, accepted without the subcommand name.
    #[command(flatten)]
    pub run: RunArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
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
    /// Fetch, merge, filter, and publish the listings.
    Run(RunArgs),

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Flags for `run`. Each overrides the matching config file value.
#[derive(Args, Debug)]
pub(crate) struct RunArgs {
    /// Listings JSON URL.
    #[arg(long, env = "INTERNWATCH_SOURCE_URL")]
    pub source_url: Option<String>,

    /// Request timeout in seconds.
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Path of the current snapshot.
    #[arg(long)]
    pub current: Option<PathBuf>,

    /// Path of the archive.
    #[arg(long)]
    pub archive: Option<PathBuf>,

    /// Path of the README holding the table.
    #[arg(long)]
    pub readme: Option<PathBuf>,

    /// Report what would change without writing any file.
    #[arg(long)]
    pub dry_run: bool,

    /// Date used to decide which terms are past (YYYY-MM-DD, default: today).
    #[arg(long)]
    pub today: Option<NaiveDate>,
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Write a config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr so stdout carries
/// only the run summary.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "internwatch=info",
        1 => "internwatch=debug",
        _ => "internwatch=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
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
    let config_path = cli.config.as_deref();
    match cli.command {
        None => cmd_run(config_path, cli.run).await,
        Some(Command::Run(args)) => cmd_run(config_path, args).await,
        Some(Command::Config { action }) => match action {
            ConfigAction::Init => cmd_config_init(config_path),
            ConfigAction::Show => cmd_config_show(config_path),
        },
    }
}

fn resolve_app_config(path: Option<&Path>) -> Result<AppConfig> {
    Ok(match path {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    })
}

async fn cmd_run(config_path: Option<&Path>, args: RunArgs) -> Result<()> {
    let app_config = resolve_app_config(config_path)?;

    let overrides = RunOverrides {
        source_url: args.source_url,
        timeout_secs: args.timeout,
        current: args.current,
        archive: args.archive,
        readme: args.readme,
        dry_run: args.dry_run,
    };
    let run_config = RunConfig::resolve(&app_config, &overrides)?;
    let today = args
        .today
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    info!(
        source = %run_config.source_url,
        current = %run_config.current_path.display(),
        archive = %run_config.archive_path.display(),
        readme = %run_config.readme_path.display(),
        "syncing listings"
    );

    let reporter = CliProgress::new();
    let report = internwatch_core::sync_listings(&run_config, today, &reporter).await;
    reporter.clear();
    let report = report?;

    println!("{}", report.summary());
    if let PublishOutcome::Skipped(reason) = &report.publish {
        println!("{reason}");
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner on stderr.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }

    fn clear(&self) {
        if !self.spinner.is_finished() {
            self.spinner.finish_and_clear();
        }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn done(&self, _report: &SyncReport) {
        self.spinner.finish_and_clear();
    }
}

// ---------------------------------------------------------------------------
// Config commands
// ---------------------------------------------------------------------------

fn cmd_config_init(config_path: Option<&Path>) -> Result<()> {
    let path = config_path.unwrap_or(Path::new(CONFIG_FILE_NAME));
    init_config(path)?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config_path: Option<&Path>) -> Result<()> {
    let config = resolve_app_config(config_path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
