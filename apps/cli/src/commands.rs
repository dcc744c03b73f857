//! CLI command definitions, routing, and tracing setup.

use std::path::Path;
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use tubedigest_core::pipeline::{
    ChannelSummarizer, ProgressReporter, RunOptions, RunReport,
};
use tubedigest_core::vcs::GitCommitService;
use tubedigest_feed::{FeedInput, HttpFeedSource};
use tubedigest_notify::SmtpNotifier;
use tubedigest_shared::{
    AppConfig, init_config, is_channel_id, load_config, require_env, validate_credentials,
};
use tubedigest_store::DirStore;
use tubedigest_summarize::OpenAiSummarizer;
use tubedigest_transcript::TimedTextSource;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// tubedigest — summarize a channel's new videos into your inbox.
#[derive(Parser)]
#[command(
    name = "tubedigest",
    version,
    about = "Summarize a YouTube channel's new videos and email the digest.",
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
    /// Summarize a channel's new videos and send the digest email.
    Run {
        /// Channel id (UC…) or path to a local .xml feed capture.
        channel: String,

        /// Digest recipient address.
        #[arg(short, long)]
        email: String,

        /// Summarize at most this many new videos this run.
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        max_summaries: Option<u64>,

        /// Commit and push the channel directory after sending.
        #[arg(long)]
        commit: bool,

        /// Root directory for summary storage (defaults to config).
        #[arg(short, long)]
        out: Option<String>,

        /// Milliseconds to wait between summarization calls (defaults to config).
        #[arg(long)]
        pacing_ms: Option<u64>,
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
        0 => "tubedigest=info",
        1 => "tubedigest=debug",
        _ => "tubedigest=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

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
        Command::Run {
            channel,
            email,
            max_summaries,
            commit,
            out,
            pacing_ms,
        } => {
            cmd_run(
                &channel,
                &email,
                max_summaries.map(|n| n as usize),
                commit,
                out.as_deref(),
                pacing_ms,
            )
            .await
        }
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// run command
// ---------------------------------------------------------------------------

async fn cmd_run(
    channel: &str,
    email: &str,
    max_summaries: Option<usize>,
    commit: bool,
    out: Option<&str>,
    pacing_ms: Option<u64>,
) -> Result<()> {
    // Fail on bad arguments and missing credentials before any work happens.
    let input = resolve_input(channel)?;
    if !email.contains('@') {
        return Err(eyre!("'{email}' is not a valid recipient address"));
    }

    let config = load_config()?;
    validate_credentials(&config)?;

    let api_key = require_env(&config.openai.api_key_env)?;
    let smtp_username = require_env(&config.smtp.username_env)?;
    let smtp_password = require_env(&config.smtp.password_env)?;

    let feed = HttpFeedSource::new()?;
    let transcripts = TimedTextSource::new()?;
    let summarizer =
        OpenAiSummarizer::new(&config.openai.base_url, api_key, config.openai.model.clone())?;
    let notifier = SmtpNotifier::new(
        &config.smtp.host,
        config.smtp.port,
        &smtp_username,
        &smtp_password,
    )?;
    let store = DirStore::new(out.unwrap_or(&config.defaults.output_dir));
    let git = GitCommitService;

    let mut orchestrator =
        ChannelSummarizer::new(&feed, &transcripts, &summarizer, &notifier, &store);
    if commit || config.git.enabled {
        orchestrator = orchestrator.with_commit_service(&git);
    }

    let opts = RunOptions {
        recipient: email.to_string(),
        max_summaries,
        pacing: Duration::from_millis(pacing_ms.unwrap_or(config.defaults.pacing_ms)),
    };

    info!(channel, email, "starting channel run");

    let reporter = CliProgress::new();
    let report = orchestrator.run(&input, &opts, &reporter).await?;

    println!();
    if report.new_summaries == 0 {
        println!(
            "  Nothing new — all {} videos in the feed are already summarized.",
            report.videos_in_feed
        );
    } else {
        println!("  Digest sent!");
        println!(
            "  Channel:    {} ({})",
            report.channel_title, report.channel_id
        );
        println!("  In feed:    {}", report.videos_in_feed);
        println!("  Summarized: {}", report.new_summaries);
        println!(
            "  Committed:  {}",
            if report.committed { "yes" } else { "no" }
        );
        if let Some(warning) = &report.commit_warning {
            println!("  Warning:    {warning}");
        }
        println!("  Time:       {:.1}s", report.elapsed.as_secs_f64());
    }
    println!();

    Ok(())
}

/// Decide between the two input modes: a `.xml` path is a local feed
/// capture, anything else must be a well-formed channel id.
fn resolve_input(channel: &str) -> Result<FeedInput> {
    if channel.ends_with(".xml") {
        let path = Path::new(channel);
        if !path.is_file() {
            return Err(eyre!("feed file '{channel}' not found"));
        }
        return Ok(FeedInput::LocalFile(path.to_path_buf()));
    }

    if !is_channel_id(channel) {
        return Err(eyre!(
            "'{channel}' is not a channel id (UC… 24 characters) or a .xml feed file"
        ));
    }
    Ok(FeedInput::ChannelId(channel.to_string()))
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
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn video_summarized(&self, title: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Summarized [{current}/{total}] {title}"));
    }

    fn done(&self, _report: &RunReport) {
        self.spinner.finish_and_clear();
    }
}

// ---------------------------------------------------------------------------
// config commands
// ---------------------------------------------------------------------------

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
