//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use helpforge_core::{
    BatchRequest, BatchResult, CancelToken, ErrorSource, Orchestrator, ProgressReporter,
    publish_batch,
};
use helpforge_format::{ArticleFormat, download_filename, to_html, to_markdown};
use helpforge_services::{BackendClient, GenerationService};
use helpforge_shared::{
    AppConfig, Article, ArticleStatus, expand_home, init_config, load_config, validate_article,
};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// HelpForge — generate and publish technical help articles with AI.
#[derive(Parser)]
#[command(
    name = "helpforge",
    version,
    about = "Generate device help articles from PDF manuals and publish them to your CMS.",
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
    /// Generate articles for several errors of one device.
    Batch {
        /// URL of the device's PDF manual.
        pdf_url: String,

        /// Device model (e.g. "Echo Dot 4").
        #[arg(short, long)]
        model: String,

        /// Error description to process (repeat up to 10 times).
        #[arg(short, long = "error", conflicts_with = "device_type")]
        errors: Vec<String>,

        /// Use the predefined error set of a catalog device type instead.
        #[arg(short, long)]
        device_type: Option<String>,

        /// Write the generated articles as JSON to this file.
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Publish all generated articles after the batch completes.
        #[arg(long)]
        publish: bool,

        /// Target status when publishing: draft or publish.
        #[arg(long)]
        status: Option<String>,
    },

    /// List the device-type catalog.
    Devices,

    /// Publish previously generated articles from a JSON file.
    Publish {
        /// Path to a JSON array of articles (as written by `batch --out`).
        articles: PathBuf,

        /// Target status: draft or publish.
        #[arg(long)]
        status: Option<String>,
    },

    /// Export one article to an HTML or Markdown file.
    Export {
        /// Path to a JSON file holding one article.
        article: PathBuf,

        /// Output format.
        #[arg(short, long, default_value = "markdown")]
        format: ExportFormat,

        /// Output directory (defaults to the configured output directory).
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Export format flag.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum ExportFormat {
    Html,
    Markdown,
}

impl From<&ExportFormat> for ArticleFormat {
    fn from(format: &ExportFormat) -> Self {
        match format {
            ExportFormat::Html => ArticleFormat::Html,
            ExportFormat::Markdown => ArticleFormat::Markdown,
        }
    }
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
        0 => "helpforge=info",
        1 => "helpforge=debug",
        _ => "helpforge=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Batch {
            pdf_url,
            model,
            errors,
            device_type,
            out,
            publish,
            status,
        } => {
            cmd_batch(
                &pdf_url,
                &model,
                errors,
                device_type,
                out.as_deref(),
                publish,
                status.as_deref(),
            )
            .await
        }
        Command::Devices => cmd_devices().await,
        Command::Publish { articles, status } => {
            cmd_publish(&articles, status.as_deref()).await
        }
        Command::Export {
            article,
            format,
            out,
        } => cmd_export(&article, &format, out.as_deref()),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_batch(
    pdf_url: &str,
    model: &str,
    errors: Vec<String>,
    device_type: Option<String>,
    out: Option<&Path>,
    publish: bool,
    status: Option<&str>,
) -> Result<()> {
    let config = load_config()?;
    let client = BackendClient::new(&config.backend)?;

    let source = match device_type {
        Some(key) => ErrorSource::ByDeviceType(key),
        None => ErrorSource::Explicit(errors),
    };
    let request = BatchRequest {
        pdf_url: pdf_url.to_string(),
        model: model.to_string(),
        source,
    };
    // Reject a malformed request before touching the network.
    request.validate()?;

    if let Err(e) = client.health().await {
        return Err(eyre!(
            "backend unreachable at {}: {e}",
            config.backend.base_url
        ));
    }

    info!(pdf_url, model, "starting batch generation");

    let orchestrator = Orchestrator::new();
    let cancel = CancelToken::new();
    let reporter = CliProgress::new();

    let result = orchestrator
        .run_batch(&client, &request, &reporter, &cancel)
        .await?;

    print_batch_summary(&result);

    if let Some(path) = out {
        let json = serde_json::to_string_pretty(&result.articles)?;
        std::fs::write(path, json)?;
        println!("  Saved:      {}", path.display());
        println!();
    }

    if publish && !result.articles.is_empty() {
        let target = parse_status(status, &config)?;
        let summary = publish_batch(
            &client,
            &result.articles,
            target,
            config.defaults.publish_concurrency as usize,
            &cancel,
        )
        .await;

        println!(
            "  Published:  {} ok, {} failed",
            summary.published, summary.failed
        );
        println!();
        if !summary.success {
            return Err(eyre!("{} article(s) failed to publish", summary.failed));
        }
    }

    Ok(())
}

fn print_batch_summary(result: &BatchResult) {
    println!();
    println!("  Batch complete");
    println!("  Total:      {}", result.total);
    println!("  Successful: {}", result.successful);
    println!("  Failed:     {}", result.failed);

    if !result.errors_log.is_empty() {
        println!();
        println!("  Failures:");
        for item in &result.errors_log {
            println!("    {} — {}", item.error, item.detail);
        }
    }
    println!();
}

async fn cmd_devices() -> Result<()> {
    let config = load_config()?;
    let client = BackendClient::new(&config.backend)?;

    let catalog = client.list_device_types().await?;
    if catalog.is_empty() {
        println!("No device types available.");
        return Ok(());
    }

    println!();
    for (key, info) in &catalog {
        println!("  {key} — {} ({} errores)", info.name, info.errors_count);
        for sample in &info.sample_errors {
            println!("      {sample}");
        }
    }
    println!();

    Ok(())
}

async fn cmd_publish(path: &Path, status: Option<&str>) -> Result<()> {
    let config = load_config()?;
    let client = BackendClient::new(&config.backend)?;
    let target = parse_status(status, &config)?;

    let content = std::fs::read_to_string(path)
        .map_err(|e| eyre!("cannot read '{}': {e}", path.display()))?;
    let articles: Vec<Article> = serde_json::from_str(&content)
        .map_err(|e| eyre!("'{}' is not a JSON article list: {e}", path.display()))?;

    if articles.is_empty() {
        return Err(eyre!("'{}' holds no articles", path.display()));
    }

    info!(count = articles.len(), status = %target, "publishing articles");

    let summary = publish_batch(
        &client,
        &articles,
        target,
        config.defaults.publish_concurrency as usize,
        &CancelToken::new(),
    )
    .await;

    println!();
    println!("  Published: {}", summary.published);
    println!("  Failed:    {}", summary.failed);
    println!();

    if !summary.success {
        return Err(eyre!("{} article(s) failed to publish", summary.failed));
    }
    Ok(())
}

fn cmd_export(path: &Path, format: &ExportFormat, out: Option<&Path>) -> Result<()> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| eyre!("cannot read '{}': {e}", path.display()))?;
    let raw: serde_json::Value = serde_json::from_str(&content)?;
    let article = validate_article(&raw)?;

    let format = ArticleFormat::from(format);
    let rendered = match format {
        ArticleFormat::Html => to_html(&article),
        ArticleFormat::Markdown => to_markdown(&article),
    };

    let out_dir = match out {
        Some(dir) => dir.to_path_buf(),
        None => {
            let config = load_config()?;
            expand_home(&config.defaults.output_dir)?
        }
    };
    std::fs::create_dir_all(&out_dir)
        .map_err(|e| eyre!("cannot create '{}': {e}", out_dir.display()))?;

    let filename = download_filename(&article.title, format);
    let out_path = out_dir.join(&filename);
    std::fs::write(&out_path, rendered)
        .map_err(|e| eyre!("cannot write '{}': {e}", out_path.display()))?;

    println!("Exported: {}", out_path.display());
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

/// Resolve the publish target status from the flag or the config default.
/// `failed` is a lifecycle tag, never a publish target.
fn parse_status(flag: Option<&str>, config: &AppConfig) -> Result<ArticleStatus> {
    let raw = flag.unwrap_or(&config.defaults.status);
    let status: ArticleStatus = raw
        .parse()
        .map_err(|e| eyre!("invalid status '{raw}': {e}"))?;
    if status == ArticleStatus::Failed {
        return Err(eyre!("'failed' is not a valid publish target"));
    }
    Ok(status)
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// Batch progress bar using indicatif.
struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let bar = ProgressBar::hidden();
        bar.set_style(
            ProgressStyle::with_template("{bar:30.cyan/blue} {pos}/{len} {msg}")
                .expect("valid progress template"),
        );
        Self { bar }
    }
}

impl ProgressReporter for CliProgress {
    fn batch_started(&self, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_draw_target(indicatif::ProgressDrawTarget::stderr());
    }

    fn item_started(&self, current: usize, total: usize, error: &str) {
        self.bar
            .set_message(format!("[{current}/{total}] {error}"));
    }

    fn item_finished(&self, _current: usize, _total: usize, _error: &str, _ok: bool) {
        self.bar.inc(1);
    }

    fn done(&self, _result: &BatchResult) {
        self.bar.finish_and_clear();
    }
}
