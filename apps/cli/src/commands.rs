//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use qaforge_core::answers::ConsolePrompter;
use qaforge_core::pipeline::{ProgressReporter, SessionConfig, SessionResult, run_session};
use qaforge_generator::{OpenAiClient, QuestionGenerator};
use qaforge_shared::{
    AppConfig, FallbackStrategy, QaForgeError, QuestionCount, init_config, load_config,
    resolve_api_key,
};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// qaforge: build Q&A datasets from your documents.
#[derive(Parser)]
#[command(
    name = "qaforge",
    version,
    about = "Generate questions about a document, answer them, and export training datasets.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Defaults to `run` when omitted.
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
    /// Run an interactive question/answer session.
    Run(RunArgs),

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Flags for `run`. Anything left out is prompted for or taken from config.
#[derive(Args, Default)]
pub(crate) struct RunArgs {
    /// Source document (.docx or text). Prompted for when omitted.
    #[arg(long)]
    pub doc: Option<PathBuf>,

    /// Number of questions to generate. Prompted for when omitted.
    #[arg(long)]
    pub count: Option<QuestionCount>,

    /// Directory for the exported dataset files.
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Model ID for question generation.
    #[arg(short, long)]
    pub model: Option<String>,

    /// On generation failure: placeholder or fail.
    #[arg(long)]
    pub fallback: Option<FallbackStrategy>,
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

/// Initialize tracing based on CLI flags. Logs go to stderr so prompts on
/// stdout stay readable.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "qaforge=info",
        1 => "qaforge=debug",
        _ => "qaforge=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

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
    match cli.command {
        None => cmd_run(RunArgs::default()).await,
        Some(Command::Run(args)) => cmd_run(args).await,
        Some(Command::Config { action }) => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

/// Merge CLI flags over the loaded config.
fn apply_overrides(config: &mut AppConfig, args: &RunArgs) {
    if let Some(out) = &args.out {
        config.output.dir = out.clone();
    }
    if let Some(model) = &args.model {
        config.openai.model = model.clone();
    }
    if let Some(fallback) = args.fallback {
        config.generation.fallback = fallback;
    }
}

async fn cmd_run(args: RunArgs) -> Result<()> {
    let mut config = load_config()?;
    apply_overrides(&mut config, &args);

    let api_key = resolve_api_key(&config)?;
    let client = OpenAiClient::new(&config.openai, api_key)?;

    info!(
        model = client.model(),
        fallback = ?config.generation.fallback,
        out = %config.output.dir.display(),
        "starting session"
    );

    let generator = QuestionGenerator::new(client, config.generation.fallback);
    let session = SessionConfig {
        document: args.doc,
        count: args.count,
        output: config.output,
    };

    let mut prompter = ConsolePrompter::stdio();
    let progress = CliProgress::new();

    match run_session(&session, &generator, &mut prompter, &progress).await {
        Ok(result) => {
            println!();
            println!("  Q&A session complete. Data exported to JSONL and JSON files.");
            println!("  Pairs:  {} of {} requested", result.pair_count, result.requested);
            for file in &result.files {
                println!("  File:   {}", file.display());
            }
            println!("  Time:   {:.1}s", result.elapsed.as_secs_f64());
            println!();
            Ok(())
        }
        Err(e) => {
            if matches!(
                e,
                QaForgeError::Load { .. } | QaForgeError::EmptyDocument { .. }
            ) {
                println!("Could not read the document.");
            }
            println!("Program stopped.");
            Err(e.into())
        }
    }
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// Spinner shown only while no prompt is waiting on the user.
struct CliProgress {
    spinner: Mutex<Option<ProgressBar>>,
}

impl CliProgress {
    fn new() -> Self {
        Self {
            spinner: Mutex::new(None),
        }
    }

    fn clear(&self) {
        if let Ok(mut slot) = self.spinner.lock() {
            if let Some(spinner) = slot.take() {
                spinner.finish_and_clear();
            }
        }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.clear();

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.set_message(name.to_string());
        spinner.enable_steady_tick(Duration::from_millis(80));

        if let Ok(mut slot) = self.spinner.lock() {
            *slot = Some(spinner);
        }
    }

    fn phase_done(&self) {
        self.clear();
    }

    fn done(&self, _result: &SessionResult) {
        self.clear();
    }
}

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
