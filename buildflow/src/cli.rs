//! Command-line arguments and the top-level run.

use crate::config::{ConfigStore, PipelineConfig};
use crate::context::PipelineContext;
use crate::core::event_types;
use crate::events::{ConsoleEventSink, EventSink, LoggingEventSink};
use crate::pipeline::{Pipeline, PipelineResult};
use crate::process::{CommandRunner, DryRunCommandRunner, TokioCommandRunner};
use anyhow::Context;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// Runs the Build → Test → (Validate) → Deploy pipeline
#[derive(Parser, Debug, Clone)]
#[command(
    name = "buildflow",
    version,
    long_about = "buildflow compiles or runs the configured work items, runs the configured \
                  tests, optionally asks a human to validate the program, and pushes the \
                  result to a git remote. The first failing stage stops the pipeline.\n\n\
                  Exit status: 0 on success, 2 when Build fails, 1 when a later stage fails."
)]
pub struct CliArgs {
    /// Path of the properties file.
    #[arg(
        short = 'c',
        long,
        value_name = "PATH",
        default_value = "config.properties",
        help = "Properties file to read"
    )]
    pub config: PathBuf,

    /// Whether to run the Validate stage.
    #[arg(long, help = "Run the interactive Validate stage before Deploy")]
    pub validate: bool,

    /// Whether to log commands instead of running them.
    #[arg(
        long,
        help = "Log external commands instead of running them and keep all handlers simulated"
    )]
    pub dry_run: bool,

    /// Whether to suppress progress bars.
    #[arg(long, help = "Do not print progress bars")]
    pub no_progress: bool,

    /// Explicit log level, overriding `-v`/`-q`.
    #[arg(long, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    /// Format of log records on stderr.
    #[arg(long, value_enum, default_value = "text", help = "Log output format")]
    pub log_format: LogFormat,

    /// Debug logging.
    #[arg(short = 'v', long, help = "Enable debug logging")]
    pub verbose: bool,

    /// Errors only.
    #[arg(
        short = 'q',
        long,
        conflicts_with = "verbose",
        help = "Quiet mode - only log errors"
    )]
    pub quiet: bool,
}

/// Log record format on stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines.
    Text,
    /// One JSON object per record.
    Json,
}

/// Loads the configuration named by the arguments.
///
/// A missing file yields an empty configuration.
pub fn load_config(args: &CliArgs) -> anyhow::Result<PipelineConfig> {
    let store = ConfigStore::load_or_empty(&args.config)
        .with_context(|| format!("Failed to load configuration from {}", args.config.display()))?;
    Ok(PipelineConfig::from_store(&store))
}

/// Wires a context for a command-line run.
#[must_use]
pub fn build_context(args: &CliArgs, config: PipelineConfig) -> PipelineContext {
    let console: Arc<dyn EventSink> =
        Arc::new(ConsoleEventSink::new().with_progress(!args.no_progress));
    let ctx = PipelineContext::new(config).with_event_sink(console);

    if args.dry_run {
        return ctx.with_commands(Arc::new(DryRunCommandRunner::new()));
    }

    let tools: Arc<dyn CommandRunner> = match &ctx.config().scripts_dir {
        Some(dir) => Arc::new(TokioCommandRunner::new().with_working_dir(dir.clone())),
        None => Arc::new(TokioCommandRunner::new()),
    };
    ctx.with_configured_tools(tools)
}

/// Loads configuration, runs the pipeline and returns its result.
pub async fn run(args: &CliArgs) -> anyhow::Result<PipelineResult> {
    let config = load_config(args)?;
    debug!(?config, "Configuration loaded");

    let ctx = Arc::new(build_context(args, config));
    info!(run_id = %ctx.identity(), validate = args.validate, dry_run = args.dry_run, "Starting pipeline");

    let result = Pipeline::standard(&ctx, args.validate).run().await;

    let logger = LoggingEventSink::debug();
    logger.try_emit(
        event_types::PIPELINE_RESULT,
        Some(serde_json::to_value(&result).context("Failed to serialize pipeline result")?),
    );
    Ok(result)
}
