//! Classify command - predict expressions for blend-shape samples.

use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::Result;
use blem_adapters::{load_model, FsFeatureSource, ModelStore, DEFAULT_MODEL};
use blem_core::{get_device, pipeline, ExpressionMlp, FeatureSource, RunOptions, RunSummary};
use clap::Args;
use tracing::{debug, info};

use super::ExitCode;
use crate::config::AppConfig;
use crate::output::{JsonOutput, OutputFormat, ProgressBar};

/// Shared arguments for classification.
#[derive(Args, Clone, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct ClassifyArgs {
    /// Feature files (.jsonl, .ndjson, .json, .csv) or directories; `-` reads stdin
    pub paths: Vec<PathBuf>,

    /// Recurse into subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Weights file to use (overrides models directory and config)
    #[arg(long, value_name = "FILE")]
    pub model: Option<PathBuf>,

    /// Custom models directory (overrides default and config)
    #[arg(long, value_name = "DIR")]
    pub models_dir: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Pretty-print JSON output (only affects --format json)
    #[arg(long)]
    pub pretty: bool,

    /// Only write samples whose expression differs from the previous one
    #[arg(long)]
    pub changes_only: bool,

    /// Show progress bar
    #[arg(long)]
    pub progress: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Model name within the models directory (config only).
    #[arg(skip)]
    model_name: Option<String>,
}

impl ClassifyArgs {
    /// Apply configuration file values, respecting CLI precedence.
    ///
    /// Layering priority (lowest to highest):
    /// 1. Hardcoded defaults (in accessor methods)
    /// 2. Config file values (XDG, then project-local)
    /// 3. CLI arguments (already set on self)
    pub fn with_config(mut args: Self, config: &AppConfig) -> Self {
        if !args.recursive {
            args.recursive = config.general.recursive.unwrap_or(false);
        }

        if args.model.is_none() {
            args.model.clone_from(&config.model.path);
        }
        if args.models_dir.is_none() {
            args.models_dir.clone_from(&config.model.dir);
        }
        args.model_name.clone_from(&config.model.name);

        if args.format.is_none() {
            args.format = config
                .output
                .format
                .as_ref()
                .and_then(|s| match s.as_str() {
                    "json" => Some(OutputFormat::Json),
                    "jsonl" => Some(OutputFormat::Jsonl),
                    _ => None,
                });
        }

        if !args.pretty {
            args.pretty = config.output.pretty.unwrap_or(false);
        }
        if !args.progress {
            args.progress = config.output.progress.unwrap_or(false);
        }
        if !args.changes_only {
            args.changes_only = config.output.changes_only.unwrap_or(false);
        }

        args
    }

    /// Get output format with fallback to JSONL.
    fn format(&self) -> OutputFormat {
        self.format.unwrap_or_default()
    }

    /// Get model name with fallback to the default model.
    fn model_name(&self) -> &str {
        self.model_name.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    /// Models directory from CLI or config, else the default store.
    pub fn store(&self) -> ModelStore {
        self.models_dir
            .as_ref()
            .map_or_else(ModelStore::open_default, |dir| ModelStore::new(dir.clone()))
    }

    /// Loads the network selected by `--model`, config, or the store.
    fn load_model(&self) -> Result<ExpressionMlp> {
        let device = get_device();
        if let Some(ref path) = self.model {
            debug!("Using weights file: {}", path.display());
            return load_model(path, &device);
        }

        let store = self.store();
        debug!("Using models directory: {}", store.dir().display());
        store.load(self.model_name(), &device)
    }
}

/// Result of running the classify command.
#[allow(dead_code)] // Fields exposed for programmatic use
pub struct ClassifyResult {
    /// Counters from the run.
    pub summary: RunSummary,
    /// Exit code.
    pub exit_code: ExitCode,
}

/// Run the classify command.
///
/// Expects `args` to have been processed through `with_config()` first
/// to apply configuration file settings.
pub fn run(args: &ClassifyArgs) -> Result<ClassifyResult> {
    info!("Running classify command on {} paths", args.paths.len());

    if args.paths.is_empty() {
        anyhow::bail!("No paths specified");
    }

    let model = args.load_model()?;

    let source = FsFeatureSource::new(args.paths.clone(), args.recursive);
    let total = source.count_hint();

    let show_progress = !args.quiet && (args.progress || std::io::stderr().is_terminal());
    let progress_bar = ProgressBar::new(total.map(|t| t as u64), args.quiet, show_progress);

    let output = JsonOutput::stdout(args.format(), args.pretty);

    let options = RunOptions {
        changes_only: args.changes_only,
    };
    let summary = pipeline::run(
        &model,
        &source,
        &output,
        &progress_bar,
        options,
        &iso_timestamp,
    )?;

    let exit_code = if summary.skipped > 0 {
        ExitCode::Skipped
    } else {
        ExitCode::Success
    };

    Ok(ClassifyResult { summary, exit_code })
}

/// Generate ISO 8601 UTC timestamp (RFC 3339 format).
fn iso_timestamp() -> String {
    match time::OffsetDateTime::now_utc().format(&time::format_description::well_known::Rfc3339) {
        Ok(ts) => ts,
        Err(e) => {
            debug!("Timestamp format failed: {e}");
            String::from("1970-01-01T00:00:00Z")
        }
    }
}
