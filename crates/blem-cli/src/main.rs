//! BLEM CLI - facial expression classification from blend-shape scores.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod output;

use commands::classify::ClassifyArgs;
use commands::{Cli, Commands, ExitCode};
use config::AppConfig;

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = AppConfig::load();

    let exit_code = match cli.command {
        Some(Commands::Classify(args)) => classify(args, &config),
        Some(Commands::Init(ref args)) => report(commands::init::run(args, &config)),
        Some(Commands::Models(ref args)) => report(commands::models::run(args, &config)),
        None => {
            // Default behavior: classify with flattened args
            if cli.classify.paths.is_empty() {
                eprintln!("error: No paths specified. Use --help for usage information.");
                return ExitCode::Error.into();
            }
            classify(cli.classify, &config)
        }
    };

    exit_code.into()
}

fn classify(args: ClassifyArgs, config: &AppConfig) -> ExitCode {
    let args = ClassifyArgs::with_config(args, config);
    match commands::classify::run(&args) {
        Ok(result) => result.exit_code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::Error
        }
    }
}

fn report(result: anyhow::Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::Success,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::Error
        }
    }
}
