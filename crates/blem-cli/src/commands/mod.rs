//! CLI command definitions and handlers.

pub mod classify;
pub mod init;
pub mod models;

use clap::{Parser, Subcommand};

/// BLEM - facial expression classification from blend-shape scores
#[derive(Parser)]
#[command(name = "blem")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Shared classify arguments (paths, model, output flags).
    #[command(flatten)]
    pub classify: classify::ClassifyArgs,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Classify blend-shape samples
    Classify(classify::ClassifyArgs),
    /// Write randomly initialized weights
    Init(init::InitArgs),
    /// Manage stored models
    Models(models::ModelsArgs),
}

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Every sample was classified.
    Success = 0,
    /// Some samples were skipped.
    Skipped = 1,
    /// The command failed.
    Error = 2,
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        Self::from(code as u8)
    }
}
