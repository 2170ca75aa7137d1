//! Models command - manage stored weights.

use std::path::PathBuf;

use anyhow::Result;
use blem_adapters::{ModelStore, DEFAULT_MODEL};
use clap::{Args, Subcommand};

use crate::config::AppConfig;

/// Arguments for the models command
#[derive(Args)]
pub struct ModelsArgs {
    /// Custom models directory (overrides default and config)
    #[arg(long, value_name = "DIR", global = true)]
    pub models_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: ModelsCommand,
}

/// Models subcommands
#[derive(Subcommand)]
pub enum ModelsCommand {
    /// List stored models
    List,
    /// Print model directory path
    Path,
}

/// Run the models command.
pub fn run(args: &ModelsArgs, config: &AppConfig) -> Result<()> {
    let store = args
        .models_dir
        .as_ref()
        .or(config.model.dir.as_ref())
        .map_or_else(ModelStore::open_default, |dir| ModelStore::new(dir.clone()));

    match args.command {
        ModelsCommand::List => list_models(&store, config),
        ModelsCommand::Path => {
            println!("{}", store.dir().display());
            Ok(())
        }
    }
}

fn list_models(store: &ModelStore, config: &AppConfig) -> Result<()> {
    let models = store.list()?;
    let active = config.model.name.as_deref().unwrap_or(DEFAULT_MODEL);

    println!("Models directory: {}", store.dir().display());
    println!();

    for name in &models {
        let marker = if name == active { "*" } else { " " };
        println!("  {marker} {name}");
    }

    if models.is_empty() {
        println!("  (none) Run `blem init` to create the default model.");
    }

    println!();
    println!("{} model(s) installed", models.len());

    Ok(())
}
