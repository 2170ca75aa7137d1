//! Init command - write randomly initialized weights.

use std::path::PathBuf;

use anyhow::{Context, Result};
use blem_adapters::{save_model, ModelStore, DEFAULT_MODEL};
use blem_core::{get_device, ExpressionMlp};
use clap::Args;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::config::AppConfig;

/// Arguments for the init command
#[derive(Args)]
pub struct InitArgs {
    /// Seed for the random initialization (random when omitted)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Weights file to write (default: the configured model in the models directory)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Custom models directory
    #[arg(long, value_name = "DIR")]
    pub models_dir: Option<PathBuf>,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

/// Run the init command.
///
/// Without `--output`, writes to the model that `classify` would load: the
/// configured name in the configured models directory.
pub fn run(args: &InitArgs, config: &AppConfig) -> Result<()> {
    let path = match args.output {
        Some(ref p) => p.clone(),
        None => {
            let store = args
                .models_dir
                .as_ref()
                .or(config.model.dir.as_ref())
                .map_or_else(ModelStore::open_default, |dir| ModelStore::new(dir.clone()));
            store.path(config.model.name.as_deref().unwrap_or(DEFAULT_MODEL))
        }
    };

    if path.exists() && !args.force {
        anyhow::bail!(
            "{} already exists. Pass --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let seed = args.seed.unwrap_or_else(rand::random);
    debug!("Initializing weights with seed {seed}");
    let mut rng = StdRng::seed_from_u64(seed);

    let model = ExpressionMlp::random(&mut rng, &get_device())?;
    save_model(&path, &model)?;

    info!("Initialized weights with seed {seed}");
    println!("{}", path.display());
    Ok(())
}
