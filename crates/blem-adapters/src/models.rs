//! Model weight storage adapter.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use blem_core::inference::{load_safetensors, save_safetensors};
use blem_core::ExpressionMlp;
use candle_core::Device;
use tracing::{debug, info};

/// Name of the model used when none is given.
pub const DEFAULT_MODEL: &str = "blem";

/// File extension of stored weights.
const MODEL_EXTENSION: &str = "safetensors";

/// Returns the default models directory.
///
/// Uses `XDG_DATA_HOME/blem/models` or `~/.local/share/blem/models`.
#[must_use]
pub fn default_models_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("blem")
        .join("models")
}

/// Loads a network from a safetensors file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, lacks a tensor, or a tensor
/// has the wrong shape.
pub fn load_model(path: impl AsRef<Path>, device: &Device) -> Result<ExpressionMlp> {
    let path = path.as_ref();
    let tensors = load_safetensors(path, device)?;
    let model = ExpressionMlp::from_tensors(tensors, device)
        .with_context(|| format!("Invalid expression model: {}", path.display()))?;
    debug!("Loaded expression model from {}", path.display());
    Ok(model)
}

/// Writes a network's weights to a safetensors file.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn save_model(path: impl AsRef<Path>, model: &ExpressionMlp) -> Result<()> {
    let path = path.as_ref();
    let params = model.params()?;
    save_safetensors(path, &params.to_tensors())?;
    info!("Saved expression model to {}", path.display());
    Ok(())
}

/// A directory of named models.
#[derive(Debug, Clone)]
pub struct ModelStore {
    dir: PathBuf,
}

impl ModelStore {
    /// Creates a store rooted at `dir`. The directory is created on first save.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store at [`default_models_dir`].
    #[must_use]
    pub fn open_default() -> Self {
        Self::new(default_models_dir())
    }

    /// Root directory of the store.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the weights file for `name`.
    #[must_use]
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.{MODEL_EXTENSION}"))
    }

    /// Whether a model called `name` exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.path(name).is_file()
    }

    /// Lists stored models by name, sorted.
    ///
    /// A missing directory yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory exists but cannot be read.
    pub fn list(&self) -> Result<Vec<String>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&self.dir)
            .with_context(|| format!("Failed to read models directory {}", self.dir.display()))?;

        let mut names: Vec<String> = entries
            .flatten()
            .map(|e| e.path())
            .filter(|p| p.is_file() && p.extension().is_some_and(|e| e == MODEL_EXTENSION))
            .filter_map(|p| p.file_stem().and_then(|s| s.to_str()).map(str::to_string))
            .collect();
        names.sort();
        Ok(names)
    }

    /// Loads the model called `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the model does not exist or is invalid.
    pub fn load(&self, name: &str, device: &Device) -> Result<ExpressionMlp> {
        let path = self.path(name);
        if !path.is_file() {
            anyhow::bail!(
                "Model '{name}' not found at {}. Run `blem init` or pass --model.",
                path.display()
            );
        }
        load_model(&path, device)
    }

    /// Saves `model` under `name`, returning the written path.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn save(&self, name: &str, model: &ExpressionMlp) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir).context("Failed to create models directory")?;
        let path = self.path(name);
        save_model(&path, model)?;
        Ok(path)
    }
}
