//! BLEM Adapters - external adapters for blem.
//!
//! This crate provides adapters for:
//! - Reading feature samples from JSON, JSON Lines and CSV recordings
//! - Storing and loading model weights

pub mod fs;
pub mod models;

pub use fs::FsFeatureSource;
pub use models::{default_models_dir, load_model, save_model, ModelStore, DEFAULT_MODEL};
