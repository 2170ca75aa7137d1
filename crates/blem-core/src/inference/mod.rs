//! ML inference using Candle.
//!
//! Provides the expression network, weight loading and device selection.

mod device;
pub mod loader;
mod mlp;
mod tracker;

pub use device::get_device;
pub use loader::{load_safetensors, save_safetensors};
pub use mlp::{
    ExpressionMlp, ExpressionParams, ForwardTrace, LayerParams, HIDDEN1_SIZE, HIDDEN2_SIZE,
    INPUT_FEATURES, LAYERS,
};
pub use tracker::ExpressionTracker;
