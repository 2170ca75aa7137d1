//! MediaPipe blend-shape feature layout.
//!
//! The face landmarker reports 52 blend-shape categories per face. The network
//! is trained on all of them except `_neutral`, in the column order of the
//! recorded dataset.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::inference::INPUT_FEATURES;

/// Blend-shape names in network input order.
pub const BLENDSHAPE_NAMES: [&str; INPUT_FEATURES] = [
    "browDownLeft",
    "browDownRight",
    "browInnerUp",
    "browOuterUpLeft",
    "browOuterUpRight",
    "cheekPuff",
    "cheekSquintLeft",
    "cheekSquintRight",
    "eyeBlinkLeft",
    "eyeBlinkRight",
    "eyeLookDownLeft",
    "eyeLookDownRight",
    "eyeLookInLeft",
    "eyeLookInRight",
    "eyeLookOutLeft",
    "eyeLookOutRight",
    "eyeLookUpLeft",
    "eyeLookUpRight",
    "eyeSquintLeft",
    "eyeSquintRight",
    "eyeWideLeft",
    "eyeWideRight",
    "jawForward",
    "jawLeft",
    "jawOpen",
    "jawRight",
    "mouthClose",
    "mouthDimpleLeft",
    "mouthDimpleRight",
    "mouthFrownLeft",
    "mouthFrownRight",
    "mouthFunnel",
    "mouthLeft",
    "mouthLowerDownLeft",
    "mouthLowerDownRight",
    "mouthPressLeft",
    "mouthPressRight",
    "mouthPucker",
    "mouthRight",
    "mouthRollLower",
    "mouthRollUpper",
    "mouthShrugLower",
    "mouthShrugUpper",
    "mouthSmileLeft",
    "mouthSmileRight",
    "mouthStretchLeft",
    "mouthStretchRight",
    "mouthUpperUpLeft",
    "mouthUpperUpRight",
    "noseSneerLeft",
    "noseSneerRight",
];

/// Name and score of a single blend shape, as reported by MediaPipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlendShape {
    /// Category name (`jawOpen`, `mouthSmileLeft`, ...).
    #[serde(alias = "categoryName", alias = "category_name")]
    pub name: String,
    /// Score in 0.0..=1.0.
    pub score: f32,
}

/// Returns the input position of a blend shape, if the network uses it.
#[must_use]
pub fn feature_index(name: &str) -> Option<usize> {
    BLENDSHAPE_NAMES.iter().position(|n| *n == name)
}

/// Flattens blend-shape scores into network input order.
///
/// Names the network does not use (such as `_neutral`) are dropped. A missing
/// name is skipped rather than filled in, so incomplete input produces a short
/// vector that the classifier rejects with a shape error.
pub fn extract_features<'a, I>(blendshapes: I) -> Vec<f32>
where
    I: IntoIterator<Item = (&'a str, f32)>,
{
    let scores: HashMap<&str, f32> = blendshapes.into_iter().collect();
    BLENDSHAPE_NAMES
        .iter()
        .filter_map(|name| scores.get(name).copied())
        .collect()
}
