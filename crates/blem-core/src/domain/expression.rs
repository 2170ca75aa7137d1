//! Expression classes recognised by the network.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Number of expression classes (size of the output layer).
pub const EXPRESSION_COUNT: usize = 5;

/// A facial expression class.
///
/// Discriminants match the positions in the network's logit vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expression {
    /// Relaxed face.
    Neutral = 0,
    /// Smiling.
    Happy = 1,
    /// Frowning.
    Sad = 2,
    /// Brows down, lips pressed.
    Anger = 3,
    /// Wide eyes, open jaw.
    Shocked = 4,
}

impl Expression {
    /// All classes in logit order.
    pub const ALL: [Self; EXPRESSION_COUNT] = [
        Self::Neutral,
        Self::Happy,
        Self::Sad,
        Self::Anger,
        Self::Shocked,
    ];

    /// Returns the class at a logit index.
    #[must_use]
    pub const fn from_index(idx: usize) -> Option<Self> {
        match idx {
            0 => Some(Self::Neutral),
            1 => Some(Self::Happy),
            2 => Some(Self::Sad),
            3 => Some(Self::Anger),
            4 => Some(Self::Shocked),
            _ => None,
        }
    }

    /// Returns the logit index of this class.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns the lowercase label used in output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Neutral => "neutral",
            Self::Happy => "happy",
            Self::Sad => "sad",
            Self::Anger => "anger",
            Self::Shocked => "shocked",
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Expression {
    type Err = String;

    /// Parses a label case-insensitively; recorded datasets use `Neutral`, `Happy`, ...
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim();
        Self::ALL
            .into_iter()
            .find(|e| e.as_str().eq_ignore_ascii_case(label))
            .ok_or_else(|| format!("unknown expression '{label}'"))
    }
}
