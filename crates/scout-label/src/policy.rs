//! Label decision policy
//!
//! The constants and the order of the checks below define the training
//! labels; changing either invalidates previously generated datasets.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::racer::RaceResult;
use crate::Error;

/// Which strategy a file should use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Label {
    /// Algorithm A (Brotli, text-optimized)
    AlgoA = 0,
    /// Algorithm B (Zstd, balanced)
    AlgoB = 1,
    /// Store without compression
    None = 2,
}

impl Label {
    /// Every label in code order
    pub const ALL: [Self; 3] = [Self::AlgoA, Self::AlgoB, Self::None];

    /// Integer encoding shared with the trainer
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Decode the integer encoding
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::AlgoA),
            1 => Some(Self::AlgoB),
            2 => Some(Self::None),
            _ => None,
        }
    }

    /// Display name of the strategy
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::AlgoA => "brotli",
            Self::AlgoB => "zstd",
            Self::None => "none",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Label {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|label| label.name() == lower)
            .ok_or_else(|| Error::UnknownLabel(s.to_string()))
    }
}

/// Thresholds turning a [`RaceResult`] into a [`Label`]
#[derive(Debug, Clone, Copy, Default)]
pub struct LabelPolicy;

impl LabelPolicy {
    /// Best codec must reach this fraction of the original size or the
    /// file is stored uncompressed (savings under 5%)
    pub const MIN_SAVINGS_RATIO: f64 = 0.95;

    /// Algorithm A must be smaller than this fraction of B's size to win
    pub const PREFER_A_RATIO: f64 = 0.98;

    /// Decide the label for a race.
    #[must_use]
    pub fn decide(result: &RaceResult) -> Label {
        if result.original_size == 0 {
            return Label::None;
        }

        let min_size = result.size_a.min(result.size_b);
        if min_size as f64 > result.original_size as f64 * Self::MIN_SAVINGS_RATIO {
            return Label::None;
        }

        // Ties and small gaps go to B, which is cheaper to run
        if (result.size_a as f64) < result.size_b as f64 * Self::PREFER_A_RATIO {
            Label::AlgoA
        } else {
            Label::AlgoB
        }
    }
}

/// Shorthand for [`LabelPolicy::decide`]
#[must_use]
pub fn decide(result: &RaceResult) -> Label {
    LabelPolicy::decide(result)
}
