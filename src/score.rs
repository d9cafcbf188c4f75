//! Severity banding and highlight badges for the 0-100 eco scores.

use crate::model::EcoScore;
use serde::{Deserialize, Serialize};

/// Breakpoints are fixed; they drive both display colour and severity
/// downstream, so they are not configurable.
pub const GOOD_MIN: u8 = 70;
pub const CAUTION_MIN: u8 = 50;

pub const HIGH_RECYCLABILITY_MIN: u8 = 80;
pub const REPAIR_FRIENDLY_MIN: u8 = 70;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreBand {
    Good,
    Caution,
    Risk,
}

impl ScoreBand {
    pub fn label(self) -> &'static str {
        match self {
            ScoreBand::Good => "good",
            ScoreBand::Caution => "caution",
            ScoreBand::Risk => "risk",
        }
    }
}

pub fn band(score: u8) -> ScoreBand {
    if score >= GOOD_MIN {
        ScoreBand::Good
    } else if score >= CAUTION_MIN {
        ScoreBand::Caution
    } else {
        ScoreBand::Risk
    }
}

/// Badge line for the report header. "Smart Suggestions" is always present;
/// the other two depend on their thresholds.
pub fn highlights(scores: &EcoScore) -> Vec<&'static str> {
    let mut out = Vec::with_capacity(3);
    if scores.recyclability >= HIGH_RECYCLABILITY_MIN {
        out.push("High Recyclability");
    }
    if scores.repairability >= REPAIR_FRIENDLY_MIN {
        out.push("Repair-Friendly");
    }
    out.push("Smart Suggestions");
    out
}
