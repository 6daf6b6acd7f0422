// Severity bands for symptom listings

use serde::{Deserialize, Serialize};

/// Coarse severity band derived from a symptom's weight.
/// Thresholds follow the 0-10 scale the severity data ships with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityBand {
    Unrated,
    Low,
    Medium,
    High,
}

impl SeverityBand {
    pub fn classify(weight: f64) -> Self {
        if weight >= 7.0 {
            SeverityBand::High
        } else if weight >= 4.0 {
            SeverityBand::Medium
        } else if weight >= 1.0 {
            SeverityBand::Low
        } else {
            SeverityBand::Unrated
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SeverityBand::High => "high",
            SeverityBand::Medium => "medium",
            SeverityBand::Low => "low",
            SeverityBand::Unrated => "unrated",
        }
    }
}
