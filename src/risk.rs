//! Risk Classifier
//!
//! Derives a qualitative risk band for each recommendation from three
//! signals: water sensitivity under constrained supply, market price
//! volatility, and the suitability score itself. Classification is
//! rule-based with fixed thresholds from [`RiskThresholds`]; each band comes
//! with human-readable factor strings for the dashboard.

use crate::catalog::{Crop, WaterSensitivity};
use crate::config::RiskThresholds;
use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Qualitative risk band (`Low < Medium < High`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskBand {
    Low,
    Medium,
    High,
}

impl RiskBand {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskBand::Low => "low",
            RiskBand::Medium => "medium",
            RiskBand::High => "high",
        }
    }
}

impl FromStr for RiskBand {
    type Err = EngineError;

    /// Strict parse: unrecognized strings are rejected, never defaulted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(RiskBand::Low),
            "medium" => Ok(RiskBand::Medium),
            "high" => Ok(RiskBand::High),
            other => Err(EngineError::UnknownRiskBand(other.to_string())),
        }
    }
}

/// Risk band plus the factors that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub crop_id: String,
    pub band: RiskBand,
    pub factors: Vec<String>,
}

/// Classify one crop's risk.
///
/// Each strong signal scores 2 points, each mild signal 1; bands are
/// `Low` (0-1), `Medium` (2-3), `High` (4+). Factors mirror the points.
pub fn classify(
    crop: &Crop,
    suitability: f64,
    water_fit: f64,
    price_volatility: f64,
    thresholds: &RiskThresholds,
) -> RiskAssessment {
    let mut points = 0u32;
    let mut factors = Vec::new();

    // Water sensitivity only matters when supply is actually constrained
    if water_fit < thresholds.tight_water_fit {
        match crop.water_sensitivity {
            WaterSensitivity::High => {
                points += 2;
                factors.push("high water sensitivity under constrained supply".to_string());
            }
            WaterSensitivity::Medium => {
                points += 1;
                factors.push("moderate water sensitivity under constrained supply".to_string());
            }
            WaterSensitivity::Low => {}
        }
    }

    if price_volatility >= thresholds.high_volatility {
        points += 2;
        factors.push(format!(
            "highly volatile market prices (volatility {:.2})",
            price_volatility
        ));
    } else if price_volatility >= thresholds.moderate_volatility {
        points += 1;
        factors.push(format!(
            "moderately volatile market prices (volatility {:.2})",
            price_volatility
        ));
    }

    if suitability < thresholds.low_suitability {
        points += 2;
        factors.push(format!(
            "low suitability for field conditions (score {:.2})",
            suitability
        ));
    } else if suitability < thresholds.marginal_suitability {
        points += 1;
        factors.push(format!(
            "marginal suitability for field conditions (score {:.2})",
            suitability
        ));
    }

    let band = match points {
        0..=1 => RiskBand::Low,
        2..=3 => RiskBand::Medium,
        _ => RiskBand::High,
    };

    RiskAssessment {
        crop_id: crop.id.clone(),
        band,
        factors,
    }
}
