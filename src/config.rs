//! Engine Configuration
//!
//! All tunable constants live here, passed explicitly into the engine at
//! construction. There are no module-level toggles; choosing baseline vs.
//! live prediction models is equally explicit (see `advisor`).

use crate::criteria::CRITERIA_COUNT;
use crate::error::{validate_weight_sum, EngineError};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Convex weighting between suitability and profitability for the combined
/// ranking score. Must sum to 1.0 within tolerance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub suitability: f64,
    pub profitability: f64,
}

impl ScoreWeights {
    pub fn new(suitability: f64, profitability: f64) -> Self {
        Self { suitability, profitability }
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        validate_weight_sum(&[self.suitability, self.profitability])
    }
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self { suitability: 0.6, profitability: 0.4 }
    }
}

/// Fixed thresholds for rule-based risk classification.
///
/// These are documented constants, not learned parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RiskThresholds {
    /// Suitability below this is a strong risk signal
    pub low_suitability: f64,

    /// Suitability below this (but above `low_suitability`) is a mild signal
    pub marginal_suitability: f64,

    /// Price volatility at or above this is a strong risk signal
    pub high_volatility: f64,

    /// Price volatility at or above this (but below `high_volatility`) is a
    /// mild signal
    pub moderate_volatility: f64,

    /// Water fit below this counts as constrained supply
    pub tight_water_fit: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            low_suitability: 0.4,
            marginal_suitability: 0.6,
            high_volatility: 0.30,
            moderate_volatility: 0.15,
            tight_water_fit: 0.5,
        }
    }
}

/// How the per-crop area cap is derived during allocation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "policy", content = "share")]
pub enum AreaCapPolicy {
    /// Remaining unallocated area divided evenly among remaining candidates
    EvenSplit,

    /// Fixed share of the remaining unallocated area per crop, in (0, 1]
    FixedShare(f64),
}

impl Default for AreaCapPolicy {
    fn default() -> Self {
        AreaCapPolicy::EvenSplit
    }
}

/// Complete engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// TOPSIS criteria weights, one per criterion in declaration order;
    /// must sum to 1.0
    #[serde(default = "default_criteria_weights")]
    pub criteria_weights: [f64; CRITERIA_COUNT],

    /// Default suitability/profitability blend; requests may override
    #[serde(default)]
    pub score_weights: ScoreWeights,

    #[serde(default)]
    pub risk: RiskThresholds,

    #[serde(default)]
    pub area_cap: AreaCapPolicy,
}

fn default_criteria_weights() -> [f64; CRITERIA_COUNT] {
    [1.0 / CRITERIA_COUNT as f64; CRITERIA_COUNT]
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            criteria_weights: default_criteria_weights(),
            score_weights: ScoreWeights::default(),
            risk: RiskThresholds::default(),
            area_cap: AreaCapPolicy::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read engine config: {:?}", path))?;

        let config: EngineConfig = serde_json::from_str(&contents)
            .with_context(|| "Failed to parse engine config JSON")?;

        config
            .validate()
            .with_context(|| format!("Invalid engine config: {:?}", path))?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        validate_weight_sum(&self.criteria_weights)?;
        self.score_weights.validate()?;

        if let AreaCapPolicy::FixedShare(share) = self.area_cap {
            if !(share > 0.0 && share <= 1.0) {
                return Err(EngineError::InvalidInput(format!(
                    "area cap share must be in (0, 1] (got {})",
                    share
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_bad_criteria_weights_rejected() {
        let mut config = EngineConfig::default();
        config.criteria_weights = [0.4, 0.5, 0.0, 0.0, 0.0];
        assert!(matches!(
            config.validate(),
            Err(EngineError::InvalidWeights { .. })
        ));
    }

    #[test]
    fn test_bad_score_weights_rejected() {
        let mut config = EngineConfig::default();
        config.score_weights = ScoreWeights::new(0.4, 0.5);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"score_weights": {"suitability": 0.7, "profitability": 0.3}}"#)
                .unwrap();
        assert!(config.validate().is_ok());
        assert!((config.score_weights.suitability - 0.7).abs() < 1e-12);
        assert_eq!(config.area_cap, AreaCapPolicy::EvenSplit);
    }

    #[test]
    fn test_fixed_share_bounds() {
        let mut config = EngineConfig::default();
        config.area_cap = AreaCapPolicy::FixedShare(0.5);
        assert!(config.validate().is_ok());
        config.area_cap = AreaCapPolicy::FixedShare(0.0);
        assert!(config.validate().is_err());
    }
}
