//! Prediction Interfaces
//!
//! Yield and price predictions come from external model collaborators. The
//! engine only consumes them through these traits; it never trains or
//! retries. Implementations wrapping remote models are expected to enforce
//! the caller-supplied timeout themselves and surface expiry as
//! `PredictionError::Timeout`.
//!
//! The baseline models below are deterministic heuristics over catalog data.
//! They stand in for the external regression models and double as the
//! explicit demo mode: the caller opts in by constructing the advisor with
//! them, there is no hidden runtime fallback.

use crate::catalog::{Crop, WaterSensitivity};
use crate::context::{DemandLevel, EnvironmentContext, FieldContext, MarketParams};
use crate::criteria::water_fit;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Yield estimate for one crop on one field/season.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct YieldPrediction {
    pub yield_t_per_ha: f64,
    /// Model confidence in [0, 1]
    pub confidence: f64,
}

/// Farm-gate price estimate for one crop.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PricePrediction {
    pub price_per_kg: f64,
    /// Model confidence in [0, 1]
    pub confidence: f64,
}

/// A single crop's prediction failed. Recoverable: the advisor drops the
/// crop from the candidate set and the request proceeds with the rest.
#[derive(Debug, Clone, Error)]
pub enum PredictionError {
    #[error("prediction timed out after {0:?}")]
    Timeout(Duration),

    #[error("prediction unavailable: {0}")]
    Unavailable(String),
}

/// External yield model.
pub trait YieldPredictor: Send + Sync {
    fn predict(
        &self,
        crop: &Crop,
        field: &FieldContext,
        env: &EnvironmentContext,
    ) -> Result<YieldPrediction, PredictionError>;
}

/// External price model.
pub trait PricePredictor: Send + Sync {
    fn predict(
        &self,
        crop: &Crop,
        field: &FieldContext,
        env: &EnvironmentContext,
        market: &MarketParams,
    ) -> Result<PricePrediction, PredictionError>;
}

// ============================================================================
// Baseline models
// ============================================================================

/// Water-stress yield penalty per sensitivity class, applied to the water
/// deficit fraction.
fn stress_penalty(sensitivity: WaterSensitivity) -> f64 {
    match sensitivity {
        WaterSensitivity::Low => 0.25,
        WaterSensitivity::Medium => 0.45,
        WaterSensitivity::High => 0.70,
    }
}

/// Deterministic yield heuristic over the crop's typical range.
///
/// Scales the range by soil suitability, then discounts for water deficit
/// weighted by the crop's stress sensitivity.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicYieldModel;

impl YieldPredictor for HeuristicYieldModel {
    fn predict(
        &self,
        crop: &Crop,
        field: &FieldContext,
        _env: &EnvironmentContext,
    ) -> Result<YieldPrediction, PredictionError> {
        let range = &crop.typical_yield_t_ha;
        let base = range.min + range.span() * field.soil_suitability;

        let deficit = 1.0 - water_fit(crop, field);
        let stressed = base * (1.0 - stress_penalty(crop.water_sensitivity) * deficit);

        Ok(YieldPrediction {
            yield_t_per_ha: stressed.max(0.0),
            confidence: 0.55,
        })
    }
}

/// Deterministic price heuristic from per-crop reference prices.
pub struct BaselinePriceModel {
    /// Crop id -> reference farm-gate price (per kg)
    reference_prices: FxHashMap<String, f64>,
}

impl BaselinePriceModel {
    pub fn new(reference_prices: FxHashMap<String, f64>) -> Self {
        Self { reference_prices }
    }

    /// Reference prices matching the compiled-in crop catalog.
    pub fn reference() -> Self {
        let mut prices = FxHashMap::default();
        prices.insert("rice".to_string(), 0.42);
        prices.insert("maize".to_string(), 0.21);
        prices.insert("wheat".to_string(), 0.25);
        prices.insert("soybean".to_string(), 0.48);
        prices.insert("tomato".to_string(), 0.55);
        prices.insert("potato".to_string(), 0.30);
        prices.insert("cotton".to_string(), 1.65);
        prices.insert("sugarcane".to_string(), 0.04);
        Self::new(prices)
    }

    fn demand_multiplier(level: DemandLevel) -> f64 {
        match level {
            DemandLevel::Low => 0.9,
            DemandLevel::Normal => 1.0,
            DemandLevel::High => 1.12,
        }
    }
}

impl PricePredictor for BaselinePriceModel {
    fn predict(
        &self,
        crop: &Crop,
        _field: &FieldContext,
        _env: &EnvironmentContext,
        market: &MarketParams,
    ) -> Result<PricePrediction, PredictionError> {
        let base = self.reference_prices.get(&crop.id).ok_or_else(|| {
            PredictionError::Unavailable(format!("no reference price for crop '{}'", crop.id))
        })?;

        let price = base * market.price_factor * Self::demand_multiplier(market.demand_level);

        // Confidence degrades with market volatility
        let confidence = (0.7 - market.price_volatility * 0.5).clamp(0.2, 0.7);

        Ok(PricePrediction {
            price_per_kg: price,
            confidence,
        })
    }
}
