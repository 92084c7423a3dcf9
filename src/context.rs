//! Request Contexts
//!
//! Per-request field and environment descriptions. One of each is supplied
//! for every recommendation request; nothing here is persisted or cached by
//! the engine.

use crate::error::EngineError;
use serde::{Deserialize, Serialize};

/// Soil description of the field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoilAttributes {
    /// Texture/type label (e.g. "clay loam")
    pub soil_type: String,

    /// pH in water
    pub ph: f64,

    /// Electrical conductivity (dS/m), salinity indicator
    pub ec_ds_m: f64,
}

/// The field a recommendation is generated for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldContext {
    /// Cultivable area (ha)
    pub area_ha: f64,

    pub soil: SoilAttributes,

    /// Land-suitability index in [0, 1] from the external land classifier
    pub soil_suitability: f64,

    /// Seasonal water availability for the field (mm)
    pub water_availability_mm: f64,

    /// Free-text location label, echoed in the input summary
    pub location: String,

    pub elevation_m: f64,
}

impl FieldContext {
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.area_ha <= 0.0 {
            return Err(EngineError::InvalidInput(format!(
                "field area must be > 0 ha (got {})",
                self.area_ha
            )));
        }
        if !(0.0..=1.0).contains(&self.soil_suitability) {
            return Err(EngineError::InvalidInput(format!(
                "soil suitability must be in [0, 1] (got {})",
                self.soil_suitability
            )));
        }
        if self.water_availability_mm < 0.0 {
            return Err(EngineError::InvalidInput(format!(
                "water availability must be >= 0 mm (got {})",
                self.water_availability_mm
            )));
        }
        if !(0.0..=14.0).contains(&self.soil.ph) {
            return Err(EngineError::InvalidInput(format!(
                "soil pH must be in [0, 14] (got {})",
                self.soil.ph
            )));
        }
        Ok(())
    }
}

/// Season weather aggregates from the external forecast service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonWeather {
    pub mean_temperature_c: f64,
    pub total_rainfall_mm: f64,
    pub solar_radiation_mj_m2: f64,
    pub evapotranspiration_mm: f64,
    pub relative_humidity_pct: f64,
}

/// Market demand level used by the baseline price model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DemandLevel {
    Low,
    Normal,
    High,
}

impl Default for DemandLevel {
    fn default() -> Self {
        DemandLevel::Normal
    }
}

/// Market signals supplied per request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketParams {
    /// Multiplier on reference prices (1.0 = current reference level)
    pub price_factor: f64,

    /// Relative price volatility in [0, 1]
    pub price_volatility: f64,

    #[serde(default)]
    pub demand_level: DemandLevel,
}

impl Default for MarketParams {
    fn default() -> Self {
        Self {
            price_factor: 1.0,
            price_volatility: 0.1,
            demand_level: DemandLevel::Normal,
        }
    }
}

/// Season weather plus market signals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentContext {
    pub weather: SeasonWeather,
    pub market: MarketParams,
}

impl EnvironmentContext {
    pub fn validate(&self) -> Result<(), EngineError> {
        if !(0.0..=100.0).contains(&self.weather.relative_humidity_pct) {
            return Err(EngineError::InvalidInput(format!(
                "relative humidity must be in [0, 100] (got {})",
                self.weather.relative_humidity_pct
            )));
        }
        if self.weather.total_rainfall_mm < 0.0 {
            return Err(EngineError::InvalidInput(format!(
                "season rainfall must be >= 0 mm (got {})",
                self.weather.total_rainfall_mm
            )));
        }
        if self.market.price_factor <= 0.0 {
            return Err(EngineError::InvalidInput(format!(
                "price factor must be > 0 (got {})",
                self.market.price_factor
            )));
        }
        if !(0.0..=1.0).contains(&self.market.price_volatility) {
            return Err(EngineError::InvalidInput(format!(
                "price volatility must be in [0, 1] (got {})",
                self.market.price_volatility
            )));
        }
        Ok(())
    }
}
