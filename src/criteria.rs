//! Criteria Matrix Builder
//!
//! Assembles the per-crop decision criteria consumed by the TOPSIS scorer.
//! Five criteria per crop, each with a declared polarity:
//!
//! | # | criterion          | polarity | meaning                                  |
//! |---|--------------------|----------|------------------------------------------|
//! | 0 | soil_fit           | benefit  | land-suitability index of the field      |
//! | 1 | water_fit          | benefit  | supply adequacy, capped at 1.0           |
//! | 2 | climate_deviation  | cost     | distance from the crop's optimum bands   |
//! | 3 | growth_duration    | cost     | season length in days                    |
//! | 4 | water_sensitivity  | cost     | ordinal stress sensitivity               |
//!
//! Building the matrix is a pure function of its inputs; vectors are never
//! cached across requests.

use crate::catalog::{Band, Crop};
use crate::context::{EnvironmentContext, FieldContext};
use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Number of criteria per crop.
pub const CRITERIA_COUNT: usize = 5;

/// Direction of preference for a criterion column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    /// Higher is better
    Benefit,
    /// Lower is better
    Cost,
}

/// Declaration of a single criterion column.
#[derive(Debug, Clone, Copy)]
pub struct CriterionDef {
    pub name: &'static str,
    pub polarity: Polarity,
}

/// Criterion declarations in column order.
pub const CRITERIA: [CriterionDef; CRITERIA_COUNT] = [
    CriterionDef { name: "soil_fit", polarity: Polarity::Benefit },
    CriterionDef { name: "water_fit", polarity: Polarity::Benefit },
    CriterionDef { name: "climate_deviation", polarity: Polarity::Cost },
    CriterionDef { name: "growth_duration", polarity: Polarity::Cost },
    CriterionDef { name: "water_sensitivity", polarity: Polarity::Cost },
];

/// Column polarities in declaration order.
pub fn criteria_polarities() -> [Polarity; CRITERIA_COUNT] {
    let mut polarities = [Polarity::Benefit; CRITERIA_COUNT];
    for (i, def) in CRITERIA.iter().enumerate() {
        polarities[i] = def.polarity;
    }
    polarities
}

/// Criteria values for one crop. Stack-allocated up to 8 criteria.
pub type CriteriaValues = SmallVec<[f64; 8]>;

/// One row of the decision matrix.
#[derive(Debug, Clone)]
pub struct CriteriaVector {
    pub crop_id: String,
    pub values: CriteriaValues,
}

/// Water-supply adequacy: fraction of the crop's seasonal requirement the
/// field can cover, capped at 1.0.
pub fn water_fit(crop: &Crop, field: &FieldContext) -> f64 {
    (field.water_availability_mm / crop.water_requirement_mm).min(1.0)
}

/// Relative deviation of `value` from `band`, in units of the band span.
///
/// 0.0 inside the band, growing linearly outside it.
fn band_deviation(value: f64, band: &Band) -> f64 {
    let span = band.span().max(f64::EPSILON);
    if value < band.min {
        (band.min - value) / span
    } else if value > band.max {
        (value - band.max) / span
    } else {
        0.0
    }
}

/// Combined temperature/rainfall deviation from the crop's optimum bands.
///
/// Both deviations are already relative, so a plain average keeps the two
/// dimensions comparable.
fn climate_deviation(crop: &Crop, env: &EnvironmentContext) -> f64 {
    let temp_dev = band_deviation(env.weather.mean_temperature_c, &crop.optimal_temperature_c);
    let rain_dev = band_deviation(env.weather.total_rainfall_mm, &crop.optimal_rainfall_mm);
    (temp_dev + rain_dev) / 2.0
}

/// Build the decision matrix for the candidate crops.
///
/// Fails with `InvalidInput` when the crop list is empty or the field is
/// malformed (`area_ha <= 0`, out-of-range soil attributes).
pub fn build(
    crops: &[&Crop],
    field: &FieldContext,
    env: &EnvironmentContext,
) -> Result<Vec<CriteriaVector>, EngineError> {
    if crops.is_empty() {
        return Err(EngineError::InvalidInput(
            "candidate crop list is empty".to_string(),
        ));
    }
    field.validate()?;
    env.validate()?;

    let matrix = crops
        .iter()
        .map(|crop| {
            let mut values = CriteriaValues::new();
            values.push(field.soil_suitability);
            values.push(water_fit(crop, field));
            values.push(climate_deviation(crop, env));
            values.push(crop.growth_duration_days);
            values.push(crop.water_sensitivity.ordinal());

            CriteriaVector {
                crop_id: crop.id.clone(),
                values,
            }
        })
        .collect();

    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CropCatalog;
    use crate::context::{MarketParams, SeasonWeather, SoilAttributes};
    use approx::assert_relative_eq;

    fn field(water_mm: f64) -> FieldContext {
        FieldContext {
            area_ha: 10.0,
            soil: SoilAttributes {
                soil_type: "loam".to_string(),
                ph: 6.5,
                ec_ds_m: 0.5,
            },
            soil_suitability: 0.8,
            water_availability_mm: water_mm,
            location: "test".to_string(),
            elevation_m: 100.0,
        }
    }

    fn environment(temp_c: f64, rain_mm: f64) -> EnvironmentContext {
        EnvironmentContext {
            weather: SeasonWeather {
                mean_temperature_c: temp_c,
                total_rainfall_mm: rain_mm,
                solar_radiation_mj_m2: 17.0,
                evapotranspiration_mm: 450.0,
                relative_humidity_pct: 60.0,
            },
            market: MarketParams::default(),
        }
    }

    #[test]
    fn test_water_fit_capped_at_one() {
        let catalog = CropCatalog::reference();
        let wheat = catalog.get("wheat").unwrap(); // needs 480 mm

        assert_relative_eq!(water_fit(wheat, &field(240.0)), 0.5, epsilon = 1e-12);
        assert_relative_eq!(water_fit(wheat, &field(2000.0)), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_climate_deviation_zero_inside_bands() {
        let catalog = CropCatalog::reference();
        let maize = catalog.get("maize").unwrap(); // 18-27 C, 500-900 mm

        let env = environment(22.0, 700.0);
        assert_relative_eq!(climate_deviation(maize, &env), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_climate_deviation_grows_outside_bands() {
        let catalog = CropCatalog::reference();
        let maize = catalog.get("maize").unwrap();

        let mild = climate_deviation(maize, &environment(28.0, 700.0));
        let severe = climate_deviation(maize, &environment(33.0, 700.0));
        assert!(mild > 0.0);
        assert!(severe > mild);
    }

    #[test]
    fn test_build_shape_and_order() {
        let catalog = CropCatalog::reference();
        let crops: Vec<&Crop> = catalog.list().iter().collect();
        let matrix = build(&crops, &field(600.0), &environment(24.0, 520.0)).unwrap();

        assert_eq!(matrix.len(), catalog.len());
        for (row, crop) in matrix.iter().zip(catalog.list()) {
            assert_eq!(row.crop_id, crop.id);
            assert_eq!(row.values.len(), CRITERIA_COUNT);
            assert_relative_eq!(row.values[0], 0.8, epsilon = 1e-12);
            assert_relative_eq!(row.values[3], crop.growth_duration_days, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_empty_crop_list_rejected() {
        let result = build(&[], &field(600.0), &environment(24.0, 520.0));
        assert!(matches!(result, Err(EngineError::InvalidInput(_))));
    }

    #[test]
    fn test_invalid_field_rejected() {
        let catalog = CropCatalog::reference();
        let crops: Vec<&Crop> = catalog.list().iter().collect();
        let mut bad = field(600.0);
        bad.area_ha = -1.0;
        assert!(build(&crops, &bad, &environment(24.0, 520.0)).is_err());
    }
}
