//! Crop Catalog
//!
//! Static crop reference data: water demand, season length, optimum climate
//! bands, typical yields and baseline production costs. The catalog is the
//! only shared resource in the engine and is read-only after loading.
//!
//! Sources: a compiled-in reference set for demos/tests, or CSV/Parquet
//! files loaded with Polars for real deployments.

use crate::error::EngineError;
use anyhow::{Context, Result};
use polars::prelude::*;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// Ordinal water sensitivity of a crop (`Low < Medium < High`).
///
/// High sensitivity means yield degrades quickly under water stress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaterSensitivity {
    Low,
    Medium,
    High,
}

impl WaterSensitivity {
    pub fn as_str(&self) -> &'static str {
        match self {
            WaterSensitivity::Low => "low",
            WaterSensitivity::Medium => "medium",
            WaterSensitivity::High => "high",
        }
    }

    /// Ordinal encoding used as a cost criterion (1 = low, 3 = high).
    pub fn ordinal(&self) -> f64 {
        match self {
            WaterSensitivity::Low => 1.0,
            WaterSensitivity::Medium => 2.0,
            WaterSensitivity::High => 3.0,
        }
    }
}

impl FromStr for WaterSensitivity {
    type Err = EngineError;

    /// Strict parse: unrecognized strings are rejected, never defaulted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(WaterSensitivity::Low),
            "medium" => Ok(WaterSensitivity::Medium),
            "high" => Ok(WaterSensitivity::High),
            other => Err(EngineError::UnknownWaterSensitivity(other.to_string())),
        }
    }
}

/// Inclusive numeric band (e.g. optimum temperature range).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub min: f64,
    pub max: f64,
}

impl Band {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

/// Static crop reference record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Crop {
    /// Stable identifier (lower_snake, e.g. "rice")
    pub id: String,

    /// Display name
    pub name: String,

    /// Yield response to water stress
    pub water_sensitivity: WaterSensitivity,

    /// Season length in days
    pub growth_duration_days: f64,

    /// Seasonal water requirement for a fully irrigated hectare (mm)
    pub water_requirement_mm: f64,

    /// Typical yield range under adequate management (t/ha)
    pub typical_yield_t_ha: Band,

    /// Optimum seasonal mean temperature band (deg C)
    pub optimal_temperature_c: Band,

    /// Optimum seasonal rainfall band (mm)
    pub optimal_rainfall_mm: Band,

    /// Baseline production cost per hectare (currency units)
    pub baseline_cost_per_ha: f64,
}

impl Crop {
    /// Midpoint of the typical yield range, used as the static historical
    /// average when a yield prediction is unavailable.
    pub fn historical_yield_avg(&self) -> f64 {
        self.typical_yield_t_ha.midpoint()
    }

    fn validate(&self) -> Result<(), EngineError> {
        if self.id.trim().is_empty() {
            return Err(EngineError::InvalidInput("crop id is empty".to_string()));
        }
        if self.water_requirement_mm <= 0.0 {
            return Err(EngineError::InvalidInput(format!(
                "crop '{}': water requirement must be > 0 mm",
                self.id
            )));
        }
        if self.growth_duration_days <= 0.0 {
            return Err(EngineError::InvalidInput(format!(
                "crop '{}': growth duration must be > 0 days",
                self.id
            )));
        }
        if self.baseline_cost_per_ha <= 0.0 {
            return Err(EngineError::InvalidInput(format!(
                "crop '{}': baseline cost must be > 0",
                self.id
            )));
        }
        Ok(())
    }
}

/// Read-only crop catalog with id lookup.
pub struct CropCatalog {
    crops: Vec<Crop>,
    index: FxHashMap<String, usize>,
}

impl CropCatalog {
    /// Build a catalog from explicit crop records.
    ///
    /// Rejects empty lists, duplicate ids and malformed records.
    pub fn from_crops(crops: Vec<Crop>) -> Result<Self, EngineError> {
        if crops.is_empty() {
            return Err(EngineError::InvalidInput("crop catalog is empty".to_string()));
        }

        let mut index = FxHashMap::default();
        for (i, crop) in crops.iter().enumerate() {
            crop.validate()?;
            if index.insert(crop.id.clone(), i).is_some() {
                return Err(EngineError::InvalidInput(format!(
                    "duplicate crop id '{}' in catalog",
                    crop.id
                )));
            }
        }

        Ok(Self { crops, index })
    }

    /// Compiled-in reference catalog covering the major field crops.
    ///
    /// Values are seasonal aggregates from FAO crop water guidance, rounded
    /// for readability. Used by demo binaries, benches and tests; production
    /// deployments load their own files via [`CropCatalog::load_csv`].
    pub fn reference() -> Self {
        let crops = vec![
            Crop {
                id: "rice".to_string(),
                name: "Rice (paddy)".to_string(),
                water_sensitivity: WaterSensitivity::High,
                growth_duration_days: 135.0,
                water_requirement_mm: 1100.0,
                typical_yield_t_ha: Band::new(3.5, 6.5),
                optimal_temperature_c: Band::new(22.0, 30.0),
                optimal_rainfall_mm: Band::new(1000.0, 1800.0),
                baseline_cost_per_ha: 1450.0,
            },
            Crop {
                id: "maize".to_string(),
                name: "Maize".to_string(),
                water_sensitivity: WaterSensitivity::Medium,
                growth_duration_days: 120.0,
                water_requirement_mm: 550.0,
                typical_yield_t_ha: Band::new(4.0, 9.0),
                optimal_temperature_c: Band::new(18.0, 27.0),
                optimal_rainfall_mm: Band::new(500.0, 900.0),
                baseline_cost_per_ha: 1100.0,
            },
            Crop {
                id: "wheat".to_string(),
                name: "Wheat".to_string(),
                water_sensitivity: WaterSensitivity::Low,
                growth_duration_days: 130.0,
                water_requirement_mm: 480.0,
                typical_yield_t_ha: Band::new(2.5, 6.0),
                optimal_temperature_c: Band::new(12.0, 22.0),
                optimal_rainfall_mm: Band::new(400.0, 750.0),
                baseline_cost_per_ha: 900.0,
            },
            Crop {
                id: "soybean".to_string(),
                name: "Soybean".to_string(),
                water_sensitivity: WaterSensitivity::Medium,
                growth_duration_days: 110.0,
                water_requirement_mm: 500.0,
                typical_yield_t_ha: Band::new(1.8, 3.5),
                optimal_temperature_c: Band::new(20.0, 28.0),
                optimal_rainfall_mm: Band::new(450.0, 800.0),
                baseline_cost_per_ha: 800.0,
            },
            Crop {
                id: "tomato".to_string(),
                name: "Tomato".to_string(),
                water_sensitivity: WaterSensitivity::High,
                growth_duration_days: 95.0,
                water_requirement_mm: 600.0,
                typical_yield_t_ha: Band::new(35.0, 70.0),
                optimal_temperature_c: Band::new(18.0, 26.0),
                optimal_rainfall_mm: Band::new(400.0, 650.0),
                baseline_cost_per_ha: 5200.0,
            },
            Crop {
                id: "potato".to_string(),
                name: "Potato".to_string(),
                water_sensitivity: WaterSensitivity::High,
                growth_duration_days: 105.0,
                water_requirement_mm: 520.0,
                typical_yield_t_ha: Band::new(18.0, 40.0),
                optimal_temperature_c: Band::new(14.0, 22.0),
                optimal_rainfall_mm: Band::new(450.0, 700.0),
                baseline_cost_per_ha: 2600.0,
            },
            Crop {
                id: "cotton".to_string(),
                name: "Cotton".to_string(),
                water_sensitivity: WaterSensitivity::Low,
                growth_duration_days: 170.0,
                water_requirement_mm: 800.0,
                typical_yield_t_ha: Band::new(1.5, 3.2),
                optimal_temperature_c: Band::new(22.0, 32.0),
                optimal_rainfall_mm: Band::new(600.0, 1100.0),
                baseline_cost_per_ha: 1350.0,
            },
            Crop {
                id: "sugarcane".to_string(),
                name: "Sugarcane".to_string(),
                water_sensitivity: WaterSensitivity::Medium,
                growth_duration_days: 300.0,
                water_requirement_mm: 1800.0,
                typical_yield_t_ha: Band::new(60.0, 110.0),
                optimal_temperature_c: Band::new(24.0, 32.0),
                optimal_rainfall_mm: Band::new(1500.0, 2400.0),
                baseline_cost_per_ha: 2100.0,
            },
        ];

        // Reference data is hand-checked; from_crops cannot fail on it
        match Self::from_crops(crops) {
            Ok(catalog) => catalog,
            Err(e) => unreachable!("reference catalog failed validation: {e}"),
        }
    }

    /// Load a catalog from a CSV file.
    ///
    /// Expected header:
    /// `crop_id,name,water_sensitivity,growth_duration_days,water_requirement_mm,
    /// yield_min_t_ha,yield_max_t_ha,temp_opt_min_c,temp_opt_max_c,
    /// rain_opt_min_mm,rain_opt_max_mm,baseline_cost_per_ha`
    pub fn load_csv(path: &Path) -> Result<Self> {
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(path.into()))
            .with_context(|| format!("Failed to create CSV reader: {:?}", path))?
            .finish()
            .with_context(|| format!("Failed to load crop catalog CSV: {:?}", path))?;

        Self::from_dataframe(&df)
            .with_context(|| format!("Malformed crop catalog: {:?}", path))
    }

    /// Load a catalog from a Parquet file with the same column layout as
    /// [`CropCatalog::load_csv`].
    pub fn load_parquet(path: &Path) -> Result<Self> {
        let path_str = path.to_string_lossy().to_string();
        let df = LazyFrame::scan_parquet(&path_str, Default::default())
            .with_context(|| format!("Failed to scan parquet: {}", path_str))?
            .collect()
            .with_context(|| format!("Failed to load crop catalog parquet: {}", path_str))?;

        Self::from_dataframe(&df)
            .with_context(|| format!("Malformed crop catalog: {}", path_str))
    }

    fn from_dataframe(df: &DataFrame) -> Result<Self> {
        let str_col = |name: &str| -> Result<StringChunked> {
            Ok(df
                .column(name)
                .with_context(|| format!("Column '{}' not found", name))?
                .str()
                .with_context(|| format!("Column '{}' is not string type", name))?
                .clone())
        };
        let f64_col = |name: &str| -> Result<Float64Chunked> {
            Ok(df
                .column(name)
                .with_context(|| format!("Column '{}' not found", name))?
                .cast(&DataType::Float64)
                .with_context(|| format!("Column '{}' is not numeric", name))?
                .f64()
                .with_context(|| format!("Column '{}' failed float conversion", name))?
                .clone())
        };

        let ids = str_col("crop_id")?;
        let names = str_col("name")?;
        let sensitivities = str_col("water_sensitivity")?;
        let durations = f64_col("growth_duration_days")?;
        let water_reqs = f64_col("water_requirement_mm")?;
        let yield_mins = f64_col("yield_min_t_ha")?;
        let yield_maxs = f64_col("yield_max_t_ha")?;
        let temp_mins = f64_col("temp_opt_min_c")?;
        let temp_maxs = f64_col("temp_opt_max_c")?;
        let rain_mins = f64_col("rain_opt_min_mm")?;
        let rain_maxs = f64_col("rain_opt_max_mm")?;
        let costs = f64_col("baseline_cost_per_ha")?;

        let mut crops = Vec::with_capacity(df.height());
        for idx in 0..df.height() {
            let id = ids
                .get(idx)
                .with_context(|| format!("Row {}: missing crop_id", idx))?;
            let required = |opt: Option<f64>, col: &str| -> Result<f64> {
                opt.with_context(|| format!("Row {} ('{}'): missing {}", idx, id, col))
            };

            crops.push(Crop {
                id: id.to_string(),
                name: names
                    .get(idx)
                    .with_context(|| format!("Row {} ('{}'): missing name", idx, id))?
                    .to_string(),
                water_sensitivity: sensitivities
                    .get(idx)
                    .with_context(|| format!("Row {} ('{}'): missing water_sensitivity", idx, id))?
                    .parse()?,
                growth_duration_days: required(durations.get(idx), "growth_duration_days")?,
                water_requirement_mm: required(water_reqs.get(idx), "water_requirement_mm")?,
                typical_yield_t_ha: Band::new(
                    required(yield_mins.get(idx), "yield_min_t_ha")?,
                    required(yield_maxs.get(idx), "yield_max_t_ha")?,
                ),
                optimal_temperature_c: Band::new(
                    required(temp_mins.get(idx), "temp_opt_min_c")?,
                    required(temp_maxs.get(idx), "temp_opt_max_c")?,
                ),
                optimal_rainfall_mm: Band::new(
                    required(rain_mins.get(idx), "rain_opt_min_mm")?,
                    required(rain_maxs.get(idx), "rain_opt_max_mm")?,
                ),
                baseline_cost_per_ha: required(costs.get(idx), "baseline_cost_per_ha")?,
            });
        }

        Ok(Self::from_crops(crops)?)
    }

    /// All crops in catalog order.
    pub fn list(&self) -> &[Crop] {
        &self.crops
    }

    /// Look up a crop by id.
    pub fn get(&self, id: &str) -> Option<&Crop> {
        self.index.get(id).map(|&i| &self.crops[i])
    }

    pub fn len(&self) -> usize {
        self.crops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.crops.is_empty()
    }
}
