//! Crop Advisor - Main coordinator for recommendation and allocation
//!
//! Wires the pipeline together: criteria matrix -> TOPSIS suitability ->
//! per-crop predictions, profitability and risk (fanned out with Rayon) ->
//! combined ranking -> optional water-constrained allocation.
//!
//! The advisor holds the only shared state in the engine: the read-only
//! crop catalog, the injected prediction models and the configuration.
//! Every request is served without mutation, so one advisor can be shared
//! freely across worker threads.

use crate::allocation::{self, AllocationConstraint, AllocationResult};
use crate::catalog::{Crop, CropCatalog};
use crate::config::{EngineConfig, ScoreWeights};
use crate::context::{EnvironmentContext, FieldContext};
use crate::criteria::{self, criteria_polarities};
use crate::error::EngineError;
use crate::predict::{BaselinePriceModel, HeuristicYieldModel, PricePredictor, YieldPredictor};
use crate::profit::{self, ProfitResult};
use crate::ranker::{self, Recommendation};
use crate::risk::{self, RiskAssessment};
use crate::topsis::{self, SuitabilityResult};
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

/// One recommendation request: field, season, optional filters and weight
/// overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationRequest {
    pub field: FieldContext,
    pub environment: EnvironmentContext,

    /// Optional candidate filter; unknown ids are an input error
    #[serde(default)]
    pub crop_ids: Option<Vec<String>>,

    /// Field-specific historical yield average (t/ha), used when the yield
    /// model has no answer
    #[serde(default)]
    pub historical_yield_avg: Option<f64>,

    /// Per-request override of the configured suitability/profitability
    /// blend
    #[serde(default)]
    pub score_weights: Option<ScoreWeights>,
}

/// A crop dropped from the candidate set, with the reason (for the caller's
/// diagnostics; the drop is also logged).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DroppedCrop {
    pub crop_id: String,
    pub reason: String,
}

/// Echo of the request plus candidate accounting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputSummary {
    pub location: String,
    pub area_ha: f64,
    pub water_availability_mm: f64,
    pub season_rainfall_mm: f64,
    pub candidate_count: usize,
    pub scored_count: usize,
    pub dropped: Vec<DroppedCrop>,
}

/// Complete response for one recommendation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub recommendations: Vec<Recommendation>,
    pub input_summary: InputSummary,
    pub average_suitability: f64,
    pub best_profit_per_ha: f64,
    pub processing_time_ms: u64,
}

/// The engine facade handed to the caller layer.
pub struct CropAdvisor {
    catalog: CropCatalog,
    yield_model: Box<dyn YieldPredictor>,
    price_model: Box<dyn PricePredictor>,
    config: EngineConfig,
}

impl CropAdvisor {
    /// Build an advisor with explicit prediction models.
    pub fn new(
        catalog: CropCatalog,
        yield_model: Box<dyn YieldPredictor>,
        price_model: Box<dyn PricePredictor>,
        config: EngineConfig,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        if catalog.is_empty() {
            return Err(EngineError::InvalidInput("crop catalog is empty".to_string()));
        }
        Ok(Self {
            catalog,
            yield_model,
            price_model,
            config,
        })
    }

    /// Build an advisor on the deterministic baseline models.
    ///
    /// This is the explicit demo/offline mode; production callers inject
    /// their live model clients via [`CropAdvisor::new`].
    pub fn with_baseline_models(
        catalog: CropCatalog,
        config: EngineConfig,
    ) -> Result<Self, EngineError> {
        Self::new(
            catalog,
            Box::new(HeuristicYieldModel),
            Box::new(BaselinePriceModel::reference()),
            config,
        )
    }

    pub fn catalog(&self) -> &CropCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Resolve the candidate crop set for a request.
    fn candidates(&self, request: &RecommendationRequest) -> Result<Vec<&Crop>, EngineError> {
        match &request.crop_ids {
            Some(ids) => {
                if ids.is_empty() {
                    return Err(EngineError::InvalidInput(
                        "crop filter list is empty".to_string(),
                    ));
                }
                ids.iter()
                    .map(|id| {
                        self.catalog.get(id).ok_or_else(|| {
                            EngineError::InvalidInput(format!("unknown crop id '{}'", id))
                        })
                    })
                    .collect()
            }
            None => Ok(self.catalog.list().iter().collect()),
        }
    }

    /// Generate the ranked recommendation list for one request.
    pub fn generate_recommendations(
        &self,
        request: &RecommendationRequest,
    ) -> Result<RecommendationResponse, EngineError> {
        let started = Instant::now();

        request.field.validate()?;
        request.environment.validate()?;
        let weights = request.score_weights.unwrap_or(self.config.score_weights);
        weights.validate()?;

        let candidates = self.candidates(request)?;
        let candidate_count = candidates.len();

        // Suitability over the full candidate set
        let matrix = criteria::build(&candidates, &request.field, &request.environment)?;
        let suitability = topsis::score(
            &matrix,
            &self.config.criteria_weights,
            &criteria_polarities(),
        )?;
        let suitability_by_id: FxHashMap<&str, &SuitabilityResult> = suitability
            .iter()
            .map(|s| (s.crop_id.as_str(), s))
            .collect();

        // Per-crop predictions, profitability and risk fan out across the
        // thread pool; collect preserves candidate order so the output is
        // deterministic
        let market = &request.environment.market;
        let outcomes: Vec<Result<(ProfitResult, RiskAssessment), DroppedCrop>> = candidates
            .par_iter()
            .map(|crop| {
                // Yield failure falls back to static averages
                let yield_prediction = self
                    .yield_model
                    .predict(crop, &request.field, &request.environment)
                    .ok();

                // Price failure drops the crop: there is no static fallback
                // for market prices
                let price_prediction = self
                    .price_model
                    .predict(crop, &request.field, &request.environment, market)
                    .map_err(|e| DroppedCrop {
                        crop_id: crop.id.clone(),
                        reason: e.to_string(),
                    })?;

                let profit = profit::estimate(
                    crop,
                    market,
                    yield_prediction,
                    &price_prediction,
                    request.historical_yield_avg,
                );

                let closeness = suitability_by_id
                    .get(crop.id.as_str())
                    .map(|s| s.closeness)
                    .unwrap_or(0.0);
                let assessment = risk::classify(
                    crop,
                    closeness,
                    criteria::water_fit(crop, &request.field),
                    market.price_volatility,
                    &self.config.risk,
                );

                Ok((profit, assessment))
            })
            .collect();

        let mut profits = Vec::with_capacity(candidate_count);
        let mut assessments = Vec::with_capacity(candidate_count);
        let mut dropped = Vec::new();
        for outcome in outcomes {
            match outcome {
                Ok((profit, assessment)) => {
                    profits.push(profit);
                    assessments.push(assessment);
                }
                Err(drop) => {
                    warn!(crop = %drop.crop_id, reason = %drop.reason, "dropping crop from candidate set");
                    dropped.push(drop);
                }
            }
        }

        if profits.is_empty() {
            return Err(EngineError::NoScoreableCrops(format!(
                "all {} candidates failed prediction",
                candidate_count
            )));
        }

        // Restrict suitability to the surviving crops before ranking
        let scored_ids: FxHashMap<&str, ()> =
            profits.iter().map(|p| (p.crop_id.as_str(), ())).collect();
        let surviving: Vec<SuitabilityResult> = suitability
            .iter()
            .filter(|s| scored_ids.contains_key(s.crop_id.as_str()))
            .cloned()
            .collect();

        let crops_by_id: FxHashMap<&str, &Crop> = candidates
            .iter()
            .map(|c| (c.id.as_str(), *c))
            .collect();
        let recommendations =
            ranker::rank(&crops_by_id, &surviving, &profits, &assessments, &weights)?;

        let average_suitability = recommendations
            .iter()
            .map(|r| r.suitability_score)
            .sum::<f64>()
            / recommendations.len() as f64;
        let best_profit_per_ha = recommendations
            .iter()
            .map(|r| r.profit_per_ha)
            .fold(f64::NEG_INFINITY, f64::max);

        let scored_count = recommendations.len();
        debug!(
            candidates = candidate_count,
            scored = scored_count,
            dropped = dropped.len(),
            "recommendation pipeline complete"
        );

        Ok(RecommendationResponse {
            recommendations,
            input_summary: InputSummary {
                location: request.field.location.clone(),
                area_ha: request.field.area_ha,
                water_availability_mm: request.field.water_availability_mm,
                season_rainfall_mm: request.environment.weather.total_rainfall_mm,
                candidate_count,
                scored_count,
                dropped,
            },
            average_suitability,
            best_profit_per_ha,
            processing_time_ms: started.elapsed().as_millis() as u64,
        })
    }

    /// Allocate area and water across an already-ranked list.
    pub fn run_allocation(
        &self,
        ranked: &[Recommendation],
        total_area_ha: f64,
        constraint: &AllocationConstraint,
    ) -> Result<AllocationResult, EngineError> {
        allocation::optimize(ranked, total_area_ha, constraint, self.config.area_cap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{MarketParams, SeasonWeather, SoilAttributes};
    use crate::predict::{PricePrediction, PredictionError};

    fn request() -> RecommendationRequest {
        RecommendationRequest {
            field: FieldContext {
                area_ha: 15.0,
                soil: SoilAttributes {
                    soil_type: "clay loam".to_string(),
                    ph: 6.3,
                    ec_ds_m: 0.7,
                },
                soil_suitability: 0.72,
                water_availability_mm: 620.0,
                location: "delta plot 4".to_string(),
                elevation_m: 12.0,
            },
            environment: EnvironmentContext {
                weather: SeasonWeather {
                    mean_temperature_c: 24.5,
                    total_rainfall_mm: 480.0,
                    solar_radiation_mj_m2: 18.5,
                    evapotranspiration_mm: 510.0,
                    relative_humidity_pct: 64.0,
                },
                market: MarketParams {
                    price_factor: 1.0,
                    price_volatility: 0.12,
                    demand_level: Default::default(),
                },
            },
            crop_ids: None,
            historical_yield_avg: None,
            score_weights: None,
        }
    }

    fn advisor() -> CropAdvisor {
        CropAdvisor::with_baseline_models(CropCatalog::reference(), EngineConfig::default())
            .unwrap()
    }

    #[test]
    fn test_full_pipeline_produces_ranked_list() {
        let response = advisor().generate_recommendations(&request()).unwrap();

        assert_eq!(response.recommendations.len(), 8);
        assert_eq!(response.input_summary.candidate_count, 8);
        assert_eq!(response.input_summary.scored_count, 8);
        assert!(response.input_summary.dropped.is_empty());

        for (i, rec) in response.recommendations.iter().enumerate() {
            assert_eq!(rec.rank, (i + 1) as u32);
            assert!(rec.suitability_score >= 0.0 && rec.suitability_score <= 1.0);
            assert!(!rec.rationale.is_empty());
        }
    }

    #[test]
    fn test_crop_filter_restricts_candidates() {
        let mut req = request();
        req.crop_ids = Some(vec!["wheat".to_string(), "maize".to_string()]);

        let response = advisor().generate_recommendations(&req).unwrap();
        assert_eq!(response.recommendations.len(), 2);
    }

    #[test]
    fn test_unknown_crop_filter_rejected() {
        let mut req = request();
        req.crop_ids = Some(vec!["wheat".to_string(), "durian".to_string()]);

        let result = advisor().generate_recommendations(&req);
        assert!(matches!(result, Err(EngineError::InvalidInput(_))));
    }

    #[test]
    fn test_request_weight_override_validated() {
        let mut req = request();
        req.score_weights = Some(ScoreWeights::new(0.4, 0.5));

        let result = advisor().generate_recommendations(&req);
        assert!(matches!(result, Err(EngineError::InvalidWeights { .. })));
    }

    /// Price model that fails for a fixed crop id.
    struct FlakyPriceModel {
        failing_id: String,
        inner: BaselinePriceModel,
    }

    impl PricePredictor for FlakyPriceModel {
        fn predict(
            &self,
            crop: &Crop,
            field: &FieldContext,
            env: &EnvironmentContext,
            market: &MarketParams,
        ) -> Result<PricePrediction, PredictionError> {
            if crop.id == self.failing_id {
                return Err(PredictionError::Unavailable("upstream 503".to_string()));
            }
            self.inner.predict(crop, field, env, market)
        }
    }

    #[test]
    fn test_prediction_failure_drops_single_crop() {
        let advisor = CropAdvisor::new(
            CropCatalog::reference(),
            Box::new(HeuristicYieldModel),
            Box::new(FlakyPriceModel {
                failing_id: "rice".to_string(),
                inner: BaselinePriceModel::reference(),
            }),
            EngineConfig::default(),
        )
        .unwrap();

        let response = advisor.generate_recommendations(&request()).unwrap();

        assert_eq!(response.recommendations.len(), 7);
        assert!(response.recommendations.iter().all(|r| r.crop_id != "rice"));
        assert_eq!(response.input_summary.dropped.len(), 1);
        assert_eq!(response.input_summary.dropped[0].crop_id, "rice");
    }

    /// Price model that always fails.
    struct DeadPriceModel;

    impl PricePredictor for DeadPriceModel {
        fn predict(
            &self,
            _crop: &Crop,
            _field: &FieldContext,
            _env: &EnvironmentContext,
            _market: &MarketParams,
        ) -> Result<PricePrediction, PredictionError> {
            Err(PredictionError::Unavailable("model offline".to_string()))
        }
    }

    #[test]
    fn test_all_predictions_failing_is_an_error() {
        let advisor = CropAdvisor::new(
            CropCatalog::reference(),
            Box::new(HeuristicYieldModel),
            Box::new(DeadPriceModel),
            EngineConfig::default(),
        )
        .unwrap();

        let result = advisor.generate_recommendations(&request());
        assert!(matches!(result, Err(EngineError::NoScoreableCrops(_))));
    }
}
