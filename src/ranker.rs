//! Combined Ranker
//!
//! Merges suitability and profitability into one ordered recommendation
//! list. Profit is min-max scaled against the candidate set (clamped to
//! [0, 1]); the blend is a convex weighting validated to sum to 1. Ranks are
//! dense and 1-based, ordered by combined score descending with crop id
//! breaking ties, so identical inputs always produce identical lists.

use crate::catalog::Crop;
use crate::config::ScoreWeights;
use crate::error::EngineError;
use crate::profit::ProfitResult;
use crate::risk::{RiskAssessment, RiskBand};
use crate::topsis::SuitabilityResult;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// One ranked crop recommendation, self-contained for the caller layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub crop_id: String,
    pub crop_name: String,

    /// TOPSIS closeness coefficient in [0, 1]
    pub suitability_score: f64,

    /// Expected profit per hectare
    pub profit_per_ha: f64,
    pub roi: f64,

    /// Yield and price figures behind the profit estimate
    pub yield_t_per_ha: f64,
    pub price_per_kg: f64,

    /// Seasonal water requirement (mm), carried for the allocator
    pub water_requirement_mm: f64,

    pub risk_band: RiskBand,
    pub risk_factors: Vec<String>,

    /// Convex blend of suitability and normalized profit
    pub combined_score: f64,

    /// 1-based dense rank
    pub rank: u32,

    /// Human-readable summary of the numbers above
    pub rationale: String,
}

fn rationale_text(
    crop: &Crop,
    suitability: f64,
    profit: &ProfitResult,
    risk: &RiskAssessment,
) -> String {
    let suitability_phrase = if suitability >= 0.75 {
        "strong match for the field and season"
    } else if suitability >= 0.5 {
        "reasonable match for the field and season"
    } else {
        "weak match for the field and season"
    };

    let profit_phrase = if profit.profit >= 0.0 {
        format!(
            "expected profit {:.0}/ha at {:.1} t/ha",
            profit.profit, profit.yield_t_per_ha
        )
    } else {
        format!(
            "expected loss {:.0}/ha at {:.1} t/ha",
            -profit.profit, profit.yield_t_per_ha
        )
    };

    let risk_phrase = if risk.factors.is_empty() {
        format!("{} risk", risk.band.as_str())
    } else {
        format!("{} risk: {}", risk.band.as_str(), risk.factors.join("; "))
    };

    format!(
        "{}: suitability {:.2}, {}; {}; {}",
        crop.name, suitability, suitability_phrase, profit_phrase, risk_phrase
    )
}

/// Merge the three per-crop result sets into the final ranked list.
///
/// All three slices must cover the same crop set (the advisor guarantees
/// this after dropping unscoreable crops); a crop missing from any set is an
/// `InvalidInput` error. `crops` supplies names and water requirements.
pub fn rank(
    crops: &FxHashMap<&str, &Crop>,
    suitability: &[SuitabilityResult],
    profitability: &[ProfitResult],
    risk: &[RiskAssessment],
    weights: &ScoreWeights,
) -> Result<Vec<Recommendation>, EngineError> {
    weights.validate()?;

    if suitability.is_empty() {
        return Err(EngineError::InvalidInput(
            "no suitability results to rank".to_string(),
        ));
    }

    let profit_by_id: FxHashMap<&str, &ProfitResult> = profitability
        .iter()
        .map(|p| (p.crop_id.as_str(), p))
        .collect();
    let risk_by_id: FxHashMap<&str, &RiskAssessment> =
        risk.iter().map(|r| (r.crop_id.as_str(), r)).collect();

    // Min-max profit scaling against the candidate set. A non-positive
    // maximum defines every normalized profit as 0.
    let max_profit = profitability
        .iter()
        .map(|p| p.profit)
        .fold(f64::NEG_INFINITY, f64::max);

    let mut recommendations = Vec::with_capacity(suitability.len());
    for s in suitability {
        let crop = crops.get(s.crop_id.as_str()).ok_or_else(|| {
            EngineError::InvalidInput(format!("crop '{}' missing from catalog set", s.crop_id))
        })?;
        let profit = profit_by_id.get(s.crop_id.as_str()).ok_or_else(|| {
            EngineError::InvalidInput(format!("crop '{}' missing profit result", s.crop_id))
        })?;
        let assessment = risk_by_id.get(s.crop_id.as_str()).ok_or_else(|| {
            EngineError::InvalidInput(format!("crop '{}' missing risk assessment", s.crop_id))
        })?;

        let normalized_profit = if max_profit > 0.0 {
            (profit.profit / max_profit).clamp(0.0, 1.0)
        } else {
            0.0
        };

        let combined_score =
            weights.suitability * s.closeness + weights.profitability * normalized_profit;

        recommendations.push(Recommendation {
            crop_id: s.crop_id.clone(),
            crop_name: crop.name.clone(),
            suitability_score: s.closeness,
            profit_per_ha: profit.profit,
            roi: profit.roi,
            yield_t_per_ha: profit.yield_t_per_ha,
            price_per_kg: profit.price_per_kg,
            water_requirement_mm: crop.water_requirement_mm,
            risk_band: assessment.band,
            risk_factors: assessment.factors.clone(),
            combined_score,
            rank: 0,
            rationale: rationale_text(crop, s.closeness, profit, assessment),
        });
    }

    recommendations.sort_by(|a, b| {
        b.combined_score
            .partial_cmp(&a.combined_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.crop_id.cmp(&b.crop_id))
    });

    for (i, rec) in recommendations.iter_mut().enumerate() {
        rec.rank = (i + 1) as u32;
    }

    Ok(recommendations)
}
