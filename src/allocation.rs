//! Allocation Optimizer
//!
//! Greedy water-budget-constrained area allocation over the ranked
//! recommendation list. This is deliberately a bounded heuristic, not an LP
//! solve: walk crops in combined-score order, give each up to its area cap
//! or whatever area the remaining water budget still covers, and report
//! whether the outcome was optimal, feasible or infeasible.
//!
//! Water accounting: a crop's seasonal requirement is a depth (mm) per
//! hectare; allocating `a` hectares consumes `requirement_mm * a` from the
//! quota, which is therefore a volume expressed in mm*ha (1 mm*ha = 10 m3).
//!
//! Infeasibility is a reported status, not an error: failing to cover a
//! mandatory minimum is an expected business outcome.

use crate::config::AreaCapPolicy;
use crate::error::EngineError;
use crate::ranker::Recommendation;
use crate::risk::RiskBand;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Outcome quality of an allocation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllocationStatus {
    /// Every eligible candidate received its full area cap
    Optimal,
    /// At least one allocation was made, but the quota truncated or
    /// excluded some candidates
    Feasible,
    /// The mandatory minimum could not be covered; nothing was allocated
    Infeasible,
}

impl AllocationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AllocationStatus::Optimal => "optimal",
            AllocationStatus::Feasible => "feasible",
            AllocationStatus::Infeasible => "infeasible",
        }
    }
}

/// Mandatory minimum area for a protected (staple) crop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtectedMinimum {
    pub crop_id: String,
    pub min_area_ha: f64,
}

/// Resource and policy constraints for one allocation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationConstraint {
    /// Seasonal water budget (mm*ha)
    pub water_quota: f64,

    /// Optional protected-crop minimum, reserved before the greedy walk
    #[serde(default)]
    pub protected: Option<ProtectedMinimum>,

    /// Crops above this risk band are excluded
    pub max_risk: RiskBand,

    /// Optional explicit allow-list; when set, only these crop ids compete
    #[serde(default)]
    pub allow_list: Option<Vec<String>>,
}

/// Area and water granted to one crop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CropAllocation {
    pub crop_id: String,
    pub area_ha: f64,

    /// Water consumed by this allocation (mm*ha)
    pub water_used: f64,

    /// Expected profit from this allocation (profit/ha * area)
    pub expected_profit: f64,
}

/// Result of one allocation run.
///
/// Whenever `status != Infeasible`: `total_water_used <= water_quota` and
/// `total_area_ha` never exceeds the field area given to the optimizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationResult {
    pub status: AllocationStatus,
    pub total_profit: f64,
    pub total_area_ha: f64,
    pub total_water_used: f64,
    pub allocations: Vec<CropAllocation>,
}

impl AllocationResult {
    fn infeasible() -> Self {
        Self {
            status: AllocationStatus::Infeasible,
            total_profit: 0.0,
            total_area_ha: 0.0,
            total_water_used: 0.0,
            allocations: Vec::new(),
        }
    }
}

/// Per-crop area cap for this walk step.
fn area_cap(policy: AreaCapPolicy, remaining_area: f64, remaining_candidates: usize) -> f64 {
    match policy {
        AreaCapPolicy::EvenSplit => remaining_area / remaining_candidates.max(1) as f64,
        AreaCapPolicy::FixedShare(share) => remaining_area * share,
    }
}

/// Run the greedy allocation.
///
/// Steps:
/// 1. Filter candidates by risk band and allow-list.
/// 2. Reserve the protected minimum (area and water) first; if the
///    reservation alone exceeds the quota or the field, return
///    `Infeasible` with zero allocations.
/// 3. Walk the remaining ranked list in order, allocating up to the area
///    cap or whatever the remaining quota covers.
/// 4. Stop when candidates run out or the quota is exhausted.
///
/// The ranked list must be non-empty and the field area positive
/// (`InvalidInput` otherwise); the quota must be non-negative.
pub fn optimize(
    ranked: &[Recommendation],
    total_area_ha: f64,
    constraint: &AllocationConstraint,
    policy: AreaCapPolicy,
) -> Result<AllocationResult, EngineError> {
    if ranked.is_empty() {
        return Err(EngineError::InvalidInput(
            "ranked recommendation list is empty".to_string(),
        ));
    }
    if total_area_ha <= 0.0 {
        return Err(EngineError::InvalidInput(format!(
            "total area must be > 0 ha (got {})",
            total_area_ha
        )));
    }
    if constraint.water_quota < 0.0 {
        return Err(EngineError::InvalidInput(format!(
            "water quota must be >= 0 (got {})",
            constraint.water_quota
        )));
    }
    if let Some(protected) = &constraint.protected {
        if protected.min_area_ha < 0.0 {
            return Err(EngineError::InvalidInput(format!(
                "protected minimum area must be >= 0 ha (got {})",
                protected.min_area_ha
            )));
        }
    }

    let allowed = |rec: &Recommendation| -> bool {
        if rec.risk_band > constraint.max_risk {
            return false;
        }
        match &constraint.allow_list {
            Some(list) => list.iter().any(|id| id == &rec.crop_id),
            None => true,
        }
    };

    let mut remaining_area = total_area_ha;
    let mut remaining_water = constraint.water_quota;
    let mut allocations: Vec<CropAllocation> = Vec::new();
    let mut truncated = false;

    // Step 2: mandatory reservation before anything else. The protected
    // minimum bypasses the risk/allow filters: policy demands the staple
    // regardless of its band.
    if let Some(protected) = &constraint.protected {
        if protected.min_area_ha > 0.0 {
            let rec = ranked
                .iter()
                .find(|r| r.crop_id == protected.crop_id)
                .ok_or_else(|| {
                    EngineError::InvalidInput(format!(
                        "protected crop '{}' not in ranked list",
                        protected.crop_id
                    ))
                })?;

            let reserved_water = rec.water_requirement_mm * protected.min_area_ha;
            if reserved_water > remaining_water || protected.min_area_ha > remaining_area {
                debug!(
                    crop = %protected.crop_id,
                    reserved_water,
                    quota = constraint.water_quota,
                    "mandatory reservation exceeds budget"
                );
                return Ok(AllocationResult::infeasible());
            }

            remaining_water -= reserved_water;
            remaining_area -= protected.min_area_ha;
            allocations.push(CropAllocation {
                crop_id: rec.crop_id.clone(),
                area_ha: protected.min_area_ha,
                water_used: reserved_water,
                expected_profit: rec.profit_per_ha * protected.min_area_ha,
            });
        }
    }

    // Step 3: greedy walk in rank order. The protected crop may compete for
    // additional area beyond its reservation if it passes the filters.
    let candidates: Vec<&Recommendation> = ranked.iter().filter(|r| allowed(r)).collect();
    let excluded = ranked.len() - candidates.len();
    if excluded > 0 {
        debug!(excluded, "candidates filtered out by risk band or allow-list");
    }

    for (i, rec) in candidates.iter().enumerate() {
        if remaining_water <= 0.0 || remaining_area <= 0.0 {
            // Quota or land exhausted with candidates still unvisited
            truncated = true;
            break;
        }

        let cap = area_cap(policy, remaining_area, candidates.len() - i);
        let water_limited_area = remaining_water / rec.water_requirement_mm;
        let area = cap.min(water_limited_area);
        if area <= 0.0 {
            truncated = true;
            continue;
        }
        if area < cap {
            truncated = true;
        }

        // min() guards the quota invariant against float round-off when the
        // area itself was derived from the remaining budget
        let water_used = (rec.water_requirement_mm * area).min(remaining_water);
        remaining_area -= area;
        remaining_water -= water_used;

        // Merge with an existing reservation entry for the same crop
        if let Some(existing) = allocations.iter_mut().find(|a| a.crop_id == rec.crop_id) {
            existing.area_ha += area;
            existing.water_used += water_used;
            existing.expected_profit += rec.profit_per_ha * area;
        } else {
            allocations.push(CropAllocation {
                crop_id: rec.crop_id.clone(),
                area_ha: area,
                water_used,
                expected_profit: rec.profit_per_ha * area,
            });
        }
    }

    // Step 5: status. Only quota-driven truncation downgrades Optimal to
    // Feasible; step-1 filtering (risk band, allow-list) narrows the
    // candidate set before the walk and does not count against it. An empty
    // walk over an empty candidate set is vacuously optimal.
    let status = if truncated {
        AllocationStatus::Feasible
    } else {
        AllocationStatus::Optimal
    };

    let total_profit = allocations.iter().map(|a| a.expected_profit).sum();
    let total_area: f64 = allocations.iter().map(|a| a.area_ha).sum();
    let total_water: f64 = allocations.iter().map(|a| a.water_used).sum();

    Ok(AllocationResult {
        status,
        total_profit,
        total_area_ha: total_area,
        total_water_used: total_water,
        allocations,
    })
}
