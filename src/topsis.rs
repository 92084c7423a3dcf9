//! Suitability Scorer (TOPSIS)
//!
//! Ranks candidate crops by similarity to an ideal solution. Classical
//! six-step TOPSIS over the criteria matrix:
//!
//! 1. Vector-normalize each column: `r_ij = x_ij / sqrt(sum_i x_ij^2)`
//! 2. Apply criterion weights: `v_ij = w_j * r_ij`
//! 3. Per column, take ideal/anti-ideal (max/min for benefit, min/max for cost)
//! 4. Euclidean distance of each row to ideal (D+) and anti-ideal (D-)
//! 5. Closeness coefficient `C_i = D- / (D+ + D-)`, in [0, 1]
//! 6. Sort by closeness descending
//!
//! Deterministic and side-effect free. An all-zero column normalizes to
//! zeros; a degenerate case where D+ = D- = 0 yields closeness 0. Neither is
//! an error.

use crate::criteria::{CriteriaVector, Polarity};
use crate::error::{validate_weight_sum, EngineError};
use serde::{Deserialize, Serialize};

/// Suitability of one crop: the closeness coefficient plus the reference
/// distances kept for explainability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuitabilityResult {
    pub crop_id: String,

    /// TOPSIS closeness coefficient in [0, 1]; higher is more suitable
    pub closeness: f64,

    /// Euclidean distance to the ideal reference point (D+)
    pub ideal_distance: f64,

    /// Euclidean distance to the anti-ideal reference point (D-)
    pub anti_ideal_distance: f64,
}

/// Score the criteria matrix.
///
/// `weights` must sum to 1.0 within tolerance (`InvalidWeights` otherwise)
/// and `weights`/`polarities` must match the matrix column count. Rows of
/// inconsistent width are an `InvalidInput` error.
///
/// Results are sorted by closeness descending, ties broken by crop id
/// ascending so repeated calls produce identical orderings.
pub fn score(
    matrix: &[CriteriaVector],
    weights: &[f64],
    polarities: &[Polarity],
) -> Result<Vec<SuitabilityResult>, EngineError> {
    if matrix.is_empty() {
        return Err(EngineError::InvalidInput(
            "criteria matrix is empty".to_string(),
        ));
    }

    let n_criteria = matrix[0].values.len();
    if n_criteria == 0 {
        return Err(EngineError::InvalidInput(
            "criteria matrix has no columns".to_string(),
        ));
    }
    for row in matrix {
        if row.values.len() != n_criteria {
            return Err(EngineError::InvalidInput(format!(
                "criteria row for '{}' has {} values, expected {}",
                row.crop_id,
                row.values.len(),
                n_criteria
            )));
        }
    }
    if weights.len() != n_criteria || polarities.len() != n_criteria {
        return Err(EngineError::InvalidInput(format!(
            "expected {} weights and polarities, got {} and {}",
            n_criteria,
            weights.len(),
            polarities.len()
        )));
    }
    validate_weight_sum(weights)?;

    // Step 1-2: vector normalization, then weighting
    let mut weighted = vec![vec![0.0_f64; n_criteria]; matrix.len()];
    for j in 0..n_criteria {
        let norm: f64 = matrix
            .iter()
            .map(|row| row.values[j] * row.values[j])
            .sum::<f64>()
            .sqrt();

        for (i, row) in matrix.iter().enumerate() {
            // All-zero column: every normalized value is defined as 0
            let r = if norm > 0.0 { row.values[j] / norm } else { 0.0 };
            weighted[i][j] = weights[j] * r;
        }
    }

    // Step 3: ideal / anti-ideal per column
    let mut ideal = vec![0.0_f64; n_criteria];
    let mut anti_ideal = vec![0.0_f64; n_criteria];
    for j in 0..n_criteria {
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for row in &weighted {
            lo = lo.min(row[j]);
            hi = hi.max(row[j]);
        }
        match polarities[j] {
            Polarity::Benefit => {
                ideal[j] = hi;
                anti_ideal[j] = lo;
            }
            Polarity::Cost => {
                ideal[j] = lo;
                anti_ideal[j] = hi;
            }
        }
    }

    // Step 4-5: distances and closeness
    let mut results: Vec<SuitabilityResult> = matrix
        .iter()
        .zip(&weighted)
        .map(|(row, v)| {
            let d_plus = euclidean(v, &ideal);
            let d_minus = euclidean(v, &anti_ideal);
            let denom = d_plus + d_minus;
            // Degenerate single-candidate case: both distances 0
            let closeness = if denom > 0.0 { d_minus / denom } else { 0.0 };

            SuitabilityResult {
                crop_id: row.crop_id.clone(),
                closeness,
                ideal_distance: d_plus,
                anti_ideal_distance: d_minus,
            }
        })
        .collect();

    // Step 6: closeness descending, crop id breaks ties
    results.sort_by(|a, b| {
        b.closeness
            .partial_cmp(&a.closeness)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.crop_id.cmp(&b.crop_id))
    });

    Ok(results)
}

fn euclidean(row: &[f64], reference: &[f64]) -> f64 {
    row.iter()
        .zip(reference)
        .map(|(v, r)| (v - r) * (v - r))
        .sum::<f64>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::CriteriaValues;
    use approx::assert_relative_eq;

    fn matrix_from(rows: &[(&str, &[f64])]) -> Vec<CriteriaVector> {
        rows.iter()
            .map(|(id, values)| CriteriaVector {
                crop_id: (*id).to_string(),
                values: CriteriaValues::from_slice(values),
            })
            .collect()
    }

    #[test]
    fn test_three_crop_benefit_ranking() {
        // Crop 1 dominates on every benefit column, crop 3 is dominated
        let matrix = matrix_from(&[
            ("crop1", &[0.8, 0.9, 0.7]),
            ("crop2", &[0.5, 0.5, 0.5]),
            ("crop3", &[0.2, 0.1, 0.3]),
        ]);
        let weights = [1.0 / 3.0; 3];
        let polarities = [Polarity::Benefit; 3];

        let results = score(&matrix, &weights, &polarities).unwrap();

        assert_eq!(results[0].crop_id, "crop1");
        assert_eq!(results[1].crop_id, "crop2");
        assert_eq!(results[2].crop_id, "crop3");
        assert!(results[0].closeness > results[1].closeness);
        assert!(results[1].closeness > results[2].closeness);

        // Dominating row sits exactly on the ideal point
        assert_relative_eq!(results[0].ideal_distance, 0.0, epsilon = 1e-12);
        assert_relative_eq!(results[0].closeness, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_closeness_bounds() {
        let matrix = matrix_from(&[
            ("a", &[3.0, 120.0, 0.4, 9.0]),
            ("b", &[1.0, 80.0, 0.9, 2.0]),
            ("c", &[2.0, 200.0, 0.1, 5.0]),
            ("d", &[0.5, 150.0, 0.6, 7.0]),
        ]);
        let weights = [0.25; 4];
        let polarities = [
            Polarity::Benefit,
            Polarity::Cost,
            Polarity::Benefit,
            Polarity::Cost,
        ];

        for result in score(&matrix, &weights, &polarities).unwrap() {
            assert!(result.closeness >= 0.0 && result.closeness <= 1.0);
            assert!(result.ideal_distance >= 0.0);
            assert!(result.anti_ideal_distance >= 0.0);
        }
    }

    #[test]
    fn test_cost_polarity_prefers_lower() {
        let matrix = matrix_from(&[("cheap", &[1.0]), ("dear", &[10.0])]);
        let results = score(&matrix, &[1.0], &[Polarity::Cost]).unwrap();

        assert_eq!(results[0].crop_id, "cheap");
        assert_relative_eq!(results[0].closeness, 1.0, epsilon = 1e-12);
        assert_relative_eq!(results[1].closeness, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_all_zero_column_not_an_error() {
        let matrix = matrix_from(&[("a", &[0.0, 2.0]), ("b", &[0.0, 1.0])]);
        let results = score(&matrix, &[0.5, 0.5], &[Polarity::Benefit; 2]).unwrap();

        assert_eq!(results[0].crop_id, "a");
        for result in &results {
            assert!(result.closeness.is_finite());
        }
    }

    #[test]
    fn test_single_candidate_degenerate_closeness_zero() {
        let matrix = matrix_from(&[("only", &[0.7, 0.3])]);
        let results = score(&matrix, &[0.5, 0.5], &[Polarity::Benefit; 2]).unwrap();

        assert_eq!(results.len(), 1);
        assert_relative_eq!(results[0].closeness, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_weights_not_summing_to_one_rejected() {
        let matrix = matrix_from(&[("a", &[1.0, 2.0]), ("b", &[2.0, 1.0])]);
        let result = score(&matrix, &[0.4, 0.5], &[Polarity::Benefit; 2]);
        assert!(matches!(result, Err(EngineError::InvalidWeights { .. })));
    }

    #[test]
    fn test_ragged_matrix_rejected() {
        let matrix = matrix_from(&[("a", &[1.0, 2.0]), ("b", &[2.0])]);
        let result = score(&matrix, &[0.5, 0.5], &[Polarity::Benefit; 2]);
        assert!(matches!(result, Err(EngineError::InvalidInput(_))));
    }

    #[test]
    fn test_tie_broken_by_crop_id() {
        // Identical rows score identically; order must fall back to the id
        let matrix = matrix_from(&[
            ("zeta", &[1.0, 1.0]),
            ("alpha", &[1.0, 1.0]),
        ]);
        let results = score(&matrix, &[0.5, 0.5], &[Polarity::Benefit; 2]).unwrap();

        assert_eq!(results[0].crop_id, "alpha");
        assert_eq!(results[1].crop_id, "zeta");
        assert_relative_eq!(results[0].closeness, results[1].closeness, epsilon = 1e-12);
    }
}
