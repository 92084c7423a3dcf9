//! Profitability Estimator
//!
//! Combines yield and price predictions into per-hectare revenue, cost,
//! profit and ROI. Costs come from the crop's static baseline adjusted by a
//! market volatility surcharge (volatile input markets raise hedging and
//! input costs).
//!
//! When the yield prediction is absent the estimator falls back to the
//! request's historical average, then to the crop's typical-range midpoint;
//! it never fails a request over a missing yield.

use crate::catalog::Crop;
use crate::context::MarketParams;
use crate::predict::{PricePrediction, YieldPrediction};
use serde::{Deserialize, Serialize};

/// Share of the baseline cost added per unit of price volatility.
const COST_VOLATILITY_LOAD: f64 = 0.5;

/// Where the yield figure used for revenue came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YieldSource {
    /// External yield model output
    Predicted,
    /// Caller-supplied historical average for the field
    HistoricalAverage,
    /// Midpoint of the crop's typical yield range
    TypicalRange,
}

/// Per-hectare economics for one crop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfitResult {
    pub crop_id: String,

    /// Yield used for revenue (t/ha)
    pub yield_t_per_ha: f64,
    pub yield_source: YieldSource,

    /// Farm-gate price used for revenue (per kg)
    pub price_per_kg: f64,

    /// Revenue per hectare: yield (t) * 1000 * price (per kg)
    pub gross_revenue: f64,

    /// Baseline cost with volatility surcharge, per hectare
    pub cost: f64,

    /// gross_revenue - cost
    pub profit: f64,

    /// profit / cost
    pub roi: f64,
}

/// Adjusted production cost per hectare.
fn adjusted_cost(crop: &Crop, market: &MarketParams) -> f64 {
    crop.baseline_cost_per_ha * (1.0 + COST_VOLATILITY_LOAD * market.price_volatility)
}

/// Estimate per-hectare economics for `crop`.
///
/// `yield_prediction` of `None` means "yield unknown": the fallback chain is
/// `historical_yield_avg` (if supplied), then the crop's typical-range
/// midpoint.
pub fn estimate(
    crop: &Crop,
    market: &MarketParams,
    yield_prediction: Option<YieldPrediction>,
    price_prediction: &PricePrediction,
    historical_yield_avg: Option<f64>,
) -> ProfitResult {
    let (yield_t_per_ha, yield_source) = match yield_prediction {
        Some(p) => (p.yield_t_per_ha, YieldSource::Predicted),
        None => match historical_yield_avg {
            Some(avg) => (avg, YieldSource::HistoricalAverage),
            None => (crop.historical_yield_avg(), YieldSource::TypicalRange),
        },
    };

    let gross_revenue = yield_t_per_ha * 1000.0 * price_prediction.price_per_kg;
    let cost = adjusted_cost(crop, market);
    let profit = gross_revenue - cost;
    let roi = profit / cost;

    ProfitResult {
        crop_id: crop.id.clone(),
        yield_t_per_ha,
        yield_source,
        price_per_kg: price_prediction.price_per_kg,
        gross_revenue,
        cost,
        profit,
        roi,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CropCatalog;
    use approx::assert_relative_eq;

    fn price(p: f64) -> PricePrediction {
        PricePrediction { price_per_kg: p, confidence: 0.6 }
    }

    #[test]
    fn test_revenue_formula() {
        let catalog = CropCatalog::reference();
        let maize = catalog.get("maize").unwrap();
        let market = MarketParams { price_volatility: 0.0, ..Default::default() };

        let result = estimate(
            maize,
            &market,
            Some(YieldPrediction { yield_t_per_ha: 6.0, confidence: 0.8 }),
            &price(0.2),
            None,
        );

        // 6 t/ha * 1000 kg/t * 0.2/kg = 1200
        assert_relative_eq!(result.gross_revenue, 1200.0, epsilon = 1e-9);
        assert_relative_eq!(result.cost, maize.baseline_cost_per_ha, epsilon = 1e-9);
        assert_relative_eq!(result.profit, 1200.0 - maize.baseline_cost_per_ha, epsilon = 1e-9);
        assert_relative_eq!(
            result.roi,
            result.profit / maize.baseline_cost_per_ha,
            epsilon = 1e-12
        );
        assert_eq!(result.yield_source, YieldSource::Predicted);
    }

    #[test]
    fn test_volatility_surcharge_raises_cost() {
        let catalog = CropCatalog::reference();
        let wheat = catalog.get("wheat").unwrap();

        let calm = MarketParams { price_volatility: 0.0, ..Default::default() };
        let rough = MarketParams { price_volatility: 0.4, ..Default::default() };

        let a = estimate(wheat, &calm, None, &price(0.25), None);
        let b = estimate(wheat, &rough, None, &price(0.25), None);

        assert_relative_eq!(b.cost, a.cost * 1.2, epsilon = 1e-9);
        assert!(b.profit < a.profit);
    }

    #[test]
    fn test_yield_fallback_chain() {
        let catalog = CropCatalog::reference();
        let soybean = catalog.get("soybean").unwrap();
        let market = MarketParams::default();

        // Prediction wins when present
        let predicted = estimate(
            soybean,
            &market,
            Some(YieldPrediction { yield_t_per_ha: 3.0, confidence: 0.9 }),
            &price(0.5),
            Some(2.0),
        );
        assert_eq!(predicted.yield_source, YieldSource::Predicted);
        assert_relative_eq!(predicted.yield_t_per_ha, 3.0, epsilon = 1e-12);

        // Historical average next
        let historical = estimate(soybean, &market, None, &price(0.5), Some(2.0));
        assert_eq!(historical.yield_source, YieldSource::HistoricalAverage);
        assert_relative_eq!(historical.yield_t_per_ha, 2.0, epsilon = 1e-12);

        // Typical-range midpoint last
        let typical = estimate(soybean, &market, None, &price(0.5), None);
        assert_eq!(typical.yield_source, YieldSource::TypicalRange);
        assert_relative_eq!(
            typical.yield_t_per_ha,
            soybean.historical_yield_avg(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_negative_profit_possible() {
        let catalog = CropCatalog::reference();
        let tomato = catalog.get("tomato").unwrap(); // high baseline cost
        let market = MarketParams::default();

        let result = estimate(
            tomato,
            &market,
            Some(YieldPrediction { yield_t_per_ha: 1.0, confidence: 0.5 }),
            &price(0.1),
            None,
        );
        assert!(result.profit < 0.0);
        assert!(result.roi < 0.0);
    }
}
