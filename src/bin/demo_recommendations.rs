//! End-to-end recommendation demo over the reference catalog
//!
//! Builds an advisor on the baseline models, runs one request for a
//! semi-arid field, and prints the ranked list with timings.

use crop_advisor_rust::advisor::RecommendationRequest;
use crop_advisor_rust::context::{
    EnvironmentContext, FieldContext, MarketParams, SeasonWeather, SoilAttributes,
};
use crop_advisor_rust::{CropAdvisor, CropCatalog, EngineConfig};
use std::time::Instant;

fn main() {
    println!("Initializing Crop Advisor (Rust)...\n");
    let init_start = Instant::now();
    let advisor = CropAdvisor::with_baseline_models(CropCatalog::reference(), EngineConfig::default())
        .expect("Failed to initialize advisor");
    let init_time = init_start.elapsed();

    let request = RecommendationRequest {
        field: FieldContext {
            area_ha: 25.0,
            soil: SoilAttributes {
                soil_type: "sandy loam".to_string(),
                ph: 6.8,
                ec_ds_m: 1.1,
            },
            soil_suitability: 0.68,
            water_availability_mm: 540.0,
            location: "north terrace".to_string(),
            elevation_m: 220.0,
        },
        environment: EnvironmentContext {
            weather: SeasonWeather {
                mean_temperature_c: 23.0,
                total_rainfall_mm: 410.0,
                solar_radiation_mj_m2: 19.0,
                evapotranspiration_mm: 560.0,
                relative_humidity_pct: 55.0,
            },
            market: MarketParams {
                price_factor: 1.05,
                price_volatility: 0.18,
                demand_level: Default::default(),
            },
        },
        crop_ids: None,
        historical_yield_avg: None,
        score_weights: None,
    };

    let response = advisor
        .generate_recommendations(&request)
        .expect("Recommendation request failed");

    println!("{}", "=".repeat(70));
    println!(
        "RECOMMENDATIONS: {} ({:.1} ha, {:.0} mm water)",
        response.input_summary.location,
        response.input_summary.area_ha,
        response.input_summary.water_availability_mm
    );
    println!("{}", "=".repeat(70));

    for rec in &response.recommendations {
        println!(
            "\n#{} {:<12} combined {:.3} | suitability {:.3} | profit {:>8.0}/ha | {} risk",
            rec.rank,
            rec.crop_id,
            rec.combined_score,
            rec.suitability_score,
            rec.profit_per_ha,
            rec.risk_band.as_str()
        );
        println!("   {}", rec.rationale);
        for factor in &rec.risk_factors {
            println!("   - {}", factor);
        }
    }

    println!("\n{}", "-".repeat(70));
    println!(
        "Scored {}/{} candidates ({} dropped)",
        response.input_summary.scored_count,
        response.input_summary.candidate_count,
        response.input_summary.dropped.len()
    );
    println!("Average suitability: {:.3}", response.average_suitability);
    println!("Best profit/ha:      {:.0}", response.best_profit_per_ha);
    println!("Init:                {:?}", init_time);
    println!("Pipeline:            {} ms", response.processing_time_ms);
}
