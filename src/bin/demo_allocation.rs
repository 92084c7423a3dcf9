//! Allocation demo: one ranked list, three constraint scenarios
//!
//! Shows the greedy allocator's status reporting as the water quota
//! tightens and a protected-crop minimum comes into play.

use crop_advisor_rust::advisor::RecommendationRequest;
use crop_advisor_rust::allocation::{AllocationConstraint, ProtectedMinimum};
use crop_advisor_rust::context::{
    EnvironmentContext, FieldContext, MarketParams, SeasonWeather, SoilAttributes,
};
use crop_advisor_rust::{CropAdvisor, CropCatalog, EngineConfig, RiskBand};

fn main() {
    let advisor = CropAdvisor::with_baseline_models(CropCatalog::reference(), EngineConfig::default())
        .expect("Failed to initialize advisor");

    let request = RecommendationRequest {
        field: FieldContext {
            area_ha: 40.0,
            soil: SoilAttributes {
                soil_type: "clay".to_string(),
                ph: 6.1,
                ec_ds_m: 0.9,
            },
            soil_suitability: 0.74,
            water_availability_mm: 700.0,
            location: "river block".to_string(),
            elevation_m: 35.0,
        },
        environment: EnvironmentContext {
            weather: SeasonWeather {
                mean_temperature_c: 25.0,
                total_rainfall_mm: 610.0,
                solar_radiation_mj_m2: 17.5,
                evapotranspiration_mm: 520.0,
                relative_humidity_pct: 68.0,
            },
            market: MarketParams::default(),
        },
        crop_ids: None,
        historical_yield_avg: None,
        score_weights: None,
    };

    let response = advisor
        .generate_recommendations(&request)
        .expect("Recommendation request failed");
    println!(
        "Ranked {} crops for {}",
        response.recommendations.len(),
        response.input_summary.location
    );

    let scenarios = vec![
        (
            "Generous quota",
            AllocationConstraint {
                water_quota: 30_000.0,
                protected: None,
                max_risk: RiskBand::High,
                allow_list: None,
            },
        ),
        (
            "Tight quota, medium risk cap",
            AllocationConstraint {
                water_quota: 9_000.0,
                protected: None,
                max_risk: RiskBand::Medium,
                allow_list: None,
            },
        ),
        (
            "Protected rice minimum",
            AllocationConstraint {
                water_quota: 12_000.0,
                protected: Some(ProtectedMinimum {
                    crop_id: "rice".to_string(),
                    min_area_ha: 6.0,
                }),
                max_risk: RiskBand::Medium,
                allow_list: None,
            },
        ),
    ];

    for (label, constraint) in scenarios {
        println!("\n{}", "=".repeat(70));
        println!(
            "{} (quota {:.0}, max risk {})",
            label,
            constraint.water_quota,
            constraint.max_risk.as_str()
        );
        println!("{}", "=".repeat(70));

        let result = advisor
            .run_allocation(&response.recommendations, request.field.area_ha, &constraint)
            .expect("Allocation failed");

        println!("Status:      {}", result.status.as_str());
        println!("Total area:  {:.2} ha", result.total_area_ha);
        println!("Total water: {:.0}", result.total_water_used);
        println!("Total profit: {:.0}", result.total_profit);
        for allocation in &result.allocations {
            println!(
                "  {:<12} {:>6.2} ha  water {:>8.0}  profit {:>9.0}",
                allocation.crop_id, allocation.area_ha, allocation.water_used, allocation.expected_profit
            );
        }
        if result.allocations.is_empty() {
            println!("  (no allocations)");
        }
    }
}
