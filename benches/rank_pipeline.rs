//! Benchmark the full recommendation pipeline on the reference catalog.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use crop_advisor_rust::advisor::RecommendationRequest;
use crop_advisor_rust::context::{
    EnvironmentContext, FieldContext, MarketParams, SeasonWeather, SoilAttributes,
};
use crop_advisor_rust::{CropAdvisor, CropCatalog, EngineConfig};

fn request() -> RecommendationRequest {
    RecommendationRequest {
        field: FieldContext {
            area_ha: 30.0,
            soil: SoilAttributes {
                soil_type: "loam".to_string(),
                ph: 6.6,
                ec_ds_m: 0.6,
            },
            soil_suitability: 0.71,
            water_availability_mm: 600.0,
            location: "bench plot".to_string(),
            elevation_m: 90.0,
        },
        environment: EnvironmentContext {
            weather: SeasonWeather {
                mean_temperature_c: 24.0,
                total_rainfall_mm: 500.0,
                solar_radiation_mj_m2: 18.0,
                evapotranspiration_mm: 520.0,
                relative_humidity_pct: 60.0,
            },
            market: MarketParams::default(),
        },
        crop_ids: None,
        historical_yield_avg: None,
        score_weights: None,
    }
}

fn bench_generate_recommendations(c: &mut Criterion) {
    let advisor =
        CropAdvisor::with_baseline_models(CropCatalog::reference(), EngineConfig::default())
            .expect("advisor init");
    let req = request();

    c.bench_function("generate_recommendations_8_crops", |b| {
        b.iter(|| {
            let response = advisor
                .generate_recommendations(black_box(&req))
                .expect("pipeline");
            black_box(response.recommendations.len())
        })
    });
}

criterion_group!(benches, bench_generate_recommendations);
criterion_main!(benches);
