//! Crop Advisor Rust Implementation
//!
//! Suitability ranking and water-constrained allocation engine for seasonal
//! crop planning:
//!
//! - `criteria`: per-crop decision criteria from field/season inputs
//! - `topsis`: multi-criteria suitability scoring (closeness to ideal)
//! - `predict`: external yield/price model interfaces + baseline models
//! - `profit` / `risk`: per-hectare economics and rule-based risk bands
//! - `ranker`: combined suitability/profitability ranking
//! - `allocation`: greedy water-budget allocation with feasibility status
//! - `advisor`: the coordinator the caller layer talks to
//!
//! The engine is synchronous and stateless per request; the crop catalog is
//! the only shared, read-only resource.

pub mod advisor;
pub mod allocation;
pub mod catalog;
pub mod config;
pub mod context;
pub mod criteria;
pub mod error;
pub mod predict;
pub mod profit;
pub mod ranker;
pub mod risk;
pub mod topsis;

// Re-export commonly used types
pub use advisor::{CropAdvisor, RecommendationRequest, RecommendationResponse};
pub use allocation::{AllocationConstraint, AllocationResult, AllocationStatus, ProtectedMinimum};
pub use catalog::{Crop, CropCatalog, WaterSensitivity};
pub use config::{EngineConfig, ScoreWeights};
pub use context::{EnvironmentContext, FieldContext, MarketParams};
pub use error::EngineError;
pub use ranker::Recommendation;
pub use risk::RiskBand;
