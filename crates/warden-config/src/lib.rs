//! # warden-config
//!
//! Configuration system for the Warden engine. Reads from `warden.toml` and
//! environment variables, in that precedence order, then validates the result.

pub mod boundaries;
pub mod loader;
pub mod schema;

pub use boundaries::{
    Boundaries, ContentBoundaries, DevelopmentBoundaries, FinancialBoundaries, TimeBoundaries,
    TradingBoundaries,
};
pub use loader::ConfigLoader;
pub use schema::{
    AutonomyConfig, CategoryBaselines, ConfigWarning, EventsConfig, LoggingConfig, PipelineConfig,
    RiskConfig, RiskWeights, WardenConfig, WarningSeverity,
};
