//! # warden-governance
//!
//! The governance engine. Classifies proposed actions and pipelines by risk,
//! enforces operational boundaries against daily usage, and routes each action
//! to auto-execute, approval, escalation, or rejection according to the
//! configured autonomy level (L1-L4). A six-perspective evaluator produces an
//! advisory consensus alongside.

pub mod boundary;
pub mod clock;
pub mod hats;
pub mod level;
pub mod pipeline;
pub mod risk;
pub mod router;
pub mod store;

pub use boundary::BoundaryChecker;
pub use clock::{Clock, FixedClock, SystemClock, day_key};
pub use hats::{Consensus, Hat, HatPerspective, HatVerdict, SixHatsEvaluator, SixHatsResult};
pub use level::{AutonomyLevel, is_scheduled_trade};
pub use pipeline::{
    EstimatedImpact, ImpactMagnitude, Pipeline, PipelineFactors, PipelineRiskAssessment,
    PipelineRiskClassifier, PipelineStep, ReversibilityClass, StepRisk, Visibility,
};
pub use risk::RiskClassifier;
pub use router::DecisionRouter;
pub use store::{MemoryUsageStore, UsageStore};
