//! # warden-core
//!
//! Core types, events, and primitives for the Warden governance engine.
//! This crate defines the shared vocabulary used by every other crate in the workspace:
//! proposed actions, risk assessments, boundary results, and routing decisions.

pub mod action;
pub mod boundary;
pub mod decision;
pub mod error;
pub mod event;
pub mod risk;

pub use action::{Action, ActionMetadata, Category, Urgency};
pub use boundary::{BoundaryCheckResult, DailyUsage, Violation, ViolationKind};
pub use decision::{Decision, DecisionOutcome};
pub use error::{Result, WardenError};
pub use event::{Event, EventBus, EventKind};
pub use risk::{RiskAssessment, RiskFactor, RiskLevel, RiskThresholds, round_score};
