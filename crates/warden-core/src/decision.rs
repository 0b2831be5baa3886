use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::action::Action;
use crate::boundary::BoundaryCheckResult;
use crate::risk::{RiskAssessment, RiskLevel};

/// Terminal routing verdict for an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionOutcome {
    AutoExecute,
    QueueApproval,
    Escalate,
    Reject,
}

impl DecisionOutcome {
    /// Baseline outcome for a risk level with no autonomy-specific carve-outs:
    /// safe/low run, medium/high wait for approval, critical goes to a human now.
    pub fn for_risk_level(level: RiskLevel) -> Self {
        match level {
            RiskLevel::Safe | RiskLevel::Low => Self::AutoExecute,
            RiskLevel::Medium | RiskLevel::High => Self::QueueApproval,
            RiskLevel::Critical => Self::Escalate,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AutoExecute => "auto_execute",
            Self::QueueApproval => "queue_approval",
            Self::Escalate => "escalate",
            Self::Reject => "reject",
        }
    }
}

impl fmt::Display for DecisionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The auditable governance record for one routed action. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub id: Uuid,
    pub action: Action,
    pub assessment: RiskAssessment,
    pub boundary_check: BoundaryCheckResult,
    pub outcome: DecisionOutcome,
    pub reason: String,
    /// Copied from the action's reversibility metadata.
    pub rollback_available: bool,
    /// Autonomy level (1-4) in force when the decision was made.
    pub autonomy_level: u8,
    pub created_at: DateTime<Utc>,
}
