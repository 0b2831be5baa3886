use serde::{Deserialize, Serialize};
use std::fmt;

use warden_core::{Action, Category, DecisionOutcome, RiskLevel, WardenError};

/// Four autonomy levels governing how much risk runs without a human:
///
/// - **L1 (Manual)**: every action is queued for approval.
/// - **L2 (Bounded)**: safe/low actions run, with category carve-outs for trading.
/// - **L3 (Supervised)**: everything up to medium runs; high is queued.
/// - **L4 (Full)**: everything short of critical runs.
///
/// Critical risk is escalated at every level above L1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum AutonomyLevel {
    Manual = 1,
    Bounded = 2,
    Supervised = 3,
    Full = 4,
}

impl AutonomyLevel {
    pub const ALL: [AutonomyLevel; 4] = [Self::Manual, Self::Bounded, Self::Supervised, Self::Full];

    pub fn from_u8(v: u8) -> Self {
        match v {
            1 => Self::Manual,
            2 => Self::Bounded,
            3 => Self::Supervised,
            4 => Self::Full,
            _ => Self::Manual, // safe default
        }
    }

    pub fn as_u8(&self) -> u8 {
        *self as u8
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Manual => "Every action requires approval",
            Self::Bounded => "Safe and low-risk actions run; unscheduled trades need approval",
            Self::Supervised => "Actions up to medium risk run; high risk needs approval",
            Self::Full => "Everything short of critical risk runs",
        }
    }

    /// The level-specific policy table. Only consulted once boundary checks pass.
    pub fn outcome_for(&self, action: &Action, risk: RiskLevel) -> (DecisionOutcome, String) {
        use DecisionOutcome::*;
        match self {
            Self::Manual => (QueueApproval, format!("{} requires approval for every action", self)),
            Self::Bounded => match risk {
                RiskLevel::Safe | RiskLevel::Low => match action.category {
                    Category::Trading if !is_scheduled_trade(action) => (
                        QueueApproval,
                        format!("{} risk trade '{}' is not a scheduled/DCA order", risk, action.action_type),
                    ),
                    category => (AutoExecute, format!("{} risk {} action within bounded autonomy", risk, category)),
                },
                RiskLevel::Medium | RiskLevel::High => {
                    (QueueApproval, format!("{} risk requires approval at {}", risk, self))
                }
                RiskLevel::Critical => (Escalate, "critical risk requires human escalation".into()),
            },
            Self::Supervised => match risk {
                RiskLevel::Safe | RiskLevel::Low | RiskLevel::Medium => {
                    (AutoExecute, format!("{} risk within supervised autonomy", risk))
                }
                RiskLevel::High => (QueueApproval, format!("high risk requires approval at {}", self)),
                RiskLevel::Critical => (Escalate, "critical risk requires human escalation".into()),
            },
            Self::Full => match risk {
                RiskLevel::Critical => (Escalate, "critical risk requires human escalation".into()),
                _ => (AutoExecute, format!("{} risk within full autonomy", risk)),
            },
        }
    }
}

/// Scheduled or DCA trades are pre-approved patterns at bounded autonomy.
pub fn is_scheduled_trade(action: &Action) -> bool {
    let t = action.action_type.to_lowercase();
    t.contains("dca") || t.contains("scheduled")
}

impl TryFrom<u8> for AutonomyLevel {
    type Error = WardenError;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            1..=4 => Ok(Self::from_u8(v)),
            _ => Err(WardenError::InvalidAutonomyLevel(v)),
        }
    }
}

impl fmt::Display for AutonomyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{} ({})", *self as u8, match self {
            Self::Manual => "Manual",
            Self::Bounded => "Bounded",
            Self::Supervised => "Supervised",
            Self::Full => "Full",
        })
    }
}
