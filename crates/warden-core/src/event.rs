use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::action::Action;
use crate::boundary::Violation;
use crate::decision::{Decision, DecisionOutcome};

/// Events published by the decision router. External collaborators (approval
/// queue, audit store, notifier) integrate by subscribing to these.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Event {
    DecisionMade {
        decision: Decision,
    },
    DecisionAutoExecuted {
        decision: Decision,
    },
    DecisionQueued {
        decision: Decision,
    },
    DecisionEscalated {
        decision: Decision,
    },
    DecisionRejected {
        decision: Decision,
    },
    BoundaryViolation {
        decision: Decision,
        action: Action,
        violations: Vec<Violation>,
    },
}

/// Fixed set of event kinds, for filtering without matching on payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    DecisionMade,
    DecisionAutoExecuted,
    DecisionQueued,
    DecisionEscalated,
    DecisionRejected,
    BoundaryViolation,
}

impl EventKind {
    /// The outcome-specific event kind for a decision.
    pub fn for_outcome(outcome: DecisionOutcome) -> Self {
        match outcome {
            DecisionOutcome::AutoExecute => Self::DecisionAutoExecuted,
            DecisionOutcome::QueueApproval => Self::DecisionQueued,
            DecisionOutcome::Escalate => Self::DecisionEscalated,
            DecisionOutcome::Reject => Self::DecisionRejected,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DecisionMade => "decision_made",
            Self::DecisionAutoExecuted => "decision_auto_executed",
            Self::DecisionQueued => "decision_queued",
            Self::DecisionEscalated => "decision_escalated",
            Self::DecisionRejected => "decision_rejected",
            Self::BoundaryViolation => "boundary_violation",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Event {
    /// Build the outcome-specific event for a decision.
    pub fn for_outcome(decision: Decision) -> Self {
        match decision.outcome {
            DecisionOutcome::AutoExecute => Self::DecisionAutoExecuted { decision },
            DecisionOutcome::QueueApproval => Self::DecisionQueued { decision },
            DecisionOutcome::Escalate => Self::DecisionEscalated { decision },
            DecisionOutcome::Reject => Self::DecisionRejected { decision },
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            Self::DecisionMade { .. } => EventKind::DecisionMade,
            Self::DecisionAutoExecuted { .. } => EventKind::DecisionAutoExecuted,
            Self::DecisionQueued { .. } => EventKind::DecisionQueued,
            Self::DecisionEscalated { .. } => EventKind::DecisionEscalated,
            Self::DecisionRejected { .. } => EventKind::DecisionRejected,
            Self::BoundaryViolation { .. } => EventKind::BoundaryViolation,
        }
    }

    pub fn decision(&self) -> &Decision {
        match self {
            Self::DecisionMade { decision }
            | Self::DecisionAutoExecuted { decision }
            | Self::DecisionQueued { decision }
            | Self::DecisionEscalated { decision }
            | Self::DecisionRejected { decision }
            | Self::BoundaryViolation { decision, .. } => decision,
        }
    }
}

/// A broadcast-based event bus for decision events.
#[derive(Clone)]
pub struct EventBus {
    sender: Arc<broadcast::Sender<Event>>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn publish(&self, event: Event) {
        // Ignore send errors (no subscribers).
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}
