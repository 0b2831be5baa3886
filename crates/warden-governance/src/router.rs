use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{info, warn};
use uuid::Uuid;

use warden_config::WardenConfig;
use warden_core::{
    Action, BoundaryCheckResult, Decision, DecisionOutcome, Event, EventBus, Result, RiskAssessment,
    ViolationKind,
};

use crate::boundary::BoundaryChecker;
use crate::clock::{Clock, SystemClock};
use crate::hats::{SixHatsEvaluator, SixHatsResult};
use crate::level::AutonomyLevel;
use crate::risk::RiskClassifier;
use crate::store::MemoryUsageStore;

/// Orchestrates classification, boundary checks and the autonomy policy into
/// one [`Decision`] per action, and publishes the result on the event bus.
///
/// Routing is advisory: the router never records usage on its own. The
/// executor calls [`DecisionRouter::record_execution`] once the action has
/// actually run.
pub struct DecisionRouter {
    classifier: RiskClassifier,
    boundaries: Arc<BoundaryChecker>,
    level: RwLock<AutonomyLevel>,
    events: EventBus,
    hats: SixHatsEvaluator,
    clock: Arc<dyn Clock>,
}

impl DecisionRouter {
    pub fn new(
        classifier: RiskClassifier,
        boundaries: Arc<BoundaryChecker>,
        level: AutonomyLevel,
        events: EventBus,
    ) -> Self {
        let clock = boundaries.clock();
        Self {
            classifier,
            boundaries,
            level: RwLock::new(level),
            events,
            hats: SixHatsEvaluator::new(),
            clock,
        }
    }

    pub fn from_config(config: &WardenConfig) -> Result<Self> {
        Self::from_config_with_clock(config, Arc::new(SystemClock))
    }

    /// Build a router whose boundary checker and decision timestamps use `clock`.
    pub fn from_config_with_clock(config: &WardenConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        let level = AutonomyLevel::try_from(config.autonomy.level)?;
        let checker = BoundaryChecker::with_store(
            config.boundaries.clone(),
            Box::new(MemoryUsageStore::new()),
            clock,
        );
        Ok(Self::new(
            RiskClassifier::new(config.risk.clone()),
            Arc::new(checker),
            level,
            EventBus::new(config.events.capacity),
        ))
    }

    /// Classify, check and decide. Publishes `DecisionMade`, then the
    /// outcome-specific event, then `BoundaryViolation` if any boundary failed.
    pub fn route(&self, action: &Action) -> Decision {
        let assessment = self.classifier.classify(action);
        let check = self.boundaries.check(action, assessment.level);
        let level = self.autonomy_level();
        let (outcome, reason) = Self::determine_outcome(level, action, &assessment, &check);

        let decision = Decision {
            id: Uuid::new_v4(),
            action: action.clone(),
            assessment,
            boundary_check: check,
            outcome,
            reason,
            rollback_available: action.is_reversible(),
            autonomy_level: level.as_u8(),
            created_at: self.clock.now(),
        };

        info!(
            action_id = %action.id,
            category = %action.category,
            outcome = %decision.outcome,
            risk = %decision.assessment.level,
            score = decision.assessment.score,
            level = %level,
            "decision made"
        );

        self.events.publish(Event::DecisionMade {
            decision: decision.clone(),
        });
        self.events.publish(Event::for_outcome(decision.clone()));
        if !decision.boundary_check.passed {
            self.events.publish(Event::BoundaryViolation {
                decision: decision.clone(),
                action: action.clone(),
                violations: decision.boundary_check.violations.clone(),
            });
        }
        decision
    }

    /// Outcome precedence. Boundary violations always win over the level table:
    /// a production violation or a critical-risk violation escalates, a
    /// forbidden violation rejects, and limit or approval violations queue.
    /// Only a clean boundary check reaches the autonomy level policy.
    pub fn determine_outcome(
        level: AutonomyLevel,
        action: &Action,
        assessment: &RiskAssessment,
        check: &BoundaryCheckResult,
    ) -> (DecisionOutcome, String) {
        if check.passed {
            return level.outcome_for(action, assessment.level);
        }
        let joined = check.violation_messages().join("; ");
        if check.has_kind(ViolationKind::Production) {
            (DecisionOutcome::Escalate, format!("Production boundary: {}", joined))
        } else if check.has_kind(ViolationKind::CriticalRisk) {
            (DecisionOutcome::Escalate, format!("Critical risk: {}", joined))
        } else if check.has_kind(ViolationKind::Forbidden) {
            (DecisionOutcome::Reject, format!("Forbidden by boundaries: {}", joined))
        } else {
            (DecisionOutcome::QueueApproval, format!("Boundary limit requires approval: {}", joined))
        }
    }

    /// Record usage for an action the executor actually ran. Call exactly once per run.
    pub fn record_execution(&self, action: &Action) {
        self.boundaries.record_usage(action);
    }

    pub fn set_autonomy_level(&self, level: u8) -> Result<()> {
        let new = AutonomyLevel::try_from(level)?;
        let mut current = self.level.write();
        let previous = *current;
        if previous != new {
            if new == AutonomyLevel::Full {
                warn!(from = %previous, to = %new, "autonomy raised to full");
            } else {
                info!(from = %previous, to = %new, "autonomy level changed");
            }
        }
        *current = new;
        Ok(())
    }

    pub fn autonomy_level(&self) -> AutonomyLevel {
        *self.level.read()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn boundaries(&self) -> &Arc<BoundaryChecker> {
        &self.boundaries
    }

    pub fn classifier(&self) -> &RiskClassifier {
        &self.classifier
    }

    /// Route the action and run the six-hats evaluation on the same assessment.
    /// The hats never change the routed outcome.
    pub fn evaluate_with_hats(&self, action: &Action) -> (Decision, SixHatsResult) {
        let decision = self.route(action);
        let hats = self.hats.evaluate(action, Some(&decision.assessment));
        (decision, hats)
    }
}
