use tracing::debug;

use warden_config::RiskConfig;
use warden_core::{Action, RiskAssessment, RiskFactor, Urgency};

pub const FACTOR_VALUE: &str = "estimated_value";
pub const FACTOR_REVERSIBILITY: &str = "reversibility";
pub const FACTOR_CATEGORY: &str = "category";
pub const FACTOR_URGENCY: &str = "urgency";

/// Scores a single action into a risk level from weighted factors.
///
/// Pure: the same action and configuration always yield the same assessment.
#[derive(Debug, Clone, Default)]
pub struct RiskClassifier {
    config: RiskConfig,
}

impl RiskClassifier {
    pub fn new(config: RiskConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RiskConfig {
        &self.config
    }

    pub fn classify(&self, action: &Action) -> RiskAssessment {
        let factors = vec![
            self.value_factor(action),
            self.reversibility_factor(action),
            self.category_factor(action),
            self.urgency_factor(action),
        ];
        let assessment = RiskAssessment::from_factors(factors, &self.config.thresholds);
        debug!(
            action_id = %action.id,
            score = assessment.score,
            level = %assessment.level,
            "classified action"
        );
        assessment
    }

    fn value_factor(&self, action: &Action) -> RiskFactor {
        let weight = self.config.weights.value;
        let anchor = self.config.high_value_usd;
        match action.metadata.estimated_value {
            Some(v) if v.is_finite() && v >= 0.0 => {
                let value = if anchor > 0.0 { v / anchor * 100.0 } else { 100.0 };
                RiskFactor::new(
                    FACTOR_VALUE,
                    weight,
                    value,
                    50.0,
                    format!("Estimated value ${:.2} against ${:.2} high-value anchor", v, anchor),
                )
            }
            Some(v) => RiskFactor::new(
                FACTOR_VALUE,
                weight,
                50.0,
                50.0,
                format!("Unusable estimated value {}; assuming moderate exposure", v),
            ),
            None => RiskFactor::new(
                FACTOR_VALUE,
                weight,
                50.0,
                50.0,
                "No estimated value; assuming moderate exposure",
            ),
        }
    }

    fn reversibility_factor(&self, action: &Action) -> RiskFactor {
        let (value, reason) = match action.metadata.reversible {
            Some(true) => (10.0, "Reversible: rollback available"),
            Some(false) => (90.0, "IRREVERSIBLE: no rollback available"),
            None => (60.0, "Reversibility not declared; assuming limited rollback"),
        };
        RiskFactor::new(FACTOR_REVERSIBILITY, self.config.weights.reversibility, value, 50.0, reason)
    }

    fn category_factor(&self, action: &Action) -> RiskFactor {
        let baseline = self.config.category_baselines.for_category(action.category);
        RiskFactor::new(
            FACTOR_CATEGORY,
            self.config.weights.category,
            baseline,
            50.0,
            format!("Category '{}' baseline risk {:.0}", action.category, baseline),
        )
    }

    fn urgency_factor(&self, action: &Action) -> RiskFactor {
        let urgency = action.metadata.urgency;
        let value = match urgency {
            Urgency::Low => 10.0,
            Urgency::Medium => 30.0,
            Urgency::High => 60.0,
            Urgency::Critical => 90.0,
        };
        RiskFactor::new(
            FACTOR_URGENCY,
            self.config.weights.urgency,
            value,
            70.0,
            format!("Urgency {} leaves {} time for review", urgency, match urgency {
                Urgency::Low | Urgency::Medium => "ample",
                Urgency::High => "limited",
                Urgency::Critical => "no",
            }),
        )
    }
}
