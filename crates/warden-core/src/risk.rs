use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered risk lattice: `Safe < Low < Medium < High < Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Safe,
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Map a 0-100 score to a level using the default thresholds.
    pub fn from_score(score: f64) -> Self {
        RiskThresholds::default().level_for(score)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Safe => "safe",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Upper bounds (inclusive) of each level below `Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskThresholds {
    pub safe: f64,
    pub low: f64,
    pub medium: f64,
    pub high: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            safe: 20.0,
            low: 40.0,
            medium: 60.0,
            high: 80.0,
        }
    }
}

impl RiskThresholds {
    /// Monotonic score → level mapping. A NaN score falls through to `Critical`.
    pub fn level_for(&self, score: f64) -> RiskLevel {
        if score <= self.safe {
            RiskLevel::Safe
        } else if score <= self.low {
            RiskLevel::Low
        } else if score <= self.medium {
            RiskLevel::Medium
        } else if score <= self.high {
            RiskLevel::High
        } else {
            RiskLevel::Critical
        }
    }

    pub fn is_ascending(&self) -> bool {
        self.safe < self.low && self.low < self.medium && self.medium < self.high
    }
}

/// One named, weighted input to a risk score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFactor {
    pub name: String,
    /// Contribution weight, 0-1.
    pub weight: f64,
    /// Raw factor value, 0-100.
    pub value: f64,
    pub threshold: f64,
    pub exceeded: bool,
    pub reason: String,
}

impl RiskFactor {
    pub fn new(
        name: impl Into<String>,
        weight: f64,
        value: f64,
        threshold: f64,
        reason: impl Into<String>,
    ) -> Self {
        let value = value.clamp(0.0, 100.0);
        Self {
            name: name.into(),
            weight,
            value,
            threshold,
            exceeded: value > threshold,
            reason: reason.into(),
        }
    }

    pub fn contribution(&self) -> f64 {
        self.value * self.weight
    }
}

/// Output of classifying a single action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub level: RiskLevel,
    /// Weighted score, 0-100.
    pub score: f64,
    pub factors: Vec<RiskFactor>,
}

impl RiskAssessment {
    /// Sum `value * weight` over the factors, round to two decimals and derive the level.
    pub fn from_factors(factors: Vec<RiskFactor>, thresholds: &RiskThresholds) -> Self {
        let raw: f64 = factors.iter().map(RiskFactor::contribution).sum();
        let score = round_score(raw.clamp(0.0, 100.0));
        Self {
            level: thresholds.level_for(score),
            score,
            factors,
        }
    }

    pub fn exceeded_factors(&self) -> impl Iterator<Item = &RiskFactor> {
        self.factors.iter().filter(|f| f.exceeded)
    }

    pub fn factor(&self, name: &str) -> Option<&RiskFactor> {
        self.factors.iter().find(|f| f.name == name)
    }
}

/// Round a score to two decimals so equal inputs serialize identically.
pub fn round_score(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
