//! Six-perspective deliberation over a single action.
//!
//! Each hat is an independent heuristic producing a verdict and a 0-100 score.
//! The consensus depends only on the six verdicts; the overall score is a fixed
//! weighted sum. The result is advisory and never changes a routing outcome.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use warden_core::{Action, Category, RiskAssessment, RiskLevel, Urgency, round_score};

use crate::level::is_scheduled_trade;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Hat {
    /// Facts and data completeness.
    White,
    /// Intuition and gut feel.
    Red,
    /// Caution and downside.
    Black,
    /// Benefits and upside.
    Yellow,
    /// Alternatives.
    Green,
    /// Process and control.
    Blue,
}

impl Hat {
    pub const ALL: [Hat; 6] = [Self::White, Self::Red, Self::Black, Self::Yellow, Self::Green, Self::Blue];

    /// Contribution to the overall score.
    pub fn weight(&self) -> f64 {
        match self {
            Self::Black => 0.25,
            Self::White => 0.20,
            Self::Blue => 0.20,
            Self::Yellow => 0.15,
            Self::Red => 0.10,
            Self::Green => 0.10,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::White => "white",
            Self::Red => "red",
            Self::Black => "black",
            Self::Yellow => "yellow",
            Self::Green => "green",
            Self::Blue => "blue",
        }
    }
}

impl fmt::Display for Hat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HatVerdict {
    Proceed,
    Caution,
    Stop,
    Review,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HatPerspective {
    pub hat: Hat,
    pub verdict: HatVerdict,
    pub analysis: String,
    pub key_points: Vec<String>,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Consensus {
    StrongProceed,
    Proceed,
    Caution,
    Mixed,
    Stop,
}

impl Consensus {
    /// Derive the consensus from the six verdicts alone.
    ///
    /// Any stop, or three or more cautions, stops. Five proceeds is a strong
    /// proceed, four a proceed. Otherwise two or more cautions is caution and
    /// anything else is mixed.
    pub fn from_verdicts(verdicts: &[HatVerdict]) -> Self {
        let count = |v: HatVerdict| verdicts.iter().filter(|x| **x == v).count();
        let (stops, cautions, proceeds) = (
            count(HatVerdict::Stop),
            count(HatVerdict::Caution),
            count(HatVerdict::Proceed),
        );
        if stops > 0 || cautions >= 3 {
            Self::Stop
        } else if proceeds >= 5 {
            Self::StrongProceed
        } else if proceeds >= 4 {
            Self::Proceed
        } else if cautions >= 2 {
            Self::Caution
        } else {
            Self::Mixed
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SixHatsResult {
    pub perspectives: BTreeMap<Hat, HatPerspective>,
    pub consensus: Consensus,
    pub overall_score: f64,
    pub recommendation: String,
}

impl SixHatsResult {
    pub fn perspective(&self, hat: Hat) -> Option<&HatPerspective> {
        self.perspectives.get(&hat)
    }
}

/// Stateless evaluator; safe to share across threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct SixHatsEvaluator;

impl SixHatsEvaluator {
    pub fn new() -> Self {
        Self
    }

    pub fn evaluate(&self, action: &Action, assessment: Option<&RiskAssessment>) -> SixHatsResult {
        let perspectives: BTreeMap<Hat, HatPerspective> = [
            white_hat(action, assessment),
            red_hat(action),
            black_hat(action, assessment),
            yellow_hat(action),
            green_hat(action),
            blue_hat(action, assessment),
        ]
        .into_iter()
        .map(|p| (p.hat, p))
        .collect();

        let verdicts: Vec<HatVerdict> = perspectives.values().map(|p| p.verdict).collect();
        let consensus = Consensus::from_verdicts(&verdicts);
        let overall_score = round_score(perspectives.values().map(|p| p.score * p.hat.weight()).sum());
        let recommendation = recommend(consensus, overall_score, &perspectives);

        SixHatsResult {
            perspectives,
            consensus,
            overall_score,
            recommendation,
        }
    }
}

fn perspective(hat: Hat, score: f64, verdict: HatVerdict, analysis: String, key_points: Vec<String>) -> HatPerspective {
    HatPerspective {
        hat,
        verdict,
        analysis,
        key_points,
        score: score.clamp(0.0, 100.0),
    }
}

fn white_hat(action: &Action, assessment: Option<&RiskAssessment>) -> HatPerspective {
    let mut score: f64 = 50.0;
    let mut points = Vec::new();

    match action.metadata.estimated_value {
        Some(v) => {
            score += 15.0;
            points.push(format!("Estimated value: ${:.2}", v));
        }
        None => {
            score -= 10.0;
            points.push("No estimated value supplied".into());
        }
    }
    match action.metadata.reversible {
        Some(r) => {
            score += 10.0;
            points.push(format!("Reversible: {}", if r { "yes" } else { "no" }));
        }
        None => {
            score -= 5.0;
            points.push("Reversibility not declared".into());
        }
    }
    if action.params.is_empty() {
        points.push("No parameters supplied".into());
    } else {
        score += 10.0;
        points.push(format!("{} parameters supplied", action.params.len()));
    }
    if action.description.trim().len() >= 10 {
        score += 5.0;
    }
    match assessment {
        Some(a) => {
            score += 10.0;
            points.push(format!("Risk score {:.1} ({})", a.score, a.level));
        }
        None => points.push("No risk assessment available".into()),
    }

    let verdict = if score >= 70.0 {
        HatVerdict::Proceed
    } else if score >= 50.0 {
        HatVerdict::Review
    } else {
        HatVerdict::Caution
    };
    perspective(
        Hat::White,
        score,
        verdict,
        format!("Available data covers {:.0}% of what a reviewer would want", score.clamp(0.0, 100.0)),
        points,
    )
}

const HYPE_TERMS: &[&str] = &["guaranteed", "100x", "moon", "all in", "can't lose", "asap", "yolo", "urgent"];

fn red_hat(action: &Action) -> HatPerspective {
    let mut score: f64 = 60.0;
    let mut points = Vec::new();

    match action.metadata.urgency {
        Urgency::Critical => {
            score -= 20.0;
            points.push("Critical urgency feels rushed".into());
        }
        Urgency::High => {
            score -= 10.0;
            points.push("High urgency adds pressure".into());
        }
        Urgency::Low | Urgency::Medium => {}
    }
    let text = action.description.to_lowercase();
    for term in HYPE_TERMS {
        if text.contains(term) {
            score -= 10.0;
            points.push(format!("Gut check: '{}' in description", term));
        }
    }
    if action.category == Category::Content {
        score += 10.0;
        points.push("Creative output feels low-stakes".into());
    }

    let verdict = if score >= 60.0 {
        HatVerdict::Proceed
    } else if score >= 35.0 {
        HatVerdict::Caution
    } else {
        HatVerdict::Stop
    };
    let feel = match verdict {
        HatVerdict::Proceed => "feels right",
        HatVerdict::Stop => "feels wrong",
        _ => "feels uneasy",
    };
    perspective(Hat::Red, score, verdict, format!("Instinctively this {}", feel), points)
}

fn black_hat(action: &Action, assessment: Option<&RiskAssessment>) -> HatPerspective {
    let mut score: f64 = 70.0;
    let mut points = Vec::new();

    if let Some(a) = assessment {
        for f in a.exceeded_factors() {
            score -= 8.0;
            points.push(format!("{} exceeded: {}", f.name, f.reason));
        }
        match a.level {
            RiskLevel::Critical => {
                score -= 40.0;
                points.push("Critical risk level".into());
            }
            RiskLevel::High => {
                score -= 25.0;
                points.push("High risk level".into());
            }
            _ => {}
        }
    }
    let value = action.estimated_value();
    if value > 1000.0 {
        score -= 20.0;
        points.push(format!("High value at stake (${:.2})", value));
    } else if value > 100.0 {
        score -= 10.0;
        points.push(format!("Meaningful value at stake (${:.2})", value));
    }
    if action.metadata.reversible == Some(false) {
        score -= 12.0;
        points.push("Cannot be rolled back".into());
    }
    if matches!(action.category, Category::Deployment | Category::Trading) {
        score -= 8.0;
        points.push(format!("{} actions carry external side effects", action.category));
    }

    let verdict = if score >= 55.0 {
        HatVerdict::Proceed
    } else if score >= 30.0 {
        HatVerdict::Caution
    } else {
        HatVerdict::Stop
    };
    let analysis = if points.is_empty() {
        "No significant downside identified".to_string()
    } else {
        format!("{} risk concern(s) identified", points.len())
    };
    perspective(Hat::Black, score, verdict, analysis, points)
}

fn yellow_hat(action: &Action) -> HatPerspective {
    let mut score: f64 = 50.0;
    let mut points = Vec::new();

    let (bonus, upside) = match action.category {
        Category::Content => (20.0, "Audience growth and engagement"),
        Category::Build => (15.0, "Ships improvements to the product"),
        Category::Trading => (10.0, "Potential portfolio gains"),
        Category::Deployment => (10.0, "Delivers finished work to users"),
        Category::Configuration => (5.0, "Operational tuning"),
    };
    score += bonus;
    points.push(upside.to_string());

    if matches!(action.metadata.estimated_value, Some(v) if v < 50.0) {
        score += 10.0;
        points.push("Low cost".into());
    }
    if action.metadata.reversible == Some(true) {
        score += 15.0;
        points.push("Easy to undo if it disappoints".into());
    }

    let verdict = if score >= 65.0 {
        HatVerdict::Proceed
    } else if score >= 45.0 {
        HatVerdict::Review
    } else {
        HatVerdict::Caution
    };
    perspective(Hat::Yellow, score, verdict, format!("Upside: {}", upside.to_lowercase()), points)
}

fn green_hat(action: &Action) -> HatPerspective {
    let mut alternatives: Vec<String> = Vec::new();

    if action.metadata.reversible == Some(false) {
        alternatives.push("Stage as a reversible dry run first".into());
    }
    if action.estimated_value() > 100.0 {
        alternatives.push("Split into smaller tranches".into());
    }
    if action.metadata.urgency == Urgency::Critical {
        alternatives.push("Defer to the next review window if possible".into());
    }
    match action.category {
        Category::Deployment => alternatives.push("Deploy to staging before production".into()),
        Category::Trading if !is_scheduled_trade(action) => {
            alternatives.push("Convert to a scheduled DCA order".into())
        }
        Category::Build if action.param_f64("linesChanged").unwrap_or(0.0) > 200.0 => {
            alternatives.push("Break the change into smaller commits".into())
        }
        _ => {}
    }

    let score = 80.0 - 12.0 * alternatives.len() as f64;
    let verdict = match alternatives.len() {
        0 => HatVerdict::Proceed,
        1 | 2 => HatVerdict::Review,
        _ => HatVerdict::Caution,
    };
    let analysis = if alternatives.is_empty() {
        "No better alternative needed".to_string()
    } else {
        format!("{} alternative approach(es) worth considering", alternatives.len())
    };
    perspective(Hat::Green, score, verdict, analysis, alternatives)
}

fn blue_hat(action: &Action, assessment: Option<&RiskAssessment>) -> HatPerspective {
    let mut score: f64 = 60.0;
    let mut points = Vec::new();

    match assessment {
        None => {
            score -= 15.0;
            points.push("No formal risk assessment attached".into());
        }
        Some(a) if a.level >= RiskLevel::High => {
            score -= 15.0;
            points.push("Requires the approval workflow".into());
        }
        Some(a) if a.level <= RiskLevel::Low => {
            score += 10.0;
            points.push("Within standard operating process".into());
        }
        Some(_) => {}
    }
    if action.description.trim().is_empty() {
        score -= 10.0;
        points.push("Missing description for the audit trail".into());
    }
    if action.metadata.urgency == Urgency::Critical && assessment.is_some_and(|a| a.level >= RiskLevel::Medium) {
        score -= 10.0;
        points.push("Critical urgency would shortcut review".into());
    }

    let verdict = if score >= 65.0 {
        HatVerdict::Proceed
    } else if score >= 45.0 {
        HatVerdict::Review
    } else {
        HatVerdict::Caution
    };
    perspective(
        Hat::Blue,
        score,
        verdict,
        format!("Process fit {:.0}/100", score.clamp(0.0, 100.0)),
        points,
    )
}

fn recommend(consensus: Consensus, score: f64, perspectives: &BTreeMap<Hat, HatPerspective>) -> String {
    let concerns: Vec<&str> = perspectives
        .get(&Hat::Black)
        .map(|p| p.key_points.iter().map(String::as_str).collect())
        .unwrap_or_default();
    let alternatives: Vec<&str> = perspectives
        .get(&Hat::Green)
        .map(|p| p.key_points.iter().map(String::as_str).collect())
        .unwrap_or_default();

    let mut out = match consensus {
        Consensus::StrongProceed => format!("Strong consensus to proceed (score {:.1})", score),
        Consensus::Proceed => format!("Proceed (score {:.1})", score),
        Consensus::Caution => format!("Proceed only with safeguards (score {:.1})", score),
        Consensus::Mixed => format!("Perspectives are split; route for human review (score {:.1})", score),
        Consensus::Stop => {
            let stopped: Vec<&str> = perspectives
                .values()
                .filter(|p| p.verdict == HatVerdict::Stop)
                .map(|p| p.hat.as_str())
                .collect();
            if stopped.is_empty() {
                format!("Do not proceed: too many cautions (score {:.1})", score)
            } else {
                format!("Do not proceed: {} hat(s) say stop (score {:.1})", stopped.join(", "), score)
            }
        }
    };
    if !concerns.is_empty() && consensus != Consensus::StrongProceed {
        out.push_str(&format!(". Concerns: {}", concerns.join("; ")));
    }
    if !alternatives.is_empty() && matches!(consensus, Consensus::Caution | Consensus::Mixed | Consensus::Stop) {
        out.push_str(&format!(". Alternatives: {}", alternatives.join("; ")));
    }
    out
}
