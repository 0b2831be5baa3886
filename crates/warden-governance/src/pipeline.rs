use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, warn};

use warden_config::PipelineConfig;
use warden_core::{
    DecisionOutcome, Result, RiskFactor, RiskLevel, RiskThresholds, WardenError, round_score,
};

/// Base risk for tools that are not in the table.
pub const DEFAULT_TOOL_RISK: f64 = 50.0;

/// Any step at or above this base risk forces escalation of the whole pipeline.
pub const ESCALATION_TOOL_RISK: f64 = 90.0;

const WEIGHT_CUMULATIVE: f64 = 0.35;
const WEIGHT_COMBINATIONS: f64 = 0.25;
const WEIGHT_COMPLEXITY: f64 = 0.15;
const WEIGHT_DATA_FLOW: f64 = 0.15;
const WEIGHT_DECLARED: f64 = 0.10;

const COMBINATION_INCREMENT: f64 = 40.0;
const DATA_FLOW_INCREMENT: f64 = 15.0;
const MAX_DEPTH: usize = 3;

const BUILTIN_TOOL_RISK: &[(&str, f64)] = &[
    ("wallet_agent", 90.0),
    ("bridge_agent", 90.0),
    ("trading_agent", 85.0),
    ("defi_agent", 80.0),
    ("deployer_agent", 80.0),
    ("builder_agent", 45.0),
    ("social_agent", 40.0),
    ("hunter_agent", 30.0),
    ("content_agent", 25.0),
    ("audit_agent", 20.0),
    ("research_agent", 15.0),
    ("analytics_agent", 15.0),
    ("notifier_agent", 10.0),
];

const BUILTIN_DANGEROUS_COMBINATIONS: &[(&str, &str)] = &[
    ("wallet_agent", "trading_agent"),
    ("wallet_agent", "bridge_agent"),
    ("deployer_agent", "wallet_agent"),
    ("defi_agent", "wallet_agent"),
    ("bridge_agent", "trading_agent"),
];

const SENSITIVE_TERMS: &[&str] = &[
    "wallet", "key", "secret", "password", "seed", "mnemonic", "transfer", "withdraw", "deploy",
    "bridge",
];

const FINANCIAL_TOOLS: &[&str] = &["wallet_agent", "bridge_agent", "trading_agent", "defi_agent"];
const PUBLIC_TOOLS: &[&str] = &["content_agent", "social_agent", "deployer_agent"];

// ── Pipeline model ─────────────────────────────────────────────

/// A named, versioned multi-step workflow. Steps form a DAG through `depends_on`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pipeline {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub description: String,
    pub steps: Vec<PipelineStep>,
    /// Risk label declared by the pipeline author.
    #[serde(default)]
    pub risk_level: Option<RiskLevel>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineStep {
    pub id: String,
    pub tool: String,
    #[serde(default)]
    pub inputs: Map<String, Value>,
    #[serde(default)]
    pub depends_on: Vec<String>,
    /// Predicate gating execution of this step.
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub retries: Option<u32>,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

impl PipelineStep {
    pub fn new(id: impl Into<String>, tool: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tool: tool.into(),
            inputs: Map::new(),
            depends_on: Vec::new(),
            condition: None,
            retries: None,
            timeout_ms: None,
        }
    }

    pub fn depends_on(mut self, id: impl Into<String>) -> Self {
        self.depends_on.push(id.into());
        self
    }

    pub fn with_input(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.inputs.insert(key.into(), value.into());
        self
    }

    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    pub fn with_timeout_ms(mut self, ms: u64) -> Self {
        self.timeout_ms = Some(ms);
        self
    }
}

// ── Assessment ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineFactors {
    pub cumulative_tool_risk: RiskFactor,
    pub dangerous_combinations: RiskFactor,
    pub complexity: RiskFactor,
    pub data_flow: RiskFactor,
    pub declared_level: RiskFactor,
}

impl PipelineFactors {
    pub fn iter(&self) -> impl Iterator<Item = &RiskFactor> {
        [
            &self.cumulative_tool_risk,
            &self.dangerous_combinations,
            &self.complexity,
            &self.data_flow,
            &self.declared_level,
        ]
        .into_iter()
    }
}

/// Per-step transparency record. Does not feed the aggregate score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepRisk {
    pub step_id: String,
    pub tool: String,
    pub score: f64,
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactMagnitude {
    None,
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Internal,
    Public,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReversibilityClass {
    Reversible,
    Partial,
    Irreversible,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimatedImpact {
    pub financial: ImpactMagnitude,
    pub visibility: Visibility,
    pub reversibility: ReversibilityClass,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineRiskAssessment {
    pub pipeline_id: String,
    pub level: RiskLevel,
    pub score: f64,
    pub factors: PipelineFactors,
    pub step_risks: Vec<StepRisk>,
    pub recommendation: DecisionOutcome,
    /// Advisory only; never feeds back into scoring.
    pub constraints: Vec<String>,
    pub estimated_impact: EstimatedImpact,
}

// ── Classifier ─────────────────────────────────────────────────

/// Scores a whole pipeline from five independent factors.
#[derive(Debug, Clone)]
pub struct PipelineRiskClassifier {
    tool_risk: HashMap<String, f64>,
    combinations: Vec<(String, String)>,
    max_steps: usize,
    long_timeout_ms: u64,
    thresholds: RiskThresholds,
}

impl Default for PipelineRiskClassifier {
    fn default() -> Self {
        Self::new(&PipelineConfig::default(), RiskThresholds::default())
    }
}

impl PipelineRiskClassifier {
    pub fn new(config: &PipelineConfig, thresholds: RiskThresholds) -> Self {
        let mut tool_risk: HashMap<String, f64> = BUILTIN_TOOL_RISK
            .iter()
            .map(|(tool, risk)| (tool.to_string(), *risk))
            .collect();
        for (tool, risk) in &config.tool_risk {
            tool_risk.insert(tool.clone(), risk.clamp(0.0, 100.0));
        }

        let mut combinations: Vec<(String, String)> = BUILTIN_DANGEROUS_COMBINATIONS
            .iter()
            .map(|(a, b)| (a.to_string(), b.to_string()))
            .collect();
        for [a, b] in &config.dangerous_combinations {
            combinations.push((a.clone(), b.clone()));
        }

        Self {
            tool_risk,
            combinations,
            max_steps: config.max_steps,
            long_timeout_ms: config.long_timeout_ms,
            thresholds,
        }
    }

    /// Register an extra tool pair that is risky when both appear.
    pub fn with_dangerous_combination(mut self, a: impl Into<String>, b: impl Into<String>) -> Self {
        self.combinations.push((a.into(), b.into()));
        self
    }

    pub fn tool_risk(&self, tool: &str) -> f64 {
        self.tool_risk.get(tool).copied().unwrap_or(DEFAULT_TOOL_RISK)
    }

    /// Classify a pipeline. Fails only on duplicate step ids or a dependency cycle.
    pub fn classify(&self, pipeline: &Pipeline) -> Result<PipelineRiskAssessment> {
        validate_steps(pipeline)?;
        let depth = dependency_depth(&pipeline.steps)?;

        let (combination_factor, matched) = self.combination_factor(pipeline);
        let factors = PipelineFactors {
            cumulative_tool_risk: self.cumulative_factor(pipeline),
            dangerous_combinations: combination_factor,
            complexity: self.complexity_factor(pipeline, depth),
            data_flow: data_flow_factor(pipeline),
            declared_level: declared_factor(pipeline.risk_level),
        };

        let raw = factors.cumulative_tool_risk.value * WEIGHT_CUMULATIVE
            + factors.dangerous_combinations.value * WEIGHT_COMBINATIONS
            + factors.complexity.value * WEIGHT_COMPLEXITY
            + factors.data_flow.value * WEIGHT_DATA_FLOW
            + factors.declared_level.value * WEIGHT_DECLARED;
        let score = round_score(raw.clamp(0.0, 100.0));
        let level = self.thresholds.level_for(score);

        let step_risks = self.step_risks(pipeline);
        let recommendation = if step_risks.iter().any(|s| s.score >= ESCALATION_TOOL_RISK) {
            DecisionOutcome::Escalate
        } else if pipeline.risk_level == Some(RiskLevel::Safe) && level != RiskLevel::Critical {
            DecisionOutcome::AutoExecute
        } else {
            DecisionOutcome::for_risk_level(level)
        };

        let constraints = self.constraints(pipeline, level, &matched);
        let estimated_impact = estimate_impact(pipeline);

        debug!(
            pipeline_id = %pipeline.id,
            score,
            level = %level,
            recommendation = %recommendation,
            "classified pipeline"
        );

        Ok(PipelineRiskAssessment {
            pipeline_id: pipeline.id.clone(),
            level,
            score,
            factors,
            step_risks,
            recommendation,
            constraints,
            estimated_impact,
        })
    }

    /// `0.6 * weighted average + 0.4 * max`, earlier steps weighted `1/(i+1)`
    /// and normalized by `ln(n+1)`.
    fn cumulative_factor(&self, pipeline: &Pipeline) -> RiskFactor {
        let n = pipeline.steps.len();
        if n == 0 {
            return RiskFactor::new("cumulative_tool_risk", WEIGHT_CUMULATIVE, 0.0, 70.0, "Pipeline has no steps");
        }
        let risks: Vec<f64> = pipeline.steps.iter().map(|s| self.tool_risk(&s.tool)).collect();
        let weighted_sum: f64 = risks.iter().enumerate().map(|(i, r)| r / (i as f64 + 1.0)).sum();
        let weighted_avg = weighted_sum / ((n as f64) + 1.0).ln();
        let (max_idx, max) = risks
            .iter()
            .copied()
            .enumerate()
            .fold((0, f64::MIN), |acc, (i, r)| if r > acc.1 { (i, r) } else { acc });
        let value = 0.6 * weighted_avg + 0.4 * max;
        RiskFactor::new(
            "cumulative_tool_risk",
            WEIGHT_CUMULATIVE,
            value,
            70.0,
            format!(
                "Weighted tool risk {:.1}, highest {:.0} ({})",
                weighted_avg, max, pipeline.steps[max_idx].tool
            ),
        )
    }

    fn combination_factor(&self, pipeline: &Pipeline) -> (RiskFactor, Vec<String>) {
        let tools: HashSet<&str> = pipeline.steps.iter().map(|s| s.tool.as_str()).collect();
        let mut matched = Vec::new();
        for (a, b) in &self.combinations {
            let label = format!("{} + {}", a, b);
            if tools.contains(a.as_str()) && tools.contains(b.as_str()) && !matched.contains(&label) {
                matched.push(label);
            }
        }
        let reason = if matched.is_empty() {
            "No dangerous tool combinations".to_string()
        } else {
            format!("Dangerous combinations: {}", matched.join(", "))
        };
        let value = (matched.len() as f64 * COMBINATION_INCREMENT).min(100.0);
        (
            RiskFactor::new("dangerous_combinations", WEIGHT_COMBINATIONS, value, 0.0, reason),
            matched,
        )
    }

    fn complexity_factor(&self, pipeline: &Pipeline, depth: usize) -> RiskFactor {
        let n = pipeline.steps.len();
        let conditional = pipeline.steps.iter().any(|s| s.condition.is_some());
        let value = 10.0
            + 5.0 * n as f64
            + if conditional { 15.0 } else { 0.0 }
            + 10.0 * depth as f64;
        let mut factor = RiskFactor::new(
            "complexity",
            WEIGHT_COMPLEXITY,
            value,
            60.0,
            format!(
                "{} steps, dependency depth {}{}",
                n,
                depth,
                if conditional { ", conditional execution" } else { "" }
            ),
        );
        factor.exceeded = n > self.max_steps || depth > MAX_DEPTH;
        factor
    }

    fn step_risks(&self, pipeline: &Pipeline) -> Vec<StepRisk> {
        pipeline
            .steps
            .iter()
            .map(|step| {
                let mut notes = Vec::new();
                if !self.tool_risk.contains_key(&step.tool) {
                    notes.push(format!("unknown tool, default risk {:.0} applied", DEFAULT_TOOL_RISK));
                }
                if let Some(cond) = &step.condition {
                    notes.push(format!("conditional execution: {}", cond));
                }
                if let Some(ms) = step.timeout_ms.filter(|ms| *ms > self.long_timeout_ms) {
                    notes.push(format!("long timeout: {}s", ms / 1000));
                }
                if let Some(retries) = step.retries.filter(|r| *r > 0) {
                    notes.push(format!("may re-run up to {} times", retries));
                }
                StepRisk {
                    step_id: step.id.clone(),
                    tool: step.tool.clone(),
                    score: self.tool_risk(&step.tool),
                    notes,
                }
            })
            .collect()
    }

    fn constraints(&self, pipeline: &Pipeline, level: RiskLevel, matched: &[String]) -> Vec<String> {
        let mut out = Vec::new();
        if level >= RiskLevel::High {
            out.push("Requires human approval before execution".to_string());
        }
        if level == RiskLevel::Critical {
            out.push("Escalate to an operator before any step runs".to_string());
        }
        let uses = |set: &[&str]| pipeline.steps.iter().any(|s| set.contains(&s.tool.as_str()));
        if uses(FINANCIAL_TOOLS) {
            out.push("Subject to financial limits".to_string());
        }
        if uses(&["deployer_agent"]) {
            out.push("Subject to deployment policy; production deploys are gated".to_string());
        }
        for combo in matched {
            out.push(format!("Dangerous tool combination present: {}", combo));
        }
        if pipeline.steps.iter().any(|s| s.condition.is_some()) {
            out.push("Conditional steps must be re-evaluated at runtime".to_string());
        }
        if pipeline.steps.len() > self.max_steps {
            out.push(format!("Exceeds maximum of {} steps", self.max_steps));
        }
        out
    }
}

// ── Factor helpers ─────────────────────────────────────────────

fn data_flow_factor(pipeline: &Pipeline) -> RiskFactor {
    let mut matches = 0usize;
    let mut seen: BTreeMap<&str, usize> = BTreeMap::new();
    for step in &pipeline.steps {
        let serialized = serde_json::to_string(&step.inputs).unwrap_or_default().to_lowercase();
        for &term in SENSITIVE_TERMS {
            if serialized.contains(term) {
                matches += 1;
                *seen.entry(term).or_default() += 1;
            }
        }
    }
    let value = (matches as f64 * DATA_FLOW_INCREMENT).min(100.0);
    let reason = if matches == 0 {
        "No sensitive data in step inputs".to_string()
    } else {
        format!(
            "Sensitive terms in step inputs: {} ({} matches)",
            seen.keys().copied().collect::<Vec<_>>().join(", "),
            matches
        )
    };
    RiskFactor::new("data_flow", WEIGHT_DATA_FLOW, value, 40.0, reason)
}

fn declared_factor(declared: Option<RiskLevel>) -> RiskFactor {
    let (value, reason) = match declared {
        Some(level) => (declared_anchor(level), format!("Declared risk level: {}", level)),
        None => (
            declared_anchor(RiskLevel::Medium),
            "No declared risk level; assuming medium".to_string(),
        ),
    };
    RiskFactor::new("declared_level", WEIGHT_DECLARED, value, 70.0, reason)
}

fn declared_anchor(level: RiskLevel) -> f64 {
    match level {
        RiskLevel::Safe => 10.0,
        RiskLevel::Low => 30.0,
        RiskLevel::Medium => 50.0,
        RiskLevel::High => 75.0,
        RiskLevel::Critical => 95.0,
    }
}

fn estimate_impact(pipeline: &Pipeline) -> EstimatedImpact {
    let has = |tools: &[&str]| pipeline.steps.iter().any(|s| tools.contains(&s.tool.as_str()));

    let mut financial = if has(&["wallet_agent", "bridge_agent"]) {
        ImpactMagnitude::High
    } else if has(&["trading_agent", "defi_agent"]) {
        ImpactMagnitude::Medium
    } else {
        ImpactMagnitude::None
    };
    let largest_amount = pipeline
        .steps
        .iter()
        .flat_map(|s| ["amount", "value"].into_iter().filter_map(move |k| s.inputs.get(k)?.as_f64()))
        .fold(0.0_f64, f64::max);
    let by_amount = if largest_amount > 1000.0 {
        ImpactMagnitude::High
    } else if largest_amount > 100.0 {
        ImpactMagnitude::Medium
    } else if largest_amount > 0.0 {
        ImpactMagnitude::Low
    } else {
        ImpactMagnitude::None
    };
    financial = financial.max(by_amount);

    let visibility = if has(PUBLIC_TOOLS) {
        Visibility::Public
    } else {
        Visibility::Internal
    };

    let reversibility = if has(FINANCIAL_TOOLS) {
        ReversibilityClass::Irreversible
    } else if has(&["deployer_agent", "builder_agent", "social_agent"]) {
        ReversibilityClass::Partial
    } else {
        ReversibilityClass::Reversible
    };

    EstimatedImpact {
        financial,
        visibility,
        reversibility,
    }
}

// ── Graph validation ───────────────────────────────────────────

fn validate_steps(pipeline: &Pipeline) -> Result<()> {
    let mut ids = HashSet::new();
    for step in &pipeline.steps {
        if !ids.insert(step.id.as_str()) {
            return Err(WardenError::DuplicateStep(step.id.clone()));
        }
    }
    for step in &pipeline.steps {
        for dep in &step.depends_on {
            if !ids.contains(dep.as_str()) {
                warn!(pipeline_id = %pipeline.id, step = %step.id, dependency = %dep, "ignoring unknown dependency");
            }
        }
    }
    Ok(())
}

/// Longest dependency chain, counted in steps. A step with no dependencies has depth 1.
fn dependency_depth(steps: &[PipelineStep]) -> Result<usize> {
    let mut walker = DepthWalker {
        index: steps.iter().map(|s| (s.id.as_str(), s)).collect(),
        memo: HashMap::new(),
        visiting: HashSet::new(),
    };
    let mut deepest = 0;
    for step in steps {
        deepest = deepest.max(walker.depth(&step.id)?);
    }
    Ok(deepest)
}

struct DepthWalker<'a> {
    index: HashMap<&'a str, &'a PipelineStep>,
    memo: HashMap<&'a str, usize>,
    visiting: HashSet<&'a str>,
}

impl<'a> DepthWalker<'a> {
    fn depth(&mut self, id: &'a str) -> Result<usize> {
        if let Some(d) = self.memo.get(id) {
            return Ok(*d);
        }
        let Some(step) = self.index.get(id).copied() else {
            return Ok(0);
        };
        if !self.visiting.insert(id) {
            return Err(WardenError::PipelineCycle { step: id.to_string() });
        }
        let mut deepest_dep = 0;
        for dep in &step.depends_on {
            deepest_dep = deepest_dep.max(self.depth(dep.as_str())?);
        }
        self.visiting.remove(id);
        let d = deepest_dep + 1;
        self.memo.insert(id, d);
        Ok(d)
    }
}
