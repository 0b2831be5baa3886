use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use warden_core::{Category, RiskThresholds};

use crate::boundaries::Boundaries;

/// Root configuration, maps to `warden.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WardenConfig {
    pub autonomy: AutonomyConfig,
    pub boundaries: Boundaries,
    pub risk: RiskConfig,
    pub pipeline: PipelineConfig,
    pub events: EventsConfig,
    pub logging: LoggingConfig,
}

// ── Autonomy ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AutonomyConfig {
    /// Autonomy level: 1 = manual, 2 = bounded, 3 = supervised, 4 = full.
    pub level: u8,
}

impl Default for AutonomyConfig {
    fn default() -> Self {
        Self { level: 2 }
    }
}

// ── Risk scoring ───────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    /// Estimated value (USD) that scores 100 on the value factor.
    pub high_value_usd: f64,
    pub thresholds: RiskThresholds,
    pub weights: RiskWeights,
    pub category_baselines: CategoryBaselines,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            high_value_usd: 500.0,
            thresholds: RiskThresholds::default(),
            weights: RiskWeights::default(),
            category_baselines: CategoryBaselines::default(),
        }
    }
}

/// Factor weights for single-action scoring. Expected to sum to 1.0.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskWeights {
    pub value: f64,
    pub reversibility: f64,
    pub category: f64,
    pub urgency: f64,
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self {
            value: 0.35,
            reversibility: 0.25,
            category: 0.25,
            urgency: 0.15,
        }
    }
}

impl RiskWeights {
    pub fn total(&self) -> f64 {
        self.value + self.reversibility + self.category + self.urgency
    }
}

/// Baseline risk (0-100) contributed by the category an action belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryBaselines {
    pub trading: f64,
    pub content: f64,
    pub build: f64,
    pub deployment: f64,
    pub configuration: f64,
}

impl Default for CategoryBaselines {
    fn default() -> Self {
        Self {
            trading: 60.0,
            content: 10.0,
            build: 30.0,
            deployment: 70.0,
            configuration: 40.0,
        }
    }
}

impl CategoryBaselines {
    pub fn for_category(&self, category: Category) -> f64 {
        match category {
            Category::Trading => self.trading,
            Category::Content => self.content,
            Category::Build => self.build,
            Category::Deployment => self.deployment,
            Category::Configuration => self.configuration,
        }
    }
}

// ── Pipelines ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Step count above which the complexity factor is exceeded.
    pub max_steps: usize,
    /// Step timeouts above this (milliseconds) are annotated as long-running.
    pub long_timeout_ms: u64,
    /// Extra tool pairs that are risky together, in addition to the built-in list.
    pub dangerous_combinations: Vec<[String; 2]>,
    /// Per-tool base risk overrides (0-100), merged over the built-in table.
    pub tool_risk: BTreeMap<String, f64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_steps: 10,
            long_timeout_ms: 300_000,
            dangerous_combinations: vec![],
            tool_risk: BTreeMap::new(),
        }
    }
}

// ── Events ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EventsConfig {
    /// Broadcast buffer per subscriber before lagging receivers drop events.
    pub capacity: usize,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self { capacity: 1024 }
    }
}

// ── Logging ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    pub level: String,
    /// Output format: "pretty", "json", "compact".
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "pretty".into(),
        }
    }
}

// ── Validation ─────────────────────────────────────────────────

/// A single config validation issue.
#[derive(Debug)]
pub struct ConfigWarning {
    pub field: String,
    pub message: String,
    pub severity: WarningSeverity,
    pub hint: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningSeverity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self.severity {
            WarningSeverity::Error => "error",
            WarningSeverity::Warning => "warning",
            WarningSeverity::Info => "info",
        };
        write!(f, "[{}] {}: {}", tag, self.field, self.message)?;
        if let Some(ref h) = self.hint {
            write!(f, "\n   -> {}", h)?;
        }
        Ok(())
    }
}

impl WardenConfig {
    /// Validate the config and return a list of warnings/errors.
    /// Returns `Err` with all messages joined if any severity is Error.
    pub fn validate(&self) -> Result<Vec<ConfigWarning>, String> {
        let warnings = self.issues();

        // Check for hard errors
        let errors: Vec<String> = warnings
            .iter()
            .filter(|w| w.severity == WarningSeverity::Error)
            .map(|w| format!("{}: {}", w.field, w.message))
            .collect();

        if !errors.is_empty() {
            return Err(format!("Configuration errors:\n  • {}", errors.join("\n  • ")));
        }

        Ok(warnings)
    }

    /// Every validation issue, errors included, in field order.
    pub fn issues(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        // ── Autonomy level ───
        if !(1..=4).contains(&self.autonomy.level) {
            warnings.push(ConfigWarning {
                field: "autonomy.level".into(),
                message: format!("level {} is invalid", self.autonomy.level),
                severity: WarningSeverity::Error,
                hint: Some("Valid levels: 1 (manual), 2 (bounded), 3 (supervised), 4 (full)".into()),
            });
        } else if self.autonomy.level == 4 {
            warnings.push(ConfigWarning {
                field: "autonomy.level".into(),
                message: "level 4 (full): everything short of critical risk auto-executes".into(),
                severity: WarningSeverity::Warning,
                hint: Some("Consider level 2 or 3 while boundaries are being tuned".into()),
            });
        }

        // ── Risk thresholds ───
        if !self.risk.thresholds.is_ascending() {
            warnings.push(ConfigWarning {
                field: "risk.thresholds".into(),
                message: "thresholds must be strictly ascending (safe < low < medium < high)".into(),
                severity: WarningSeverity::Error,
                hint: Some("Defaults are 20 / 40 / 60 / 80".into()),
            });
        }

        let total = self.risk.weights.total();
        if (total - 1.0).abs() > 0.01 {
            warnings.push(ConfigWarning {
                field: "risk.weights".into(),
                message: format!("factor weights sum to {:.2}, scores will not span 0-100", total),
                severity: WarningSeverity::Warning,
                hint: Some("Weights should sum to 1.0".into()),
            });
        }

        if self.risk.high_value_usd <= 0.0 {
            warnings.push(ConfigWarning {
                field: "risk.high_value_usd".into(),
                message: "high value anchor must be positive".into(),
                severity: WarningSeverity::Error,
                hint: Some("Set to e.g. 500.0".into()),
            });
        }

        warnings.extend(self.boundaries.issues());

        // ── Pipelines ───
        for (tool, risk) in &self.pipeline.tool_risk {
            if !(0.0..=100.0).contains(risk) {
                warnings.push(ConfigWarning {
                    field: format!("pipeline.tool_risk.{}", tool),
                    message: format!("risk {} is outside 0-100", risk),
                    severity: WarningSeverity::Warning,
                    hint: Some("Values are clamped when scoring".into()),
                });
            }
        }

        // ── Logging ───
        let valid_formats = ["pretty", "json", "compact"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            warnings.push(ConfigWarning {
                field: "logging.format".into(),
                message: format!("unknown log format '{}'", self.logging.format),
                severity: WarningSeverity::Warning,
                hint: Some(format!("Valid values: {}", valid_formats.join(", "))),
            });
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            warnings.push(ConfigWarning {
                field: "logging.level".into(),
                message: format!("unknown log level '{}'", self.logging.level),
                severity: WarningSeverity::Warning,
                hint: Some(format!("Valid values: {}", valid_levels.join(", "))),
            });
        }

        warnings
    }
}
