use serde::{Deserialize, Serialize};

use crate::schema::{ConfigWarning, WarningSeverity};

/// Operational limits, grouped by domain. Maps to `[boundaries.*]` in `warden.toml`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Boundaries {
    pub financial: FinancialBoundaries,
    pub content: ContentBoundaries,
    pub development: DevelopmentBoundaries,
    pub trading: TradingBoundaries,
    pub time: TimeBoundaries,
}

// ── Financial ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinancialBoundaries {
    /// Single expense (USD) that may run without a warning.
    pub max_auto_expense: f64,
    /// Single expense ceiling; anything above is a hard violation.
    pub max_queued_expense: f64,
    /// Cumulative spend cap per UTC day.
    pub max_daily_spend: f64,
    /// Fraction of `max_daily_spend` at which a soft warning fires.
    pub daily_spend_warning_ratio: f64,
}

impl Default for FinancialBoundaries {
    fn default() -> Self {
        Self {
            max_auto_expense: 50.0,
            max_queued_expense: 500.0,
            max_daily_spend: 200.0,
            daily_spend_warning_ratio: 0.8,
        }
    }
}

// ── Content ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentBoundaries {
    pub max_posts_per_day: u32,
    /// Warn once this many posts (or fewer) remain under the daily cap.
    pub near_limit_margin: u32,
    pub max_blog_posts_per_week: u32,
    /// Case-insensitive keywords scanned in the description and title.
    pub restricted_topics: Vec<String>,
}

impl Default for ContentBoundaries {
    fn default() -> Self {
        Self {
            max_posts_per_day: 10,
            near_limit_margin: 2,
            max_blog_posts_per_week: 3,
            restricted_topics: vec![
                "politics".into(),
                "religion".into(),
                "financial advice".into(),
                "guaranteed returns".into(),
                "medical advice".into(),
            ],
        }
    }
}

// ── Development / build ────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DevelopmentBoundaries {
    pub max_builds_per_day: u32,
    pub max_lines_changed: u32,
    pub max_files_changed: u32,
    /// Path fragments a build may not touch.
    pub restricted_paths: Vec<String>,
    pub auto_deploy_to_production: bool,
}

impl Default for DevelopmentBoundaries {
    fn default() -> Self {
        Self {
            max_builds_per_day: 20,
            max_lines_changed: 500,
            max_files_changed: 20,
            restricted_paths: vec![
                ".env".into(),
                "secrets/".into(),
                ".github/workflows/".into(),
                "id_rsa".into(),
                "keypair.json".into(),
            ],
            auto_deploy_to_production: false,
        }
    }
}

// ── Trading ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TradingBoundaries {
    pub max_trades_per_day: u32,
    /// Bots allowed to trade. Empty means any bot.
    pub allowed_bots: Vec<String>,
    pub allowed_tokens: Vec<String>,
    /// Unlisted tokens need sign-off instead of passing silently.
    pub require_approval_for_new_tokens: bool,
    /// Maximum share of the portfolio (percent) for a single position.
    pub max_position_percent: f64,
    /// Maximum value (USD) of a single trade.
    pub max_single_trade: f64,
}

impl Default for TradingBoundaries {
    fn default() -> Self {
        Self {
            max_trades_per_day: 10,
            allowed_bots: vec!["dca".into(), "grid".into(), "rebalancer".into()],
            allowed_tokens: vec!["SOL".into(), "USDC".into(), "BTC".into(), "ETH".into()],
            require_approval_for_new_tokens: true,
            max_position_percent: 20.0,
            max_single_trade: 100.0,
        }
    }
}

// ── Time of day ────────────────────────────────────────────────

/// Hours are UTC, 0-23. Windows may wrap midnight (start > end).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeBoundaries {
    pub quiet_hours_start: u32,
    pub quiet_hours_end: u32,
    pub active_hours_start: u32,
    pub active_hours_end: u32,
}

impl Default for TimeBoundaries {
    fn default() -> Self {
        Self {
            quiet_hours_start: 23,
            quiet_hours_end: 7,
            active_hours_start: 8,
            active_hours_end: 22,
        }
    }
}

impl TimeBoundaries {
    pub fn is_quiet_hour(&self, hour: u32) -> bool {
        in_window(hour, self.quiet_hours_start, self.quiet_hours_end)
    }

    pub fn is_active_hour(&self, hour: u32) -> bool {
        in_window(hour, self.active_hours_start, self.active_hours_end)
    }
}

/// Half-open `[start, end)` window over a 24h clock. Equal bounds mean an empty window.
fn in_window(hour: u32, start: u32, end: u32) -> bool {
    if start <= end {
        hour >= start && hour < end
    } else {
        hour >= start || hour < end
    }
}

// ── Validation ─────────────────────────────────────────────────

impl Boundaries {
    /// Validation issues for the boundary sections alone. Used at load time and
    /// before a runtime boundary update is committed.
    pub fn issues(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        // ── Financial ───
        let fin = &self.financial;
        if fin.max_auto_expense > fin.max_queued_expense {
            warnings.push(ConfigWarning {
                field: "boundaries.financial.max_auto_expense".into(),
                message: format!(
                    "auto expense cap ${:.2} is above the queued ceiling ${:.2}",
                    fin.max_auto_expense, fin.max_queued_expense
                ),
                severity: WarningSeverity::Error,
                hint: Some("max_auto_expense must be <= max_queued_expense".into()),
            });
        }
        if fin.max_daily_spend <= 0.0 {
            warnings.push(ConfigWarning {
                field: "boundaries.financial.max_daily_spend".into(),
                message: "daily spend cap is zero or negative; every paid action will violate it".into(),
                severity: WarningSeverity::Warning,
                hint: Some("Set to e.g. 200.0".into()),
            });
        } else if fin.max_daily_spend > 10_000.0 {
            warnings.push(ConfigWarning {
                field: "boundaries.financial.max_daily_spend".into(),
                message: format!("daily spend cap is ${:.2}, which is very high", fin.max_daily_spend),
                severity: WarningSeverity::Warning,
                hint: Some("Consider a lower limit to bound runaway agents".into()),
            });
        }
        if !(0.0..=1.0).contains(&fin.daily_spend_warning_ratio) {
            warnings.push(ConfigWarning {
                field: "boundaries.financial.daily_spend_warning_ratio".into(),
                message: format!("ratio {} is outside 0.0-1.0", fin.daily_spend_warning_ratio),
                severity: WarningSeverity::Error,
                hint: Some("Default is 0.8".into()),
            });
        }

        // ── Trading ───
        if self.trading.max_position_percent > 100.0 {
            warnings.push(ConfigWarning {
                field: "boundaries.trading.max_position_percent".into(),
                message: "position cap above 100% never triggers".into(),
                severity: WarningSeverity::Warning,
                hint: None,
            });
        }

        // ── Deployment ───
        if self.development.auto_deploy_to_production {
            warnings.push(ConfigWarning {
                field: "boundaries.development.auto_deploy_to_production".into(),
                message: "production deploys are not gated".into(),
                severity: WarningSeverity::Warning,
                hint: Some("Leave disabled unless a separate release gate exists".into()),
            });
        }

        // ── Time windows ───
        let time = &self.time;
        for (field, hour) in [
            ("quiet_hours_start", time.quiet_hours_start),
            ("quiet_hours_end", time.quiet_hours_end),
            ("active_hours_start", time.active_hours_start),
            ("active_hours_end", time.active_hours_end),
        ] {
            if hour > 23 {
                warnings.push(ConfigWarning {
                    field: format!("boundaries.time.{}", field),
                    message: format!("hour {} is outside 0-23", hour),
                    severity: WarningSeverity::Error,
                    hint: None,
                });
            }
        }

        warnings
    }

    /// The first error-severity issue, if any.
    pub fn first_error(&self) -> Option<ConfigWarning> {
        self.issues()
            .into_iter()
            .find(|w| w.severity == WarningSeverity::Error)
    }
}
