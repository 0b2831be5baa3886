use chrono::{Duration, NaiveDate, Timelike};
use parking_lot::RwLock;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

use warden_config::Boundaries;
use warden_core::{
    Action, BoundaryCheckResult, Category, DailyUsage, Result, RiskLevel, Urgency, Violation,
    ViolationKind, WardenError,
};

use crate::clock::{Clock, SystemClock, day_key};
use crate::store::{MemoryUsageStore, UsageStore};

/// Enforces configured boundaries against per-day usage.
///
/// Owns the only mutable shared state of the engine. Boundaries and the usage
/// store sit behind one lock, so checks, usage records, and boundary updates
/// are serialized. `check` never mutates usage; only `record_usage` does, and
/// callers must invoke it exactly once per action that actually ran.
pub struct BoundaryChecker {
    state: RwLock<CheckerState>,
    clock: Arc<dyn Clock>,
}

struct CheckerState {
    boundaries: Boundaries,
    store: Box<dyn UsageStore>,
}

/// Accumulates the outcome of the individual checks.
#[derive(Default)]
struct Findings {
    violations: Vec<Violation>,
    warnings: Vec<String>,
}

impl Findings {
    fn violation(&mut self, kind: ViolationKind, message: String) {
        self.violations.push(Violation::new(kind, message));
    }

    fn warning(&mut self, message: String) {
        self.warnings.push(message);
    }
}

impl BoundaryChecker {
    pub fn new(boundaries: Boundaries) -> Self {
        Self::with_store(boundaries, Box::new(MemoryUsageStore::new()), Arc::new(SystemClock))
    }

    pub fn with_store(boundaries: Boundaries, store: Box<dyn UsageStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            state: RwLock::new(CheckerState { boundaries, store }),
            clock,
        }
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }

    /// Check an action against every applicable boundary.
    pub fn check(&self, action: &Action, risk_level: RiskLevel) -> BoundaryCheckResult {
        let now = self.clock.now();
        let today = day_key(now);
        let state = self.state.read();
        let usage = state.store.get(&today).unwrap_or_else(|| DailyUsage::new(&today));
        let b = &state.boundaries;

        let mut findings = Findings::default();

        if risk_level == RiskLevel::Critical {
            findings.violation(
                ViolationKind::CriticalRisk,
                "Critical risk level requires human review".into(),
            );
        }

        match action.category {
            Category::Trading => check_trading(b, action, &usage, &mut findings),
            Category::Content => {
                let weekly_blogs = weekly_blog_posts(state.store.as_ref(), &today);
                check_content(b, action, &usage, weekly_blogs, &mut findings)
            }
            Category::Build => check_build(b, action, &usage, &mut findings),
            Category::Deployment => check_deployment(b, action, &mut findings),
            Category::Configuration => {}
        }

        check_financial(b, action, &usage, &mut findings);
        check_time(b, action, now.hour(), &mut findings);

        for v in &findings.violations {
            warn!(action_id = %action.id, kind = ?v.kind, "{}", v.message);
        }
        debug!(
            action_id = %action.id,
            violations = findings.violations.len(),
            warnings = findings.warnings.len(),
            "boundary check complete"
        );

        BoundaryCheckResult::new(findings.violations, findings.warnings, usage)
    }

    /// Count an executed action against today's usage.
    pub fn record_usage(&self, action: &Action) {
        let today = self.clock.today();
        let mut state = self.state.write();
        let mut usage = state.store.get(&today).unwrap_or_else(|| DailyUsage::new(&today));

        match action.category {
            Category::Trading => usage.trades += 1,
            Category::Content => {
                usage.content_posts += 1;
                if is_blog_post(action) {
                    usage.blog_posts += 1;
                }
            }
            Category::Build => usage.builds += 1,
            Category::Deployment | Category::Configuration => {}
        }

        let value = action.estimated_value();
        if value.is_finite() && value > 0.0 {
            usage.spend += value;
        }

        info!(
            action_id = %action.id,
            category = %action.category,
            date = %today,
            trades = usage.trades,
            content_posts = usage.content_posts,
            builds = usage.builds,
            spend = usage.spend,
            "recorded usage"
        );
        state.store.put(usage);
    }

    /// Apply a JSON merge patch (any depth) to the current boundaries.
    /// `null` resets a field to its default. Nothing changes if the result fails
    /// to parse or fails boundary validation.
    pub fn update_boundaries(&self, patch: &Value) -> Result<()> {
        let mut state = self.state.write();
        let mut merged = serde_json::to_value(&state.boundaries)?;
        merge_patch(&mut merged, patch);
        let updated: Boundaries = serde_json::from_value(merged)
            .map_err(|e| WardenError::BoundaryUpdate(e.to_string()))?;
        if let Some(issue) = updated.first_error() {
            warn!(field = %issue.field, "rejected boundary update");
            return Err(WardenError::BoundaryUpdate(format!("{}: {}", issue.field, issue.message)));
        }
        state.boundaries = updated;
        info!("boundaries updated");
        Ok(())
    }

    pub fn set_boundaries(&self, boundaries: Boundaries) {
        self.state.write().boundaries = boundaries;
        info!("boundaries replaced");
    }

    pub fn boundaries(&self) -> Boundaries {
        self.state.read().boundaries.clone()
    }

    /// Today's counters. A day with no recorded usage reads as zero.
    pub fn usage_today(&self) -> DailyUsage {
        self.usage_for(&self.clock.today())
    }

    pub fn usage_for(&self, date: &str) -> DailyUsage {
        self.state.read().store.get(date).unwrap_or_else(|| DailyUsage::new(date))
    }

    /// Every stored day, oldest first.
    pub fn usage_history(&self) -> Vec<DailyUsage> {
        let state = self.state.read();
        state
            .store
            .dates()
            .iter()
            .filter_map(|d| state.store.get(d))
            .collect()
    }

    /// Drop the counters for one day.
    pub fn reset_usage(&self, date: &str) {
        if self.state.write().store.remove(date).is_some() {
            info!(date, "usage reset");
        }
    }

    /// Drop every stored day.
    pub fn reset_all_usage(&self) {
        let mut state = self.state.write();
        for date in state.store.dates() {
            state.store.remove(&date);
        }
        info!("all usage reset");
    }

    /// Remove days older than `retain_days` before today. Returns how many were removed.
    pub fn prune_usage(&self, retain_days: u32) -> usize {
        let today = self.clock.now().date_naive();
        let Some(cutoff) = today.checked_sub_signed(Duration::days(i64::from(retain_days))) else {
            return 0;
        };
        let mut state = self.state.write();
        let stale: Vec<String> = state
            .store
            .dates()
            .into_iter()
            .filter(|d| match NaiveDate::parse_from_str(d, "%Y-%m-%d") {
                Ok(day) => day < cutoff,
                Err(_) => false,
            })
            .collect();
        for date in &stale {
            state.store.remove(date);
        }
        if !stale.is_empty() {
            info!(removed = stale.len(), retain_days, "pruned usage history");
        }
        stale.len()
    }
}

// ── Category checks ────────────────────────────────────────────

fn check_trading(b: &Boundaries, action: &Action, usage: &DailyUsage, out: &mut Findings) {
    let t = &b.trading;

    if usage.trades >= t.max_trades_per_day {
        out.violation(
            ViolationKind::Limit,
            format!("Daily trade limit reached ({}/{})", usage.trades, t.max_trades_per_day),
        );
    }

    if let Some(bot) = action.param_str("bot").or_else(|| action.param_str("botType")) {
        if !t.allowed_bots.is_empty() && !contains_ignore_case(&t.allowed_bots, bot) {
            out.violation(
                ViolationKind::Forbidden,
                format!("Bot '{}' is not in the allowed bot list", bot),
            );
        }
    }

    if let Some(token) = action.param_str("token") {
        if !contains_ignore_case(&t.allowed_tokens, token) {
            if t.require_approval_for_new_tokens {
                out.violation(
                    ViolationKind::ApprovalRequired,
                    format!("Token '{}' is not in the allowed token list; new tokens require approval", token),
                );
            } else {
                out.warning(format!("Trading unlisted token '{}'", token));
            }
        }
    }

    if let Some(pct) = action.param_f64("positionPercent") {
        if pct > t.max_position_percent {
            out.violation(
                ViolationKind::Limit,
                format!("Position size {}% exceeds max position {}%", pct, t.max_position_percent),
            );
        }
    }

    let trade_value = action
        .param_f64("amount")
        .or(action.metadata.estimated_value)
        .unwrap_or(0.0);
    if trade_value > t.max_single_trade {
        out.violation(
            ViolationKind::Limit,
            format!("Trade value ${:.2} exceeds max single trade ${:.2}", trade_value, t.max_single_trade),
        );
    }
}

fn check_content(b: &Boundaries, action: &Action, usage: &DailyUsage, weekly_blogs: u32, out: &mut Findings) {
    let c = &b.content;

    if usage.content_posts >= c.max_posts_per_day {
        out.violation(
            ViolationKind::Limit,
            format!("Daily content limit reached ({}/{} posts)", usage.content_posts, c.max_posts_per_day),
        );
    } else if c.max_posts_per_day - usage.content_posts <= c.near_limit_margin {
        out.warning(format!(
            "Approaching daily content limit ({}/{} posts)",
            usage.content_posts, c.max_posts_per_day
        ));
    }

    let text = format!("{} {}", action.description, action.param_str("title").unwrap_or_default()).to_lowercase();
    for topic in &c.restricted_topics {
        if !topic.is_empty() && text.contains(&topic.to_lowercase()) {
            out.violation(
                ViolationKind::Forbidden,
                format!("Content touches restricted topic '{}'", topic),
            );
        }
    }

    if is_blog_post(action) && weekly_blogs >= c.max_blog_posts_per_week {
        out.violation(
            ViolationKind::Limit,
            format!("Weekly blog limit reached ({}/{} posts)", weekly_blogs, c.max_blog_posts_per_week),
        );
    }
}

fn check_build(b: &Boundaries, action: &Action, usage: &DailyUsage, out: &mut Findings) {
    let d = &b.development;

    if usage.builds >= d.max_builds_per_day {
        out.violation(
            ViolationKind::Limit,
            format!("Daily build limit reached ({}/{})", usage.builds, d.max_builds_per_day),
        );
    }

    if let Some(lines) = action.param_f64("linesChanged") {
        if lines > f64::from(d.max_lines_changed) {
            out.violation(
                ViolationKind::Limit,
                format!("Lines changed ({}) exceeds limit of {}", lines, d.max_lines_changed),
            );
        }
    }

    let mut files = action.param_str_list("files");
    files.extend(action.param_str_list("paths"));
    let files_changed = action
        .param_f64("filesChanged")
        .unwrap_or(files.len() as f64);
    if files_changed > f64::from(d.max_files_changed) {
        out.violation(
            ViolationKind::Limit,
            format!("Files changed ({}) exceeds limit of {}", files_changed, d.max_files_changed),
        );
    }

    for file in &files {
        if let Some(restricted) = d.restricted_paths.iter().find(|r| !r.is_empty() && file.contains(r.as_str())) {
            out.violation(
                ViolationKind::Forbidden,
                format!("Build modifies restricted path '{}' (matches '{}')", file, restricted),
            );
        }
    }
}

fn check_deployment(b: &Boundaries, action: &Action, out: &mut Findings) {
    let target = action
        .param_str("target")
        .or_else(|| action.param_str("environment"))
        .unwrap_or_default()
        .to_lowercase();

    match target.as_str() {
        "production" | "prod" if !b.development.auto_deploy_to_production => {
            out.violation(
                ViolationKind::Production,
                "Production deployment requires human approval (auto-deploy to production disabled)".into(),
            );
        }
        "staging" => out.warning("Staging deployment will be applied automatically".into()),
        _ => {}
    }
}

// ── Cross-cutting checks ───────────────────────────────────────

fn check_financial(b: &Boundaries, action: &Action, usage: &DailyUsage, out: &mut Findings) {
    let f = &b.financial;
    let value = action.estimated_value();
    if !value.is_finite() || value <= 0.0 {
        return;
    }

    if value > f.max_queued_expense {
        out.violation(
            ViolationKind::Limit,
            format!("Expense ${:.2} exceeds maximum queued expense ${:.2}", value, f.max_queued_expense),
        );
    } else if value > f.max_auto_expense {
        out.warning(format!(
            "Expense ${:.2} exceeds auto-approve limit ${:.2}",
            value, f.max_auto_expense
        ));
    }

    let projected = usage.spend + value;
    if projected > f.max_daily_spend {
        out.violation(
            ViolationKind::Limit,
            format!("Projected daily spend ${:.2} exceeds daily limit ${:.2}", projected, f.max_daily_spend),
        );
    } else if projected >= f.max_daily_spend * f.daily_spend_warning_ratio {
        out.warning(format!(
            "Projected daily spend ${:.2} is above {:.0}% of daily limit ${:.2}",
            projected,
            f.daily_spend_warning_ratio * 100.0,
            f.max_daily_spend
        ));
    }
}

fn check_time(b: &Boundaries, action: &Action, hour: u32, out: &mut Findings) {
    let t = &b.time;
    if t.is_quiet_hour(hour) && action.metadata.urgency != Urgency::Critical {
        out.warning(format!(
            "Proposed during quiet hours ({:02}:00-{:02}:00 UTC)",
            t.quiet_hours_start, t.quiet_hours_end
        ));
    }
    if action.category == Category::Content && !t.is_active_hour(hour) {
        out.warning(format!(
            "Content outside active hours ({:02}:00-{:02}:00 UTC)",
            t.active_hours_start, t.active_hours_end
        ));
    }
}

// ── Helpers ────────────────────────────────────────────────────

fn is_blog_post(action: &Action) -> bool {
    action.category == Category::Content && action.action_type.to_lowercase().contains("blog")
}

/// Blog posts over the trailing seven days, today included.
fn weekly_blog_posts(store: &dyn UsageStore, today: &str) -> u32 {
    let Ok(day) = NaiveDate::parse_from_str(today, "%Y-%m-%d") else {
        return 0;
    };
    (0..7)
        .map(|back| (day - Duration::days(back)).format("%Y-%m-%d").to_string())
        .filter_map(|key| store.get(&key))
        .map(|u| u.blog_posts)
        .sum()
}

fn contains_ignore_case(list: &[String], needle: &str) -> bool {
    list.iter().any(|item| item.eq_ignore_ascii_case(needle))
}

/// RFC 7386 JSON merge patch.
fn merge_patch(target: &mut Value, patch: &Value) {
    let Value::Object(patch_map) = patch else {
        *target = patch.clone();
        return;
    };
    if !target.is_object() {
        *target = Value::Object(serde_json::Map::new());
    }
    if let Value::Object(target_map) = target {
        for (key, value) in patch_map {
            if value.is_null() {
                target_map.remove(key);
            } else {
                merge_patch(target_map.entry(key.clone()).or_insert(Value::Null), value);
            }
        }
    }
}
