use serde::{Deserialize, Serialize};
use std::fmt;

/// Per-calendar-day usage counters, keyed by `YYYY-MM-DD` (UTC).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyUsage {
    pub date: String,
    pub trades: u32,
    pub content_posts: u32,
    /// Subset of `content_posts` that were blog posts (weekly cap).
    #[serde(default)]
    pub blog_posts: u32,
    pub builds: u32,
    /// Cumulative spend in USD.
    pub spend: f64,
}

impl DailyUsage {
    pub fn new(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            trades: 0,
            content_posts: 0,
            blog_posts: 0,
            builds: 0,
            spend: 0.0,
        }
    }
}

/// How a hard violation should be routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// Production deployment gate. Always escalated.
    Production,
    /// The action was classified critical.
    CriticalRisk,
    /// A numeric cap would be exceeded; a human may still approve it.
    Limit,
    /// Policy requires sign-off (e.g. an unlisted token).
    ApprovalRequired,
    /// Not permitted at all (restricted topic, unlisted bot, restricted path).
    Forbidden,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub kind: ViolationKind,
    pub message: String,
}

impl Violation {
    pub fn new(kind: ViolationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Result of checking an action against the configured boundaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundaryCheckResult {
    /// False iff there is at least one violation. Warnings never flip this.
    pub passed: bool,
    pub violations: Vec<Violation>,
    pub warnings: Vec<String>,
    /// Usage snapshot the check was evaluated against.
    pub usage: DailyUsage,
}

impl BoundaryCheckResult {
    pub fn new(violations: Vec<Violation>, warnings: Vec<String>, usage: DailyUsage) -> Self {
        Self {
            passed: violations.is_empty(),
            violations,
            warnings,
            usage,
        }
    }

    pub fn violation_messages(&self) -> Vec<String> {
        self.violations.iter().map(|v| v.message.clone()).collect()
    }

    pub fn has_kind(&self, kind: ViolationKind) -> bool {
        self.violations.iter().any(|v| v.kind == kind)
    }
}
