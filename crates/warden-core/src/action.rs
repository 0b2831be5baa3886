use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use uuid::Uuid;

/// The engine an action originates from. Category-specific boundary checks
/// dispatch on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Trading,
    Content,
    Build,
    Deployment,
    Configuration,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Self::Trading,
        Self::Content,
        Self::Build,
        Self::Deployment,
        Self::Configuration,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trading => "trading",
            Self::Content => "content",
            Self::Build => "build",
            Self::Deployment => "deployment",
            Self::Configuration => "configuration",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata attached by the proposing agent. Every field is optional; missing
/// values are scored conservatively rather than rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ActionMetadata {
    /// Estimated monetary value in USD.
    pub estimated_value: Option<f64>,
    /// Whether the action can be rolled back.
    pub reversible: Option<bool>,
    pub urgency: Urgency,
}

/// A proposed unit of work submitted for governance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub id: String,
    /// Free-form type tag, e.g. "dca_buy", "tweet", "blog_post".
    #[serde(rename = "type")]
    pub action_type: String,
    pub category: Category,
    #[serde(default)]
    pub description: String,
    /// Open-schema parameters supplied by the proposing agent.
    #[serde(default)]
    pub params: Map<String, Value>,
    #[serde(default)]
    pub metadata: ActionMetadata,
}

impl Action {
    pub fn new(category: Category, action_type: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            action_type: action_type.into(),
            category,
            description: description.into(),
            params: Map::new(),
            metadata: ActionMetadata::default(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn with_value(mut self, usd: f64) -> Self {
        self.metadata.estimated_value = Some(usd);
        self
    }

    pub fn with_reversible(mut self, reversible: bool) -> Self {
        self.metadata.reversible = Some(reversible);
        self
    }

    pub fn with_urgency(mut self, urgency: Urgency) -> Self {
        self.metadata.urgency = urgency;
        self
    }

    /// String parameter, if present and a string.
    pub fn param_str(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(Value::as_str)
    }

    /// Numeric parameter. Numeric strings are accepted too since agents are
    /// not consistent about it.
    pub fn param_f64(&self, key: &str) -> Option<f64> {
        match self.params.get(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// List-of-strings parameter. A single string is treated as a one-element list.
    pub fn param_str_list(&self, key: &str) -> Vec<String> {
        match self.params.get(key) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            Some(Value::String(s)) => vec![s.clone()],
            _ => Vec::new(),
        }
    }

    pub fn estimated_value(&self) -> f64 {
        self.metadata.estimated_value.unwrap_or(0.0)
    }

    /// Rollback availability. Unknown reversibility counts as irreversible.
    pub fn is_reversible(&self) -> bool {
        self.metadata.reversible.unwrap_or(false)
    }
}
