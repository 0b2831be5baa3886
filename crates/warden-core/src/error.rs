use thiserror::Error;

/// Unified error type for the Warden engine.
///
/// Classification and routing never fail; these variants cover configuration,
/// administrative updates, and malformed pipelines.
#[derive(Error, Debug)]
pub enum WardenError {
    // ── Config errors ──────────────────────────────────────────
    #[error("config error: {0}")]
    Config(String),

    #[error("config validation failed: {field}: {reason}")]
    ConfigValidation { field: String, reason: String },

    // ── Autonomy errors ────────────────────────────────────────
    #[error("invalid autonomy level {0}: expected 1-4")]
    InvalidAutonomyLevel(u8),

    // ── Boundary errors ────────────────────────────────────────
    #[error("boundary update rejected: {0}")]
    BoundaryUpdate(String),

    // ── Pipeline errors ────────────────────────────────────────
    #[error("pipeline dependency cycle detected at step '{step}'")]
    PipelineCycle { step: String },

    #[error("duplicate pipeline step id: {0}")]
    DuplicateStep(String),

    // ── Generic wrappers ───────────────────────────────────────
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, WardenError>;
