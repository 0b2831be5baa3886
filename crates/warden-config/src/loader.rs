use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use warden_core::{Result, WardenError};

use crate::schema::{WardenConfig, WarningSeverity};

/// Loads and reloads the Warden configuration.
pub struct ConfigLoader {
    config: Arc<RwLock<WardenConfig>>,
    config_path: PathBuf,
}

impl ConfigLoader {
    /// Resolve the config path: explicit path > WARDEN_CONFIG env > ~/.warden/warden.toml
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        if let Some(p) = explicit {
            return p.to_path_buf();
        }
        if let Ok(p) = std::env::var("WARDEN_CONFIG") {
            return PathBuf::from(p);
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".warden")
            .join("warden.toml")
    }

    /// Load the config from disk, falling back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = Self::resolve_path(path);
        let config = if config_path.exists() {
            info!(?config_path, "loading configuration");
            Self::parse_file(&config_path)?
        } else {
            warn!(?config_path, "config file not found, using defaults");
            WardenConfig::default()
        };

        let config = Self::apply_env_overrides(config);
        Self::check(&config)?;

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            config_path,
        })
    }

    /// Parse a TOML string directly, applying validation but not env overrides.
    pub fn from_toml(raw: &str) -> Result<WardenConfig> {
        let config = toml::from_str::<WardenConfig>(raw)
            .map_err(|e| WardenError::Config(format!("failed to parse config: {}", e)))?;
        Self::check(&config)?;
        Ok(config)
    }

    /// Get a read snapshot of the current config.
    pub fn get(&self) -> WardenConfig {
        self.config.read().clone()
    }

    /// Get a shared reference for subscription.
    pub fn shared(&self) -> Arc<RwLock<WardenConfig>> {
        Arc::clone(&self.config)
    }

    /// Path the config was (or would have been) read from.
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Reload the config from disk. The previous config is kept on any error.
    pub fn reload(&self) -> Result<()> {
        if !self.config_path.exists() {
            return Err(WardenError::Config(format!(
                "config file not found: {}",
                self.config_path.display()
            )));
        }
        let new_config = Self::apply_env_overrides(Self::parse_file(&self.config_path)?);
        Self::check(&new_config)?;
        *self.config.write() = new_config;
        info!("configuration reloaded");
        Ok(())
    }

    fn parse_file(path: &Path) -> Result<WardenConfig> {
        let raw = std::fs::read_to_string(path)?;
        toml::from_str::<WardenConfig>(&raw).map_err(|e| {
            WardenError::Config(format!("failed to parse {}: {}", path.display(), e))
        })
    }

    /// Validate, logging warnings and failing on the first error-severity issue.
    fn check(config: &WardenConfig) -> Result<()> {
        let issues = config.issues();
        if let Some(first) = issues.iter().find(|w| w.severity == WarningSeverity::Error) {
            return Err(WardenError::ConfigValidation {
                field: first.field.clone(),
                reason: first.message.clone(),
            });
        }
        for w in &issues {
            warn!("{}", w);
        }
        Ok(())
    }

    /// Apply env var overrides (WARDEN_AUTONOMY_LEVEL, WARDEN_LOG_LEVEL, etc.)
    fn apply_env_overrides(config: WardenConfig) -> WardenConfig {
        Self::apply_overrides_from(config, |key| std::env::var(key).ok())
    }

    /// Apply overrides using `lookup` to resolve variable names. Values that
    /// fail to parse are ignored and the file value is kept.
    pub fn apply_overrides_from(
        mut config: WardenConfig,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> WardenConfig {
        if let Some(v) = lookup("WARDEN_AUTONOMY_LEVEL") {
            match v.parse::<u8>() {
                Ok(level) => config.autonomy.level = level,
                Err(_) => warn!(value = %v, "ignoring unparsable WARDEN_AUTONOMY_LEVEL"),
            }
        }
        if let Some(v) = lookup("WARDEN_LOG_LEVEL") {
            config.logging.level = v;
        }
        if let Some(v) = lookup("WARDEN_DAILY_SPEND_LIMIT") {
            match v.parse::<f64>() {
                Ok(limit) => config.boundaries.financial.max_daily_spend = limit,
                Err(_) => warn!(value = %v, "ignoring unparsable WARDEN_DAILY_SPEND_LIMIT"),
            }
        }
        if let Some(v) = lookup("WARDEN_AUTO_DEPLOY_PRODUCTION") {
            match v.parse::<bool>() {
                Ok(flag) => config.boundaries.development.auto_deploy_to_production = flag,
                Err(_) => warn!(value = %v, "ignoring unparsable WARDEN_AUTO_DEPLOY_PRODUCTION"),
            }
        }
        config
    }
}
