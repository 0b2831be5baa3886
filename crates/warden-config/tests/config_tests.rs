#[cfg(test)]
mod tests {
    use warden_config::ConfigLoader;
    use warden_config::*;
    use std::collections::HashMap;
    use warden_core::{Category, WardenError};
    use std::io::Write;

    fn overrides(pairs: &[(&str, &str)], config: WardenConfig) -> WardenConfig {
        let vars: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        ConfigLoader::apply_overrides_from(config, |key| vars.get(key).cloned())
    }

    // ── Default tests ──────────────────────────────────────────

    #[test]
    fn test_warden_config_defaults() {
        let config = WardenConfig::default();
        assert_eq!(config.autonomy.level, 2);
        assert_eq!(config.events.capacity, 1024);
        assert_eq!(config.pipeline.max_steps, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_boundary_defaults() {
        let b = Boundaries::default();
        assert_eq!(b.financial.max_auto_expense, 50.0);
        assert_eq!(b.financial.max_queued_expense, 500.0);
        assert_eq!(b.trading.max_position_percent, 20.0);
        assert!(b.trading.require_approval_for_new_tokens);
        assert!(!b.development.auto_deploy_to_production);
        assert!(b.content.restricted_topics.iter().any(|t| t == "politics"));
    }

    #[test]
    fn test_risk_defaults() {
        let risk = RiskConfig::default();
        assert!((risk.weights.total() - 1.0).abs() < 1e-9);
        assert_eq!(risk.category_baselines.for_category(Category::Content), 10.0);
        assert_eq!(risk.category_baselines.for_category(Category::Deployment), 70.0);
        assert!(risk.thresholds.is_ascending());
    }

    #[test]
    fn test_logging_config_defaults() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "info");
        assert_eq!(config.format, "pretty");
    }

    // ── Time windows ───────────────────────────────────────────

    #[test]
    fn test_quiet_hours_wrap_midnight() {
        let time = TimeBoundaries::default(); // 23 -> 7
        assert!(time.is_quiet_hour(23));
        assert!(time.is_quiet_hour(0));
        assert!(time.is_quiet_hour(6));
        assert!(!time.is_quiet_hour(7));
        assert!(!time.is_quiet_hour(12));
    }

    #[test]
    fn test_active_hours_daytime() {
        let time = TimeBoundaries::default(); // 8 -> 22
        assert!(!time.is_active_hour(7));
        assert!(time.is_active_hour(8));
        assert!(time.is_active_hour(21));
        assert!(!time.is_active_hour(22));
    }

    // ── TOML tests ─────────────────────────────────────────────

    #[test]
    fn test_config_toml_roundtrip() {
        let config = WardenConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let restored: WardenConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(restored.autonomy.level, config.autonomy.level);
        assert_eq!(restored.boundaries, config.boundaries);
    }

    #[test]
    fn test_partial_toml_applies_defaults() {
        let toml_str = r#"
[autonomy]
level = 3

[boundaries.trading]
max_position_percent = 10.0
allowed_tokens = ["SOL"]

[pipeline]
dangerous_combinations = [["scraper_agent", "social_agent"]]

[pipeline.tool_risk]
scraper_agent = 40.0
"#;
        let config: WardenConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.autonomy.level, 3);
        assert_eq!(config.boundaries.trading.max_position_percent, 10.0);
        assert_eq!(config.boundaries.trading.allowed_tokens, vec!["SOL"]);
        // Defaults should fill in
        assert_eq!(config.boundaries.trading.max_trades_per_day, 10);
        assert_eq!(config.boundaries.financial.max_daily_spend, 200.0);
        assert_eq!(config.pipeline.tool_risk["scraper_agent"], 40.0);
        assert_eq!(config.pipeline.dangerous_combinations[0][1], "social_agent");
    }

    // ── Validation tests ───────────────────────────────────────

    #[test]
    fn test_invalid_autonomy_level_is_error() {
        let mut config = WardenConfig::default();
        config.autonomy.level = 0;
        assert!(config.validate().unwrap_err().contains("autonomy.level"));
        config.autonomy.level = 5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_full_autonomy_is_warning() {
        let mut config = WardenConfig::default();
        config.autonomy.level = 4;
        let warnings = config.validate().unwrap();
        assert!(warnings.iter().any(|w| w.field == "autonomy.level"
            && w.severity == WarningSeverity::Warning));
    }

    #[test]
    fn test_auto_expense_above_queued_is_error() {
        let mut config = WardenConfig::default();
        config.boundaries.financial.max_auto_expense = 1000.0;
        let err = config.validate().unwrap_err();
        assert!(err.contains("max_auto_expense"));
    }

    #[test]
    fn test_non_ascending_thresholds_is_error() {
        let mut config = WardenConfig::default();
        config.risk.thresholds.low = 10.0;
        assert!(config.validate().unwrap_err().contains("risk.thresholds"));
    }

    #[test]
    fn test_bad_hour_is_error() {
        let mut config = WardenConfig::default();
        config.boundaries.time.quiet_hours_start = 24;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_toml_validates() {
        match ConfigLoader::from_toml("[autonomy]\nlevel = 9\n") {
            Err(WardenError::ConfigValidation { field, reason }) => {
                assert_eq!(field, "autonomy.level");
                assert!(reason.contains('9'));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
        let config = ConfigLoader::from_toml("[autonomy]\nlevel = 1\n").unwrap();
        assert_eq!(config.autonomy.level, 1);
    }

    #[test]
    fn test_boundary_issues_standalone() {
        let mut boundaries = Boundaries::default();
        assert!(boundaries.first_error().is_none());

        boundaries.development.auto_deploy_to_production = true;
        let issues = boundaries.issues();
        assert!(issues.iter().all(|w| w.severity == WarningSeverity::Warning));
        assert!(boundaries.first_error().is_none());

        boundaries.time.active_hours_end = 25;
        let first = boundaries.first_error().unwrap();
        assert_eq!(first.field, "boundaries.time.active_hours_end");
    }

    // ── Environment overrides ──────────────────────────────────

    #[test]
    fn test_env_overrides_apply() {
        let config = overrides(
            &[
                ("WARDEN_AUTONOMY_LEVEL", "3"),
                ("WARDEN_DAILY_SPEND_LIMIT", "75.5"),
                ("WARDEN_AUTO_DEPLOY_PRODUCTION", "true"),
                ("WARDEN_LOG_LEVEL", "debug"),
            ],
            WardenConfig::default(),
        );
        assert_eq!(config.autonomy.level, 3);
        assert_eq!(config.boundaries.financial.max_daily_spend, 75.5);
        assert!(config.boundaries.development.auto_deploy_to_production);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_unparsable_env_overrides_are_ignored() {
        let mut base = WardenConfig::default();
        base.autonomy.level = 1;
        let config = overrides(
            &[
                ("WARDEN_AUTONOMY_LEVEL", "abc"),
                ("WARDEN_DAILY_SPEND_LIMIT", "lots"),
                ("WARDEN_AUTO_DEPLOY_PRODUCTION", "yes please"),
            ],
            base,
        );
        assert_eq!(config.autonomy.level, 1);
        assert_eq!(
            config.boundaries.financial.max_daily_spend,
            Boundaries::default().financial.max_daily_spend
        );
        assert!(!config.boundaries.development.auto_deploy_to_production);
    }

    #[test]
    fn test_no_env_overrides_keeps_config() {
        let config = overrides(&[], WardenConfig::default());
        assert_eq!(config.autonomy.level, WardenConfig::default().autonomy.level);
        assert_eq!(config.logging.level, WardenConfig::default().logging.level);
    }

    // ── ConfigLoader tests ─────────────────────────────────────

    #[test]
    fn test_config_loader_with_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("warden.toml");
        let mut f = std::fs::File::create(&config_path).unwrap();
        writeln!(
            f,
            r#"
[boundaries.financial]
max_auto_expense = 25.0
max_queued_expense = 250.0

[boundaries.content]
max_posts_per_day = 4

[logging]
format = "json"
"#
        )
        .unwrap();

        let loader = ConfigLoader::load(Some(config_path.as_path())).unwrap();
        let config = loader.get();
        assert_eq!(config.boundaries.financial.max_auto_expense, 25.0);
        assert_eq!(config.boundaries.financial.max_queued_expense, 250.0);
        assert_eq!(config.boundaries.content.max_posts_per_day, 4);
        assert_eq!(config.logging.format, "json");
        assert_eq!(loader.path(), config_path.as_path());
    }

    #[test]
    fn test_config_loader_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loader = ConfigLoader::load(Some(dir.path().join("absent.toml").as_path())).unwrap();
        assert_eq!(loader.get().boundaries, Boundaries::default());
    }

    #[test]
    fn test_config_loader_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("warden.toml");
        std::fs::write(&config_path, "[risk.thresholds]\nsafe = 90.0\n").unwrap();
        assert!(ConfigLoader::load(Some(config_path.as_path())).is_err());
    }

    #[test]
    fn test_config_loader_reload() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("warden.toml");

        std::fs::write(&config_path, "[boundaries.trading]\nmax_trades_per_day = 3\n").unwrap();
        let loader = ConfigLoader::load(Some(config_path.as_path())).unwrap();
        assert_eq!(loader.get().boundaries.trading.max_trades_per_day, 3);

        std::fs::write(&config_path, "[boundaries.trading]\nmax_trades_per_day = 7\n").unwrap();
        loader.reload().unwrap();
        assert_eq!(loader.get().boundaries.trading.max_trades_per_day, 7);
        assert_eq!(loader.shared().read().boundaries.trading.max_trades_per_day, 7);
    }

    #[test]
    fn test_reload_keeps_previous_config_on_error() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("warden.toml");
        std::fs::write(&config_path, "[boundaries.trading]\nmax_trades_per_day = 3\n").unwrap();
        let loader = ConfigLoader::load(Some(config_path.as_path())).unwrap();

        std::fs::write(&config_path, "this is not toml [").unwrap();
        assert!(loader.reload().is_err());
        assert_eq!(loader.get().boundaries.trading.max_trades_per_day, 3);
    }

    // ── JSON roundtrip ─────────────────────────────────────────

    #[test]
    fn test_config_json_roundtrip() {
        let config = WardenConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let restored: WardenConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.boundaries, config.boundaries);
    }
}
