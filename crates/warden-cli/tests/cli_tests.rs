#[cfg(test)]
mod tests {
    use clap::Parser;
    use std::io::Write;

    use warden_cli::Cli;
    use warden_cli::input::{parse_actions, parse_pipeline, read_source};
    use warden_core::{Category, WardenError};

    // ── Argument parsing ───────────────────────────────────────

    #[test]
    fn test_parse_route_flags() {
        let cli = Cli::try_parse_from([
            "warden", "route", "actions.json", "--level", "3", "--execute", "--json",
        ]);
        assert!(cli.is_ok());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        assert!(Cli::try_parse_from(["warden", "doctor", "--verbose"]).is_ok());
        assert!(Cli::try_parse_from(["warden", "config", "--json", "-c", "warden.toml"]).is_ok());
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["warden", "doctor", "-v", "-q"]).is_err());
    }

    #[test]
    fn test_route_requires_file() {
        assert!(Cli::try_parse_from(["warden", "route"]).is_err());
    }

    // ── Input files ────────────────────────────────────────────

    #[test]
    fn test_parse_single_action() {
        let actions = parse_actions(
            r#"{ "id": "a1", "type": "tweet", "category": "content", "description": "hello" }"#,
        )
        .unwrap();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].category, Category::Content);
    }

    #[test]
    fn test_parse_action_list() {
        let raw = serde_json::json!([
            { "id": "a1", "type": "tweet", "category": "content" },
            { "id": "a2", "type": "dca_buy", "category": "trading",
              "metadata": { "estimatedValue": 20, "reversible": true } }
        ])
        .to_string();
        let actions = parse_actions(&raw).unwrap();
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[1].metadata.estimated_value, Some(20.0));
    }

    #[test]
    fn test_parse_invalid_action() {
        let err = parse_actions(r#"{ "id": "a1", "category": "gardening" }"#).unwrap_err();
        assert!(matches!(err, WardenError::Serialization(_)));
    }

    #[test]
    fn test_read_pipeline_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "id": "p1", "name": "digest", "steps": [ {{ "id": "s1", "tool": "research_agent" }} ] }}"#
        )
        .unwrap();
        let raw = read_source(file.path()).unwrap();
        let pipeline = parse_pipeline(&raw).unwrap();
        assert_eq!(pipeline.steps.len(), 1);
        assert_eq!(pipeline.steps[0].tool, "research_agent");
    }

    #[test]
    fn test_read_missing_file() {
        let err = read_source(std::path::Path::new("/nonexistent/warden/actions.json")).unwrap_err();
        assert!(matches!(err, WardenError::Io(_)));
    }
}
