use clap::{Parser, Subcommand};
use console::style;
use std::path::PathBuf;

use warden_config::{ConfigLoader, WardenConfig, WarningSeverity};
use warden_core::{Result, RiskLevel, WardenError};
use warden_governance::AutonomyLevel;

mod pipeline;
mod route;

/// Warden: autonomous action governance engine
#[derive(Parser)]
#[command(name = "warden", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to warden.toml config file
    #[arg(short, long, global = true, env = "WARDEN_CONFIG")]
    config: Option<PathBuf>,

    /// Log level override (e.g. debug, info, warn, error)
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all log output (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Route actions and print the resulting decisions
    Route {
        /// JSON file with one action or a list of actions ("-" for stdin)
        file: PathBuf,
        /// Autonomy level override (1-4)
        #[arg(long)]
        level: Option<u8>,
        /// Record usage for auto-executed actions so later ones in the batch see it
        #[arg(long)]
        execute: bool,
        /// Print the events published for each decision
        #[arg(long)]
        events: bool,
        /// Also run the six-hats evaluation
        #[arg(long)]
        hats: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the risk assessment for actions without routing them
    Classify {
        /// JSON file with one action or a list of actions ("-" for stdin)
        file: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Classify a multi-step pipeline
    Pipeline {
        /// JSON pipeline definition ("-" for stdin)
        file: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run the six-hats evaluation on actions
    Hats {
        /// JSON file with one action or a list of actions ("-" for stdin)
        file: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the effective configuration
    Config {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Audit the configuration for risky settings
    Doctor,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        // Load config first so we can use it for log format
        let config_loader = ConfigLoader::load(self.config.as_deref())?;
        let config = config_loader.get();

        // Resolve log level: --verbose > --quiet > --log-level > config
        let log_level = if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            self.log_level.as_deref().unwrap_or(&config.logging.level)
        };
        init_tracing(&config.logging.format, log_level);

        match self.command {
            Commands::Route {
                file,
                level,
                execute,
                events,
                hats,
                json,
            } => route::cmd_route(
                &config,
                &file,
                route::RouteOptions {
                    level,
                    execute,
                    events,
                    hats,
                    json,
                },
            ),
            Commands::Classify { file, json } => route::cmd_classify(&config, &file, json),
            Commands::Pipeline { file, json } => pipeline::cmd_pipeline(&config, &file, json),
            Commands::Hats { file, json } => route::cmd_hats(&config, &file, json),
            Commands::Config { json } => Self::cmd_config(&config, json),
            Commands::Doctor => Self::cmd_doctor(&config, &config_loader),
        }
    }

    fn cmd_config(config: &WardenConfig, json: bool) -> Result<()> {
        if json {
            println!("{}", serde_json::to_string_pretty(config)?);
        } else {
            println!(
                "{}",
                toml::to_string_pretty(config).map_err(|e| WardenError::Config(e.to_string()))?
            );
        }
        Ok(())
    }

    fn cmd_doctor(config: &WardenConfig, loader: &ConfigLoader) -> Result<()> {
        println!("{}", style("Warden Doctor: configuration audit").bold());
        println!("  config: {}", loader.path().display());
        println!();

        let issues = config.issues();

        let mut error_count = 0;
        let mut warn_count = 0;
        let mut info_count = 0;
        for w in &issues {
            match w.severity {
                WarningSeverity::Warning => {
                    warn_count += 1;
                    println!("  {}", style(w).yellow());
                }
                WarningSeverity::Info => {
                    info_count += 1;
                    println!("  {}", style(w).cyan());
                }
                WarningSeverity::Error => {
                    error_count += 1;
                    println!("  {}", style(w).red());
                }
            }
        }

        // Doctor-specific checks beyond validation
        let b = &config.boundaries;
        if b.trading.allowed_bots.is_empty() {
            println!("  {} boundaries.trading.allowed_bots is empty: any bot may trade", style("hint").cyan());
            info_count += 1;
        }
        if b.content.restricted_topics.is_empty() {
            println!("  {} boundaries.content.restricted_topics is empty", style("hint").cyan());
            info_count += 1;
        }
        if b.development.restricted_paths.is_empty() {
            println!("  {} boundaries.development.restricted_paths is empty", style("hint").cyan());
            info_count += 1;
        }
        let t = &b.time;
        if t.quiet_hours_start == t.quiet_hours_end {
            println!("  {} boundaries.time: quiet hours window is empty", style("hint").cyan());
            info_count += 1;
        }

        println!();
        println!(
            "  autonomy level {} ({}), thresholds safe<={} low<={} medium<={} high<={}",
            config.autonomy.level,
            AutonomyLevel::from_u8(config.autonomy.level).description(),
            config.risk.thresholds.safe,
            config.risk.thresholds.low,
            config.risk.thresholds.medium,
            config.risk.thresholds.high,
        );
        println!(
            "  {} errors, {} warnings, {} suggestions",
            style(error_count).red(),
            style(warn_count).yellow(),
            style(info_count).cyan()
        );
        match issues.into_iter().find(|w| w.severity == WarningSeverity::Error) {
            Some(first) => Err(WardenError::ConfigValidation {
                field: first.field,
                reason: first.message,
            }),
            None => Ok(()),
        }
    }
}

fn init_tracing(format: &str, level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    if format == "json" {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
}

pub(crate) fn styled_level(level: RiskLevel) -> console::StyledObject<&'static str> {
    let s = style(level.as_str());
    match level {
        RiskLevel::Safe => s.green(),
        RiskLevel::Low => s.cyan(),
        RiskLevel::Medium => s.yellow(),
        RiskLevel::High => s.red(),
        RiskLevel::Critical => s.red().bold(),
    }
}
