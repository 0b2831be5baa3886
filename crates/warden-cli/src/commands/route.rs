use console::style;
use serde_json::json;
use std::path::Path;

use warden_config::WardenConfig;
use warden_core::{Action, Decision, DecisionOutcome, Result, RiskAssessment};
use warden_governance::{Consensus, DecisionRouter, HatVerdict, RiskClassifier, SixHatsEvaluator, SixHatsResult};

use super::styled_level;
use crate::input::{parse_actions, read_source};

pub(crate) struct RouteOptions {
    pub level: Option<u8>,
    pub execute: bool,
    pub events: bool,
    pub hats: bool,
    pub json: bool,
}

pub(crate) fn cmd_route(config: &WardenConfig, file: &Path, opts: RouteOptions) -> Result<()> {
    let actions = parse_actions(&read_source(file)?)?;
    let router = DecisionRouter::from_config(config)?;
    if let Some(level) = opts.level {
        router.set_autonomy_level(level)?;
    }
    let mut rx = router.subscribe();

    let mut results = Vec::with_capacity(actions.len());
    for action in &actions {
        let (decision, hats) = if opts.hats {
            let (d, h) = router.evaluate_with_hats(action);
            (d, Some(h))
        } else {
            (router.route(action), None)
        };
        if opts.execute && decision.outcome == DecisionOutcome::AutoExecute {
            router.record_execution(action);
        }

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event.kind());
        }

        if !opts.json {
            print_decision(&decision);
            if let Some(h) = &hats {
                print_hats(h);
            }
            if opts.events {
                let names: Vec<String> = events.iter().map(|k| k.to_string()).collect();
                println!("  {} {}", style("events:").dim(), names.join(", "));
            }
            println!();
        }
        results.push((decision, hats, events));
    }

    if opts.json {
        let out: Vec<_> = results
            .iter()
            .map(|(decision, hats, events)| {
                let mut entry = json!({ "decision": decision });
                if let Some(h) = hats {
                    entry["hats"] = json!(h);
                }
                if opts.events {
                    entry["events"] = json!(events);
                }
                entry
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else if actions.len() > 1 {
        print_summary(results.iter().map(|(d, _, _)| d));
        if opts.execute {
            let usage = router.boundaries().usage_today();
            println!(
                "usage {}: trades {}, posts {}, builds {}, spend ${:.2}",
                usage.date, usage.trades, usage.content_posts, usage.builds, usage.spend
            );
        }
    }
    Ok(())
}

pub(crate) fn cmd_classify(config: &WardenConfig, file: &Path, json: bool) -> Result<()> {
    let actions = parse_actions(&read_source(file)?)?;
    let classifier = RiskClassifier::new(config.risk.clone());
    let assessments: Vec<RiskAssessment> = actions.iter().map(|a| classifier.classify(a)).collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&assessments)?);
        return Ok(());
    }
    for (action, assessment) in actions.iter().zip(&assessments) {
        print_header(action);
        print_assessment(assessment);
        println!();
    }
    Ok(())
}

pub(crate) fn cmd_hats(config: &WardenConfig, file: &Path, json: bool) -> Result<()> {
    let actions = parse_actions(&read_source(file)?)?;
    let classifier = RiskClassifier::new(config.risk.clone());
    let evaluator = SixHatsEvaluator::new();
    let results: Vec<SixHatsResult> = actions
        .iter()
        .map(|a| evaluator.evaluate(a, Some(&classifier.classify(a))))
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }
    for (action, result) in actions.iter().zip(&results) {
        print_header(action);
        print_hats(result);
        println!();
    }
    Ok(())
}

// ── Rendering ──────────────────────────────────────────────────

fn print_header(action: &Action) {
    println!(
        "{} {}  {}/{}  {}",
        style("●").bold(),
        style(&action.id).bold(),
        action.category,
        action.action_type,
        style(&action.description).dim()
    );
}

fn print_assessment(a: &RiskAssessment) {
    println!("  risk: {} ({:.2})", styled_level(a.level), a.score);
    for f in &a.factors {
        let marker = if f.exceeded { style("!").red() } else { style(" ") };
        println!(
            "   {} {:<16} {:>6.1} x {:.2}  {}",
            marker,
            f.name,
            f.value,
            f.weight,
            style(&f.reason).dim()
        );
    }
}

fn print_decision(d: &Decision) {
    print_header(&d.action);
    let outcome = style(d.outcome.as_str());
    let outcome = match d.outcome {
        DecisionOutcome::AutoExecute => outcome.green(),
        DecisionOutcome::QueueApproval => outcome.yellow(),
        DecisionOutcome::Escalate => outcome.magenta(),
        DecisionOutcome::Reject => outcome.red(),
    };
    println!(
        "  outcome: {}  risk: {} ({:.2})  level: L{}",
        outcome.bold(),
        styled_level(d.assessment.level),
        d.assessment.score,
        d.autonomy_level
    );
    println!("  reason: {}", d.reason);
    for v in &d.boundary_check.violations {
        println!("  {} {}", style("violation:").red(), v.message);
    }
    for w in &d.boundary_check.warnings {
        println!("  {} {}", style("warning:").yellow(), w);
    }
    if !d.rollback_available {
        println!("  {}", style("no rollback available").dim());
    }
}

fn print_hats(result: &SixHatsResult) {
    let consensus = style(format!("{:?}", result.consensus));
    let consensus = match result.consensus {
        Consensus::StrongProceed | Consensus::Proceed => consensus.green(),
        Consensus::Caution | Consensus::Mixed => consensus.yellow(),
        Consensus::Stop => consensus.red(),
    };
    println!("  six hats: {} (score {:.2})", consensus.bold(), result.overall_score);
    for p in result.perspectives.values() {
        let verdict = style(format!("{:?}", p.verdict).to_lowercase());
        let verdict = match p.verdict {
            HatVerdict::Proceed => verdict.green(),
            HatVerdict::Review => verdict.cyan(),
            HatVerdict::Caution => verdict.yellow(),
            HatVerdict::Stop => verdict.red(),
        };
        println!("   {:<7} {:<8} {:>5.1}  {}", p.hat.as_str(), verdict, p.score, style(&p.analysis).dim());
    }
    println!("  {}", result.recommendation);
}

fn print_summary<'a>(decisions: impl Iterator<Item = &'a Decision>) {
    let mut counts = [0usize; 4];
    for d in decisions {
        let idx = match d.outcome {
            DecisionOutcome::AutoExecute => 0,
            DecisionOutcome::QueueApproval => 1,
            DecisionOutcome::Escalate => 2,
            DecisionOutcome::Reject => 3,
        };
        counts[idx] += 1;
    }
    println!(
        "{} auto-executed, {} queued, {} escalated, {} rejected",
        style(counts[0]).green(),
        style(counts[1]).yellow(),
        style(counts[2]).magenta(),
        style(counts[3]).red()
    );
}
