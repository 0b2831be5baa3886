use console::style;
use std::path::Path;

use warden_config::WardenConfig;
use warden_core::Result;
use warden_governance::PipelineRiskClassifier;

use super::styled_level;
use crate::input::{parse_pipeline, read_source};

pub(crate) fn cmd_pipeline(config: &WardenConfig, file: &Path, json: bool) -> Result<()> {
    let pipeline = parse_pipeline(&read_source(file)?)?;
    let classifier = PipelineRiskClassifier::new(&config.pipeline, config.risk.thresholds);
    let assessment = classifier.classify(&pipeline)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&assessment)?);
        return Ok(());
    }

    println!(
        "{} {} {}  ({} steps)",
        style("●").bold(),
        style(&pipeline.name).bold(),
        style(&pipeline.version).dim(),
        pipeline.steps.len()
    );
    println!(
        "  risk: {} ({:.2})  recommendation: {}",
        styled_level(assessment.level),
        assessment.score,
        style(assessment.recommendation.as_str()).bold()
    );
    for f in assessment.factors.iter() {
        let marker = if f.exceeded { style("!").red() } else { style(" ") };
        println!("   {} {:<22} {:>6.1}  {}", marker, f.name, f.value, style(&f.reason).dim());
    }
    println!("  steps:");
    for s in &assessment.step_risks {
        println!("   {:<16} {:<18} {:>5.1}", s.step_id, s.tool, s.score);
        for note in &s.notes {
            println!("     {}", style(note).dim());
        }
    }
    let impact = &assessment.estimated_impact;
    println!(
        "  impact: financial {:?}, visibility {:?}, reversibility {:?}",
        impact.financial, impact.visibility, impact.reversibility
    );
    if !assessment.constraints.is_empty() {
        println!("  constraints:");
        for c in &assessment.constraints {
            println!("   - {}", c);
        }
    }
    Ok(())
}
