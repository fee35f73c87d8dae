//! `validate-integration` - check declared inter-module data flows.

use anyhow::Result;
use owo_colors::OwoColorize;

use deckhand_core::integration::{IntegrationFlowValidator, IntegrationReport, Severity};

use super::{Inputs, ReportFormat, EXIT_BROKEN_FLOWS, EXIT_OK};

pub fn run(inputs: &Inputs, format: ReportFormat) -> Result<i32> {
    let validator = IntegrationFlowValidator::new(inputs.catalog.clone());
    let report = validator.validate(inputs.flows.flows());

    match format {
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        ReportFormat::Text => print_report(&report),
    }

    Ok(if report.broken_flows > 0 {
        EXIT_BROKEN_FLOWS
    } else {
        EXIT_OK
    })
}

fn print_report(report: &IntegrationReport) {
    println!();
    println!("{}", "Integration Flows".bold());
    println!("────────────────────────────────────────");
    println!();

    println!(
        "  Flows:      {} total, {} working, {} partial, {} broken",
        report.total_flows,
        report.working_flows.to_string().green(),
        report.partial_flows.to_string().yellow(),
        report.broken_flows.to_string().red(),
    );
    println!();

    println!("{}", "[FLOW MAP]".cyan());
    for (group, edges) in &report.flow_map {
        println!("  {}:", group);
        for edge in edges {
            println!("    {edge}");
        }
    }
    println!();

    for flow in report.flows.iter().filter(|f| !f.issues.is_empty()) {
        println!(
            "  {} {} -> {} ({}): {}",
            "!".yellow(),
            flow.source,
            flow.target,
            flow.data_type,
            flow.issues.join("; ")
        );
    }

    if !report.duplications.is_empty() {
        println!();
        println!("{}", "[DUPLICATIONS]".cyan());
        for dup in &report.duplications {
            println!(
                "  {} `{}` owned by {}\n    {}",
                "✗".red(),
                dup.entity,
                dup.locations.join(", "),
                dup.recommendation.dimmed()
            );
        }
    }

    if !report.inconsistencies.is_empty() {
        println!();
        println!("{}", "[INCONSISTENCIES]".cyan());
        for inc in &report.inconsistencies {
            let severity = match inc.severity {
                Severity::High => "high".red().to_string(),
                Severity::Medium => "medium".yellow().to_string(),
                Severity::Low => "low".dimmed().to_string(),
            };
            println!("  [{severity}] {}", inc.description);
            if !inc.modules.is_empty() {
                println!("    affects: {}", inc.modules.join(", ").dimmed());
            }
        }
    }
    println!();
}
