//! `diagnose` - score the module catalog into a diagnostic report.

use anyhow::Result;
use owo_colors::OwoColorize;

use deckhand_core::scoring::{DiagnosticReport, Priority, ScoringEngine, SystemStatus};

use super::{Inputs, ReportFormat, EXIT_DIAGNOSTICS_INCOMPLETE, EXIT_OK};

pub fn run(inputs: &Inputs, format: ReportFormat) -> Result<i32> {
    let engine = ScoringEngine::for_catalog(&inputs.catalog);
    let report = engine.score(&inputs.catalog.list_modules(None));

    match format {
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        ReportFormat::Text => print_report(&report),
    }

    Ok(if report.system_status == SystemStatus::Incomplete {
        EXIT_DIAGNOSTICS_INCOMPLETE
    } else {
        EXIT_OK
    })
}

fn print_report(report: &DiagnosticReport) {
    println!();
    println!("{}", "Module Diagnostics".bold());
    println!("────────────────────────────────────────");
    println!();

    let status = match report.system_status {
        SystemStatus::ProductionReady => report.system_status.to_string().green().to_string(),
        SystemStatus::NeedsReview => report.system_status.to_string().yellow().to_string(),
        SystemStatus::Incomplete => report.system_status.to_string().red().to_string(),
    };
    println!("  Status:     {status}");
    println!("  Score:      {}/100", report.overall_score);
    println!("  Catalog:    v{}", report.catalog_version);
    println!(
        "  Modules:    {} ({} ready, {} partial, {} incomplete, {} error)",
        report.summary.total_modules,
        report.summary.ready,
        report.summary.partial,
        report.summary.incomplete,
        report.summary.error,
    );
    println!(
        "  Coverage:   AI {}%, offline {}%, completeness {}%",
        report.summary.ai_coverage_pct,
        report.summary.offline_coverage_pct,
        report.summary.average_completeness,
    );
    println!();

    if !report.critical_issues.is_empty() {
        println!("{}", "[CRITICAL ISSUES]".red());
        for issue in &report.critical_issues {
            println!("  {} {}", "✗".red(), issue);
        }
        println!();
    }

    println!("{}", "[READINESS CHECKLIST]".cyan());
    for gate in &report.readiness_checklist {
        let glyph = if gate.passed {
            "✓".green().to_string()
        } else {
            "✗".red().to_string()
        };
        println!("  {glyph} {} {}", gate.item, format!("({})", gate.notes).dimmed());
    }
    println!();

    let high_count = report
        .pending_actions
        .iter()
        .filter(|a| a.priority == Priority::High)
        .count();
    println!(
        "{} {} pending actions ({} high priority)",
        "[BACKLOG]".cyan(),
        report.pending_actions.len(),
        high_count
    );
    for action in report.pending_actions.iter().take(10) {
        let priority = match action.priority {
            Priority::High => action.priority.to_string().red().to_string(),
            Priority::Medium => action.priority.to_string().yellow().to_string(),
            Priority::Low => action.priority.to_string().dimmed().to_string(),
        };
        println!(
            "  [{priority}] {}: {} {}",
            action.module,
            action.action,
            format!("({})", action.estimated_effort).dimmed()
        );
    }
    if report.pending_actions.len() > 10 {
        println!(
            "  {}",
            format!("... and {} more", report.pending_actions.len() - 10).dimmed()
        );
    }
    println!();
}
