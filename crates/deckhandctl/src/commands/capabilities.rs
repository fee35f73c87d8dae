//! `probe-capabilities` - exercise live platform capabilities.

use anyhow::Result;
use owo_colors::OwoColorize;
use std::sync::Arc;

use deckhand_core::capability::{
    CapabilityProber, CapabilityReport, NativeProvider, OverallStatus, TestStatus,
};

use super::{Inputs, ReportFormat, EXIT_CAPABILITY_FAIL, EXIT_OK};

pub async fn run(inputs: &Inputs, format: ReportFormat) -> Result<i32> {
    let prober = CapabilityProber::with_config(
        Arc::new(NativeProvider::new()),
        inputs.probe_config.clone(),
    );
    let report = prober.probe_all().await;

    match format {
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        ReportFormat::Text => print_report(&report),
    }

    Ok(if report.overall_status == OverallStatus::Fail {
        EXIT_CAPABILITY_FAIL
    } else {
        EXIT_OK
    })
}

fn print_report(report: &CapabilityReport) {
    println!();
    println!("{}", "Capability Probes".bold());
    println!("────────────────────────────────────────");
    println!();

    let overall = match report.overall_status {
        OverallStatus::Pass => report.overall_status.to_string().green().to_string(),
        OverallStatus::Partial => report.overall_status.to_string().yellow().to_string(),
        OverallStatus::Fail => report.overall_status.to_string().red().to_string(),
    };
    println!("  Overall:    {overall}");
    println!(
        "  Window:     {} ({})",
        report.estimated_operating_window,
        report.estimated_operating_window.describe()
    );
    println!();

    println!("{}", "[TESTS]".cyan());
    for test in &report.tests {
        let glyph = match test.status {
            TestStatus::Pass => "✓".green().to_string(),
            TestStatus::Fail => "✗".red().to_string(),
            TestStatus::Skip => "-".dimmed().to_string(),
        };
        println!(
            "  {glyph} {:32} {:>5} ms  {}",
            test.name,
            test.duration_ms,
            test.details.dimmed()
        );
    }
    println!();

    println!("{}", "[RECOMMENDATIONS]".cyan());
    for rec in &report.recommendations {
        println!("  * {rec}");
    }
    println!();
}
