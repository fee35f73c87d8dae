//! `package` - assemble the full technical package.

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use std::path::Path;
use std::sync::Arc;

use deckhand_core::capability::{CapabilityProber, NativeProvider, OverallStatus};
use deckhand_core::package::{PackageAssembler, TechnicalPackage};
use deckhand_core::scoring::SystemStatus;

use super::{Inputs, PackageFormat, EXIT_CAPABILITY_FAIL, EXIT_DIAGNOSTICS_INCOMPLETE, EXIT_OK};

pub async fn run(inputs: &Inputs, format: PackageFormat, output: Option<&Path>) -> Result<i32> {
    let prober = CapabilityProber::with_config(
        Arc::new(NativeProvider::new()),
        inputs.probe_config.clone(),
    );
    let assembler = PackageAssembler::new(
        inputs.catalog.clone(),
        inputs.flows.clone(),
        inputs.reference.clone(),
        prober,
    );
    let package = assembler.assemble().await;

    let rendered = match format {
        PackageFormat::Json => package.to_json()?,
        PackageFormat::Markdown => package.to_markdown(),
        PackageFormat::Text => render_summary(&package),
    };

    match output {
        Some(path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("writing package to {}", path.display()))?;
            eprintln!("wrote package to {}", path.display());
        }
        None => println!("{rendered}"),
    }

    Ok(exit_code(&package))
}

fn exit_code(package: &TechnicalPackage) -> i32 {
    if package.diagnostic.system_status == SystemStatus::Incomplete {
        EXIT_DIAGNOSTICS_INCOMPLETE
    } else if package.capability.overall_status == OverallStatus::Fail {
        EXIT_CAPABILITY_FAIL
    } else {
        EXIT_OK
    }
}

fn render_summary(package: &TechnicalPackage) -> String {
    let mut out = String::new();

    out.push_str(&format!("\n{}\n", "Technical Package".bold()));
    out.push_str("────────────────────────────────────────\n\n");
    out.push_str(&format!("  Version:    {}\n", package.version));
    out.push_str(&format!(
        "  Generated:  {}\n",
        package.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    out.push_str(&format!("  Catalog:    v{}\n\n", package.catalog_version));

    out.push_str(&format!(
        "  Diagnostic:  {} (score {}/100, {} critical issues)\n",
        package.diagnostic.system_status,
        package.diagnostic.overall_score,
        package.diagnostic.critical_issues.len(),
    ));
    out.push_str(&format!(
        "  Integration: {}/{} flows working, {} findings\n",
        package.integration.working_flows,
        package.integration.total_flows,
        package.integration.duplications.len() + package.integration.inconsistencies.len(),
    ));
    out.push_str(&format!(
        "  Capability:  {} (window: {})\n",
        package.capability.overall_status, package.capability.estimated_operating_window,
    ));
    out.push_str(&format!(
        "  Backlog:     {} pending tasks\n",
        package.pending_tasks.len()
    ));
    out.push_str("\n  Use --format json or --format markdown for the full package.\n");

    out
}
