//! Command handlers and shared input loading.

pub mod capabilities;
pub mod diagnose;
pub mod integration;
pub mod package;

use anyhow::{Context, Result};
use clap::ValueEnum;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

use deckhand_core::capability::ProbeConfig;
use deckhand_core::catalog::ModuleCatalog;
use deckhand_core::integration::FlowCatalog;
use deckhand_core::reference::ReferenceMaterial;

/// Exit codes for CI gating.
pub const EXIT_OK: i32 = 0;
pub const EXIT_DIAGNOSTICS_INCOMPLETE: i32 = 20;
pub const EXIT_CAPABILITY_FAIL: i32 = 21;
pub const EXIT_BROKEN_FLOWS: i32 = 22;

/// Output format for single-report commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Text,
    Json,
}

/// Output format for the full package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PackageFormat {
    Text,
    Json,
    Markdown,
}

/// Raw CLI path overrides.
#[derive(Debug, Default, Clone)]
pub struct InputPaths {
    pub catalog: Option<PathBuf>,
    pub flows: Option<PathBuf>,
    pub reference: Option<PathBuf>,
    pub probe_timeout_ms: u64,
}

/// Loaded configuration shared by every command.
pub struct Inputs {
    pub catalog: ModuleCatalog,
    pub flows: FlowCatalog,
    pub reference: ReferenceMaterial,
    pub probe_config: ProbeConfig,
}

/// Resolve each input to its override file or the embedded default.
pub fn load_inputs(paths: &InputPaths) -> Result<Inputs> {
    let catalog = match &paths.catalog {
        Some(path) => ModuleCatalog::load(path)
            .with_context(|| format!("loading catalog from {}", path.display()))?,
        None => ModuleCatalog::embedded().context("parsing embedded catalog")?,
    };
    let flows = match &paths.flows {
        Some(path) => FlowCatalog::load(path)
            .with_context(|| format!("loading flows from {}", path.display()))?,
        None => FlowCatalog::embedded().context("parsing embedded flows")?,
    };
    let reference = match &paths.reference {
        Some(path) => ReferenceMaterial::load(path)
            .with_context(|| format!("loading reference material from {}", path.display()))?,
        None => ReferenceMaterial::embedded().context("parsing embedded reference material")?,
    };

    info!(
        catalog_version = %catalog.version(),
        modules = catalog.len(),
        flows = flows.flows().len(),
        probe_timeout_ms = paths.probe_timeout_ms,
        "loaded diagnostic inputs"
    );

    Ok(Inputs {
        catalog,
        flows,
        reference,
        probe_config: ProbeConfig {
            timeout: Duration::from_millis(paths.probe_timeout_ms),
        },
    })
}
