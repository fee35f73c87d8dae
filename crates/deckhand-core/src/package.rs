//! Package assembly: the engine's single externally delivered artifact.
//!
//! One `assemble()` call runs scoring, flow validation and the capability
//! suite, merges their backlogs, and stamps a fully-owned snapshot. No
//! state survives between calls, so two packages over the same inputs
//! differ only in timestamps and probe timings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::info;

use crate::capability::{CapabilityProber, CapabilityReport, OverallStatus, TestStatus};
use crate::catalog::ModuleCatalog;
use crate::error::CoreError;
use crate::integration::{FlowCatalog, IntegrationFlowValidator, IntegrationReport, Severity};
use crate::reference::ReferenceMaterial;
use crate::scoring::{DiagnosticReport, PendingAction, Priority, ScoringEngine};

/// Immutable, self-contained snapshot of all diagnostics plus reference
/// material. Nothing in here is shared with any other package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalPackage {
    pub generated_at: DateTime<Utc>,
    pub version: String,
    pub catalog_version: String,
    pub diagnostic: DiagnosticReport,
    pub integration: IntegrationReport,
    pub capability: CapabilityReport,
    /// Merged, deduplicated backlog across all reports.
    pub pending_tasks: Vec<PendingAction>,
    pub reference: ReferenceMaterial,
}

impl TechnicalPackage {
    /// Canonical wire form. Round-trips losslessly through `from_json`.
    pub fn to_json(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(raw: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Human-readable export. Lossy by design; only the JSON form round-trips.
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();

        out.push_str(&format!("# Technical Package v{}\n\n", self.version));
        out.push_str(&format!(
            "Generated: {} | Catalog: {}\n\n",
            self.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
            self.catalog_version
        ));

        out.push_str("## Diagnostic\n\n");
        out.push_str(&format!(
            "- **Status**: {}\n- **Score**: {}/100\n- **Modules**: {} ({} ready, {} partial, {} incomplete, {} error)\n",
            self.diagnostic.system_status,
            self.diagnostic.overall_score,
            self.diagnostic.summary.total_modules,
            self.diagnostic.summary.ready,
            self.diagnostic.summary.partial,
            self.diagnostic.summary.incomplete,
            self.diagnostic.summary.error,
        ));
        out.push('\n');

        if !self.diagnostic.critical_issues.is_empty() {
            out.push_str("### Critical Issues\n\n");
            for issue in &self.diagnostic.critical_issues {
                out.push_str(&format!("- {issue}\n"));
            }
            out.push('\n');
        }

        out.push_str("### Readiness Checklist\n\n");
        out.push_str("| Gate | Passed | Notes |\n");
        out.push_str("|------|--------|-------|\n");
        for gate in &self.diagnostic.readiness_checklist {
            out.push_str(&format!(
                "| {} | {} | {} |\n",
                gate.item,
                if gate.passed { "yes" } else { "no" },
                gate.notes
            ));
        }
        out.push('\n');

        out.push_str("## Integration\n\n");
        out.push_str(&format!(
            "- **Flows**: {} total, {} working, {} partial, {} broken\n",
            self.integration.total_flows,
            self.integration.working_flows,
            self.integration.partial_flows,
            self.integration.broken_flows,
        ));
        for dup in &self.integration.duplications {
            out.push_str(&format!(
                "- Duplicated entity `{}` in {}: {}\n",
                dup.entity,
                dup.locations.join(", "),
                dup.recommendation
            ));
        }
        for inc in &self.integration.inconsistencies {
            out.push_str(&format!("- Inconsistency: {}\n", inc.description));
        }
        out.push('\n');

        out.push_str("## Capability\n\n");
        out.push_str(&format!(
            "- **Overall**: {}\n- **Operating window**: {} ({})\n\n",
            self.capability.overall_status,
            self.capability.estimated_operating_window,
            self.capability.estimated_operating_window.describe(),
        ));
        out.push_str("| Test | Status | Duration | Details |\n");
        out.push_str("|------|--------|----------|---------|\n");
        for test in &self.capability.tests {
            out.push_str(&format!(
                "| {} | {} | {} ms | {} |\n",
                test.name, test.status, test.duration_ms, test.details
            ));
        }
        out.push('\n');

        out.push_str("## Pending Tasks\n\n");
        for task in &self.pending_tasks {
            out.push_str(&format!(
                "- [{}] {}: {} ({})\n",
                task.priority, task.module, task.action, task.estimated_effort
            ));
        }
        out.push('\n');

        out.push_str("## Installation\n\n");
        for (i, step) in self.reference.install_steps.iter().enumerate() {
            out.push_str(&format!("{}. {}\n", i + 1, step));
        }
        out.push('\n');

        out.push_str("## Validation Scripts\n\n");
        for script in &self.reference.validation_scripts {
            out.push_str(&format!(
                "### {}\n\n{}\n\n```sh\n{}\n```\n\n",
                script.name,
                script.description,
                script.script.trim()
            ));
        }

        out.push_str("## Architecture\n\n");
        out.push_str(self.reference.architecture_notes.trim());
        out.push_str("\n\n## Changelog\n\n");
        for entry in &self.reference.changelog {
            out.push_str(&format!("### {} ({})\n\n", entry.version, entry.date));
            for note in &entry.notes {
                out.push_str(&format!("- {note}\n"));
            }
            out.push('\n');
        }

        out
    }
}

/// Orchestrates the three engines into one package. Construct per run with
/// injected inputs; the assembler keeps no cross-call state.
pub struct PackageAssembler {
    catalog: ModuleCatalog,
    flows: FlowCatalog,
    reference: ReferenceMaterial,
    prober: CapabilityProber,
    version: String,
}

impl PackageAssembler {
    pub fn new(
        catalog: ModuleCatalog,
        flows: FlowCatalog,
        reference: ReferenceMaterial,
        prober: CapabilityProber,
    ) -> Self {
        Self {
            catalog,
            flows,
            reference,
            prober,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Produce a fresh package. The pure reports are computed while the
    /// capability suite runs; everything is joined before stamping.
    pub async fn assemble(&self) -> TechnicalPackage {
        let reports = async {
            let scoring = ScoringEngine::for_catalog(&self.catalog);
            let diagnostic = scoring.score(&self.catalog.list_modules(None));
            let validator = IntegrationFlowValidator::new(self.catalog.clone());
            let integration = validator.validate(self.flows.flows());
            (diagnostic, integration)
        };
        let ((diagnostic, integration), capability) = tokio::join!(reports, self.prober.probe_all());

        let pending_tasks = merge_backlog(&diagnostic, &integration, &capability);

        info!(
            version = %self.version,
            score = diagnostic.overall_score,
            status = %diagnostic.system_status,
            tasks = pending_tasks.len(),
            "assembled technical package"
        );

        TechnicalPackage {
            generated_at: Utc::now(),
            version: self.version.clone(),
            catalog_version: self.catalog.version().to_string(),
            diagnostic,
            integration,
            capability,
            pending_tasks,
            reference: self.reference.clone(),
        }
    }
}

/// Merge every report's remediation items into one backlog, deduplicated on
/// the case-insensitive (module, action) pair, first occurrence wins. The
/// final sort is stable, so merged order is preserved within a priority.
fn merge_backlog(
    diagnostic: &DiagnosticReport,
    integration: &IntegrationReport,
    capability: &CapabilityReport,
) -> Vec<PendingAction> {
    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut tasks = Vec::new();

    let mut push = |task: PendingAction| {
        let key = (task.module.to_lowercase(), task.action.to_lowercase());
        if seen.insert(key) {
            tasks.push(task);
        }
    };

    for action in &diagnostic.pending_actions {
        push(action.clone());
    }

    for dup in &integration.duplications {
        push(PendingAction {
            priority: Priority::Medium,
            module: dup.locations.first().cloned().unwrap_or_default(),
            action: format!("Deduplicate {}: {}", dup.entity, dup.recommendation),
            estimated_effort: "1-2 days".to_string(),
        });
    }
    for inc in &integration.inconsistencies {
        push(PendingAction {
            priority: match inc.severity {
                Severity::High => Priority::High,
                Severity::Medium => Priority::Medium,
                Severity::Low => Priority::Low,
            },
            module: inc.modules.join(", "),
            action: format!("Align: {}", inc.description),
            estimated_effort: "2-4 hours".to_string(),
        });
    }

    // Backlog entries come from the structured test results, not the
    // report's recommendation prose. Positive confirmations never appear
    // here because they have no failed test or missing capability behind
    // them.
    let capability_priority = if capability.overall_status == OverallStatus::Fail {
        Priority::High
    } else {
        Priority::Medium
    };
    for test in capability.tests.iter().filter(|t| t.status == TestStatus::Fail) {
        push(PendingAction {
            priority: capability_priority,
            module: "platform".to_string(),
            action: format!("Investigate {}: {}", test.name, test.details),
            estimated_effort: "1-2 days".to_string(),
        });
    }
    for cap in capability.capabilities.iter().filter(|c| !c.supported) {
        // A capability whose probe ran and failed is already covered by the
        // Investigate entry above; only skipped (never-attempted) ones need
        // provisioning.
        let was_skipped = capability
            .tests
            .iter()
            .any(|t| t.name == cap.capability && t.status == TestStatus::Skip);
        if was_skipped {
            push(PendingAction {
                priority: capability_priority,
                module: "platform".to_string(),
                action: format!("Provision {} ({})", cap.capability, cap.notes),
                estimated_effort: "1-2 days".to_string(),
            });
        }
    }

    tasks.sort_by_key(|t| t.priority);
    tasks
}
