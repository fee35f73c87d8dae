//! deckhand-core: module health and integration diagnostics for the
//! maritime operations platform.
//!
//! The engine inspects a versioned module catalog, scores readiness,
//! validates declared inter-module flows, probes live platform
//! capabilities, and assembles everything into one immutable technical
//! package. Scoring and validation are pure functions over configuration
//! snapshots; capability probing is the only component that touches the
//! host. Degraded input degrades the report, never the process: the worst
//! case is a low-scoring, issue-laden package.

pub mod capability;
pub mod catalog;
pub mod error;
pub mod integration;
pub mod package;
pub mod reference;
pub mod scoring;

pub use capability::{
    CapabilityProber, CapabilityProvider, CapabilityReport, NativeProvider, OverallStatus,
    ProbeConfig, UnsupportedProvider,
};
pub use catalog::{ModuleCatalog, ModuleRecord, ModuleStatus, Tier};
pub use error::CoreError;
pub use integration::{
    FlowCatalog, IntegrationFlow, IntegrationFlowValidator, IntegrationReport,
};
pub use package::{PackageAssembler, TechnicalPackage};
pub use reference::ReferenceMaterial;
pub use scoring::{DiagnosticReport, PendingAction, Priority, ScoringEngine, SystemStatus};
