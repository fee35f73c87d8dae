//! Inter-module data-flow validation.
//!
//! Flows are declared configuration (producer, consumer, payload kind); the
//! validator aggregates their health and runs a pluggable rule list over the
//! declaration set. Duplication and inconsistency findings are produced by
//! rules, never by inline conditionals in the aggregation path, so new
//! checks are added by appending to the rule list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

use crate::catalog::{ModuleCatalog, Tier};
use crate::error::CoreError;

/// Sentinel module id for platform-wide feeds.
pub const ALL_MODULES: &str = "all_modules";

/// Embedded default flow declarations.
const EMBEDDED_FLOWS: &str = include_str!("../assets/flows.toml");

/// Declared health of one flow edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowStatus {
    Working,
    Partial,
    Broken,
}

impl std::fmt::Display for FlowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Working => write!(f, "working"),
            Self::Partial => write!(f, "partial"),
            Self::Broken => write!(f, "broken"),
        }
    }
}

/// One directed producer -> consumer edge. Two edges between the same pair
/// with different `data_type` are distinct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrationFlow {
    pub source: String,
    pub target: String,
    pub data_type: String,
    pub status: FlowStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(default)]
    pub issues: Vec<String>,
}

/// Severity of an inconsistency finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// An entity owned by more than one module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicationFinding {
    pub entity: String,
    pub locations: Vec<String>,
    pub recommendation: String,
}

/// A cross-module format or convention mismatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InconsistencyFinding {
    pub description: String,
    pub modules: Vec<String>,
    pub severity: Severity,
}

/// Immutable result of one validation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrationReport {
    pub timestamp: DateTime<Utc>,
    pub total_flows: usize,
    pub working_flows: usize,
    pub partial_flows: usize,
    pub broken_flows: usize,
    pub flows: Vec<IntegrationFlow>,
    pub duplications: Vec<DuplicationFinding>,
    pub inconsistencies: Vec<InconsistencyFinding>,
    /// Edges grouped by the source module's tier, in a deterministic order.
    pub flow_map: BTreeMap<String, Vec<String>>,
}

/// What a rule may report.
#[derive(Debug, Clone)]
pub enum RuleFinding {
    Duplication(DuplicationFinding),
    Inconsistency(InconsistencyFinding),
}

/// Everything a rule may inspect.
pub struct RuleContext<'a> {
    pub flows: &'a [IntegrationFlow],
    pub catalog: &'a ModuleCatalog,
}

/// One declarative check over the flow/catalog context.
pub trait IntegrationRule: Send + Sync {
    fn id(&self) -> &str;
    fn evaluate(&self, ctx: &RuleContext<'_>) -> Option<RuleFinding>;
}

/// Entity owned by several modules; fires when at least two of the declared
/// owners exist in the catalog.
pub struct SharedEntityRule {
    pub id: &'static str,
    pub entity: &'static str,
    pub owners: &'static [&'static str],
    pub recommendation: &'static str,
}

impl IntegrationRule for SharedEntityRule {
    fn id(&self) -> &str {
        self.id
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Option<RuleFinding> {
        let present: Vec<String> = self
            .owners
            .iter()
            .filter(|o| ctx.catalog.contains(o))
            .map(|o| (*o).to_string())
            .collect();
        if present.len() < 2 {
            return None;
        }
        Some(RuleFinding::Duplication(DuplicationFinding {
            entity: self.entity.to_string(),
            locations: present,
            recommendation: self.recommendation.to_string(),
        }))
    }
}

/// Convention mismatch between modules; fires when at least two of the named
/// modules exist in the catalog.
pub struct ConventionMismatchRule {
    pub id: &'static str,
    pub description: &'static str,
    pub modules: &'static [&'static str],
    pub severity: Severity,
}

impl IntegrationRule for ConventionMismatchRule {
    fn id(&self) -> &str {
        self.id
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Option<RuleFinding> {
        let present: Vec<String> = self
            .modules
            .iter()
            .filter(|m| ctx.catalog.contains(m))
            .map(|m| (*m).to_string())
            .collect();
        if present.len() < 2 {
            return None;
        }
        Some(RuleFinding::Inconsistency(InconsistencyFinding {
            description: self.description.to_string(),
            modules: present,
            severity: self.severity,
        }))
    }
}

/// The same (source, target, data_type) triple declared more than once.
pub struct DuplicateEdgeRule;

impl IntegrationRule for DuplicateEdgeRule {
    fn id(&self) -> &str {
        "duplicate-edge"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Option<RuleFinding> {
        let mut seen = BTreeMap::new();
        for flow in ctx.flows {
            *seen
                .entry((
                    flow.source.as_str(),
                    flow.target.as_str(),
                    flow.data_type.as_str(),
                ))
                .or_insert(0usize) += 1;
        }
        let duplicated: Vec<String> = seen
            .iter()
            .filter(|(_, count)| **count > 1)
            .map(|((s, t, d), _)| format!("{s} -> {t} ({d})"))
            .collect();
        if duplicated.is_empty() {
            return None;
        }
        Some(RuleFinding::Inconsistency(InconsistencyFinding {
            description: format!("Duplicate flow declarations: {}", duplicated.join("; ")),
            modules: Vec::new(),
            severity: Severity::Medium,
        }))
    }
}

/// Known overlaps and mismatches of the host platform, expressed as data.
pub fn builtin_rules() -> Vec<Box<dyn IntegrationRule>> {
    vec![
        Box::new(SharedEntityRule {
            id: "crew-profile-ownership",
            entity: "crew profile",
            owners: &["crew", "hr", "medical"],
            recommendation: "make crew the single owner; hr and medical consume read models",
        }),
        Box::new(SharedEntityRule {
            id: "vessel-document-ownership",
            entity: "vessel documents",
            owners: &["documents", "certificates", "compliance"],
            recommendation: "store documents once and reference them from certificates and compliance",
        }),
        Box::new(ConventionMismatchRule {
            id: "date-format-mismatch",
            description: "Date fields are exported in local format by reporting but ISO 8601 elsewhere",
            modules: &["reporting", "medical", "compliance"],
            severity: Severity::High,
        }),
        Box::new(ConventionMismatchRule {
            id: "unit-system-mismatch",
            description: "Fuel quantities use metric tons in fleet but cubic meters in bunkering",
            modules: &["fleet", "bunkering"],
            severity: Severity::Medium,
        }),
        Box::new(DuplicateEdgeRule),
    ]
}

#[derive(Debug, Deserialize)]
struct FlowFile {
    version: String,
    #[serde(rename = "flow", default)]
    flows: Vec<IntegrationFlow>,
}

/// Versioned set of declared flows.
#[derive(Debug, Clone)]
pub struct FlowCatalog {
    version: String,
    flows: Vec<IntegrationFlow>,
}

impl FlowCatalog {
    pub fn from_flows(version: impl Into<String>, flows: Vec<IntegrationFlow>) -> Self {
        Self {
            version: version.into(),
            flows,
        }
    }

    pub fn embedded() -> Result<Self, CoreError> {
        Self::parse(EMBEDDED_FLOWS)
    }

    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| CoreError::io(path.display().to_string(), e))?;
        Self::parse(&raw)
    }

    fn parse(raw: &str) -> Result<Self, CoreError> {
        let file: FlowFile = toml::from_str(raw).map_err(|e| CoreError::Parse {
            what: "flow declarations",
            source: e,
        })?;
        Ok(Self {
            version: file.version,
            flows: file.flows,
        })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn flows(&self) -> &[IntegrationFlow] {
        &self.flows
    }
}

/// Validator over declared flows. Construct per run; holds the rule list and
/// the catalog used to resolve tiers.
pub struct IntegrationFlowValidator {
    catalog: ModuleCatalog,
    rules: Vec<Box<dyn IntegrationRule>>,
}

impl IntegrationFlowValidator {
    pub fn new(catalog: ModuleCatalog) -> Self {
        Self::with_rules(catalog, builtin_rules())
    }

    pub fn with_rules(catalog: ModuleCatalog, rules: Vec<Box<dyn IntegrationRule>>) -> Self {
        Self { catalog, rules }
    }

    /// Classify edges, run the rule list, and serialize the flow graph.
    pub fn validate(&self, flows: &[IntegrationFlow]) -> IntegrationReport {
        let count = |s: FlowStatus| flows.iter().filter(|f| f.status == s).count();

        let mut duplications = Vec::new();
        let mut inconsistencies = Vec::new();
        let ctx = RuleContext {
            flows,
            catalog: &self.catalog,
        };
        for rule in &self.rules {
            match rule.evaluate(&ctx) {
                Some(RuleFinding::Duplication(d)) => {
                    debug!(rule = rule.id(), entity = %d.entity, "duplication rule fired");
                    duplications.push(d);
                }
                Some(RuleFinding::Inconsistency(i)) => {
                    debug!(rule = rule.id(), "inconsistency rule fired");
                    inconsistencies.push(i);
                }
                None => {}
            }
        }

        IntegrationReport {
            timestamp: Utc::now(),
            total_flows: flows.len(),
            working_flows: count(FlowStatus::Working),
            partial_flows: count(FlowStatus::Partial),
            broken_flows: count(FlowStatus::Broken),
            flows: flows.to_vec(),
            duplications,
            inconsistencies,
            flow_map: self.build_flow_map(flows),
        }
    }

    /// Group edges by the source module's tier. BTreeMap keys plus input
    /// edge order make the serialization deterministic.
    fn build_flow_map(&self, flows: &[IntegrationFlow]) -> BTreeMap<String, Vec<String>> {
        let mut map: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for flow in flows {
            let group = if flow.source == ALL_MODULES {
                "platform".to_string()
            } else {
                self.catalog
                    .tier_of(&flow.source)
                    .unwrap_or(Tier::Support)
                    .to_string()
            };
            map.entry(group).or_default().push(format!(
                "{} -> {} ({})",
                flow.source, flow.target, flow.data_type
            ));
        }
        map
    }
}
