//! Module catalog: the versioned metadata registry for platform modules.
//!
//! What we know about each module lives in configuration (a TOML table keyed
//! by module id); the engines only consume the records. Unknown ids never
//! fail a run: they resolve to a synthetic needs-review record so that
//! newly declared modules cannot crash scoring before metadata is backfilled.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

use crate::error::CoreError;

/// Embedded default catalog, used when no override file is supplied.
const EMBEDDED_CATALOG: &str = include_str!("../assets/catalog.toml");

/// Module criticality tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Core,
    Operational,
    Intelligence,
    Support,
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Core => write!(f, "core"),
            Self::Operational => write!(f, "operational"),
            Self::Intelligence => write!(f, "intelligence"),
            Self::Support => write!(f, "support"),
        }
    }
}

/// Curated implementation status of a module.
///
/// `Error` is terminal: it never auto-recovers, only an explicit catalog
/// re-classification clears it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleStatus {
    Ready,
    Partial,
    Incomplete,
    Error,
}

impl std::fmt::Display for ModuleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ready => write!(f, "ready"),
            Self::Partial => write!(f, "partial"),
            Self::Incomplete => write!(f, "incomplete"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// One feature of a module with its implementation and test state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureEntry {
    pub name: String,
    pub implemented: bool,
    pub tested: bool,
}

/// One catalog entry. Records are read-only snapshots; a new copy is taken
/// per engine run, nothing is mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleRecord {
    pub id: String,
    pub display_name: String,
    pub tier: Tier,
    pub completeness: u8,
    pub status: ModuleStatus,
    #[serde(default)]
    pub features: Vec<FeatureEntry>,
    #[serde(default)]
    pub has_ai_integration: bool,
    #[serde(default)]
    pub has_offline_support: bool,
    #[serde(default)]
    pub issues: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

impl ModuleRecord {
    /// Synthetic record for a module id the catalog does not know yet.
    pub fn needs_review(id: &str) -> Self {
        Self {
            id: id.to_string(),
            display_name: id.to_string(),
            tier: Tier::Support,
            completeness: 70,
            status: ModuleStatus::Partial,
            features: Vec::new(),
            has_ai_integration: false,
            has_offline_support: false,
            issues: vec!["module needs review".to_string()],
            recommendations: vec!["complete implementation".to_string()],
        }
    }

    /// Names of features that are implemented but carry no test coverage.
    pub fn untested_features(&self) -> Vec<&str> {
        self.features
            .iter()
            .filter(|f| f.implemented && !f.tested)
            .map(|f| f.name.as_str())
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    version: String,
    #[serde(rename = "module", default)]
    modules: Vec<ModuleRecord>,
}

/// Read-only, versioned module registry.
#[derive(Debug, Clone)]
pub struct ModuleCatalog {
    version: String,
    modules: Vec<ModuleRecord>,
}

impl ModuleCatalog {
    /// Build a catalog from already-validated records (fixtures, tests).
    pub fn from_records(version: impl Into<String>, modules: Vec<ModuleRecord>) -> Self {
        Self {
            version: version.into(),
            modules,
        }
    }

    /// The catalog shipped with the engine.
    pub fn embedded() -> Result<Self, CoreError> {
        Self::parse(EMBEDDED_CATALOG)
    }

    /// Load a catalog override from disk.
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| CoreError::io(path.display().to_string(), e))?;
        let catalog = Self::parse(&raw)?;
        debug!(
            path = %path.display(),
            version = %catalog.version,
            modules = catalog.modules.len(),
            "loaded module catalog"
        );
        Ok(catalog)
    }

    fn parse(raw: &str) -> Result<Self, CoreError> {
        let file: CatalogFile = toml::from_str(raw).map_err(|e| CoreError::Parse {
            what: "module catalog",
            source: e,
        })?;
        for record in &file.modules {
            if record.completeness > 100 {
                return Err(CoreError::Config {
                    what: "module catalog",
                    message: format!(
                        "module '{}' has completeness {} (must be 0-100)",
                        record.id, record.completeness
                    ),
                });
            }
        }
        Ok(Self {
            version: file.version,
            modules: file.modules,
        })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Snapshot of the catalog, optionally filtered by tier. Records keep
    /// their catalog order, which downstream sorts rely on for stability.
    pub fn list_modules(&self, tier: Option<Tier>) -> Vec<ModuleRecord> {
        self.modules
            .iter()
            .filter(|m| tier.map_or(true, |t| m.tier == t))
            .cloned()
            .collect()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.modules.iter().any(|m| m.id == id)
    }

    /// Resolve an id to its record, or to the synthetic needs-review record
    /// when the catalog has no entry for it.
    pub fn record_or_default(&self, id: &str) -> ModuleRecord {
        match self.modules.iter().find(|m| m.id == id) {
            Some(record) => record.clone(),
            None => {
                warn!(module = id, "module not in catalog, using needs-review default");
                ModuleRecord::needs_review(id)
            }
        }
    }

    /// Tier of a known module id, if any.
    pub fn tier_of(&self, id: &str) -> Option<Tier> {
        self.modules.iter().find(|m| m.id == id).map(|m| m.tier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_catalog_parses() {
        let catalog = ModuleCatalog::embedded().unwrap();
        assert!(catalog.len() >= 20);
        assert!(catalog.contains("fleet"));
        assert!(catalog.contains("audit-log"));
    }

    #[test]
    fn test_tier_filter() {
        let catalog = ModuleCatalog::embedded().unwrap();
        let core = catalog.list_modules(Some(Tier::Core));
        assert!(!core.is_empty());
        assert!(core.iter().all(|m| m.tier == Tier::Core));
        assert!(core.len() < catalog.len());
    }

    #[test]
    fn test_unknown_module_degrades_to_needs_review() {
        let catalog = ModuleCatalog::embedded().unwrap();
        let record = catalog.record_or_default("weather-routing");
        assert_eq!(record.status, ModuleStatus::Partial);
        assert_eq!(record.completeness, 70);
        assert_eq!(record.issues, vec!["module needs review".to_string()]);
        assert_eq!(
            record.recommendations,
            vec!["complete implementation".to_string()]
        );
    }

    #[test]
    fn test_completeness_out_of_range_rejected() {
        let raw = r#"
version = "test"

[[module]]
id = "broken"
display_name = "Broken"
tier = "core"
completeness = 120
status = "ready"
"#;
        let err = ModuleCatalog::parse(raw).unwrap_err();
        assert!(matches!(err, CoreError::Config { .. }));
    }

    #[test]
    fn test_untested_features() {
        let catalog = ModuleCatalog::embedded().unwrap();
        let crew = catalog.record_or_default("crew");
        assert_eq!(crew.untested_features(), vec!["rotation scheduling"]);
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&ModuleStatus::Ready).unwrap();
        assert_eq!(json, r#""ready""#);
        let json = serde_json::to_string(&Tier::Operational).unwrap();
        assert_eq!(json, r#""operational""#);
    }
}
