//! Static reference material merged verbatim into the technical package.
//!
//! Install steps, validation scripts, architecture notes and the changelog
//! are curated configuration. The assembler copies them into the package
//! without interpretation.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::CoreError;

const EMBEDDED_REFERENCE: &str = include_str!("../assets/reference.toml");

/// A named script block with an explanation of what it verifies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptBlock {
    pub name: String,
    pub description: String,
    pub script: String,
}

/// One released version with its notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangelogEntry {
    pub version: String,
    pub date: String,
    pub notes: Vec<String>,
}

/// The full static section of a technical package.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceMaterial {
    #[serde(default)]
    pub install_steps: Vec<String>,
    #[serde(default)]
    pub validation_scripts: Vec<ScriptBlock>,
    #[serde(default)]
    pub architecture_notes: String,
    #[serde(default)]
    pub changelog: Vec<ChangelogEntry>,
}

impl ReferenceMaterial {
    pub fn embedded() -> Result<Self, CoreError> {
        Self::parse(EMBEDDED_REFERENCE)
    }

    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| CoreError::io(path.display().to_string(), e))?;
        Self::parse(&raw)
    }

    fn parse(raw: &str) -> Result<Self, CoreError> {
        toml::from_str(raw).map_err(|e| CoreError::Parse {
            what: "reference material",
            source: e,
        })
    }
}
