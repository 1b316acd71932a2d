//! JSON dataset files for the command-line tool.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::assigner::AssignmentEngine;
use crate::config::{ConfigOverrides, EngineConfig};
use crate::coverage::NameMatchResolver;
use crate::memory::{InMemoryDirectory, InMemoryJobStore};
use crate::model::{Stop, Technician};
use crate::traits::TechnicianDirectory;

/// Technicians, stops and optional config overrides in one document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    #[serde(default)]
    pub technicians: Vec<Technician>,
    #[serde(default)]
    pub stops: Vec<Stop>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<ConfigOverrides>,
    /// Alias table for zone and county names, alias to canonical.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<(String, String)>,
}

pub type MemoryEngine = AssignmentEngine<InMemoryJobStore, InMemoryDirectory, NameMatchResolver>;

impl Dataset {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read dataset {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse dataset {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let body = serde_json::to_string_pretty(self)?;
        fs::write(path, body).with_context(|| format!("failed to write dataset {}", path.display()))
    }

    /// Build an in-memory engine. Fields of a config embedded in the dataset
    /// override the matching fields of `base`.
    pub fn into_engine(self, base: EngineConfig) -> Result<MemoryEngine> {
        let config = match &self.config {
            Some(overrides) => overrides.apply(base),
            None => base,
        };
        config.validate()?;

        let resolver = self
            .aliases
            .iter()
            .fold(NameMatchResolver::new(), |resolver, (alias, canonical)| {
                resolver.with_alias(alias, canonical)
            });

        Ok(AssignmentEngine::new(
            InMemoryJobStore::from_stops(self.stops),
            InMemoryDirectory::from_technicians(self.technicians),
            resolver,
            config,
        ))
    }

    /// Capture the engine's current state, keeping `template`'s config and aliases.
    pub fn from_engine(engine: &MemoryEngine, template: &Dataset) -> Self {
        Self {
            technicians: engine.directory().technicians(),
            stops: engine.store().snapshot(),
            config: template.config.clone(),
            aliases: template.aliases.clone(),
        }
    }
}
