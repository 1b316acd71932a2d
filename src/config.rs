//! Engine configuration.

use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Hard ceiling on stops held by one technician.
pub const DEFAULT_MAX_STOPS_PER_TECHNICIAN: usize = 40;

/// Hours of work estimated per stop. Display only, never used for capacity.
pub const DEFAULT_ESTIMATED_HOURS_PER_STOP: f64 = 0.5;

/// Radius used to group candidate stops during auto-assignment.
pub const DEFAULT_CLUSTER_RADIUS_MILES: f64 = 5.0;

/// Tunables passed to the engine at construction time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    pub max_stops_per_technician: usize,
    pub estimated_hours_per_stop: f64,
    pub cluster_radius_miles: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_stops_per_technician: DEFAULT_MAX_STOPS_PER_TECHNICIAN,
            estimated_hours_per_stop: DEFAULT_ESTIMATED_HOURS_PER_STOP,
            cluster_radius_miles: DEFAULT_CLUSTER_RADIUS_MILES,
        }
    }
}

impl EngineConfig {
    /// Load overrides from environment variables (and `.env` if present).
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let config = Self {
            max_stops_per_technician: parse_or(
                &lookup,
                "STOP_ASSIGN_MAX_STOPS",
                defaults.max_stops_per_technician,
            )?,
            estimated_hours_per_stop: parse_or(
                &lookup,
                "STOP_ASSIGN_HOURS_PER_STOP",
                defaults.estimated_hours_per_stop,
            )?,
            cluster_radius_miles: parse_or(
                &lookup,
                "STOP_ASSIGN_CLUSTER_RADIUS_MILES",
                defaults.cluster_radius_miles,
            )?,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_stops_per_technician == 0 {
            anyhow::bail!("max stops per technician must be at least 1");
        }
        if !(self.estimated_hours_per_stop.is_finite() && self.estimated_hours_per_stop > 0.0) {
            anyhow::bail!(
                "estimated hours per stop must be positive (got {})",
                self.estimated_hours_per_stop
            );
        }
        if !(self.cluster_radius_miles.is_finite() && self.cluster_radius_miles > 0.0) {
            anyhow::bail!(
                "cluster radius must be positive (got {})",
                self.cluster_radius_miles
            );
        }
        Ok(())
    }
}

/// Partial config embedded in a dataset file. Each field that is set
/// replaces the matching field of the base config; the rest are kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_stops_per_technician: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_hours_per_stop: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_radius_miles: Option<f64>,
}

impl ConfigOverrides {
    pub fn apply(&self, base: EngineConfig) -> EngineConfig {
        EngineConfig {
            max_stops_per_technician: self
                .max_stops_per_technician
                .unwrap_or(base.max_stops_per_technician),
            estimated_hours_per_stop: self
                .estimated_hours_per_stop
                .unwrap_or(base.estimated_hours_per_stop),
            cluster_radius_miles: self.cluster_radius_miles.unwrap_or(base.cluster_radius_miles),
        }
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value: {:?}", key, raw)),
        None => Ok(default),
    }
}
