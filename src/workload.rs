//! Per-technician workload accounting.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::EngineConfig;
use crate::model::{Stop, TechnicianId};
use crate::traits::{JobStore, TechnicianDirectory};

/// Current load of one technician. Computed fresh on every call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadMetrics {
    pub technician_id: TechnicianId,
    pub total_stops: usize,
    /// Keyed by each stop's own zone, not the technician's declared coverage.
    pub stops_by_zone: BTreeMap<String, usize>,
    pub stops_by_county: BTreeMap<String, usize>,
    /// Percentage of the configured maximum.
    pub capacity_utilization: f64,
    pub estimated_hours: f64,
}

impl WorkloadMetrics {
    pub fn from_stops(technician_id: TechnicianId, stops: &[Stop], config: &EngineConfig) -> Self {
        let mut stops_by_zone = BTreeMap::new();
        let mut stops_by_county = BTreeMap::new();

        for stop in stops {
            if let Some(zone) = stop.zone.as_deref().map(str::trim).filter(|z| !z.is_empty()) {
                *stops_by_zone.entry(zone.to_string()).or_insert(0) += 1;
            }
            let county = stop.county.trim();
            if !county.is_empty() {
                *stops_by_county.entry(county.to_string()).or_insert(0) += 1;
            }
        }

        let total_stops = stops.len();
        Self {
            technician_id,
            total_stops,
            stops_by_zone,
            stops_by_county,
            capacity_utilization: total_stops as f64
                / config.max_stops_per_technician as f64
                * 100.0,
            estimated_hours: total_stops as f64 * config.estimated_hours_per_stop,
        }
    }

    /// Stops this technician can still take before hitting `max_stops`.
    pub fn remaining_capacity(&self, max_stops: usize) -> usize {
        max_stops.saturating_sub(self.total_stops)
    }
}

/// Workload for `technician_id`, or `None` if the directory doesn't know it.
pub fn calculate_workload<S, D>(
    store: &S,
    directory: &D,
    technician_id: &TechnicianId,
    config: &EngineConfig,
) -> Option<WorkloadMetrics>
where
    S: JobStore + ?Sized,
    D: TechnicianDirectory + ?Sized,
{
    let technician = directory.technician(technician_id)?;
    let stops = store.stops_assigned_to(&technician.id);
    Some(WorkloadMetrics::from_stops(technician.id, &stops, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{InMemoryDirectory, InMemoryJobStore};
    use crate::model::Technician;

    fn assigned(id: &str, tech: &str, county: &str, zone: Option<&str>) -> Stop {
        let mut stop = Stop::new(id);
        stop.assigned_technician_id = Some(TechnicianId::new(tech));
        stop.county = county.to_string();
        stop.zone = zone.map(str::to_string);
        stop
    }

    #[test]
    fn test_unknown_technician_is_none() {
        let store = InMemoryJobStore::new();
        let directory = InMemoryDirectory::new();
        let metrics = calculate_workload(
            &store,
            &directory,
            &TechnicianId::new("ghost"),
            &EngineConfig::default(),
        );
        assert!(metrics.is_none());
    }

    #[test]
    fn test_breakdown_and_derived_numbers() {
        let store = InMemoryJobStore::from_stops([
            assigned("s1", "t1", "Fulton", Some("North")),
            assigned("s2", "t1", "Fulton", None),
            assigned("s3", "t1", "DeKalb", Some("North")),
            assigned("s4", "t1", "", Some("East")),
            assigned("s5", "t2", "Fulton", Some("North")),
        ]);
        let directory = InMemoryDirectory::from_technicians([Technician::new("t1", "Alex")]);

        let metrics = calculate_workload(
            &store,
            &directory,
            &TechnicianId::new("t1"),
            &EngineConfig::default(),
        )
        .unwrap();

        assert_eq!(metrics.total_stops, 4);
        assert_eq!(metrics.stops_by_county.get("Fulton"), Some(&2));
        assert_eq!(metrics.stops_by_county.get("DeKalb"), Some(&1));
        assert_eq!(metrics.stops_by_county.len(), 2);
        assert_eq!(metrics.stops_by_zone.get("North"), Some(&2));
        assert_eq!(metrics.stops_by_zone.get("East"), Some(&1));
        assert_eq!(metrics.capacity_utilization, 10.0);
        assert_eq!(metrics.estimated_hours, 2.0);
        assert_eq!(metrics.remaining_capacity(40), 36);
    }

    #[test]
    fn test_capacity_follows_config() {
        let config = EngineConfig {
            max_stops_per_technician: 8,
            ..EngineConfig::default()
        };
        let stops = vec![assigned("s1", "t1", "Fulton", None), assigned("s2", "t1", "Fulton", None)];
        let metrics = WorkloadMetrics::from_stops(TechnicianId::new("t1"), &stops, &config);
        assert_eq!(metrics.capacity_utilization, 25.0);
        assert_eq!(metrics.remaining_capacity(1), 0);
    }
}
