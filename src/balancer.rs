//! Mean-equalization workload targets.
//!
//! A technician's target is the average load across itself and its peers,
//! rounded up and capped at the configured maximum. This is a cheap heuristic
//! to keep assignment interactive, not a fairness optimum.

use std::collections::BTreeSet;

use rayon::prelude::*;
use serde::Serialize;

use crate::config::EngineConfig;
use crate::coverage::peer_technicians;
use crate::model::TechnicianId;
use crate::traits::{JobStore, TechnicianDirectory, ZoneResolver};
use crate::workload::{WorkloadMetrics, calculate_workload};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResult {
    pub target_count: usize,
    pub current_count: usize,
    pub can_assign: usize,
    pub average_workload: f64,
    pub peer_count: usize,
}

/// Compute how many more stops `technician_id` may take.
///
/// All-zero when the technician is unknown or has no peers, since there is
/// nothing to balance against.
pub fn balance_workload<S, D, Z>(
    store: &S,
    directory: &D,
    resolver: &Z,
    technician_id: &TechnicianId,
    zones: &BTreeSet<String>,
    counties: &BTreeSet<String>,
    config: &EngineConfig,
) -> BalanceResult
where
    S: JobStore + ?Sized,
    D: TechnicianDirectory + ?Sized,
    Z: ZoneResolver + ?Sized,
{
    let peers = peer_technicians(directory, resolver, technician_id, zones, counties);
    if peers.is_empty() {
        tracing::debug!(technician_id = %technician_id, "No peers to balance against");
        return BalanceResult::default();
    }

    let Some(own) = calculate_workload(store, directory, technician_id, config) else {
        return BalanceResult::default();
    };

    // Each peer only reads its own stops, so the fan-out shares no mutable state.
    let peer_loads: Vec<WorkloadMetrics> = peers
        .par_iter()
        .filter_map(|peer| calculate_workload(store, directory, &peer.id, config))
        .collect();

    let counted = peer_loads.len() + 1;
    let total: usize = own.total_stops + peer_loads.iter().map(|m| m.total_stops).sum::<usize>();
    let average_workload = total as f64 / counted as f64;

    let target_count = (average_workload.ceil() as usize).min(config.max_stops_per_technician);
    let can_assign = target_count.saturating_sub(own.total_stops);

    tracing::debug!(
        technician_id = %technician_id,
        peers = peer_loads.len(),
        average_workload,
        target_count,
        current_count = own.total_stops,
        can_assign,
        "Workload balance computed"
    );

    BalanceResult {
        target_count,
        current_count: own.total_stops,
        can_assign,
        average_workload,
        peer_count: peer_loads.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coverage::NameMatchResolver;
    use crate::memory::{InMemoryDirectory, InMemoryJobStore};
    use crate::model::{Stop, Technician};

    fn zone_set(zones: &[&str]) -> BTreeSet<String> {
        zones.iter().map(|z| z.to_string()).collect()
    }

    fn technician_in(id: &str, zone: &str) -> Technician {
        let mut tech = Technician::new(id, id);
        tech.coverage_zones.insert(zone.to_string());
        tech
    }

    fn stops_for(tech: &str, count: usize) -> Vec<Stop> {
        (0..count)
            .map(|i| {
                let mut stop = Stop::new(format!("{}-{}", tech, i));
                stop.assigned_technician_id = Some(TechnicianId::new(tech));
                stop
            })
            .collect()
    }

    fn fixture(loads: &[(&str, usize)]) -> (InMemoryJobStore, InMemoryDirectory) {
        let store = InMemoryJobStore::new();
        let directory = InMemoryDirectory::new();
        for (tech, count) in loads {
            directory.insert(technician_in(tech, "Z"));
            for stop in stops_for(tech, *count) {
                store.insert(stop);
            }
        }
        (store, directory)
    }

    #[test]
    fn test_balance_targets_peer_average() {
        let (store, directory) = fixture(&[("a", 10), ("b", 20)]);
        let result = balance_workload(
            &store,
            &directory,
            &NameMatchResolver::new(),
            &TechnicianId::new("a"),
            &zone_set(&["Z"]),
            &BTreeSet::new(),
            &EngineConfig::default(),
        );

        assert_eq!(result.average_workload, 15.0);
        assert_eq!(result.target_count, 15);
        assert_eq!(result.current_count, 10);
        assert_eq!(result.can_assign, 5);
        assert_eq!(result.peer_count, 1);
    }

    #[test]
    fn test_average_rounds_up() {
        let (store, directory) = fixture(&[("a", 0), ("b", 1)]);
        let result = balance_workload(
            &store,
            &directory,
            &NameMatchResolver::new(),
            &TechnicianId::new("a"),
            &zone_set(&["Z"]),
            &BTreeSet::new(),
            &EngineConfig::default(),
        );
        assert_eq!(result.target_count, 1);
        assert_eq!(result.can_assign, 1);
    }

    #[test]
    fn test_target_capped_at_capacity() {
        let (store, directory) = fixture(&[("a", 0), ("b", 12)]);
        let config = EngineConfig {
            max_stops_per_technician: 4,
            ..EngineConfig::default()
        };
        let result = balance_workload(
            &store,
            &directory,
            &NameMatchResolver::new(),
            &TechnicianId::new("a"),
            &zone_set(&["Z"]),
            &BTreeSet::new(),
            &config,
        );
        assert_eq!(result.target_count, 4);
        assert_eq!(result.can_assign, 4);
    }

    #[test]
    fn test_overloaded_technician_can_assign_nothing() {
        let (store, directory) = fixture(&[("a", 30), ("b", 10)]);
        let result = balance_workload(
            &store,
            &directory,
            &NameMatchResolver::new(),
            &TechnicianId::new("a"),
            &zone_set(&["Z"]),
            &BTreeSet::new(),
            &EngineConfig::default(),
        );
        assert_eq!(result.target_count, 20);
        assert_eq!(result.can_assign, 0);
    }

    #[test]
    fn test_no_peers_is_all_zero() {
        let (store, directory) = fixture(&[("a", 3)]);
        let result = balance_workload(
            &store,
            &directory,
            &NameMatchResolver::new(),
            &TechnicianId::new("a"),
            &zone_set(&["Z"]),
            &BTreeSet::new(),
            &EngineConfig::default(),
        );
        assert_eq!(result, BalanceResult::default());
    }
}
