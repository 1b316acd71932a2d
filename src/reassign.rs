//! Operator-driven transfers between technicians.

use rayon::prelude::*;
use serde::Serialize;

use crate::assigner::{AssignmentEngine, Coverage};
use crate::error::{AssignmentError, Result, StoreError};
use crate::model::{AssignmentSource, Stop, StopId, Technician, TechnicianId};
use crate::traits::{AssignmentChange, JobStore, TechnicianDirectory, ZoneResolver};
use crate::workload::{WorkloadMetrics, calculate_workload};

/// Why one stop in a reassignment batch was not moved.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemErrorReason {
    NotFound,
    NotAssignedToSource { actual: Option<TechnicianId> },
    Conflict { actual: Option<TechnicianId> },
    Store { message: String },
}

impl std::fmt::Display for ItemErrorReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemErrorReason::NotFound => f.write_str("not found"),
            ItemErrorReason::NotAssignedToSource { .. } => {
                f.write_str("not currently assigned to source")
            }
            ItemErrorReason::Conflict { .. } => f.write_str("assignment changed concurrently"),
            ItemErrorReason::Store { message } => write!(f, "store error: {}", message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemError {
    pub stop_id: StopId,
    pub reason: ItemErrorReason,
}

/// Outcome of a reassignment batch. Partial success is expected.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReassignmentReport {
    pub from_technician_id: TechnicianId,
    pub to_technician_id: TechnicianId,
    pub reassigned: Vec<StopId>,
    pub errors: Vec<ItemError>,
}

/// A candidate destination for a reassignment.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableTechnician {
    pub technician: Technician,
    pub workload: WorkloadMetrics,
    pub available_capacity: usize,
}

impl<S, D, Z> AssignmentEngine<S, D, Z>
where
    S: JobStore,
    D: TechnicianDirectory,
    Z: ZoneResolver,
{
    /// Move `stop_ids` from `from` to `to`.
    ///
    /// The destination's capacity is checked for the whole batch before any
    /// write. Each stop is then moved only if `from` still owns it; anything
    /// else is reported per item and leaves the stop untouched.
    pub fn reassign_stops(
        &self,
        from: &TechnicianId,
        to: &TechnicianId,
        stop_ids: &[StopId],
    ) -> Result<ReassignmentReport> {
        let destination = self
            .directory
            .technician(to)
            .ok_or_else(|| AssignmentError::technician_not_found(to))?;

        let workload = self
            .workload(&destination.id)
            .ok_or_else(|| AssignmentError::WorkloadUnavailable(destination.id.clone()))?;

        let max = self.config.max_stops_per_technician;
        if workload.total_stops + stop_ids.len() > max {
            tracing::warn!(
                technician_id = %destination.id,
                current = workload.total_stops,
                requested = stop_ids.len(),
                max,
                "Reassignment rejected, capacity exceeded"
            );
            return Err(AssignmentError::CapacityExceeded {
                technician: destination.id,
                current: workload.total_stops,
                requested: stop_ids.len(),
                max,
            });
        }

        let mut reassigned = Vec::new();
        let mut errors = Vec::new();

        for stop_id in stop_ids {
            match self.move_stop(stop_id, from, &destination.id) {
                Ok(stop) => reassigned.push(stop.id),
                Err(reason) => {
                    tracing::debug!(stop_id = %stop_id, reason = %reason, "Stop not reassigned");
                    errors.push(ItemError {
                        stop_id: stop_id.clone(),
                        reason,
                    });
                }
            }
        }

        tracing::info!(
            from = %from,
            to = %destination.id,
            reassigned = reassigned.len(),
            errors = errors.len(),
            "Reassignment finished"
        );

        Ok(ReassignmentReport {
            from_technician_id: from.clone(),
            to_technician_id: destination.id,
            reassigned,
            errors,
        })
    }

    fn move_stop(
        &self,
        stop_id: &StopId,
        from: &TechnicianId,
        to: &TechnicianId,
    ) -> std::result::Result<Stop, ItemErrorReason> {
        let current = self.store.stop(stop_id).ok_or(ItemErrorReason::NotFound)?;
        if !current.is_assigned_to(from) {
            return Err(ItemErrorReason::NotAssignedToSource {
                actual: current.assigned_technician_id,
            });
        }

        self.store
            .set_assignment(AssignmentChange {
                stop_id: stop_id.clone(),
                expected: Some(from.clone()),
                technician_id: Some(to.clone()),
                source: Some(AssignmentSource::Manual),
                reassigned_from: Some(from.clone()),
            })
            .map_err(|err| match err {
                StoreError::StopNotFound(_) => ItemErrorReason::NotFound,
                StoreError::Conflict { actual, .. } => ItemErrorReason::Conflict { actual },
                StoreError::Backend(message) => ItemErrorReason::Store { message },
            })
    }

    /// Release a stop back to the unassigned pool if `technician_id` still owns it.
    pub fn unassign(&self, stop_id: &StopId, technician_id: &TechnicianId) -> Result<Stop> {
        let stop = self
            .store
            .set_assignment(AssignmentChange {
                stop_id: stop_id.clone(),
                expected: Some(technician_id.clone()),
                technician_id: None,
                source: None,
                reassigned_from: None,
            })?;
        tracing::info!(stop_id = %stop_id, technician_id = %technician_id, "Stop unassigned");
        Ok(stop)
    }

    /// Peers of `technician_id`, most spare capacity first.
    pub fn list_available_technicians(
        &self,
        technician_id: &TechnicianId,
    ) -> Result<Vec<AvailableTechnician>> {
        let technician = self
            .directory
            .technician(technician_id)
            .ok_or_else(|| AssignmentError::technician_not_found(technician_id))?;

        let coverage = Coverage::of(&technician);
        let peers = self.peers(&technician.id, &coverage.zones, &coverage.counties);
        let max = self.config.max_stops_per_technician;

        let mut available: Vec<AvailableTechnician> = peers
            .into_par_iter()
            .filter_map(|peer| {
                let workload =
                    calculate_workload(&self.store, &self.directory, &peer.id, &self.config)?;
                Some(AvailableTechnician {
                    available_capacity: workload.remaining_capacity(max),
                    technician: peer,
                    workload,
                })
            })
            .collect();

        available.sort_by(|a, b| b.available_capacity.cmp(&a.available_capacity));
        Ok(available)
    }
}
