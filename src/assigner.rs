//! Cluster-preserving auto-assignment.
//!
//! Candidate stops in a technician's coverage are grouped into proximity
//! clusters, and whole clusters are handed out until the technician reaches
//! its balanced target. A cluster that would overshoot the target is skipped
//! entirely rather than split, so a day's stops stay geographically compact.

use std::collections::{BTreeSet, HashSet};

use serde::Serialize;

use crate::balancer::{BalanceResult, balance_workload};
use crate::cluster::cluster;
use crate::config::EngineConfig;
use crate::coverage::{find_matching_stops, peer_technicians};
use crate::error::{AssignmentError, Result};
use crate::model::{AssignmentSource, Coordinates, Stop, StopId, Technician, TechnicianId};
use crate::traits::{AssignmentChange, JobStore, TechnicianDirectory, ZoneResolver};
use crate::workload::{WorkloadMetrics, calculate_workload};

/// Parameters for one auto-assignment run.
#[derive(Debug, Clone)]
pub struct AutoAssignRequest {
    pub technician_id: TechnicianId,
    /// Replaces the technician's declared zones when set.
    pub zones: Option<BTreeSet<String>>,
    /// Replaces the technician's declared counties when set.
    pub counties: Option<BTreeSet<String>>,
    pub max_assignments: Option<usize>,
}

impl AutoAssignRequest {
    pub fn new(technician_id: impl Into<String>) -> Self {
        Self {
            technician_id: TechnicianId::new(technician_id),
            zones: None,
            counties: None,
            max_assignments: None,
        }
    }

    pub fn zones<I, T>(mut self, zones: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.zones = Some(zones.into_iter().map(Into::into).collect());
        self
    }

    pub fn counties<I, T>(mut self, counties: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.counties = Some(counties.into_iter().map(Into::into).collect());
        self
    }

    pub fn max_assignments(mut self, max: usize) -> Self {
        self.max_assignments = Some(max);
        self
    }
}

/// Why a candidate stop was left unassigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    ClusterTooLarge,
    BalanceLimitReached,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::ClusterTooLarge => f.write_str("cluster too large for remaining capacity"),
            SkipReason::BalanceLimitReached => f.write_str("workload balance limit reached"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DetailOutcome {
    Assigned,
    Skipped { reason: SkipReason },
    Failed { message: String },
}

/// The fate of a single candidate stop.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentDetail {
    pub stop_id: StopId,
    pub cluster_id: Option<usize>,
    #[serde(flatten)]
    pub outcome: DetailOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoAssignReport {
    pub technician_id: TechnicianId,
    pub assigned: usize,
    pub skipped: usize,
    /// Always zero; auto-assignment only takes unassigned stops.
    pub reassigned: usize,
    pub errors: usize,
    pub details: Vec<AssignmentDetail>,
    pub workload_before: usize,
    pub workload_after: usize,
    pub target_workload: usize,
    pub balance: BalanceResult,
    pub cluster_count: usize,
}

impl AutoAssignReport {
    pub fn assigned_stop_ids(&self) -> Vec<&StopId> {
        self.details
            .iter()
            .filter(|detail| detail.outcome == DetailOutcome::Assigned)
            .map(|detail| &detail.stop_id)
            .collect()
    }
}

/// Read-only view of a cluster that auto-assignment would walk.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterPreview {
    pub id: usize,
    pub centroid: Coordinates,
    pub stop_ids: Vec<StopId>,
    pub radius_miles: f64,
    pub estimated_route_miles: f64,
    pub area: Option<String>,
}

/// Coverage actually used for a run, after applying request overrides.
#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct Coverage {
    pub zones: BTreeSet<String>,
    pub counties: BTreeSet<String>,
}

impl Coverage {
    pub(crate) fn of(technician: &Technician) -> Self {
        Self {
            zones: technician.coverage_zones.clone(),
            counties: technician.coverage_counties.clone(),
        }
    }

    fn is_empty(&self) -> bool {
        self.zones.is_empty() && self.counties.is_empty()
    }
}

/// Assignment engine over a job store, a technician directory and a zone
/// resolver. Holds no state between calls beyond its collaborators.
#[derive(Debug)]
pub struct AssignmentEngine<S, D, Z> {
    pub(crate) store: S,
    pub(crate) directory: D,
    pub(crate) resolver: Z,
    pub(crate) config: EngineConfig,
}

impl<S, D, Z> AssignmentEngine<S, D, Z>
where
    S: JobStore,
    D: TechnicianDirectory,
    Z: ZoneResolver,
{
    pub fn new(store: S, directory: D, resolver: Z, config: EngineConfig) -> Self {
        Self {
            store,
            directory,
            resolver,
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn workload(&self, technician_id: &TechnicianId) -> Option<WorkloadMetrics> {
        calculate_workload(&self.store, &self.directory, technician_id, &self.config)
    }

    pub fn matching_stops(
        &self,
        zones: &BTreeSet<String>,
        counties: &BTreeSet<String>,
        exclude_technician: Option<&TechnicianId>,
    ) -> Vec<Stop> {
        find_matching_stops(&self.store, &self.resolver, zones, counties, exclude_technician)
    }

    pub fn peers(
        &self,
        technician_id: &TechnicianId,
        zones: &BTreeSet<String>,
        counties: &BTreeSet<String>,
    ) -> Vec<Technician> {
        peer_technicians(&self.directory, &self.resolver, technician_id, zones, counties)
    }

    pub fn balance(
        &self,
        technician_id: &TechnicianId,
        zones: &BTreeSet<String>,
        counties: &BTreeSet<String>,
    ) -> BalanceResult {
        balance_workload(
            &self.store,
            &self.directory,
            &self.resolver,
            technician_id,
            zones,
            counties,
            &self.config,
        )
    }

    /// Clusters of unassigned stops in the request's coverage, without writing.
    pub fn preview_clusters(&self, request: &AutoAssignRequest) -> Result<Vec<ClusterPreview>> {
        let technician = self
            .directory
            .technician(&request.technician_id)
            .ok_or_else(|| AssignmentError::technician_not_found(&request.technician_id))?;
        let coverage = coverage_for(&technician, request)?;
        let candidates = self.matching_stops(&coverage.zones, &coverage.counties, None);

        Ok(cluster(&candidates, self.config.cluster_radius_miles)
            .into_iter()
            .map(|group| ClusterPreview {
                id: group.id,
                centroid: group.centroid,
                stop_ids: group.members.iter().map(|stop| stop.id.clone()).collect(),
                radius_miles: group.radius_miles,
                estimated_route_miles: group.estimated_route_miles,
                area: group.area,
            })
            .collect())
    }

    /// Assign whole clusters of matching unassigned stops up to the
    /// technician's balanced target.
    ///
    /// Whole-call errors are returned before any write. Per-stop write
    /// failures are recorded in the report and never abort the batch.
    pub fn auto_assign(&self, request: &AutoAssignRequest) -> Result<AutoAssignReport> {
        let technician = self
            .directory
            .technician(&request.technician_id)
            .ok_or_else(|| AssignmentError::WorkloadUnavailable(request.technician_id.clone()))?;
        let coverage = coverage_for(&technician, request)?;

        let before = self
            .workload(&technician.id)
            .ok_or_else(|| AssignmentError::WorkloadUnavailable(technician.id.clone()))?;

        let balance = self.balance(&technician.id, &coverage.zones, &coverage.counties);
        let candidates = self.matching_stops(&coverage.zones, &coverage.counties, None);
        let clusters = cluster(&candidates, self.config.cluster_radius_miles);

        let target = request
            .max_assignments
            .map_or(balance.can_assign, |max| max.min(balance.can_assign));

        tracing::info!(
            technician_id = %technician.id,
            candidates = candidates.len(),
            clusters = clusters.len(),
            target,
            "Auto-assignment started"
        );

        let mut details = Vec::with_capacity(candidates.len());
        let mut touched: HashSet<&StopId> = HashSet::new();
        let mut assigned = 0usize;
        let mut errors = 0usize;

        for group in &clusters {
            if assigned >= target {
                break;
            }

            if assigned + group.stop_count() > target {
                tracing::debug!(
                    cluster_id = group.id,
                    size = group.stop_count(),
                    remaining = target - assigned,
                    "Cluster skipped, too large for remaining capacity"
                );
                for stop in &group.members {
                    touched.insert(&stop.id);
                    details.push(AssignmentDetail {
                        stop_id: stop.id.clone(),
                        cluster_id: Some(group.id),
                        outcome: DetailOutcome::Skipped {
                            reason: SkipReason::ClusterTooLarge,
                        },
                    });
                }
                continue;
            }

            for stop in &group.members {
                touched.insert(&stop.id);
                let outcome = match self.store.set_assignment(AssignmentChange {
                    stop_id: stop.id.clone(),
                    expected: None,
                    technician_id: Some(technician.id.clone()),
                    source: Some(AssignmentSource::Auto),
                    reassigned_from: None,
                }) {
                    Ok(_) => {
                        assigned += 1;
                        DetailOutcome::Assigned
                    }
                    Err(err) => {
                        errors += 1;
                        let err = AssignmentError::from(err);
                        tracing::warn!(stop_id = %stop.id, error = %err, "Stop assignment failed");
                        DetailOutcome::Failed {
                            message: err.to_string(),
                        }
                    }
                };
                details.push(AssignmentDetail {
                    stop_id: stop.id.clone(),
                    cluster_id: Some(group.id),
                    outcome,
                });
            }
        }

        let mut skipped = details
            .iter()
            .filter(|detail| matches!(detail.outcome, DetailOutcome::Skipped { .. }))
            .count();

        // Stops without coordinates are never clustered and land here too.
        for stop in &candidates {
            if touched.contains(&stop.id) {
                continue;
            }
            skipped += 1;
            details.push(AssignmentDetail {
                stop_id: stop.id.clone(),
                cluster_id: clusters
                    .iter()
                    .find(|group| group.members.iter().any(|member| member.id == stop.id))
                    .map(|group| group.id),
                outcome: DetailOutcome::Skipped {
                    reason: SkipReason::BalanceLimitReached,
                },
            });
        }

        let workload_after = self
            .workload(&technician.id)
            .map_or(before.total_stops + assigned, |after| after.total_stops);

        tracing::info!(
            technician_id = %technician.id,
            assigned,
            skipped,
            errors,
            workload_before = before.total_stops,
            workload_after,
            "Auto-assignment finished"
        );

        Ok(AutoAssignReport {
            technician_id: technician.id,
            assigned,
            skipped,
            reassigned: 0,
            errors,
            details,
            workload_before: before.total_stops,
            workload_after,
            target_workload: balance.target_count,
            balance,
            cluster_count: clusters.len(),
        })
    }
}

/// Apply the request's per-field coverage overrides to `technician`.
fn coverage_for(technician: &Technician, request: &AutoAssignRequest) -> Result<Coverage> {
    let declared = Coverage::of(technician);
    let coverage = Coverage {
        zones: request.zones.clone().unwrap_or(declared.zones),
        counties: request.counties.clone().unwrap_or(declared.counties),
    };

    if coverage.is_empty() {
        return Err(AssignmentError::NoCoverage(technician.id.clone()));
    }

    Ok(coverage)
}
