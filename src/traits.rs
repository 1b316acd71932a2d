//! Collaborator interfaces consumed by the assignment engine.
//!
//! These are intentionally minimal. A relational table, a document store or
//! the in-memory maps in [`crate::memory`] are all valid backings.

use std::collections::BTreeSet;

use crate::error::StoreError;
use crate::model::{AssignmentSource, Coordinates, Stop, StopId, Technician, TechnicianId};

/// Anything that may sit at a point on the map.
///
/// Items whose [`location`](Locatable::location) is `None` are excluded from
/// every geographic operation rather than treated as (0, 0).
pub trait Locatable {
    fn location(&self) -> Option<Coordinates>;

    /// City name used to label clusters.
    fn city(&self) -> Option<&str> {
        None
    }

    /// Postal code used to annotate cluster labels.
    fn postal_code(&self) -> Option<&str> {
        None
    }
}

impl<T: Locatable + ?Sized> Locatable for &T {
    fn location(&self) -> Option<Coordinates> {
        (**self).location()
    }

    fn city(&self) -> Option<&str> {
        (**self).city()
    }

    fn postal_code(&self) -> Option<&str> {
        (**self).postal_code()
    }
}

/// A single assignment write, applied only if the stop is still owned by
/// `expected` when the write lands.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentChange {
    pub stop_id: StopId,
    pub expected: Option<TechnicianId>,
    pub technician_id: Option<TechnicianId>,
    pub source: Option<AssignmentSource>,
    /// Prior owner to record in the stop's audit trail, if any.
    pub reassigned_from: Option<TechnicianId>,
}

/// Source of truth for stops and their current assignment.
pub trait JobStore: Send + Sync {
    fn stops_assigned_to(&self, technician_id: &TechnicianId) -> Vec<Stop>;

    fn unassigned_stops(&self) -> Vec<Stop>;

    fn stop(&self, stop_id: &StopId) -> Option<Stop>;

    /// Compare-and-swap on `assigned_technician_id`.
    ///
    /// Must fail with [`StoreError::Conflict`] when the stop's current owner
    /// differs from `change.expected`, leaving the stop untouched.
    fn set_assignment(&self, change: AssignmentChange) -> Result<Stop, StoreError>;
}

/// Registry of technicians and their declared coverage.
pub trait TechnicianDirectory: Send + Sync {
    fn technician(&self, technician_id: &TechnicianId) -> Option<Technician>;

    fn technicians(&self) -> Vec<Technician>;
}

/// Decides whether a county/city pair falls inside a set of zones or counties.
pub trait ZoneResolver: Send + Sync {
    fn matches(
        &self,
        county: &str,
        city: &str,
        target_zones: &BTreeSet<String>,
        target_counties: &BTreeSet<String>,
    ) -> bool;

    /// Canonical form of an area name. Peer discovery compares technicians'
    /// coverage through this, so it must agree with `matches`.
    fn canonical_area(&self, name: &str) -> String {
        crate::coverage::normalize_area(name)
    }
}
