use thiserror::Error;

use crate::model::{StopId, TechnicianId};

/// Whole-operation failures. Raised before any write is attempted, except
/// [`AssignmentError::AssignmentConflict`] which surfaces for single-stop writes.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AssignmentError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: String },

    #[error("Cannot compute the centroid of an empty point set")]
    EmptyInput,

    #[error("Technician {0} has no zones or counties to assign from")]
    NoCoverage(TechnicianId),

    #[error("Workload unavailable for technician {0}")]
    WorkloadUnavailable(TechnicianId),

    #[error(
        "Technician {technician} has {current} stops; adding {requested} would exceed the limit of {max}"
    )]
    CapacityExceeded {
        technician: TechnicianId,
        current: usize,
        requested: usize,
        max: usize,
    },

    #[error("Stop {stop} changed owner concurrently (expected {expected:?}, found {actual:?})")]
    AssignmentConflict {
        stop: StopId,
        expected: Option<TechnicianId>,
        actual: Option<TechnicianId>,
    },

    #[error("Store error: {0}")]
    Store(String),
}

impl AssignmentError {
    pub fn technician_not_found(id: &TechnicianId) -> Self {
        AssignmentError::NotFound {
            kind: EntityKind::Technician,
            id: id.to_string(),
        }
    }

    pub fn stop_not_found(id: &StopId) -> Self {
        AssignmentError::NotFound {
            kind: EntityKind::Stop,
            id: id.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Technician,
    Stop,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Technician => f.write_str("Technician"),
            EntityKind::Stop => f.write_str("Stop"),
        }
    }
}

/// Failures reported by a [`crate::traits::JobStore`] write.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Stop not found: {0}")]
    StopNotFound(StopId),

    #[error("Stop {stop} is owned by {actual:?}, expected {expected:?}")]
    Conflict {
        stop: StopId,
        expected: Option<TechnicianId>,
        actual: Option<TechnicianId>,
    },

    #[error("Backend error: {0}")]
    Backend(String),
}

impl From<StoreError> for AssignmentError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::StopNotFound(id) => AssignmentError::stop_not_found(&id),
            StoreError::Conflict {
                stop,
                expected,
                actual,
            } => AssignmentError::AssignmentConflict {
                stop,
                expected,
                actual,
            },
            StoreError::Backend(message) => AssignmentError::Store(message),
        }
    }
}

pub type Result<T> = std::result::Result<T, AssignmentError>;
