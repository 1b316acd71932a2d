//! stop-assign core
//!
//! Geographic clustering and workload-balanced assignment of field-service
//! stops to technicians.

pub mod traits;
pub mod model;
pub mod error;
pub mod config;
pub mod haversine;
pub mod cluster;
pub mod workload;
pub mod coverage;
pub mod balancer;
pub mod assigner;
pub mod reassign;
pub mod memory;
pub mod dataset;

pub use assigner::{AssignmentEngine, AutoAssignReport, AutoAssignRequest};
pub use config::EngineConfig;
pub use error::{AssignmentError, Result, StoreError};
