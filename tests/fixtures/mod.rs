//! Test fixtures for stop-assign.
//!
//! Provides realistic test data including:
//! - Real Atlanta-metro locations
//! - Builders for stops and technicians
//! - Store wrappers that inject write failures

#![allow(dead_code)]

pub mod atlanta_locations;

pub use atlanta_locations::*;

use stop_assign::memory::{InMemoryDirectory, InMemoryJobStore};
use stop_assign::model::{Stop, StopId, Technician, TechnicianId};
use stop_assign::traits::{AssignmentChange, JobStore};
use stop_assign::{EngineConfig, StoreError};
use stop_assign::coverage::NameMatchResolver;
use stop_assign::AssignmentEngine;

pub type TestEngine<S = InMemoryJobStore> = AssignmentEngine<S, InMemoryDirectory, NameMatchResolver>;

/// Builder for test stops with sensible defaults.
#[derive(Clone, Debug)]
pub struct StopBuilder {
    stop: Stop,
}

impl StopBuilder {
    pub fn new(id: &str) -> Self {
        let mut stop = Stop::new(id);
        stop.county = "Fulton".to_string();
        Self { stop }
    }

    pub fn at(mut self, location: Location) -> Self {
        self.stop.latitude = Some(location.lat);
        self.stop.longitude = Some(location.lng);
        self.stop.address = location.name.to_string();
        self
    }

    pub fn county(mut self, county: &str) -> Self {
        self.stop.county = county.to_string();
        self
    }

    pub fn city(mut self, city: &str) -> Self {
        self.stop.city = city.to_string();
        self
    }

    pub fn assigned_to(mut self, technician: &str) -> Self {
        self.stop.assigned_technician_id = Some(TechnicianId::new(technician));
        self
    }

    pub fn build(self) -> Stop {
        self.stop
    }
}

/// Builder for test technicians.
#[derive(Clone, Debug)]
pub struct TechnicianBuilder {
    technician: Technician,
}

impl TechnicianBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            technician: Technician::new(id, format!("Tech {}", id)),
        }
    }

    pub fn zone(mut self, zone: &str) -> Self {
        self.technician.coverage_zones.insert(zone.to_string());
        self
    }

    pub fn county(mut self, county: &str) -> Self {
        self.technician.coverage_counties.insert(county.to_string());
        self
    }

    pub fn build(self) -> Technician {
        self.technician
    }
}

/// `count` stops in Fulton already held by `technician`, without coordinates.
pub fn existing_load(technician: &str, count: usize) -> Vec<Stop> {
    (0..count)
        .map(|i| {
            StopBuilder::new(&format!("{}-load-{}", technician, i))
                .assigned_to(technician)
                .build()
        })
        .collect()
}

/// Unassigned stops at each location, ids prefixed with `prefix`.
pub fn stops_at(prefix: &str, locations: &[Location]) -> Vec<Stop> {
    locations
        .iter()
        .enumerate()
        .map(|(i, location)| StopBuilder::new(&format!("{}-{}", prefix, i)).at(*location).build())
        .collect()
}

pub fn engine(technicians: Vec<Technician>, stops: Vec<Stop>) -> TestEngine {
    engine_with_config(technicians, stops, EngineConfig::default())
}

pub fn engine_with_config(
    technicians: Vec<Technician>,
    stops: Vec<Stop>,
    config: EngineConfig,
) -> TestEngine {
    AssignmentEngine::new(
        InMemoryJobStore::from_stops(stops),
        InMemoryDirectory::from_technicians(technicians),
        NameMatchResolver::new(),
        config,
    )
}

pub fn engine_over<S: JobStore>(store: S, technicians: Vec<Technician>) -> TestEngine<S> {
    AssignmentEngine::new(
        store,
        InMemoryDirectory::from_technicians(technicians),
        NameMatchResolver::new(),
        EngineConfig::default(),
    )
}

pub fn owner(stop: Option<Stop>) -> Option<String> {
    stop.and_then(|s| s.assigned_technician_id).map(|id| id.0)
}

/// Store whose writes fail for a fixed set of stops.
pub struct FailingStore {
    pub inner: InMemoryJobStore,
    pub failing: Vec<StopId>,
}

impl JobStore for FailingStore {
    fn stops_assigned_to(&self, technician_id: &TechnicianId) -> Vec<Stop> {
        self.inner.stops_assigned_to(technician_id)
    }

    fn unassigned_stops(&self) -> Vec<Stop> {
        self.inner.unassigned_stops()
    }

    fn stop(&self, stop_id: &StopId) -> Option<Stop> {
        self.inner.stop(stop_id)
    }

    fn set_assignment(&self, change: AssignmentChange) -> Result<Stop, StoreError> {
        if self.failing.contains(&change.stop_id) {
            return Err(StoreError::Backend(format!("write refused for {}", change.stop_id)));
        }
        self.inner.set_assignment(change)
    }
}

/// Store where `rival` takes the contested stop just before each write to it.
pub struct RacingStore {
    pub inner: InMemoryJobStore,
    pub contested: StopId,
    pub rival: TechnicianId,
}

impl JobStore for RacingStore {
    fn stops_assigned_to(&self, technician_id: &TechnicianId) -> Vec<Stop> {
        self.inner.stops_assigned_to(technician_id)
    }

    fn unassigned_stops(&self) -> Vec<Stop> {
        self.inner.unassigned_stops()
    }

    fn stop(&self, stop_id: &StopId) -> Option<Stop> {
        self.inner.stop(stop_id)
    }

    fn set_assignment(&self, change: AssignmentChange) -> Result<Stop, StoreError> {
        if change.stop_id == self.contested {
            if let Some(mut stop) = self.inner.stop(&change.stop_id) {
                if stop.assigned_technician_id.as_ref() != Some(&self.rival) {
                    stop.assigned_technician_id = Some(self.rival.clone());
                    self.inner.insert(stop);
                }
            }
        }
        self.inner.set_assignment(change)
    }
}
