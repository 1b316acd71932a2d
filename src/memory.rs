//! In-memory job store and technician directory.
//!
//! Stops are kept in insertion order so clustering seeds are stable across
//! calls. Assignment writes are compare-and-swap under the write lock.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::error::StoreError;
use crate::model::{Stop, StopId, Technician, TechnicianId};
use crate::traits::{AssignmentChange, JobStore, TechnicianDirectory};

#[derive(Debug, Default)]
struct StopTable {
    stops: Vec<Stop>,
    index: HashMap<StopId, usize>,
}

#[derive(Debug, Default)]
pub struct InMemoryJobStore {
    table: RwLock<StopTable>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_stops(stops: impl IntoIterator<Item = Stop>) -> Self {
        let store = Self::new();
        for stop in stops {
            store.insert(stop);
        }
        store
    }

    /// Insert or replace a stop. Replacement keeps the original position.
    pub fn insert(&self, stop: Stop) {
        let mut table = self.table.write();
        match table.index.get(&stop.id).copied() {
            Some(position) => table.stops[position] = stop,
            None => {
                let position = table.stops.len();
                table.index.insert(stop.id.clone(), position);
                table.stops.push(stop);
            }
        }
    }

    /// Copy of every stop in insertion order.
    pub fn snapshot(&self) -> Vec<Stop> {
        self.table.read().stops.clone()
    }

    pub fn len(&self) -> usize {
        self.table.read().stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl JobStore for InMemoryJobStore {
    fn stops_assigned_to(&self, technician_id: &TechnicianId) -> Vec<Stop> {
        self.table
            .read()
            .stops
            .iter()
            .filter(|stop| stop.is_assigned_to(technician_id))
            .cloned()
            .collect()
    }

    fn unassigned_stops(&self) -> Vec<Stop> {
        self.table
            .read()
            .stops
            .iter()
            .filter(|stop| !stop.is_assigned())
            .cloned()
            .collect()
    }

    fn stop(&self, stop_id: &StopId) -> Option<Stop> {
        let table = self.table.read();
        table
            .index
            .get(stop_id)
            .map(|&position| table.stops[position].clone())
    }

    fn set_assignment(&self, change: AssignmentChange) -> Result<Stop, StoreError> {
        let mut table = self.table.write();
        let position = *table
            .index
            .get(&change.stop_id)
            .ok_or_else(|| StoreError::StopNotFound(change.stop_id.clone()))?;
        let stop = &mut table.stops[position];

        if stop.assigned_technician_id != change.expected {
            return Err(StoreError::Conflict {
                stop: change.stop_id,
                expected: change.expected,
                actual: stop.assigned_technician_id.clone(),
            });
        }

        stop.assigned_technician_id = change.technician_id;
        stop.assignment_source = change.source;
        if change.reassigned_from.is_some() {
            stop.reassigned_from = change.reassigned_from;
        }

        Ok(stop.clone())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    technicians: RwLock<Vec<Technician>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_technicians(technicians: impl IntoIterator<Item = Technician>) -> Self {
        let directory = Self::new();
        for technician in technicians {
            directory.insert(technician);
        }
        directory
    }

    /// Insert or replace a technician by id.
    pub fn insert(&self, technician: Technician) {
        let mut technicians = self.technicians.write();
        match technicians.iter_mut().find(|t| t.id == technician.id) {
            Some(existing) => *existing = technician,
            None => technicians.push(technician),
        }
    }
}

impl TechnicianDirectory for InMemoryDirectory {
    fn technician(&self, technician_id: &TechnicianId) -> Option<Technician> {
        self.technicians
            .read()
            .iter()
            .find(|t| &t.id == technician_id)
            .cloned()
    }

    fn technicians(&self) -> Vec<Technician> {
        self.technicians.read().clone()
    }
}
