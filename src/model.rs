//! Stop and technician value types.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::traits::Locatable;

/// Identifier of a scheduled stop.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StopId(pub String);

impl StopId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a technician.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TechnicianId(pub String);

impl TechnicianId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TechnicianId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl Locatable for Coordinates {
    fn location(&self) -> Option<Coordinates> {
        Some(*self)
    }
}

/// How a stop ended up with its current technician.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentSource {
    Manual,
    Auto,
}

/// Lifecycle state of the job behind a stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    #[default]
    Scheduled,
    Completed,
    Cancelled,
}

/// A scheduled bin-cleaning job at one customer address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stop {
    pub id: StopId,
    #[serde(default)]
    pub address: String,
    // Both absent means the stop was never geocoded.
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(default)]
    pub county: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub zone: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub status: JobStatus,
    #[serde(default)]
    pub assigned_technician_id: Option<TechnicianId>,
    #[serde(default)]
    pub assignment_source: Option<AssignmentSource>,
    /// Technician the stop was last moved away from by a manual reassignment.
    #[serde(default)]
    pub reassigned_from: Option<TechnicianId>,
}

impl Stop {
    /// Unassigned, scheduled stop with no coordinates or area data.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: StopId::new(id),
            address: String::new(),
            latitude: None,
            longitude: None,
            county: String::new(),
            city: String::new(),
            zone: None,
            postal_code: None,
            status: JobStatus::Scheduled,
            assigned_technician_id: None,
            assignment_source: None,
            reassigned_from: None,
        }
    }

    pub fn is_assigned(&self) -> bool {
        self.assigned_technician_id.is_some()
    }

    pub fn is_assigned_to(&self, technician_id: &TechnicianId) -> bool {
        self.assigned_technician_id.as_ref() == Some(technician_id)
    }

    pub fn is_open(&self) -> bool {
        self.status == JobStatus::Scheduled
    }
}

impl Locatable for Stop {
    /// A stop is only placed on the map when both coordinates are present and finite.
    fn location(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) if lat.is_finite() && lng.is_finite() => {
                Some(Coordinates::new(lat, lng))
            }
            _ => None,
        }
    }

    fn city(&self) -> Option<&str> {
        let city = self.city.trim();
        (!city.is_empty()).then_some(city)
    }

    fn postal_code(&self) -> Option<&str> {
        self.postal_code
            .as_deref()
            .map(str::trim)
            .filter(|code| !code.is_empty())
    }
}

/// A field-service worker covering a set of zones and counties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Technician {
    pub id: TechnicianId,
    pub display_name: String,
    #[serde(default)]
    pub coverage_zones: BTreeSet<String>,
    #[serde(default)]
    pub coverage_counties: BTreeSet<String>,
}

impl Technician {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: TechnicianId::new(id),
            display_name: display_name.into(),
            coverage_zones: BTreeSet::new(),
            coverage_counties: BTreeSet::new(),
        }
    }

    pub fn has_coverage(&self) -> bool {
        !self.coverage_zones.is_empty() || !self.coverage_counties.is_empty()
    }
}
