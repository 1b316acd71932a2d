//! Matching stops and technicians against zone/county coverage.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::model::{Stop, Technician, TechnicianId};
use crate::traits::{JobStore, TechnicianDirectory, ZoneResolver};

/// Canonical form of an area name: lowercase, single-spaced, without a
/// trailing "county".
pub fn normalize_area(name: &str) -> String {
    let collapsed = name
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    match collapsed.strip_suffix(" county") {
        Some(stripped) if !stripped.is_empty() => stripped.to_string(),
        _ => collapsed,
    }
}

/// Default resolver: a stop matches when its county or city names one of the
/// targets, after normalization and alias lookup.
#[derive(Debug, Clone, Default)]
pub struct NameMatchResolver {
    aliases: HashMap<String, String>,
}

impl NameMatchResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Treat `alias` as another name for `canonical`.
    pub fn with_alias(mut self, alias: &str, canonical: &str) -> Self {
        self.aliases
            .insert(normalize_area(alias), normalize_area(canonical));
        self
    }
}

impl ZoneResolver for NameMatchResolver {
    fn matches(
        &self,
        county: &str,
        city: &str,
        target_zones: &BTreeSet<String>,
        target_counties: &BTreeSet<String>,
    ) -> bool {
        let targets: HashSet<String> = target_zones
            .iter()
            .chain(target_counties)
            .map(|target| self.canonical_area(target))
            .filter(|target| !target.is_empty())
            .collect();

        [county, city]
            .into_iter()
            .map(|name| self.canonical_area(name))
            .any(|name| !name.is_empty() && targets.contains(&name))
    }

    fn canonical_area(&self, name: &str) -> String {
        let normalized = normalize_area(name);
        self.aliases.get(&normalized).cloned().unwrap_or(normalized)
    }
}

/// Open stops inside the given coverage.
///
/// Without `exclude_technician` this is discovery: only unassigned stops are
/// considered. With it, the candidates are the stops currently held by that
/// technician, for pulling work off an overloaded schedule.
pub fn find_matching_stops<S, Z>(
    store: &S,
    resolver: &Z,
    zones: &BTreeSet<String>,
    counties: &BTreeSet<String>,
    exclude_technician: Option<&TechnicianId>,
) -> Vec<Stop>
where
    S: JobStore + ?Sized,
    Z: ZoneResolver + ?Sized,
{
    if zones.is_empty() && counties.is_empty() {
        return Vec::new();
    }

    let pool = match exclude_technician {
        Some(technician_id) => store.stops_assigned_to(technician_id),
        None => store.unassigned_stops(),
    };

    pool.into_iter()
        .filter(|stop| stop.is_open())
        .filter(|stop| resolver.matches(&stop.county, &stop.city, zones, counties))
        .collect()
}

/// Other technicians whose declared zones or counties overlap the given ones,
/// with names compared in the resolver's canonical form.
pub fn peer_technicians<D, Z>(
    directory: &D,
    resolver: &Z,
    technician_id: &TechnicianId,
    zones: &BTreeSet<String>,
    counties: &BTreeSet<String>,
) -> Vec<Technician>
where
    D: TechnicianDirectory + ?Sized,
    Z: ZoneResolver + ?Sized,
{
    let targets: HashSet<String> = zones
        .iter()
        .chain(counties)
        .map(|name| resolver.canonical_area(name))
        .filter(|name| !name.is_empty())
        .collect();

    if targets.is_empty() {
        return Vec::new();
    }

    directory
        .technicians()
        .into_iter()
        .filter(|technician| &technician.id != technician_id)
        .filter(|technician| {
            technician
                .coverage_zones
                .iter()
                .chain(&technician.coverage_counties)
                .any(|area| targets.contains(&resolver.canonical_area(area)))
        })
        .collect()
}
