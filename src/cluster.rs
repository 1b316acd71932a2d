//! Greedy single-seed proximity clustering.
//!
//! The first remaining point becomes the seed of a new cluster and absorbs
//! every other remaining point within `radius_miles` of the seed itself.
//! Membership is measured against the seed only, never against other members,
//! so every cluster stays inside one circle of `radius_miles`. A point 1.5x the
//! radius from the seed is left out even if it sits next to an absorbed member.
//!
//! Seeds are taken in input order, so the output is deterministic for a given
//! input ordering.

use std::collections::HashMap;

use crate::haversine::{centroid, distance_between};
use crate::model::Coordinates;
use crate::traits::Locatable;

/// An ephemeral group of nearby points. Never persisted.
#[derive(Debug, Clone)]
pub struct Cluster<'a, P> {
    pub id: usize,
    pub centroid: Coordinates,
    /// Seed first, then absorbed points in input order.
    pub members: Vec<&'a P>,
    pub radius_miles: f64,
    /// Twice the widest pairwise gap. A display estimate, not a route length.
    pub estimated_route_miles: f64,
    pub area: Option<String>,
}

impl<'a, P> Cluster<'a, P> {
    pub fn seed(&self) -> &'a P {
        self.members[0]
    }

    pub fn stop_count(&self) -> usize {
        self.members.len()
    }
}

/// Group points into seed-radius clusters.
///
/// Points without coordinates are dropped. Empty input yields no clusters.
pub fn cluster<P: Locatable>(points: &[P], radius_miles: f64) -> Vec<Cluster<'_, P>> {
    let mut remaining: Vec<(&P, Coordinates)> = points
        .iter()
        .filter_map(|point| point.location().map(|location| (point, location)))
        .collect();

    let mut clusters = Vec::new();

    while !remaining.is_empty() {
        let (seed, seed_location) = remaining.remove(0);
        let mut members = vec![seed];
        let mut locations = vec![seed_location];

        remaining.retain(|&(point, location)| {
            if distance_between(seed_location, location) <= radius_miles {
                members.push(point);
                locations.push(location);
                false
            } else {
                true
            }
        });

        let Ok(center) = centroid(&locations) else {
            continue;
        };

        let id = clusters.len() + 1;
        tracing::trace!(cluster_id = id, members = members.len(), "Cluster formed");

        clusters.push(Cluster {
            id,
            centroid: center,
            estimated_route_miles: 2.0 * max_pairwise_distance(&locations),
            area: area_label(&members),
            members,
            radius_miles,
        });
    }

    clusters
}

fn max_pairwise_distance(locations: &[Coordinates]) -> f64 {
    let mut widest: f64 = 0.0;
    for (i, from) in locations.iter().enumerate() {
        for to in &locations[i + 1..] {
            widest = widest.max(distance_between(*from, *to));
        }
    }
    widest
}

/// Most frequent city among members (first seen wins ties), suffixed with the
/// first postal code found.
fn area_label<P: Locatable>(members: &[&P]) -> Option<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();

    for member in members {
        if let Some(city) = member.city() {
            let count = counts.entry(city).or_insert(0);
            if *count == 0 {
                order.push(city);
            }
            *count += 1;
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for city in order {
        let count = counts[city];
        if best.is_none_or(|(_, best_count)| count > best_count) {
            best = Some((city, count));
        }
    }

    let (city, _) = best?;
    match members.iter().find_map(|member| member.postal_code()) {
        Some(code) => Some(format!("{} {}", city, code)),
        None => Some(city.to_string()),
    }
}
