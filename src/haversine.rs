//! Great-circle distance and point-set helpers.
//!
//! All distances are in miles. Points without coordinates are skipped by
//! every helper here.

use crate::error::{AssignmentError, Result};
use crate::model::Coordinates;
use crate::traits::Locatable;

/// Mean Earth radius in miles.
pub const EARTH_RADIUS_MILES: f64 = 3959.0;

/// Haversine distance between two points in miles.
///
/// Uses the `atan2` form so rounding that pushes the intermediate term past 1
/// near antipodal points cannot produce NaN.
pub fn distance(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lng = (lng2 - lng1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_MILES * c
}

/// Distance between two coordinate pairs in miles.
pub fn distance_between(from: Coordinates, to: Coordinates) -> f64 {
    distance(from.lat, from.lng, to.lat, to.lng)
}

/// Arithmetic mean of latitudes and longitudes.
///
/// This is a planar approximation, which is fine at metro scale.
pub fn centroid(points: &[Coordinates]) -> Result<Coordinates> {
    if points.is_empty() {
        return Err(AssignmentError::EmptyInput);
    }

    let count = points.len() as f64;
    let (lat_sum, lng_sum) = points
        .iter()
        .fold((0.0, 0.0), |(lat, lng), point| (lat + point.lat, lng + point.lng));

    Ok(Coordinates::new(lat_sum / count, lng_sum / count))
}

/// A point paired with its distance from an anchor.
#[derive(Debug, Clone)]
pub struct RankedPoint<'a, P> {
    pub point: &'a P,
    pub distance_miles: f64,
}

/// Points ordered nearest-first from the anchor. Ties keep input order.
pub fn sort_by_distance<P: Locatable>(
    points: &[P],
    anchor_lat: f64,
    anchor_lng: f64,
) -> Vec<RankedPoint<'_, P>> {
    let mut ranked: Vec<RankedPoint<'_, P>> = points
        .iter()
        .filter_map(|point| {
            let location = point.location()?;
            Some(RankedPoint {
                point,
                distance_miles: distance(anchor_lat, anchor_lng, location.lat, location.lng),
            })
        })
        .collect();

    // `sort_by` is stable, which is what keeps ties in input order.
    ranked.sort_by(|a, b| a.distance_miles.total_cmp(&b.distance_miles));
    ranked
}

/// Points within `radius_miles` of the anchor, boundary included.
pub fn filter_within_radius<P: Locatable>(
    points: &[P],
    anchor_lat: f64,
    anchor_lng: f64,
    radius_miles: f64,
) -> Vec<&P> {
    points
        .iter()
        .filter(|point| {
            point.location().is_some_and(|location| {
                distance(anchor_lat, anchor_lng, location.lat, location.lng) <= radius_miles
            })
        })
        .collect()
}
