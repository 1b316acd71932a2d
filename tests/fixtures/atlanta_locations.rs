//! Real Atlanta-metro locations for realistic test fixtures.
//!
//! Groups are chosen so that, at the default 5 mile radius, each group forms
//! its own cluster when seeded from its first entry.

/// A named location with coordinates.
#[derive(Debug, Clone, Copy)]
pub struct Location {
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub const fn new(name: &'static str, lat: f64, lng: f64) -> Self {
        Self { name, lat, lng }
    }
}

// ============================================================================
// Midtown Atlanta (all within ~2 miles of Piedmont Park)
// ============================================================================

pub const MIDTOWN: &[Location] = &[
    Location::new("Piedmont Park", 33.7851, -84.3738),
    Location::new("Fox Theatre", 33.7725, -84.3857),
    Location::new("Georgia Tech", 33.7756, -84.3963),
    Location::new("Ponce City Market", 33.7726, -84.3655),
];

// ============================================================================
// Alpharetta (~20 miles north of Midtown)
// ============================================================================

pub const ALPHARETTA: &[Location] = &[
    Location::new("Avalon", 34.0712, -84.2757),
    Location::new("Alpharetta City Hall", 34.0754, -84.2941),
];

// ============================================================================
// Isolated singles (each 10+ miles from every other group)
// ============================================================================

pub const MARIETTA_SQUARE: Location = Location::new("Marietta Square", 33.9526, -84.5499);

pub const STONE_MOUNTAIN: Location = Location::new("Stone Mountain Park", 33.8082, -84.1702);

/// ~4.5 miles from Piedmont Park but ~5.1 miles from the Fox Theatre.
pub const DECATUR_SQUARE: Location = Location::new("Decatur Square", 33.7748, -84.2963);
