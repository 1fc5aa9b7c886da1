//! Location type definitions and the validity predicate.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Valid latitude range (degrees).
pub const MIN_LAT: f64 = -90.0;
pub const MAX_LAT: f64 = 90.0;

/// Valid longitude range (degrees).
pub const MIN_LNG: f64 = -180.0;
pub const MAX_LNG: f64 = 180.0;

/// Zoom levels accepted by the map SDK.
pub const MIN_ZOOM: i32 = 1;
pub const MAX_ZOOM: i32 = 20;

/// Geographic point in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    /// Latitude, north positive
    pub lat: f64,
    /// Longitude, east positive
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Returns `true` if both components are finite and within range.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (MIN_LAT..=MAX_LAT).contains(&self.lat)
            && (MIN_LNG..=MAX_LNG).contains(&self.lng)
    }
}

impl fmt::Display for LatLng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {:.4})", self.lat, self.lng)
    }
}

/// A named viewing target: where to point the map and how far to zoom in.
///
/// Locations are immutable once loaded. The `code` is the identity used by
/// the selector's anti-repetition set, so it must be unique within a catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Display name (e.g. "Japan").
    pub name: String,
    /// Unique, non-empty identifier (ISO 3166-1 alpha-2 for the built-in set).
    pub code: String,
    /// Map center when this location is shown.
    pub center: LatLng,
    /// Zoom level when this location is shown.
    pub zoom: i32,
}

impl Location {
    pub fn new(name: impl Into<String>, code: impl Into<String>, center: LatLng, zoom: i32) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
            center,
            zoom,
        }
    }

    /// Returns `true` iff every field constraint holds.
    pub fn is_valid(&self) -> bool {
        validate(self)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] {} z{}", self.name, self.code, self.center, self.zoom)
    }
}

/// Pure validity predicate over a candidate location.
///
/// Checks: non-empty code, latitude in `[-90, 90]`, longitude in
/// `[-180, 180]`, zoom in `[1, 20]`.
pub fn validate(candidate: &Location) -> bool {
    !candidate.code.trim().is_empty()
        && candidate.center.is_valid()
        && (MIN_ZOOM..=MAX_ZOOM).contains(&candidate.zoom)
}
