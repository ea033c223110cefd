//! Great-circle distance and unit conversions.

use crate::types::Location;

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Miles per kilometre.
pub const MILES_PER_KM: f64 = 0.621371;

/// Great-circle distance between two locations in kilometres (haversine).
///
/// Identical coordinates return exactly `0.0`.
pub fn air_distance_km(src: &Location, dst: &Location) -> f64 {
    if src == dst {
        return 0.0;
    }

    let lat1 = src.latitude.to_radians();
    let lat2 = dst.latitude.to_radians();
    let dlat = lat2 - lat1;
    let dlon = (dst.longitude - src.longitude).to_radians();

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Great-circle distance between two locations in miles.
pub fn air_distance_miles(src: &Location, dst: &Location) -> f64 {
    km_to_miles(air_distance_km(src, dst))
}

pub fn km_to_miles(km: f64) -> f64 {
    km * MILES_PER_KM
}

pub fn miles_to_km(miles: f64) -> f64 {
    miles / MILES_PER_KM
}

/// Distance unit used by distance constraints and functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceUnit {
    #[default]
    Km,
    #[serde(alias = "miles")]
    Mi,
}

impl DistanceUnit {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "km" | "kilometers" | "kilometres" => Some(Self::Km),
            "mi" | "mile" | "miles" => Some(Self::Mi),
            _ => None,
        }
    }

    /// Distance between two locations in this unit.
    pub fn distance(self, src: &Location, dst: &Location) -> f64 {
        match self {
            Self::Km => air_distance_km(src, dst),
            Self::Mi => air_distance_miles(src, dst),
        }
    }
}
