// weather_stats - Weather station statistics from InfluxDB, api.weather.gov and SNOTEL
//
// Copyright 2022 Nick Pillitteri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.
//

//! Great-circle math and compass classifiers.
//!
//! Two classifiers live here and are intentionally separate: [`bearing_to_compass16`]
//! rounds a bearing to the nearest of 16 points and is used when describing where a remote
//! station is relative to the reference point. [`wind_cardinal`] uses a fixed table of
//! half-open ranges and is used for wind direction readings.

use serde::{Deserialize, Serialize};

/// Mean radius of the earth in miles.
pub const EARTH_RADIUS_MILES: f64 = 3959.0;

const COMPASS_16: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW", "NNW",
];

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Coordinate { latitude, longitude }
    }

    pub fn distance_miles(&self, other: &Coordinate) -> f64 {
        haversine_distance_miles(self.latitude, self.longitude, other.latitude, other.longitude)
    }

    pub fn bearing_to(&self, other: &Coordinate) -> f64 {
        initial_bearing_degrees(self.latitude, self.longitude, other.latitude, other.longitude)
    }
}

/// Great-circle distance in miles between two points using the haversine formula.
pub fn haversine_distance_miles(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2) + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_MILES * c
}

/// Forward azimuth from the first point towards the second, in `[0, 360)` degrees.
pub fn initial_bearing_degrees(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
    let d_lon = (lon2 - lon1).to_radians();
    let y = d_lon.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * d_lon.cos();
    let bearing = (y.atan2(x).to_degrees() + 360.0) % 360.0;
    // -0.0 and values that round up to exactly 360.0 both belong at north
    if bearing >= 360.0 {
        0.0
    } else {
        bearing.abs()
    }
}

/// Nearest of the 16 compass points, each sector 22.5° wide and centered on its name.
pub fn bearing_to_compass16(bearing: f64) -> &'static str {
    let index = (bearing / 22.5).round().rem_euclid(16.0) as usize;
    COMPASS_16[index % 16]
}

/// Compass name of a wind direction reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cardinal {
    pub short: &'static str,
    pub full: &'static str,
}

struct CardinalBin {
    min: f64,
    max: f64,
    cardinal: Cardinal,
}

const fn bin(min: f64, max: f64, short: &'static str, full: &'static str) -> CardinalBin {
    CardinalBin {
        min,
        max,
        cardinal: Cardinal { short, full },
    }
}

const NORTH: Cardinal = Cardinal {
    short: "N",
    full: "North",
};

// Half-open [min, max) ranges. North appears twice to cover the wraparound at 360.
const WIND_BINS: [CardinalBin; 17] = [
    bin(0.0, 11.25, "N", "North"),
    bin(11.25, 33.75, "NNE", "North-Northeast"),
    bin(33.75, 56.25, "NE", "Northeast"),
    bin(56.25, 78.75, "ENE", "East-Northeast"),
    bin(78.75, 101.25, "E", "East"),
    bin(101.25, 123.75, "ESE", "East-Southeast"),
    bin(123.75, 146.25, "SE", "Southeast"),
    bin(146.25, 168.75, "SSE", "South-Southeast"),
    bin(168.75, 191.25, "S", "South"),
    bin(191.25, 213.75, "SSW", "South-Southwest"),
    bin(213.75, 236.25, "SW", "Southwest"),
    bin(236.25, 258.75, "WSW", "West-Southwest"),
    bin(258.75, 281.25, "W", "West"),
    bin(281.25, 303.75, "WNW", "West-Northwest"),
    bin(303.75, 326.25, "NW", "Northwest"),
    bin(326.25, 348.75, "NNW", "North-Northwest"),
    bin(348.75, 360.0, "N", "North"),
];

/// Classify a wind direction in degrees using the fixed half-open bin table.
///
/// Input is normalized into `[0, 360)` first. Anything that matches no bin (`NaN`) is
/// reported as north.
pub fn wind_cardinal(degrees: f64) -> Cardinal {
    let normalized = ((degrees % 360.0) + 360.0) % 360.0;
    WIND_BINS
        .iter()
        .find(|b| normalized >= b.min && normalized < b.max)
        .map(|b| b.cardinal)
        .unwrap_or(NORTH)
}

#[cfg(test)]
mod tests {
    use super::*;

    const REFERENCE: Coordinate = Coordinate {
        latitude: 47.470597,
        longitude: -121.825356,
    };

    #[test]
    fn test_distance_same_point() {
        assert_eq!(0.0, REFERENCE.distance_miles(&REFERENCE));
    }

    #[test]
    fn test_distance_one_degree_latitude() {
        // One degree of latitude is 3959 * pi / 180 miles
        let north = Coordinate::new(REFERENCE.latitude + 1.0, REFERENCE.longitude);
        let d = REFERENCE.distance_miles(&north);
        assert!((d - 69.097).abs() < 0.01, "distance was {}", d);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let other = Coordinate::new(47.2, -121.4);
        let a = REFERENCE.distance_miles(&other);
        let b = other.distance_miles(&REFERENCE);
        assert!((a - b).abs() < 1e-9);
    }

    #[test]
    fn test_bearing_cardinal_points() {
        let north = Coordinate::new(REFERENCE.latitude + 0.5, REFERENCE.longitude);
        let south = Coordinate::new(REFERENCE.latitude - 0.5, REFERENCE.longitude);
        let east = Coordinate::new(0.0, 1.0);
        let west = Coordinate::new(0.0, -1.0);
        let origin = Coordinate::new(0.0, 0.0);

        assert!(REFERENCE.bearing_to(&north).abs() < 1e-9);
        assert!((REFERENCE.bearing_to(&south) - 180.0).abs() < 1e-9);
        assert!((origin.bearing_to(&east) - 90.0).abs() < 1e-9);
        assert!((origin.bearing_to(&west) - 270.0).abs() < 1e-9);
    }

    #[test]
    fn test_bearing_reference_to_station() {
        let north = Coordinate::new(REFERENCE.latitude + 0.5, REFERENCE.longitude);
        assert_eq!("N", bearing_to_compass16(REFERENCE.bearing_to(&north)));
        assert_eq!("S", bearing_to_compass16(north.bearing_to(&REFERENCE)));
    }

    #[test]
    fn test_bearing_in_range() {
        let points = [
            Coordinate::new(47.0, -122.5),
            Coordinate::new(48.0, -121.0),
            Coordinate::new(46.9, -121.0),
            Coordinate::new(47.9, -122.9),
        ];

        for p in points.iter() {
            let b = REFERENCE.bearing_to(p);
            assert!((0.0..360.0).contains(&b), "bearing {} out of range", b);
        }
    }

    #[test]
    fn test_compass16() {
        assert_eq!("N", bearing_to_compass16(0.0));
        assert_eq!("N", bearing_to_compass16(11.0));
        assert_eq!("NNE", bearing_to_compass16(11.25));
        assert_eq!("NNE", bearing_to_compass16(22.5));
        assert_eq!("NE", bearing_to_compass16(45.0));
        assert_eq!("E", bearing_to_compass16(90.0));
        assert_eq!("SSW", bearing_to_compass16(200.0));
        assert_eq!("NNW", bearing_to_compass16(337.5));
        assert_eq!("N", bearing_to_compass16(355.0));
        assert_eq!("N", bearing_to_compass16(359.99));
    }

    #[test]
    fn test_wind_cardinal_bins() {
        assert_eq!("N", wind_cardinal(0.0).short);
        assert_eq!("N", wind_cardinal(11.249).short);
        assert_eq!("NNE", wind_cardinal(11.25).short);
        assert_eq!("North-Northeast", wind_cardinal(20.0).full);
        assert_eq!("NE", wind_cardinal(33.75).short);
        assert_eq!("E", wind_cardinal(90.0).short);
        assert_eq!("S", wind_cardinal(180.0).short);
        assert_eq!("WSW", wind_cardinal(250.0).short);
        assert_eq!("W", wind_cardinal(270.0).short);
        assert_eq!("NNW", wind_cardinal(348.7).short);
        assert_eq!("N", wind_cardinal(348.75).short);
        assert_eq!("North", wind_cardinal(359.9).full);
    }

    #[test]
    fn test_wind_cardinal_normalizes() {
        assert_eq!("N", wind_cardinal(360.0).short);
        assert_eq!("E", wind_cardinal(450.0).short);
        assert_eq!("W", wind_cardinal(-90.0).short);
        assert_eq!("N", wind_cardinal(f64::NAN).short);
    }
}
