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

//! Unit conversions applied to raw station readings.
//!
//! Every conversion rounds to a fixed number of decimal places. Ties are rounded towards
//! positive infinity (`-2.5` becomes `-2`), not away from zero like [`f64::round`]. `NaN`
//! and infinite inputs are passed through unchanged.

/// Round to the nearest integer, ties towards positive infinity.
pub fn round_half_up(v: f64) -> f64 {
    (v + 0.5).floor()
}

/// Round to `places` decimal places, ties towards positive infinity.
pub fn round_to(v: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    round_half_up(v * factor) / factor
}

/// Degrees celsius to degrees fahrenheit, one decimal place.
pub fn celsius_to_fahrenheit(c: f64) -> f64 {
    round_to(c * 9.0 / 5.0 + 32.0, 1)
}

/// Hectopascals (millibars) to inches of mercury, two decimal places.
pub fn hpa_to_inhg(hpa: f64) -> f64 {
    round_to(hpa * 0.02953, 2)
}

/// Meters per second to miles per hour, one decimal place.
pub fn ms_to_mph(ms: f64) -> f64 {
    round_to(ms * 2.237, 1)
}

/// Millimeters to inches, two decimal places.
pub fn mm_to_inches(mm: f64) -> f64 {
    round_to(mm * 0.03937, 2)
}

/// Kilometers to whole miles.
pub fn km_to_miles(km: f64) -> f64 {
    round_half_up(km * 0.621371)
}

/// Whole units, used for percentages, W/m² and lux.
pub fn whole(v: f64) -> f64 {
    round_half_up(v)
}

/// Raw value, used for counts that are never rescaled.
pub fn identity(v: f64) -> f64 {
    v
}
