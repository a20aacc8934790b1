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

//! Describe remote stations relative to a reference point.

use crate::geo::{self, Coordinate};
use crate::units;
use serde::Serialize;

/// A single dated reading from a remote station. `value` is `None` when the station
/// reported no data for that time.
#[derive(Debug, Clone, PartialEq)]
pub struct RawReading {
    pub date: String,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationReading {
    pub date: String,
    pub value: f64,
}

/// Readings and (possibly missing) metadata of a remote station.
#[derive(Debug, Clone, PartialEq)]
pub struct StationRecord {
    pub triplet_id: String,
    pub name: String,
    pub elevation: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub observations: Vec<RawReading>,
}

impl StationRecord {
    fn coordinate(&self) -> Option<Coordinate> {
        match (known(self.latitude), known(self.longitude)) {
            (Some(lat), Some(lon)) => Some(Coordinate::new(lat, lon)),
            _ => None,
        }
    }
}

/// Metadata values of zero mean the station did not report them.
fn known(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedStation {
    pub triplet_id: String,
    pub display_name: String,
    pub observations: Vec<StationReading>,
}

/// Name of a station with its distance, compass direction and elevation when known,
/// e.g. `Stampede Pass (14 mi ESE, 3,850 ft)`.
pub fn display_name(reference: &Coordinate, record: &StationRecord) -> String {
    let elevation = known(record.elevation).map(format_elevation);

    match (record.coordinate(), elevation) {
        (Some(coord), elevation) => {
            let distance = units::round_half_up(reference.distance_miles(&coord));
            let direction = geo::bearing_to_compass16(reference.bearing_to(&coord));
            match elevation {
                Some(e) => format!("{} ({} mi {}, {} ft)", record.name, distance, direction, e),
                None => format!("{} ({} mi {})", record.name, distance, direction),
            }
        }
        (None, Some(e)) => format!("{} ({} ft)", record.name, e),
        (None, None) => record.name.clone(),
    }
}

/// Drop missing readings and attach display names. Stations with no readings left are
/// excluded from the result.
pub fn correlate(reference: &Coordinate, records: &[StationRecord]) -> Vec<EnrichedStation> {
    records
        .iter()
        .filter_map(|record| {
            let observations: Vec<StationReading> = record
                .observations
                .iter()
                .filter_map(|r| {
                    r.value.map(|value| StationReading {
                        date: r.date.clone(),
                        value,
                    })
                })
                .collect();

            if observations.is_empty() {
                tracing::debug!(message = "excluding station without readings", triplet = %record.triplet_id);
                return None;
            }

            Some(EnrichedStation {
                triplet_id: record.triplet_id.clone(),
                display_name: display_name(reference, record),
                observations,
            })
        })
        .collect()
}

/// Whole feet with thousands separators.
fn format_elevation(feet: f64) -> String {
    let rounded = units::round_half_up(feet) as i64;
    let digits = rounded.unsigned_abs().to_string();

    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0 {
        out.push('-');
    }

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_REFERENCE;

    fn record(elevation: Option<f64>, latitude: Option<f64>, longitude: Option<f64>) -> StationRecord {
        StationRecord {
            triplet_id: "898:WA:SNTL".to_owned(),
            name: "Olallie Meadows".to_owned(),
            elevation,
            latitude,
            longitude,
            observations: vec![
                RawReading {
                    date: "2025-01-10 00:00".to_owned(),
                    value: Some(42.0),
                },
                RawReading {
                    date: "2025-01-10 01:00".to_owned(),
                    value: None,
                },
            ],
        }
    }

    #[test]
    fn test_format_elevation() {
        assert_eq!("0", format_elevation(0.0));
        assert_eq!("999", format_elevation(999.0));
        assert_eq!("4,030", format_elevation(4030.0));
        assert_eq!("1,000,000", format_elevation(999_999.6));
        assert_eq!("-1,200", format_elevation(-1200.0));
    }

    #[test]
    fn test_display_name_full() {
        // About 25 miles due north of the reference point
        let r = record(Some(4030.0), Some(47.832), Some(-121.825356));
        assert_eq!("Olallie Meadows (25 mi N, 4,030 ft)", display_name(&DEFAULT_REFERENCE, &r));
    }

    #[test]
    fn test_display_name_no_elevation() {
        let r = record(None, Some(47.2), Some(-121.825356));
        assert_eq!("Olallie Meadows (19 mi S)", display_name(&DEFAULT_REFERENCE, &r));
    }

    #[test]
    fn test_display_name_elevation_only() {
        let r = record(Some(3850.0), None, Some(-121.5));
        assert_eq!("Olallie Meadows (3,850 ft)", display_name(&DEFAULT_REFERENCE, &r));
    }

    #[test]
    fn test_display_name_zero_is_unknown() {
        let r = record(Some(0.0), Some(47.2), Some(-121.825356));
        assert_eq!("Olallie Meadows (19 mi S)", display_name(&DEFAULT_REFERENCE, &r));

        let r = record(Some(0.0), Some(0.0), Some(-121.825356));
        assert_eq!("Olallie Meadows", display_name(&DEFAULT_REFERENCE, &r));

        let r = record(Some(3850.0), Some(47.2), Some(0.0));
        assert_eq!("Olallie Meadows (3,850 ft)", display_name(&DEFAULT_REFERENCE, &r));
    }

    #[test]
    fn test_display_name_nothing_known() {
        let r = record(None, None, None);
        assert_eq!("Olallie Meadows", display_name(&DEFAULT_REFERENCE, &r));
    }

    #[test]
    fn test_correlate_drops_missing_values() {
        let stations = correlate(&DEFAULT_REFERENCE, &[record(None, None, None)]);

        assert_eq!(1, stations.len());
        assert_eq!("898:WA:SNTL", stations[0].triplet_id);
        assert_eq!(
            vec![StationReading {
                date: "2025-01-10 00:00".to_owned(),
                value: 42.0,
            }],
            stations[0].observations
        );
    }

    #[test]
    fn test_correlate_excludes_empty_stations() {
        let mut empty = record(None, None, None);
        empty.triplet_id = "899:WA:SNTL".to_owned();
        empty.observations.retain(|r| r.value.is_none());

        let stations = correlate(&DEFAULT_REFERENCE, &[empty, record(None, None, None)]);
        assert_eq!(1, stations.len());
        assert_eq!("898:WA:SNTL", stations[0].triplet_id);
    }

    #[test]
    fn test_enriched_station_json() {
        let stations = correlate(&DEFAULT_REFERENCE, &[record(None, None, None)]);
        let json = serde_json::to_value(&stations[0]).unwrap();

        assert_eq!("898:WA:SNTL", json["tripletId"]);
        assert_eq!("Olallie Meadows", json["displayName"]);
        assert_eq!(42.0, json["observations"][0]["value"]);
    }
}
