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

//! Static description of every metric the pipeline can report on.
//!
//! Each [`MetricSpec`] names the field readings are stored under, how raw values are
//! converted for display and which extra queries and derived values the metric needs.
//! Adding a metric means adding a row to [`METRICS`], not new pipeline code.

use crate::query::Aggregation;
use crate::units;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Field holding the direction the wind is blowing from, in degrees.
pub const WIND_DIRECTION_FIELD: &str = "wind_direction";

const ONE_HOUR: Duration = Duration::from_secs(3_600);
const ONE_DAY: Duration = Duration::from_secs(86_400);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MetricId {
    Temperature,
    Humidity,
    Pressure,
    Wind,
    DewPoint,
    Precipitation,
    Lightning,
    SolarRadiation,
    Illuminance,
}

impl MetricId {
    pub const ALL: [MetricId; 9] = [
        MetricId::Temperature,
        MetricId::Humidity,
        MetricId::Pressure,
        MetricId::Wind,
        MetricId::DewPoint,
        MetricId::Precipitation,
        MetricId::Lightning,
        MetricId::SolarRadiation,
        MetricId::Illuminance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Temperature => "temperature",
            Self::Humidity => "humidity",
            Self::Pressure => "pressure",
            Self::Wind => "wind",
            Self::DewPoint => "dew-point",
            Self::Precipitation => "precipitation",
            Self::Lightning => "lightning",
            Self::SolarRadiation => "solar-radiation",
            Self::Illuminance => "illuminance",
        }
    }

    pub fn spec(&self) -> &'static MetricSpec {
        match self {
            Self::Temperature => &METRICS[0],
            Self::Humidity => &METRICS[1],
            Self::Pressure => &METRICS[2],
            Self::Wind => &METRICS[3],
            Self::DewPoint => &METRICS[4],
            Self::Precipitation => &METRICS[5],
            Self::Lightning => &METRICS[6],
            Self::SolarRadiation => &METRICS[7],
            Self::Illuminance => &METRICS[8],
        }
    }
}

impl fmt::Display for MetricId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown metric {0}")]
pub struct UnknownMetric(pub String);

impl FromStr for MetricId {
    type Err = UnknownMetric;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MetricId::ALL
            .iter()
            .find(|id| id.as_str() == s)
            .copied()
            .ok_or_else(|| UnknownMetric(s.to_owned()))
    }
}

/// Query for the most recent single reading of a metric.
#[derive(Debug, Clone, Copy)]
pub struct Latest {
    /// Field to read, or `None` to use the metric's source field.
    pub field: Option<&'static str>,
    pub range: Duration,
    pub positive_only: bool,
    pub convert: fn(f64) -> f64,
    /// Report this reading even when the summary series has no points.
    pub independent: bool,
}

const fn latest_within_hour(convert: fn(f64) -> f64) -> Option<Latest> {
    Some(Latest {
        field: None,
        range: ONE_HOUR,
        positive_only: false,
        convert,
        independent: false,
    })
}

/// Metric specific values computed after merging and converting a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Derivation {
    /// Rising, falling or steady based on the last three points.
    PressureTrend,
    /// Maximum of a separate field over the whole range, converted with the metric.
    PeakGust { field: &'static str },
    /// Sum of converted values, two decimal places.
    Total,
    /// Sum of raw per-bucket counts.
    TotalCount,
}

#[derive(Debug)]
pub struct MetricSpec {
    pub id: MetricId,
    pub source_field: &'static str,
    pub unit: &'static str,
    pub label: &'static str,
    pub convert: fn(f64) -> f64,
    /// Aggregation used for the hourly summary series.
    pub series: Aggregation,
    pub latest: Option<Latest>,
    pub derivations: &'static [Derivation],
}

pub static METRICS: [MetricSpec; 9] = [
    MetricSpec {
        id: MetricId::Temperature,
        source_field: "temp",
        unit: "°F",
        label: "Temperature",
        convert: units::celsius_to_fahrenheit,
        series: Aggregation::Mean,
        latest: latest_within_hour(units::celsius_to_fahrenheit),
        derivations: &[],
    },
    MetricSpec {
        id: MetricId::Humidity,
        source_field: "humidity",
        unit: "%",
        label: "Humidity",
        convert: units::whole,
        series: Aggregation::Mean,
        latest: latest_within_hour(units::whole),
        derivations: &[],
    },
    MetricSpec {
        id: MetricId::Pressure,
        source_field: "p",
        unit: "inHg",
        label: "Pressure",
        convert: units::hpa_to_inhg,
        series: Aggregation::Mean,
        latest: latest_within_hour(units::hpa_to_inhg),
        derivations: &[Derivation::PressureTrend],
    },
    MetricSpec {
        id: MetricId::Wind,
        source_field: "wind_avg",
        unit: "mph",
        label: "Wind Speed",
        convert: units::ms_to_mph,
        series: Aggregation::Mean,
        latest: latest_within_hour(units::ms_to_mph),
        derivations: &[Derivation::PeakGust { field: "wind_gust" }],
    },
    MetricSpec {
        id: MetricId::DewPoint,
        source_field: "dew_point",
        unit: "°F",
        label: "Dew Point",
        convert: units::celsius_to_fahrenheit,
        series: Aggregation::Mean,
        latest: latest_within_hour(units::celsius_to_fahrenheit),
        derivations: &[],
    },
    MetricSpec {
        id: MetricId::Precipitation,
        source_field: "precipitation",
        unit: "in",
        label: "Precipitation",
        convert: units::mm_to_inches,
        series: Aggregation::Sum,
        latest: Some(Latest {
            field: None,
            range: ONE_HOUR,
            positive_only: false,
            convert: units::mm_to_inches,
            independent: true,
        }),
        derivations: &[Derivation::Total],
    },
    MetricSpec {
        id: MetricId::Lightning,
        source_field: "strike_count",
        unit: "strikes",
        label: "Lightning",
        convert: units::identity,
        series: Aggregation::Sum,
        latest: Some(Latest {
            field: Some("strike_distance"),
            range: ONE_DAY,
            positive_only: true,
            convert: units::km_to_miles,
            independent: true,
        }),
        derivations: &[Derivation::TotalCount],
    },
    MetricSpec {
        id: MetricId::SolarRadiation,
        source_field: "solar_radiation",
        unit: "W/m²",
        label: "Solar Radiation",
        convert: units::whole,
        series: Aggregation::Mean,
        latest: latest_within_hour(units::whole),
        derivations: &[],
    },
    MetricSpec {
        id: MetricId::Illuminance,
        source_field: "illuminance",
        unit: "lux",
        label: "Illuminance",
        convert: units::whole,
        series: Aggregation::Mean,
        latest: latest_within_hour(units::whole),
        derivations: &[],
    },
];
