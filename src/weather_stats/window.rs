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

use serde::Serialize;
use std::fmt;
use std::time::Duration;

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;

/// Span over which raw observations are reduced into a single point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AggregationWindow {
    #[serde(rename = "15m")]
    FifteenMinutes,
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "2h")]
    TwoHours,
    #[serde(rename = "6h")]
    SixHours,
    #[serde(rename = "1d")]
    OneDay,
}

impl AggregationWindow {
    pub fn duration(&self) -> Duration {
        Duration::from_secs(match self {
            Self::FifteenMinutes => 15 * MINUTE,
            Self::OneHour => HOUR,
            Self::TwoHours => 2 * HOUR,
            Self::SixHours => 6 * HOUR,
            Self::OneDay => DAY,
        })
    }
}

impl fmt::Display for AggregationWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::FifteenMinutes => "15m",
            Self::OneHour => "1h",
            Self::TwoHours => "2h",
            Self::SixHours => "6h",
            Self::OneDay => "1d",
        };

        f.write_str(s)
    }
}

/// Window and key granularity to use for a historical range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSelection {
    pub window: AggregationWindow,
    pub include_time: bool,
}

/// Pick an aggregation window for a range of `days`, keeping charts to roughly 90-120
/// points regardless of range length.
///
/// Returns `None` for ranges of zero or fewer days, which callers must reject before
/// issuing any query.
pub fn select_window(days: i64) -> Option<WindowSelection> {
    let (window, include_time) = match days {
        d if d < 1 => return None,
        1 => (AggregationWindow::FifteenMinutes, true),
        2..=7 => (AggregationWindow::TwoHours, true),
        8..=30 => (AggregationWindow::SixHours, true),
        _ => (AggregationWindow::OneDay, false),
    };

    Some(WindowSelection { window, include_time })
}

/// Duration covering `days` whole days, or `None` if `days` is less than one or too
/// large to represent in seconds.
pub fn days_duration(days: i64) -> Option<Duration> {
    let days = u64::try_from(days).ok().filter(|d| *d > 0)?;
    days.checked_mul(DAY).map(Duration::from_secs)
}
