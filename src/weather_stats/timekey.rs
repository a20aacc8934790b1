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

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use std::fmt;

const KEY_FORMAT_MINUTE: &str = "%Y-%m-%dT%H:%M";
const KEY_FORMAT_DATE: &str = "%Y-%m-%d";
const LABEL_FORMAT_CLOCK: &str = "%-I:00 %p";

/// Key used to group, merge and sort aggregated points.
///
/// Keys are built from UTC timestamps with zero-padded fields so lexicographic order
/// matches chronological order for both the minute and date-only formats.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct TimeKey(String);

impl TimeKey {
    /// Build a key truncated to the minute (`YYYY-MM-DDTHH:MM`) if `include_time` is set,
    /// otherwise a date-only key (`YYYY-MM-DD`).
    pub fn new(ts: &DateTime<Utc>, include_time: bool) -> Self {
        let format = if include_time { KEY_FORMAT_MINUTE } else { KEY_FORMAT_DATE };
        TimeKey(ts.format(format).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[cfg(test)]
    pub(crate) fn raw(s: &str) -> Self {
        TimeKey(s.to_owned())
    }
}

impl fmt::Display for TimeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Wall-clock hour label (`h:00 AM`) for a timestamp in the given time zone.
///
/// Display only. Labels repeat every twelve hours and must never be used to merge series.
pub fn clock_label<Tz: TimeZone>(ts: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: fmt::Display,
{
    ts.with_timezone(tz).format(LABEL_FORMAT_CLOCK).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::America::Los_Angeles;

    #[test]
    fn test_key_with_time() {
        let ts = Utc.with_ymd_and_hms(2025, 12, 28, 14, 7, 59).unwrap();
        assert_eq!("2025-12-28T14:07", TimeKey::new(&ts, true).as_str());
    }

    #[test]
    fn test_key_date_only() {
        let ts = Utc.with_ymd_and_hms(2025, 12, 28, 23, 59, 0).unwrap();
        assert_eq!("2025-12-28", TimeKey::new(&ts, false).as_str());
    }

    #[test]
    fn test_key_order_matches_time_order() {
        let earlier = Utc.with_ymd_and_hms(2025, 9, 30, 22, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2025, 10, 1, 2, 0, 0).unwrap();

        assert!(TimeKey::new(&earlier, true) < TimeKey::new(&later, true));
        assert!(TimeKey::new(&earlier, false) < TimeKey::new(&later, false));
    }

    #[test]
    fn test_clock_label_utc() {
        let ts = Utc.with_ymd_and_hms(2025, 6, 1, 0, 30, 0).unwrap();
        assert_eq!("12:00 AM", clock_label(&ts, &Utc));

        let ts = Utc.with_ymd_and_hms(2025, 6, 1, 15, 0, 0).unwrap();
        assert_eq!("3:00 PM", clock_label(&ts, &Utc));
    }

    #[test]
    fn test_clock_label_local() {
        // 19:00 UTC is 12:00 PDT
        let ts = Utc.with_ymd_and_hms(2025, 6, 1, 19, 0, 0).unwrap();
        assert_eq!("12:00 PM", clock_label(&ts, &Los_Angeles));
    }
}
