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

use crate::query::Observation;
use crate::timekey::TimeKey;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Values of a single aggregate series keyed by time bucket.
pub type KeyedSeries = BTreeMap<TimeKey, f64>;

/// One merged point of a chart series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub key: TimeKey,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub high: f64,
    pub low: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg: Option<f64>,
}

/// Up to three aggregate series to be merged into composite points.
///
/// Single series metrics should use only `mean`.
#[derive(Debug, Clone, Default)]
pub struct SeriesSet {
    pub mean: KeyedSeries,
    pub max: KeyedSeries,
    pub min: KeyedSeries,
}

impl SeriesSet {
    pub fn single(mean: KeyedSeries) -> Self {
        SeriesSet {
            mean,
            ..Default::default()
        }
    }

    /// Merge the series into points ordered by key.
    ///
    /// Every key present in any of the series produces exactly one point. High falls back
    /// to the mean for the same key, then to the min. Low falls back to the mean, then to
    /// the max. A key that only one series has therefore reports that value as both high
    /// and low. Keys absent from every series are absent from the output: nothing is
    /// interpolated or zero-filled between keys.
    pub fn merge(&self) -> Vec<SeriesPoint> {
        let keys: BTreeSet<&TimeKey> = self.mean.keys().chain(self.max.keys()).chain(self.min.keys()).collect();

        keys.into_iter()
            .map(|key| {
                let avg = self.mean.get(key).copied();
                let max = self.max.get(key).copied();
                let min = self.min.get(key).copied();

                SeriesPoint {
                    key: key.clone(),
                    label: None,
                    high: max.or(avg).or(min).unwrap_or(0.0),
                    low: min.or(avg).or(max).unwrap_or(0.0),
                    avg,
                }
            })
            .collect()
    }
}

/// Reduce observations to a keyed series, converting each value.
///
/// When two observations produce the same key the later one wins.
pub fn keyed<F>(observations: &[Observation], include_time: bool, convert: F) -> KeyedSeries
where
    F: Fn(f64) -> f64,
{
    observations
        .iter()
        .map(|o| (TimeKey::new(&o.timestamp, include_time), convert(o.value)))
        .collect()
}
