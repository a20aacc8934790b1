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

use crate::pipeline::{StatSummary, WindDirection};
use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::gauge::Gauge;
use prometheus_client::registry::Registry;
use std::sync::atomic::AtomicU64;

const WIND_DIRECTION: &str = "wind-direction";

#[derive(Debug, Clone, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct MetricLabels {
    pub metric: String,
}

#[derive(Debug, Clone, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct UpstreamLabels {
    pub upstream: String,
}

/// Values and failures observed while serving requests.
///
/// All metrics are created and registered upon call to `StatsMetrics::new()` and share
/// the prefix of the registry they are registered with.
#[derive(Debug)]
pub struct StatsMetrics {
    current: Family<MetricLabels, Gauge<f64, AtomicU64>>,
    summaries: Family<MetricLabels, Counter>,
    failures: Family<UpstreamLabels, Counter>,
}

impl StatsMetrics {
    pub fn new(reg: &mut Registry) -> Self {
        let current = Family::<MetricLabels, Gauge<f64, AtomicU64>>::default();
        let summaries = Family::<MetricLabels, Counter>::default();
        let failures = Family::<UpstreamLabels, Counter>::default();

        reg.register(
            "current_value",
            "Most recent value of each metric, in display units",
            current.clone(),
        );
        reg.register("summaries", "Metric summaries built", summaries.clone());
        reg.register("upstream_failures", "Failed requests to upstream APIs", failures.clone());

        Self {
            current,
            summaries,
            failures,
        }
    }

    /// Record a summary, updating the current value if the summary has one.
    pub fn summary(&self, summary: &StatSummary) {
        let labels = MetricLabels {
            metric: summary.metric.to_string(),
        };

        self.summaries.get_or_create(&labels).inc();
        if let Some(v) = summary.current {
            self.current.get_or_create(&labels).set(v);
        }
    }

    pub fn wind_direction(&self, direction: &WindDirection) {
        self.current
            .get_or_create(&MetricLabels {
                metric: WIND_DIRECTION.to_owned(),
            })
            .set(direction.degrees);
    }

    pub fn failure(&self, upstream: &str) {
        self.failures
            .get_or_create(&UpstreamLabels {
                upstream: upstream.to_owned(),
            })
            .inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metric::MetricId;
    use prometheus_client::encoding::text::encode;

    fn summary(current: Option<f64>) -> StatSummary {
        StatSummary {
            metric: MetricId::DewPoint,
            unit: "°F",
            label: "Dew Point",
            current,
            last_updated: None,
            high: 0.0,
            low: 0.0,
            series: Vec::new(),
            derived: Default::default(),
        }
    }

    #[test]
    fn test_encode_metrics() {
        let mut reg = Registry::with_prefix("weather");
        let metrics = StatsMetrics::new(&mut reg);

        metrics.summary(&summary(Some(41.5)));
        metrics.summary(&summary(None));
        metrics.failure("influxdb");

        let mut out = String::new();
        encode(&mut out, &reg).unwrap();

        assert!(out.contains("weather_current_value{metric=\"dew-point\"} 41.5"));
        assert!(out.contains("weather_summaries_total{metric=\"dew-point\"} 2"));
        assert!(out.contains("weather_upstream_failures_total{upstream=\"influxdb\"} 1"));
    }

    #[test]
    fn test_missing_current_leaves_gauge_unset() {
        let mut reg = Registry::default();
        let metrics = StatsMetrics::new(&mut reg);
        metrics.summary(&summary(None));

        let mut out = String::new();
        encode(&mut out, &reg).unwrap();

        assert!(!out.contains("current_value{"));
        assert!(out.contains("summaries_total{metric=\"dew-point\"} 1"));
    }
}
