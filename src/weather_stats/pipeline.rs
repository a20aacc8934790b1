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

use crate::config::Config;
use crate::geo;
use crate::merge::{self, SeriesPoint, SeriesSet};
use crate::metric::{Derivation, MetricId, MetricSpec, WIND_DIRECTION_FIELD};
use crate::query::{Aggregation, Observation, Query, QueryError, QueryService};
use crate::timekey::{self, TimeKey};
use crate::units;
use crate::window::{self, AggregationWindow};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{Instrument, Level};

const SUMMARY_RANGE: Duration = Duration::from_secs(86_400);
const SUMMARY_WINDOW: AggregationWindow = AggregationWindow::OneHour;
const LATEST_RANGE: Duration = Duration::from_secs(3_600);
const TREND_THRESHOLD: f64 = 0.02;
const TREND_POINTS: usize = 3;

#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    #[error("invalid range of {0} days, must be at least 1")]
    InvalidRange(i64),

    #[error("Failed to fetch {subject} data")]
    DataUnavailable {
        subject: String,
        #[source]
        source: QueryError,
    },
}

impl StatsError {
    fn unavailable<S: Into<String>>(subject: S, source: QueryError) -> Self {
        StatsError::DataUnavailable {
            subject: subject.into(),
            source,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Rising,
    Falling,
    Steady,
}

/// Metric specific values, present only for metrics that define them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Derived {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend: Option<Trend>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gust: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_strikes: Option<f64>,
}

/// Display-ready statistics for the last day of a single metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatSummary {
    pub metric: MetricId,
    pub unit: &'static str,
    pub label: &'static str,
    pub current: Option<f64>,
    pub last_updated: Option<DateTime<Utc>>,
    pub high: f64,
    pub low: f64,
    pub series: Vec<SeriesPoint>,
    #[serde(flatten)]
    pub derived: Derived,
}

/// Merged mean/max/min series of a metric over a number of days.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartStats {
    pub metric: MetricId,
    pub unit: &'static str,
    pub label: &'static str,
    pub days: i64,
    pub window: AggregationWindow,
    pub series: Vec<SeriesPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindDirection {
    pub degrees: f64,
    pub cardinal: &'static str,
    pub cardinal_full: &'static str,
    pub last_updated: Option<DateTime<Utc>>,
}

/// Issues queries for metrics and turns the results into statistics.
///
/// All queries for one metric run concurrently and the first failure fails the whole
/// metric. Separate metrics never share failures.
pub struct Pipeline {
    service: Arc<dyn QueryService>,
    bucket: String,
    measurement: String,
    station: String,
    timezone: Tz,
}

impl Pipeline {
    pub fn new(service: Arc<dyn QueryService>, config: &Config) -> Self {
        Pipeline {
            service,
            bucket: config.influx.bucket.clone(),
            measurement: config.influx.measurement.clone(),
            station: config.influx.station.clone(),
            timezone: config.timezone,
        }
    }

    /// Current value, extremes and hourly series of a metric over the last day.
    pub async fn summary(&self, id: MetricId) -> Result<StatSummary, StatsError> {
        let spec = id.spec();
        let subject = id.as_str().replace('-', " ");

        let series_query = self.query(spec.source_field, SUMMARY_RANGE, Some(SUMMARY_WINDOW), spec.series);
        let latest_query = spec.latest.map(|l| Query {
            positive_only: l.positive_only,
            ..self.query(l.field.unwrap_or(spec.source_field), l.range, None, Aggregation::Last)
        });
        let gust_query = spec.derivations.iter().find_map(|d| match d {
            Derivation::PeakGust { field } => Some(self.query(field, SUMMARY_RANGE, None, Aggregation::Max)),
            _ => None,
        });

        let (rows, latest, gust) = futures::try_join!(
            self.service.query(&series_query),
            self.optional(latest_query.as_ref()),
            self.optional(gust_query.as_ref()),
        )
        .map_err(|e| {
            tracing::error!(message = "failed to fetch metric summary", metric = %id, error = %e);
            StatsError::unavailable(subject, e)
        })?;

        let summary = self.summarize(spec, &rows, latest.as_deref(), gust.as_deref());
        tracing::debug!(message = "built metric summary", metric = %id, points = summary.series.len());
        Ok(summary)
    }

    /// Summaries for several metrics, fetched in parallel. Each metric succeeds or fails
    /// on its own.
    pub async fn summaries(&self, ids: &[MetricId]) -> Vec<(MetricId, Result<StatSummary, StatsError>)> {
        let futures = ids.iter().map(|id| {
            let span = tracing::span!(Level::DEBUG, "metric_summary", metric = %id);
            async move { (*id, self.summary(*id).await) }.instrument(span)
        });

        futures::future::join_all(futures).await
    }

    /// Mean, max and min of a metric over `days`, merged by time bucket.
    pub async fn chart(&self, id: MetricId, days: i64) -> Result<ChartStats, StatsError> {
        let spec = id.spec();
        let selection = window::select_window(days).ok_or(StatsError::InvalidRange(days))?;
        let range = window::days_duration(days).ok_or(StatsError::InvalidRange(days))?;

        let mean_query = self.query(spec.source_field, range, Some(selection.window), Aggregation::Mean);
        let max_query = self.query(spec.source_field, range, Some(selection.window), Aggregation::Max);
        let min_query = self.query(spec.source_field, range, Some(selection.window), Aggregation::Min);

        let (mean, max, min) = futures::try_join!(
            self.service.query(&mean_query),
            self.service.query(&max_query),
            self.service.query(&min_query),
        )
        .map_err(|e| {
            tracing::error!(message = "failed to fetch metric chart", metric = %id, days = days, error = %e);
            StatsError::unavailable(format!("{} chart", spec.label.to_lowercase()), e)
        })?;

        let set = SeriesSet {
            mean: merge::keyed(&mean, selection.include_time, spec.convert),
            max: merge::keyed(&max, selection.include_time, spec.convert),
            min: merge::keyed(&min, selection.include_time, spec.convert),
        };

        Ok(ChartStats {
            metric: id,
            unit: spec.unit,
            label: spec.label,
            days,
            window: selection.window,
            series: set.merge(),
        })
    }

    /// Most recent wind direction reading within the last hour, or north if there is none.
    pub async fn wind_direction(&self) -> Result<WindDirection, StatsError> {
        let query = self.query(WIND_DIRECTION_FIELD, LATEST_RANGE, None, Aggregation::Last);
        let rows = self.service.query(&query).await.map_err(|e| {
            tracing::error!(message = "failed to fetch wind direction", error = %e);
            StatsError::unavailable("wind direction", e)
        })?;

        let last = rows.last();
        let degrees = last.map(|o| o.value).unwrap_or(0.0);
        let cardinal = geo::wind_cardinal(degrees);

        Ok(WindDirection {
            degrees,
            cardinal: cardinal.short,
            cardinal_full: cardinal.full,
            last_updated: last.map(|o| o.timestamp),
        })
    }

    fn query(&self, field: &str, range: Duration, window: Option<AggregationWindow>, aggregation: Aggregation) -> Query {
        Query {
            bucket: self.bucket.clone(),
            measurement: self.measurement.clone(),
            station: self.station.clone(),
            field: field.to_owned(),
            range,
            window,
            aggregation,
            positive_only: false,
        }
    }

    async fn optional(&self, query: Option<&Query>) -> Result<Option<Vec<Observation>>, QueryError> {
        match query {
            Some(q) => self.service.query(q).await.map(Some),
            None => Ok(None),
        }
    }

    fn summarize(
        &self,
        spec: &MetricSpec,
        rows: &[Observation],
        latest: Option<&[Observation]>,
        gust: Option<&[Observation]>,
    ) -> StatSummary {
        let labels: HashMap<TimeKey, String> = rows
            .iter()
            .map(|o| (TimeKey::new(&o.timestamp, true), timekey::clock_label(&o.timestamp, &self.timezone)))
            .collect();

        let mut series = SeriesSet::single(merge::keyed(rows, true, spec.convert)).merge();
        for point in series.iter_mut() {
            point.label = labels.get(&point.key).cloned();
        }

        let values: Vec<f64> = series.iter().map(|p| p.avg.unwrap_or(p.high)).collect();
        let mut derived = Derived::default();

        for derivation in spec.derivations {
            match derivation {
                Derivation::PressureTrend => derived.trend = Some(pressure_trend(&values)),
                Derivation::PeakGust { .. } => {
                    let peak = gust.and_then(|g| g.last()).map(|o| (spec.convert)(o.value));
                    derived.gust = Some(peak.unwrap_or(0.0));
                }
                Derivation::Total => derived.total = Some(units::round_to(values.iter().sum(), 2)),
                Derivation::TotalCount => derived.total_strikes = Some(rows.iter().map(|o| o.value).sum()),
            }
        }

        let (current, last_updated) = match (spec.latest, latest) {
            (Some(l), Some(rows)) => (
                rows.last().map(|o| (l.convert)(o.value)),
                rows.last().map(|o| o.timestamp),
            ),
            _ => (values.last().copied(), rows.last().map(|o| o.timestamp)),
        };

        if values.is_empty() {
            let keep_latest = spec.latest.map_or(false, |l| l.independent);
            return StatSummary {
                metric: spec.id,
                unit: spec.unit,
                label: spec.label,
                current: current.filter(|_| keep_latest),
                last_updated: last_updated.filter(|_| keep_latest),
                high: 0.0,
                low: 0.0,
                series,
                derived,
            };
        }

        StatSummary {
            metric: spec.id,
            unit: spec.unit,
            label: spec.label,
            current,
            last_updated,
            high: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            low: values.iter().copied().fold(f64::INFINITY, f64::min),
            series,
            derived,
        }
    }
}

/// Direction of change over the last three values. Fewer than three values is steady.
pub fn pressure_trend(values: &[f64]) -> Trend {
    if values.len() < TREND_POINTS {
        return Trend::Steady;
    }

    let recent = &values[values.len() - TREND_POINTS..];
    let delta = recent[recent.len() - 1] - recent[0];
    if delta > TREND_THRESHOLD {
        Trend::Rising
    } else if delta < -TREND_THRESHOLD {
        Trend::Falling
    } else {
        Trend::Steady
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::sync::Mutex;

    /// Canned responses keyed by field and aggregation.
    #[derive(Default)]
    struct FakeQueries {
        responses: HashMap<(String, Aggregation), Vec<Observation>>,
        failures: HashMap<String, String>,
        seen: Mutex<Vec<Query>>,
    }

    impl FakeQueries {
        fn respond(mut self, field: &str, aggregation: Aggregation, values: &[f64]) -> Self {
            let rows = values.iter().enumerate().map(|(i, v)| obs(i as u32, *v)).collect();
            self.responses.insert((field.to_owned(), aggregation), rows);
            self
        }

        fn fail(mut self, field: &str) -> Self {
            self.failures.insert(field.to_owned(), format!("no such field {}", field));
            self
        }

        fn seen(&self) -> Vec<Query> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl QueryService for FakeQueries {
        async fn query(&self, query: &Query) -> Result<Vec<Observation>, QueryError> {
            self.seen.lock().unwrap().push(query.clone());
            if let Some(msg) = self.failures.get(&query.field) {
                return Err(QueryError::Server(msg.clone()));
            }

            Ok(self
                .responses
                .get(&(query.field.clone(), query.aggregation))
                .cloned()
                .unwrap_or_default())
        }
    }

    fn obs(hour: u32, value: f64) -> Observation {
        Observation {
            timestamp: Utc.with_ymd_and_hms(2025, 1, 1, hour, 0, 0).unwrap(),
            value,
        }
    }

    fn pipeline(fake: FakeQueries) -> (Pipeline, Arc<FakeQueries>) {
        let fake = Arc::new(fake);
        let config = Config {
            timezone: chrono_tz::UTC,
            ..Default::default()
        };

        (Pipeline::new(fake.clone(), &config), fake)
    }

    #[test]
    fn test_pressure_trend() {
        assert_eq!(Trend::Rising, pressure_trend(&[29.90, 29.91, 29.93]));
        assert_eq!(Trend::Falling, pressure_trend(&[29.90, 29.89, 29.87]));
        assert_eq!(Trend::Steady, pressure_trend(&[29.90, 29.91, 29.905]));
        assert_eq!(Trend::Rising, pressure_trend(&[30.50, 29.00, 29.90, 29.91, 29.93]));
        assert_eq!(Trend::Steady, pressure_trend(&[29.00, 30.00]));
        assert_eq!(Trend::Steady, pressure_trend(&[]));
    }

    #[tokio::test]
    async fn test_summary_empty_result() {
        let (pipeline, _) = pipeline(FakeQueries::default());
        let summary = pipeline.summary(MetricId::Temperature).await.unwrap();

        assert_eq!(None, summary.current);
        assert_eq!(None, summary.last_updated);
        assert_eq!(0.0, summary.high);
        assert_eq!(0.0, summary.low);
        assert!(summary.series.is_empty());
        assert_eq!(Derived::default(), summary.derived);
    }

    #[tokio::test]
    async fn test_summary_temperature() {
        let fake = FakeQueries::default()
            .respond("temp", Aggregation::Mean, &[0.0, 10.0, 5.0])
            .respond("temp", Aggregation::Last, &[7.5]);
        let (pipeline, fake) = pipeline(fake);
        let summary = pipeline.summary(MetricId::Temperature).await.unwrap();

        assert_eq!(Some(45.5), summary.current);
        assert_eq!(Some(obs(0, 0.0).timestamp), summary.last_updated);
        assert_eq!(50.0, summary.high);
        assert_eq!(32.0, summary.low);
        assert_eq!("°F", summary.unit);
        assert_eq!(3, summary.series.len());
        assert_eq!("2025-01-01T01:00", summary.series[1].key.as_str());
        assert_eq!(Some("1:00 AM".to_owned()), summary.series[1].label);
        assert_eq!(Some(50.0), summary.series[1].avg);

        let seen = fake.seen();
        assert_eq!(2, seen.len());
        assert!(seen
            .iter()
            .any(|q| q.aggregation == Aggregation::Mean && q.window == Some(AggregationWindow::OneHour)));
        assert!(seen
            .iter()
            .any(|q| q.aggregation == Aggregation::Last && q.range == Duration::from_secs(3_600)));
    }

    #[tokio::test]
    async fn test_summary_no_recent_reading() {
        let fake = FakeQueries::default().respond("humidity", Aggregation::Mean, &[80.4, 91.6]);
        let (pipeline, _) = pipeline(fake);
        let summary = pipeline.summary(MetricId::Humidity).await.unwrap();

        assert_eq!(None, summary.current);
        assert_eq!(None, summary.last_updated);
        assert_eq!(92.0, summary.high);
        assert_eq!(80.0, summary.low);
    }

    #[tokio::test]
    async fn test_summary_pressure_trend() {
        let fake = FakeQueries::default()
            .respond("p", Aggregation::Mean, &[1000.0, 1005.0, 1010.0])
            .respond("p", Aggregation::Last, &[1010.0]);
        let (pipeline, _) = pipeline(fake);
        let summary = pipeline.summary(MetricId::Pressure).await.unwrap();

        assert_eq!(Some(Trend::Rising), summary.derived.trend);
        assert_eq!(Some(29.83), summary.current);
        assert_eq!(29.53, summary.low);
    }

    #[tokio::test]
    async fn test_summary_wind_gust_kept_separate() {
        let fake = FakeQueries::default()
            .respond("wind_avg", Aggregation::Mean, &[2.0, 4.0])
            .respond("wind_avg", Aggregation::Last, &[3.0])
            .respond("wind_gust", Aggregation::Max, &[10.0]);
        let (pipeline, fake) = pipeline(fake);
        let summary = pipeline.summary(MetricId::Wind).await.unwrap();

        assert_eq!(Some(22.4), summary.derived.gust);
        assert_eq!(8.9, summary.high);
        assert_eq!(4.5, summary.low);
        assert_eq!(Some(6.7), summary.current);

        let gust = fake.seen().into_iter().find(|q| q.field == "wind_gust").unwrap();
        assert_eq!(None, gust.window);
        assert_eq!(SUMMARY_RANGE, gust.range);
    }

    #[tokio::test]
    async fn test_summary_wind_without_gust() {
        let fake = FakeQueries::default().respond("wind_avg", Aggregation::Mean, &[2.0]);
        let (pipeline, _) = pipeline(fake);
        let summary = pipeline.summary(MetricId::Wind).await.unwrap();

        assert_eq!(Some(0.0), summary.derived.gust);
    }

    #[tokio::test]
    async fn test_summary_precipitation_total() {
        let fake = FakeQueries::default()
            .respond("precipitation", Aggregation::Sum, &[1.0, 2.5, 0.0])
            .respond("precipitation", Aggregation::Last, &[0.2]);
        let (pipeline, _) = pipeline(fake);
        let summary = pipeline.summary(MetricId::Precipitation).await.unwrap();

        // 0.04 + 0.10 + 0.00
        assert_eq!(Some(0.14), summary.derived.total);
        assert_eq!(Some(0.01), summary.current);
    }

    #[tokio::test]
    async fn test_summary_lightning() {
        let fake = FakeQueries::default()
            .respond("strike_count", Aggregation::Sum, &[3.0, 0.0, 4.0])
            .respond("strike_distance", Aggregation::Last, &[16.0]);
        let (pipeline, fake) = pipeline(fake);
        let summary = pipeline.summary(MetricId::Lightning).await.unwrap();

        assert_eq!(Some(7.0), summary.derived.total_strikes);
        assert_eq!(Some(10.0), summary.current);
        assert_eq!(4.0, summary.high);

        let distance = fake.seen().into_iter().find(|q| q.field == "strike_distance").unwrap();
        assert!(distance.positive_only);
        assert_eq!(SUMMARY_RANGE, distance.range);
    }

    #[tokio::test]
    async fn test_summary_lightning_without_strike_counts() {
        let fake = FakeQueries::default().respond("strike_distance", Aggregation::Last, &[16.0]);
        let (pipeline, _) = pipeline(fake);
        let summary = pipeline.summary(MetricId::Lightning).await.unwrap();

        assert_eq!(Some(10.0), summary.current);
        assert_eq!(Some(obs(0, 0.0).timestamp), summary.last_updated);
        assert_eq!(0.0, summary.high);
        assert_eq!(0.0, summary.low);
        assert!(summary.series.is_empty());
        assert_eq!(Some(0.0), summary.derived.total_strikes);
    }

    #[tokio::test]
    async fn test_summary_precipitation_without_series() {
        let fake = FakeQueries::default().respond("precipitation", Aggregation::Last, &[0.2]);
        let (pipeline, _) = pipeline(fake);
        let summary = pipeline.summary(MetricId::Precipitation).await.unwrap();

        assert_eq!(Some(0.01), summary.current);
        assert_eq!(Some(obs(0, 0.0).timestamp), summary.last_updated);
        assert_eq!(Some(0.0), summary.derived.total);
    }

    #[tokio::test]
    async fn test_summary_temperature_without_series() {
        let fake = FakeQueries::default().respond("temp", Aggregation::Last, &[7.5]);
        let (pipeline, _) = pipeline(fake);
        let summary = pipeline.summary(MetricId::Temperature).await.unwrap();

        assert_eq!(None, summary.current);
        assert_eq!(None, summary.last_updated);
        assert_eq!(0.0, summary.high);
    }

    #[tokio::test]
    async fn test_summary_any_failure_fails_metric() {
        let fake = FakeQueries::default()
            .respond("wind_avg", Aggregation::Mean, &[2.0])
            .fail("wind_gust");
        let (pipeline, _) = pipeline(fake);

        match pipeline.summary(MetricId::Wind).await {
            Err(e @ StatsError::DataUnavailable { .. }) => assert_eq!("Failed to fetch wind data", e.to_string()),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_summaries_fail_independently() {
        let fake = FakeQueries::default()
            .respond("temp", Aggregation::Mean, &[10.0])
            .fail("dew_point");
        let (pipeline, _) = pipeline(fake);

        let results = pipeline
            .summaries(&[MetricId::Temperature, MetricId::DewPoint, MetricId::Humidity])
            .await;

        assert_eq!(3, results.len());
        assert_eq!(MetricId::Temperature, results[0].0);
        assert_eq!(Some(50.0), results[0].1.as_ref().unwrap().series.first().and_then(|p| p.avg));
        assert_eq!(MetricId::DewPoint, results[1].0);
        assert_eq!(
            "Failed to fetch dew point data",
            results[1].1.as_ref().unwrap_err().to_string()
        );
        assert!(results[2].1.is_ok());
    }

    #[tokio::test]
    async fn test_chart_merges_series() {
        let fake = FakeQueries::default()
            .respond("temp", Aggregation::Mean, &[10.0, 20.0])
            .respond("temp", Aggregation::Max, &[12.0, 22.0, 30.0])
            .respond("temp", Aggregation::Min, &[8.0]);
        let (pipeline, fake) = pipeline(fake);
        let chart = pipeline.chart(MetricId::Temperature, 7).await.unwrap();

        assert_eq!(AggregationWindow::TwoHours, chart.window);
        assert_eq!(3, chart.series.len());

        let first = &chart.series[0];
        assert_eq!("2025-01-01T00:00", first.key.as_str());
        assert_eq!((53.6, 46.4, Some(50.0)), (first.high, first.low, first.avg));

        let second = &chart.series[1];
        assert_eq!((71.6, 68.0, Some(68.0)), (second.high, second.low, second.avg));

        let third = &chart.series[2];
        assert_eq!((86.0, 86.0, None), (third.high, third.low, third.avg));

        let seen = fake.seen();
        assert_eq!(3, seen.len());
        assert!(seen.iter().all(|q| q.range == Duration::from_secs(7 * 86_400)));
    }

    #[tokio::test]
    async fn test_chart_daily_keys() {
        let fake = FakeQueries::default().respond("humidity", Aggregation::Mean, &[50.0]);
        let (pipeline, _) = pipeline(fake);
        let chart = pipeline.chart(MetricId::Humidity, 90).await.unwrap();

        assert_eq!(AggregationWindow::OneDay, chart.window);
        assert_eq!("2025-01-01", chart.series[0].key.as_str());
    }

    #[tokio::test]
    async fn test_chart_invalid_range() {
        let (pipeline, fake) = pipeline(FakeQueries::default());
        assert!(matches!(
            pipeline.chart(MetricId::Pressure, 0).await,
            Err(StatsError::InvalidRange(0))
        ));
        assert!(fake.seen().is_empty());
    }

    #[tokio::test]
    async fn test_chart_range_too_large() {
        let (pipeline, fake) = pipeline(FakeQueries::default());
        assert!(matches!(
            pipeline.chart(MetricId::Temperature, 300_000_000_000_000).await,
            Err(StatsError::InvalidRange(300_000_000_000_000))
        ));
        assert!(fake.seen().is_empty());
    }

    #[tokio::test]
    async fn test_chart_failure() {
        let (pipeline, _) = pipeline(FakeQueries::default().fail("p"));
        let err = pipeline.chart(MetricId::Pressure, 30).await.unwrap_err();
        assert_eq!("Failed to fetch pressure chart data", err.to_string());
    }

    #[tokio::test]
    async fn test_wind_direction() {
        let fake = FakeQueries::default().respond(WIND_DIRECTION_FIELD, Aggregation::Last, &[250.0]);
        let (pipeline, _) = pipeline(fake);
        let direction = pipeline.wind_direction().await.unwrap();

        assert_eq!(250.0, direction.degrees);
        assert_eq!("WSW", direction.cardinal);
        assert_eq!("West-Southwest", direction.cardinal_full);
    }

    #[tokio::test]
    async fn test_wind_direction_no_reading() {
        let (pipeline, _) = pipeline(FakeQueries::default());
        let direction = pipeline.wind_direction().await.unwrap();

        assert_eq!(0.0, direction.degrees);
        assert_eq!("N", direction.cardinal);
        assert_eq!(None, direction.last_updated);
    }
}
