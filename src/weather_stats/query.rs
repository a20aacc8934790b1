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

use crate::window::AggregationWindow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;
use std::time::Duration;

/// A single timestamped value returned by the time-series store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

/// Function used to reduce the rows of a range (or of each window within a range).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Aggregation {
    Mean,
    Max,
    Min,
    Sum,
    Last,
}

impl Aggregation {
    fn flux_name(&self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::Max => "max",
            Self::Min => "min",
            Self::Sum => "sum",
            Self::Last => "last",
        }
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.flux_name())
    }
}

/// Declarative range query for a single field of a single station.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub bucket: String,
    pub measurement: String,
    pub station: String,
    pub field: String,
    /// How far back from now the range starts.
    pub range: Duration,
    /// If set, reduce each window of the range. Otherwise the whole range is reduced to a
    /// single row.
    pub window: Option<AggregationWindow>,
    pub aggregation: Aggregation,
    /// Drop rows with values of zero or less before aggregating.
    pub positive_only: bool,
}

impl Query {
    /// Render this query as a Flux script.
    pub fn to_flux(&self) -> String {
        let mut stages = vec![
            format!("range(start: -{})", flux_duration(self.range)),
            format!("filter(fn: (r) => r[\"_measurement\"] == \"{}\")", escape(&self.measurement)),
            format!("filter(fn: (r) => r[\"station\"] == \"{}\")", escape(&self.station)),
            format!("filter(fn: (r) => r[\"_field\"] == \"{}\")", escape(&self.field)),
        ];

        if self.positive_only {
            stages.push("filter(fn: (r) => r[\"_value\"] > 0)".to_owned());
        }

        stages.push(match self.window {
            Some(w) => format!(
                "aggregateWindow(every: {}, fn: {}, createEmpty: false)",
                flux_duration(w.duration()),
                self.aggregation
            ),
            None => format!("{}()", self.aggregation),
        });
        stages.push(format!("yield(name: \"{}\")", self.aggregation));

        let mut out = format!("from(bucket: \"{}\")\n", escape(&self.bucket));
        for stage in stages {
            out.push_str("  |> ");
            out.push_str(&stage);
            out.push('\n');
        }

        out
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.field, self.aggregation)?;
        if let Some(w) = self.window {
            write!(f, "/{}", w)?;
        }
        write!(f, " over {}", flux_duration(self.range))
    }
}

/// Render a duration using the largest whole Flux unit.
fn flux_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs > 0 && secs % 86_400 == 0 {
        format!("{}d", secs / 86_400)
    } else if secs > 0 && secs % 3_600 == 0 {
        format!("{}h", secs / 3_600)
    } else if secs > 0 && secs % 60 == 0 {
        format!("{}m", secs / 60)
    } else {
        format!("{}s", secs)
    }
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("invalid query API URL {0}")]
    InvalidUrl(String),

    #[error("query request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unexpected status {status} from query API: {body}")]
    Status { status: reqwest::StatusCode, body: String },

    #[error("unable to read query response: {0}")]
    Csv(#[from] csv::Error),

    #[error("malformed query response row: {0}")]
    Malformed(String),

    #[error("query returned an error: {0}")]
    Server(String),
}

/// Source of time-series observations.
///
/// Implementations return every row of the result, in the order produced by the store.
/// An empty result is not an error.
#[async_trait]
pub trait QueryService: Send + Sync {
    async fn query(&self, query: &Query) -> Result<Vec<Observation>, QueryError>;
}
