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

//! Weather station statistics from InfluxDB, api.weather.gov and SNOTEL
//!
//! ## Features
//!
//! `weather_stats` reads raw readings from a personal weather station stored in [InfluxDB] and
//! serves display-ready statistics for them as JSON. Readings are aggregated by Flux queries,
//! converted to US units and merged into chart series. The following endpoints are available.
//!
//! * `/api/stats` - Last 24 hours of every metric. Metrics that fail report an error in place.
//! * `/api/stats/$METRIC` - Last 24 hours of a single metric: current value, high, low, an hourly
//!   series and metric specific values (pressure trend, peak gust, precipitation total, strikes).
//! * `/api/chart/$METRIC?days=$DAYS` - Mean, max and min of a metric over a number of days.
//! * `/api/wind-direction` - Most recent wind direction and its compass name.
//! * `/api/forecast` - Text forecast for a grid point from [api.weather.gov].
//! * `/api/snow-depth` - Hourly snow depth of nearby [SNOTEL] stations, described by distance
//!   and direction from a reference point.
//! * `/metrics` - Prometheus metrics about values served and upstream failures.
//!
//! Metrics are `temperature`, `humidity`, `pressure`, `wind`, `dew-point`, `precipitation`,
//! `lightning`, `solar-radiation` and `illuminance`.
//!
//! [InfluxDB]: https://docs.influxdata.com/influxdb/v2/
//! [api.weather.gov]: https://www.weather.gov/documentation/services-web-api
//! [SNOTEL]: https://www.nrcs.usda.gov/resources/data-and-reports/snow-and-climate-monitoring-snotel
//!
//! ## Build
//!
//! `weather_stats` is a Rust program and must be built from source using a [Rust toolchain](https://rustup.rs/).
//!
//! ```text
//! git clone git@github.com:56quarters/weather_stats.git && cd weather_stats
//! cargo build --release
//! ```
//!
//! ## Usage
//!
//! `weather_stats` needs an InfluxDB organization and an API token with read access to the
//! bucket station readings are written to. Both can be set with flags or environment variables.
//!
//! ```text
//! export INFLUXDB_ORG=home
//! export INFLUXDB_TOKEN=...
//! ./weather_stats --station ST-00190461 --forecast-office SEW --forecast-grid-x 139 --forecast-grid-y 58
//! ```
//!
//! Statistics are served on port `9783` by default.
//!
//! ```text
//! curl -sS 'http://localhost:9783/api/chart/temperature?days=30' | jq
//! ```
//!

pub mod client;
pub mod config;
pub mod geo;
pub mod http;
pub mod influx;
pub mod merge;
pub mod metric;
pub mod metrics;
pub mod pipeline;
pub mod query;
pub mod snotel;
pub mod stations;
pub mod timekey;
pub mod units;
pub mod window;
