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

use chrono_tz::Tz;
use clap::Parser;
use reqwest::Client;
use std::error::Error;
use std::io;
use std::net::SocketAddr;
use std::process;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal::unix::{self, SignalKind};
use tracing::Level;
use weather_stats::client::WeatherGovClient;
use weather_stats::config::{self, Config, ForecastConfig, InfluxConfig, SnotelConfig};
use weather_stats::geo::Coordinate;
use weather_stats::http::RequestContext;
use weather_stats::influx::InfluxClient;
use weather_stats::pipeline::Pipeline;
use weather_stats::snotel::AwdbClient;

const DEFAULT_LOG_LEVEL: Level = Level::INFO;
const DEFAULT_BIND_ADDR: ([u8; 4], u16) = ([0, 0, 0, 0], 9783);
const DEFAULT_TIMEOUT_MILLIS: u64 = 10000;

#[derive(Debug, Parser)]
#[clap(name = "weather_stats", version = clap::crate_version!())]
struct WeatherStatsApplication {
    /// Base URL of the InfluxDB server holding station readings
    #[clap(long, env = "INFLUXDB_URL", default_value_t = config::DEFAULT_INFLUX_URL.into())]
    influx_url: String,

    /// InfluxDB organization the bucket belongs to
    #[clap(long, env = "INFLUXDB_ORG", default_value_t = String::new())]
    influx_org: String,

    /// InfluxDB API token with read access to the bucket
    #[clap(long, env = "INFLUXDB_TOKEN", default_value_t = String::new(), hide_env_values = true)]
    influx_token: String,

    /// InfluxDB bucket station readings are written to
    #[clap(long, env = "INFLUXDB_BUCKET", default_value_t = config::DEFAULT_INFLUX_BUCKET.into())]
    influx_bucket: String,

    /// Measurement station readings are written as
    #[clap(long, env = "INFLUXDB_MEASUREMENT", default_value_t = config::DEFAULT_INFLUX_MEASUREMENT.into())]
    influx_measurement: String,

    /// Value of the `station` tag to read readings for
    #[clap(long, env = "INFLUXDB_STATION", default_value_t = config::DEFAULT_STATION.into())]
    station: String,

    /// Base URL for the Weather.gov API
    #[clap(long, env = "NWS_API_URL", default_value_t = config::DEFAULT_FORECAST_API_URL.into())]
    forecast_api_url: String,

    /// NWS forecast office of the grid point to fetch forecasts for
    #[clap(long, env = "NWS_OFFICE", default_value_t = config::DEFAULT_FORECAST_OFFICE.into())]
    forecast_office: String,

    /// X coordinate of the forecast grid point
    #[clap(long, env = "NWS_GRID_X", default_value_t = config::DEFAULT_FORECAST_GRID_X)]
    forecast_grid_x: u32,

    /// Y coordinate of the forecast grid point
    #[clap(long, env = "NWS_GRID_Y", default_value_t = config::DEFAULT_FORECAST_GRID_Y)]
    forecast_grid_y: u32,

    /// Base URL for the SNOTEL (AWDB) REST API
    #[clap(long, env = "SNOTEL_API_URL", default_value_t = config::DEFAULT_SNOTEL_API_URL.into())]
    snotel_api_url: String,

    /// Comma separated SNOTEL station triplets to report snow depth for
    #[clap(long, env = "SNOTEL_STATION_TRIPLETS", default_value_t = config::DEFAULT_SNOTEL_TRIPLETS.into())]
    snotel_triplets: String,

    /// Number of days of snow depth readings to fetch
    #[clap(long, default_value_t = config::DEFAULT_SNOTEL_LOOKBACK_DAYS)]
    snotel_lookback_days: i64,

    /// Latitude of the point SNOTEL stations are described relative to
    #[clap(long, default_value_t = config::DEFAULT_REFERENCE.latitude, allow_hyphen_values = true)]
    reference_latitude: f64,

    /// Longitude of the point SNOTEL stations are described relative to
    #[clap(long, default_value_t = config::DEFAULT_REFERENCE.longitude, allow_hyphen_values = true)]
    reference_longitude: f64,

    /// Time zone used for hourly labels, e.g. 'America/Los_Angeles'
    #[clap(long, env = "WEATHER_TIMEZONE", default_value_t = config::DEFAULT_TIMEZONE)]
    timezone: Tz,

    /// User-Agent header sent to the Weather.gov and SNOTEL APIs
    #[clap(long, default_value_t = config::DEFAULT_USER_AGENT.into())]
    user_agent: String,

    /// Logging verbosity. Allowed values are 'trace', 'debug', 'info', 'warn', and 'error'
    /// (case insensitive)
    #[clap(long, default_value_t = DEFAULT_LOG_LEVEL)]
    log_level: Level,

    /// Timeout for requests to InfluxDB and upstream APIs, in milliseconds.
    #[clap(long, default_value_t = DEFAULT_TIMEOUT_MILLIS)]
    timeout_millis: u64,

    /// Address to bind to.
    #[clap(long, default_value_t = DEFAULT_BIND_ADDR.into())]
    bind: SocketAddr,
}

impl WeatherStatsApplication {
    fn config(&self) -> Config {
        Config {
            influx: InfluxConfig {
                url: self.influx_url.clone(),
                org: self.influx_org.clone(),
                token: self.influx_token.clone(),
                bucket: self.influx_bucket.clone(),
                measurement: self.influx_measurement.clone(),
                station: self.station.clone(),
            },
            forecast: ForecastConfig {
                api_url: self.forecast_api_url.clone(),
                office: self.forecast_office.clone(),
                grid_x: self.forecast_grid_x,
                grid_y: self.forecast_grid_y,
            },
            snotel: SnotelConfig {
                api_url: self.snotel_api_url.clone(),
                triplets: config::parse_triplets(&self.snotel_triplets),
                lookback_days: self.snotel_lookback_days,
            },
            reference: Coordinate::new(self.reference_latitude, self.reference_longitude),
            timezone: self.timezone,
            user_agent: self.user_agent.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let opts = WeatherStatsApplication::parse();
    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_max_level(opts.log_level)
            .finish(),
    )
    .expect("failed to set tracing subscriber");

    let config = opts.config();
    if config.influx.token.is_empty() {
        tracing::warn!(message = "no InfluxDB token set, queries will likely be rejected");
    }

    let timeout = Duration::from_millis(opts.timeout_millis);
    let http_client = Client::builder().timeout(timeout).build().unwrap_or_else(|e| {
        tracing::error!(message = "unable to initialize HTTP client", error = %e);
        process::exit(1)
    });

    let influx = InfluxClient::new(http_client.clone(), &config.influx).unwrap_or_else(|e| {
        tracing::error!(message = "invalid InfluxDB configuration", error = %e);
        process::exit(1)
    });
    let forecast =
        WeatherGovClient::new(http_client.clone(), &config.forecast, &config.user_agent).unwrap_or_else(|e| {
            tracing::error!(message = "invalid forecast configuration", error = %e);
            process::exit(1)
        });
    let snotel = AwdbClient::new(
        http_client,
        &config.snotel,
        &config.user_agent,
        config.reference,
        config.timezone,
    )
    .unwrap_or_else(|e| {
        tracing::error!(message = "invalid SNOTEL configuration", error = %e);
        process::exit(1)
    });

    tracing::info!(
        message = "reading station data",
        influx_url = %influx.query_url(),
        bucket = %config.influx.bucket,
        station = %config.influx.station,
        forecast_url = %forecast.forecast_url(),
        snotel_stations = config.snotel.triplets.len(),
    );

    let pipeline = Pipeline::new(Arc::new(influx), &config);
    let context = Arc::new(RequestContext::new(pipeline, forecast, snotel));
    let app = weather_stats::http::router(context);

    let server = axum::Server::try_bind(&opts.bind)
        .unwrap_or_else(|e| {
            tracing::error!(message = "error binding to address", address = %opts.bind, error = %e);
            process::exit(1)
        })
        .serve(app.into_make_service());

    tracing::info!(message = "server started", address = %server.local_addr());
    server
        .with_graceful_shutdown(async {
            // Wait for either SIGTERM or SIGINT to shutdown
            tokio::select! {
                _ = sigterm() => {}
                _ = sigint() => {}
            }
        })
        .await?;

    tracing::info!("server shutdown");
    Ok(())
}

/// Return after the first SIGTERM signal received by this process
async fn sigterm() -> io::Result<()> {
    unix::signal(SignalKind::terminate())?.recv().await;
    Ok(())
}

/// Return after the first SIGINT signal received by this process
async fn sigint() -> io::Result<()> {
    unix::signal(SignalKind::interrupt())?.recv().await;
    Ok(())
}
