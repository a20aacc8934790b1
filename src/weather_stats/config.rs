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

use crate::geo::Coordinate;
use chrono_tz::Tz;

pub const DEFAULT_INFLUX_URL: &str = "http://localhost:8086";
pub const DEFAULT_INFLUX_BUCKET: &str = "weather";
pub const DEFAULT_INFLUX_MEASUREMENT: &str = "weather";
pub const DEFAULT_STATION: &str = "ST-00190461";
pub const DEFAULT_FORECAST_API_URL: &str = "https://api.weather.gov/";
pub const DEFAULT_FORECAST_OFFICE: &str = "SEW";
pub const DEFAULT_FORECAST_GRID_X: u32 = 139;
pub const DEFAULT_FORECAST_GRID_Y: u32 = 58;
pub const DEFAULT_SNOTEL_API_URL: &str = "https://wcc.sc.egov.usda.gov/awdbRestApi/services/v1/";
pub const DEFAULT_SNOTEL_TRIPLETS: &str = "898:WA:SNTL,899:WA:SNTL,912:WA:SNTL";
pub const DEFAULT_SNOTEL_LOOKBACK_DAYS: i64 = 3;
pub const DEFAULT_USER_AGENT: &str = "weather_stats (https://github.com/56quarters/weather_stats)";
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::America::Los_Angeles;

/// Rattlesnake Mountain, WA. Remote stations are described relative to this point.
pub const DEFAULT_REFERENCE: Coordinate = Coordinate {
    latitude: 47.470597,
    longitude: -121.825356,
};

/// Connection and scope of the InfluxDB bucket holding station readings.
#[derive(Debug, Clone)]
pub struct InfluxConfig {
    pub url: String,
    pub org: String,
    pub token: String,
    pub bucket: String,
    pub measurement: String,
    pub station: String,
}

impl Default for InfluxConfig {
    fn default() -> Self {
        InfluxConfig {
            url: DEFAULT_INFLUX_URL.to_owned(),
            org: String::new(),
            token: String::new(),
            bucket: DEFAULT_INFLUX_BUCKET.to_owned(),
            measurement: DEFAULT_INFLUX_MEASUREMENT.to_owned(),
            station: DEFAULT_STATION.to_owned(),
        }
    }
}

/// NWS grid point to fetch forecasts for.
#[derive(Debug, Clone)]
pub struct ForecastConfig {
    pub api_url: String,
    pub office: String,
    pub grid_x: u32,
    pub grid_y: u32,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        ForecastConfig {
            api_url: DEFAULT_FORECAST_API_URL.to_owned(),
            office: DEFAULT_FORECAST_OFFICE.to_owned(),
            grid_x: DEFAULT_FORECAST_GRID_X,
            grid_y: DEFAULT_FORECAST_GRID_Y,
        }
    }
}

/// SNOTEL stations to report snow depth for.
#[derive(Debug, Clone)]
pub struct SnotelConfig {
    pub api_url: String,
    pub triplets: Vec<String>,
    pub lookback_days: i64,
}

impl Default for SnotelConfig {
    fn default() -> Self {
        SnotelConfig {
            api_url: DEFAULT_SNOTEL_API_URL.to_owned(),
            triplets: parse_triplets(DEFAULT_SNOTEL_TRIPLETS),
            lookback_days: DEFAULT_SNOTEL_LOOKBACK_DAYS,
        }
    }
}

/// Everything the pipeline and clients need, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub influx: InfluxConfig,
    pub forecast: ForecastConfig,
    pub snotel: SnotelConfig,
    pub reference: Coordinate,
    /// Zone used for wall-clock labels of hourly points.
    pub timezone: Tz,
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            influx: InfluxConfig::default(),
            forecast: ForecastConfig::default(),
            snotel: SnotelConfig::default(),
            reference: DEFAULT_REFERENCE,
            timezone: DEFAULT_TIMEZONE,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

/// Split a comma separated list of station triplets, ignoring blanks.
pub fn parse_triplets(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
        .collect()
}
