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

use crate::config::ForecastConfig;
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::error;
use std::fmt;

#[derive(Debug)]
pub enum ClientError {
    InvalidUrl(&'static str, String),
    Internal(&'static str, reqwest::Error),
    Unexpected(&'static str, StatusCode),
}

impl ClientError {
    /// Name of the upstream API that failed.
    pub fn upstream(&self) -> &'static str {
        match self {
            Self::InvalidUrl(u, _) => *u,
            Self::Internal(u, _) => *u,
            Self::Unexpected(u, _) => *u,
        }
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidUrl(u, s) => write!(f, "invalid {} API URL {}", u, s),
            Self::Internal(u, e) => write!(f, "Failed to fetch {} data: {}", u, e),
            Self::Unexpected(u, status) => write!(f, "Failed to fetch {} data: {}", u, status),
        }
    }
}

impl error::Error for ClientError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Internal(_, e) => Some(e),
            _ => None,
        }
    }
}

/// Parse a base API URL, making sure it can have path segments appended.
pub(crate) fn parse_base_url(upstream: &'static str, base_url: &str) -> Result<Url, ClientError> {
    let url = Url::parse(base_url).map_err(|e| ClientError::InvalidUrl(upstream, format!("{}: {}", base_url, e)))?;
    if url.cannot_be_a_base() {
        return Err(ClientError::InvalidUrl(upstream, base_url.to_owned()));
    }

    Ok(url)
}

/// Append path segments to a base URL, keeping any path the base already has.
pub(crate) fn join_segments(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }

    url
}

/// GET a URL and decode a JSON body, mapping any non-200 status to an error.
pub(crate) async fn get_json<T: DeserializeOwned>(
    client: &Client,
    upstream: &'static str,
    user_agent: &str,
    accept: &str,
    url: Url,
) -> Result<T, ClientError> {
    let res = make_request(client, upstream, user_agent, accept, url).await?;
    res.json::<T>().await.map_err(|e| ClientError::Internal(upstream, e))
}

async fn make_request(
    client: &Client,
    upstream: &'static str,
    user_agent: &str,
    accept: &str,
    url: Url,
) -> Result<Response, ClientError> {
    let res = client
        .get(url)
        .header(USER_AGENT, user_agent)
        .header(ACCEPT, accept)
        .send()
        .await
        .map_err(|e| ClientError::Internal(upstream, e))?;

    let status = res.status();
    if status == StatusCode::OK {
        Ok(res)
    } else {
        Err(ClientError::Unexpected(upstream, status))
    }
}

/// Fetches the text forecast for a single NWS grid point.
#[derive(Debug)]
pub struct WeatherGovClient {
    client: Client,
    forecast_url: Url,
    user_agent: String,
}

impl WeatherGovClient {
    pub const UPSTREAM: &'static str = "NWS forecast";
    const JSON_RESPONSE: &'static str = "application/geo+json";

    pub fn new(client: Client, config: &ForecastConfig, user_agent: &str) -> Result<Self, ClientError> {
        let base_url = parse_base_url(Self::UPSTREAM, &config.api_url)?;
        let grid = format!("{},{}", config.grid_x, config.grid_y);
        let forecast_url = join_segments(&base_url, &["gridpoints", &config.office, &grid, "forecast"]);

        Ok(WeatherGovClient {
            client,
            forecast_url,
            user_agent: user_agent.to_owned(),
        })
    }

    pub fn forecast_url(&self) -> &Url {
        &self.forecast_url
    }

    pub async fn forecast(&self) -> Result<Forecast, ClientError> {
        tracing::debug!(message = "making forecast request", url = %self.forecast_url);

        let res: ForecastResponse = get_json(
            &self.client,
            Self::UPSTREAM,
            &self.user_agent,
            Self::JSON_RESPONSE,
            self.forecast_url.clone(),
        )
        .await?;

        Ok(res.properties)
    }
}

#[derive(Deserialize, Debug)]
struct ForecastResponse {
    properties: Forecast,
}

/// Forecast for a grid point. Periods are passed through exactly as api.weather.gov
/// returns them.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Forecast {
    pub generated_at: String,
    pub update_time: String,
    pub periods: Vec<Value>,
}
