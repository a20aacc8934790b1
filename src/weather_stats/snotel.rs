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

use crate::client::{self, ClientError};
use crate::config::SnotelConfig;
use crate::geo::Coordinate;
use crate::stations::{self, EnrichedStation, RawReading, StationRecord};
use chrono::{Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const SNOW_DEPTH_ELEMENT: &str = "SNWD";
const SNOW_DEPTH_UNIT: &str = "in";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnowDepthReport {
    pub stations: Vec<EnrichedStation>,
    pub unit: &'static str,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StationMetadata {
    pub station_triplet: String,
    pub name: String,
    pub elevation: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StationData {
    pub station_triplet: String,
    #[serde(default)]
    pub data: Vec<ElementData>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ElementData {
    #[serde(default)]
    pub values: Vec<DataValue>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct DataValue {
    pub date: String,
    pub value: Option<f64>,
}

/// Client for the USDA NRCS Air and Water Database (SNOTEL) REST API.
#[derive(Debug)]
pub struct AwdbClient {
    client: Client,
    base_url: Url,
    user_agent: String,
    triplets: String,
    lookback_days: i64,
    reference: Coordinate,
    timezone: Tz,
}

impl AwdbClient {
    pub const UPSTREAM: &'static str = "SNOTEL";
    const JSON_RESPONSE: &'static str = "application/json";

    pub fn new(
        client: Client,
        config: &SnotelConfig,
        user_agent: &str,
        reference: Coordinate,
        timezone: Tz,
    ) -> Result<Self, ClientError> {
        Ok(AwdbClient {
            client,
            base_url: client::parse_base_url(Self::UPSTREAM, &config.api_url)?,
            user_agent: user_agent.to_owned(),
            triplets: config.triplets.join(","),
            lookback_days: config.lookback_days,
            reference,
            timezone,
        })
    }

    /// Hourly snow depth for the configured stations over the lookback period.
    ///
    /// Station metadata and readings are fetched concurrently. Failing to fetch metadata
    /// is logged and stations are named by triplet. Failing to fetch readings is an error.
    pub async fn snow_depth(&self) -> Result<SnowDepthReport, ClientError> {
        let today = Utc::now().with_timezone(&self.timezone).date_naive();
        let (metadata, data) = tokio::join!(self.metadata(), self.data(today));

        let metadata = metadata.unwrap_or_else(|e| {
            tracing::warn!(message = "unable to fetch SNOTEL station metadata", error = %e);
            Vec::new()
        });
        let data = data.map_err(|e| {
            tracing::error!(message = "unable to fetch SNOTEL data", error = %e);
            e
        })?;

        Ok(build_report(&self.reference, &metadata, &data))
    }

    pub fn metadata_url(&self) -> Url {
        let mut url = client::join_segments(&self.base_url, &["stations"]);
        url.query_pairs_mut()
            .append_pair("stationTriplets", &self.triplets)
            .append_pair("returnForecastPointMetadata", "false")
            .append_pair("returnReservoirMetadata", "false")
            .append_pair("returnStationElements", "false")
            .append_pair("activeOnly", "true");
        url
    }

    pub fn data_url(&self, today: NaiveDate) -> Url {
        let begin = today - Duration::days(self.lookback_days);
        let mut url = client::join_segments(&self.base_url, &["data"]);
        url.query_pairs_mut()
            .append_pair("stationTriplets", &self.triplets)
            .append_pair("elements", SNOW_DEPTH_ELEMENT)
            .append_pair("duration", "HOURLY")
            .append_pair("beginDate", &begin.format("%Y-%m-%d").to_string())
            .append_pair("endDate", "0")
            .append_pair("returnFlags", "false")
            .append_pair("returnOriginalValues", "false")
            .append_pair("returnSuspectData", "false");
        url
    }

    async fn metadata(&self) -> Result<Vec<StationMetadata>, ClientError> {
        let url = self.metadata_url();
        tracing::debug!(message = "making SNOTEL station metadata request", url = %url);
        client::get_json(&self.client, Self::UPSTREAM, &self.user_agent, Self::JSON_RESPONSE, url).await
    }

    async fn data(&self, today: NaiveDate) -> Result<Vec<StationData>, ClientError> {
        let url = self.data_url(today);
        tracing::debug!(message = "making SNOTEL data request", url = %url);
        client::get_json(&self.client, Self::UPSTREAM, &self.user_agent, Self::JSON_RESPONSE, url).await
    }
}

/// Combine readings with whatever metadata is available for each station.
///
/// Only the first element series of each station is used. Stations missing from the
/// metadata are named by their triplet.
pub fn build_report(reference: &Coordinate, metadata: &[StationMetadata], data: &[StationData]) -> SnowDepthReport {
    let by_triplet: HashMap<&str, &StationMetadata> =
        metadata.iter().map(|m| (m.station_triplet.as_str(), m)).collect();

    let records: Vec<StationRecord> = data
        .iter()
        .filter_map(|station| {
            let element = station.data.first()?;
            let meta = by_triplet.get(station.station_triplet.as_str());

            Some(StationRecord {
                triplet_id: station.station_triplet.clone(),
                name: meta
                    .map(|m| m.name.clone())
                    .unwrap_or_else(|| station.station_triplet.clone()),
                elevation: meta.and_then(|m| m.elevation),
                latitude: meta.and_then(|m| m.latitude),
                longitude: meta.and_then(|m| m.longitude),
                observations: element
                    .values
                    .iter()
                    .map(|v| RawReading {
                        date: v.date.clone(),
                        value: v.value,
                    })
                    .collect(),
            })
        })
        .collect();

    SnowDepthReport {
        stations: stations::correlate(reference, &records),
        unit: SNOW_DEPTH_UNIT,
    }
}
