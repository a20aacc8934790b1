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

use crate::config::InfluxConfig;
use crate::query::{Observation, Query, QueryError, QueryService};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Url};
use serde::Serialize;

const COLUMN_TIME: &str = "_time";
const COLUMN_VALUE: &str = "_value";
const COLUMN_ERROR: &str = "error";

/// Runs Flux queries against the InfluxDB v2 HTTP API.
#[derive(Debug)]
pub struct InfluxClient {
    client: Client,
    query_url: Url,
    token: String,
}

#[derive(Serialize)]
struct QueryBody<'a> {
    query: &'a str,
    #[serde(rename = "type")]
    type_: &'static str,
    dialect: Dialect,
}

#[derive(Serialize)]
struct Dialect {
    header: bool,
    annotations: [&'static str; 0],
    delimiter: &'static str,
}

impl InfluxClient {
    const CSV_RESPONSE: &'static str = "application/csv";
    const JSON_REQUEST: &'static str = "application/json";

    pub fn new(client: Client, config: &InfluxConfig) -> Result<Self, QueryError> {
        let mut query_url =
            Url::parse(&config.url).map_err(|e| QueryError::InvalidUrl(format!("{}: {}", config.url, e)))?;
        query_url
            .path_segments_mut()
            .map(|mut p| {
                p.pop_if_empty().push("api").push("v2").push("query");
            })
            .map_err(|_| QueryError::InvalidUrl(config.url.clone()))?;
        query_url.query_pairs_mut().append_pair("org", &config.org);

        Ok(InfluxClient {
            client,
            query_url,
            token: config.token.clone(),
        })
    }

    pub fn query_url(&self) -> &Url {
        &self.query_url
    }
}

#[async_trait]
impl QueryService for InfluxClient {
    async fn query(&self, query: &Query) -> Result<Vec<Observation>, QueryError> {
        let flux = query.to_flux();
        tracing::debug!(message = "running flux query", query = %query, url = %self.query_url);

        let body = QueryBody {
            query: &flux,
            type_: "flux",
            dialect: Dialect {
                header: true,
                annotations: [],
                delimiter: ",",
            },
        };

        let res = self
            .client
            .post(self.query_url.clone())
            .header(AUTHORIZATION, format!("Token {}", self.token))
            .header(ACCEPT, Self::CSV_RESPONSE)
            .header(CONTENT_TYPE, Self::JSON_REQUEST)
            .json(&body)
            .send()
            .await?;

        let status = res.status();
        let text = res.text().await?;
        if !status.is_success() {
            return Err(QueryError::Status { status, body: text });
        }

        let observations = parse_csv(&text)?;
        tracing::debug!(message = "parsed flux query results", query = %query, rows = observations.len());
        Ok(observations)
    }
}

#[derive(Clone, Copy)]
enum Header {
    Data { time: usize, value: usize },
    Error(usize),
}

/// Parse the CSV returned by the query API into observations.
///
/// The response may contain several tables, each with its own header row. Rows with an
/// empty value are skipped. An `error` table is converted into [`QueryError::Server`].
pub fn parse_csv(body: &str) -> Result<Vec<Observation>, QueryError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(body.as_bytes());

    let mut header: Option<Header> = None;
    let mut observations = Vec::new();

    for record in reader.records() {
        let record = record?;
        if record.iter().all(|f| f.trim().is_empty()) {
            header = None;
            continue;
        }

        let time_col = record.iter().position(|f| f == COLUMN_TIME);
        let value_col = record.iter().position(|f| f == COLUMN_VALUE);
        if let (Some(time), Some(value)) = (time_col, value_col) {
            header = Some(Header::Data { time, value });
            continue;
        }

        match header {
            None => {
                if let Some(idx) = record.iter().position(|f| f == COLUMN_ERROR) {
                    header = Some(Header::Error(idx));
                } else {
                    return Err(QueryError::Malformed(format!("missing header in row {:?}", record)));
                }
            }
            Some(Header::Error(idx)) => {
                let message = record.get(idx).unwrap_or_default();
                return Err(QueryError::Server(message.to_owned()));
            }
            Some(Header::Data { time, value }) => {
                let raw_value = record.get(value).unwrap_or_default().trim();
                if raw_value.is_empty() {
                    continue;
                }

                let raw_time = record.get(time).unwrap_or_default();
                let timestamp = DateTime::parse_from_rfc3339(raw_time)
                    .map_err(|e| QueryError::Malformed(format!("invalid time {:?}: {}", raw_time, e)))?
                    .with_timezone(&Utc);
                let value = raw_value
                    .parse::<f64>()
                    .map_err(|e| QueryError::Malformed(format!("invalid value {:?}: {}", raw_value, e)))?;

                observations.push(Observation { timestamp, value });
            }
        }
    }

    Ok(observations)
}
