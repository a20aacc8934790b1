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

use crate::client::{ClientError, Forecast, WeatherGovClient};
use crate::metric::MetricId;
use crate::metrics::StatsMetrics;
use crate::pipeline::{ChartStats, Pipeline, StatSummary, StatsError, WindDirection};
use crate::snotel::{AwdbClient, SnowDepthReport};
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use prometheus_client::encoding::text::encode;
use prometheus_client::registry::Registry;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

const DEFAULT_CHART_DAYS: i64 = 7;
const METRICS_PREFIX: &str = "weather";
const INFLUX_UPSTREAM: &str = "InfluxDB";
const OPENMETRICS_TEXT: &str = "application/openmetrics-text; version=1.0.0; charset=utf-8";

/// Everything request handlers need, shared between all requests.
pub struct RequestContext {
    pipeline: Pipeline,
    forecast: WeatherGovClient,
    snotel: AwdbClient,
    registry: Registry,
    metrics: StatsMetrics,
}

impl RequestContext {
    pub fn new(pipeline: Pipeline, forecast: WeatherGovClient, snotel: AwdbClient) -> Self {
        let mut registry = Registry::with_prefix(METRICS_PREFIX);
        let metrics = StatsMetrics::new(&mut registry);

        RequestContext {
            pipeline,
            forecast,
            snotel,
            registry,
            metrics,
        }
    }
}

/// JSON error body with an HTTP status.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        ApiError {
            status,
            message: message.into(),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { error: &self.message })).into_response()
    }
}

impl From<StatsError> for ApiError {
    fn from(e: StatsError) -> Self {
        match e {
            StatsError::InvalidRange(_) => ApiError::new(StatusCode::BAD_REQUEST, e.to_string()),
            StatsError::DataUnavailable { .. } => ApiError::new(StatusCode::BAD_GATEWAY, e.to_string()),
        }
    }
}

impl From<ClientError> for ApiError {
    fn from(e: ClientError) -> Self {
        ApiError::new(StatusCode::BAD_GATEWAY, e.to_string())
    }
}

#[derive(Debug, Deserialize)]
pub struct ChartParams {
    days: Option<i64>,
}

/// A metric summary or the reason it could not be built.
#[derive(Serialize)]
#[serde(untagged)]
enum SummaryResult {
    Ok(Box<StatSummary>),
    Err { error: String },
}

#[derive(Serialize)]
struct AllStats {
    metrics: BTreeMap<&'static str, SummaryResult>,
}

pub fn router(context: Arc<RequestContext>) -> Router {
    Router::new()
        .route("/api/stats", get(all_stats))
        .route("/api/stats/:metric", get(metric_stats))
        .route("/api/chart/:metric", get(chart))
        .route("/api/wind-direction", get(wind_direction))
        .route("/api/forecast", get(forecast))
        .route("/api/snow-depth", get(snow_depth))
        .route("/metrics", get(text_metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(context)
}

fn parse_metric(raw: &str) -> Result<MetricId, ApiError> {
    raw.parse::<MetricId>()
        .map_err(|e| ApiError::new(StatusCode::NOT_FOUND, e.to_string()))
}

async fn all_stats(State(context): State<Arc<RequestContext>>) -> Json<AllStats> {
    let results = context.pipeline.summaries(&MetricId::ALL).await;
    let mut metrics = BTreeMap::new();

    for (id, res) in results {
        let entry = match res {
            Ok(summary) => {
                context.metrics.summary(&summary);
                SummaryResult::Ok(Box::new(summary))
            }
            Err(e) => {
                context.metrics.failure(INFLUX_UPSTREAM);
                SummaryResult::Err { error: e.to_string() }
            }
        };

        metrics.insert(id.as_str(), entry);
    }

    Json(AllStats { metrics })
}

async fn metric_stats(
    State(context): State<Arc<RequestContext>>,
    Path(metric): Path<String>,
) -> Result<Json<StatSummary>, ApiError> {
    let id = parse_metric(&metric)?;
    let summary = context.pipeline.summary(id).await.map_err(|e| {
        context.metrics.failure(INFLUX_UPSTREAM);
        ApiError::from(e)
    })?;

    context.metrics.summary(&summary);
    Ok(Json(summary))
}

async fn chart(
    State(context): State<Arc<RequestContext>>,
    Path(metric): Path<String>,
    params: Result<Query<ChartParams>, QueryRejection>,
) -> Result<Json<ChartStats>, ApiError> {
    let id = parse_metric(&metric)?;
    let Query(params) = params.map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, e.body_text()))?;
    let days = params.days.unwrap_or(DEFAULT_CHART_DAYS);

    match context.pipeline.chart(id, days).await {
        Ok(chart) => Ok(Json(chart)),
        Err(e @ StatsError::InvalidRange(_)) => Err(e.into()),
        Err(e) => {
            context.metrics.failure(INFLUX_UPSTREAM);
            Err(e.into())
        }
    }
}

async fn wind_direction(State(context): State<Arc<RequestContext>>) -> Result<Json<WindDirection>, ApiError> {
    let direction = context.pipeline.wind_direction().await.map_err(|e| {
        context.metrics.failure(INFLUX_UPSTREAM);
        ApiError::from(e)
    })?;

    context.metrics.wind_direction(&direction);
    Ok(Json(direction))
}

async fn forecast(State(context): State<Arc<RequestContext>>) -> Result<Json<Forecast>, ApiError> {
    let forecast = context.forecast.forecast().await.map_err(|e| {
        tracing::error!(message = "failed to fetch forecast", error = %e);
        context.metrics.failure(e.upstream());
        ApiError::from(e)
    })?;

    tracing::debug!(message = "fetched forecast", periods = forecast.periods.len());
    Ok(Json(forecast))
}

async fn snow_depth(State(context): State<Arc<RequestContext>>) -> Result<Json<SnowDepthReport>, ApiError> {
    let report = context.snotel.snow_depth().await.map_err(|e| {
        context.metrics.failure(e.upstream());
        ApiError::from(e)
    })?;

    tracing::debug!(message = "fetched snow depth", stations = report.stations.len());
    Ok(Json(report))
}

async fn text_metrics(State(context): State<Arc<RequestContext>>) -> Response {
    let mut buf = String::new();

    match encode(&mut buf, &context.registry) {
        Ok(_) => {
            tracing::debug!(message = "encoded prometheus metrics to text format", num_bytes = buf.len());
            ([(CONTENT_TYPE, OPENMETRICS_TEXT)], buf).into_response()
        }
        Err(e) => {
            tracing::error!(message = "error encoding metrics", error = %e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
