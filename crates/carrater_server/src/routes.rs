use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, Path, Request, State},
    middleware::Next,
    response::Response,
    Json,
};
use carrater_core::{CarView, VoteResult};
use log::info;
use serde::{Deserialize, Serialize};

use crate::{error::AppError, state::AppState};

#[derive(Deserialize)]
pub struct VoteRequest {
    pub car_id: String,
    /// Kept as raw text so unknown values reach vote validation.
    pub vote_type: String,
}

#[derive(Serialize)]
pub struct CarEnvelope {
    pub car: VoteResult,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn random_car_handler(
    State(state): State<AppState>,
) -> Result<Json<CarView>, AppError> {
    let car = state.with_service(|service| service.next_item()).await?;

    Ok(Json(car))
}

pub async fn vote_handler(
    State(state): State<AppState>,
    payload: Result<Json<VoteRequest>, JsonRejection>,
) -> Result<Json<CarEnvelope>, AppError> {
    let Json(request) =
        payload.map_err(|rejection| AppError::MalformedPayload(rejection.body_text()))?;

    let car = state
        .with_service(move |service| service.cast_vote(&request.car_id, &request.vote_type))
        .await?;

    Ok(Json(CarEnvelope { car }))
}

pub async fn car_stats_handler(
    State(state): State<AppState>,
    Path(car_id): Path<String>,
) -> Result<Json<CarEnvelope>, AppError> {
    let car = state
        .with_service(move |service| service.car_stats(&car_id))
        .await?;

    Ok(Json(CarEnvelope { car }))
}

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: carrater_core::core_version(),
    })
}

pub async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started_at = Instant::now();

    let response = next.run(request).await;

    info!(
        "event=http_request module=server status={} method={} path={} duration_ms={}",
        response.status().as_u16(),
        method,
        path,
        started_at.elapsed().as_millis()
    );
    response
}
