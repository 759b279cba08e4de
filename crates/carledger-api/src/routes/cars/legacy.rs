//! Legacy car endpoints - the four GET routes the browser client calls
//!
//! Every handler takes its single path segment as-is. Misses are answered
//! with 200 and a sentinel body; only undecodable payloads and ledger
//! failures produce error statuses.

use crate::error::ApiResult;
use crate::AppState;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use carledger_core::wire::{self, CAR_NOT_FOUND, HOLDER_CAR_NOT_FOUND};

/// GET /get_car/:id
pub async fn get_car(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Response> {
    log::debug!(target: "carledger::legacy", "get_car {}", id);
    match state.ledger.get_car(&id).await? {
        Some(car) => Ok(Json(car.record()).into_response()),
        None => Ok(CAR_NOT_FOUND.into_response()),
    }
}

/// GET /add_car/:car where car is `id-model-make-owner-color`
pub async fn add_car(State(state): State<AppState>, Path(car): Path<String>) -> ApiResult<Response> {
    log::debug!(target: "carledger::legacy", "add_car {}", car);
    let car = wire::decode_car(&car)?;
    let car = state.ledger.add_car(car).await?;
    Ok(Json(car.record()).into_response())
}

/// GET /get_all_cars
pub async fn get_all_cars(State(state): State<AppState>) -> ApiResult<Response> {
    log::debug!(target: "carledger::legacy", "get_all_cars");
    let entries = state.ledger.get_all_cars().await?;
    Ok(Json(entries).into_response())
}

/// GET /change_holder/:holder where holder is `id-name`
pub async fn change_holder(State(state): State<AppState>, Path(holder): Path<String>) -> ApiResult<Response> {
    log::debug!(target: "carledger::legacy", "change_holder {}", holder);
    let change = wire::decode_holder(&holder)?;
    match state.ledger.change_holder(&change.id, &change.name).await? {
        Some(car) => Ok(Json(car.record()).into_response()),
        None => Ok(HOLDER_CAR_NOT_FOUND.into_response()),
    }
}
