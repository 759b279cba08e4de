//! Cars JSON API - structured bodies and status codes
//!
//! Endpoints:
//! - api_cars: all ledger entries
//! - api_car_detail: one car, 404 on miss
//! - api_car_create: create from a JSON car; ids must survive the legacy encoding
//! - api_car_change_holder: transfer from a JSON `{ "name": ... }`
//! - api_car_history: writes applied to one car

use crate::error::{ApiError, ApiResult};
use crate::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use carledger_core::wire;
use carledger_core::{Car, CoreError, HistoryEntry, LedgerEntry};
use serde::{Deserialize, Serialize};

/// Body of `PUT /api/cars/:id/holder`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HolderBody {
    pub name: String,
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ApiError::BadRequest { message: rejection.body_text() })
}

pub async fn api_cars(State(state): State<AppState>) -> ApiResult<Json<Vec<LedgerEntry>>> {
    Ok(Json(state.ledger.get_all_cars().await?))
}

pub async fn api_car_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Car>> {
    state
        .ledger
        .get_car(&id)
        .await?
        .map(Json)
        .ok_or_else(|| CoreError::CarNotFound { id }.into())
}

pub async fn api_car_create(
    State(state): State<AppState>,
    body: Result<Json<Car>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Car>)> {
    let car = json_body(body)?;
    wire::validate_id(&car.id)?;
    let car = state.ledger.add_car(car).await?;
    Ok((StatusCode::CREATED, Json(car)))
}

pub async fn api_car_change_holder(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<HolderBody>, JsonRejection>,
) -> ApiResult<Json<Car>> {
    let body = json_body(body)?;
    state
        .ledger
        .change_holder(&id, &body.name)
        .await?
        .map(Json)
        .ok_or_else(|| CoreError::CarNotFound { id }.into())
}

pub async fn api_car_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<HistoryEntry>>> {
    let history = state.ledger.history(&id).await?;
    if history.is_empty() {
        return Err(CoreError::CarNotFound { id }.into());
    }
    Ok(Json(history))
}
