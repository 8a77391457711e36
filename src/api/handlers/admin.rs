//! Admin endpoints: instrument management, balance adjustments, user removal.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::engine::EngineError;
use crate::models::instrument::validate_ticker;
use crate::models::InstrumentBody;
use crate::utils::response::{AppError, OkBody};
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct DepositWithdrawBody {
    pub user_id: Uuid,
    #[validate(custom = "validate_ticker")]
    pub ticker: String,
    #[validate(range(min = 1))]
    pub amount: i64,
}

/// POST /admin/instrument
pub async fn add_instrument(
    State(state): State<Arc<AppState>>,
    Json(body): Json<InstrumentBody>,
) -> Result<Json<OkBody>, AppError> {
    body.validate()?;

    sqlx::query("INSERT INTO instruments (ticker, name, kind) VALUES ($1, $2, 'STOCK')")
        .bind(&body.ticker)
        .bind(&body.name)
        .execute(&state.db.pool)
        .await
        .map_err(|e| match EngineError::from(e) {
            EngineError::Duplicate => AppError::new(
                StatusCode::BAD_REQUEST,
                "DUPLICATE_INSTRUMENT",
                "ticker already exists",
            ),
            other => other.into(),
        })?;

    tracing::info!(ticker = %body.ticker, "instrument created");
    Ok(Json(OkBody::default()))
}

/// DELETE /admin/instrument/:ticker
pub async fn delete_instrument(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
) -> Result<Json<OkBody>, AppError> {
    state.engine.delete_instrument_cascade(&ticker).await?;
    Ok(Json(OkBody::default()))
}

/// POST /admin/balance/deposit
pub async fn deposit(
    State(state): State<Arc<AppState>>,
    Json(body): Json<DepositWithdrawBody>,
) -> Result<Json<OkBody>, AppError> {
    body.validate()?;

    state
        .engine
        .deposit(body.user_id, &body.ticker, body.amount)
        .await?;
    Ok(Json(OkBody::default()))
}

/// POST /admin/balance/withdraw
pub async fn withdraw(
    State(state): State<Arc<AppState>>,
    Json(body): Json<DepositWithdrawBody>,
) -> Result<Json<OkBody>, AppError> {
    body.validate()?;

    state
        .engine
        .withdraw(body.user_id, &body.ticker, body.amount)
        .await?;
    Ok(Json(OkBody::default()))
}

/// DELETE /admin/user/:user_id
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<OkBody>, AppError> {
    state.engine.delete_user_cascade(user_id).await?;
    Ok(Json(OkBody::default()))
}
