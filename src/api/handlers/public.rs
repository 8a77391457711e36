//! Public endpoints: registration, instrument listing, book and tape.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::engine::L2OrderBook;
use crate::models::{Instrument, InstrumentView, NewUser, TradeView, User, UserView};
use crate::utils::response::AppError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct DepthQuery {
    pub limit: Option<i64>,
}

/// POST /public/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewUser>,
) -> Result<Json<UserView>, AppError> {
    req.validate()?;

    let api_key = format!("key-{}", Uuid::new_v4());
    let user: User = sqlx::query_as(
        "INSERT INTO users (id, name, role, api_key) VALUES ($1, $2, 'USER', $3) \
         RETURNING id, name, role, api_key, created_at",
    )
    .bind(Uuid::new_v4())
    .bind(&req.name)
    .bind(&api_key)
    .fetch_one(&state.db.pool)
    .await
    .map_err(|e| {
        tracing::error!("failed to register user: {}", e);
        AppError::internal("registration failed")
    })?;

    tracing::info!(user = %user.id, "user registered");
    Ok(Json(user.into()))
}

/// GET /public/instrument
pub async fn list_instruments(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<InstrumentView>>, AppError> {
    let rows: Vec<Instrument> =
        sqlx::query_as("SELECT ticker, name, kind, created_at FROM instruments ORDER BY ticker")
            .fetch_all(&state.db.pool)
            .await
            .map_err(|e| {
                tracing::error!("failed to list instruments: {}", e);
                AppError::internal("internal error")
            })?;

    Ok(Json(rows.into_iter().map(InstrumentView::from).collect()))
}

/// GET /public/orderbook/:ticker
pub async fn get_orderbook(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
    Query(query): Query<DepthQuery>,
) -> Result<Json<L2OrderBook>, AppError> {
    let book = state
        .engine
        .orderbook(&ticker, query.limit.unwrap_or(10))
        .await?;
    Ok(Json(book))
}

/// GET /public/transactions/:ticker
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
    Query(query): Query<DepthQuery>,
) -> Result<Json<Vec<TradeView>>, AppError> {
    let trades = state
        .engine
        .recent_trades(&ticker, query.limit.unwrap_or(10))
        .await?;
    Ok(Json(trades))
}
