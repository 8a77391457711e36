//! Order endpoints: submission, inspection, cancellation.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::models::{Order, OrderBody, OrderView};
use crate::utils::response::{AppError, OkBody};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct CreateOrderResponse {
    pub success: bool,
    pub order_id: Uuid,
}

/// POST /order
pub async fn create_order(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<OrderBody>,
) -> Result<Json<CreateOrderResponse>, AppError> {
    body.validate()?;

    let order_id = state.engine.create_order(auth_user.id, &body).await?;
    Ok(Json(CreateOrderResponse {
        success: true,
        order_id,
    }))
}

/// GET /order
pub async fn list_orders(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
) -> Result<Json<Vec<OrderView>>, AppError> {
    let orders: Vec<Order> = sqlx::query_as(
        "SELECT id, user_id, ticker, direction, kind, qty, price, status, filled, ts \
         FROM orders WHERE user_id = $1 ORDER BY ts DESC",
    )
    .bind(auth_user.id)
    .fetch_all(&state.db.pool)
    .await
    .map_err(|e| {
        tracing::error!("failed to list orders: {}", e);
        AppError::internal("internal error")
    })?;

    Ok(Json(orders.into_iter().map(OrderView::from).collect()))
}

/// GET /order/:order_id
pub async fn get_order(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<OrderView>, AppError> {
    let order: Option<Order> = sqlx::query_as(
        "SELECT id, user_id, ticker, direction, kind, qty, price, status, filled, ts \
         FROM orders WHERE id = $1 AND user_id = $2",
    )
    .bind(order_id)
    .bind(auth_user.id)
    .fetch_optional(&state.db.pool)
    .await
    .map_err(|e| {
        tracing::error!("failed to fetch order: {}", e);
        AppError::internal("internal error")
    })?;

    let order = order.ok_or_else(|| AppError::not_found("order not found"))?;
    Ok(Json(order.into()))
}

/// DELETE /order/:order_id
pub async fn cancel_order(
    State(state): State<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<OkBody>, AppError> {
    if state.engine.cancel_order(auth_user.id, order_id).await? {
        Ok(Json(OkBody::default()))
    } else {
        Err(AppError::not_found("order not found or not cancellable"))
    }
}
