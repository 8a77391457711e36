//! Thin transactional access to the relational tables.
//!
//! Every helper runs a single statement against the caller's connection, so
//! the engine facade decides transaction boundaries and lock lifetimes.

use chrono::{DateTime, Utc};
use sqlx::PgConnection;
use uuid::Uuid;

use super::error::EngineError;
use super::matcher::Candidate;
use crate::models::{Direction, Instrument, Order, OrderStatus};

pub async fn lookup_instrument(
    conn: &mut PgConnection,
    ticker: &str,
) -> Result<Option<Instrument>, EngineError> {
    let instrument = sqlx::query_as::<_, Instrument>(
        "SELECT ticker, name, kind, created_at FROM instruments WHERE ticker = $1",
    )
    .bind(ticker)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(instrument)
}

/// Missing balance rows read as zero.
pub async fn lookup_balance(
    conn: &mut PgConnection,
    user_id: Uuid,
    ticker: &str,
) -> Result<i64, EngineError> {
    let amount: Option<i64> =
        sqlx::query_scalar("SELECT amount FROM balances WHERE user_id = $1 AND ticker = $2")
            .bind(user_id)
            .bind(ticker)
            .fetch_optional(&mut *conn)
            .await?;
    Ok(amount.unwrap_or(0))
}

pub async fn user_exists(conn: &mut PgConnection, user_id: Uuid) -> Result<bool, EngineError> {
    let found: Option<i32> = sqlx::query_scalar("SELECT 1 FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(found.is_some())
}

pub async fn insert_order(conn: &mut PgConnection, order: &Order) -> Result<(), EngineError> {
    sqlx::query(
        r#"
        INSERT INTO orders (id, user_id, ticker, direction, kind, qty, price, status, filled, ts)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#,
    )
    .bind(order.id)
    .bind(order.user_id)
    .bind(&order.ticker)
    .bind(order.direction)
    .bind(order.kind)
    .bind(order.qty)
    .bind(order.price)
    .bind(order.status)
    .bind(order.filled)
    .bind(order.ts)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Lock the opposite-side resting limit orders an incoming order may match.
///
/// Rows come back best price first (asks ascending for a buy, bids descending
/// for a sell), ties broken by admission time then id, and stay row-locked
/// until the surrounding transaction ends, so concurrent submissions cannot
/// consume the same resting quantity twice.
pub async fn lock_candidates(
    conn: &mut PgConnection,
    ticker: &str,
    incoming: Direction,
    limit_price: Option<i64>,
) -> Result<Vec<Candidate>, EngineError> {
    let sql = match incoming {
        Direction::Buy => {
            "SELECT id, user_id, price, qty, filled FROM orders \
             WHERE ticker = $1 AND direction = 'SELL' AND kind = 'LIMIT' \
               AND status IN ('NEW', 'PARTIALLY_EXECUTED') \
               AND ($2::BIGINT IS NULL OR price <= $2) \
             ORDER BY price ASC, ts ASC, id ASC \
             FOR UPDATE"
        }
        Direction::Sell => {
            "SELECT id, user_id, price, qty, filled FROM orders \
             WHERE ticker = $1 AND direction = 'BUY' AND kind = 'LIMIT' \
               AND status IN ('NEW', 'PARTIALLY_EXECUTED') \
               AND ($2::BIGINT IS NULL OR price >= $2) \
             ORDER BY price DESC, ts ASC, id ASC \
             FOR UPDATE"
        }
    };

    let candidates = sqlx::query_as::<_, Candidate>(sql)
        .bind(ticker)
        .bind(limit_price)
        .fetch_all(&mut *conn)
        .await?;
    Ok(candidates)
}

pub async fn update_order(
    conn: &mut PgConnection,
    order_id: Uuid,
    filled: i64,
    status: OrderStatus,
) -> Result<(), EngineError> {
    sqlx::query("UPDATE orders SET filled = $2, status = $3 WHERE id = $1")
        .bind(order_id)
        .bind(filled)
        .bind(status)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub async fn insert_trade(
    conn: &mut PgConnection,
    ticker: &str,
    amount: i64,
    price: i64,
    buyer_id: Uuid,
    seller_id: Uuid,
    ts: DateTime<Utc>,
) -> Result<i64, EngineError> {
    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO trades (ticker, amount, price, buyer_id, seller_id, ts)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id
        "#,
    )
    .bind(ticker)
    .bind(amount)
    .bind(price)
    .bind(buyer_id)
    .bind(seller_id)
    .bind(ts)
    .fetch_one(&mut *conn)
    .await?;
    Ok(id)
}

/// Atomic upsert-with-delta. The `CHECK (amount >= 0)` constraint makes a
/// negative result fail the statement, surfaced as `InsufficientFunds`.
pub async fn balance_upsert_delta(
    conn: &mut PgConnection,
    user_id: Uuid,
    ticker: &str,
    delta: i64,
) -> Result<(), EngineError> {
    sqlx::query(
        r#"
        INSERT INTO balances (user_id, ticker, amount, updated_at)
        VALUES ($1, $2, $3, now())
        ON CONFLICT (user_id, ticker) DO UPDATE SET
            amount = balances.amount + $3,
            updated_at = now()
        "#,
    )
    .bind(user_id)
    .bind(ticker)
    .bind(delta)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Resting `(price, remaining)` rows for one side of a book.
pub async fn resting_rows(
    conn: &mut PgConnection,
    ticker: &str,
    side: Direction,
) -> Result<Vec<(i64, i64)>, EngineError> {
    let rows: Vec<(i64, i64)> = sqlx::query_as(
        "SELECT price, qty - filled FROM orders \
         WHERE ticker = $1 AND direction = $2 AND kind = 'LIMIT' \
           AND status IN ('NEW', 'PARTIALLY_EXECUTED')",
    )
    .bind(ticker)
    .bind(side)
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows)
}

pub async fn cascade_delete_user(
    conn: &mut PgConnection,
    user_id: Uuid,
) -> Result<(), EngineError> {
    sqlx::query("DELETE FROM trades WHERE buyer_id = $1 OR seller_id = $1")
        .bind(user_id)
        .execute(&mut *conn)
        .await?;
    sqlx::query("DELETE FROM orders WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut *conn)
        .await?;
    sqlx::query("DELETE FROM balances WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut *conn)
        .await?;
    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub async fn cascade_delete_instrument(
    conn: &mut PgConnection,
    ticker: &str,
) -> Result<(), EngineError> {
    sqlx::query("DELETE FROM trades WHERE ticker = $1")
        .bind(ticker)
        .execute(&mut *conn)
        .await?;
    sqlx::query("DELETE FROM orders WHERE ticker = $1")
        .bind(ticker)
        .execute(&mut *conn)
        .await?;
    sqlx::query("DELETE FROM balances WHERE ticker = $1")
        .bind(ticker)
        .execute(&mut *conn)
        .await?;
    sqlx::query("DELETE FROM instruments WHERE ticker = $1")
        .bind(ticker)
        .execute(&mut *conn)
        .await?;
    Ok(())
}
