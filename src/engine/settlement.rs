//! Balance settlement.
//!
//! Trades are settled by accumulating signed per-account deltas for the whole
//! submission, then applying them in one canonical order. The ordering (user
//! id byte order, then ticker) keeps concurrent settlements that touch
//! overlapping accounts from deadlocking each other.

use rand::Rng;
use sqlx::PgConnection;
use std::collections::BTreeMap;
use std::time::Duration;
use uuid::Uuid;

use super::error::EngineError;
use super::store;
use crate::models::QUOTE_TICKER;

/// Signed balance deltas for one order submission, keyed `(user, ticker)`.
#[derive(Debug, Default)]
pub struct DeltaMap {
    deltas: BTreeMap<(Uuid, String), i64>,
}

impl DeltaMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, user_id: Uuid, ticker: &str, delta: i64) {
        *self.deltas.entry((user_id, ticker.to_string())).or_insert(0) += delta;
    }

    /// Record both legs of a trade: `qty` units of `ticker` move seller to
    /// buyer, `qty * price` units of the quote currency move buyer to seller.
    pub fn record_trade(&mut self, buyer: Uuid, seller: Uuid, ticker: &str, qty: i64, price: i64) {
        let cost = qty * price;
        self.add(buyer, ticker, qty);
        self.add(buyer, QUOTE_TICKER, -cost);
        self.add(seller, ticker, -qty);
        self.add(seller, QUOTE_TICKER, cost);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&(Uuid, String), &i64)> {
        self.deltas.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.deltas.values().all(|delta| *delta == 0)
    }
}

/// Apply accumulated deltas inside the caller's transaction.
///
/// Admission has already verified funds under the settlement gate, so a
/// negative balance here is an invariant breach, not a user error: the
/// transaction is abandoned and the failure reported as internal.
pub async fn apply(conn: &mut PgConnection, deltas: &DeltaMap) -> Result<(), EngineError> {
    for ((user_id, ticker), delta) in deltas.iter() {
        if *delta == 0 {
            continue;
        }
        if let Err(err) = store::balance_upsert_delta(&mut *conn, *user_id, ticker, *delta).await {
            if matches!(err, EngineError::InsufficientFunds) {
                tracing::error!(user = %user_id, ticker = %ticker, delta, "settlement would drive a balance negative");
                return Err(EngineError::Internal(
                    "settlement would drive a balance negative".to_string(),
                ));
            }
            return Err(err);
        }
    }
    Ok(())
}

/// Jittered exponential backoff for conflict retries: U(10ms, 100ms) * 2^attempt.
pub fn backoff_delay(attempt: u32) -> Duration {
    let base = rand::thread_rng().gen_range(10..=100u64);
    Duration::from_millis(base << attempt.min(6))
}
