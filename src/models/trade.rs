use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Trade {
    pub id: i64,
    pub ticker: String,
    pub amount: i64,
    pub price: i64,
    pub buyer_id: Uuid,
    pub seller_id: Uuid,
    pub ts: DateTime<Utc>,
}

/// Public trade tape entry.
#[derive(Debug, Serialize, Deserialize)]
pub struct TradeView {
    pub ticker: String,
    pub amount: i64,
    pub price: i64,
    pub timestamp: DateTime<Utc>,
}

impl From<Trade> for TradeView {
    fn from(trade: Trade) -> Self {
        Self {
            ticker: trade.ticker,
            amount: trade.amount,
            price: trade.price,
            timestamp: trade.ts,
        }
    }
}
