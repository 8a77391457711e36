use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use super::instrument::validate_ticker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "direction", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Buy,
    Sell,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Buy => write!(f, "BUY"),
            Direction::Sell => write!(f, "SELL"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "order_kind", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderKind {
    Limit,
    Market,
}

impl fmt::Display for OrderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderKind::Limit => write!(f, "LIMIT"),
            OrderKind::Market => write!(f, "MARKET"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "order_status")]
pub enum OrderStatus {
    #[sqlx(rename = "NEW")]
    #[serde(rename = "NEW")]
    New,
    #[sqlx(rename = "PARTIALLY_EXECUTED")]
    #[serde(rename = "PARTIALLY_EXECUTED")]
    PartiallyExecuted,
    #[sqlx(rename = "EXECUTED")]
    #[serde(rename = "EXECUTED")]
    Executed,
    #[sqlx(rename = "CANCELLED")]
    #[serde(rename = "CANCELLED")]
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub ticker: String,
    pub direction: Direction,
    pub kind: OrderKind,
    pub qty: i64,
    pub price: Option<i64>,
    pub status: OrderStatus,
    pub filled: i64,
    pub ts: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LimitOrderBody {
    pub direction: Direction,
    #[validate(custom = "validate_ticker")]
    pub ticker: String,
    #[validate(range(min = 1))]
    pub qty: i64,
    #[validate(range(min = 1))]
    pub price: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MarketOrderBody {
    pub direction: Direction,
    #[validate(custom = "validate_ticker")]
    pub ticker: String,
    #[validate(range(min = 1))]
    pub qty: i64,
}

/// Incoming order body. The two kinds share a shape except for `price`, which
/// is the discriminator: a body with `price` is a limit order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OrderBody {
    Limit(LimitOrderBody),
    Market(MarketOrderBody),
}

impl OrderBody {
    pub fn kind(&self) -> OrderKind {
        match self {
            OrderBody::Limit(_) => OrderKind::Limit,
            OrderBody::Market(_) => OrderKind::Market,
        }
    }

    pub fn direction(&self) -> Direction {
        match self {
            OrderBody::Limit(body) => body.direction,
            OrderBody::Market(body) => body.direction,
        }
    }

    pub fn ticker(&self) -> &str {
        match self {
            OrderBody::Limit(body) => &body.ticker,
            OrderBody::Market(body) => &body.ticker,
        }
    }

    pub fn qty(&self) -> i64 {
        match self {
            OrderBody::Limit(body) => body.qty,
            OrderBody::Market(body) => body.qty,
        }
    }

    pub fn price(&self) -> Option<i64> {
        match self {
            OrderBody::Limit(body) => Some(body.price),
            OrderBody::Market(_) => None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        match self {
            OrderBody::Limit(body) => body.validate(),
            OrderBody::Market(body) => body.validate(),
        }
    }
}

/// User-facing order projection. Market orders are reported without a fill
/// counter, mirroring the wire contract.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum OrderView {
    Limit {
        id: Uuid,
        status: OrderStatus,
        user_id: Uuid,
        timestamp: DateTime<Utc>,
        body: LimitOrderBody,
        filled: i64,
    },
    Market {
        id: Uuid,
        status: OrderStatus,
        user_id: Uuid,
        timestamp: DateTime<Utc>,
        body: MarketOrderBody,
    },
}

impl From<Order> for OrderView {
    fn from(order: Order) -> Self {
        match order.kind {
            OrderKind::Limit => OrderView::Limit {
                id: order.id,
                status: order.status,
                user_id: order.user_id,
                timestamp: order.ts,
                body: LimitOrderBody {
                    direction: order.direction,
                    ticker: order.ticker,
                    qty: order.qty,
                    price: order.price.unwrap_or(0),
                },
                filled: order.filled,
            },
            OrderKind::Market => OrderView::Market {
                id: order.id,
                status: order.status,
                user_id: order.user_id,
                timestamp: order.ts,
                body: MarketOrderBody {
                    direction: order.direction,
                    ticker: order.ticker,
                    qty: order.qty,
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn body_with_price_parses_as_limit() {
        let body: OrderBody = serde_json::from_value(json!({
            "direction": "BUY",
            "ticker": "AAA",
            "qty": 10,
            "price": 50
        }))
        .unwrap();

        assert_eq!(body.kind(), OrderKind::Limit);
        assert_eq!(body.price(), Some(50));
        assert_eq!(body.direction(), Direction::Buy);
    }

    #[test]
    fn body_without_price_parses_as_market() {
        let body: OrderBody = serde_json::from_value(json!({
            "direction": "SELL",
            "ticker": "AAA",
            "qty": 3
        }))
        .unwrap();

        assert_eq!(body.kind(), OrderKind::Market);
        assert_eq!(body.price(), None);
    }

    #[test]
    fn body_validation_rejects_bad_qty_and_price() {
        let body = OrderBody::Limit(LimitOrderBody {
            direction: Direction::Buy,
            ticker: "AAA".to_string(),
            qty: 0,
            price: 50,
        });
        assert!(body.validate().is_err());

        let body = OrderBody::Limit(LimitOrderBody {
            direction: Direction::Buy,
            ticker: "AAA".to_string(),
            qty: 1,
            price: 0,
        });
        assert!(body.validate().is_err());

        let body = OrderBody::Market(MarketOrderBody {
            direction: Direction::Sell,
            ticker: "AAA".to_string(),
            qty: 1,
        });
        assert!(body.validate().is_ok());
    }

    #[test]
    fn status_serializes_screaming_snake() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::PartiallyExecuted).unwrap(),
            "\"PARTIALLY_EXECUTED\""
        );
    }

    #[test]
    fn market_view_has_no_filled_field() {
        let order = Order {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            ticker: "AAA".to_string(),
            direction: Direction::Buy,
            kind: OrderKind::Market,
            qty: 5,
            price: None,
            status: OrderStatus::Executed,
            filled: 5,
            ts: Utc::now(),
        };

        let value = serde_json::to_value(OrderView::from(order)).unwrap();
        assert!(value.get("filled").is_none());
        assert!(value["body"].get("price").is_none());
        assert_eq!(value["body"]["qty"], 5);
    }

    #[test]
    fn limit_view_carries_filled_and_price() {
        let order = Order {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            ticker: "AAA".to_string(),
            direction: Direction::Sell,
            kind: OrderKind::Limit,
            qty: 10,
            price: Some(50),
            status: OrderStatus::PartiallyExecuted,
            filled: 4,
            ts: Utc::now(),
        };

        let value = serde_json::to_value(OrderView::from(order)).unwrap();
        assert_eq!(value["filled"], 4);
        assert_eq!(value["body"]["price"], 50);
        assert_eq!(value["status"], "PARTIALLY_EXECUTED");
    }
}
