//! Price-time matching.
//!
//! The matcher is pure: it walks a candidate set the storage adapter has
//! already filtered, ordered and row-locked, and reports fills plus the
//! resulting order mutations. All persistence happens in the caller's
//! transaction.

use sqlx::FromRow;
use uuid::Uuid;

use crate::models::{OrderKind, OrderStatus};

/// A resting limit order eligible to match. Rows arrive best-price-first,
/// ties broken by admission time then id.
#[derive(Debug, Clone, FromRow)]
pub struct Candidate {
    pub id: Uuid,
    pub user_id: Uuid,
    pub price: i64,
    pub qty: i64,
    pub filled: i64,
}

impl Candidate {
    pub fn remaining(&self) -> i64 {
        self.qty - self.filled
    }
}

/// One trade between the taker and a maker, at the maker's price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fill {
    pub maker_order_id: Uuid,
    pub maker_user_id: Uuid,
    pub price: i64,
    pub qty: i64,
}

/// Fill counter and status to write back for a touched maker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MakerUpdate {
    pub order_id: Uuid,
    pub filled: i64,
    pub status: OrderStatus,
}

#[derive(Debug)]
pub struct MatchOutcome {
    pub fills: Vec<Fill>,
    pub maker_updates: Vec<MakerUpdate>,
    pub taker_filled: i64,
    pub taker_status: OrderStatus,
}

/// Match an incoming order of `kind` and size `qty` against the candidate
/// set. Side and price filtering already happened when the candidates were
/// selected.
///
/// `rub_budget` is set only for MARKET BUY orders: the taker's live quote
/// balance, read in the same transaction. Each take is capped so the budget
/// always covers it, which keeps settlement from ever driving the buyer
/// negative despite the lower-bound admission check.
pub fn run(
    kind: OrderKind,
    qty: i64,
    candidates: &[Candidate],
    rub_budget: Option<i64>,
) -> MatchOutcome {
    let mut fills = Vec::new();
    let mut maker_updates = Vec::new();
    let mut remaining = qty;
    let mut budget = rub_budget;

    for maker in candidates {
        if remaining == 0 {
            break;
        }
        let available = maker.remaining();
        if available <= 0 {
            continue;
        }

        let mut take = remaining.min(available);
        if let Some(limit) = budget {
            take = take.min(limit / maker.price);
            if take == 0 {
                // Candidates only get more expensive from here.
                break;
            }
        }

        fills.push(Fill {
            maker_order_id: maker.id,
            maker_user_id: maker.user_id,
            price: maker.price,
            qty: take,
        });

        let maker_filled = maker.filled + take;
        maker_updates.push(MakerUpdate {
            order_id: maker.id,
            filled: maker_filled,
            status: if maker_filled == maker.qty {
                OrderStatus::Executed
            } else {
                OrderStatus::PartiallyExecuted
            },
        });

        remaining -= take;
        if let Some(limit) = budget.as_mut() {
            *limit -= take * maker.price;
        }
    }

    let taker_filled = qty - remaining;
    MatchOutcome {
        fills,
        maker_updates,
        taker_filled,
        taker_status: terminal_status(kind, qty, taker_filled),
    }
}

/// Post-loop status: limit orders rest while unfilled, market orders never do.
fn terminal_status(kind: OrderKind, qty: i64, filled: i64) -> OrderStatus {
    if filled == qty {
        OrderStatus::Executed
    } else if filled > 0 {
        OrderStatus::PartiallyExecuted
    } else {
        match kind {
            OrderKind::Limit => OrderStatus::New,
            OrderKind::Market => OrderStatus::Cancelled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn maker(price: i64, qty: i64, filled: i64) -> Candidate {
        Candidate {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            price,
            qty,
            filled,
        }
    }

    #[test]
    fn exact_match_executes_both_sides() {
        let resting = vec![maker(50, 10, 0)];

        let outcome = run(OrderKind::Limit, 10, &resting, None);

        assert_eq!(outcome.fills.len(), 1);
        assert_eq!(outcome.fills[0].qty, 10);
        assert_eq!(outcome.fills[0].price, 50);
        assert_eq!(outcome.taker_filled, 10);
        assert_eq!(outcome.taker_status, OrderStatus::Executed);
        assert_eq!(outcome.maker_updates[0].status, OrderStatus::Executed);
        assert_eq!(outcome.maker_updates[0].filled, 10);
    }

    #[test]
    fn partial_fill_leaves_maker_resting() {
        let resting = vec![maker(50, 10, 0)];

        let outcome = run(OrderKind::Limit, 6, &resting, None);

        // Maker set the price, not the taker's limit.
        assert_eq!(outcome.fills[0].price, 50);
        assert_eq!(outcome.fills[0].qty, 6);
        assert_eq!(outcome.taker_status, OrderStatus::Executed);
        assert_eq!(outcome.maker_updates[0].filled, 6);
        assert_eq!(outcome.maker_updates[0].status, OrderStatus::PartiallyExecuted);
    }

    #[test]
    fn unmatched_limit_order_stays_new() {
        let outcome = run(OrderKind::Limit, 5, &[], None);

        assert!(outcome.fills.is_empty());
        assert_eq!(outcome.taker_filled, 0);
        assert_eq!(outcome.taker_status, OrderStatus::New);
    }

    #[test]
    fn market_order_sweeps_levels_in_order() {
        let resting = vec![maker(50, 3, 0), maker(51, 5, 0), maker(52, 10, 0)];

        let outcome = run(OrderKind::Market, 9, &resting, Some(1000));

        let taken: Vec<(i64, i64)> = outcome.fills.iter().map(|f| (f.price, f.qty)).collect();
        assert_eq!(taken, vec![(50, 3), (51, 5), (52, 1)]);
        assert_eq!(outcome.taker_filled, 9);
        assert_eq!(outcome.taker_status, OrderStatus::Executed);

        let total_cost: i64 = outcome.fills.iter().map(|f| f.price * f.qty).sum();
        assert_eq!(total_cost, 457);

        // Third maker keeps 9 of 10 on the book.
        assert_eq!(outcome.maker_updates[2].filled, 1);
        assert_eq!(outcome.maker_updates[2].status, OrderStatus::PartiallyExecuted);
    }

    #[test]
    fn market_order_without_liquidity_is_cancelled() {
        let outcome = run(OrderKind::Market, 1, &[], Some(1000));

        assert!(outcome.fills.is_empty());
        assert_eq!(outcome.taker_status, OrderStatus::Cancelled);
    }

    #[test]
    fn market_order_exhausting_book_is_partially_executed() {
        let resting = vec![maker(40, 4, 0)];

        let outcome = run(OrderKind::Market, 10, &resting, None);

        assert_eq!(outcome.taker_filled, 4);
        assert_eq!(outcome.taker_status, OrderStatus::PartiallyExecuted);
    }

    #[test]
    fn market_buy_stops_at_budget() {
        // Budget buys 3 units at 50 and nothing at 60.
        let resting = vec![maker(50, 3, 0), maker(60, 10, 0)];

        let outcome = run(OrderKind::Market, 10, &resting, Some(199));

        let taken: Vec<(i64, i64)> = outcome.fills.iter().map(|f| (f.price, f.qty)).collect();
        assert_eq!(taken, vec![(50, 3)]);
        assert_eq!(outcome.taker_status, OrderStatus::PartiallyExecuted);

        let spent: i64 = outcome.fills.iter().map(|f| f.price * f.qty).sum();
        assert!(spent <= 199);
    }

    #[test]
    fn market_buy_with_budget_below_best_ask_is_cancelled() {
        let resting = vec![maker(50, 5, 0)];

        let outcome = run(OrderKind::Market, 1, &resting, Some(49));

        assert!(outcome.fills.is_empty());
        assert_eq!(outcome.taker_status, OrderStatus::Cancelled);
    }

    #[test]
    fn budget_caps_take_within_one_level() {
        let resting = vec![maker(50, 10, 0)];

        let outcome = run(OrderKind::Market, 10, &resting, Some(120));

        assert_eq!(outcome.fills[0].qty, 2);
        assert_eq!(outcome.taker_filled, 2);
    }

    #[test]
    fn consumes_candidates_in_given_priority_order() {
        let first = maker(50, 4, 0);
        let second = maker(50, 4, 0);
        let outcome = run(OrderKind::Limit, 6, &[first.clone(), second.clone()], None);

        assert_eq!(outcome.fills[0].maker_order_id, first.id);
        assert_eq!(outcome.fills[0].qty, 4);
        assert_eq!(outcome.fills[1].maker_order_id, second.id);
        assert_eq!(outcome.fills[1].qty, 2);
    }

    #[test]
    fn partially_filled_candidate_offers_only_remainder() {
        let resting = vec![maker(50, 10, 7)];

        let outcome = run(OrderKind::Limit, 10, &resting, None);

        assert_eq!(outcome.fills[0].qty, 3);
        assert_eq!(outcome.taker_filled, 3);
        assert_eq!(outcome.taker_status, OrderStatus::PartiallyExecuted);
        assert_eq!(outcome.maker_updates[0].status, OrderStatus::Executed);
    }

    #[test]
    fn fill_bounds_hold() {
        let resting = vec![maker(50, 3, 0), maker(52, 3, 1), maker(55, 9, 0)];

        let outcome = run(OrderKind::Limit, 7, &resting, None);

        assert!(outcome.taker_filled <= 7);
        for update in &outcome.maker_updates {
            let candidate = resting.iter().find(|c| c.id == update.order_id).unwrap();
            assert!(update.filled <= candidate.qty);
            assert!(update.filled > candidate.filled);
        }
        let filled_via_fills: i64 = outcome.fills.iter().map(|f| f.qty).sum();
        assert_eq!(filled_via_fills, outcome.taker_filled);
    }
}
