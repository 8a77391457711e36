//! Level-2 order book projection.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Aggregate quantity resting at one price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    pub price: i64,
    pub qty: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct L2OrderBook {
    pub bid_levels: Vec<Level>,
    pub ask_levels: Vec<Level>,
}

/// Collapse resting `(price, remaining)` rows into at most `limit` levels.
/// Bids are reported best (highest) first, asks best (lowest) first; rows
/// with nothing left to trade are dropped.
pub fn aggregate(
    rows: impl IntoIterator<Item = (i64, i64)>,
    descending: bool,
    limit: usize,
) -> Vec<Level> {
    let mut levels: BTreeMap<i64, i64> = BTreeMap::new();
    for (price, remaining) in rows {
        if remaining <= 0 {
            continue;
        }
        *levels.entry(price).or_insert(0) += remaining;
    }

    let to_level = |(price, qty): (i64, i64)| Level { price, qty };
    if descending {
        levels.into_iter().rev().take(limit).map(to_level).collect()
    } else {
        levels.into_iter().take(limit).map(to_level).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sums_remainders_per_price() {
        let rows = vec![(50, 4), (50, 6), (51, 1)];
        let levels = aggregate(rows, false, 25);

        assert_eq!(
            levels,
            vec![Level { price: 50, qty: 10 }, Level { price: 51, qty: 1 }]
        );
    }

    #[test]
    fn bids_come_highest_first() {
        let rows = vec![(48, 1), (50, 2), (49, 3)];
        let levels = aggregate(rows, true, 25);

        let prices: Vec<i64> = levels.iter().map(|l| l.price).collect();
        assert_eq!(prices, vec![50, 49, 48]);
    }

    #[test]
    fn zero_remainders_are_omitted() {
        let rows = vec![(50, 0), (51, 2), (52, -1)];
        let levels = aggregate(rows, false, 25);

        assert_eq!(levels, vec![Level { price: 51, qty: 2 }]);
    }

    #[test]
    fn depth_is_truncated_after_aggregation() {
        let rows = vec![(50, 1), (51, 1), (52, 1), (50, 1)];
        let levels = aggregate(rows, false, 2);

        assert_eq!(
            levels,
            vec![Level { price: 50, qty: 2 }, Level { price: 51, qty: 1 }]
        );
    }

    #[test]
    fn total_book_qty_matches_rows() {
        let rows = vec![(50, 4), (51, 5), (50, 2), (52, 0)];
        let total_rows: i64 = rows.iter().map(|(_, q)| q).sum();
        let levels = aggregate(rows, false, 25);
        let total_levels: i64 = levels.iter().map(|l| l.qty).sum();

        assert_eq!(total_levels, total_rows);
    }
}
