// ===============================
// src/book.rs
// ===============================
//
// Market snapshot reader: pure reads over one product's OrderDepth.

use crate::domain::OrderDepth;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TopOfBook {
    pub best_bid: i64,
    pub best_ask: i64,
    pub mid: f64,
}

/// Best bid/ask and mid-price. None when either side is empty.
pub fn top_of_book(depth: &OrderDepth) -> Option<TopOfBook> {
    let best_bid = depth.buy_orders.keys().copied().max()?;
    let best_ask = depth.sell_orders.keys().copied().min()?;
    Some(TopOfBook {
        best_bid,
        best_ask,
        mid: (best_bid + best_ask) as f64 / 2.0,
    })
}

/// Volume-weighted average price over every bid level. None on an empty side.
pub fn bid_vwap(depth: &OrderDepth) -> Option<f64> {
    let vol: i64 = depth.buy_orders.values().sum();
    if vol <= 0 {
        return None;
    }
    let notional: i64 = depth.buy_orders.iter().map(|(p, v)| p * v).sum();
    Some(notional as f64 / vol as f64)
}

/// Ask-side VWAP. Ask volumes are negative; weight by magnitude.
pub fn ask_vwap(depth: &OrderDepth) -> Option<f64> {
    let vol: i64 = depth.sell_orders.values().map(|v| v.abs()).sum();
    if vol <= 0 {
        return None;
    }
    let notional: i64 = depth.sell_orders.iter().map(|(p, v)| p * v.abs()).sum();
    Some(notional as f64 / vol as f64)
}

/// Quoted bid-ask spread. None when either side is empty.
pub fn quoted_spread(depth: &OrderDepth) -> Option<f64> {
    top_of_book(depth).map(|t| (t.best_ask - t.best_bid) as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn depth(bids: &[(i64, i64)], asks: &[(i64, i64)]) -> OrderDepth {
        let mut d = OrderDepth::default();
        for &(p, v) in bids {
            d.buy_orders.insert(p, v);
        }
        for &(p, v) in asks {
            d.sell_orders.insert(p, v);
        }
        d
    }

    #[test]
    fn top_of_book_picks_extremes() {
        let d = depth(&[(99, 5), (98, 10)], &[(101, -5), (102, -8)]);
        let t = top_of_book(&d).unwrap();
        assert_eq!(t.best_bid, 99);
        assert_eq!(t.best_ask, 101);
        assert_eq!(t.mid, 100.0);
    }

    #[test]
    fn top_of_book_none_when_one_sided() {
        assert!(top_of_book(&depth(&[(99, 5)], &[])).is_none());
        assert!(top_of_book(&depth(&[], &[(101, -5)])).is_none());
    }

    #[test]
    fn mid_keeps_half_ticks() {
        let d = depth(&[(99, 5)], &[(102, -5)]);
        assert_eq!(top_of_book(&d).unwrap().mid, 100.5);
    }

    #[test]
    fn vwaps_weight_by_volume() {
        let d = depth(&[(100, 1), (90, 3)], &[(110, -1), (120, -3)]);
        assert!((bid_vwap(&d).unwrap() - 92.5).abs() < 1e-12);
        assert!((ask_vwap(&d).unwrap() - 117.5).abs() < 1e-12);
    }

    #[test]
    fn vwap_none_on_empty_side() {
        let d = depth(&[], &[(110, -1)]);
        assert!(bid_vwap(&d).is_none());
        assert!(ask_vwap(&d).is_some());
    }

    #[test]
    fn spread_from_top() {
        let d = depth(&[(99, 5)], &[(103, -5)]);
        assert_eq!(quoted_spread(&d), Some(4.0));
    }
}
