// ===============================
// src/strategy.rs
// ===============================
//
// Four strategy variants, all pure functions of (config, book snapshot,
// position, state):
// 1) Mean-Reversion          -> run_mean_reversion
// 2) Z-Score Reversion       -> run_zscore_reversion
// 3) Basket Arbitrage signal -> run_basket_arb (signal only, no orders)
// 4) Intrinsic-Value Short   -> run_intrinsic_short
//
// Emitted volumes are clamped against the position limit before an order
// is built, so no order sequence can push |position| past the limit.

use ahash::AHashMap as HashMap;
use tracing::debug;

use crate::book;
use crate::config::{ProductCfg, VoucherCfg, ZScoreCfg};
use crate::domain::{Order, OrderDepth};
use crate::state::BufferParams;
use crate::stats;

// -----------------------------------------------------------------------------
// Order generator: marketable-limit sweep against a fair value.
// Buys every ask level strictly below fair (ascending), then sells every
// bid level strictly above fair (descending), one order per consumed
// level at that level's exact price.
// -----------------------------------------------------------------------------
pub fn sweep_book(
    symbol: &str,
    depth: &OrderDepth,
    fair: f64,
    position: i64,
    limit: i64,
) -> Vec<Order> {
    let mut orders = Vec::new();
    let mut pos = position;

    let mut asks: Vec<(i64, i64)> = depth.sell_orders.iter().map(|(p, v)| (*p, *v)).collect();
    asks.sort_by_key(|&(p, _)| p);
    for (px, vol) in asks {
        if (px as f64) < fair && pos < limit {
            let take = vol.abs().min(limit - pos);
            if take > 0 {
                orders.push(Order {
                    symbol: symbol.to_string(),
                    px,
                    qty: take,
                });
                pos += take;
            }
        }
    }

    let mut bids: Vec<(i64, i64)> = depth.buy_orders.iter().map(|(p, v)| (*p, *v)).collect();
    bids.sort_by_key(|&(p, _)| std::cmp::Reverse(p));
    for (px, vol) in bids {
        if (px as f64) > fair && pos > -limit {
            let give = vol.min(pos + limit);
            if give > 0 {
                orders.push(Order {
                    symbol: symbol.to_string(),
                    px,
                    qty: -give,
                });
                pos -= give;
            }
        }
    }

    orders
}

// -----------------------------------------------------------------------------
// Fair value, simple products: bounded moving average of the mid-price.
// A one-sided book falls back to the configured static fair price and the
// history is left untouched for that tick; without a configured fallback
// there is no fair value at all.
// -----------------------------------------------------------------------------
pub fn fair_value_simple(
    symbol: &str,
    depth: &OrderDepth,
    pcfg: &ProductCfg,
    ma_window: usize,
    price_history: &mut HashMap<String, Vec<f64>>,
) -> Option<f64> {
    match book::top_of_book(depth) {
        Some(top) => {
            let series = price_history.entry(symbol.to_string()).or_default();
            stats::push_bounded(series, top.mid, ma_window);
            Some(stats::mean(series))
        }
        None => pcfg.fallback_fair.map(|f| f as f64),
    }
}

pub fn run_mean_reversion(
    symbol: &str,
    depth: &OrderDepth,
    position: i64,
    pcfg: &ProductCfg,
    ma_window: usize,
    price_history: &mut HashMap<String, Vec<f64>>,
) -> Vec<Order> {
    let Some(fair) = fair_value_simple(symbol, depth, pcfg, ma_window, price_history) else {
        return Vec::new();
    };
    sweep_book(symbol, depth, fair, position, pcfg.position_limit)
}

// -----------------------------------------------------------------------------
// Z-score reversion: single order at the best level once the standardized
// deviation crosses the entry threshold. Nothing happens on a one-sided
// book or before the rolling window is full.
// -----------------------------------------------------------------------------
pub fn run_zscore_reversion(
    symbol: &str,
    depth: &OrderDepth,
    position: i64,
    pcfg: &ProductCfg,
    zcfg: &ZScoreCfg,
    rolling_window: &mut HashMap<String, Vec<f64>>,
) -> Vec<Order> {
    let Some(top) = book::top_of_book(depth) else {
        return Vec::new();
    };
    let series = rolling_window.entry(symbol.to_string()).or_default();
    stats::push_bounded(series, top.mid, zcfg.window);
    let score = stats::z_score(series, zcfg.window, top.mid);

    let limit = pcfg.position_limit;
    if score > zcfg.entry_threshold {
        // overbought -> sell into the best bid
        let qty = zcfg.max_trade_size.min(limit + position);
        if qty > 0 {
            return vec![Order {
                symbol: symbol.to_string(),
                px: top.best_bid,
                qty: -qty,
            }];
        }
    } else if score < -zcfg.entry_threshold {
        // oversold -> buy from the best ask
        let qty = zcfg.max_trade_size.min(limit - position);
        if qty > 0 {
            return vec![Order {
                symbol: symbol.to_string(),
                px: top.best_ask,
                qty,
            }];
        }
    }
    Vec::new()
}

// -----------------------------------------------------------------------------
// Basket valuation: component fair = (bid VWAP + ask VWAP) / 2, basket
// fair = sum of per-unit quantities times component fairs. Requires full
// two-sided depth on every leg; no partial fallback.
// -----------------------------------------------------------------------------
pub fn basket_fair_value(
    components: &[(String, i64)],
    depths: &HashMap<String, OrderDepth>,
) -> Option<f64> {
    let mut total = 0.0;
    for (comp, qty) in components {
        let depth = depths.get(comp)?;
        let bid = book::bid_vwap(depth)?;
        let ask = book::ask_vwap(depth)?;
        total += *qty as f64 * (bid + ask) / 2.0;
    }
    Some(total)
}

/// Basket arbitrage tracking. The valuation and the adaptive buffer are
/// computed and persisted every tick, but no order consumer is wired to
/// them yet, so this variant always returns an empty list. When the
/// valuation is unavailable (a leg is one-sided) the histories are left
/// untouched.
#[allow(clippy::too_many_arguments)]
pub fn run_basket_arb(
    symbol: &str,
    depth: &OrderDepth,
    depths: &HashMap<String, OrderDepth>,
    pcfg: &ProductCfg,
    spread_window: usize,
    spread_history: &mut HashMap<String, Vec<f64>>,
    buffer_params: &mut HashMap<String, BufferParams>,
) -> Vec<Order> {
    let Some(top) = book::top_of_book(depth) else {
        return Vec::new();
    };
    let Some(fair) = basket_fair_value(&pcfg.components, depths) else {
        return Vec::new();
    };

    let Some(spread) = book::quoted_spread(depth) else {
        return Vec::new();
    };
    let series = spread_history.entry(symbol.to_string()).or_default();
    stats::push_bounded(series, spread, spread_window);
    let buffer = match buffer_params.get_mut(symbol) {
        Some(params) => {
            params.refresh(series);
            params.current_buffer
        }
        None => 0.0,
    };
    debug!(symbol, fair, mid = top.mid, buffer, "basket signal");
    Vec::new()
}

// -----------------------------------------------------------------------------
// Intrinsic-value short: sell in-the-money vouchers at a discount to
// intrinsic. Pure-short mandate, fixed clip, capacity = max_short + pos.
// -----------------------------------------------------------------------------
pub fn run_intrinsic_short(
    symbol: &str,
    position: i64,
    pcfg: &ProductCfg,
    vcfg: &VoucherCfg,
    depths: &HashMap<String, OrderDepth>,
) -> Vec<Order> {
    let Some(strike) = pcfg.strike else {
        return Vec::new();
    };
    let underlying_fair = depths
        .get(&vcfg.underlying)
        .and_then(book::top_of_book)
        .map(|t| t.mid)
        .unwrap_or(vcfg.fallback_underlying as f64);

    if underlying_fair <= strike as f64 {
        return Vec::new();
    }
    // position is expected <= 0 under the short mandate
    let capacity = pcfg.position_limit + position;
    if capacity <= 0 {
        return Vec::new();
    }
    let qty = vcfg.clip.min(capacity);
    let px = ((underlying_fair - strike as f64) * vcfg.discount).floor() as i64;
    vec![Order {
        symbol: symbol.to_string(),
        px,
        qty: -qty,
    }]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StrategyCfg;

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
    fn sweep_emits_nothing_when_book_straddles_fair() {
        // ask 101 is not strictly below 100, bid 99 not strictly above
        let d = depth(&[(99, 5)], &[(101, -5)]);
        assert!(sweep_book("A", &d, 100.0, 0, 50).is_empty());
    }

    #[test]
    fn sweep_buys_cheap_ask_at_level_price() {
        let d = depth(&[(99, 5)], &[(100, -5)]);
        let orders = sweep_book("A", &d, 100.5, 0, 50);
        assert_eq!(
            orders,
            vec![Order {
                symbol: "A".into(),
                px: 100,
                qty: 5
            }]
        );
    }

    #[test]
    fn sweep_clamps_buy_volume_to_remaining_capacity() {
        let d = depth(&[], &[(100, -80)]);
        let orders = sweep_book("A", &d, 101.0, 10, 50);
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].qty, 40);
    }

    #[test]
    fn sweep_walks_levels_in_price_order_and_stops_at_limit() {
        let d = depth(&[], &[(100, -30), (101, -30), (102, -30)]);
        let orders = sweep_book("A", &d, 103.0, 0, 50);
        assert_eq!(orders.len(), 2);
        assert_eq!((orders[0].px, orders[0].qty), (100, 30));
        assert_eq!((orders[1].px, orders[1].qty), (101, 20));
    }

    #[test]
    fn sweep_sells_rich_bids_descending_down_to_short_limit() {
        let d = depth(&[(105, 30), (104, 30)], &[]);
        let orders = sweep_book("A", &d, 100.0, 0, 50);
        assert_eq!(orders.len(), 2);
        assert_eq!((orders[0].px, orders[0].qty), (105, -30));
        assert_eq!((orders[1].px, orders[1].qty), (104, -20));
    }

    #[test]
    fn sweep_buy_then_sell_shares_the_running_position() {
        // buy 5 below fair first, then the bid side can unload pos + limit
        let d = depth(&[(103, 60)], &[(100, -5)]);
        let orders = sweep_book("A", &d, 101.5, 0, 50);
        assert_eq!(orders.len(), 2);
        assert_eq!((orders[0].px, orders[0].qty), (100, 5));
        assert_eq!((orders[1].px, orders[1].qty), (103, -55));
    }

    #[test]
    fn simple_fair_is_moving_average_seeded_with_current_mid() {
        let cfg = StrategyCfg::builtin();
        let pcfg = &cfg.products["KELP"];
        let mut hist = HashMap::new();
        let d = depth(&[(99, 5)], &[(101, -5)]);
        let fair = fair_value_simple("KELP", &d, pcfg, 5, &mut hist);
        assert_eq!(fair, Some(100.0));
        assert_eq!(hist["KELP"], vec![100.0]);
        // second tick averages both mids
        let d2 = depth(&[(103, 5)], &[(105, -5)]);
        let fair2 = fair_value_simple("KELP", &d2, pcfg, 5, &mut hist);
        assert_eq!(fair2, Some(102.0));
    }

    #[test]
    fn simple_fair_falls_back_on_one_sided_book_without_history_update() {
        let cfg = StrategyCfg::builtin();
        let pcfg = &cfg.products["RAINFOREST_RESIN"];
        let mut hist = HashMap::new();
        let d = depth(&[(10_002, 5)], &[]);
        let fair = fair_value_simple("RAINFOREST_RESIN", &d, pcfg, 5, &mut hist);
        assert_eq!(fair, Some(10_000.0));
        assert!(hist.is_empty());
    }

    #[test]
    fn simple_product_without_fallback_sits_out_one_sided_ticks() {
        // mis-configured fallback must not degrade to a fair value of 0
        let pcfg = ProductCfg {
            fallback_fair: None,
            ..StrategyCfg::builtin().products["KELP"].clone()
        };
        let mut hist = HashMap::new();
        let d = depth(&[(2_002, 5)], &[]);
        assert_eq!(fair_value_simple("KELP", &d, &pcfg, 5, &mut hist), None);
        let orders = run_mean_reversion("KELP", &d, 0, &pcfg, 5, &mut hist);
        assert!(orders.is_empty());
        assert!(hist.is_empty());
    }

    #[test]
    fn mean_reversion_sells_rich_bid_against_fallback_fair() {
        let cfg = StrategyCfg::builtin();
        let pcfg = &cfg.products["RAINFOREST_RESIN"];
        let mut hist = HashMap::new();
        let d = depth(&[(10_002, 5)], &[]);
        let orders = run_mean_reversion("RAINFOREST_RESIN", &d, 0, pcfg, 5, &mut hist);
        assert_eq!(
            orders,
            vec![Order {
                symbol: "RAINFOREST_RESIN".into(),
                px: 10_002,
                qty: -5
            }]
        );
    }

    fn zcfg(window: usize) -> ZScoreCfg {
        ZScoreCfg {
            window,
            entry_threshold: 1.5,
            max_trade_size: 10,
        }
    }

    #[test]
    fn zscore_stays_flat_until_window_full() {
        let cfg = StrategyCfg::builtin();
        let pcfg = &cfg.products["CROISSANTS"];
        let mut win = HashMap::new();
        let d = depth(&[(4_399, 5)], &[(4_401, -5)]);
        let orders = run_zscore_reversion("CROISSANTS", &d, 0, pcfg, &zcfg(10), &mut win);
        assert!(orders.is_empty());
        assert_eq!(win["CROISSANTS"].len(), 1);
    }

    #[test]
    fn zscore_outlier_sells_one_clip_at_best_bid() {
        let cfg = StrategyCfg::builtin();
        let pcfg = &cfg.products["CROISSANTS"];
        let mut win = HashMap::new();
        win.insert("CROISSANTS".to_string(), vec![4_300.0; 10]);
        // outlier mid 4330, well past 1.5 sigma of the refreshed window
        let d = depth(&[(4_329, 20)], &[(4_331, -20)]);
        let orders = run_zscore_reversion("CROISSANTS", &d, 0, pcfg, &zcfg(10), &mut win);
        assert_eq!(
            orders,
            vec![Order {
                symbol: "CROISSANTS".into(),
                px: 4_329,
                qty: -10
            }]
        );
        assert_eq!(win["CROISSANTS"].len(), 10);
    }

    #[test]
    fn zscore_dip_buys_at_best_ask_clamped_by_capacity() {
        let cfg = StrategyCfg::builtin();
        let pcfg = &cfg.products["CROISSANTS"];
        let mut win = HashMap::new();
        win.insert("CROISSANTS".to_string(), vec![4_300.0; 10]);
        let d = depth(&[(4_269, 20)], &[(4_271, -20)]);
        // only 4 units of long capacity left
        let orders = run_zscore_reversion("CROISSANTS", &d, 246, pcfg, &zcfg(10), &mut win);
        assert_eq!(
            orders,
            vec![Order {
                symbol: "CROISSANTS".into(),
                px: 4_271,
                qty: 4
            }]
        );
    }

    #[test]
    fn zscore_emits_nothing_without_capacity() {
        let cfg = StrategyCfg::builtin();
        let pcfg = &cfg.products["CROISSANTS"];
        let mut win = HashMap::new();
        win.insert("CROISSANTS".to_string(), vec![4_300.0; 10]);
        let d = depth(&[(4_329, 20)], &[(4_331, -20)]);
        // already at -250: no short capacity for the sell signal
        let orders = run_zscore_reversion("CROISSANTS", &d, -250, pcfg, &zcfg(10), &mut win);
        assert!(orders.is_empty());
    }

    #[test]
    fn basket_fair_sums_vwap_mids_of_all_legs() {
        let mut depths = HashMap::new();
        depths.insert("X".to_string(), depth(&[(10, 4)], &[(12, -4)]));
        depths.insert("Y".to_string(), depth(&[(20, 1), (18, 1)], &[(22, -2)]));
        let comps = vec![("X".to_string(), 2), ("Y".to_string(), 1)];
        let fair = basket_fair_value(&comps, &depths).unwrap();
        // X: (10 + 12)/2 = 11; Y: (19 + 22)/2 = 20.5; 2*11 + 20.5 = 42.5
        assert!((fair - 42.5).abs() < 1e-12);
    }

    #[test]
    fn basket_fair_unavailable_when_any_leg_one_sided() {
        let mut depths = HashMap::new();
        depths.insert("X".to_string(), depth(&[(10, 4)], &[(12, -4)]));
        depths.insert("Y".to_string(), depth(&[(20, 1)], &[]));
        let comps = vec![("X".to_string(), 2), ("Y".to_string(), 1)];
        assert!(basket_fair_value(&comps, &depths).is_none());
    }

    #[test]
    fn basket_arb_updates_spread_history_only_when_valuation_succeeds() {
        let cfg = StrategyCfg::builtin();
        let pcfg = &cfg.products["PICNIC_BASKET2"];
        let mut spread_history: HashMap<String, Vec<f64>> = HashMap::new();
        let mut buffer_params = HashMap::new();
        buffer_params.insert(
            "PICNIC_BASKET2".to_string(),
            pcfg.buffer_seed.clone().unwrap(),
        );

        let own = depth(&[(30_000, 3)], &[(30_006, -3)]);
        let mut depths = HashMap::new();
        depths.insert("PICNIC_BASKET2".to_string(), own.clone());
        depths.insert("CROISSANTS".to_string(), depth(&[(4_299, 5)], &[(4_301, -5)]));
        // JAMS leg missing: valuation unavailable, nothing recorded
        let orders = run_basket_arb(
            "PICNIC_BASKET2",
            &own,
            &depths,
            pcfg,
            20,
            &mut spread_history,
            &mut buffer_params,
        );
        assert!(orders.is_empty());
        assert!(spread_history.is_empty());

        depths.insert("JAMS".to_string(), depth(&[(6_499, 5)], &[(6_501, -5)]));
        let orders = run_basket_arb(
            "PICNIC_BASKET2",
            &own,
            &depths,
            pcfg,
            20,
            &mut spread_history,
            &mut buffer_params,
        );
        assert!(orders.is_empty());
        assert_eq!(spread_history["PICNIC_BASKET2"], vec![6.0]);
    }

    fn vcfg() -> VoucherCfg {
        VoucherCfg {
            underlying: "VOLCANIC_ROCK".into(),
            clip: 10,
            discount: 0.95,
            fallback_underlying: 10_500,
        }
    }

    #[test]
    fn intrinsic_short_sells_itm_voucher_at_discounted_intrinsic() {
        let cfg = StrategyCfg::builtin();
        let pcfg = &cfg.products["VOLCANIC_ROCK_VOUCHER_10500"];
        let mut depths = HashMap::new();
        depths.insert(
            "VOLCANIC_ROCK".to_string(),
            depth(&[(10_599, 5)], &[(10_601, -5)]),
        );
        let orders =
            run_intrinsic_short("VOLCANIC_ROCK_VOUCHER_10500", 0, pcfg, &vcfg(), &depths);
        // intrinsic 100, floor(100 * 0.95) = 95, clip 10
        assert_eq!(
            orders,
            vec![Order {
                symbol: "VOLCANIC_ROCK_VOUCHER_10500".into(),
                px: 95,
                qty: -10
            }]
        );
    }

    #[test]
    fn intrinsic_short_skips_out_of_the_money() {
        let cfg = StrategyCfg::builtin();
        let pcfg = &cfg.products["VOLCANIC_ROCK_VOUCHER_10500"];
        let mut depths = HashMap::new();
        depths.insert(
            "VOLCANIC_ROCK".to_string(),
            depth(&[(10_399, 5)], &[(10_401, -5)]),
        );
        let orders =
            run_intrinsic_short("VOLCANIC_ROCK_VOUCHER_10500", 0, pcfg, &vcfg(), &depths);
        assert!(orders.is_empty());
    }

    #[test]
    fn intrinsic_short_respects_exhausted_short_capacity() {
        let cfg = StrategyCfg::builtin();
        let pcfg = &cfg.products["VOLCANIC_ROCK_VOUCHER_10500"];
        let mut depths = HashMap::new();
        depths.insert(
            "VOLCANIC_ROCK".to_string(),
            depth(&[(10_599, 5)], &[(10_601, -5)]),
        );
        let orders =
            run_intrinsic_short("VOLCANIC_ROCK_VOUCHER_10500", -200, pcfg, &vcfg(), &depths);
        assert!(orders.is_empty());
        // last 3 units of capacity -> partial clip
        let orders =
            run_intrinsic_short("VOLCANIC_ROCK_VOUCHER_10500", -197, pcfg, &vcfg(), &depths);
        assert_eq!(orders[0].qty, -3);
    }

    #[test]
    fn intrinsic_short_uses_fallback_underlying_when_book_missing() {
        let cfg = StrategyCfg::builtin();
        let pcfg = &cfg.products["VOLCANIC_ROCK_VOUCHER_10250"];
        let depths = HashMap::new();
        let orders =
            run_intrinsic_short("VOLCANIC_ROCK_VOUCHER_10250", 0, pcfg, &vcfg(), &depths);
        // fallback 10500 vs strike 10250: intrinsic 250, floor(250 * 0.95) = 237
        assert_eq!(orders[0].px, 237);
        assert_eq!(orders[0].qty, -10);
    }
}
