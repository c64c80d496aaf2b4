// ===============================
// src/router.rs (per-product strategy dispatch)
// ===============================
use ahash::AHashMap as HashMap;
use tracing::debug;

use crate::config::{StrategyCfg, StrategyKind};
use crate::domain::{Order, TickRequest};
use crate::metrics::ORDERS_BY;
use crate::state::TraderState;
use crate::strategy;

/// Dispatch every product in the snapshot to its configured strategy and
/// aggregate the per-product order lists. Symbols are visited in
/// lexicographic order so a tick's output is deterministic. Unconfigured
/// products are skipped entirely: no orders, no state mutation, no output
/// entry. Tracked-but-untraded products appear with an empty list.
pub fn route_tick(
    cfg: &StrategyCfg,
    req: &TickRequest,
    state: &mut TraderState,
) -> HashMap<String, Vec<Order>> {
    let mut out = HashMap::new();

    let mut symbols: Vec<&String> = req.order_depths.keys().collect();
    symbols.sort();

    for symbol in symbols {
        let Some(pcfg) = cfg.products.get(symbol) else {
            debug!(%symbol, "no strategy configured, skipping");
            continue;
        };
        let depth = &req.order_depths[symbol];
        let position = req.positions.get(symbol).copied().unwrap_or(0);

        let orders = match pcfg.kind {
            StrategyKind::MeanReversion => strategy::run_mean_reversion(
                symbol,
                depth,
                position,
                pcfg,
                cfg.ma_window,
                &mut state.price_history,
            ),
            StrategyKind::TrackOnly => {
                // history update only, never traded
                let _ = strategy::fair_value_simple(
                    symbol,
                    depth,
                    pcfg,
                    cfg.ma_window,
                    &mut state.price_history,
                );
                Vec::new()
            }
            StrategyKind::ZScoreReversion => strategy::run_zscore_reversion(
                symbol,
                depth,
                position,
                pcfg,
                &cfg.zscore,
                &mut state.rolling_window,
            ),
            StrategyKind::BasketArb => strategy::run_basket_arb(
                symbol,
                depth,
                &req.order_depths,
                pcfg,
                cfg.spread_window,
                &mut state.spread_history,
                &mut state.buffer_params,
            ),
            StrategyKind::IntrinsicShort => strategy::run_intrinsic_short(
                symbol,
                position,
                pcfg,
                &cfg.voucher,
                &req.order_depths,
            ),
        };

        if !orders.is_empty() {
            ORDERS_BY
                .with_label_values(&[pcfg.kind.label(), symbol.as_str()])
                .inc_by(orders.len() as u64);
        }
        out.insert(symbol.clone(), orders);
    }

    out
}
