// ===============================
// src/positions.rs (simulator-side fills, inventory & mark PnL)
// ===============================
//
// The mock exchange fills every emitted order in full at its limit
// price. This task keeps the resulting position table (fed back into the
// next TickRequest) plus a simple cash/mark PnL so a run has a scoreboard.

use ahash::AHashMap as HashMap;
use tracing::warn;

use crate::book;
use crate::domain::{FillReport, Order, OrderDepth};
use crate::metrics::{INV_QTY, PNL_MARK};

#[derive(Default)]
pub struct PositionsTask {
    positions: HashMap<String, i64>,
    cash: HashMap<String, i64>,
    last_mid: HashMap<String, f64>,
    limits: HashMap<String, i64>,
}

impl PositionsTask {
    pub fn new(limits: HashMap<String, i64>) -> Self {
        Self {
            limits,
            ..Default::default()
        }
    }

    /// Position table handed to the engine on the next tick.
    pub fn snapshot(&self) -> HashMap<String, i64> {
        self.positions.clone()
    }

    pub fn on_fill(&mut self, ts: i64, order: &Order) -> FillReport {
        let pos = self.positions.entry(order.symbol.clone()).or_default();
        *pos += order.qty;
        *self.cash.entry(order.symbol.clone()).or_default() -= order.px * order.qty;

        let position = *pos;
        if let Some(limit) = self.limits.get(&order.symbol) {
            if position.abs() > *limit {
                // the engine's clamping should make this unreachable
                warn!(symbol = %order.symbol, position, limit, "position limit breached");
            }
        }
        INV_QTY.with_label_values(&[&order.symbol]).set(position);

        FillReport {
            ts,
            symbol: order.symbol.clone(),
            px: order.px,
            qty: order.qty,
            position,
        }
    }

    /// Refresh mark prices from the tick's books.
    pub fn mark(&mut self, books: &HashMap<String, OrderDepth>) {
        for (symbol, depth) in books.iter() {
            if let Some(top) = book::top_of_book(depth) {
                self.last_mid.insert(symbol.clone(), top.mid);
            }
        }
        PNL_MARK.set(self.mark_value());
    }

    /// Cash plus inventory marked at the last seen mid.
    pub fn mark_value(&self) -> i64 {
        let cash: i64 = self.cash.values().sum();
        let inv: f64 = self
            .positions
            .iter()
            .map(|(s, q)| *q as f64 * self.last_mid.get(s).copied().unwrap_or(0.0))
            .sum();
        cash + inv.round() as i64
    }
}
