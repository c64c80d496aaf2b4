// ===============================
// src/domain.rs
// ===============================
use ahash::AHashMap as HashMap;
use serde::{Deserialize, Serialize};

/// One side of a book maps price -> resting volume. Bid volumes are
/// positive; ask volumes arrive with the exchange's negative-magnitude
/// convention. Neither mapping is ordered; ordering is imposed at read
/// time (best bid = max key, best ask = min key).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderDepth {
    pub buy_orders: HashMap<i64, i64>,
    pub sell_orders: HashMap<i64, i64>,
}

/// Limit order emitted by the engine. qty > 0 buys, qty < 0 sells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub symbol: String,
    pub px: i64,
    pub qty: i64,
}

/// Per-tick input handed over by the exchange simulator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TickRequest {
    pub timestamp: i64,
    pub order_depths: HashMap<String, OrderDepth>,
    pub positions: HashMap<String, i64>,
    /// Opaque blob serialized by the previous tick; empty on the first one.
    pub trader_data: String,
}

/// Per-tick result returned to the simulator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TickResponse {
    pub orders: HashMap<String, Vec<Order>>,
    /// Reserved by the exchange protocol for conversion requests; always 0.
    pub conversions: i32,
    pub trader_data: String,
}

/// Top-of-book summary, recorded per symbol per tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MdTick {
    pub ts: i64,
    pub symbol: String,
    pub best_bid: i64,
    pub best_ask: i64,
}

/// Simulator fill report (mock exchange fills at the order's limit price).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FillReport {
    pub ts: i64,
    pub symbol: String,
    pub px: i64,
    pub qty: i64,
    pub position: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    Md(MdTick),
    Ord(Order),
    Fill(FillReport),
    Note(String),
}
