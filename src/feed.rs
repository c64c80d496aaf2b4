// ===============================
// src/feed.rs
// ===============================
//
// Mock market data for the exchange simulator: a seeded random walk per
// symbol, rendered as a small multi-level book each tick. Occasionally
// drops one side of a book so the engine's fallback paths get exercised.

use ahash::AHashMap as HashMap;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::domain::OrderDepth;
use crate::metrics::TICKS;

pub struct MockFeed {
    rng: StdRng,
    mids: Vec<(String, i64)>,
}

impl MockFeed {
    pub fn new(seed: u64, start_mids: &[(&str, i64)]) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            mids: start_mids
                .iter()
                .map(|(s, m)| (s.to_string(), *m))
                .collect(),
        }
    }

    /// One snapshot for every symbol, advancing each random walk a step.
    pub fn next_books(&mut self) -> HashMap<String, OrderDepth> {
        let mut books = HashMap::new();
        for (symbol, mid) in self.mids.iter_mut() {
            let step = self.rng.gen_range(-3..=3);
            *mid = (*mid + step).max(50);

            let mut depth = OrderDepth::default();
            let half_spread = self.rng.gen_range(1..=2);
            let levels = self.rng.gen_range(1..=3);
            let drop_side = self.rng.gen_range(0..100); // <2 bids, <4 asks

            if drop_side >= 2 {
                for i in 0..levels {
                    let vol = self.rng.gen_range(5..=30);
                    depth.buy_orders.insert(*mid - half_spread - i, vol);
                }
            }
            if !(2..4).contains(&drop_side) {
                for i in 0..levels {
                    let vol = self.rng.gen_range(5..=30);
                    depth.sell_orders.insert(*mid + half_spread + i, -vol);
                }
            }

            books.insert(symbol.clone(), depth);
        }
        TICKS.inc();
        books
    }
}
