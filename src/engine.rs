// ===============================
// src/engine.rs
// ===============================
//
// Per-tick entry point. The simulator calls on_tick exactly once per
// tick and waits for the result; the blob in the response is the only
// thing that crosses the tick boundary.

use tracing::debug;

use crate::config::StrategyCfg;
use crate::domain::{TickRequest, TickResponse};
use crate::router;
use crate::state::TraderState;

pub struct Engine {
    cfg: StrategyCfg,
}

impl Engine {
    pub fn new(cfg: StrategyCfg) -> Self {
        Self { cfg }
    }

    /// Restore state from the request blob, run every configured strategy,
    /// serialize the mutated state back out. Never fails: a bad blob falls
    /// back to the defaults, bad market data degrades to empty order lists.
    pub fn on_tick(&self, req: &TickRequest) -> TickResponse {
        let mut state = TraderState::initial(&self.cfg);
        if let Err(e) = state.merge_blob(&req.trader_data) {
            debug!(%e, timestamp = req.timestamp, "trader blob unusable, starting from defaults");
        }

        let orders = router::route_tick(&self.cfg, req, &mut state);
        state.last_timestamp = req.timestamp;

        TickResponse {
            orders,
            conversions: 0,
            trader_data: state.to_blob(),
        }
    }
}
