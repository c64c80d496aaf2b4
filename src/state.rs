// ===============================
// src/state.rs
// ===============================
//
// Cross-tick persisted state. The simulator keeps nothing in memory
// between ticks; everything a strategy needs tomorrow must survive a
// serialize/restore round trip through the trader_data blob.

use ahash::AHashMap as HashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

use crate::config::StrategyCfg;
use crate::stats;

pub const STATE_VERSION: u32 = 1;

/// Adaptive-buffer parameters for one basket product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BufferParams {
    pub buffer_multiplier: f64,
    pub min_buffer: f64,
    pub max_buffer: f64,
    pub current_buffer: f64,
}

impl BufferParams {
    /// Median-based refresh. Holds the prior value until at least five
    /// spread observations are in.
    pub fn refresh(&mut self, spread_history: &[f64]) {
        if spread_history.len() < 5 {
            return;
        }
        let med = stats::median(spread_history);
        self.current_buffer = (med * self.buffer_multiplier).clamp(self.min_buffer, self.max_buffer);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraderState {
    pub version: u32,
    /// Short mid-price history per simple/track-only product (window 5).
    pub price_history: HashMap<String, Vec<f64>>,
    /// Long mid-price window per z-score product (window 100).
    pub rolling_window: HashMap<String, Vec<f64>>,
    /// Quoted-spread history per basket product (window 20).
    pub spread_history: HashMap<String, Vec<f64>>,
    pub buffer_params: HashMap<String, BufferParams>,
    /// Informational only; never read back by any strategy.
    pub last_timestamp: i64,
}

/// Mirror of TraderState with every field optional, so a blob written by
/// an older run merges field-by-field instead of replacing the defaults.
#[derive(Debug, Default, Deserialize)]
struct PartialState {
    #[allow(dead_code)]
    version: Option<u32>,
    price_history: Option<HashMap<String, Vec<f64>>>,
    rolling_window: Option<HashMap<String, Vec<f64>>>,
    spread_history: Option<HashMap<String, Vec<f64>>>,
    buffer_params: Option<HashMap<String, BufferParams>>,
    last_timestamp: Option<i64>,
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("empty trader blob")]
    Empty,
    #[error("malformed trader blob: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl TraderState {
    /// Default state for the configured product table: empty histories,
    /// spread series and buffer seeds pre-created for each basket product.
    pub fn initial(cfg: &StrategyCfg) -> Self {
        let mut spread_history = HashMap::new();
        let mut buffer_params = HashMap::new();
        for (symbol, p) in cfg.products.iter() {
            if let Some(seed) = &p.buffer_seed {
                spread_history.insert(symbol.clone(), Vec::new());
                buffer_params.insert(symbol.clone(), seed.clone());
            }
        }
        Self {
            version: STATE_VERSION,
            price_history: HashMap::new(),
            rolling_window: HashMap::new(),
            spread_history,
            buffer_params,
            last_timestamp: 0,
        }
    }

    /// Merge a previous tick's blob into `self`. Keyed mappings merge
    /// key-by-key (defaults survive for products the blob never saw);
    /// scalar fields are replaced when present. The call-site policy is
    /// that every Err means "keep the defaults" -- a decode failure is
    /// never fatal to a tick.
    pub fn merge_blob(&mut self, blob: &str) -> Result<(), DecodeError> {
        if blob.is_empty() {
            return Err(DecodeError::Empty);
        }
        let partial: PartialState = serde_json::from_str(blob)?;
        if let Some(m) = partial.price_history {
            self.price_history.extend(m);
        }
        if let Some(m) = partial.rolling_window {
            self.rolling_window.extend(m);
        }
        if let Some(m) = partial.spread_history {
            self.spread_history.extend(m);
        }
        if let Some(m) = partial.buffer_params {
            self.buffer_params.extend(m);
        }
        if let Some(ts) = partial.last_timestamp {
            self.last_timestamp = ts;
        }
        Ok(())
    }

    /// Loss-free encoding of the full state for the next tick.
    pub fn to_blob(&self) -> String {
        match serde_json::to_string(self) {
            Ok(s) => s,
            Err(e) => {
                error!(?e, "trader state serialize failed");
                String::new()
            }
        }
    }
}
