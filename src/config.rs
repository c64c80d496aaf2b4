// ===============================
// src/config.rs
// ===============================
/*
=============================================================================
Project : tick_bot_rust — per-tick decision engine for a simulated
          multi-product exchange
Module  : config.rs

Summary : Static strategy table (product -> strategy kind, position limit,
          basket recipes, voucher strikes) resolved once at load, plus
          runtime args (tick count, rng seed, metrics port, record file)
          read from the environment.
=============================================================================
*/
use ahash::AHashMap as HashMap;
use dotenvy::dotenv;
use std::env;

use crate::state::BufferParams;

/// Closed set of strategy kinds; each configured product carries exactly
/// one tag, resolved at load time and never re-derived from the symbol
/// text during a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrategyKind {
    MeanReversion,
    ZScoreReversion,
    BasketArb,
    IntrinsicShort,
    TrackOnly,
}

impl StrategyKind {
    pub fn label(&self) -> &'static str {
        match self {
            StrategyKind::MeanReversion => "mean_reversion",
            StrategyKind::ZScoreReversion => "zscore_reversion",
            StrategyKind::BasketArb => "basket_arb",
            StrategyKind::IntrinsicShort => "intrinsic_short",
            StrategyKind::TrackOnly => "track_only",
        }
    }
}

#[derive(Clone, Debug)]
pub struct ProductCfg {
    pub kind: StrategyKind,
    pub position_limit: i64,
    /// Static fair price used when the product's own book is one-sided.
    pub fallback_fair: Option<i64>,
    /// Basket recipe: component symbol -> units per basket.
    pub components: Vec<(String, i64)>,
    /// Adaptive-buffer seed for basket products.
    pub buffer_seed: Option<BufferParams>,
    /// Voucher strike, parsed once from the identifier at load.
    pub strike: Option<i64>,
}

impl ProductCfg {
    fn simple(kind: StrategyKind, position_limit: i64, fallback_fair: i64) -> Self {
        Self {
            kind,
            position_limit,
            fallback_fair: Some(fallback_fair),
            components: Vec::new(),
            buffer_seed: None,
            strike: None,
        }
    }

    fn basket(position_limit: i64, components: Vec<(String, i64)>, seed: BufferParams) -> Self {
        Self {
            kind: StrategyKind::BasketArb,
            position_limit,
            fallback_fair: None,
            components,
            buffer_seed: Some(seed),
            strike: None,
        }
    }

    fn voucher(max_short: i64, strike: i64) -> Self {
        Self {
            kind: StrategyKind::IntrinsicShort,
            position_limit: max_short,
            fallback_fair: None,
            components: Vec::new(),
            buffer_seed: None,
            strike: Some(strike),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ZScoreCfg {
    pub window: usize,
    pub entry_threshold: f64,
    pub max_trade_size: i64,
}

#[derive(Clone, Debug)]
pub struct VoucherCfg {
    pub underlying: String,
    pub clip: i64,
    pub discount: f64,
    /// Underlying fair price when its book is one-sided or absent.
    pub fallback_underlying: i64,
}

#[derive(Clone, Debug)]
pub struct StrategyCfg {
    pub products: HashMap<String, ProductCfg>,
    /// Moving-average window for simple products.
    pub ma_window: usize,
    /// Spread-history window for basket products.
    pub spread_window: usize,
    pub zscore: ZScoreCfg,
    pub voucher: VoucherCfg,
}

/// Strike extraction rule for option-like identifiers: the trailing
/// `_<int>` token (e.g. "VOLCANIC_ROCK_VOUCHER_10500" -> 10500).
pub fn parse_strike(symbol: &str) -> Option<i64> {
    symbol.rsplit('_').next()?.parse().ok()
}

impl StrategyCfg {
    /// Built-in product table for the simulated exchange.
    pub fn builtin() -> Self {
        let mut products: HashMap<String, ProductCfg> = HashMap::new();
        products.insert(
            "RAINFOREST_RESIN".into(),
            ProductCfg::simple(StrategyKind::MeanReversion, 50, 10_000),
        );
        products.insert(
            "KELP".into(),
            ProductCfg::simple(StrategyKind::MeanReversion, 50, 1_000),
        );
        // tracked for history, deliberately never traded
        products.insert(
            "SQUID_INK".into(),
            ProductCfg::simple(StrategyKind::TrackOnly, 50, 1_000),
        );
        products.insert(
            "CROISSANTS".into(),
            ProductCfg {
                kind: StrategyKind::ZScoreReversion,
                position_limit: 250,
                fallback_fair: None,
                components: Vec::new(),
                buffer_seed: None,
                strike: None,
            },
        );
        products.insert(
            "PICNIC_BASKET1".into(),
            ProductCfg::basket(
                60,
                vec![
                    ("CROISSANTS".into(), 6),
                    ("JAMS".into(), 3),
                    ("DJEMBES".into(), 1),
                ],
                BufferParams {
                    buffer_multiplier: 2.2,
                    min_buffer: 2.0,
                    max_buffer: 10.0,
                    current_buffer: 3.0,
                },
            ),
        );
        products.insert(
            "PICNIC_BASKET2".into(),
            ProductCfg::basket(
                100,
                vec![("CROISSANTS".into(), 4), ("JAMS".into(), 2)],
                BufferParams {
                    buffer_multiplier: 2.0,
                    min_buffer: 1.5,
                    max_buffer: 8.0,
                    current_buffer: 2.0,
                },
            ),
        );
        // JAMS, DJEMBES and VOLCANIC_ROCK itself stay unconfigured: they
        // exist only as basket legs / the voucher underlying.
        for strike in [9_500, 9_750, 10_000, 10_250, 10_500] {
            let symbol = format!("VOLCANIC_ROCK_VOUCHER_{strike}");
            let parsed = parse_strike(&symbol).unwrap_or(strike);
            products.insert(symbol, ProductCfg::voucher(200, parsed));
        }

        Self {
            products,
            ma_window: 5,
            spread_window: 20,
            zscore: ZScoreCfg {
                window: 100,
                entry_threshold: 1.5,
                max_trade_size: 10,
            },
            voucher: VoucherCfg {
                underlying: "VOLCANIC_ROCK".into(),
                clip: 10,
                discount: 0.95,
                fallback_underlying: 10_500,
            },
        }
    }
}

#[derive(Clone, Debug)]
pub struct Args {
    pub ticks: u64,
    pub seed: u64,
    pub metrics_port: u16,
    pub record_file: Option<String>,
}

pub fn load() -> (Args, StrategyCfg) {
    // make sure .env is read (RECORD_FILE, TICKS, ...)
    let _ = dotenv();

    let ticks = env::var("TICKS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(2_000);
    let seed = env::var("SEED")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(42);
    let metrics_port = env::var("METRICS_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(9898);
    let record_file = env::var("RECORD_FILE").ok();

    let mut cfg = StrategyCfg::builtin();
    if let Some(w) = env::var("Z_WINDOW").ok().and_then(|s| s.parse().ok()) {
        cfg.zscore.window = w;
    }
    if let Some(t) = env::var("Z_THRESHOLD").ok().and_then(|s| s.parse().ok()) {
        cfg.zscore.entry_threshold = t;
    }
    if let Some(m) = env::var("MAX_TRADE_SIZE").ok().and_then(|s| s.parse().ok()) {
        cfg.zscore.max_trade_size = m;
    }

    (
        Args {
            ticks,
            seed,
            metrics_port,
            record_file,
        },
        cfg,
    )
}
