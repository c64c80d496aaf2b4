// ===============================
// src/main.rs
// ===============================
/*
=============================================================================
Project : tick_bot_rust — per-tick decision engine for a simulated
          multi-product exchange
Module  : main.rs

Summary : Drives the stateful strategy engine (mean-reversion, z-score
          reversion, basket-arbitrage signal, intrinsic-value short)
          against a seeded mock exchange: one synchronous engine call per
          tick, full-fill application, positions/PnL bookkeeping,
          Prometheus metrics, and optional JSONL event recording. The
          engine itself keeps no memory between ticks; everything it
          needs crosses the boundary inside the serialized trader blob.
=============================================================================
*/
mod book;
mod config;
mod domain;
mod engine;
mod feed;
mod metrics;
mod positions;
mod recorder;
mod router;
mod state;
mod stats;
mod strategy;

use ahash::AHashMap as HashMap;
use chrono::Utc;
use tracing::{error, info};

use crate::domain::{Event, MdTick, TickRequest};

// Reference mids for the mock exchange, one entry per simulated symbol
// (tradable products plus basket legs and the voucher underlying).
const START_MIDS: &[(&str, i64)] = &[
    ("RAINFOREST_RESIN", 10_000),
    ("KELP", 2_000),
    ("SQUID_INK", 1_970),
    ("CROISSANTS", 4_300),
    ("JAMS", 6_500),
    ("DJEMBES", 13_400),
    ("PICNIC_BASKET1", 59_000),
    ("PICNIC_BASKET2", 30_300),
    ("VOLCANIC_ROCK", 10_520),
    ("VOLCANIC_ROCK_VOUCHER_9500", 1_020),
    ("VOLCANIC_ROCK_VOUCHER_9750", 770),
    ("VOLCANIC_ROCK_VOUCHER_10000", 520),
    ("VOLCANIC_ROCK_VOUCHER_10250", 270),
    ("VOLCANIC_ROCK_VOUCHER_10500", 60),
];

fn main() {
    // ---- Logging ----
    tracing_subscriber::fmt().with_env_filter("info").init();

    // ---- Load config ----
    let (args, cfg) = config::load();

    // ---- Metrics ----
    metrics::init();
    metrics::serve_metrics(args.metrics_port);

    // ---- Startup info + export config to metrics ----
    info!(
        ticks = args.ticks,
        seed = args.seed,
        products = cfg.products.len(),
        z_window = cfg.zscore.window,
        z_threshold = cfg.zscore.entry_threshold,
        "startup config"
    );
    for (symbol, p) in cfg.products.iter() {
        metrics::CONFIG_SYMBOL.with_label_values(&[symbol]).set(1);
        metrics::CONFIG_STRATEGY_ACTIVE
            .with_label_values(&[p.kind.label()])
            .inc();
    }

    // ---- Recorder (optional) ----
    let mut rec = match args.record_file.as_deref() {
        Some(path) => match recorder::Recorder::open(path) {
            Ok(r) => Some(r),
            Err(e) => {
                error!(?e, %path, "recorder open failed, running without it");
                None
            }
        },
        None => None,
    };

    // ---- Simulator state ----
    let limits: HashMap<String, i64> = cfg
        .products
        .iter()
        .map(|(s, p)| (s.clone(), p.position_limit))
        .collect();
    let mut feed = feed::MockFeed::new(args.seed, START_MIDS);
    let mut book_keeper = positions::PositionsTask::new(limits);
    let engine = engine::Engine::new(cfg);

    let started = Utc::now();
    if let Some(r) = rec.as_mut() {
        r.record(&Event::Note(format!("run start {}", started.to_rfc3339())));
    }

    // ---- Tick loop: one synchronous engine call per tick ----
    let mut blob = String::new();
    let mut orders_since_heartbeat: u64 = 0;

    for tick in 0..args.ticks {
        let ts = (tick * 100) as i64;
        let books = feed.next_books();
        book_keeper.mark(&books);

        if let Some(r) = rec.as_mut() {
            for (symbol, depth) in books.iter() {
                if let Some(top) = book::top_of_book(depth) {
                    r.record(&Event::Md(MdTick {
                        ts,
                        symbol: symbol.clone(),
                        best_bid: top.best_bid,
                        best_ask: top.best_ask,
                    }));
                }
            }
        }

        let req = TickRequest {
            timestamp: ts,
            order_depths: books,
            positions: book_keeper.snapshot(),
            trader_data: blob,
        };
        let resp = engine.on_tick(&req);
        blob = resp.trader_data;

        // mock exchange: fill every order in full at its limit price
        let mut symbols: Vec<&String> = resp.orders.keys().collect();
        symbols.sort();
        for symbol in symbols {
            for order in &resp.orders[symbol] {
                metrics::ORDERS.inc();
                orders_since_heartbeat += 1;
                let fill = book_keeper.on_fill(ts, order);
                if let Some(r) = rec.as_mut() {
                    r.record(&Event::Ord(order.clone()));
                    r.record(&Event::Fill(fill));
                }
            }
        }

        if (tick + 1) % 100 == 0 {
            info!(
                tick = tick + 1,
                orders = orders_since_heartbeat,
                mark_pnl = book_keeper.mark_value(),
                "heartbeat"
            );
            orders_since_heartbeat = 0;
        }
    }

    let elapsed_ms = (Utc::now() - started).num_milliseconds();
    info!(
        ticks = args.ticks,
        elapsed_ms,
        mark_pnl = book_keeper.mark_value(),
        "run complete"
    );
    if let Some(r) = rec.as_mut() {
        r.record(&Event::Note(format!(
            "run complete, mark_pnl {}",
            book_keeper.mark_value()
        )));
        r.flush();
    }
}
