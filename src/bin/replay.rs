//! Replay driver: load a CSV message stream, run it through the book, and
//! report engine-only throughput and per-message latency.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use hdrhistogram::Histogram;
use serde::Serialize;
use tick_lob::{reader, Book};

/// Sample 1 in N messages once the input is large enough that timing every
/// message would distort the run.
const LATENCY_SAMPLE_RATE: usize = 1000;
const SAMPLE_EVERY_MSG_BELOW: usize = 1_000_000;

#[derive(Serialize)]
struct LatencyUs {
    p50: f64,
    p95: f64,
    p99: f64,
    #[serde(rename = "p99.9")]
    p999: f64,
    min: f64,
    max: f64,
    avg: f64,
}

#[derive(Serialize)]
struct Metrics {
    events: u64,
    engine_time_ms: f64,
    throughput_mps: f64,
    csv_read_ms: f64,
    rejected: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    latency_us: Option<LatencyUs>,
    single_threaded: bool,
}

struct Args {
    csv_file: PathBuf,
    metrics_file: Option<PathBuf>,
    sample_latency: bool,
}

fn parse_args() -> Result<Args> {
    let mut csv_file = None;
    let mut metrics_file = None;
    let mut sample_latency = true;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--metrics" => {
                let path = args.next().context("--metrics requires a path")?;
                metrics_file = Some(PathBuf::from(path));
            }
            "--no-latency" => sample_latency = false,
            _ if csv_file.is_none() => csv_file = Some(PathBuf::from(arg)),
            other => bail!("unexpected argument {other:?}"),
        }
    }

    let Some(csv_file) = csv_file else {
        bail!("usage: replay <csv_file> [--metrics <json_file>] [--no-latency]");
    };
    Ok(Args { csv_file, metrics_file, sample_latency })
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = parse_args()?;

    println!("Reading messages from {}...", args.csv_file.display());
    let csv_start = Instant::now();
    let messages = reader::read_messages(&args.csv_file)
        .with_context(|| format!("could not open {}", args.csv_file.display()))?;
    let csv_read_ms = csv_start.elapsed().as_secs_f64() * 1000.0;

    if messages.is_empty() {
        bail!("no messages loaded");
    }
    println!("Loaded {} messages in {:.2} ms.", messages.len(), csv_read_ms);

    let mut book = Book::new();
    book.warm_up();

    let mut histogram: Option<Histogram<u64>> = args
        .sample_latency
        .then(|| Histogram::new_with_bounds(1, 1_000_000_000, 3))
        .transpose()?;
    let sample_all = messages.len() <= SAMPLE_EVERY_MSG_BELOW;
    let mut rejected = 0u64;

    // Engine-only timing; CSV I/O is accounted separately above.
    let engine_start = Instant::now();
    for (i, msg) in messages.iter().enumerate() {
        match &mut histogram {
            Some(histogram) if sample_all || i % LATENCY_SAMPLE_RATE == 0 => {
                let start = Instant::now();
                if book.process(msg).is_err() {
                    rejected += 1;
                }
                let _ = histogram.record(start.elapsed().as_nanos() as u64);
            }
            _ => {
                if book.process(msg).is_err() {
                    rejected += 1;
                }
            }
        }
    }
    let engine_time_ms = engine_start.elapsed().as_secs_f64() * 1000.0;
    let throughput_mps = messages.len() as f64 / (engine_time_ms / 1000.0);

    println!("\n=== Summary ===");
    println!("Total messages: {}", book.total_messages());
    println!("Total trades: {}", book.total_trades());
    println!("Rejected messages: {rejected}");
    match book.best_bid() {
        Some(price) => println!("Best bid: {price} (qty: {})", book.best_bid_qty()),
        None => println!("Best bid: none"),
    }
    match book.best_ask() {
        Some(price) => println!("Best ask: {price} (qty: {})", book.best_ask_qty()),
        None => println!("Best ask: none"),
    }
    println!("Total bid quantity: {}", book.total_bid_qty());
    println!("Total ask quantity: {}", book.total_ask_qty());

    println!("\n=== Performance (Engine-Only) ===");
    println!("CSV read time: {csv_read_ms:.2} ms");
    println!("Engine time: {engine_time_ms:.2} ms");
    println!("Throughput: {throughput_mps:.2} messages/second");

    let latency_us = histogram.as_ref().filter(|h| !h.is_empty()).map(|h| LatencyUs {
        p50: h.value_at_quantile(0.50) as f64 / 1000.0,
        p95: h.value_at_quantile(0.95) as f64 / 1000.0,
        p99: h.value_at_quantile(0.99) as f64 / 1000.0,
        p999: h.value_at_quantile(0.999) as f64 / 1000.0,
        min: h.min() as f64 / 1000.0,
        max: h.max() as f64 / 1000.0,
        avg: h.mean() / 1000.0,
    });

    if let Some(latency) = &latency_us {
        println!("\n=== Latency (microseconds) ===");
        println!("Min:    {:.2}", latency.min);
        println!("Avg:    {:.2}", latency.avg);
        println!("P50:    {:.2}", latency.p50);
        println!("P95:    {:.2}", latency.p95);
        println!("P99:    {:.2}", latency.p99);
        println!("P99.9:  {:.2}", latency.p999);
        println!("Max:    {:.2}", latency.max);
        if !sample_all {
            println!("Note: latency sampled at 1/{LATENCY_SAMPLE_RATE}");
        }
    }

    if let Some(path) = &args.metrics_file {
        let metrics = Metrics {
            events: messages.len() as u64,
            engine_time_ms,
            throughput_mps,
            csv_read_ms,
            rejected,
            latency_us,
            single_threaded: true,
        };
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("could not create {}", dir.display()))?;
        }
        let file = std::fs::File::create(path)
            .with_context(|| format!("could not write {}", path.display()))?;
        serde_json::to_writer_pretty(file, &metrics)?;
        println!("\nMetrics written to: {}", path.display());
    }

    let trades = book.trades();
    if !trades.is_empty() {
        println!("\n=== Sample Trades (first 10) ===");
        for trade in trades.iter().take(10) {
            println!(
                "Trade: buy_id={}, sell_id={}, price={}, qty={}, ts={}",
                trade.buy_id, trade.sell_id, trade.price, trade.qty, trade.ts
            );
        }
        if trades.len() > 10 {
            println!("... ({} more trades)", trades.len() - 10);
        }
    }

    Ok(())
}
