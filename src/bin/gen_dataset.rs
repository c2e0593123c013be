//! Synthetic dataset generator: a reproducible CSV message stream for
//! benchmarking the replay driver.
//!
//! Mix: 70% NewLimit, 20% NewMarket, 10% Cancel of a random live order.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::time::Instant;

use anyhow::{Context, Result};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use tick_lob::Side;

const BASE_PRICE: i64 = 100_000;
const START_TS: u64 = 1_693_526_400_000_000_000;
const MAX_TRACKED_ORDERS: usize = 100_000;

fn side_str(side: Side) -> &'static str {
    match side {
        Side::Buy => "Buy",
        Side::Sell => "Sell",
    }
}

fn main() -> Result<()> {
    let num_messages: u64 = std::env::args()
        .nth(1)
        .map(|arg| arg.parse().context("message count must be an integer"))
        .transpose()?
        .unwrap_or(10_000_000);

    std::fs::create_dir_all("data").context("could not create data directory")?;
    let filename = format!("data/large_dataset_{}k.csv", num_messages / 1000);

    println!("Generating {num_messages} messages...");
    let start_time = Instant::now();

    let file = File::create(&filename).with_context(|| format!("could not create {filename}"))?;
    let mut out = BufWriter::with_capacity(8 * 1024 * 1024, file);
    writeln!(out, "# ts_ns,MsgType,Side,OrderId,Price,Qty")?;

    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let mut live: Vec<(u64, Side)> = Vec::with_capacity(MAX_TRACKED_ORDERS);
    let mut next_order_id = 1u64;
    let mut ts = START_TS;

    for _ in 0..num_messages {
        ts += 1000 + rng.gen_range(0..1_000_000);

        let roll = rng.gen_range(0..100);
        if roll >= 90 && !live.is_empty() {
            // Cancel a random live order.
            let slot = rng.gen_range(0..live.len());
            let (id, side) = live.swap_remove(slot);
            writeln!(out, "{ts},Cancel,{},{id},0,0", side_str(side))?;
        } else if roll >= 70 && roll < 90 {
            let id = next_order_id;
            next_order_id += 1;
            let side = if rng.gen_bool(0.5) { Side::Buy } else { Side::Sell };
            let qty = rng.gen_range(1..=1000);
            writeln!(out, "{ts},NewMarket,{},{id},0,{qty}", side_str(side))?;
        } else {
            let id = next_order_id;
            next_order_id += 1;
            let side = if rng.gen_bool(0.5) { Side::Buy } else { Side::Sell };
            let price = BASE_PRICE + rng.gen_range(0..=500);
            let qty = rng.gen_range(1..=1000);

            if live.len() == MAX_TRACKED_ORDERS {
                // Forget the oldest tenth so cancels keep targeting a
                // bounded, recent population.
                live.drain(..MAX_TRACKED_ORDERS / 10);
            }
            live.push((id, side));

            writeln!(out, "{ts},NewLimit,{},{id},{price},{qty}", side_str(side))?;
        }
    }

    out.flush()?;
    let elapsed = start_time.elapsed();
    let file_size = std::fs::metadata(&filename)?.len();

    println!(
        "\nGenerated {num_messages} messages in {} ms ({:.2} s)",
        elapsed.as_millis(),
        elapsed.as_secs_f64()
    );
    println!(
        "Throughput: {:.0} messages/second",
        num_messages as f64 / elapsed.as_secs_f64()
    );
    println!("Output file: {filename}");
    println!("File size: {:.2} MB", file_size as f64 / (1024.0 * 1024.0));

    Ok(())
}
