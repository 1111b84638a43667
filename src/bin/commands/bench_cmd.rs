use anyhow::{Context, Result};
use asnmap::{Address, LoadOptions};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::time::Instant;

use crate::cli_utils::{format_bytes, format_number, format_qps, load_feed};

pub fn cmd_bench(
    feed: PathBuf,
    options: LoadOptions,
    count: usize,
    threads: usize,
    seed: Option<u64>,
) -> Result<()> {
    println!("--- Phase 1: Load Feed ---");
    let loaded = load_feed(&feed, &options)?;
    let stats = loaded.index.stats();
    let load_rate = loaded.report.accepted as f64 / loaded.elapsed.as_secs_f64();
    println!("  Load time:   {:.2}s", loaded.elapsed.as_secs_f64());
    println!("  Load rate:   {} records/sec", format_qps(load_rate));
    println!(
        "  Records:     {} ({} rejected)",
        format_number(loaded.report.accepted),
        format_number(loaded.report.rejected)
    );
    println!(
        "  Blocks:      {}",
        format_number(stats.ipv4_blocks + stats.ipv6_blocks)
    );
    println!("  Trie nodes:  {}", format_number(stats.nodes));
    println!("  Trie memory: {}", format_bytes(stats.memory_bytes));
    println!();

    println!("--- Phase 2: Generate Queries ---");
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let queries: Vec<Address> = (0..count)
        .map(|_| Address::v4(Ipv4Addr::from(rng.random::<u32>())))
        .collect();
    println!("  Addresses:   {} random IPv4", format_number(count));
    println!();

    println!("--- Phase 3: Lookup Performance ---");
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .context("Failed to build worker pool")?;
    let index = &loaded.index;

    let bench_start = Instant::now();
    let found = pool.install(|| {
        queries
            .par_iter()
            .filter(|addr| index.lookup(**addr).is_ok())
            .count()
    });
    let bench_time = bench_start.elapsed();

    let qps = count as f64 / bench_time.as_secs_f64();
    println!("  Threads:     {}", pool.current_num_threads());
    println!("  Total time:  {:.3}s", bench_time.as_secs_f64());
    println!("  Throughput:  {} lookups/sec", format_qps(qps));
    if count > 0 {
        println!(
            "  Avg latency: {:.1}ns",
            bench_time.as_nanos() as f64 / count as f64
        );
    }
    println!(
        "  Found:       {}/{}",
        format_number(found),
        format_number(count)
    );

    Ok(())
}
