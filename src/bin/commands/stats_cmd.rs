use anyhow::Result;
use asnmap::LoadOptions;
use serde_json::json;
use std::path::PathBuf;

use crate::cli_utils::{format_bytes, format_number, load_feed};

pub fn cmd_stats(feed: PathBuf, options: LoadOptions, json_output: bool) -> Result<()> {
    let loaded = load_feed(&feed, &options)?;
    let report = &loaded.report;
    let stats = loaded.index.stats();

    if json_output {
        let output = json!({
            "feed": feed.display().to_string(),
            "load": report,
            "index": stats,
            "load_seconds": loaded.elapsed.as_secs_f64(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Feed:     {}", feed.display());
    println!("Loaded in {:.2}s", loaded.elapsed.as_secs_f64());
    println!();
    println!("Lines:");
    println!("  Read:        {}", format_number(report.lines));
    println!("  Accepted:    {}", format_number(report.accepted));
    println!("  Rejected:    {}", format_number(report.rejected));
    println!();
    println!("Index:");
    println!("  Records:     {}", format_number(stats.records));
    println!("  IPv4 blocks: {}", format_number(stats.ipv4_blocks));
    println!("  IPv6 blocks: {}", format_number(stats.ipv6_blocks));
    println!("  Trie nodes:  {}", format_number(stats.nodes));
    println!("  Trie memory: {}", format_bytes(stats.memory_bytes));

    Ok(())
}
