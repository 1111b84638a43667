use anyhow::{Context, Result};
use asnmap::{file_reader, AsnIndex, LoadOptions, LoadReport, Match};
use env_logger::Env;
use serde_json::json;
use std::path::Path;
use std::time::{Duration, Instant};

/// Install the logger; `RUST_LOG` takes precedence over `-v`
pub fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();
}

/// A loaded feed and how long it took
pub struct LoadedFeed {
    pub index: AsnIndex,
    pub report: LoadReport,
    pub elapsed: Duration,
}

/// Open and load a feed, attaching the path to any error
pub fn load_feed(path: &Path, options: &LoadOptions) -> Result<LoadedFeed> {
    let start = Instant::now();
    let reader = file_reader::open(path)
        .with_context(|| format!("Failed to open feed: {}", path.display()))?;
    let (index, report) = AsnIndex::from_reader(reader, options)
        .with_context(|| format!("Failed to load feed: {}", path.display()))?;
    Ok(LoadedFeed {
        index,
        report,
        elapsed: start.elapsed(),
    })
}

/// JSON object for one lookup result
pub fn match_to_json(query: &str, found: Option<&Match<'_>>) -> serde_json::Value {
    match found {
        Some(m) => json!({
            "ip": query,
            "found": true,
            "asn": m.record.asn,
            "country": m.record.country,
            "network": m.record.network,
            "prefix": m.block.to_string(),
        }),
        None => json!({
            "ip": query,
            "found": false,
        }),
    }
}

/// Group decimal digits in threes: `1234567` -> `1,234,567`
pub fn format_number(n: usize) -> String {
    let digits = n.to_string();
    let head = digits.len() % 3;
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.char_indices() {
        if i > 0 && (i + 3 - head) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Scale `value` by 1024 (bytes) or 1000 (rates) until it fits the unit
fn scaled(value: f64, step: f64, units: &[&'static str]) -> (f64, &'static str) {
    let mut value = value;
    let mut unit = 0;
    while value >= step && unit + 1 < units.len() {
        value /= step;
        unit += 1;
    }
    (value, units[unit])
}

/// Human-readable byte size, e.g. `1.50 MB`
pub fn format_bytes(bytes: usize) -> String {
    match scaled(bytes as f64, 1024.0, &["B", "KB", "MB", "GB"]) {
        (value, "B") => format!("{} B", value as usize),
        (value, unit) => format!("{value:.2} {unit}"),
    }
}

/// Compact rate, e.g. `2.50M`
pub fn format_qps(qps: f64) -> String {
    let (value, unit) = scaled(qps, 1000.0, &["", "K", "M"]);
    format!("{value:.2}{unit}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(50_000), "50,000");
        assert_eq!(format_number(1_234_567), "1,234,567");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1536), "1.50 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.00 MB");
        assert_eq!(format_bytes(5 * 1024 * 1024 * 1024), "5.00 GB");
    }

    #[test]
    fn test_format_qps() {
        assert_eq!(format_qps(12.5), "12.50");
        assert_eq!(format_qps(2_500.0), "2.50K");
        assert_eq!(format_qps(2_500_000.0), "2.50M");
    }
}
