//! Feed file reader with automatic gzip decompression
//!
//! ASN feeds are commonly distributed gzip-compressed (`ip2asn-v4.tsv.gz`).
//! [`open`] picks the right decoder from the file extension so loaders can
//! hand the result straight to [`AsnIndex::load`](crate::AsnIndex::load).
//!
//! ```rust,no_run
//! use asnmap::{file_reader, AsnIndex, LoadOptions};
//!
//! let reader = file_reader::open("ip2asn-v4.tsv.gz")?;
//! let (index, report) = AsnIndex::from_reader(reader, &LoadOptions::default())?;
//! println!("{} records, {} rejected", report.accepted, report.rejected);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{self, stdin, BufRead, BufReader};
use std::path::Path;

/// Buffer size for feed reading (128KB)
const BUFFER_SIZE: usize = 128 * 1024;

/// Open a feed, decompressing `.gz` files
///
/// The path `-` reads from stdin.
///
/// # Errors
///
/// Returns an error if the file cannot be opened. Invalid gzip data
/// surfaces later as a read error.
pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Box<dyn BufRead + Send>> {
    let path = path.as_ref();

    if path.to_str() == Some("-") {
        return Ok(Box::new(BufReader::with_capacity(BUFFER_SIZE, stdin())));
    }

    let file = File::open(path)?;
    Ok(from_file(file, is_gzip_path(path)))
}

/// Wrap an already-opened file, with an explicit gzip flag
pub fn from_file(file: File, is_gzip: bool) -> Box<dyn BufRead + Send> {
    if is_gzip {
        // Multi-member aware: concatenated .gz files are common for feeds
        Box::new(BufReader::with_capacity(
            BUFFER_SIZE,
            MultiGzDecoder::new(file),
        ))
    } else {
        Box::new(BufReader::with_capacity(BUFFER_SIZE, file))
    }
}

/// Whether the path has a `.gz` extension (case-insensitive)
pub fn is_gzip_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("gz"))
        .unwrap_or(false)
}
