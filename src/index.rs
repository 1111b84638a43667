//! ASN index: feed records bound to the prefix trie
//!
//! [`AsnIndex`] parses feed lines, decomposes each range into prefix blocks
//! and stores one shared [`AsnRecord`] for all blocks of the line. Queries
//! return the record of the most specific block containing the address.
//!
//! # Example
//!
//! ```rust
//! use asnmap::AsnIndex;
//!
//! let mut index = AsnIndex::new();
//! index.add_record("1.0.0.0  1.0.0.255  13335  US  CLOUDFLARENET")?;
//!
//! let record = index.lookup("1.0.0.5".parse()?)?;
//! assert_eq!(record.asn, 13335);
//! assert!(index.lookup("1.0.1.5".parse()?).is_err());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! The index is built single-threaded and is read-only afterwards; lookups
//! take `&self` and may run from any number of threads.

use crate::address::{Address, IpVersion};
use crate::error::{LoadError, LookupError, NotFoundError, ParseError};
use crate::prefix::{PrefixBlock, PrefixBlocks};
use crate::record::{parse_line, AsnRecord, FeedLine};
use crate::trie::PrefixTrie;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::io::BufRead;
use std::net::IpAddr;
use std::sync::Arc;

/// What a bulk load does with a line that fails to parse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Log the line and continue
    #[default]
    Skip,
    /// Stop at the first bad line
    Abort,
}

/// Bulk load configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadOptions {
    /// Handling of unparseable lines
    pub policy: ErrorPolicy,
    /// Fail once more than this many lines have been skipped
    pub max_errors: Option<usize>,
}

impl LoadOptions {
    /// Skip bad lines without limit
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the error policy
    pub fn with_policy(mut self, policy: ErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Limit the number of skipped lines
    pub fn with_max_errors(mut self, max_errors: usize) -> Self {
        self.max_errors = Some(max_errors);
        self
    }
}

/// Outcome of a bulk load
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    /// Lines read, including blank and comment lines
    pub lines: usize,
    /// Lines added to the index
    pub accepted: usize,
    /// Lines skipped because they failed to parse
    pub rejected: usize,
    /// Prefix blocks inserted
    pub blocks: usize,
}

/// Index size statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    /// Records added
    pub records: usize,
    /// Distinct IPv4 blocks stored
    pub ipv4_blocks: usize,
    /// Distinct IPv6 blocks stored
    pub ipv6_blocks: usize,
    /// Trie nodes allocated
    pub nodes: usize,
    /// Approximate trie size in bytes, excluding record strings
    pub memory_bytes: usize,
}

/// A successful lookup: the record and the block that matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Match<'a> {
    /// Record attached to the block
    pub record: &'a AsnRecord,
    /// Most specific stored block containing the address
    pub block: PrefixBlock,
}

/// Longest-prefix-match index from addresses to ASN records
#[derive(Debug, Clone, Default)]
pub struct AsnIndex {
    trie: PrefixTrie<Arc<AsnRecord>>,
    records: usize,
    ipv4_blocks: usize,
    ipv6_blocks: usize,
}

impl AsnIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from a feed
    pub fn from_reader<R: BufRead>(
        reader: R,
        options: &LoadOptions,
    ) -> Result<(Self, LoadReport), LoadError> {
        let mut index = Self::new();
        let report = index.load(reader, options)?;
        Ok((index, report))
    }

    /// Parse a feed line and insert its range
    ///
    /// Returns the number of prefix blocks the range decomposed into. On
    /// error the index is left unchanged.
    pub fn add_record(&mut self, line: &str) -> Result<usize, ParseError> {
        let FeedLine { start, end, record } = parse_line(line)?;
        self.insert_range(start, end, record)
    }

    /// Insert `[start, end]` with `record`
    ///
    /// Blocks already present are overwritten. Returns the number of blocks
    /// the range decomposed into.
    pub fn insert_range(
        &mut self,
        start: Address,
        end: Address,
        record: AsnRecord,
    ) -> Result<usize, ParseError> {
        let blocks = PrefixBlocks::new(start, end)?;
        let record = Arc::new(record);

        let mut inserted = 0;
        for block in blocks {
            if self.trie.insert(block, Arc::clone(&record)).is_none() {
                match block.version() {
                    IpVersion::V4 => self.ipv4_blocks += 1,
                    IpVersion::V6 => self.ipv6_blocks += 1,
                }
            }
            inserted += 1;
        }
        self.records += 1;
        Ok(inserted)
    }

    /// Record of the most specific block containing `addr`
    #[inline]
    pub fn lookup(&self, addr: Address) -> Result<&AsnRecord, NotFoundError> {
        self.trie
            .longest_prefix_match(addr)
            .map(|(_, record)| record.as_ref())
            .ok_or(NotFoundError)
    }

    /// Like [`lookup`](Self::lookup), also reporting the matched block
    pub fn lookup_match(&self, addr: Address) -> Option<Match<'_>> {
        self.trie
            .longest_prefix_match(addr)
            .map(|(block, record)| Match {
                record: record.as_ref(),
                block,
            })
    }

    /// Look up an address given as network-order bytes
    pub fn lookup_from_bytes(
        &self,
        raw: &[u8],
        version: IpVersion,
    ) -> Result<&AsnRecord, LookupError> {
        let addr = Address::from_bytes(raw, version)?;
        Ok(self.lookup(addr)?)
    }

    /// Look up a standard library address
    pub fn lookup_ip(&self, ip: IpAddr) -> Result<&AsnRecord, NotFoundError> {
        self.lookup(Address::from(ip))
    }

    /// Parse `query` as an IP literal and look it up
    pub fn lookup_str(&self, query: &str) -> Result<Option<Match<'_>>, ParseError> {
        let addr: Address = query.parse()?;
        Ok(self.lookup_match(addr))
    }

    /// Read a feed line by line into the index
    ///
    /// Blank lines and lines starting with `#` are ignored.
    pub fn load<R: BufRead>(
        &mut self,
        mut reader: R,
        options: &LoadOptions,
    ) -> Result<LoadReport, LoadError> {
        let mut report = LoadReport::default();
        let mut buf = Vec::new();

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            report.lines += 1;

            // Decode per line so one bad byte only costs its own line
            let outcome = match std::str::from_utf8(&buf) {
                Ok(text) => {
                    let trimmed = text.trim();
                    if trimmed.is_empty() || trimmed.starts_with('#') {
                        continue;
                    }
                    self.add_record(trimmed)
                }
                Err(err) => Err(ParseError::InvalidEncoding {
                    offset: err.valid_up_to(),
                    line: String::from_utf8_lossy(&buf).trim().to_string(),
                }),
            };

            match outcome {
                Ok(blocks) => {
                    report.accepted += 1;
                    report.blocks += blocks;
                }
                Err(source) if options.policy == ErrorPolicy::Abort => {
                    return Err(LoadError::Rejected {
                        line: report.lines,
                        source,
                    });
                }
                Err(err) => {
                    report.rejected += 1;
                    warn!("skipping line {}: {}", report.lines, err);
                    if let Some(limit) = options.max_errors {
                        if report.rejected > limit {
                            return Err(LoadError::TooManyErrors {
                                rejected: report.rejected,
                                limit,
                            });
                        }
                    }
                }
            }
        }

        info!(
            "loaded {} records ({} blocks) from {} lines, {} rejected",
            report.accepted, report.blocks, report.lines, report.rejected
        );
        debug!(
            "trie holds {} nodes, ~{} bytes",
            self.trie.node_count(),
            self.trie.memory_usage()
        );
        Ok(report)
    }

    /// Number of records added
    pub fn record_count(&self) -> usize {
        self.records
    }

    /// Number of distinct prefix blocks stored
    pub fn block_count(&self) -> usize {
        self.trie.len()
    }

    /// Whether nothing has been loaded
    pub fn is_empty(&self) -> bool {
        self.trie.is_empty()
    }

    /// Size statistics
    pub fn stats(&self) -> IndexStats {
        IndexStats {
            records: self.records,
            ipv4_blocks: self.ipv4_blocks,
            ipv6_blocks: self.ipv6_blocks,
            nodes: self.trie.node_count(),
            memory_bytes: self.trie.memory_usage(),
        }
    }

    /// Stored blocks with their records, in address order
    pub fn iter(&self) -> impl Iterator<Item = (PrefixBlock, &AsnRecord)> + '_ {
        self.trie.iter().map(|(block, record)| (block, record.as_ref()))
    }
}
