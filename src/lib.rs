//! asnmap - IP to ASN resolution by longest-prefix match
//!
//! asnmap loads an IP-range-to-ASN feed into an in-memory binary prefix trie
//! and answers "which autonomous system announces this address?" in time
//! bounded by the address width (32 steps for IPv4, 128 for IPv6),
//! regardless of how many ranges are loaded.
//!
//! # Quick Start
//!
//! ```rust
//! use asnmap::{AsnIndex, IpVersion};
//!
//! let mut index = AsnIndex::new();
//! index.add_record("1.0.0.0\t1.0.0.255\t13335\tUS\tCLOUDFLARENET")?;
//! index.add_record("10.0.0.0\t10.0.0.2\t64512\tZZ\tPRIVATE")?;
//!
//! let record = index.lookup("1.0.0.5".parse()?)?;
//! assert_eq!(record.asn, 13335);
//!
//! // Raw network-order bytes, as read from a packet header
//! let record = index.lookup_from_bytes(&[10, 0, 0, 2], IpVersion::V4)?;
//! assert_eq!(record.network, "PRIVATE");
//!
//! // Not covered by any range
//! assert!(index.lookup("10.0.0.3".parse()?).is_err());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Architecture
//!
//! ```text
//! feed line ──► record::parse_line ──► [start, end] + AsnRecord
//!                                          │
//!                          prefix::decompose_range
//!                                          │
//!                                          ▼
//!                       PrefixBlock* ──► PrefixTrie<Arc<AsnRecord>>
//!                                          ▲
//! query address ─── longest_prefix_match ──┘
//! ```
//!
//! Feed ranges need not be CIDR-aligned; each is split into the minimal run
//! of aligned blocks, all pointing at one shared record.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// IPv4/IPv6 address values
pub mod address;
/// Error types
pub mod error;
pub mod file_reader;
pub mod index;
pub mod prefix;
pub mod record;
pub mod trie;

pub use crate::address::{Address, IpVersion};
pub use crate::error::{InvariantViolation, LoadError, LookupError, NotFoundError, ParseError};
pub use crate::index::{AsnIndex, ErrorPolicy, IndexStats, LoadOptions, LoadReport, Match};
pub use crate::prefix::{decompose_range, PrefixBlock, PrefixBlocks};
pub use crate::record::AsnRecord;
pub use crate::trie::PrefixTrie;

/// Version of the asnmap library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
