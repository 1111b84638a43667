//! CIDR prefix blocks and range decomposition
//!
//! Feeds describe networks as inclusive `[start, end]` ranges, while the
//! trie is keyed by CIDR prefixes. [`decompose_range`] bridges the two by
//! greedily covering the range with the largest aligned blocks that fit:
//!
//! ```text
//! 10.0.0.0 - 10.0.0.2   =>   10.0.0.0/31, 10.0.0.2/32
//! 10.0.0.1 - 10.0.0.8   =>   10.0.0.1/32, 10.0.0.2/31, 10.0.0.4/30, 10.0.0.8/32
//! ```
//!
//! Two prefix blocks are either disjoint or one contains the other, which is
//! what makes the longest match in the trie unambiguous.

use crate::address::{host_mask, Address, IpVersion};
use crate::error::{InvariantViolation, ParseError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::FusedIterator;
use std::str::FromStr;

/// A CIDR block: every address sharing the top `prefix_len` bits of `base`
///
/// The base address is always canonical (host bits cleared).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PrefixBlock {
    base: Address,
    prefix_len: u8,
}

impl PrefixBlock {
    /// Create the block of `prefix_len` containing `addr`
    ///
    /// Host bits of `addr` are cleared.
    pub fn new(addr: Address, prefix_len: u8) -> Result<Self, InvariantViolation> {
        check_prefix_len(addr.version(), prefix_len)?;
        Ok(Self {
            base: addr.mask(prefix_len),
            prefix_len,
        })
    }

    /// Create a block whose base must already be canonical
    pub fn try_new(base: Address, prefix_len: u8) -> Result<Self, InvariantViolation> {
        check_prefix_len(base.version(), prefix_len)?;
        if base.bits() & host_mask(base.version(), prefix_len) != 0 {
            return Err(InvariantViolation::NonCanonicalBase {
                base: base.to_string(),
                prefix_len,
            });
        }
        Ok(Self { base, prefix_len })
    }

    /// Block of `prefix_len` containing `addr`, for lengths known to fit
    #[inline]
    pub(crate) fn covering(addr: Address, prefix_len: u8) -> Self {
        debug_assert!(prefix_len <= addr.width());
        Self {
            base: addr.mask(prefix_len),
            prefix_len,
        }
    }

    /// Full-width block holding a single address
    pub fn host(addr: Address) -> Self {
        Self {
            base: addr,
            prefix_len: addr.width(),
        }
    }

    /// Network (lowest) address of the block
    #[inline]
    pub fn base(&self) -> Address {
        self.base
    }

    /// Prefix length in bits
    #[inline]
    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    /// Address family of the block
    #[inline]
    pub fn version(&self) -> IpVersion {
        self.base.version()
    }

    /// First address in the block
    #[inline]
    pub fn first(&self) -> Address {
        self.base
    }

    /// Last address in the block
    #[inline]
    pub fn last(&self) -> Address {
        self.base.fill(self.prefix_len)
    }

    /// Whether `addr` falls inside the block
    pub fn contains(&self, addr: Address) -> bool {
        addr.version() == self.version() && addr.mask(self.prefix_len) == self.base
    }

    /// Whether `other` is this block or nested inside it
    pub fn contains_block(&self, other: &PrefixBlock) -> bool {
        other.prefix_len >= self.prefix_len && self.contains(other.base)
    }

    /// Whether the two blocks share any address
    ///
    /// Prefix blocks never partially overlap, so this holds exactly when one
    /// contains the other.
    pub fn overlaps(&self, other: &PrefixBlock) -> bool {
        self.contains_block(other) || other.contains_block(self)
    }
}

fn check_prefix_len(version: IpVersion, prefix_len: u8) -> Result<(), InvariantViolation> {
    if prefix_len > version.width() {
        return Err(InvariantViolation::PrefixTooLong {
            version,
            width: version.width(),
            prefix_len,
        });
    }
    Ok(())
}

impl fmt::Display for PrefixBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.prefix_len)
    }
}

impl FromStr for PrefixBlock {
    type Err = ParseError;

    /// Parse `addr/len`, or a bare address as a host block
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.split_once('/') {
            Some((addr, len)) => {
                let addr: Address = addr.parse()?;
                let prefix_len: u8 = len
                    .parse()
                    .map_err(|_| ParseError::InvalidPrefix(s.to_string()))?;
                PrefixBlock::new(addr, prefix_len)
                    .map_err(|_| ParseError::InvalidPrefix(s.to_string()))
            }
            None => s.parse().map(PrefixBlock::host),
        }
    }
}

impl Serialize for PrefixBlock {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PrefixBlock {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Cover `[start, end]` with the minimal ascending run of prefix blocks
///
/// Both endpoints are inclusive and must share an IP version.
pub fn decompose_range(start: Address, end: Address) -> Result<Vec<PrefixBlock>, ParseError> {
    Ok(PrefixBlocks::new(start, end)?.collect())
}

/// Lazy form of [`decompose_range`]
#[derive(Debug, Clone)]
pub struct PrefixBlocks {
    next: Option<Address>,
    end: Address,
}

impl PrefixBlocks {
    /// Validate the range and prepare to iterate its blocks
    pub fn new(start: Address, end: Address) -> Result<Self, ParseError> {
        if start.version() != end.version() {
            return Err(ParseError::VersionMismatch {
                start: start.to_string(),
                end: end.to_string(),
                start_version: start.version(),
                end_version: end.version(),
            });
        }
        if start > end {
            return Err(ParseError::InvertedRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self {
            next: Some(start),
            end,
        })
    }
}

impl Iterator for PrefixBlocks {
    type Item = PrefixBlock;

    fn next(&mut self) -> Option<PrefixBlock> {
        let lo = self.next?;

        // Alignment of `lo` bounds the block from below, the remaining span
        // from above. A span of 0 means the full IPv6 space wrapped.
        let span = (self.end.bits() - lo.bits()).wrapping_add(1);
        let span_bits = if span == 0 {
            128
        } else {
            127 - span.leading_zeros() as u8
        };
        let host_bits = lo.trailing_zeros().min(span_bits);

        let block = PrefixBlock {
            base: lo,
            prefix_len: lo.width() - host_bits,
        };
        let last = block.last();
        self.next = if last >= self.end {
            None
        } else {
            last.checked_next()
        };
        Some(block)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.next {
            None => (0, Some(0)),
            // At most two blocks per bit of width
            Some(lo) => (1, Some(2 * lo.width() as usize)),
        }
    }
}

impl FusedIterator for PrefixBlocks {}
