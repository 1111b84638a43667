//! Fixed-width IP address values
//!
//! [`Address`] stores either family as a `u128` plus a version tag, so the
//! trie and the range decomposer share one bit-walking implementation
//! parameterised by [`IpVersion::width`]. IPv4 occupies the low 32 bits.

use crate::error::{LookupError, ParseError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

/// IP address family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IpVersion {
    /// 32-bit IPv4
    V4,
    /// 128-bit IPv6
    V6,
}

impl IpVersion {
    /// Address width in bits
    #[inline]
    pub const fn width(self) -> u8 {
        match self {
            IpVersion::V4 => 32,
            IpVersion::V6 => 128,
        }
    }

    /// Address length in network-order bytes
    #[inline]
    pub const fn byte_len(self) -> usize {
        match self {
            IpVersion::V4 => 4,
            IpVersion::V6 => 16,
        }
    }

    /// Largest address value of this family
    #[inline]
    pub const fn max_bits(self) -> u128 {
        u128::MAX >> (128 - self.width() as u32)
    }
}

impl fmt::Display for IpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IpVersion::V4 => write!(f, "IPv4"),
            IpVersion::V6 => write!(f, "IPv6"),
        }
    }
}

/// An immutable IPv4 or IPv6 address
///
/// Ordering compares the version first, so every IPv4 address sorts before
/// every IPv6 address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address {
    version: IpVersion,
    bits: u128,
}

impl Address {
    /// Create an IPv4 address
    #[inline]
    pub fn v4(addr: Ipv4Addr) -> Self {
        Self {
            version: IpVersion::V4,
            bits: u32::from(addr) as u128,
        }
    }

    /// Create an IPv6 address
    #[inline]
    pub fn v6(addr: Ipv6Addr) -> Self {
        Self {
            version: IpVersion::V6,
            bits: u128::from(addr),
        }
    }

    /// Create an address from its integer value
    ///
    /// Returns `None` if `bits` does not fit the family width.
    pub fn from_bits(bits: u128, version: IpVersion) -> Option<Self> {
        (bits <= version.max_bits()).then_some(Self { version, bits })
    }

    /// Create an address from a value already known to fit the family
    #[inline]
    pub(crate) fn from_raw(bits: u128, version: IpVersion) -> Self {
        debug_assert!(bits <= version.max_bits());
        Self { version, bits }
    }

    /// Create an address from network-order bytes
    pub fn from_bytes(raw: &[u8], version: IpVersion) -> Result<Self, LookupError> {
        let invalid = || LookupError::InvalidLength {
            version,
            expected: version.byte_len(),
            actual: raw.len(),
        };
        match version {
            IpVersion::V4 => {
                let octets: [u8; 4] = raw.try_into().map_err(|_| invalid())?;
                Ok(Self::v4(Ipv4Addr::from(octets)))
            }
            IpVersion::V6 => {
                let octets: [u8; 16] = raw.try_into().map_err(|_| invalid())?;
                Ok(Self::v6(Ipv6Addr::from(octets)))
            }
        }
    }

    /// Address family
    #[inline]
    pub fn version(&self) -> IpVersion {
        self.version
    }

    /// Width of the address family in bits
    #[inline]
    pub fn width(&self) -> u8 {
        self.version.width()
    }

    /// Integer value of the address
    #[inline]
    pub fn bits(&self) -> u128 {
        self.bits
    }

    /// Bit at `index`, counting from the most significant bit of the family
    #[inline]
    pub fn bit(&self, index: u8) -> bool {
        debug_assert!(index < self.width());
        (self.bits >> (self.width() - 1 - index)) & 1 == 1
    }

    /// Keep the top `prefix_len` bits and clear the rest
    #[inline]
    pub fn mask(&self, prefix_len: u8) -> Self {
        Self {
            version: self.version,
            bits: self.bits & !host_mask(self.version, prefix_len),
        }
    }

    /// Set every bit below `prefix_len`
    #[inline]
    pub fn fill(&self, prefix_len: u8) -> Self {
        Self {
            version: self.version,
            bits: self.bits | host_mask(self.version, prefix_len),
        }
    }

    /// Number of trailing zero bits, capped at the family width
    #[inline]
    pub fn trailing_zeros(&self) -> u8 {
        (self.bits.trailing_zeros() as u8).min(self.width())
    }

    /// The following address, or `None` at the top of the address space
    #[inline]
    pub fn checked_next(&self) -> Option<Self> {
        self.bits
            .checked_add(1)
            .and_then(|bits| Self::from_bits(bits, self.version))
    }

    /// Convert to a standard library address
    pub fn to_ip_addr(&self) -> IpAddr {
        match self.version {
            IpVersion::V4 => IpAddr::V4(Ipv4Addr::from(self.bits as u32)),
            IpVersion::V6 => IpAddr::V6(Ipv6Addr::from(self.bits)),
        }
    }
}

/// Mask of the `width - prefix_len` low-order bits
#[inline]
pub(crate) fn host_mask(version: IpVersion, prefix_len: u8) -> u128 {
    let host_bits = version.width().saturating_sub(prefix_len) as u32;
    if host_bits == 0 {
        0
    } else {
        u128::MAX >> (128 - host_bits)
    }
}

impl From<IpAddr> for Address {
    fn from(addr: IpAddr) -> Self {
        match addr {
            IpAddr::V4(v4) => Self::v4(v4),
            IpAddr::V6(v6) => Self::v6(v6),
        }
    }
}

impl From<Ipv4Addr> for Address {
    fn from(addr: Ipv4Addr) -> Self {
        Self::v4(addr)
    }
}

impl From<Ipv6Addr> for Address {
    fn from(addr: Ipv6Addr) -> Self {
        Self::v6(addr)
    }
}

impl From<Address> for IpAddr {
    fn from(addr: Address) -> Self {
        addr.to_ip_addr()
    }
}

impl FromStr for Address {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<IpAddr>()
            .map(Self::from)
            .map_err(|_| ParseError::InvalidAddress(s.to_string()))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.to_ip_addr().fmt(f)
    }
}

impl Serialize for Address {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
