//! Error types for the asnmap library

use crate::address::IpVersion;
use thiserror::Error;

/// Result type alias for feed parsing
pub type Result<T> = std::result::Result<T, ParseError>;

/// A feed line, IP literal or ASN that could not be parsed
///
/// Every variant is attributable to a single input line. Callers decide
/// whether to skip the line or abort the load.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Fewer than the five required fields
    #[error("expected at least 5 fields, found {found}: {line:?}")]
    FieldCount {
        /// Number of whitespace-separated fields on the line
        found: usize,
        /// The offending line
        line: String,
    },

    /// IP literal that is neither dotted-decimal IPv4 nor IPv6
    #[error("invalid IP address: {0:?}")]
    InvalidAddress(String),

    /// ASN field is not a decimal integer
    #[error("invalid ASN: {0:?}")]
    InvalidAsn(String),

    /// CIDR text with a malformed or out-of-range prefix length
    #[error("invalid prefix: {0:?}")]
    InvalidPrefix(String),

    /// Range endpoints belong to different address families
    #[error("range endpoints differ in IP version: {start} is {start_version}, {end} is {end_version}")]
    VersionMismatch {
        /// Start of range as written
        start: String,
        /// End of range as written
        end: String,
        /// Version of the start address
        start_version: IpVersion,
        /// Version of the end address
        end_version: IpVersion,
    },

    /// Line is not valid UTF-8
    #[error("invalid UTF-8 at byte {offset}: {line:?}")]
    InvalidEncoding {
        /// Byte offset of the first invalid sequence
        offset: usize,
        /// The line with invalid sequences replaced
        line: String,
    },

    /// Range start is greater than its end
    #[error("range start {start} is after end {end}")]
    InvertedRange {
        /// Start of range as written
        start: String,
        /// End of range as written
        end: String,
    },
}

/// No loaded block covers the queried address
///
/// This is the common outcome for unrouted space, so it carries no payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no ASN record covers the address")]
pub struct NotFoundError;

/// Failure of a lookup from raw bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LookupError {
    /// No loaded block covers the address
    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    /// Byte slice length does not match the requested IP version
    #[error("{version} address needs {expected} bytes, got {actual}")]
    InvalidLength {
        /// Requested version
        version: IpVersion,
        /// Bytes required for that version
        expected: usize,
        /// Bytes supplied
        actual: usize,
    },
}

/// Internal consistency failure
///
/// Indicates a programming defect rather than bad input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    /// Block base address has bits set below its prefix length
    #[error("block base {base} has host bits set for /{prefix_len}")]
    NonCanonicalBase {
        /// Base address as given
        base: String,
        /// Prefix length as given
        prefix_len: u8,
    },

    /// Prefix length exceeds the width of the address family
    #[error("prefix length {prefix_len} exceeds {width}-bit {version} width")]
    PrefixTooLong {
        /// Address family
        version: IpVersion,
        /// Family width in bits
        width: u8,
        /// Offending prefix length
        prefix_len: u8,
    },
}

/// Failure while bulk-loading a feed
#[derive(Debug, Error)]
pub enum LoadError {
    /// Reading the feed failed
    #[error("I/O error reading feed: {0}")]
    Io(#[from] std::io::Error),

    /// A line was rejected under the abort policy
    #[error("line {line}: {source}")]
    Rejected {
        /// 1-based line number
        line: usize,
        /// Why the line was rejected
        #[source]
        source: ParseError,
    },

    /// More lines were rejected than the configured limit allows
    #[error("too many rejected lines ({rejected}, limit {limit})")]
    TooManyErrors {
        /// Lines rejected so far
        rejected: usize,
        /// Configured limit
        limit: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        assert_eq!(
            NotFoundError.to_string(),
            "no ASN record covers the address"
        );
    }

    #[test]
    fn test_lookup_error_from_not_found() {
        let err: LookupError = NotFoundError.into();
        assert_eq!(err, LookupError::NotFound(NotFoundError));
        assert_eq!(err.to_string(), NotFoundError.to_string());
    }

    #[test]
    fn test_load_error_keeps_source() {
        use std::error::Error as _;

        let err = LoadError::Rejected {
            line: 7,
            source: ParseError::InvalidAsn("ASx".to_string()),
        };
        assert!(err.to_string().starts_with("line 7:"));
        assert!(err.source().is_some());
    }
}
