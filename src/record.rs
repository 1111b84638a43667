//! ASN records and feed line parsing
//!
//! A feed line looks like
//!
//! ```text
//! 1.0.0.0  1.0.0.255  13335  US  CLOUDFLARENET
//! ```
//!
//! Fields are separated by runs of whitespace; anything after the fifth
//! field is ignored.

use crate::address::Address;
use crate::error::{ParseError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Autonomous system metadata attached to one or more prefix blocks
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AsnRecord {
    /// Autonomous system number; 0 means unknown or not routed
    pub asn: u32,
    /// Country code as given by the feed
    pub country: String,
    /// Network or operator label
    pub network: String,
}

impl AsnRecord {
    /// Create a record
    pub fn new(asn: u32, country: impl Into<String>, network: impl Into<String>) -> Self {
        Self {
            asn,
            country: country.into(),
            network: network.into(),
        }
    }

    /// Whether the feed marks the range as not announced by any AS
    pub fn is_unrouted(&self) -> bool {
        self.asn == 0
    }
}

impl fmt::Display for AsnRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AS{} {} {}", self.asn, self.country, self.network)
    }
}

/// A parsed feed line: an inclusive address range and its record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedLine {
    /// First address of the range
    pub start: Address,
    /// Last address of the range
    pub end: Address,
    /// Metadata for the whole range
    pub record: AsnRecord,
}

/// Parse one feed line
pub fn parse_line(line: &str) -> Result<FeedLine> {
    let mut fields = line.split_whitespace();
    let mut take = || fields.next();
    let (Some(start), Some(end), Some(asn), Some(country), Some(network)) =
        (take(), take(), take(), take(), take())
    else {
        return Err(ParseError::FieldCount {
            found: line.split_whitespace().count(),
            line: line.to_string(),
        });
    };

    Ok(FeedLine {
        start: start.parse()?,
        end: end.parse()?,
        record: AsnRecord::new(parse_asn(asn)?, country, network),
    })
}

/// Parse an ASN, accepting an optional alphabetic marker such as `AS`
pub fn parse_asn(field: &str) -> Result<u32> {
    field
        .trim_start_matches(|c: char| c.is_ascii_alphabetic())
        .parse()
        .map_err(|_| ParseError::InvalidAsn(field.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line() {
        let parsed = parse_line("1.0.0.0\t1.0.0.255\t13335\tUS\tCLOUDFLARENET").unwrap();
        assert_eq!(parsed.start.to_string(), "1.0.0.0");
        assert_eq!(parsed.end.to_string(), "1.0.0.255");
        assert_eq!(parsed.record, AsnRecord::new(13335, "US", "CLOUDFLARENET"));
    }

    #[test]
    fn test_extra_fields_ignored() {
        let parsed = parse_line("1.0.0.0 1.0.0.255 13335 US CLOUDFLARENET extra junk").unwrap();
        assert_eq!(parsed.record.network, "CLOUDFLARENET");
    }

    #[test]
    fn test_runs_of_whitespace() {
        let parsed = parse_line("  10.0.0.0   10.0.0.2 \t 64512  ZZ   TEST  ").unwrap();
        assert_eq!(parsed.record.asn, 64512);
        assert_eq!(parsed.record.country, "ZZ");
    }

    #[test]
    fn test_too_few_fields() {
        let err = parse_line("1.0.0.0 1.0.0.255 13335 US").unwrap_err();
        assert_eq!(
            err,
            ParseError::FieldCount {
                found: 4,
                line: "1.0.0.0 1.0.0.255 13335 US".to_string()
            }
        );
        assert!(matches!(parse_line(""), Err(ParseError::FieldCount { found: 0, .. })));
    }

    #[test]
    fn test_bad_addresses() {
        assert_eq!(
            parse_line("1.0.0 1.0.0.255 13335 US X").unwrap_err(),
            ParseError::InvalidAddress("1.0.0".to_string())
        );
        assert_eq!(
            parse_line("1.0.0.0 zzz 13335 US X").unwrap_err(),
            ParseError::InvalidAddress("zzz".to_string())
        );
    }

    #[test]
    fn test_asn_marker_stripped() {
        assert_eq!(parse_asn("13335").unwrap(), 13335);
        assert_eq!(parse_asn("AS13335").unwrap(), 13335);
        assert_eq!(parse_asn("as64512").unwrap(), 64512);
        assert_eq!(parse_asn("0").unwrap(), 0);
        assert_eq!(parse_asn("4294967295").unwrap(), u32::MAX);
    }

    #[test]
    fn test_bad_asn() {
        for bad in ["AS", "AS-1", "-5", "12a", "4294967296", "1.5"] {
            assert_eq!(
                parse_asn(bad).unwrap_err(),
                ParseError::InvalidAsn(bad.to_string()),
                "{bad} should be rejected"
            );
        }
        assert!(matches!(
            parse_line("1.0.0.0 1.0.0.255 ASN? US X"),
            Err(ParseError::InvalidAsn(_))
        ));
    }

    #[test]
    fn test_unrouted() {
        assert!(AsnRecord::new(0, "None", "Not").is_unrouted());
        assert!(!AsnRecord::new(1, "US", "LVLT-1").is_unrouted());
    }

    #[test]
    fn test_display_and_serde() {
        let record = AsnRecord::new(13335, "US", "CLOUDFLARENET");
        assert_eq!(record.to_string(), "AS13335 US CLOUDFLARENET");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["asn"], 13335);
        assert_eq!(json["country"], "US");
    }
}
