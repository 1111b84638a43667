// Longest-prefix-match behaviour of the trie and the ASN index
//
// Covers insertion order independence, nesting, misses, family isolation
// and overwrite semantics.

use asnmap::{Address, AsnIndex, NotFoundError, PrefixBlock, PrefixTrie};

fn addr(s: &str) -> Address {
    s.parse().unwrap()
}

fn block(s: &str) -> PrefixBlock {
    s.parse().unwrap()
}

#[test]
fn test_ip_specific_before_subnet() {
    // /32 loaded BEFORE the /24 it belongs to
    let mut index = AsnIndex::new();
    index.add_record("192.0.2.1 192.0.2.1 65001 ZZ SINGLE").unwrap();
    index.add_record("192.0.2.0 192.0.2.255 65002 ZZ SUBNET").unwrap();

    let m = index.lookup_match(addr("192.0.2.1")).unwrap();
    assert_eq!(
        m.block.prefix_len(),
        32,
        "Expected /32 prefix length, got /{}",
        m.block.prefix_len()
    );
    assert_eq!(m.record.network, "SINGLE");

    let m = index.lookup_match(addr("192.0.2.2")).unwrap();
    assert_eq!(m.block.prefix_len(), 24);
    assert_eq!(m.record.network, "SUBNET");
}

#[test]
fn test_ip_specific_after_subnet() {
    let mut index = AsnIndex::new();
    index.add_record("192.0.2.0 192.0.2.255 65002 ZZ SUBNET").unwrap();
    index.add_record("192.0.2.1 192.0.2.1 65001 ZZ SINGLE").unwrap();

    assert_eq!(index.lookup(addr("192.0.2.1")).unwrap().network, "SINGLE");
    assert_eq!(index.lookup(addr("192.0.2.0")).unwrap().network, "SUBNET");
}

#[test]
fn test_multiple_overlapping_prefixes() {
    // Added in order: /8 -> /32 -> /24
    let mut trie = PrefixTrie::new();
    trie.insert(block("192.0.0.0/8"), "8");
    trie.insert(block("192.0.2.1/32"), "32");
    trie.insert(block("192.0.2.0/24"), "24");

    let level = |ip: &str| *trie.longest_prefix_match(addr(ip)).unwrap().1;
    assert_eq!(level("192.0.2.1"), "32");
    assert_eq!(level("192.0.2.2"), "24");
    assert_eq!(level("192.0.3.1"), "8");
    assert_eq!(level("192.255.255.255"), "8");
    assert!(trie.longest_prefix_match(addr("193.0.0.0")).is_none());
}

#[test]
fn test_most_specific_wins() {
    let mut trie = PrefixTrie::new();
    trie.insert(block("198.51.100.0/24"), 'A');
    trie.insert(block("198.51.100.16/28"), 'B');

    for host in 0..=255u32 {
        let a = addr(&format!("198.51.100.{host}"));
        let expected = if (16..32).contains(&host) { 'B' } else { 'A' };
        assert_eq!(
            *trie.longest_prefix_match(a).unwrap().1,
            expected,
            "198.51.100.{host}"
        );
    }
}

#[test]
fn test_round_trip_every_address_in_block() {
    let mut trie = PrefixTrie::new();
    let b = block("203.0.113.64/26");
    trie.insert(b, 7u32);

    let base = b.base().bits();
    for offset in 0..64u128 {
        let a = Address::from_bits(base + offset, b.version()).unwrap();
        let (matched, value) = trie.longest_prefix_match(a).unwrap();
        assert_eq!(*value, 7);
        assert_eq!(matched, b);
    }
    assert!(trie.longest_prefix_match(addr("203.0.113.63")).is_none());
    assert!(trie.longest_prefix_match(addr("203.0.113.128")).is_none());
}

#[test]
fn test_miss_is_not_found() {
    let mut index = AsnIndex::new();
    assert_eq!(index.lookup(addr("1.1.1.1")), Err(NotFoundError));

    index.add_record("1.0.0.0 1.0.0.255 13335 US CLOUDFLARENET").unwrap();
    assert_eq!(index.lookup(addr("1.1.1.1")), Err(NotFoundError));
    assert_eq!(index.lookup(addr("0.255.255.255")), Err(NotFoundError));
    assert_eq!(index.lookup(addr("1.0.1.0")), Err(NotFoundError));
}

#[test]
fn test_version_isolation() {
    let mut index = AsnIndex::new();
    index.add_record(":: ::ffff:ffff 1 ZZ V6LOW").unwrap();
    assert!(index.lookup(addr("0.0.0.1")).is_err());
    assert!(index.lookup(addr("255.255.255.255")).is_err());

    index.add_record("0.0.0.0 255.255.255.255 2 ZZ V4ALL").unwrap();
    assert_eq!(index.lookup(addr("0.0.0.1")).unwrap().network, "V4ALL");
    assert_eq!(index.lookup(addr("::1")).unwrap().network, "V6LOW");
    assert!(index.lookup(addr("2001:db8::1")).is_err());
}

#[test]
fn test_ipv4_mapped_ipv6_is_separate() {
    let mut index = AsnIndex::new();
    index.add_record("1.0.0.0 1.0.0.255 13335 US CLOUDFLARENET").unwrap();
    assert!(index.lookup(addr("::ffff:1.0.0.5")).is_err());
}

#[test]
fn test_idempotent_reinsertion() {
    let mut trie = PrefixTrie::new();
    trie.insert(block("10.0.0.0/8"), 1);
    let nodes = trie.node_count();
    trie.insert(block("10.0.0.0/8"), 1);

    assert_eq!(trie.node_count(), nodes);
    assert_eq!(trie.len(), 1);
    assert_eq!(*trie.longest_prefix_match(addr("10.2.3.4")).unwrap().1, 1);

    assert_eq!(trie.insert(block("10.0.0.0/8"), 2), Some(1));
    assert_eq!(*trie.longest_prefix_match(addr("10.2.3.4")).unwrap().1, 2);
}

#[test]
fn test_overlapping_ranges_in_feed() {
    // A later, narrower range splits an earlier one
    let mut index = AsnIndex::new();
    index.add_record("10.0.0.0 10.0.0.255 100 ZZ OUTER").unwrap();
    index.add_record("10.0.0.10 10.0.0.20 200 ZZ INNER").unwrap();

    assert_eq!(index.lookup(addr("10.0.0.9")).unwrap().asn, 100);
    for host in 10..=20 {
        assert_eq!(index.lookup(addr(&format!("10.0.0.{host}"))).unwrap().asn, 200);
    }
    assert_eq!(index.lookup(addr("10.0.0.21")).unwrap().asn, 100);
}

#[test]
fn test_end_to_end_scenarios() {
    let mut index = AsnIndex::new();
    index
        .add_record("1.0.0.0  1.0.0.255  13335  US  CLOUDFLARENET")
        .unwrap();
    let record = index.lookup(addr("1.0.0.5")).unwrap();
    assert_eq!(
        (record.asn, record.country.as_str(), record.network.as_str()),
        (13335, "US", "CLOUDFLARENET")
    );
    assert!(index.lookup(addr("1.0.1.5")).is_err());

    assert_eq!(index.add_record("10.0.0.0 10.0.0.2 64512 ZZ THREE").unwrap(), 2);
    assert_eq!(
        index.lookup_match(addr("10.0.0.0")).unwrap().block,
        block("10.0.0.0/31")
    );
    assert_eq!(
        index.lookup_match(addr("10.0.0.1")).unwrap().block,
        block("10.0.0.0/31")
    );
    assert_eq!(
        index.lookup_match(addr("10.0.0.2")).unwrap().block,
        block("10.0.0.2/32")
    );
    assert!(index.lookup(addr("10.0.0.3")).is_err());
}
