#![no_main]
use libfuzzer_sys::fuzz_target;
use asnmap::{decompose_range, Address, IpVersion};

fuzz_target!(|input: (bool, u128, u128)| {
    let (v6, a, b) = input;
    let (version, mask) = if v6 {
        (IpVersion::V6, u128::MAX)
    } else {
        (IpVersion::V4, u32::MAX as u128)
    };
    let (lo, hi) = if (a & mask) <= (b & mask) {
        (a & mask, b & mask)
    } else {
        (b & mask, a & mask)
    };
    let (Some(start), Some(end)) = (
        Address::from_bits(lo, version),
        Address::from_bits(hi, version),
    ) else {
        return;
    };

    let blocks = decompose_range(start, end).expect("ordered same-version range");
    assert_eq!(blocks.first().map(|b| b.first()), Some(start));
    assert_eq!(blocks.last().map(|b| b.last()), Some(end));
    for pair in blocks.windows(2) {
        assert_eq!(pair[0].last().checked_next(), Some(pair[1].first()));
    }
});
