//! Property tests for range decomposition
//!
//! For arbitrary inclusive ranges the emitted blocks must tile the range
//! exactly, in ascending order, and each block must be the largest aligned
//! block that fits at its base address.

use asnmap::{decompose_range, Address, IpVersion, PrefixBlock};
use proptest::prelude::*;

/// Check exact tiling and greedy maximality of `blocks` over `[start, end]`
fn check_cover(start: Address, end: Address, blocks: &[PrefixBlock]) {
    assert!(!blocks.is_empty());
    assert_eq!(blocks[0].first(), start, "first block must start the range");
    assert_eq!(
        blocks[blocks.len() - 1].last(),
        end,
        "last block must end the range"
    );

    for pair in blocks.windows(2) {
        // Adjacent with no gap and no overlap implies sorted and disjoint
        assert_eq!(
            pair[0].last().checked_next(),
            Some(pair[1].first()),
            "{} and {} are not adjacent",
            pair[0],
            pair[1]
        );
    }

    for block in blocks {
        assert!(block.base() >= start && block.last() <= end);
        if block.prefix_len() == 0 {
            continue;
        }
        // The next-larger block at the same base either is misaligned or
        // runs past the end of the range
        let parent = PrefixBlock::new(block.base(), block.prefix_len() - 1).unwrap();
        assert!(
            parent.first() != block.base() || parent.last() > end,
            "{} could have been {}",
            block,
            parent
        );
    }
}

fn v4(bits: u32) -> Address {
    Address::from_bits(bits as u128, IpVersion::V4).unwrap()
}

fn v6(bits: u128) -> Address {
    Address::from_bits(bits, IpVersion::V6).unwrap()
}

proptest! {
    #[test]
    fn prop_v4_small_ranges(start in any::<u32>(), len in 0u32..4096) {
        let end = start.saturating_add(len);
        let blocks = decompose_range(v4(start), v4(end)).unwrap();
        check_cover(v4(start), v4(end), &blocks);
        let total: u64 = blocks.iter().map(|b| 1u64 << (32 - b.prefix_len())).sum();
        prop_assert_eq!(total, (end - start) as u64 + 1);
    }

    #[test]
    fn prop_v4_arbitrary_ranges(a in any::<u32>(), b in any::<u32>()) {
        let (start, end) = if a <= b { (a, b) } else { (b, a) };
        let blocks = decompose_range(v4(start), v4(end)).unwrap();
        check_cover(v4(start), v4(end), &blocks);
        prop_assert!(blocks.len() <= 62);
    }

    #[test]
    fn prop_v6_arbitrary_ranges(a in any::<u128>(), b in any::<u128>()) {
        let (start, end) = if a <= b { (a, b) } else { (b, a) };
        let blocks = decompose_range(v6(start), v6(end)).unwrap();
        check_cover(v6(start), v6(end), &blocks);
        prop_assert!(blocks.len() <= 254);
    }

    #[test]
    fn prop_aligned_block_is_single(bits in any::<u32>(), prefix_len in 0u8..=32) {
        let block = PrefixBlock::new(v4(bits), prefix_len).unwrap();
        let blocks = decompose_range(block.first(), block.last()).unwrap();
        prop_assert_eq!(blocks, vec![block]);
    }
}

#[test]
fn test_ranges_touching_top_of_space() {
    for start in [0xFFFF_FF00u32, 0xFFFF_FFF7, 0xFFFF_FFFF, 0x8000_0001] {
        let blocks = decompose_range(v4(start), v4(u32::MAX)).unwrap();
        check_cover(v4(start), v4(u32::MAX), &blocks);
    }
    let blocks = decompose_range(v6(1), v6(u128::MAX)).unwrap();
    check_cover(v6(1), v6(u128::MAX), &blocks);
    assert_eq!(blocks.len(), 128);
}

#[test]
fn test_worst_case_block_count() {
    // 0.0.0.1 - 255.255.255.254 needs two blocks per host-bit level but the top
    let blocks = decompose_range(v4(1), v4(u32::MAX - 1)).unwrap();
    check_cover(v4(1), v4(u32::MAX - 1), &blocks);
    assert_eq!(blocks.len(), 62);
}
