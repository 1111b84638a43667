#![no_main]
use libfuzzer_sys::fuzz_target;
use asnmap::AsnIndex;

fuzz_target!(|data: &[u8]| {
    if let Ok(line) = std::str::from_utf8(data) {
        let mut index = AsnIndex::new();
        // Malformed lines must be rejected without touching the index
        if index.add_record(line).is_err() {
            assert!(index.is_empty());
            assert_eq!(index.record_count(), 0);
        }
    }
});
