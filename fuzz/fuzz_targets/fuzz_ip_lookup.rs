#![no_main]
use libfuzzer_sys::fuzz_target;
use asnmap::AsnIndex;
use std::net::IpAddr;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let mut index = AsnIndex::new();
        let _ = index.add_record("1.2.3.4 1.2.3.4 64500 ZZ HOST");
        let _ = index.add_record("10.0.0.0 10.255.255.255 64501 ZZ TEN");
        let _ = index.add_record("192.168.0.0 192.168.255.255 64502 ZZ PRIVATE");
        let _ = index.add_record("2001:db8:: 2001:db8::ffff 64503 ZZ DOC");

        // Tests address parsing edge cases and the trie walk
        let by_str = index.lookup_str(s);

        if let Ok(ip) = s.trim().parse::<IpAddr>() {
            let by_ip = index.lookup_ip(ip).ok();
            assert_eq!(by_str.ok().flatten().map(|m| m.record), by_ip);
        }
    }
});
