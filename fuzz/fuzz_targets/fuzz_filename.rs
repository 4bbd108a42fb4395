#![no_main]

use libfuzzer_sys::fuzz_target;
use stowage_fs::{desanitize, sanitize};

fuzz_target!(|data: &[u8]| {
    // Arbitrary directory entries must never panic the decoder
    if let Ok(name) = std::str::from_utf8(data) {
        if let Some(raw) = desanitize(name) {
            // Anything accepted re-encodes to the same name
            assert_eq!(sanitize(&raw), name);
        }

        let encoded = sanitize(name);
        assert!(!encoded.contains('/'));
        assert!(!encoded.contains('='));
        assert_eq!(desanitize(&encoded).as_deref(), Some(name).filter(|n| !n.is_empty()));
    }
});
