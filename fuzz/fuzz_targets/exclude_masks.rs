//! Fuzz target for exclusion mask parsing and matching.
//!
//! The first line of the input is parsed as `mask;mask;...`, the rest is
//! matched against it line by line.
//!
//! Run with: cargo +nightly fuzz run exclude_masks

#![no_main]

use libfuzzer_sys::fuzz_target;
use ntfs_streams::ExcludeSet;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let mut lines = text.lines();
    let Some(masks) = lines.next() else {
        return;
    };
    if let Ok(set) = ExcludeSet::parse(masks) {
        for name in lines {
            let _ = set.matches(name);
        }
    }
});
