//! Fuzz target for archive decoding with arbitrary byte input.
//!
//! Extraction runs in test mode, so nothing touches the filesystem and every
//! record, name and content length in the input is parsed and drained.
//!
//! Run with: cargo +nightly fuzz run extract_bytes

#![no_main]

use libfuzzer_sys::fuzz_target;
use ntfs_streams::{ArchiveReader, ExtractOptions, NoProgress};

fuzz_target!(|data: &[u8]| {
    // We don't care about the result - we're looking for panics or hangs
    if let Ok(reader) = ArchiveReader::new(data, "fuzz") {
        let _ = reader.extract("", &ExtractOptions::new().test(true), NoProgress);
    }
});
