//! Fuzz target: `LineDecoder::feed`
//!
//! Drives arbitrary byte sequences into the streaming line decoder and
//! asserts that it never panics, never yields framing bytes, and accepts
//! input cleanly again after a reset.
//!
//! cargo fuzz run fuzz_line_decoder

#![no_main]

use libfuzzer_sys::fuzz_target;
use quakeguard::server::codec::{LineDecoder, MAX_LINE};

fuzz_target!(|data: &[u8]| {
    let mut decoder = LineDecoder::new();

    // Feed the raw bytes, split at an input-derived point so both the
    // whole-buffer and the resumed-mid-line paths get exercised.
    let cut = if data.is_empty() {
        0
    } else {
        data[0] as usize % data.len()
    };
    decoder.feed(&data[..cut], |line| {
        assert!(!line.is_empty(), "decoder must not yield empty lines");
        assert!(line.len() <= MAX_LINE, "line exceeds the frame limit");
        assert!(!line.contains('\n') && !line.contains('\r'));
    });
    decoder.feed(&data[cut..], |line| {
        assert!(!line.is_empty());
        assert!(line.len() <= MAX_LINE);
        assert!(!line.contains('\n') && !line.contains('\r'));
    });

    // After a reset the decoder must accept bytes cleanly again.
    decoder.reset();
    decoder.feed(data, |_| {});
});
