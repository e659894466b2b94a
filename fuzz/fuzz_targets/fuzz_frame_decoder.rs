//! Fuzz target: `codec::decode`
//!
//! Treats arbitrary bytes as the contents between the frame markers and
//! asserts that decoding never panics, that a decoded payload stays inside
//! the input, and that anything which decodes and verifies re-encodes to
//! the same bytes.
//!
//! cargo fuzz run fuzz_frame_decoder

#![no_main]

use echarger::protocol::codec::{self, encode_to_vec};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(view) = codec::decode(data) else {
        return;
    };
    assert!(view.payload.len() <= data.len(), "payload escapes the input");

    if view.verify().is_ok() && view.trailer[..2] == codec::FILLER {
        if let Ok(wire) = encode_to_vec(view.source, view.destination, view.command, view.payload) {
            let used = codec::HEADER_LEN + view.payload.len() + codec::TRAILER_LEN;
            assert_eq!(&wire[2..wire.len() - 2], &data[..used]);
        }
    }
});
