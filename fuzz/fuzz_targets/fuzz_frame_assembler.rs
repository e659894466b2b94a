//! Fuzz target: `FrameAssembler::push` / `take_frame`
//!
//! Streams arbitrary bytes through the receive-side assembler with and
//! without checksum verification.  It must never panic, and every frame
//! it yields must fit the receive buffer.
//!
//! cargo fuzz run fuzz_frame_assembler

#![no_main]

use echarger::protocol::codec::MAX_PAYLOAD;
use echarger::protocol::receiver::FrameAssembler;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    for verify in [true, false] {
        let mut assembler = FrameAssembler::new();
        for &byte in data {
            assembler.push(byte);
            if let Some(Ok(frame)) = assembler.take_frame(verify) {
                assert!(frame.payload.len() <= MAX_PAYLOAD, "payload exceeds the receive buffer");
                assert!(frame.source <= 99 && frame.destination <= 99 && frame.command <= 99);
            }
        }
        // Whatever was completed has been handed out.
        assert!(assembler.take_frame(verify).is_none());
    }
});
