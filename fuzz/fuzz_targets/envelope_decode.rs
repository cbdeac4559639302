//! Fuzz target for envelope and payload decoding
//!
//! This fuzzer tests the JSON wire decoders with:
//! - Malformed JSON text
//! - Type confusion (valid envelope, wrong body shape for the event)
//! - Oversized frames
//! - Event names outside the protocol vocabulary
//!
//! The fuzzer should NEVER panic. All invalid inputs must return an error.

#![no_main]

use libfuzzer_sys::fuzz_target;
use parley_proto::{ClientPayload, Envelope, ServerPayload};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    // Structural decode must never panic.
    let Ok(envelope) = Envelope::decode(text) else {
        return;
    };

    // Typed decode in both directions must never panic, only return Err
    // for bodies that don't match the event's shape.
    let _ = ServerPayload::from_envelope(&envelope);
    let _ = ClientPayload::from_envelope(&envelope);

    // Anything that decoded structurally must re-encode.
    let _ = envelope.encode();
});
