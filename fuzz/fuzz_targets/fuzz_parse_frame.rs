#![no_main]

use libfuzzer_sys::fuzz_target;
use ubx_fuzz::ubx::frame::{compute_checksum, parse_frame, verify_checksum};
use ubx_fuzz::ubx::{classify_frame, Verdict};

fuzz_target!(|data: &[u8]| {
    // Must not panic on anything a receiver can send back
    let verified = verify_checksum(data);
    let _ = compute_checksum(data, data.len());

    if let Ok((rest, frame)) = parse_frame(data) {
        assert_eq!(frame.len(), frame.length() as usize + 8);
        assert_eq!(frame.len() + rest.len(), data.len());
        if rest.is_empty() {
            assert_eq!(frame.verify(), verified);
        }

        // Only the two acknowledgement frames pass.
        if matches!(classify_frame(&frame), Verdict::Ack | Verdict::Nak) {
            assert_eq!(frame.len(), 10);
            assert!(frame.verify());
        }
    }
});
