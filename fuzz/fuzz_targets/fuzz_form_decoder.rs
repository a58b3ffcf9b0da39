//! Fuzz target: `decode_form_text`
//!
//! Drives arbitrary form values through the display-text decoder and
//! asserts that it never panics and never yields more than the display
//! buffer holds.
//!
//! cargo fuzz run fuzz_form_decoder

#![no_main]

use libfuzzer_sys::fuzz_target;
use weather_io::app::form::{DISPLAY_TEXT_CAPACITY, decode_form_text};

fuzz_target!(|data: &[u8]| {
    let Ok(raw) = core::str::from_utf8(data) else {
        return;
    };

    if let Ok(decoded) = decode_form_text::<DISPLAY_TEXT_CAPACITY>(raw) {
        assert!(decoded.text.len() <= DISPLAY_TEXT_CAPACITY);
        // Without escapes or '+', anything that fits comes back verbatim.
        if !decoded.truncated && !raw.contains(['%', '+']) {
            assert_eq!(decoded.text.as_str(), raw);
        }
    }
});
