//! Fuzz target: request routing and page rendering
//!
//! Feeds arbitrary request URIs to the control surface and asserts that the
//! actuator state only changes on a successful set-actuator command and
//! always stays in range.
//!
//! cargo fuzz run fuzz_request_uri

#![no_main]

use libfuzzer_sys::fuzz_target;
use weather_io::adapters::request;
use weather_io::app::control::{ControlSurface, Endpoint, View};
use weather_io::app::ports::TextSink;
use weather_io::shared::SharedState;

struct Discard;

impl TextSink for Discard {
    fn show(&mut self, _text: &str) {}
}

fuzz_target!(|data: &[u8]| {
    let Ok(uri) = core::str::from_utf8(data) else {
        return;
    };

    let shared = SharedState::new();
    let mut surface = ControlSurface::new(&shared, Discard);
    let before = shared.actuator();

    let view = request::route(&mut surface, uri);
    let after = shared.actuator();
    assert!(after.speed.get() <= 100);
    if after != before {
        assert_eq!(Endpoint::from_uri(uri), Some(Endpoint::IoControl));
        assert_eq!(view, Some(View::Default));
    }

    if let Some(page) = request::respond(&mut surface, uri) {
        assert!(!page.is_empty());
    }
});
