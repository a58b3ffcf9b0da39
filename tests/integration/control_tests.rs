//! Request-side flow: URI in, shared state updated, page out.

use weather_io::adapters::query::QueryParams;
use weather_io::adapters::request;
use weather_io::app::control::{ControlSurface, Endpoint, View};
use weather_io::app::ssi;
use weather_io::app::tags::{FORM_VARS_FOOTER, FORM_VARS_HEADER, Tag};
use weather_io::shared::{ActuatorState, Percent, SharedState};

use crate::mock_bus::TextLog;

#[test]
fn io_control_updates_state_and_page() {
    let shared = SharedState::new();
    let mut surface = ControlSurface::new(&shared, TextLog::default());

    let page = request::respond(&mut surface, "/iocontrol.cgi?LEDOn=1&speed_percent=42").unwrap();
    assert_eq!(
        shared.actuator(),
        ActuatorState {
            led_on: true,
            speed: Percent::new(42).unwrap()
        }
    );
    assert!(page.contains(FORM_VARS_HEADER));
    assert!(page.contains("ls=1;\nsp=42;\n"));
    assert!(page.contains(FORM_VARS_FOOTER));
    assert!(page.contains("<td>ON</td>"));
    assert!(page.contains("<td>42%</td>"));
    assert!(!page.contains("<!--#"), "every include expanded");
}

#[test]
fn absent_led_flag_turns_led_off() {
    let shared = SharedState::new();
    let mut surface = ControlSurface::new(&shared, TextLog::default());

    request::respond(&mut surface, "/iocontrol.cgi?LEDOn=1&speed_percent=10").unwrap();
    let page = request::respond(&mut surface, "/iocontrol.cgi?speed_percent=10").unwrap();
    assert!(!shared.actuator().led_on);
    assert!(page.contains("<td>OFF</td>"));
}

#[test]
fn rejected_commands_leave_state_untouched() {
    let shared = SharedState::new();
    let mut surface = ControlSurface::new(&shared, TextLog::default());
    request::respond(&mut surface, "/iocontrol.cgi?LEDOn&speed_percent=75").unwrap();
    let before = shared.actuator();

    for uri in [
        "/iocontrol.cgi?LEDOn=1&speed_percent=101",
        "/iocontrol.cgi?speed_percent=-1",
        "/iocontrol.cgi?speed_percent=fast",
        "/iocontrol.cgi?speed_percent=",
        "/iocontrol.cgi?LEDOn=1",
        "/iocontrol.cgi",
    ] {
        assert_eq!(request::route(&mut surface, uri), Some(View::ParamError), "{uri}");
        assert_eq!(shared.actuator(), before, "{uri}");
    }

    let page = request::respond(&mut surface, "/iocontrol.cgi?speed_percent=200").unwrap();
    assert_eq!(page, ssi::PARAM_ERROR_PAGE);
}

#[test]
fn repeated_command_is_idempotent() {
    let shared = SharedState::new();
    let mut surface = ControlSurface::new(&shared, TextLog::default());

    let first = request::respond(&mut surface, "/iocontrol.cgi?LEDOn=1&speed_percent=30").unwrap();
    let state = shared.actuator();
    let second = request::respond(&mut surface, "/iocontrol.cgi?LEDOn=1&speed_percent=30").unwrap();
    assert_eq!(shared.actuator(), state);
    assert_eq!(first, second);
}

#[test]
fn speed_bounds_are_inclusive() {
    let shared = SharedState::new();
    let mut surface = ControlSurface::new(&shared, TextLog::default());

    assert_eq!(
        request::route(&mut surface, "/iocontrol.cgi?speed_percent=0"),
        Some(View::Default)
    );
    assert_eq!(shared.actuator().speed, Percent::ZERO);
    assert_eq!(
        request::route(&mut surface, "/iocontrol.cgi?speed_percent=100"),
        Some(View::Default)
    );
    assert_eq!(shared.actuator().speed, Percent::MAX);
}

#[test]
fn display_text_is_decoded_and_forwarded() {
    let shared = SharedState::new();
    let mut surface = ControlSurface::new(&shared, TextLog::default());

    assert_eq!(
        request::route(&mut surface, "/settxt.cgi?DispText=Hello+world%21"),
        Some(View::Default)
    );
    assert_eq!(
        request::route(&mut surface, "/settxt.cgi?DispText=caf%C3%A9"),
        Some(View::Default)
    );
    assert_eq!(surface.text_sink().shown, ["Hello world!", "café"]);
}

#[test]
fn bad_display_text_selects_error_view() {
    let shared = SharedState::new();
    let mut surface = ControlSurface::new(&shared, TextLog::default());

    assert_eq!(
        request::route(&mut surface, "/settxt.cgi?DispText=100%"),
        Some(View::ParamError)
    );
    assert_eq!(request::route(&mut surface, "/settxt.cgi"), Some(View::ParamError));
    assert!(surface.text_sink().shown.is_empty());
}

#[test]
fn long_display_text_is_truncated_to_capacity() {
    let shared = SharedState::new();
    let mut surface = ControlSurface::new(&shared, TextLog::default());
    let long = "x".repeat(200);
    let params = format!("DispText={long}");

    let view = surface.dispatch(Endpoint::SetText, &QueryParams::new(&params));
    assert_eq!(view, View::Default);
    assert_eq!(surface.text_sink().shown[0].len(), 47);
}

#[test]
fn unknown_tags_and_small_buffers() {
    let shared = SharedState::new();
    let surface = ControlSurface::new(&shared, TextLog::default());

    let mut buf = [0u8; 8];
    let n = surface.render_named("temperature", &mut buf);
    assert_eq!(&buf[..n], b"??");

    let mut tiny = [0u8; 4];
    let n = surface.render_tag(Some(Tag::FormVars), &mut tiny);
    assert_eq!(n, 4);
    assert_eq!(&tiny, b"<scr");

    let page = ssi::expand("a<!--#nope-->b<!--#speed-->c", &surface);
    assert_eq!(page, "a??b0%c");
}

#[test]
fn unknown_paths_are_not_served() {
    let shared = SharedState::new();
    let mut surface = ControlSurface::new(&shared, TextLog::default());
    assert!(request::respond(&mut surface, "/index.html").is_none());
    assert!(request::respond(&mut surface, "/iocontrol").is_none());
    assert_eq!(request::route(&mut surface, View::ParamError.uri()), Some(View::ParamError));
}
