//! Control surface — the request-side handlers.
//!
//! ```text
//!   /iocontrol.cgi ──▶ set_actuator ──▶ SharedState.actuator   ──▶ View
//!   /settxt.cgi    ──▶ set_text     ──▶ TextSink               ──▶ View
//!   <!--#tag-->    ──▶ render_tag   ◀── SharedState.actuator
//! ```
//!
//! Command handlers validate every parameter before touching shared state:
//! on any error the actuator is left exactly as it was and the error view
//! is selected.

use core::fmt;

use log::{debug, info, warn};

use super::form::{DISPLAY_TEXT_CAPACITY, decode_form_text};
use super::ports::{ParamSource, TextSink};
use super::tags::{self, Tag};
use crate::error::ParamError;
use crate::shared::{ActuatorState, Percent, SharedState};

/// Presence-flag parameter: present means LED on.
pub const PARAM_LED_ON: &str = "LEDOn";
pub const PARAM_SPEED: &str = "speed_percent";
pub const PARAM_TEXT: &str = "DispText";

// ───────────────────────────────────────────────────────────────
// Endpoints and views
// ───────────────────────────────────────────────────────────────

/// Command endpoints, statically mapped to their handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    IoControl,
    SetText,
}

impl Endpoint {
    pub const ALL: [Endpoint; 2] = [Endpoint::IoControl, Endpoint::SetText];

    pub const fn uri(self) -> &'static str {
        match self {
            Self::IoControl => "/iocontrol.cgi",
            Self::SetText => "/settxt.cgi",
        }
    }

    /// Match a request URI (query string ignored).
    pub fn from_uri(uri: &str) -> Option<Self> {
        let path = uri.split('?').next().unwrap_or(uri);
        Self::ALL.into_iter().find(|e| e.uri() == path)
    }
}

/// Response page a handler selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Default,
    ParamError,
}

impl View {
    pub const ALL: [View; 2] = [View::Default, View::ParamError];

    pub const fn uri(self) -> &'static str {
        match self {
            Self::Default => "/io_cgi.ssi",
            Self::ParamError => "/perror.htm",
        }
    }

    pub fn from_uri(uri: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.uri() == uri)
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.uri())
    }
}

// ───────────────────────────────────────────────────────────────
// Parameter validation
// ───────────────────────────────────────────────────────────────

/// Validate the set-actuator parameters without touching shared state.
pub fn parse_actuator(params: &impl ParamSource) -> Result<ActuatorState, ParamError> {
    let led_on = params.has(PARAM_LED_ON);
    let raw = params
        .param(PARAM_SPEED)
        .ok_or(ParamError::Missing(PARAM_SPEED))?;
    // Decimal digits with an optional leading minus; `i64::from_str` alone
    // would also take a `+` sign.
    let digits = raw.strip_prefix('-').unwrap_or(raw);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParamError::NotANumber(PARAM_SPEED));
    }
    let value: i64 = raw
        .parse()
        .map_err(|_| ParamError::NotANumber(PARAM_SPEED))?;
    let speed = Percent::new(value).ok_or(ParamError::OutOfRange(PARAM_SPEED))?;
    Ok(ActuatorState { led_on, speed })
}

// ───────────────────────────────────────────────────────────────
// ControlSurface
// ───────────────────────────────────────────────────────────────

pub struct ControlSurface<'a, T> {
    shared: &'a SharedState,
    text_sink: T,
}

impl<'a, T: TextSink> ControlSurface<'a, T> {
    pub fn new(shared: &'a SharedState, text_sink: T) -> Self {
        Self { shared, text_sink }
    }

    pub fn shared(&self) -> &'a SharedState {
        self.shared
    }

    pub fn text_sink(&self) -> &T {
        &self.text_sink
    }

    /// Route a command to its handler.
    pub fn dispatch(&mut self, endpoint: Endpoint, params: &impl ParamSource) -> View {
        match endpoint {
            Endpoint::IoControl => self.set_actuator(params),
            Endpoint::SetText => self.set_text(params),
        }
    }

    /// Replace LED and speed in one store, or select the error view.
    pub fn set_actuator(&self, params: &impl ParamSource) -> View {
        match parse_actuator(params) {
            Ok(state) => {
                self.shared.set_actuator(state);
                info!(
                    "Control: LED {}, speed {}%",
                    if state.led_on { "on" } else { "off" },
                    state.speed.get()
                );
                View::Default
            }
            Err(e) => {
                warn!("Control: rejected {}: {}", Endpoint::IoControl.uri(), e);
                View::ParamError
            }
        }
    }

    /// Decode the display text and forward it to the text sink.
    pub fn set_text(&mut self, params: &impl ParamSource) -> View {
        let Some(raw) = params.param(PARAM_TEXT) else {
            warn!("Control: rejected {}: {}", Endpoint::SetText.uri(), ParamError::Missing(PARAM_TEXT));
            return View::ParamError;
        };

        match decode_form_text::<DISPLAY_TEXT_CAPACITY>(raw) {
            Ok(decoded) => {
                if decoded.truncated {
                    debug!("Control: display text truncated to {} bytes", decoded.text.len());
                }
                self.text_sink.show(&decoded.text);
                View::Default
            }
            Err(e) => {
                warn!(
                    "Control: rejected {}: {} ({})",
                    Endpoint::SetText.uri(),
                    ParamError::Undecodable(PARAM_TEXT),
                    e
                );
                View::ParamError
            }
        }
    }

    /// Render a status tag (`None` = unrecognised) into `buf`.
    pub fn render_tag(&self, tag: Option<Tag>, buf: &mut [u8]) -> usize {
        tags::render(tag, self.shared.actuator(), buf)
    }

    /// Render a tag by its template name.
    pub fn render_named(&self, name: &str, buf: &mut [u8]) -> usize {
        self.render_tag(Tag::from_name(name), buf)
    }
}
