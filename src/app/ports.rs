//! Port traits — the boundary between the station core and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ TickScheduler / AcquisitionLoop / ControlSurface
//! ```
//!
//! Transducer drivers, the request layer, log sinks and the platform idle
//! primitive implement these traits.  The core consumes them via generics
//! (or `dyn` where heterogeneous drivers share one collection), so it never
//! touches hardware directly.

use crate::error::SensorError;
use crate::shared::{Channel, SharedState};
use crate::tick::TelemetryFrame;

// ───────────────────────────────────────────────────────────────
// Transducer port (driven adapter: hardware → acquisition loop)
// ───────────────────────────────────────────────────────────────

/// Result of advancing a transducer's measurement sequence by one step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// The sequence moved (or is waiting); no value yet.
    Pending,
    /// A measurement completed with this value, in the channel's unit.
    Done(f32),
    /// The step failed; the sequence must be restarted.
    Failed(SensorError),
}

/// A multi-step, non-blocking measurement protocol for one channel.
pub trait Transducer {
    /// The channel this transducer feeds.
    fn channel(&self) -> Channel;

    /// Perform at most one bus transaction and report progress.
    fn advance(&mut self) -> Step;

    /// Return to the start of the measurement sequence after a failure.
    fn restart(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Request parameter port (driving adapter: HTTP/CGI → control surface)
// ───────────────────────────────────────────────────────────────

/// Name → raw value lookup over an incoming request's parameters.
pub trait ParamSource {
    /// Raw (still percent-encoded) value of `name`, or `None` if absent.
    /// A parameter given without `=value` is present with an empty value.
    fn param(&self, name: &str) -> Option<&str>;

    fn has(&self, name: &str) -> bool {
        self.param(name).is_some()
    }
}

// ───────────────────────────────────────────────────────────────
// Output sinks (driven adapters: core → UART / log / network)
// ───────────────────────────────────────────────────────────────

/// Receives one telemetry frame per closed sampling window.
///
/// Called from tick (interrupt) context: implementations must not block.
pub trait TelemetrySink {
    fn emit(&mut self, frame: &TelemetryFrame);
}

/// Receives decoded display text from the set-text endpoint.
pub trait TextSink {
    fn show(&mut self, text: &str);
}

// ───────────────────────────────────────────────────────────────
// Platform hooks
// ───────────────────────────────────────────────────────────────

/// Periodic work the platform needs on every tick, before any sampling
/// bookkeeping (network stack timers, animation pacing, ...).
pub trait Housekeeping {
    fn on_tick(&mut self, shared: &SharedState);
}

impl Housekeeping for () {
    fn on_tick(&mut self, _shared: &SharedState) {}
}

/// The low-power wait used when every channel is fresh.
///
/// Implementations must return no later than the next tick.
pub trait IdleWait {
    fn wait_for_interrupt(&mut self);
}

/// The user LED output.
pub trait LedPort {
    fn set_led(&mut self, on: bool);
}
