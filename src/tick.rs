//! Fixed-rate tick handler and sampling-window bookkeeping.
//!
//! Runs in interrupt (timer) context at `tick_hz`.  Each tick it runs the
//! platform housekeeping, then, once the network is up, advances the window
//! counter.  When the window closes it captures every channel's last value,
//! hands one [`TelemetryFrame`] to the sink and clears the freshness flags.
//!
//! ```text
//!  tick ─▶ housekeeping ─▶ net ready? ──no──▶ return
//!                              │yes
//!                              ▼
//!                     window_ticks += 1
//!                              │
//!               window_ticks % ticks_per_window == 0 ?
//!                              │yes
//!                              ▼
//!             capture ─▶ sink.emit ─▶ clear ready[4], window_ticks = 0
//! ```
//!
//! Nothing here blocks or allocates: the frame is `Copy` and formats into a
//! fixed-capacity buffer.

use core::fmt;

use heapless::String;

use crate::app::ports::{Housekeeping, TelemetrySink};
use crate::shared::{Channel, SharedState};

/// Digits kept after the decimal point.
const FRACTION_DIGITS: u32 = 3;
const FRACTION_SCALE: f32 = 1000.0;

/// Capacity of a formatted telemetry line.
pub const TELEMETRY_LINE_CAPACITY: usize = 128;

// ═══════════════════════════════════════════════════════════════
//  Integer/fraction decomposition
// ═══════════════════════════════════════════════════════════════

/// A measurement split into sign, integer part and a fixed number of
/// fractional digits, so it can be printed without float formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Decimal {
    pub negative: bool,
    pub integer: u32,
    /// Fractional part scaled by 10^3, rounded.
    pub fraction: u16,
}

impl Decimal {
    pub fn from_f32(value: f32) -> Self {
        if !value.is_finite() {
            return Self::default();
        }

        let magnitude = value.abs();
        if magnitude >= i32::MAX as f32 {
            return Self {
                negative: value < 0.0,
                integer: i32::MAX as u32,
                fraction: 0,
            };
        }

        let mut integer = magnitude.trunc() as u32;
        let mut fraction = ((magnitude - magnitude.trunc()) * FRACTION_SCALE).round() as u32;
        if fraction >= FRACTION_SCALE as u32 {
            integer += 1;
            fraction = 0;
        }

        Self {
            negative: value < 0.0 && (integer != 0 || fraction != 0),
            integer,
            fraction: fraction as u16,
        }
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            f.write_str("-")?;
        }
        write!(
            f,
            "{}.{:0width$}",
            self.integer,
            self.fraction,
            width = FRACTION_DIGITS as usize
        )
    }
}

// ═══════════════════════════════════════════════════════════════
//  Telemetry frame
// ═══════════════════════════════════════════════════════════════

/// The four decoded channel values of one closed window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TelemetryFrame {
    pub values: [Decimal; Channel::COUNT],
}

impl TelemetryFrame {
    /// Decode every channel's last value (stale or fresh).
    pub fn capture(shared: &SharedState) -> Self {
        Self {
            values: shared.values().map(Decimal::from_f32),
        }
    }

    pub fn get(&self, channel: Channel) -> Decimal {
        self.values[channel.index()]
    }

    /// Format into a fixed-capacity line (no heap).
    pub fn to_line(&self) -> String<TELEMETRY_LINE_CAPACITY> {
        let mut line = String::new();
        let written = fmt::Write::write_fmt(&mut line, format_args!("{}", self));
        debug_assert!(written.is_ok(), "telemetry line exceeds {TELEMETRY_LINE_CAPACITY} bytes");
        line
    }
}

impl fmt::Display for TelemetryFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Temperature: {},  Humidity: {},  Pressure: {}, Light: {}",
            self.get(Channel::Temperature),
            self.get(Channel::Humidity),
            self.get(Channel::Pressure),
            self.get(Channel::Light),
        )
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tick scheduler
// ═══════════════════════════════════════════════════════════════

/// The tick-context half of the sampling discipline.
///
/// Holds only configuration; the window counter lives in [`SharedState`]
/// so status code can observe it.
#[derive(Debug, Clone, Copy)]
pub struct TickScheduler {
    ticks_per_window: u32,
}

impl TickScheduler {
    pub const fn new(ticks_per_window: u32) -> Self {
        Self {
            ticks_per_window: if ticks_per_window == 0 { 1 } else { ticks_per_window },
        }
    }

    pub const fn ticks_per_window(&self) -> u32 {
        self.ticks_per_window
    }

    /// Handle one tick.  Returns the frame emitted if this tick closed a
    /// sampling window.
    pub fn on_tick(
        &self,
        shared: &SharedState,
        housekeeping: &mut impl Housekeeping,
        sink: &mut impl TelemetrySink,
    ) -> Option<TelemetryFrame> {
        housekeeping.on_tick(shared);

        if !shared.is_net_ready() {
            return None;
        }

        let ticks = shared.advance_window();
        if ticks % self.ticks_per_window != 0 {
            return None;
        }

        let frame = TelemetryFrame::capture(shared);
        sink.emit(&frame);
        shared.close_window();
        Some(frame)
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
