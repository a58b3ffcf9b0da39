//! Process-wide state shared between the tick interrupt, the acquisition
//! loop and the request handlers.
//!
//! ```text
//!                      ┌────────────────────────────────┐
//!  AcquisitionLoop ───▶│ readings[4]  value + ready     │◀─── TickScheduler
//!  (deposit)           │                                │     (read, clear)
//!                      │ actuator     led + speed (u16) │
//!  ControlSurface ────▶│ window_ticks / net_ready       │───▶ ControlSurface
//!  (command)           └────────────────────────────────┘     (status)
//! ```
//!
//! Every field is a single atomic word, so no compound value is ever
//! observable half-written across the interrupt boundary.  Each field has
//! exactly one writer role; the methods below are grouped by that role.

use core::sync::atomic::{AtomicBool, AtomicU16, AtomicU32, Ordering};

// ═══════════════════════════════════════════════════════════════
//  Channels
// ═══════════════════════════════════════════════════════════════

/// One of the four independent measurement sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Channel {
    Temperature = 0,
    Humidity = 1,
    Pressure = 2,
    Light = 3,
}

impl Channel {
    pub const COUNT: usize = 4;

    /// All channels in telemetry order.
    pub const ALL: [Channel; Self::COUNT] = [
        Channel::Temperature,
        Channel::Humidity,
        Channel::Pressure,
        Channel::Light,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    /// Label used in the telemetry line.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Temperature => "Temperature",
            Self::Humidity => "Humidity",
            Self::Pressure => "Pressure",
            Self::Light => "Light",
        }
    }

    pub const fn unit(self) -> &'static str {
        match self {
            Self::Temperature => "°C",
            Self::Humidity => "%RH",
            Self::Pressure => "Pa",
            Self::Light => "lux",
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Sensor readings
// ═══════════════════════════════════════════════════════════════

/// Latest value and freshness flag for one channel.
///
/// The value is stored as raw `f32` bits so a reader in another context
/// always sees either the old or the new measurement, never a mix.
pub struct SensorReading {
    value_bits: AtomicU32,
    ready: AtomicBool,
}

/// Point-in-time copy of a [`SensorReading`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReadingSnapshot {
    pub value: f32,
    pub ready: bool,
}

impl SensorReading {
    pub const fn new() -> Self {
        Self {
            value_bits: AtomicU32::new(0),
            ready: AtomicBool::new(false),
        }
    }

    /// Last completed measurement (stale values stay available).
    pub fn value(&self) -> f32 {
        f32::from_bits(self.value_bits.load(Ordering::Acquire))
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    pub fn snapshot(&self) -> ReadingSnapshot {
        ReadingSnapshot {
            value: self.value(),
            ready: self.is_ready(),
        }
    }

    /// Publish a completed measurement.  The value is stored before the
    /// flag so a reader that sees `ready` also sees the new value.
    fn deposit(&self, value: f32) {
        self.value_bits.store(value.to_bits(), Ordering::Release);
        self.ready.store(true, Ordering::Release);
    }

    fn clear(&self) {
        self.ready.store(false, Ordering::Release);
    }
}

impl Default for SensorReading {
    fn default() -> Self {
        Self::new()
    }
}

// ═══════════════════════════════════════════════════════════════
//  Actuator state
// ═══════════════════════════════════════════════════════════════

/// Animation speed, guaranteed to lie in `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Percent(u8);

impl Percent {
    pub const ZERO: Percent = Percent(0);
    pub const MAX: Percent = Percent(100);

    /// Returns `None` for anything outside `0..=100`.
    pub fn new(value: i64) -> Option<Self> {
        if (0..=100).contains(&value) {
            Some(Self(value as u8))
        } else {
            None
        }
    }

    pub const fn get(self) -> u8 {
        self.0
    }
}

/// Commanded actuator state: user LED and animation speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActuatorState {
    pub led_on: bool,
    pub speed: Percent,
}

const LED_BIT: u16 = 1 << 8;
const SPEED_MASK: u16 = 0x00FF;

impl ActuatorState {
    const fn pack(self) -> u16 {
        let led = if self.led_on { LED_BIT } else { 0 };
        led | self.speed.0 as u16
    }

    const fn unpack(raw: u16) -> Self {
        Self {
            led_on: raw & LED_BIT != 0,
            speed: Percent((raw & SPEED_MASK) as u8),
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Shared state
// ═══════════════════════════════════════════════════════════════

/// All cross-context state, passed by reference to every component.
pub struct SharedState {
    readings: [SensorReading; Channel::COUNT],
    actuator: AtomicU16,
    window_ticks: AtomicU32,
    windows_closed: AtomicU32,
    net_ready: AtomicBool,
    animation_pending: AtomicBool,
}

impl SharedState {
    pub const fn new() -> Self {
        Self {
            readings: [
                SensorReading::new(),
                SensorReading::new(),
                SensorReading::new(),
                SensorReading::new(),
            ],
            actuator: AtomicU16::new(0),
            window_ticks: AtomicU32::new(0),
            windows_closed: AtomicU32::new(0),
            net_ready: AtomicBool::new(false),
            animation_pending: AtomicBool::new(false),
        }
    }

    // ── Readers (any context) ─────────────────────────────────

    pub fn reading(&self, channel: Channel) -> &SensorReading {
        &self.readings[channel.index()]
    }

    /// Last value of every channel, in telemetry order.
    pub fn values(&self) -> [f32; Channel::COUNT] {
        Channel::ALL.map(|ch| self.reading(ch).value())
    }

    pub fn all_ready(&self) -> bool {
        self.readings.iter().all(SensorReading::is_ready)
    }

    pub fn actuator(&self) -> ActuatorState {
        ActuatorState::unpack(self.actuator.load(Ordering::Acquire))
    }

    pub fn window_ticks(&self) -> u32 {
        self.window_ticks.load(Ordering::Acquire)
    }

    /// Number of sampling windows closed since boot.
    pub fn windows_closed(&self) -> u32 {
        self.windows_closed.load(Ordering::Acquire)
    }

    pub fn is_net_ready(&self) -> bool {
        self.net_ready.load(Ordering::Acquire)
    }

    // ── AcquisitionLoop (single writer of readings) ───────────

    pub fn deposit(&self, channel: Channel, value: f32) {
        self.reading(channel).deposit(value);
    }

    // ── ControlSurface command (single writer of actuator) ────

    /// Replace both actuator fields in one atomic store.
    pub fn set_actuator(&self, state: ActuatorState) {
        self.actuator.store(state.pack(), Ordering::Release);
    }

    // ── TickScheduler (interrupt context) ─────────────────────

    /// Advance the window counter and return the new count.
    pub(crate) fn advance_window(&self) -> u32 {
        // Single writer, so load + store cannot lose an update.
        let next = self.window_ticks.load(Ordering::Relaxed).wrapping_add(1);
        self.window_ticks.store(next, Ordering::Release);
        next
    }

    /// Clear every freshness flag and reset the window counter.
    pub(crate) fn close_window(&self) {
        for reading in &self.readings {
            reading.clear();
        }
        self.window_ticks.store(0, Ordering::Release);
        self.windows_closed.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn raise_animation_frame(&self) {
        self.animation_pending.store(true, Ordering::Release);
    }

    // ── Network readiness (address notification) ──────────────

    pub(crate) fn mark_net_ready(&self) {
        self.net_ready.store(true, Ordering::Release);
    }

    // ── Animator (task context) ───────────────────────────────

    /// Consume a pending animation frame, if any.
    pub(crate) fn take_animation_frame(&self) -> bool {
        self.animation_pending.swap(false, Ordering::AcqRel)
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new()
    }
}
