//! Unified error types for the weather station firmware.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! boundary handlers uniform.  All variants are `Copy` so they can be handed
//! from a transducer step to the acquisition loop without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A transducer could not complete a measurement step.
    Sensor(SensorError),
    /// A request parameter was missing, malformed or out of range.
    Param(ParamError),
    /// Peripheral or identity initialisation failed.
    Init(&'static str),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Param(e) => write!(f, "param: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The I2C transaction failed (arbitration, bus fault, unexpected NACK).
    Bus,
    /// The transducer never reported a finished conversion.
    Timeout,
    /// Data arrived but failed its integrity check.
    Checksum,
    /// Calibration data is unusable (all zeros / all ones).
    Calibration,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus => write!(f, "I2C transaction failed"),
            Self::Timeout => write!(f, "conversion timed out"),
            Self::Checksum => write!(f, "checksum mismatch"),
            Self::Calibration => write!(f, "invalid calibration data"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Request parameter errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamError {
    /// A required parameter is absent.
    Missing(&'static str),
    /// The value is not a decimal integer.
    NotANumber(&'static str),
    /// The value parsed but lies outside the accepted range.
    OutOfRange(&'static str),
    /// Percent-encoding is malformed or the result is not UTF-8.
    Undecodable(&'static str),
}

impl fmt::Display for ParamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing(name) => write!(f, "'{name}' missing"),
            Self::NotANumber(name) => write!(f, "'{name}' is not a number"),
            Self::OutOfRange(name) => write!(f, "'{name}' out of range"),
            Self::Undecodable(name) => write!(f, "'{name}' could not be decoded"),
        }
    }
}

impl From<ParamError> for Error {
    fn from(e: ParamError) -> Self {
        Self::Param(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
