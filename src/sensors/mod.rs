//! Transducer drivers: one non-blocking step machine per sensor chip.
//!
//! Every driver is generic over [`embedded_hal::i2c::I2c`] and performs at
//! most one bus transaction per [`Transducer::advance`] call, so a slow or
//! wedged chip only ever costs one transaction per acquisition pass.  The
//! four chips share one bus through `embedded_hal_bus::i2c::RefCellDevice`.
//!
//! | Driver      | Channel     | Address | Unit |
//! |-------------|-------------|---------|------|
//! | `Tmp006`    | Temperature | 0x41    | °C   |
//! | `Sht21`     | Humidity    | 0x40    | %RH  |
//! | `Bmp180`    | Pressure    | 0x77    | Pa   |
//! | `Isl29023`  | Light       | 0x44    | lux  |
//!
//! [`Transducer::advance`]: crate::app::ports::Transducer::advance

pub mod bmp180;
pub mod isl29023;
pub mod sht21;
pub mod sim;
pub mod tmp006;

#[cfg(test)]
pub(crate) mod test_bus;

pub use bmp180::Bmp180;
pub use isl29023::Isl29023;
pub use sht21::Sht21;
pub use sim::SimTransducer;
pub use tmp006::Tmp006;

use std::time::{Duration, Instant};

use log::debug;

use crate::app::ports::Step;
use crate::error::SensorError;

/// Outcome of one driver step before it is reported as a [`Step`].
pub(crate) type StepResult = Result<Option<f32>, SensorError>;

pub(crate) fn into_step(result: StepResult) -> Step {
    match result {
        Ok(None) => Step::Pending,
        Ok(Some(value)) => Step::Done(value),
        Err(e) => Step::Failed(e),
    }
}

/// Map any I2C error to [`SensorError::Bus`], keeping the kind in the log.
pub(crate) fn bus_fault<E: embedded_hal::i2c::Error>(e: E) -> SensorError {
    debug!("I2C: {:?}", e.kind());
    SensorError::Bus
}

/// Wall-clock limit on one conversion.
///
/// Armed by [`start`](Self::start) when a conversion is triggered and checked
/// on every "still converting" poll, so the limit holds whatever the
/// acquisition pass rate is.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ConversionDeadline {
    timeout: Duration,
    started: Option<Instant>,
}

impl ConversionDeadline {
    pub(crate) const fn new(timeout: Duration) -> Self {
        Self { timeout, started: None }
    }

    pub(crate) fn start(&mut self) {
        self.started = Some(Instant::now());
    }

    /// Record one poll that found the conversion unfinished; `Timeout` once
    /// the limit has passed since [`start`](Self::start).
    pub(crate) fn pending(&mut self) -> Result<(), SensorError> {
        let started = *self.started.get_or_insert_with(Instant::now);
        if started.elapsed() >= self.timeout {
            Err(SensorError::Timeout)
        } else {
            Ok(())
        }
    }
}
