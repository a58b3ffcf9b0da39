//! TMP006 die-temperature transducer.
//!
//! The chip runs in continuous conversion mode after a single configuration
//! write; each measurement waits for the DRDY bit and reads the local (die)
//! temperature register.  Once configured the chip keeps converting, so a
//! restart after a timeout goes straight back to waiting for DRDY; only a
//! bus fault forces the configuration to be written again.
//!
//! ```text
//!   Configure ──▶ WaitReady ──DRDY──▶ ReadDie ──▶ Done(°C) ─┐
//!                    ▲                                      │
//!                    └──────────────────────────────────────┘
//! ```

use std::time::Duration;

use embedded_hal::i2c::I2c;

use super::{ConversionDeadline, StepResult, bus_fault, into_step};
use crate::app::ports::{Step, Transducer};
use crate::error::SensorError;
use crate::shared::Channel;

pub const DEFAULT_ADDRESS: u8 = 0x41;

const REG_DIE_TEMP: u8 = 0x01;
const REG_CONFIG: u8 = 0x02;

const CFG_MODE_CONTINUOUS: u16 = 0x7000;
const CFG_DRDY_ENABLE: u16 = 0x0100;
/// Conversion rate field: 4 averaged samples per result.
const CFG_RATE_4: u16 = 2 << 9;
const CFG_DRDY: u16 = 0x0080;

/// °C per LSB of the 14-bit die temperature.
const DIE_LSB_C: f32 = 0.031_25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Configure,
    WaitReady,
    ReadDie,
}

pub struct Tmp006<I2C> {
    i2c: I2C,
    address: u8,
    state: State,
    configured: bool,
    deadline: ConversionDeadline,
}

impl<I2C: I2c> Tmp006<I2C> {
    pub fn new(i2c: I2C, address: u8, timeout: Duration) -> Self {
        Self {
            i2c,
            address,
            state: State::Configure,
            configured: false,
            deadline: ConversionDeadline::new(timeout),
        }
    }

    fn step(&mut self) -> StepResult {
        match self.state {
            State::Configure => {
                let [hi, lo] = (CFG_MODE_CONTINUOUS | CFG_DRDY_ENABLE | CFG_RATE_4).to_be_bytes();
                self.i2c
                    .write(self.address, &[REG_CONFIG, hi, lo])
                    .map_err(bus_fault)?;
                self.configured = true;
                self.deadline.start();
                self.state = State::WaitReady;
                Ok(None)
            }
            State::WaitReady => {
                let mut buf = [0u8; 2];
                self.i2c
                    .write_read(self.address, &[REG_CONFIG], &mut buf)
                    .map_err(bus_fault)?;
                if u16::from_be_bytes(buf) & CFG_DRDY != 0 {
                    self.state = State::ReadDie;
                } else {
                    self.deadline.pending()?;
                }
                Ok(None)
            }
            State::ReadDie => {
                let mut buf = [0u8; 2];
                self.i2c
                    .write_read(self.address, &[REG_DIE_TEMP], &mut buf)
                    .map_err(bus_fault)?;
                self.deadline.start();
                self.state = State::WaitReady;
                Ok(Some(die_celsius(buf)))
            }
        }
    }
}

/// Convert the big-endian die register to °C (14 bits, left aligned).
pub fn die_celsius(raw: [u8; 2]) -> f32 {
    (i16::from_be_bytes(raw) >> 2) as f32 * DIE_LSB_C
}

impl<I2C: I2c> Transducer for Tmp006<I2C> {
    fn channel(&self) -> Channel {
        Channel::Temperature
    }

    fn advance(&mut self) -> Step {
        let result = self.step();
        if matches!(result, Err(SensorError::Bus)) {
            // The chip may have lost power; its configuration is unknown.
            self.configured = false;
        }
        into_step(result)
    }

    fn restart(&mut self) {
        self.state = if self.configured { State::WaitReady } else { State::Configure };
        self.deadline.start();
    }
}
