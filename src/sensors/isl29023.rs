//! ISL29023 ambient-light transducer (one-shot ALS mode, 16-bit).
//!
//! ```text
//!   Configure ──▶ Trigger ──▶ Wait ──op bits 000──▶ Read ──▶ Done(lux)
//!                    ▲                                          │
//!                    └──────────────────────────────────────────┘
//! ```
//!
//! A one-shot conversion returns the chip to power-down when it finishes,
//! which is what the wait state polls for.

use std::time::Duration;

use embedded_hal::i2c::I2c;

use super::{ConversionDeadline, StepResult, bus_fault, into_step};
use crate::app::ports::{Step, Transducer};
use crate::config::LIGHT_RANGES_LUX;
use crate::shared::Channel;

pub const DEFAULT_ADDRESS: u8 = 0x44;

const REG_COMMAND_I: u8 = 0x00;
const REG_COMMAND_II: u8 = 0x01;
const REG_DATA_LSB: u8 = 0x02;

/// Operation mode field of command I.
const OP_MASK: u8 = 0xE0;
const OP_ALS_ONCE: u8 = 0x20;
/// 16-bit ADC resolution (command II bits 3:2 = 00).
const RESOLUTION_16_BIT: u8 = 0x00;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Configure,
    Trigger,
    Wait,
    Read,
}

pub struct Isl29023<I2C> {
    i2c: I2C,
    address: u8,
    range_lux: u32,
    range_bits: u8,
    state: State,
    deadline: ConversionDeadline,
}

impl<I2C: I2c> Isl29023<I2C> {
    /// `range_lux` must be one of [`LIGHT_RANGES_LUX`]; anything else
    /// selects the smallest range.
    pub fn new(i2c: I2C, address: u8, range_lux: u32, timeout: Duration) -> Self {
        let index = LIGHT_RANGES_LUX
            .iter()
            .position(|&r| r == range_lux)
            .unwrap_or(0);
        Self {
            i2c,
            address,
            range_lux: LIGHT_RANGES_LUX[index],
            range_bits: index as u8,
            state: State::Configure,
            deadline: ConversionDeadline::new(timeout),
        }
    }

    pub fn range_lux(&self) -> u32 {
        self.range_lux
    }

    fn step(&mut self) -> StepResult {
        match self.state {
            State::Configure => {
                self.i2c
                    .write(self.address, &[REG_COMMAND_II, RESOLUTION_16_BIT | self.range_bits])
                    .map_err(bus_fault)?;
                self.state = State::Trigger;
            }
            State::Trigger => {
                self.i2c
                    .write(self.address, &[REG_COMMAND_I, OP_ALS_ONCE])
                    .map_err(bus_fault)?;
                self.deadline.start();
                self.state = State::Wait;
            }
            State::Wait => {
                let mut cmd = [0u8; 1];
                self.i2c
                    .write_read(self.address, &[REG_COMMAND_I], &mut cmd)
                    .map_err(bus_fault)?;
                if cmd[0] & OP_MASK == 0 {
                    self.state = State::Read;
                } else {
                    self.deadline.pending()?;
                }
            }
            State::Read => {
                let mut data = [0u8; 2];
                self.i2c
                    .write_read(self.address, &[REG_DATA_LSB], &mut data)
                    .map_err(bus_fault)?;
                self.state = State::Trigger;
                return Ok(Some(lux(u16::from_le_bytes(data), self.range_lux)));
            }
        }
        Ok(None)
    }
}

/// Scale a 16-bit count to lux for the given full-scale range.
pub fn lux(raw: u16, range_lux: u32) -> f32 {
    f32::from(raw) * range_lux as f32 / 65_536.0
}

impl<I2C: I2c> Transducer for Isl29023<I2C> {
    fn channel(&self) -> Channel {
        Channel::Light
    }

    fn advance(&mut self) -> Step {
        into_step(self.step())
    }

    fn restart(&mut self) {
        self.state = State::Configure;
        self.deadline.start();
    }
}
