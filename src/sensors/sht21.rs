//! SHT21 relative-humidity transducer (no-hold-master mode).
//!
//! The trigger command starts a conversion and releases the bus; while the
//! conversion runs the chip NACKs its read header, which this driver treats
//! as "still converting" rather than a fault.
//!
//! ```text
//!   Trigger ──▶ Fetch ──NACK──▶ Fetch ... ──data+CRC──▶ Done(%RH) ──▶ Trigger
//! ```

use std::time::Duration;

use embedded_hal::i2c::{Error as _, ErrorKind, I2c};

use super::{ConversionDeadline, StepResult, bus_fault, into_step};
use crate::app::ports::{Step, Transducer};
use crate::error::SensorError;
use crate::shared::Channel;

pub const DEFAULT_ADDRESS: u8 = 0x40;

const CMD_TRIGGER_RH_NO_HOLD: u8 = 0xF5;
const CRC_POLYNOMIAL: u8 = 0x31;
/// The two low bits of every result carry status, not data.
const STATUS_MASK: u16 = 0x0003;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Trigger,
    Fetch,
}

pub struct Sht21<I2C> {
    i2c: I2C,
    address: u8,
    state: State,
    deadline: ConversionDeadline,
}

impl<I2C: I2c> Sht21<I2C> {
    pub fn new(i2c: I2C, address: u8, timeout: Duration) -> Self {
        Self {
            i2c,
            address,
            state: State::Trigger,
            deadline: ConversionDeadline::new(timeout),
        }
    }

    fn step(&mut self) -> StepResult {
        match self.state {
            State::Trigger => {
                self.i2c
                    .write(self.address, &[CMD_TRIGGER_RH_NO_HOLD])
                    .map_err(bus_fault)?;
                self.deadline.start();
                self.state = State::Fetch;
                Ok(None)
            }
            State::Fetch => {
                let mut buf = [0u8; 3];
                match self.i2c.read(self.address, &mut buf) {
                    Ok(()) => {}
                    Err(e) if matches!(e.kind(), ErrorKind::NoAcknowledge(_)) => {
                        self.deadline.pending()?;
                        return Ok(None);
                    }
                    Err(e) => return Err(bus_fault(e)),
                }
                self.state = State::Trigger;
                if crc8(&buf[..2]) != buf[2] {
                    return Err(SensorError::Checksum);
                }
                Ok(Some(relative_humidity(u16::from_be_bytes([buf[0], buf[1]]))))
            }
        }
    }
}

/// CRC-8, polynomial x^8 + x^5 + x^4 + 1, initial value 0.
pub fn crc8(data: &[u8]) -> u8 {
    let mut crc = 0u8;
    for &byte in data {
        crc ^= byte;
        for _ in 0..8 {
            crc = if crc & 0x80 != 0 {
                (crc << 1) ^ CRC_POLYNOMIAL
            } else {
                crc << 1
            };
        }
    }
    crc
}

/// Raw humidity word (status bits included) to %RH.
pub fn relative_humidity(raw: u16) -> f32 {
    let signal = f32::from(raw & !STATUS_MASK);
    -6.0 + 125.0 * signal / 65_536.0
}

impl<I2C: I2c> Transducer for Sht21<I2C> {
    fn channel(&self) -> Channel {
        Channel::Humidity
    }

    fn advance(&mut self) -> Step {
        into_step(self.step())
    }

    fn restart(&mut self) {
        self.state = State::Trigger;
        self.deadline.start();
    }
}
