//! BMP180 barometric pressure transducer.
//!
//! Pressure compensation needs a fresh uncompensated temperature, so each
//! measurement runs two conversions back to back.  Calibration is read once
//! and kept across restarts unless it turned out to be invalid.
//!
//! ```text
//!   ReadCalibration ─▶ StartTemperature ─▶ WaitTemperature ─▶ ReadTemperature
//!                            ▲                                       │ UT
//!                            │                                       ▼
//!        Done(Pa) ◀── ReadPressure ◀── WaitPressure ◀──────── StartPressure
//! ```

use std::time::Duration;

use embedded_hal::i2c::I2c;

use super::{ConversionDeadline, StepResult, bus_fault, into_step};
use crate::app::ports::{Step, Transducer};
use crate::error::SensorError;
use crate::shared::Channel;

pub const DEFAULT_ADDRESS: u8 = 0x77;

const REG_CALIBRATION: u8 = 0xAA;
const REG_CONTROL: u8 = 0xF4;
const REG_RESULT: u8 = 0xF6;

const CMD_TEMPERATURE: u8 = 0x2E;
const CMD_PRESSURE: u8 = 0x34;
/// Start-of-conversion bit in the control register.
const CTRL_SCO: u8 = 1 << 5;

const CALIBRATION_LEN: usize = 22;

/// Factory calibration coefficients (EEPROM 0xAA..=0xBF).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calibration {
    pub ac1: i16,
    pub ac2: i16,
    pub ac3: i16,
    pub ac4: u16,
    pub ac5: u16,
    pub ac6: u16,
    pub b1: i16,
    pub b2: i16,
    pub mb: i16,
    pub mc: i16,
    pub md: i16,
}

impl Calibration {
    /// Parse the big-endian EEPROM block.  A word reading 0x0000 or 0xFFFF
    /// means the EEPROM is blank or the read went wrong.
    pub fn from_bytes(raw: &[u8; CALIBRATION_LEN]) -> Result<Self, SensorError> {
        let mut words = [0u16; CALIBRATION_LEN / 2];
        for (word, pair) in words.iter_mut().zip(raw.chunks_exact(2)) {
            *word = u16::from_be_bytes([pair[0], pair[1]]);
            if *word == 0x0000 || *word == 0xFFFF {
                return Err(SensorError::Calibration);
            }
        }
        let s = |i: usize| words[i] as i16;
        Ok(Self {
            ac1: s(0),
            ac2: s(1),
            ac3: s(2),
            ac4: words[3],
            ac5: words[4],
            ac6: words[5],
            b1: s(6),
            b2: s(7),
            mb: s(8),
            mc: s(9),
            md: s(10),
        })
    }

    /// Datasheet compensation.  Returns (temperature in 0.1 °C, pressure in Pa).
    pub fn compensate(&self, ut: i32, up: i32, oss: u8) -> (i32, i32) {
        let oss = u32::from(oss.min(3));
        let (ut, up) = (i64::from(ut), i64::from(up));
        let (ac1, ac2, ac3) = (i64::from(self.ac1), i64::from(self.ac2), i64::from(self.ac3));
        let (ac4, ac5, ac6) = (i64::from(self.ac4), i64::from(self.ac5), i64::from(self.ac6));
        let (b1, b2) = (i64::from(self.b1), i64::from(self.b2));
        let (mc, md) = (i64::from(self.mc), i64::from(self.md));

        let x1 = ((ut - ac6) * ac5) >> 15;
        let denominator = x1 + md;
        if denominator == 0 {
            return (0, 0);
        }
        let x2 = (mc << 11) / denominator;
        let b5 = x1 + x2;
        let temperature = (b5 + 8) >> 4;

        let b6 = b5 - 4000;
        let x1 = (b2 * ((b6 * b6) >> 12)) >> 11;
        let x2 = (ac2 * b6) >> 11;
        let x3 = x1 + x2;
        let b3 = (((ac1 * 4 + x3) << oss) + 2) / 4;
        let x1 = (ac3 * b6) >> 13;
        let x2 = (b1 * ((b6 * b6) >> 12)) >> 16;
        let x3 = ((x1 + x2) + 2) >> 2;
        let b4 = (ac4 * ((x3 + 32_768) as u32 as i64)) >> 15;
        if b4 == 0 {
            return (temperature as i32, 0);
        }
        let b7 = ((up - b3) as u32 as i64) * (50_000 >> oss);
        let mut p = if b7 < 0x8000_0000 {
            (b7 * 2) / b4
        } else {
            (b7 / b4) * 2
        };
        let x1 = (p >> 8) * (p >> 8);
        let x1 = (x1 * 3038) >> 16;
        let x2 = (-7357 * p) >> 16;
        p += (x1 + x2 + 3791) >> 4;

        (temperature as i32, p as i32)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    ReadCalibration,
    StartTemperature,
    WaitTemperature,
    ReadTemperature,
    StartPressure { ut: i32 },
    WaitPressure { ut: i32 },
    ReadPressure { ut: i32 },
}

pub struct Bmp180<I2C> {
    i2c: I2C,
    address: u8,
    oversampling: u8,
    calibration: Option<Calibration>,
    state: State,
    deadline: ConversionDeadline,
}

impl<I2C: I2c> Bmp180<I2C> {
    pub fn new(i2c: I2C, address: u8, oversampling: u8, timeout: Duration) -> Self {
        Self {
            i2c,
            address,
            oversampling: oversampling.min(3),
            calibration: None,
            state: State::ReadCalibration,
            deadline: ConversionDeadline::new(timeout),
        }
    }

    pub fn calibration(&self) -> Option<&Calibration> {
        self.calibration.as_ref()
    }

    fn start(&mut self, command: u8) -> Result<(), SensorError> {
        self.i2c
            .write(self.address, &[REG_CONTROL, command])
            .map_err(bus_fault)?;
        self.deadline.start();
        Ok(())
    }

    /// True once the conversion in progress has finished.
    fn conversion_done(&mut self) -> Result<bool, SensorError> {
        let mut ctrl = [0u8; 1];
        self.i2c
            .write_read(self.address, &[REG_CONTROL], &mut ctrl)
            .map_err(bus_fault)?;
        if ctrl[0] & CTRL_SCO == 0 {
            Ok(true)
        } else {
            self.deadline.pending()?;
            Ok(false)
        }
    }

    fn step(&mut self) -> StepResult {
        match self.state {
            State::ReadCalibration => {
                let mut raw = [0u8; CALIBRATION_LEN];
                self.i2c
                    .write_read(self.address, &[REG_CALIBRATION], &mut raw)
                    .map_err(bus_fault)?;
                self.calibration = Some(Calibration::from_bytes(&raw)?);
                self.state = State::StartTemperature;
            }
            State::StartTemperature => {
                self.start(CMD_TEMPERATURE)?;
                self.state = State::WaitTemperature;
            }
            State::WaitTemperature => {
                if self.conversion_done()? {
                    self.state = State::ReadTemperature;
                }
            }
            State::ReadTemperature => {
                let mut buf = [0u8; 2];
                self.i2c
                    .write_read(self.address, &[REG_RESULT], &mut buf)
                    .map_err(bus_fault)?;
                let ut = i32::from(u16::from_be_bytes(buf));
                self.state = State::StartPressure { ut };
            }
            State::StartPressure { ut } => {
                self.start(CMD_PRESSURE | (self.oversampling << 6))?;
                self.state = State::WaitPressure { ut };
            }
            State::WaitPressure { ut } => {
                if self.conversion_done()? {
                    self.state = State::ReadPressure { ut };
                }
            }
            State::ReadPressure { ut } => {
                let mut buf = [0u8; 3];
                self.i2c
                    .write_read(self.address, &[REG_RESULT], &mut buf)
                    .map_err(bus_fault)?;
                let up = ((i32::from(buf[0]) << 16) | (i32::from(buf[1]) << 8) | i32::from(buf[2]))
                    >> (8 - self.oversampling);
                let cal = self.calibration.ok_or(SensorError::Calibration)?;
                let (_, pressure) = cal.compensate(ut, up, self.oversampling);
                self.state = State::StartTemperature;
                return Ok(Some(pressure as f32));
            }
        }
        Ok(None)
    }
}

impl<I2C: I2c> Transducer for Bmp180<I2C> {
    fn channel(&self) -> Channel {
        Channel::Pressure
    }

    fn advance(&mut self) -> Step {
        into_step(self.step())
    }

    fn restart(&mut self) {
        self.state = if self.calibration.is_some() {
            State::StartTemperature
        } else {
            State::ReadCalibration
        };
        self.deadline.start();
    }
}
