//! Register-level model of the weather board's I2C bus.
//!
//! Answers the four sensor chips at their default addresses with fixed
//! register contents, so the real drivers can be run end-to-end against it
//! through `embedded_hal_bus::i2c::RefCellDevice`.

use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation, SevenBitAddress};

pub const TMP006: u8 = 0x41;
pub const SHT21: u8 = 0x40;
pub const BMP180: u8 = 0x77;
pub const ISL29023: u8 = 0x44;

/// BMP180 datasheet calibration block (AC1..MD, big-endian words).
pub const BMP180_CALIBRATION: [u8; 22] = [
    0x01, 0x98, 0xFF, 0xB8, 0xC7, 0xD1, 0x7F, 0xE5, 0x7F, 0xF5, 0x5A, 0x71, 0x18, 0x2E, 0x00, 0x04,
    0x80, 0x00, 0xDD, 0xF9, 0x0B, 0x34,
];

// ── Board model ───────────────────────────────────────────────

pub struct Board {
    /// TMP006 die temperature register.
    pub die_temp: [u8; 2],
    /// SHT21 measurement frame (MSB, LSB, CRC).
    pub humidity_frame: [u8; 3],
    /// Reads the SHT21 NACKs after each trigger before answering.
    pub humidity_busy_reads: u32,
    pub bmp_calibration: [u8; 22],
    pub bmp_ut: [u8; 2],
    pub bmp_up: [u8; 3],
    /// ISL29023 data register, little-endian on the wire.
    pub light_raw: u16,
    /// Addresses that do not acknowledge at all.
    pub absent: Vec<u8>,
    /// Every write seen, as (address, bytes).
    pub writes: Vec<(u8, Vec<u8>)>,

    pointers: [u8; 128],
    humidity_busy_left: u32,
    bmp_command: u8,
}

#[allow(dead_code)]
impl Board {
    /// 25 °C, 44.888 %RH, 69964 Pa, 500 lux.
    pub fn new() -> Self {
        Self {
            die_temp: [0x0C, 0x80],
            humidity_frame: [0x68, 0x3A, 0x7C],
            humidity_busy_reads: 0,
            bmp_calibration: BMP180_CALIBRATION,
            bmp_ut: [0x6C, 0xFA],
            bmp_up: [0x5D, 0x23, 0x00],
            light_raw: 0x8000,
            absent: Vec::new(),
            writes: Vec::new(),
            pointers: [0; 128],
            humidity_busy_left: 0,
            bmp_command: 0,
        }
    }

    pub fn writes_to(&self, address: u8) -> usize {
        self.writes.iter().filter(|(a, _)| *a == address).count()
    }

    fn on_write(&mut self, address: u8, bytes: &[u8]) {
        self.writes.push((address, bytes.to_vec()));
        let Some(&first) = bytes.first() else { return };
        self.pointers[usize::from(address & 0x7F)] = first;

        match (address, bytes) {
            (SHT21, [0xF5]) => self.humidity_busy_left = self.humidity_busy_reads,
            (BMP180, [0xF4, command]) => self.bmp_command = *command,
            _ => {}
        }
    }

    fn on_read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), ErrorKind> {
        let pointer = self.pointers[usize::from(address & 0x7F)];
        match (address, pointer) {
            // Configuration register with DRDY set.
            (TMP006, 0x02) => fill(buf, &[0x75, 0x80]),
            (TMP006, 0x01) => fill(buf, &self.die_temp),
            (SHT21, _) => {
                if self.humidity_busy_left > 0 {
                    self.humidity_busy_left -= 1;
                    return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
                }
                fill(buf, &self.humidity_frame);
            }
            (BMP180, 0xAA) => fill(buf, &self.bmp_calibration),
            // Conversions finish immediately: SCO always clear.
            (BMP180, 0xF4) => fill(buf, &[self.bmp_command & !0x20]),
            (BMP180, 0xF6) if self.bmp_command == 0x2E => fill(buf, &self.bmp_ut),
            (BMP180, 0xF6) => fill(buf, &self.bmp_up),
            // Operation bits clear: the one-shot conversion is done.
            (ISL29023, 0x00) => fill(buf, &[0x00]),
            (ISL29023, 0x02) => fill(buf, &self.light_raw.to_le_bytes()),
            _ => buf.fill(0),
        }
        Ok(())
    }
}

fn fill(buf: &mut [u8], data: &[u8]) {
    for (dst, src) in buf.iter_mut().zip(data.iter().chain(core::iter::repeat(&0))) {
        *dst = *src;
    }
}

impl ErrorType for Board {
    type Error = ErrorKind;
}

impl I2c<SevenBitAddress> for Board {
    fn transaction(&mut self, address: u8, operations: &mut [Operation<'_>]) -> Result<(), Self::Error> {
        if self.absent.contains(&address) {
            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        }
        for op in operations {
            match op {
                Operation::Write(bytes) => self.on_write(address, bytes),
                Operation::Read(buf) => self.on_read(address, buf)?,
            }
        }
        Ok(())
    }
}

// ── Idle / sinks ──────────────────────────────────────────────

/// Counts idle waits instead of sleeping.
#[derive(Default)]
pub struct CountingIdle {
    pub waits: u32,
}

impl weather_io::app::ports::IdleWait for CountingIdle {
    fn wait_for_interrupt(&mut self) {
        self.waits += 1;
    }
}

/// Collects every telemetry line.
#[derive(Default)]
pub struct LineSink {
    pub lines: Vec<String>,
}

impl weather_io::app::ports::TelemetrySink for LineSink {
    fn emit(&mut self, frame: &weather_io::tick::TelemetryFrame) {
        self.lines.push(frame.to_line().as_str().to_owned());
    }
}

/// Records every text shown.
#[derive(Default)]
pub struct TextLog {
    pub shown: Vec<String>,
}

impl weather_io::app::ports::TextSink for TextLog {
    fn show(&mut self, text: &str) {
        self.shown.push(text.to_owned());
    }
}
