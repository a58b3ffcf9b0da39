//! GPIO / peripheral assignments for the weather station board.
//!
//! Single source of truth: drivers reference this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Sensor bus (I2C0, shared by all four transducers)
// ---------------------------------------------------------------------------

/// I2C0 SDA.  The typed pin is taken from `Peripherals` in `main`.
pub const I2C_SDA_GPIO: i32 = 8;
/// I2C0 SCL.
pub const I2C_SCL_GPIO: i32 = 9;
/// Standard-mode bus clock; the SHT21 and ISL29023 are specified to 400 kHz,
/// the TMP006 and BMP180 are run conservatively.
pub const I2C_BAUDRATE_HZ: u32 = 100_000;

// ---------------------------------------------------------------------------
// User interface
// ---------------------------------------------------------------------------

/// User LED (active HIGH), animated by the speed setting.
pub const STATUS_LED_GPIO: i32 = 2;
