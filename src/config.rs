//! Station configuration parameters
//!
//! All tunable parameters for the weather station.  Host builds may load
//! them from a JSON file; device builds run with the defaults.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Light sensor full-scale ranges supported by the ISL29023 (lux).
pub const LIGHT_RANGES_LUX: [u32; 4] = [1000, 4000, 16_000, 64_000];

/// Core station configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StationConfig {
    // --- Timing ---
    /// Tick interrupt frequency (Hz)
    pub tick_hz: u32,
    /// Sampling window length (milliseconds)
    pub window_ms: u32,
    /// Animation frame rate at 100% speed (frames per second)
    pub max_frame_hz: u32,

    // --- Acquisition ---
    /// Wall-clock limit on one sensor conversion (milliseconds)
    pub sensor_timeout_ms: u32,
    /// Consecutive failures on one channel before a warning is logged
    pub failure_warn_threshold: u32,
    /// ISL29023 full-scale range (lux)
    pub light_range_lux: u32,
    /// BMP180 oversampling setting (0-3)
    pub bmp180_oversampling: u8,

    // --- Network ---
    /// HTTP listen port
    pub http_port: u16,
    /// Factory MAC words as stored in the USER0/USER1 registers (24/24 split)
    pub mac_user_words: [u32; 2],
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            // Timing
            tick_hz: 100,     // 10 ms tick
            window_ms: 50,    // telemetry every 5 ticks
            max_frame_hz: 10, // 10 frames/s at 100%

            // Acquisition
            sensor_timeout_ms: 2000, // TMP006 averaging takes ~1 s
            failure_warn_threshold: 8,
            light_range_lux: 1000,
            bmp180_oversampling: 0,

            // Network
            http_port: 80,
            mac_user_words: [0x00B6_1A00, 0x008C_2B03],
        }
    }
}

impl StationConfig {
    /// Ticks per sampling window, never less than one.
    pub fn ticks_per_window(&self) -> u32 {
        (self.tick_hz.saturating_mul(self.window_ms) / 1000).max(1)
    }

    /// Tick period in milliseconds, never less than one.
    pub fn tick_period_ms(&self) -> u32 {
        (1000 / self.tick_hz.max(1)).max(1)
    }

    pub fn sensor_timeout(&self) -> Duration {
        Duration::from_millis(u64::from(self.sensor_timeout_ms))
    }

    /// Reject parameter combinations the firmware cannot honour.
    pub fn validate(&self) -> Result<()> {
        if self.tick_hz == 0 || self.tick_hz > 1000 {
            return Err(Error::Config("tick_hz must be 1..=1000"));
        }
        if self.window_ms < self.tick_period_ms() {
            return Err(Error::Config("window_ms shorter than one tick"));
        }
        if self.max_frame_hz == 0 || self.max_frame_hz > self.tick_hz {
            return Err(Error::Config("max_frame_hz must be 1..=tick_hz"));
        }
        if self.sensor_timeout_ms == 0 {
            return Err(Error::Config("sensor_timeout_ms must be non-zero"));
        }
        if self.bmp180_oversampling > 3 {
            return Err(Error::Config("bmp180_oversampling must be 0..=3"));
        }
        if !LIGHT_RANGES_LUX.contains(&self.light_range_lux) {
            return Err(Error::Config("light_range_lux must be 1000/4000/16000/64000"));
        }
        Ok(())
    }

    /// Parse a JSON document; missing fields fall back to defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|_| Error::Config("malformed JSON"))?;
        config.validate()?;
        Ok(config)
    }
}
