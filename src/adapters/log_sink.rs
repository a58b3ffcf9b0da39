//! Log-based output adapters.
//!
//! [`LogTelemetrySink`] writes one telemetry line per closed window and
//! [`LogTextSink`] echoes display text, both through the `log` facade (the
//! ESP-IDF logger goes to UART / USB-CDC in production).

use log::info;

use crate::app::ports::{TelemetrySink, TextSink};
use crate::tick::TelemetryFrame;

/// Adapter that logs every [`TelemetryFrame`] to the serial console.
#[derive(Debug, Default)]
pub struct LogTelemetrySink {
    emitted: u32,
}

impl LogTelemetrySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emitted(&self) -> u32 {
        self.emitted
    }
}

impl TelemetrySink for LogTelemetrySink {
    fn emit(&mut self, frame: &TelemetryFrame) {
        self.emitted = self.emitted.wrapping_add(1);
        info!("{}", frame.to_line());
    }
}

/// Adapter that logs decoded display text.
#[derive(Debug, Default)]
pub struct LogTextSink;

impl TextSink for LogTextSink {
    fn show(&mut self, text: &str) {
        info!("Display text: {}", text);
    }
}
