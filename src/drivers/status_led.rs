//! User LED driver.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives one GPIO output through `PinDriver`.
//! On host/test: tracks state in-memory and logs transitions.

use log::debug;
#[cfg(target_os = "espidf")]
use log::warn;

use crate::app::ports::LedPort;

#[cfg(target_os = "espidf")]
use esp_idf_hal::gpio::{AnyOutputPin, Output, PinDriver};

pub struct StatusLed {
    #[cfg(target_os = "espidf")]
    pin: Option<PinDriver<'static, AnyOutputPin, Output>>,
    lit: bool,
    changes: u32,
}

impl StatusLed {
    /// Claim `gpio` as a push-pull output.  A pin that cannot be claimed
    /// leaves the LED dark rather than failing boot.
    #[cfg(target_os = "espidf")]
    pub fn new(gpio: i32) -> Self {
        // SAFETY: the pin number comes from the board definition and is not
        // claimed by any other driver.
        let pin = match unsafe { PinDriver::output(AnyOutputPin::new(gpio)) } {
            Ok(mut pin) => {
                let _ = pin.set_low();
                Some(pin)
            }
            Err(err) => {
                warn!("status LED unavailable on GPIO{gpio}: {err}");
                None
            }
        };
        Self {
            pin,
            lit: false,
            changes: 0,
        }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new(_gpio: i32) -> Self {
        Self {
            lit: false,
            changes: 0,
        }
    }

    pub fn is_lit(&self) -> bool {
        self.lit
    }

    /// Number of on/off transitions since construction.
    pub fn changes(&self) -> u32 {
        self.changes
    }

    #[cfg(target_os = "espidf")]
    fn drive(&mut self, on: bool) {
        if let Some(pin) = self.pin.as_mut() {
            let _ = if on { pin.set_high() } else { pin.set_low() };
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn drive(&mut self, _on: bool) {}
}

impl LedPort for StatusLed {
    fn set_led(&mut self, on: bool) {
        if on == self.lit {
            return;
        }
        self.drive(on);
        self.lit = on;
        self.changes = self.changes.wrapping_add(1);
        debug!("LED {}", if on { "on" } else { "off" });
    }
}
