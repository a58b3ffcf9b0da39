//! Tick source, idle wait and the user LED.

pub mod hw_timer;
pub mod status_led;
