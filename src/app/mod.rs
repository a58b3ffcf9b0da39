//! Application core — request handling and status rendering, zero I/O.
//!
//! The control surface validates commands, forwards display text and
//! renders status tags.  All interaction with hardware and transports goes
//! through the **port traits** in [`ports`], so this layer is fully testable
//! on the host.

pub mod control;
pub mod form;
pub mod ports;
pub mod ssi;
pub mod tags;
