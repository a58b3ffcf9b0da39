//! Weather station I/O controller library.
//!
//! Exposes the pure-logic modules for integration testing and the host
//! simulation. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.
//!
//! ```text
//!   tick (timer task) ──▶ TickScheduler ──▶ TelemetrySink
//!                              │ clears ready[4]
//!                              ▼
//!                        SharedState ◀── deposit ── AcquisitionLoop ◀── Transducer × 4
//!                              ▲
//!   HTTP requests ──▶ ControlSurface (set actuator / set text / render tag)
//! ```

#![deny(unused_must_use)]

pub mod acquisition;
pub mod animation;
pub mod app;
pub mod config;
pub mod error;
pub mod net;
pub mod pins;
pub mod shared;
pub mod tick;

pub mod adapters;
pub mod drivers;
pub mod sensors;
