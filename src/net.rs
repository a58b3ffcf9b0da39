//! Network readiness and station identity.
//!
//! ```text
//!   NotReady ──first assigned address──▶ Ready   (latched)
//! ```
//!
//! The network layer reports its current IPv4 address word; [`NetLink`]
//! logs every change and flips the shared readiness flag exactly once.
//! Telemetry stays suppressed until then.  A later link loss is reported
//! but does not re-suppress telemetry.

use core::fmt;
use core::net::Ipv4Addr;

use log::{info, warn};

use crate::error::{Error, Result};
use crate::shared::SharedState;

/// Raw address word meaning "no link".
pub const ADDR_NO_LINK: u32 = 0xFFFF_FFFF;
/// Raw address word meaning "link up, no address yet".
pub const ADDR_PENDING: u32 = 0;

/// Interpretation of the raw address word reported by the network stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressStatus {
    NoLink,
    Pending,
    Assigned(Ipv4Addr),
}

impl AddressStatus {
    /// Decode an lwIP address word (first octet in the low byte).
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            ADDR_NO_LINK => Self::NoLink,
            ADDR_PENDING => Self::Pending,
            _ => Self::Assigned(Ipv4Addr::from(raw.to_le_bytes())),
        }
    }
}

/// Tracks the last reported address and latches readiness.
#[derive(Debug)]
pub struct NetLink {
    last: Option<AddressStatus>,
    window_ms: u32,
}

impl NetLink {
    pub fn new(window_ms: u32) -> Self {
        Self {
            last: None,
            window_ms,
        }
    }

    pub fn last(&self) -> Option<AddressStatus> {
        self.last
    }

    /// Feed the current address status.  Returns `true` on the call that
    /// made the station ready.
    pub fn observe(&mut self, status: AddressStatus, shared: &SharedState) -> bool {
        if self.last == Some(status) {
            return false;
        }
        self.last = Some(status);

        let was_ready = shared.is_net_ready();
        match status {
            AddressStatus::NoLink if was_ready => warn!("Link lost; telemetry continues"),
            AddressStatus::NoLink => info!("Waiting for link."),
            AddressStatus::Pending if was_ready => warn!("Address released; telemetry continues"),
            AddressStatus::Pending => info!("Waiting for IP address."),
            AddressStatus::Assigned(ip) => {
                info!("IP Address: {}", ip);
                if !was_ready {
                    shared.mark_net_ready();
                    info!("Sensor data refresh every {} ms", self.window_ms);
                    return true;
                }
            }
        }
        false
    }
}

// ═══════════════════════════════════════════════════════════════
//  MAC address
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacAddress(pub [u8; 6]);

impl MacAddress {
    /// Build the MAC from the two factory USER words: the low 24 bits of
    /// each word hold three bytes, least significant first.  An erased word
    /// (`0xFFFF_FFFF`) means no MAC was ever programmed.
    pub fn from_user_words(user0: u32, user1: u32) -> Result<Self> {
        if user0 == 0xFFFF_FFFF || user1 == 0xFFFF_FFFF {
            return Err(Error::Init("No MAC programmed"));
        }
        let [a, b, c, _] = user0.to_le_bytes();
        let [d, e, f, _] = user1.to_le_bytes();
        Ok(Self([a, b, c, d, e, f]))
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = &self.0;
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            m[0], m[1], m[2], m[3], m[4], m[5]
        )
    }
}
