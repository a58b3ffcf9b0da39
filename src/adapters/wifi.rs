//! WiFi station link and address watcher.
//!
//! The link reports the station's current address as the raw word the
//! readiness logic understands (see [`AddressStatus::from_raw`]).  A watcher
//! thread polls it and feeds [`NetLink`], which latches readiness.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: ESP-IDF WiFi STA via `esp_idf_svc::wifi`,
//!   credentials from `WIFI_SSID` / `WIFI_PASS` at build time.
//! - **all other targets**: a simulated link that comes up after a short
//!   delay (no link, then link without address, then 192.168.1.100).

use std::thread;
use std::time::Duration;

use log::warn;

use crate::error::{Error, Result};
use crate::net::{ADDR_NO_LINK, ADDR_PENDING, AddressStatus, NetLink};
use crate::shared::SharedState;

#[cfg(not(target_os = "espidf"))]
use core::net::Ipv4Addr;
#[cfg(not(target_os = "espidf"))]
use std::time::Instant;

#[cfg(target_os = "espidf")]
use anyhow::anyhow;
#[cfg(target_os = "espidf")]
use esp_idf_svc::{
    eventloop::EspSystemEventLoop,
    hal::modem::Modem,
    nvs::EspDefaultNvsPartition,
    wifi::{AuthMethod, ClientConfiguration, Configuration, EspWifi},
};

/// How often the watcher samples the address.
const WATCH_PERIOD: Duration = Duration::from_millis(100);

/// Encode an address the way the network stack reports it.
pub fn raw_address(ip: core::net::Ipv4Addr) -> u32 {
    u32::from_le_bytes(ip.octets())
}

// ───────────────────────────────────────────────────────────────
// ESP-IDF link
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub struct WifiLink {
    wifi: EspWifi<'static>,
}

#[cfg(target_os = "espidf")]
impl WifiLink {
    /// Configure STA mode and start connecting; does not wait for the link.
    pub fn start(
        modem: Modem,
        sys_loop: EspSystemEventLoop,
        nvs: EspDefaultNvsPartition,
    ) -> anyhow::Result<Self> {
        let ssid = option_env!("WIFI_SSID").unwrap_or("");
        let pass = option_env!("WIFI_PASS").unwrap_or("");
        if ssid.is_empty() {
            warn!("WIFI_SSID not set at build time; the station will wait for link forever");
        }

        let mut wifi = EspWifi::new(modem, sys_loop, Some(nvs))?;
        wifi.set_configuration(&Configuration::Client(ClientConfiguration {
            ssid: ssid.try_into().map_err(|_| anyhow!("wifi ssid too long"))?,
            password: pass.try_into().map_err(|_| anyhow!("wifi password too long"))?,
            auth_method: if pass.is_empty() {
                AuthMethod::None
            } else {
                AuthMethod::WPAWPA2Personal
            },
            ..Default::default()
        }))?;
        wifi.start()?;
        wifi.connect()?;
        Ok(Self { wifi })
    }

    pub fn raw_address(&self) -> u32 {
        if !self.wifi.is_connected().unwrap_or(false) {
            return ADDR_NO_LINK;
        }
        match self.wifi.sta_netif().get_ip_info() {
            Ok(info) => raw_address(info.ip),
            Err(_) => ADDR_PENDING,
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Simulated link
// ───────────────────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
pub struct WifiLink {
    started: Instant,
    link_after: Duration,
    address_after: Duration,
    address: Ipv4Addr,
}

#[cfg(not(target_os = "espidf"))]
impl WifiLink {
    pub fn start() -> Self {
        Self::with_timing(
            Duration::from_millis(300),
            Duration::from_millis(800),
            Ipv4Addr::new(192, 168, 1, 100),
        )
    }

    pub fn with_timing(link_after: Duration, address_after: Duration, address: Ipv4Addr) -> Self {
        Self {
            started: Instant::now(),
            link_after,
            address_after,
            address,
        }
    }

    pub fn raw_address(&self) -> u32 {
        let elapsed = self.started.elapsed();
        if elapsed < self.link_after {
            ADDR_NO_LINK
        } else if elapsed < self.address_after {
            ADDR_PENDING
        } else {
            raw_address(self.address)
        }
    }
}

/// Poll `link` forever on its own thread, feeding readiness into `shared`.
pub fn spawn_watcher(link: WifiLink, shared: &'static SharedState, window_ms: u32) -> Result<()> {
    thread::Builder::new()
        .name("net-watch".into())
        .stack_size(4 * 1024)
        .spawn(move || {
            let mut net = NetLink::new(window_ms);
            loop {
                net.observe(AddressStatus::from_raw(link.raw_address()), shared);
                thread::sleep(WATCH_PERIOD);
            }
        })
        .map_err(|e| {
            warn!("net watcher spawn failed: {e}");
            Error::Init("net watcher spawn failed")
        })?;
    Ok(())
}
