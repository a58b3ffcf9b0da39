//! Weather station I/O controller — main entry point.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  Tmp006 · Sht21 · Bmp180 · Isl29023   LogTelemetrySink         │
//! │  (Transducer, shared I2C bus)         LogTextSink              │
//! │  EspHttpServer / stdin console        WifiLink ─▶ NetLink      │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │  AcquisitionLoop · TickScheduler · ControlSurface      │    │
//! │  │  Animator · AnimationTimer                             │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  SharedState (static, atomics only)                            │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

// ── Imports ───────────────────────────────────────────────────
use anyhow::Result;
use log::{error, info};

use weather_io::acquisition::AcquisitionLoop;
use weather_io::adapters::log_sink::LogTelemetrySink;
use weather_io::animation::{AnimationTimer, Animator};
use weather_io::app::ports::Transducer;
use weather_io::config::StationConfig;
use weather_io::drivers::hw_timer::{self, TickContext, TickIdle};
use weather_io::drivers::status_led::StatusLed;
use weather_io::net::MacAddress;
use weather_io::pins;
use weather_io::shared::SharedState;
use weather_io::tick::TickScheduler;

/// The one instance every context shares.
static SHARED: SharedState = SharedState::new();

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. Platform bootstrap ─────────────────────────────────
    platform::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Weather I/O v{}                  ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    let config = platform::load_config();
    config.validate()?;
    info!(
        "Config: tick {} Hz, window {} ms, light range {} lux",
        config.tick_hz, config.window_ms, config.light_range_lux
    );

    // ── 3. Identity ───────────────────────────────────────────
    let [user0, user1] = platform::mac_user_words(&config);
    match MacAddress::from_user_words(user0, user1) {
        Ok(mac) => info!("MAC address: {mac}"),
        Err(e) => {
            // Without an identity the station must not join the network.
            error!("{e}, halting");
            halt();
        }
    }

    // ── 4. Periodic tick ──────────────────────────────────────
    hw_timer::start(
        TickContext {
            shared: &SHARED,
            scheduler: TickScheduler::new(config.ticks_per_window()),
            housekeeping: AnimationTimer::new(config.tick_hz, config.max_frame_hz),
            sink: LogTelemetrySink::new(),
        },
        config.tick_period_ms(),
    )?;

    // ── 5. Network, requests, transducers ─────────────────────
    platform::run(&config)
}

/// Run the acquisition loop forever, animating the status LED between
/// passes.
fn acquire<'a>(transducers: [Box<dyn Transducer + 'a>; 4], config: &StationConfig) -> Result<()> {
    let mut acquisition = AcquisitionLoop::new(transducers, config.failure_warn_threshold)?;
    let mut idle = TickIdle::new(config.tick_period_ms());
    let mut animator = Animator::new();
    let mut led = StatusLed::new(pins::STATUS_LED_GPIO);

    info!("System ready. Entering acquisition loop.");
    acquisition.run(&SHARED, &mut idle, |shared| {
        animator.poll(shared, &mut led);
    })
}

fn halt() -> ! {
    loop {
        std::thread::park();
    }
}

// ───────────────────────────────────────────────────────────────
// ESP-IDF platform
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
mod platform {
    use std::cell::RefCell;

    use anyhow::Result;
    use embedded_hal_bus::i2c::RefCellDevice;
    use esp_idf_svc::eventloop::EspSystemEventLoop;
    use esp_idf_svc::hal::i2c::{I2cConfig, I2cDriver};
    use esp_idf_svc::hal::peripherals::Peripherals;
    use esp_idf_svc::hal::prelude::*;
    use esp_idf_svc::nvs::EspDefaultNvsPartition;
    use log::warn;

    use weather_io::adapters::http_server;
    use weather_io::adapters::log_sink::LogTextSink;
    use weather_io::adapters::wifi::{self, WifiLink};
    use weather_io::app::control::ControlSurface;
    use weather_io::app::ports::Transducer;
    use weather_io::config::StationConfig;
    use weather_io::pins;
    use weather_io::sensors::{Bmp180, Isl29023, Sht21, Tmp006, bmp180, isl29023, sht21, tmp006};

    use super::{SHARED, acquire};

    pub fn init() -> Result<()> {
        esp_idf_svc::sys::link_patches();
        esp_idf_logger::init()?;
        Ok(())
    }

    pub fn load_config() -> StationConfig {
        StationConfig::default()
    }

    /// Factory MAC packed 24/24 into the two user words.  Unreadable eFuse
    /// reads as unprogrammed.
    pub fn mac_user_words(_config: &StationConfig) -> [u32; 2] {
        let mut mac = [0u8; 6];
        // SAFETY: `mac` is the six bytes the call writes.
        let ret = unsafe { esp_idf_svc::sys::esp_efuse_mac_get_default(mac.as_mut_ptr()) };
        if ret != esp_idf_svc::sys::ESP_OK {
            warn!("esp_efuse_mac_get_default failed ({ret})");
            return [u32::MAX; 2];
        }
        [
            u32::from_le_bytes([mac[0], mac[1], mac[2], 0]),
            u32::from_le_bytes([mac[3], mac[4], mac[5], 0]),
        ]
    }

    pub fn run(config: &StationConfig) -> Result<()> {
        let peripherals = Peripherals::take()?;
        let sys_loop = EspSystemEventLoop::take()?;
        let nvs = EspDefaultNvsPartition::take()?;

        let link = WifiLink::start(peripherals.modem, sys_loop, nvs)?;
        wifi::spawn_watcher(link, &SHARED, config.window_ms)?;

        let _server = http_server::start(ControlSurface::new(&SHARED, LogTextSink), config.http_port)?;

        // Pins must match pins::I2C_SDA_GPIO / pins::I2C_SCL_GPIO.
        let i2c = I2cDriver::new(
            peripherals.i2c0,
            peripherals.pins.gpio8,
            peripherals.pins.gpio9,
            &I2cConfig::new().baudrate(pins::I2C_BAUDRATE_HZ.Hz()),
        )?;
        let bus = RefCell::new(i2c);

        let transducers: [Box<dyn Transducer + '_>; 4] = [
            Box::new(Tmp006::new(
                RefCellDevice::new(&bus),
                tmp006::DEFAULT_ADDRESS,
                config.sensor_timeout(),
            )),
            Box::new(Sht21::new(
                RefCellDevice::new(&bus),
                sht21::DEFAULT_ADDRESS,
                config.sensor_timeout(),
            )),
            Box::new(Bmp180::new(
                RefCellDevice::new(&bus),
                bmp180::DEFAULT_ADDRESS,
                config.bmp180_oversampling,
                config.sensor_timeout(),
            )),
            Box::new(Isl29023::new(
                RefCellDevice::new(&bus),
                isl29023::DEFAULT_ADDRESS,
                config.light_range_lux,
                config.sensor_timeout(),
            )),
        ];

        acquire(transducers, config)
    }
}

// ───────────────────────────────────────────────────────────────
// Host simulation
// ───────────────────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
mod platform {
    use std::io::BufRead;
    use std::thread;

    use anyhow::Result;
    use log::{info, warn};

    use weather_io::adapters::log_sink::LogTextSink;
    use weather_io::adapters::request;
    use weather_io::adapters::wifi::{self, WifiLink};
    use weather_io::app::control::ControlSurface;
    use weather_io::app::ports::Transducer;
    use weather_io::config::StationConfig;
    use weather_io::sensors::SimTransducer;
    use weather_io::shared::Channel;

    use super::{SHARED, acquire};

    /// Path of a JSON config overriding the defaults.
    const CONFIG_ENV: &str = "WEATHER_IO_CONFIG";

    pub fn init() -> Result<()> {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
        Ok(())
    }

    pub fn load_config() -> StationConfig {
        let Ok(path) = std::env::var(CONFIG_ENV) else {
            return StationConfig::default();
        };
        let loaded = std::fs::read_to_string(&path)
            .map_err(anyhow::Error::from)
            .and_then(|json| StationConfig::from_json(&json).map_err(anyhow::Error::from));
        match loaded {
            Ok(config) => {
                info!("Config loaded from {path}");
                config
            }
            Err(e) => {
                warn!("Config load from {path} failed ({e}), using defaults");
                StationConfig::default()
            }
        }
    }

    pub fn mac_user_words(config: &StationConfig) -> [u32; 2] {
        config.mac_user_words
    }

    pub fn run(config: &StationConfig) -> Result<()> {
        wifi::spawn_watcher(WifiLink::start(), &SHARED, config.window_ms)?;
        spawn_console()?;

        let transducers: [Box<dyn Transducer>; 4] =
            Channel::ALL.map(|channel| Box::new(SimTransducer::for_channel(channel)) as Box<dyn Transducer>);
        acquire(transducers, config)
    }

    /// Serve request URIs typed one per line on stdin, printing each page.
    fn spawn_console() -> Result<()> {
        thread::Builder::new().name("console".into()).spawn(|| {
            let mut surface = ControlSurface::new(&SHARED, LogTextSink);
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                let uri = line.trim();
                if uri.is_empty() {
                    continue;
                }
                match request::respond(&mut surface, uri) {
                    Some(page) => println!("{page}"),
                    None => warn!("404 {uri}"),
                }
            }
            info!("Console closed");
        })?;
        Ok(())
    }
}
