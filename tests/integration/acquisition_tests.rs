//! The four real drivers sharing one modelled bus, driven by the
//! acquisition loop.

use std::cell::RefCell;
use std::time::Duration;

use embedded_hal_bus::i2c::RefCellDevice;
use weather_io::acquisition::{AcquisitionLoop, PassOutcome};
use weather_io::app::ports::Transducer;
use weather_io::sensors::{Bmp180, Isl29023, Sht21, Tmp006};
use weather_io::shared::{Channel, SharedState};
use weather_io::tick::TelemetryFrame;

use crate::mock_bus::{BMP180, Board, CountingIdle, ISL29023, SHT21, TMP006};

const CONVERSION_TIMEOUT: Duration = Duration::from_secs(5);

fn station(bus: &RefCell<Board>) -> AcquisitionLoop<'_> {
    let transducers: [Box<dyn Transducer + '_>; 4] = [
        Box::new(Tmp006::new(RefCellDevice::new(bus), TMP006, CONVERSION_TIMEOUT)),
        Box::new(Sht21::new(RefCellDevice::new(bus), SHT21, CONVERSION_TIMEOUT)),
        Box::new(Bmp180::new(RefCellDevice::new(bus), BMP180, 0, CONVERSION_TIMEOUT)),
        Box::new(Isl29023::new(RefCellDevice::new(bus), ISL29023, 1000, CONVERSION_TIMEOUT)),
    ];
    AcquisitionLoop::new(transducers, 4).unwrap()
}

/// Poll until every channel is fresh; returns the number of passes.
fn fill(acq: &mut AcquisitionLoop<'_>, shared: &SharedState, idle: &mut CountingIdle) -> u32 {
    for pass in 1..=50 {
        acq.poll_once(shared, idle);
        if shared.all_ready() {
            return pass;
        }
    }
    panic!("channels never all became ready: {:?}", shared.values());
}

// ── Full acquisition ──────────────────────────────────────────

#[test]
fn all_four_channels_fill_from_the_bus() {
    let bus = RefCell::new(Board::new());
    let shared = SharedState::new();
    let mut idle = CountingIdle::default();
    let mut acq = station(&bus);

    let passes = fill(&mut acq, &shared, &mut idle);
    // BMP180 is the longest sequence: calibration plus six steps.
    assert_eq!(passes, 7);
    assert_eq!(idle.waits, 0);

    assert_eq!(shared.reading(Channel::Temperature).value(), 25.0);
    assert!((shared.reading(Channel::Humidity).value() - 44.888).abs() < 0.001);
    assert_eq!(shared.reading(Channel::Pressure).value(), 69_964.0);
    assert_eq!(shared.reading(Channel::Light).value(), 500.0);

    let line = TelemetryFrame::capture(&shared).to_line();
    assert_eq!(
        line.as_str(),
        "Temperature: 25.000,  Humidity: 44.888,  Pressure: 69964.000, Light: 500.000"
    );
}

#[test]
fn fresh_station_sleeps_instead_of_touching_the_bus() {
    let bus = RefCell::new(Board::new());
    let shared = SharedState::new();
    let mut idle = CountingIdle::default();
    let mut acq = station(&bus);
    fill(&mut acq, &shared, &mut idle);

    let writes = bus.borrow().writes.len();
    assert_eq!(acq.poll_once(&shared, &mut idle), PassOutcome::Slept);
    assert_eq!(acq.poll_once(&shared, &mut idle), PassOutcome::Slept);
    assert_eq!(idle.waits, 2);
    assert_eq!(bus.borrow().writes.len(), writes);
}

#[test]
fn sensor_setup_is_written_once() {
    let bus = RefCell::new(Board::new());
    let shared = SharedState::new();
    let mut idle = CountingIdle::default();
    let mut acq = station(&bus);
    fill(&mut acq, &shared, &mut idle);

    let board = bus.borrow();
    assert!(board.writes.contains(&(TMP006, vec![0x02, 0x75, 0x00])));
    // 16-bit resolution, 1000 lux range.
    assert!(board.writes.contains(&(ISL29023, vec![0x01, 0x00])));
    assert!(board.writes.contains(&(ISL29023, vec![0x00, 0x20])));
    assert!(board.writes.contains(&(BMP180, vec![0xF4, 0x2E])));
    assert!(board.writes.contains(&(BMP180, vec![0xF4, 0x34])));
}

// ── Faults ────────────────────────────────────────────────────

#[test]
fn busy_humidity_sensor_only_delays_its_channel() {
    let mut board = Board::new();
    board.humidity_busy_reads = 8;
    let bus = RefCell::new(board);
    let shared = SharedState::new();
    let mut idle = CountingIdle::default();
    let mut acq = station(&bus);

    for _ in 0..7 {
        acq.poll_once(&shared, &mut idle);
    }
    assert!(shared.reading(Channel::Temperature).is_ready());
    assert!(shared.reading(Channel::Pressure).is_ready());
    assert!(shared.reading(Channel::Light).is_ready());
    assert!(!shared.reading(Channel::Humidity).is_ready());
    assert_eq!(acq.failures(Channel::Humidity), 0, "NACK while busy is not a failure");

    fill(&mut acq, &shared, &mut idle);
    assert!((shared.reading(Channel::Humidity).value() - 44.888).abs() < 0.001);
}

#[test]
fn absent_chip_counts_failures_and_recovers() {
    let mut board = Board::new();
    board.absent.push(SHT21);
    let bus = RefCell::new(board);
    let shared = SharedState::new();
    let mut idle = CountingIdle::default();
    let mut acq = station(&bus);

    for _ in 0..10 {
        acq.poll_once(&shared, &mut idle);
    }
    assert!(!shared.all_ready());
    assert!(!shared.reading(Channel::Humidity).is_ready());
    assert_eq!(acq.failures(Channel::Humidity), 10);
    assert_eq!(acq.failures(Channel::Temperature), 0);
    assert!(shared.reading(Channel::Light).is_ready());

    bus.borrow_mut().absent.clear();
    fill(&mut acq, &shared, &mut idle);
    assert_eq!(acq.failures(Channel::Humidity), 0);
}

#[test]
fn corrupted_humidity_frame_never_deposits() {
    let mut board = Board::new();
    board.humidity_frame[2] ^= 0xFF;
    let bus = RefCell::new(board);
    let shared = SharedState::new();
    let mut idle = CountingIdle::default();
    let mut acq = station(&bus);

    for _ in 0..8 {
        acq.poll_once(&shared, &mut idle);
    }
    assert!(!shared.reading(Channel::Humidity).is_ready());
    assert_eq!(acq.failures(Channel::Humidity), 4);
}

#[test]
fn blank_bmp180_calibration_is_rejected() {
    let mut board = Board::new();
    board.bmp_calibration = [0xFF; 22];
    let bus = RefCell::new(board);
    let shared = SharedState::new();
    let mut idle = CountingIdle::default();
    let mut acq = station(&bus);

    for _ in 0..6 {
        acq.poll_once(&shared, &mut idle);
    }
    assert!(!shared.reading(Channel::Pressure).is_ready());
    assert_eq!(acq.failures(Channel::Pressure), 6);
}
