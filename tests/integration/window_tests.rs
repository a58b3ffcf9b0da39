//! Sampling windows: network readiness gating, window close and the
//! acquisition refill that follows.

use core::net::Ipv4Addr;

use weather_io::acquisition::AcquisitionLoop;
use weather_io::animation::{AnimationTimer, Animator};
use weather_io::app::ports::{LedPort, Transducer};
use weather_io::net::{AddressStatus, NetLink};
use weather_io::sensors::SimTransducer;
use weather_io::shared::{ActuatorState, Channel, Percent, SharedState};
use weather_io::tick::{Decimal, TickScheduler};

use crate::mock_bus::{CountingIdle, LineSink};

fn sim_station() -> AcquisitionLoop<'static> {
    let transducers: [Box<dyn Transducer>; 4] =
        Channel::ALL.map(|ch| Box::new(SimTransducer::for_channel(ch)) as Box<dyn Transducer>);
    AcquisitionLoop::new(transducers, 8).unwrap()
}

fn bring_up(shared: &SharedState) {
    let mut net = NetLink::new(50);
    net.observe(AddressStatus::NoLink, shared);
    net.observe(AddressStatus::Pending, shared);
    assert!(!shared.is_net_ready());
    assert!(net.observe(AddressStatus::Assigned(Ipv4Addr::new(192, 168, 1, 100)), shared));
    assert!(shared.is_net_ready());
}

#[test]
fn no_telemetry_before_address() {
    let shared = SharedState::new();
    let scheduler = TickScheduler::new(5);
    let mut sink = LineSink::default();

    for _ in 0..20 {
        assert!(scheduler.on_tick(&shared, &mut (), &mut sink).is_none());
    }
    assert!(sink.lines.is_empty());
    assert_eq!(shared.window_ticks(), 0);
}

#[test]
fn window_closes_every_n_ticks_and_clears_readings() {
    let shared = SharedState::new();
    bring_up(&shared);

    let mut acq = sim_station();
    let mut idle = CountingIdle::default();
    for _ in 0..100 {
        acq.poll_once(&shared, &mut idle);
    }
    assert!(shared.all_ready());

    let scheduler = TickScheduler::new(5);
    let mut sink = LineSink::default();
    for _ in 0..4 {
        assert!(scheduler.on_tick(&shared, &mut (), &mut sink).is_none());
    }
    assert!(shared.all_ready(), "readings survive until the window closes");

    let frame = scheduler.on_tick(&shared, &mut (), &mut sink).unwrap();
    assert_eq!(frame.get(Channel::Light), Decimal::from_f32(shared.reading(Channel::Light).value()));
    assert_eq!(sink.lines.len(), 1);
    assert!(sink.lines[0].starts_with("Temperature: "));
    assert_eq!(shared.windows_closed(), 1);
    for ch in Channel::ALL {
        assert!(!shared.reading(ch).is_ready());
    }

    for _ in 0..100 {
        acq.poll_once(&shared, &mut idle);
    }
    assert!(shared.all_ready());
    for _ in 0..5 {
        scheduler.on_tick(&shared, &mut (), &mut sink);
    }
    assert_eq!(sink.lines.len(), 2);
    assert_eq!(shared.windows_closed(), 2);
}

#[test]
fn readiness_stays_latched_through_link_loss() {
    let shared = SharedState::new();
    let mut net = NetLink::new(50);
    net.observe(AddressStatus::Assigned(Ipv4Addr::new(10, 0, 0, 2)), &shared);
    assert!(!net.observe(AddressStatus::NoLink, &shared));
    assert!(shared.is_net_ready());

    let scheduler = TickScheduler::new(2);
    let mut sink = LineSink::default();
    for _ in 0..4 {
        scheduler.on_tick(&shared, &mut (), &mut sink);
    }
    assert_eq!(sink.lines.len(), 2);
}

#[test]
fn stale_channel_is_reported_with_its_last_value() {
    let shared = SharedState::new();
    bring_up(&shared);
    let scheduler = TickScheduler::new(3);
    let mut sink = LineSink::default();

    shared.deposit(Channel::Temperature, 21.25);
    shared.deposit(Channel::Humidity, 40.5);
    shared.deposit(Channel::Pressure, 101_000.0);
    shared.deposit(Channel::Light, 12.0);
    for _ in 0..3 {
        scheduler.on_tick(&shared, &mut (), &mut sink);
    }

    // Only three channels refresh in the next window.
    shared.deposit(Channel::Temperature, -0.5);
    shared.deposit(Channel::Pressure, 100_999.0);
    shared.deposit(Channel::Light, 13.0);
    for _ in 0..3 {
        scheduler.on_tick(&shared, &mut (), &mut sink);
    }

    assert_eq!(
        sink.lines,
        [
            "Temperature: 21.250,  Humidity: 40.500,  Pressure: 101000.000, Light: 12.000",
            "Temperature: -0.500,  Humidity: 40.500,  Pressure: 100999.000, Light: 13.000",
        ]
    );
}

// ── Animation on the tick ─────────────────────────────────────

#[derive(Default)]
struct Led {
    on: bool,
    changes: u32,
}

impl LedPort for Led {
    fn set_led(&mut self, on: bool) {
        if self.on != on {
            self.changes += 1;
        }
        self.on = on;
    }
}

#[test]
fn full_speed_animation_blinks_the_led() {
    let shared = SharedState::new();
    shared.set_actuator(ActuatorState {
        led_on: true,
        speed: Percent::MAX,
    });

    // 100 Hz tick, 10 frames/s at full speed: one frame per 10 ticks.
    let scheduler = TickScheduler::new(5);
    let mut timer = AnimationTimer::new(100, 10);
    let mut sink = LineSink::default();
    let mut animator = Animator::new();
    let mut led = Led::default();

    let mut frames = 0;
    for _ in 0..100 {
        scheduler.on_tick(&shared, &mut timer, &mut sink);
        if animator.poll(&shared, &mut led) {
            frames += 1;
        }
    }
    assert_eq!(frames, 10);
    assert!(led.changes >= 9);
    // Animation runs whether or not the network is up.
    assert!(sink.lines.is_empty());
}

#[test]
fn led_off_overrides_animation() {
    let shared = SharedState::new();
    shared.set_actuator(ActuatorState {
        led_on: false,
        speed: Percent::new(50).unwrap(),
    });

    let scheduler = TickScheduler::new(5);
    let mut timer = AnimationTimer::new(100, 10);
    let mut sink = LineSink::default();
    let mut animator = Animator::new();
    let mut led = Led::default();

    for _ in 0..200 {
        scheduler.on_tick(&shared, &mut timer, &mut sink);
        animator.poll(&shared, &mut led);
    }
    assert!(!led.on);
    assert_eq!(led.changes, 0);
}
