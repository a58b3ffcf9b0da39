//! Simulated transducer for host builds and tests.
//!
//! Produces a deterministic triangle wave around a base value, taking a
//! configurable number of `Pending` steps per sample so the acquisition loop
//! sees multi-step sequences just like on hardware.  Failures can be
//! injected every N-th step.

use crate::app::ports::{Step, Transducer};
use crate::error::SensorError;
use crate::shared::Channel;

/// Samples in one half of the triangle wave.
const HALF_PERIOD: u32 = 20;

pub struct SimTransducer {
    channel: Channel,
    base: f32,
    amplitude: f32,
    steps_per_sample: u32,
    fail_every: Option<u32>,
    step: u32,
    total_steps: u32,
    sample: u32,
}

impl SimTransducer {
    pub fn new(channel: Channel, base: f32, amplitude: f32, steps_per_sample: u32) -> Self {
        Self {
            channel,
            base,
            amplitude,
            steps_per_sample: steps_per_sample.max(1),
            fail_every: None,
            step: 0,
            total_steps: 0,
            sample: 0,
        }
    }

    /// A plausible indoor signal for `channel`.
    pub fn for_channel(channel: Channel) -> Self {
        match channel {
            Channel::Temperature => Self::new(channel, 21.5, 1.5, 3),
            Channel::Humidity => Self::new(channel, 45.0, 5.0, 2),
            Channel::Pressure => Self::new(channel, 101_325.0, 120.0, 4),
            Channel::Light => Self::new(channel, 320.0, 80.0, 3),
        }
    }

    /// Fail every `n`-th step with a bus error (`0` disables).
    pub fn with_failures(mut self, n: u32) -> Self {
        self.fail_every = (n > 0).then_some(n);
        self
    }

    /// Value of the given sample index.
    pub fn value_at(&self, sample: u32) -> f32 {
        let phase = sample % (2 * HALF_PERIOD);
        let rising = if phase < HALF_PERIOD {
            phase
        } else {
            2 * HALF_PERIOD - phase
        };
        let unit = rising as f32 / HALF_PERIOD as f32 * 2.0 - 1.0;
        self.base + self.amplitude * unit
    }

    pub fn samples_taken(&self) -> u32 {
        self.sample
    }
}

impl Transducer for SimTransducer {
    fn channel(&self) -> Channel {
        self.channel
    }

    fn advance(&mut self) -> Step {
        self.total_steps = self.total_steps.wrapping_add(1);
        if self.fail_every.is_some_and(|n| self.total_steps % n == 0) {
            return Step::Failed(SensorError::Bus);
        }

        self.step += 1;
        if self.step < self.steps_per_sample {
            return Step::Pending;
        }
        self.step = 0;
        let value = self.value_at(self.sample);
        self.sample = self.sample.wrapping_add(1);
        Step::Done(value)
    }

    fn restart(&mut self) {
        self.step = 0;
    }
}
