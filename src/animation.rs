//! LED animation pacing.
//!
//! The tick context only decides *when* a frame is due; the task context
//! decides what the frame looks like.  The handoff is the single
//! `animation_pending` flag in [`SharedState`].
//!
//! ```text
//!   tick ─▶ AnimationTimer.on_tick ──phase ≥ period──▶ raise frame flag
//!                                                           │
//!   task ─▶ Animator.poll ◀──────── take frame flag ────────┘
//!              └─▶ LedPort.set_led(..)
//! ```
//!
//! At speed `s` percent the animation advances `s * max_frame_hz / 100`
//! frames per second; speed 0 halts it.

use crate::app::ports::{Housekeeping, LedPort};
use crate::shared::SharedState;

/// Tick-context half: a phase accumulator driven by the commanded speed.
#[derive(Debug, Clone)]
pub struct AnimationTimer {
    /// Phase units per frame: `100 * tick_hz`.
    period: u32,
    max_frame_hz: u32,
    phase: u32,
}

impl AnimationTimer {
    pub fn new(tick_hz: u32, max_frame_hz: u32) -> Self {
        Self {
            period: 100 * tick_hz.max(1),
            max_frame_hz,
            phase: 0,
        }
    }
}

impl Housekeeping for AnimationTimer {
    fn on_tick(&mut self, shared: &SharedState) {
        let speed = u32::from(shared.actuator().speed.get());
        if speed == 0 {
            self.phase = 0;
            return;
        }

        self.phase += speed * self.max_frame_hz;
        if self.phase >= self.period {
            self.phase %= self.period;
            shared.raise_animation_frame();
        }
    }
}

/// Task-context half: turns frames into LED output.
#[derive(Debug, Default)]
pub struct Animator {
    frame: u32,
}

impl Animator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume a pending frame (if any) and drive the LED.
    /// Returns whether a frame was consumed.
    pub fn poll(&mut self, shared: &SharedState, led: &mut impl LedPort) -> bool {
        let advanced = shared.take_animation_frame();
        if advanced {
            self.frame = self.frame.wrapping_add(1);
        }

        let state = shared.actuator();
        let lit = if !state.led_on {
            false
        } else if state.speed.get() == 0 {
            true
        } else {
            self.frame % 2 == 0
        };
        led.set_led(lit);
        advanced
    }
}
