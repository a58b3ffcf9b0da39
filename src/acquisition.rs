//! Non-blocking acquisition loop (task context).
//!
//! Each pass advances the measurement sequence of every channel whose
//! freshness flag is still clear.  Once all four channels are fresh there is
//! nothing left to do until the tick handler closes the window, so the loop
//! parks the CPU in the platform's low-power wait.
//!
//! ```text
//!            ┌──────────── all ready? ───────────┐
//!            │ no                                │ yes
//!            ▼                                   ▼
//!   for ch in channels where !ready       idle.wait_for_interrupt()
//!       transducer.advance()                     │
//!        ├─ Pending   → next channel             │ (next tick)
//!        ├─ Done(v)   → deposit(ch, v)           │
//!        └─ Failed(e) → restart, count failure   │
//!            │                                   │
//!            └──────────────── loop ◀────────────┘
//! ```
//!
//! A failing channel never blocks the others: every step is a single bus
//! transaction, so a pass always visits all four transducers.

use log::{debug, info, warn};

use crate::app::ports::{IdleWait, Step, Transducer};
use crate::error::{Error, Result, SensorError};
use crate::shared::{Channel, SharedState};

/// What one call to [`AcquisitionLoop::poll_once`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    /// Every channel was fresh; the loop waited for the next interrupt.
    Slept,
    /// A measurement pass ran.
    Advanced { completed: u8, failed: u8 },
}

struct Slot<'a> {
    transducer: Box<dyn Transducer + 'a>,
    /// Consecutive failures since the last good measurement.
    failures: u32,
    /// Failure count at which the next warning is logged.
    next_warn: u32,
}

impl Slot<'_> {
    fn on_success(&mut self, channel: Channel, warn_threshold: u32) {
        if self.failures >= warn_threshold {
            info!(
                "Acquisition: {} recovered after {} failures",
                channel.label(),
                self.failures
            );
        }
        self.failures = 0;
        self.next_warn = warn_threshold;
    }

    fn on_failure(&mut self, channel: Channel, error: SensorError) {
        self.failures = self.failures.saturating_add(1);
        if self.failures >= self.next_warn {
            warn!(
                "Acquisition: {} failing ({}), {} consecutive failures",
                channel.label(),
                error,
                self.failures
            );
            self.next_warn = self.next_warn.saturating_mul(2);
        } else {
            debug!("Acquisition: {} step failed: {}", channel.label(), error);
        }
    }
}

/// Drives the four transducers until every channel is fresh.
pub struct AcquisitionLoop<'a> {
    slots: [Slot<'a>; Channel::COUNT],
    warn_threshold: u32,
}

impl<'a> AcquisitionLoop<'a> {
    /// Build the loop from one transducer per channel (any order).
    pub fn new(
        transducers: [Box<dyn Transducer + 'a>; Channel::COUNT],
        warn_threshold: u32,
    ) -> Result<Self> {
        let mut seen = [false; Channel::COUNT];
        for t in &transducers {
            let idx = t.channel().index();
            if seen[idx] {
                return Err(Error::Init("two transducers for one channel"));
            }
            seen[idx] = true;
        }

        let warn_threshold = warn_threshold.max(1);
        Ok(Self {
            slots: transducers.map(|transducer| Slot {
                transducer,
                failures: 0,
                next_warn: warn_threshold,
            }),
            warn_threshold,
        })
    }

    /// Consecutive failures currently recorded for `channel`.
    pub fn failures(&self, channel: Channel) -> u32 {
        self.slots
            .iter()
            .find(|s| s.transducer.channel() == channel)
            .map_or(0, |s| s.failures)
    }

    /// Run one pass, or wait for the next interrupt if all channels are fresh.
    pub fn poll_once(&mut self, shared: &SharedState, idle: &mut impl IdleWait) -> PassOutcome {
        if shared.all_ready() {
            idle.wait_for_interrupt();
            return PassOutcome::Slept;
        }

        let mut completed = 0;
        let mut failed = 0;

        for slot in &mut self.slots {
            let channel = slot.transducer.channel();
            if shared.reading(channel).is_ready() {
                continue;
            }

            match slot.transducer.advance() {
                Step::Pending => {}
                Step::Done(value) => {
                    shared.deposit(channel, value);
                    slot.on_success(channel, self.warn_threshold);
                    completed += 1;
                }
                Step::Failed(error) => {
                    slot.transducer.restart();
                    slot.on_failure(channel, error);
                    failed += 1;
                }
            }
        }

        PassOutcome::Advanced { completed, failed }
    }

    /// Run forever, calling `after_pass` once per pass for other
    /// task-context work (animation frames).
    pub fn run(
        &mut self,
        shared: &SharedState,
        idle: &mut impl IdleWait,
        mut after_pass: impl FnMut(&SharedState),
    ) -> ! {
        info!("Acquisition: loop started");
        loop {
            self.poll_once(shared, idle);
            after_pass(shared);
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
