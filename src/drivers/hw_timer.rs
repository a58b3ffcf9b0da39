//! Periodic tick source and the matching low-power wait.
//!
//! On ESP-IDF the tick runs from an `esp_timer` periodic timer.  Its
//! callbacks execute in the ESP timer task, which sits above the HTTP
//! server task, so window bookkeeping is never starved by request handling.
//! On host targets a dedicated thread sleeps one period per tick and then
//! unparks the thread that started it (the acquisition loop).

use log::info;

use crate::app::ports::{Housekeeping, IdleWait, TelemetrySink};
use crate::error::Result;
use crate::shared::SharedState;
use crate::tick::TickScheduler;

#[cfg(target_os = "espidf")]
use crate::error::Error;
#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(not(target_os = "espidf"))]
use std::{thread, time::Duration};

/// Everything the tick handler owns.
pub struct TickContext<H, S> {
    pub shared: &'static SharedState,
    pub scheduler: TickScheduler,
    pub housekeeping: H,
    pub sink: S,
}

impl<H: Housekeeping, S: TelemetrySink> TickContext<H, S> {
    pub fn on_tick(&mut self) {
        self.scheduler
            .on_tick(self.shared, &mut self.housekeeping, &mut self.sink);
    }
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn tick_cb<H: Housekeeping, S: TelemetrySink>(arg: *mut core::ffi::c_void) {
    // SAFETY: `arg` is the leaked `TickContext` from `start`; only this
    // callback ever dereferences it, and the timer task runs it serially.
    let ctx = unsafe { &mut *arg.cast::<TickContext<H, S>>() };
    ctx.on_tick();
}

/// Start the periodic tick.  The context lives for the rest of the program.
#[cfg(target_os = "espidf")]
pub fn start<H, S>(ctx: TickContext<H, S>, period_ms: u32) -> Result<()>
where
    H: Housekeeping + Send + 'static,
    S: TelemetrySink + Send + 'static,
{
    let arg = Box::into_raw(Box::new(ctx));
    let args = esp_timer_create_args_t {
        callback: Some(tick_cb::<H, S>),
        arg: arg.cast(),
        dispatch_method: esp_timer_dispatch_t_ESP_TIMER_TASK,
        name: c"tick".as_ptr(),
        skip_unhandled_events: true,
    };
    let mut handle: esp_timer_handle_t = core::ptr::null_mut();

    // SAFETY: `args` outlives the create call and `arg` is never freed.
    let ret = unsafe { esp_timer_create(&args, &mut handle) };
    if ret != ESP_OK {
        log::error!("hw_timer: tick timer create failed (rc={})", ret);
        return Err(Error::Init("tick timer create failed"));
    }
    // SAFETY: `handle` was just created successfully.
    let ret = unsafe { esp_timer_start_periodic(handle, u64::from(period_ms) * 1000) };
    if ret != ESP_OK {
        log::error!("hw_timer: tick timer start failed (rc={})", ret);
        return Err(Error::Init("tick timer start failed"));
    }

    info!("hw_timer: tick every {} ms started", period_ms);
    Ok(())
}

/// Start the periodic tick on a host thread that wakes the calling thread
/// after every tick.
#[cfg(not(target_os = "espidf"))]
pub fn start<H, S>(mut ctx: TickContext<H, S>, period_ms: u32) -> Result<()>
where
    H: Housekeeping + Send + 'static,
    S: TelemetrySink + Send + 'static,
{
    let waiter = thread::current();
    let period = Duration::from_millis(u64::from(period_ms));
    thread::Builder::new()
        .name("tick".into())
        .spawn(move || {
            loop {
                thread::sleep(period);
                ctx.on_tick();
                waiter.unpark();
            }
        })
        .map_err(|_| crate::error::Error::Init("tick thread spawn failed"))?;

    info!("hw_timer(sim): tick every {} ms started", period_ms);
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// Idle wait
// ───────────────────────────────────────────────────────────────

/// Sleeps until the next tick (or at most one tick period).
pub struct TickIdle {
    period_ms: u32,
}

impl TickIdle {
    pub fn new(period_ms: u32) -> Self {
        Self {
            period_ms: period_ms.max(1),
        }
    }
}

impl IdleWait for TickIdle {
    #[cfg(target_os = "espidf")]
    fn wait_for_interrupt(&mut self) {
        esp_idf_hal::delay::FreeRtos::delay_ms(self.period_ms);
    }

    #[cfg(not(target_os = "espidf"))]
    fn wait_for_interrupt(&mut self) {
        thread::park_timeout(Duration::from_millis(u64::from(self.period_ms)));
    }
}
