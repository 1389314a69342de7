use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{interval, sleep, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::events::EngineEvent;
use crate::types::Flow;

/// Typed handlers dispatched by [`run_session`].
pub trait SessionController {
    type Pad;

    fn on_engine_event(&mut self, event: EngineEvent<Self::Pad>) -> Flow;

    fn on_tick(&mut self) -> Flow;

    /// Called on every interrupt. Returning [`Flow::Continue`] from the first
    /// one keeps dispatching engine events until the drain
    /// timeout elapses.
    fn on_interrupt(&mut self) -> Flow {
        Flow::Stop
    }
}

/// Why the run loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// An engine event handler requested termination.
    EngineStopped,
    /// The progress monitor signalled the end of the stream.
    MonitorStopped,
    Interrupted,
    /// Interrupted, and the engine did not finish within the drain timeout.
    DrainTimeout,
    /// The engine dropped its event sender.
    ChannelClosed,
}

#[derive(Debug, Clone, Copy)]
pub struct LoopSettings {
    pub tick_interval: Duration,
    pub drain_timeout: Duration,
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(10),
            drain_timeout: Duration::from_secs(5),
        }
    }
}

/// Delivers one message per Ctrl-C for as long as the receiver lives.
pub fn interrupt_signals() -> mpsc::UnboundedReceiver<()> {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if tx.send(()).is_err() {
                break;
            }
        }
    });
    rx
}

/// Dispatches engine events, timer ticks and interrupts one at a time until
/// a handler asks to stop.
///
/// Engine events always win over a pending tick, so a tick never observes a
/// state older than the last delivered event. The drain deadline starts with
/// the first interrupt the controller chooses to survive.
pub async fn run_session<C>(
    controller: &mut C,
    events: &mut mpsc::UnboundedReceiver<EngineEvent<C::Pad>>,
    settings: LoopSettings,
    interrupts: &mut mpsc::UnboundedReceiver<()>,
) -> LoopExit
where
    C: SessionController,
{
    let mut ticker = interval(settings.tick_interval.max(Duration::from_millis(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let drain = sleep(settings.drain_timeout);
    tokio::pin!(drain);

    let mut interrupts_open = true;
    let mut draining = false;

    loop {
        tokio::select! {
            biased;

            event = events.recv() => match event {
                Some(event) => {
                    if controller.on_engine_event(event).is_stop() {
                        return LoopExit::EngineStopped;
                    }
                }
                None => {
                    debug!("Engine event channel closed");
                    return LoopExit::ChannelClosed;
                }
            },

            interrupt = interrupts.recv(), if interrupts_open => match interrupt {
                Some(()) => {
                    info!("Interrupt received");
                    match controller.on_interrupt() {
                        Flow::Stop => return LoopExit::Interrupted,
                        Flow::Continue if !draining => {
                            drain.as_mut().reset(Instant::now() + settings.drain_timeout);
                            draining = true;
                        }
                        Flow::Continue => {}
                    }
                }
                None => interrupts_open = false,
            },

            _ = &mut drain, if draining => {
                info!("Engine did not finish within {:?}", settings.drain_timeout);
                return LoopExit::DrainTimeout;
            }

            _ = ticker.tick() => {
                if controller.on_tick().is_stop() {
                    return LoopExit::MonitorStopped;
                }
            }
        }
    }
}
