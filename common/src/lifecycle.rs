use tracing::{debug, error, info, warn};

use crate::engine::PipelineEngine;
use crate::error::SessionError;
use crate::events::BusEvent;
use crate::report::ProgressReporter;
use crate::types::{Flow, Phase};

/// Phase and liveness of a session as reported by the watched element.
///
/// `alive` is only ever true while `phase` is PLAYING.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lifecycle {
    phase: Phase,
    alive: bool,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    fn observe(&mut self, new: Phase) {
        self.phase = new;
        self.alive = new == Phase::Playing;
    }

    fn mark_stopped(&mut self) {
        self.alive = false;
    }

    /// The engine was forced to NULL and its handles released.
    pub fn mark_released(&mut self) {
        self.phase = Phase::Null;
        self.alive = false;
    }
}

/// Reacts to one bus notification.
///
/// `watched` names the element whose state changes drive the lifecycle; state
/// changes of every other element are ignored.
pub fn handle_bus_event<E, R>(
    lifecycle: &mut Lifecycle,
    engine: &mut E,
    reporter: &mut R,
    watched: &str,
    event: BusEvent,
) -> Flow
where
    E: PipelineEngine + ?Sized,
    R: ProgressReporter + ?Sized,
{
    match event {
        BusEvent::Error { message, debug: details } => {
            let detail_text = details.as_deref().unwrap_or("none").to_string();
            let err = SessionError::Engine {
                message,
                debug: details,
            };
            error!(debug = %detail_text, "{}", err);
            reporter.end_line();
            stop_session(lifecycle, engine, reporter);
            Flow::Stop
        }
        BusEvent::EndOfStream => {
            info!("End of stream reached");
            stop_session(lifecycle, engine, reporter);
            Flow::Stop
        }
        BusEvent::StateChanged { old, new, source } => {
            if source != watched {
                return Flow::Continue;
            }
            lifecycle.observe(new);
            if old == Phase::Playing {
                reporter.end_line();
            }
            debug!(element = %source, %old, %new, "State changed");
            reporter.status(old, new);
            Flow::Continue
        }
        BusEvent::Other { .. } => Flow::Continue,
    }
}

fn stop_session<E, R>(lifecycle: &mut Lifecycle, engine: &mut E, reporter: &mut R)
where
    E: PipelineEngine + ?Sized,
    R: ProgressReporter + ?Sized,
{
    if let Err(e) = engine.set_phase(Phase::Ready) {
        warn!("{}", e);
    }
    lifecycle.mark_stopped();
    reporter.status(lifecycle.phase(), Phase::Ready);
}
