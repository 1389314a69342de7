use std::convert::Infallible;

use common::lifecycle::{self, Lifecycle};
use common::report::ProgressReporter;
use common::run_loop::SessionController;
use common::{BusEvent, EngineEvent, Flow, Phase, QueryKind, Result, SessionError, Ticks};
use tracing::{info, warn};

use crate::config::RecorderConfig;
use crate::engine::CaptureEngine;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingState {
    lifecycle: Lifecycle,
    position: Ticks,
    finishing: bool,
    finalized: bool,
}

impl RecordingState {
    pub fn phase(&self) -> Phase {
        self.lifecycle.phase()
    }

    pub fn is_alive(&self) -> bool {
        self.lifecycle.is_alive()
    }

    /// Elapsed recording time at the last successful poll.
    pub fn position(&self) -> Ticks {
        self.position
    }

    /// End-of-stream was injected after an interrupt.
    pub fn is_finishing(&self) -> bool {
        self.finishing
    }

    /// The muxer confirmed end-of-stream, so the file is complete.
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }
}

/// Capture session with a fixed topology; runs until interrupted.
pub struct RecorderSession<E, R> {
    engine: E,
    reporter: R,
    state: RecordingState,
    watched_element: String,
}

impl<E, R> RecorderSession<E, R>
where
    E: CaptureEngine,
    R: ProgressReporter,
{
    pub fn new(engine: E, config: &RecorderConfig, reporter: R) -> Self {
        Self {
            engine,
            reporter,
            state: RecordingState::default(),
            watched_element: config.elements.sink_name.clone(),
        }
    }

    pub fn state(&self) -> &RecordingState {
        &self.state
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    pub fn reporter_mut(&mut self) -> &mut R {
        &mut self.reporter
    }

    pub fn start(&mut self) -> Result<()> {
        self.engine.set_phase(Phase::Playing)
    }

    pub fn handle_bus_event(&mut self, event: BusEvent) -> Flow {
        if event == BusEvent::EndOfStream {
            self.state.finalized = true;
        }
        lifecycle::handle_bus_event(
            &mut self.state.lifecycle,
            &mut self.engine,
            &mut self.reporter,
            &self.watched_element,
            event,
        )
    }

    /// Reports elapsed recording time while the sink is PLAYING.
    pub fn refresh(&mut self) -> Flow {
        if self.state.phase() != Phase::Playing || !self.state.is_alive() {
            return Flow::Continue;
        }

        match self.engine.query_position() {
            Some(position) => {
                self.state.position = position;
                self.reporter.progress("Duration", position);
            }
            None => warn!(
                "{}",
                SessionError::QueryFailed {
                    query: QueryKind::Position
                }
            ),
        }

        Flow::Continue
    }

    /// First interrupt finalizes the file; a second one gives up waiting.
    pub fn interrupt(&mut self) -> Flow {
        self.reporter.end_line();
        if self.state.finishing {
            return Flow::Stop;
        }

        match self.engine.finish() {
            Ok(()) => {
                info!("Finalizing recording");
                self.state.finishing = true;
                Flow::Continue
            }
            Err(e) => {
                warn!("{}", e);
                Flow::Stop
            }
        }
    }

    pub fn teardown(mut self) -> RecordingState {
        self.reporter.end_line();
        self.engine.shutdown();
        self.state.lifecycle.mark_released();
        self.state
    }
}

impl<E, R> SessionController for RecorderSession<E, R>
where
    E: CaptureEngine,
    R: ProgressReporter,
{
    type Pad = Infallible;

    fn on_engine_event(&mut self, event: EngineEvent<Infallible>) -> Flow {
        match event {
            EngineEvent::PadAdded(never) => match never {},
            EngineEvent::Bus(event) => self.handle_bus_event(event),
        }
    }

    fn on_tick(&mut self) -> Flow {
        self.refresh()
    }

    fn on_interrupt(&mut self) -> Flow {
        self.interrupt()
    }
}
