use common::lifecycle::{self, Lifecycle};
use common::report::ProgressReporter;
use common::run_loop::SessionController;
use common::{
    format_ticks, BusEvent, EngineEvent, Flow, Phase, QueryKind, Result, SeekFlags, SeekRequest,
    SessionError, Ticks,
};
use tracing::{debug, error, info, warn};

use crate::config::PlayerConfig;
use crate::engine::{PadOutcome, PlayerEngine};
use crate::policy::{PolicyAction, PolicyProgress, ScriptedPolicy};

/// Mutable state of one playback session.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    lifecycle: Lifecycle,
    duration: Option<Ticks>,
    position: Ticks,
    rate: f64,
    progress: PolicyProgress,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            lifecycle: Lifecycle::new(),
            duration: None,
            position: 0,
            rate: 1.0,
            progress: PolicyProgress::default(),
        }
    }
}

impl PlaybackState {
    pub fn phase(&self) -> Phase {
        self.lifecycle.phase()
    }

    pub fn is_alive(&self) -> bool {
        self.lifecycle.is_alive()
    }

    pub fn duration(&self) -> Option<Ticks> {
        self.duration
    }

    pub fn position(&self) -> Ticks {
        self.position
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn skip_ahead_fired(&self) -> bool {
        self.progress.skip_ahead_fired
    }

    pub fn rate_change_applied(&self) -> bool {
        self.progress.rate_change_applied
    }
}

/// Interactive player session: dynamic linking, bus handling, progress
/// monitoring and the scripted seek policy.
pub struct PlayerSession<E, R> {
    engine: E,
    reporter: R,
    state: PlaybackState,
    policy: ScriptedPolicy,
    watched_element: String,
}

impl<E, R> PlayerSession<E, R>
where
    E: PlayerEngine,
    R: ProgressReporter,
{
    pub fn new(engine: E, config: &PlayerConfig, reporter: R) -> Self {
        Self {
            engine,
            reporter,
            state: PlaybackState::default(),
            policy: config.policy.clone(),
            watched_element: config.elements.sink_name.clone(),
        }
    }

    pub fn state(&self) -> &PlaybackState {
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

    /// Final step of topology building: start playback.
    pub fn start(&mut self) -> Result<()> {
        self.engine.set_phase(Phase::Playing)
    }

    /// Reports the link made on the engine thread when the source exposed a
    /// new pad.
    pub fn handle_pad_added(&mut self, outcome: PadOutcome) -> Flow {
        match outcome {
            PadOutcome::AlreadyLinked { pad } => {
                info!(%pad, "Received new pad");
                debug!("We are already linked. Ignoring.");
                Flow::Continue
            }
            PadOutcome::NoCaps { pad } => {
                info!(%pad, "Pad has no negotiated caps. Ignoring.");
                Flow::Continue
            }
            PadOutcome::Ignored { pad, media_type } => {
                info!(%pad, "It has type '{}' which is not accepted. Ignoring.", media_type);
                Flow::Continue
            }
            PadOutcome::LinkFailed {
                pad,
                media_type,
                error,
            } => {
                error!(%pad, %media_type, "{}", error);
                self.reporter.end_line();
                Flow::Stop
            }
            PadOutcome::Linked { pad, descriptor } => {
                info!(%pad, "Link succeeded");
                self.reporter.detail("Type", &descriptor.media_type);
                self.reporter.detail("Size", &descriptor.structure_count.to_string());
                self.reporter.detail("Rate", &format!("{:.1}", self.state.rate));
                self.record_duration();
                Flow::Continue
            }
        }
    }

    fn record_duration(&mut self) {
        if self.state.duration.is_some() {
            return;
        }

        match self.engine.query_duration() {
            Some(duration) => {
                self.state.duration = Some(duration);
                self.reporter.detail("Duration", &format_ticks(duration));
            }
            None => warn!(
                "{}, position policies disabled",
                SessionError::QueryFailed {
                    query: QueryKind::Duration
                }
            ),
        }
    }

    pub fn handle_bus_event(&mut self, event: BusEvent) -> Flow {
        lifecycle::handle_bus_event(
            &mut self.state.lifecycle,
            &mut self.engine,
            &mut self.reporter,
            &self.watched_element,
            event,
        )
    }

    /// Periodic progress monitor.
    pub fn refresh(&mut self) -> Flow {
        if !self.state.is_alive() {
            return Flow::Continue;
        }

        match self.engine.query_position() {
            Some(position) => self.state.position = position,
            None => {
                warn!(
                    "{}",
                    SessionError::QueryFailed {
                        query: QueryKind::Position
                    }
                );
                return Flow::Continue;
            }
        }

        let position = self.state.position;
        let Some(duration) = self.state.duration else {
            self.reporter.progress("Position", position);
            return Flow::Continue;
        };

        if position >= duration {
            self.reporter.end_line();
            return Flow::Stop;
        }
        self.reporter.progress("Position", position);

        match self.policy.evaluate(position, duration, self.state.progress) {
            Some(PolicyAction::SkipAhead { target }) => self.skip_ahead(target),
            Some(PolicyAction::SpeedUp { rate }) => {
                self.reporter.end_line();
                self.state.progress.rate_change_applied = true;
                self.state.rate = rate;
                self.send_seek_event();
            }
            None => {}
        }

        Flow::Continue
    }

    fn skip_ahead(&mut self, target: Ticks) {
        self.reporter.end_line();
        match self.engine.seek_simple(SeekFlags::FLUSH_KEY_UNIT, target) {
            Ok(()) => {
                info!(target = %format_ticks(target), "Skipped ahead");
                self.state.progress.skip_ahead_fired = true;
            }
            Err(e) => warn!("{}", e),
        }
    }

    /// Seek command issuer: re-seeks at the current rate from the current
    /// position.
    pub fn send_seek_event(&mut self) {
        let request = SeekRequest::for_rate(self.state.rate, self.state.position);
        if let Err(e) = self.engine.send_seek(&request) {
            warn!("{}", e);
            return;
        }
        self.reporter.detail("Rate", &format!("{:.1}", self.state.rate));
    }

    /// Forces the engine to NULL and releases every handle.
    pub fn teardown(mut self) -> PlaybackState {
        self.reporter.end_line();
        self.engine.shutdown();
        self.state.lifecycle.mark_released();
        self.state
    }
}

impl<E, R> SessionController for PlayerSession<E, R>
where
    E: PlayerEngine,
    R: ProgressReporter,
{
    type Pad = PadOutcome;

    fn on_engine_event(&mut self, event: EngineEvent<PadOutcome>) -> Flow {
        match event {
            EngineEvent::PadAdded(outcome) => self.handle_pad_added(outcome),
            EngineEvent::Bus(event) => self.handle_bus_event(event),
        }
    }

    fn on_tick(&mut self) -> Flow {
        self.refresh()
    }
}
