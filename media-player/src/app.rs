use common::report::ProgressReporter;
use common::run_loop::{run_session, LoopExit, LoopSettings};
use common::{format_ticks, EngineEvent, Result};
use tokio::sync::mpsc;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::engine::{PadOutcome, PlayerEngine};
use crate::session::{PlaybackState, PlayerSession};

/// What a finished playback session looked like.
#[derive(Debug, Clone)]
pub struct PlaybackSummary {
    pub session_id: Uuid,
    pub exit: LoopExit,
    pub state: PlaybackState,
}

/// Starts playback and drives the session until a handler, the monitor or
/// an interrupt ends it. The engine is torn down on every path.
pub async fn run_player<E, R>(
    mut session: PlayerSession<E, R>,
    mut events: mpsc::UnboundedReceiver<EngineEvent<PadOutcome>>,
    settings: LoopSettings,
    mut interrupts: mpsc::UnboundedReceiver<()>,
) -> Result<PlaybackSummary>
where
    E: PlayerEngine,
    R: ProgressReporter,
{
    let session_id = Uuid::new_v4();
    let span = info_span!("playback", %session_id);

    async move {
        if let Err(e) = session.start() {
            session.teardown();
            return Err(e);
        }

        session.reporter_mut().banner("Running...");
        session.reporter_mut().banner("");
        session.reporter_mut().banner("Information");

        let exit = run_session(&mut session, &mut events, settings, &mut interrupts).await;
        info!(?exit, "Run loop finished");

        let state = session.teardown();
        info!(
            position = %format_ticks(state.position()),
            rate = state.rate(),
            "Playback session closed"
        );

        Ok(PlaybackSummary {
            session_id,
            exit,
            state,
        })
    }
    .instrument(span)
    .await
}

/// Builds the GStreamer pipeline for `uri` and plays it to the console.
#[cfg(feature = "gst")]
pub async fn launch(uri: &str, config: &crate::config::PlayerConfig) -> Result<PlaybackSummary> {
    use common::report::ConsoleReporter;

    use crate::gst_engine::GstPlayerEngine;

    common::gst_bridge::init()?;
    let (engine, events) = GstPlayerEngine::build(uri, &config.elements)?;
    let session = PlayerSession::new(engine, config, ConsoleReporter::new());

    let interrupts = common::run_loop::interrupt_signals();
    let summary = run_player(session, events, config.loop_settings(), interrupts).await?;
    println!();
    println!("Ending...");
    Ok(summary)
}
