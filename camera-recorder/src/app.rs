use std::convert::Infallible;

use common::report::ProgressReporter;
use common::run_loop::{run_session, LoopExit, LoopSettings};
use common::{format_ticks, EngineEvent, Result};
use tokio::sync::mpsc;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::engine::CaptureEngine;
use crate::session::{RecorderSession, RecordingState};

#[derive(Debug, Clone)]
pub struct RecordingSummary {
    pub session_id: Uuid,
    pub exit: LoopExit,
    pub state: RecordingState,
}

/// Starts capturing and records until an interrupt arrives and the file is
/// finalized, or the engine stops on its own.
pub async fn run_recorder<E, R>(
    mut session: RecorderSession<E, R>,
    mut events: mpsc::UnboundedReceiver<EngineEvent<Infallible>>,
    settings: LoopSettings,
    mut interrupts: mpsc::UnboundedReceiver<()>,
) -> Result<RecordingSummary>
where
    E: CaptureEngine,
    R: ProgressReporter,
{
    let session_id = Uuid::new_v4();
    let span = info_span!("recording", %session_id);

    async move {
        if let Err(e) = session.start() {
            session.teardown();
            return Err(e);
        }

        session.reporter_mut().banner("Recording...");
        session.reporter_mut().banner("");

        let exit = run_session(&mut session, &mut events, settings, &mut interrupts).await;
        info!(?exit, "Run loop finished");

        let state = session.teardown();
        if state.is_finishing() && !state.is_finalized() {
            warn!("Recording was not finalized, the output file may be truncated");
        }
        info!(elapsed = %format_ticks(state.position()), "Recording session closed");

        Ok(RecordingSummary {
            session_id,
            exit,
            state,
        })
    }
    .instrument(span)
    .await
}

/// Records from the configured devices into `output` until Ctrl-C.
#[cfg(feature = "gst")]
pub async fn launch(output: &std::path::Path, config: &crate::config::RecorderConfig) -> Result<RecordingSummary> {
    use common::report::ConsoleReporter;

    use crate::gst_engine::GstCaptureEngine;

    common::gst_bridge::init()?;
    let (engine, events) = GstCaptureEngine::build(output, config)?;
    let session = RecorderSession::new(engine, config, ConsoleReporter::new());

    let interrupts = common::run_loop::interrupt_signals();
    let summary = run_recorder(session, events, config.loop_settings(), interrupts).await?;
    println!();
    println!("Ending...");
    Ok(summary)
}
