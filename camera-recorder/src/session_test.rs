#[cfg(test)]
mod tests {
    use crate::app::run_recorder;
    use crate::config::RecorderConfig;
    use crate::mock_engine::MockCaptureEngine;
    use crate::session::RecorderSession;
    use common::report::{ReportEntry, ReportLog};
    use common::run_loop::{LoopExit, LoopSettings, SessionController};
    use common::{BusEvent, EngineEvent, Flow, Phase, TICKS_PER_SECOND};
    use std::convert::Infallible;
    use std::rc::Rc;
    use std::time::Duration;
    use tokio::sync::mpsc;

    const SINK: &str = "record-sink";

    type TestSession = RecorderSession<MockCaptureEngine, ReportLog>;

    fn session(engine: MockCaptureEngine) -> TestSession {
        RecorderSession::new(engine, &RecorderConfig::default(), ReportLog::new())
    }

    fn sink_state(old: Phase, new: Phase) -> BusEvent {
        BusEvent::StateChanged {
            old,
            new,
            source: SINK.to_string(),
        }
    }

    /// Interrupt channel with `count` Ctrl-C presses already queued.
    fn interrupts(count: usize) -> (mpsc::UnboundedSender<()>, mpsc::UnboundedReceiver<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        for _ in 0..count {
            tx.send(()).unwrap();
        }
        (tx, rx)
    }

    fn settings() -> LoopSettings {
        LoopSettings {
            tick_interval: Duration::from_millis(1),
            drain_timeout: Duration::from_millis(20),
        }
    }

    #[test]
    fn test_monitor_skips_unless_playing() {
        let engine = MockCaptureEngine {
            position: Some(TICKS_PER_SECOND),
            ..MockCaptureEngine::default()
        };
        let mut session = session(engine);

        assert_eq!(session.on_tick(), Flow::Continue);
        session.handle_bus_event(sink_state(Phase::Ready, Phase::Paused));
        assert_eq!(session.on_tick(), Flow::Continue);
        assert_eq!(session.engine().position_queries.get(), 0);

        session.handle_bus_event(sink_state(Phase::Paused, Phase::Playing));
        assert_eq!(session.on_tick(), Flow::Continue);
        assert_eq!(session.engine().position_queries.get(), 1);
        assert_eq!(session.state().position(), TICKS_PER_SECOND);
        assert_eq!(
            session.reporter().entries().last(),
            Some(&ReportEntry::Progress {
                label: "Duration".to_string(),
                position: TICKS_PER_SECOND
            })
        );
    }

    #[test]
    fn test_failed_position_query_keeps_recording() {
        let mut session = session(MockCaptureEngine::default());
        session.handle_bus_event(sink_state(Phase::Paused, Phase::Playing));

        assert_eq!(session.on_tick(), Flow::Continue);
        assert_eq!(session.state().position(), 0);
        assert!(session.reporter().progress_positions().is_empty());
    }

    #[test]
    fn test_foreign_state_changes_do_not_start_monitor() {
        let mut session = session(MockCaptureEngine {
            position: Some(5),
            ..MockCaptureEngine::default()
        });
        session.handle_bus_event(BusEvent::StateChanged {
            old: Phase::Paused,
            new: Phase::Playing,
            source: "video-source".to_string(),
        });

        session.on_tick();
        assert_eq!(session.engine().position_queries.get(), 0);
    }

    #[test]
    fn test_interrupt_sends_end_of_stream_once() {
        let mut session = session(MockCaptureEngine::default());

        assert_eq!(session.on_interrupt(), Flow::Continue);
        assert!(session.state().is_finishing());
        assert_eq!(session.engine().eos_sent, 1);

        // 第二次中断不再等待
        assert_eq!(session.on_interrupt(), Flow::Stop);
        assert_eq!(session.engine().eos_sent, 1);
    }

    #[test]
    fn test_rejected_end_of_stream_stops() {
        let mut session = session(MockCaptureEngine {
            refuse_eos: true,
            ..MockCaptureEngine::default()
        });

        assert_eq!(session.on_interrupt(), Flow::Stop);
        assert!(!session.state().is_finishing());
    }

    #[test]
    fn test_engine_error_stops_recording() {
        let mut session = session(MockCaptureEngine::default());
        session.handle_bus_event(sink_state(Phase::Paused, Phase::Playing));

        let flow = session.on_engine_event(EngineEvent::Bus(BusEvent::Error {
            message: "Could not open device".to_string(),
            debug: Some("v4l2src0".to_string()),
        }));

        assert_eq!(flow, Flow::Stop);
        assert!(!session.state().is_alive());
        assert_eq!(session.engine().requested_phases, vec![Phase::Ready]);
        assert!(!session.state().is_finalized());
    }

    #[test]
    fn test_failed_position_query_is_counted() {
        let mut session = session(MockCaptureEngine::default());
        session.handle_bus_event(sink_state(Phase::Paused, Phase::Playing));

        session.on_tick();
        session.on_tick();

        assert_eq!(session.engine().position_queries.get(), 2);
        assert!(session.state().is_alive());
    }

    #[test]
    fn test_teardown_reports_null_phase() {
        let engine = MockCaptureEngine::default();
        let shutdown_calls = Rc::clone(&engine.shutdown_calls);
        let mut session = session(engine);
        session.handle_bus_event(sink_state(Phase::Paused, Phase::Playing));
        assert_eq!(session.state().phase(), Phase::Playing);

        let state = session.teardown();

        assert_eq!(state.phase(), Phase::Null);
        assert!(!state.is_alive());
        assert_eq!(shutdown_calls.get(), 1);
    }

    #[tokio::test]
    async fn test_interrupt_drains_until_end_of_stream() {
        let (tx, rx) = mpsc::unbounded_channel::<EngineEvent<Infallible>>();
        tx.send(sink_state(Phase::Paused, Phase::Playing).into()).unwrap();
        let engine = MockCaptureEngine {
            position: Some(3 * TICKS_PER_SECOND),
            bus: Some(tx),
            ..MockCaptureEngine::default()
        };
        let shutdown_calls = Rc::clone(&engine.shutdown_calls);
        let (_itx, irx) = interrupts(1);

        let summary = run_recorder(session(engine), rx, settings(), irx)
            .await
            .unwrap();

        assert_eq!(summary.exit, LoopExit::EngineStopped);
        assert!(summary.state.is_finishing());
        assert!(summary.state.is_finalized());
        assert!(!summary.state.is_alive());
        assert_eq!(summary.state.phase(), Phase::Null);
        assert_eq!(shutdown_calls.get(), 1);
    }

    #[tokio::test]
    async fn test_drain_gives_up_after_timeout() {
        let engine = MockCaptureEngine::default();
        let shutdown_calls = Rc::clone(&engine.shutdown_calls);
        let (_tx, rx) = mpsc::unbounded_channel();
        let (_itx, irx) = interrupts(1);

        let summary = run_recorder(session(engine), rx, settings(), irx)
            .await
            .unwrap();

        assert_eq!(summary.exit, LoopExit::DrainTimeout);
        assert!(summary.state.is_finishing());
        assert!(!summary.state.is_finalized());
        assert_eq!(shutdown_calls.get(), 1);
    }

    #[tokio::test]
    async fn test_second_interrupt_abandons_drain() {
        let engine = MockCaptureEngine::default();
        let shutdown_calls = Rc::clone(&engine.shutdown_calls);
        let (_tx, rx) = mpsc::unbounded_channel();
        let (_itx, irx) = interrupts(2);
        let patient = LoopSettings {
            tick_interval: Duration::from_millis(1),
            drain_timeout: Duration::from_secs(30),
        };

        let summary = run_recorder(session(engine), rx, patient, irx)
            .await
            .unwrap();

        assert_eq!(summary.exit, LoopExit::Interrupted);
        assert!(summary.state.is_finishing());
        assert!(!summary.state.is_finalized());
        assert_eq!(shutdown_calls.get(), 1);
    }

    #[tokio::test]
    async fn test_refused_start_tears_down() {
        let engine = MockCaptureEngine {
            refuse_phase: true,
            ..MockCaptureEngine::default()
        };
        let shutdown_calls = Rc::clone(&engine.shutdown_calls);
        let (_tx, rx) = mpsc::unbounded_channel();
        let (_itx, irx) = interrupts(0);

        let result = run_recorder(session(engine), rx, settings(), irx).await;

        assert!(result.is_err());
        assert_eq!(shutdown_calls.get(), 1);
    }

    #[tokio::test]
    async fn test_recording_banner_is_printed() {
        let mut log = ReportLog::new();
        let (_tx, rx) = mpsc::unbounded_channel();
        let (_itx, irx) = interrupts(1);
        let session = RecorderSession::new(MockCaptureEngine::default(), &RecorderConfig::default(), &mut log);

        run_recorder(session, rx, settings(), irx).await.unwrap();

        assert_eq!(log.entries()[0], ReportEntry::Banner("Recording...".to_string()));
    }
}
