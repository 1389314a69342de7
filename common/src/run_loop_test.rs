#[cfg(test)]
mod tests {
    use crate::events::{BusEvent, EngineEvent};
    use crate::run_loop::{run_session, LoopExit, LoopSettings, SessionController};
    use crate::types::Flow;
    use std::time::Duration;
    use tokio::sync::mpsc;

    #[derive(Default)]
    struct ScriptedController {
        events_seen: Vec<EngineEvent<u32>>,
        ticks: usize,
        stop_after_ticks: Option<usize>,
        interrupts: usize,
        /// Interrupts answered with Continue before the next one stops.
        surviving_interrupts: usize,
        /// Posts end-of-stream when interrupted, like an engine finishing a file.
        eos_on_interrupt: Option<mpsc::UnboundedSender<EngineEvent<u32>>>,
    }

    impl SessionController for ScriptedController {
        type Pad = u32;

        fn on_engine_event(&mut self, event: EngineEvent<u32>) -> Flow {
            let stop = matches!(event, EngineEvent::Bus(BusEvent::EndOfStream));
            self.events_seen.push(event);
            if stop {
                Flow::Stop
            } else {
                Flow::Continue
            }
        }

        fn on_tick(&mut self) -> Flow {
            self.ticks += 1;
            match self.stop_after_ticks {
                Some(limit) if self.ticks >= limit => Flow::Stop,
                _ => Flow::Continue,
            }
        }

        fn on_interrupt(&mut self) -> Flow {
            self.interrupts += 1;
            if let Some(tx) = self.eos_on_interrupt.take() {
                tx.send(EngineEvent::Bus(BusEvent::EndOfStream)).unwrap();
            }
            if self.interrupts <= self.surviving_interrupts {
                Flow::Continue
            } else {
                Flow::Stop
            }
        }
    }

    fn fast_settings() -> LoopSettings {
        LoopSettings {
            tick_interval: Duration::from_millis(1),
            drain_timeout: Duration::from_millis(20),
        }
    }

    /// Interrupt channel with `count` signals already queued.
    fn interrupts(count: usize) -> (mpsc::UnboundedSender<()>, mpsc::UnboundedReceiver<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        for _ in 0..count {
            tx.send(()).unwrap();
        }
        (tx, rx)
    }

    #[tokio::test]
    async fn test_events_dispatched_in_order_until_stop() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        tx.send(EngineEvent::PadAdded(1)).unwrap();
        tx.send(EngineEvent::PadAdded(2)).unwrap();
        tx.send(EngineEvent::Bus(BusEvent::EndOfStream)).unwrap();
        tx.send(EngineEvent::PadAdded(3)).unwrap();
        let (_itx, mut irx) = interrupts(0);

        let mut controller = ScriptedController::default();
        let exit = run_session(&mut controller, &mut rx, fast_settings(), &mut irx).await;

        assert_eq!(exit, LoopExit::EngineStopped);
        assert_eq!(
            controller.events_seen,
            vec![
                EngineEvent::PadAdded(1),
                EngineEvent::PadAdded(2),
                EngineEvent::Bus(BusEvent::EndOfStream),
            ]
        );
        // 停止后不再分发后续事件
        assert_eq!(rx.try_recv().unwrap(), EngineEvent::PadAdded(3));
    }

    #[tokio::test]
    async fn test_monitor_stop_ends_loop() {
        let (_tx, mut rx) = mpsc::unbounded_channel::<EngineEvent<u32>>();
        let (_itx, mut irx) = interrupts(0);
        let mut controller = ScriptedController {
            stop_after_ticks: Some(3),
            ..Default::default()
        };

        let exit = run_session(&mut controller, &mut rx, fast_settings(), &mut irx).await;

        assert_eq!(exit, LoopExit::MonitorStopped);
        assert_eq!(controller.ticks, 3);
    }

    #[tokio::test]
    async fn test_closed_channel_ends_loop() {
        let (tx, mut rx) = mpsc::unbounded_channel::<EngineEvent<u32>>();
        drop(tx);
        let (_itx, mut irx) = interrupts(0);
        let mut controller = ScriptedController::default();

        let exit = run_session(&mut controller, &mut rx, fast_settings(), &mut irx).await;

        assert_eq!(exit, LoopExit::ChannelClosed);
    }

    #[tokio::test]
    async fn test_closed_interrupt_source_is_ignored() {
        let (_tx, mut rx) = mpsc::unbounded_channel::<EngineEvent<u32>>();
        let (itx, mut irx) = interrupts(0);
        drop(itx);
        let mut controller = ScriptedController {
            stop_after_ticks: Some(5),
            ..Default::default()
        };

        let exit = run_session(&mut controller, &mut rx, fast_settings(), &mut irx).await;

        assert_eq!(exit, LoopExit::MonitorStopped);
        assert_eq!(controller.interrupts, 0);
    }

    #[tokio::test]
    async fn test_interrupt_stops_immediately_by_default() {
        let (_tx, mut rx) = mpsc::unbounded_channel::<EngineEvent<u32>>();
        let (_itx, mut irx) = interrupts(1);
        let mut controller = ScriptedController::default();

        let exit = run_session(&mut controller, &mut rx, fast_settings(), &mut irx).await;

        assert_eq!(exit, LoopExit::Interrupted);
        assert_eq!(controller.interrupts, 1);
    }

    #[tokio::test]
    async fn test_draining_interrupt_times_out() {
        let (_tx, mut rx) = mpsc::unbounded_channel::<EngineEvent<u32>>();
        let (_itx, mut irx) = interrupts(1);
        let mut controller = ScriptedController {
            surviving_interrupts: 1,
            ..Default::default()
        };

        let exit = run_session(&mut controller, &mut rx, fast_settings(), &mut irx).await;

        assert_eq!(exit, LoopExit::DrainTimeout);
        assert_eq!(controller.interrupts, 1);
    }

    #[tokio::test]
    async fn test_second_interrupt_cuts_drain_short() {
        let (_tx, mut rx) = mpsc::unbounded_channel::<EngineEvent<u32>>();
        let (_itx, mut irx) = interrupts(2);
        let mut controller = ScriptedController {
            surviving_interrupts: 1,
            ..Default::default()
        };
        let settings = LoopSettings {
            tick_interval: Duration::from_millis(1),
            drain_timeout: Duration::from_secs(30),
        };

        let exit = run_session(&mut controller, &mut rx, settings, &mut irx).await;

        assert_eq!(exit, LoopExit::Interrupted);
        assert_eq!(controller.interrupts, 2);
    }

    #[tokio::test]
    async fn test_late_interrupt_during_drain() {
        let (_tx, mut rx) = mpsc::unbounded_channel::<EngineEvent<u32>>();
        let (itx, mut irx) = interrupts(1);
        let mut controller = ScriptedController {
            surviving_interrupts: 1,
            ..Default::default()
        };
        let settings = LoopSettings {
            tick_interval: Duration::from_millis(1),
            drain_timeout: Duration::from_secs(30),
        };

        let second = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            itx.send(()).unwrap();
            itx
        });
        let exit = run_session(&mut controller, &mut rx, settings, &mut irx).await;

        assert_eq!(exit, LoopExit::Interrupted);
        assert_eq!(controller.interrupts, 2);
        drop(second.await.unwrap());
    }

    #[tokio::test]
    async fn test_draining_interrupt_ends_on_engine_stop() {
        let (tx, mut rx) = mpsc::unbounded_channel::<EngineEvent<u32>>();
        let (_itx, mut irx) = interrupts(1);
        let mut controller = ScriptedController {
            surviving_interrupts: 1,
            eos_on_interrupt: Some(tx),
            ..Default::default()
        };
        let settings = LoopSettings {
            tick_interval: Duration::from_millis(1),
            drain_timeout: Duration::from_secs(30),
        };

        let exit = run_session(&mut controller, &mut rx, settings, &mut irx).await;

        assert_eq!(exit, LoopExit::EngineStopped);
        assert_eq!(controller.interrupts, 1);
    }
}
