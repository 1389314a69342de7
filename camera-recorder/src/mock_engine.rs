use std::cell::Cell;
use std::rc::Rc;

use std::convert::Infallible;

use common::engine::PipelineEngine;
use common::{BusEvent, EngineEvent, Phase, Result, SessionError, Ticks};
use tokio::sync::mpsc;

use crate::engine::CaptureEngine;

#[derive(Debug, Default)]
pub struct MockCaptureEngine {
    pub position: Option<Ticks>,
    pub refuse_phase: bool,
    pub refuse_eos: bool,
    pub requested_phases: Vec<Phase>,
    pub position_queries: Cell<usize>,
    pub eos_sent: usize,
    pub shutdown_calls: Rc<Cell<usize>>,
    /// When set, an accepted end-of-stream comes back on the bus like the muxer's.
    pub bus: Option<mpsc::UnboundedSender<EngineEvent<Infallible>>>,
}

impl PipelineEngine for MockCaptureEngine {
    fn set_phase(&mut self, phase: Phase) -> Result<()> {
        self.requested_phases.push(phase);
        if self.refuse_phase {
            return Err(SessionError::StateChange { phase });
        }
        Ok(())
    }

    fn query_position(&self) -> Option<Ticks> {
        self.position_queries.set(self.position_queries.get() + 1);
        self.position
    }

    fn shutdown(&mut self) {
        self.shutdown_calls.set(self.shutdown_calls.get() + 1);
    }
}

impl CaptureEngine for MockCaptureEngine {
    fn finish(&mut self) -> Result<()> {
        if self.refuse_eos {
            return Err(SessionError::EndOfStreamRejected);
        }
        self.eos_sent += 1;
        if let Some(bus) = &self.bus {
            let _ = bus.send(BusEvent::EndOfStream.into());
        }
        Ok(())
    }
}
