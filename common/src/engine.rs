use crate::error::Result;
use crate::types::{Phase, Ticks};

/// Operations every session controller needs from the pipeline engine.
///
/// Implementations own the top-level pipeline handle and, through it, every
/// child element. Controllers never see raw element handles.
pub trait PipelineEngine {
    /// Request a phase transition of the whole pipeline.
    fn set_phase(&mut self, phase: Phase) -> Result<()>;

    /// Current position of the stream, `None` when the engine cannot answer.
    fn query_position(&self) -> Option<Ticks>;

    /// Force the pipeline to NULL and release all handles.
    ///
    /// The engine's internal threads are stopped before any handle is freed.
    fn shutdown(&mut self);
}
