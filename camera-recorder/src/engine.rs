use common::engine::PipelineEngine;
use common::Result;

/// Capture pipeline with a fixed topology.
pub trait CaptureEngine: PipelineEngine {
    /// Inject end-of-stream at the sources so the muxer can finalize the file.
    ///
    /// Completion is reported later as an EndOfStream bus event.
    fn finish(&mut self) -> Result<()>;
}
