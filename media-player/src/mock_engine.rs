//! In-memory engine and pad linker recording every call made by the player.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use common::engine::PipelineEngine;
use common::{Phase, Result, SeekFlags, SeekRequest, SessionError, Ticks};

use crate::engine::{MediaDescriptor, PadLinker, PadOutcome, PlayerEngine};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockPad {
    pub name: String,
    pub media_type: Option<String>,
}

impl MockPad {
    pub fn new(name: &str, media_type: &str) -> Self {
        Self {
            name: name.to_string(),
            media_type: Some(media_type.to_string()),
        }
    }

    pub fn audio(name: &str) -> Self {
        Self::new(name, "audio/x-raw")
    }
}

/// Outcome of an audio pad linked on the engine thread.
pub fn linked_audio(pad: &str) -> PadOutcome {
    PadOutcome::Linked {
        pad: pad.to_string(),
        descriptor: MediaDescriptor {
            media_type: "audio/x-raw".to_string(),
            structure_count: 1,
        },
    }
}

/// Converter input pad as seen from the pad-added callback.
#[derive(Debug, Default)]
pub struct MockPadLinker {
    pub linked: Cell<bool>,
    pub link_fails: bool,
    pub linked_pads: RefCell<Vec<String>>,
}

impl PadLinker for MockPadLinker {
    type Pad = MockPad;

    fn pad_name(&self, pad: &MockPad) -> String {
        pad.name.clone()
    }

    fn sink_pad_linked(&self) -> bool {
        self.linked.get()
    }

    fn describe_pad(&self, pad: &MockPad) -> Option<MediaDescriptor> {
        pad.media_type.as_ref().map(|media_type| MediaDescriptor {
            media_type: media_type.clone(),
            structure_count: 1,
        })
    }

    fn link_pad(&self, pad: &MockPad) -> Result<()> {
        self.linked_pads.borrow_mut().push(pad.name.clone());
        if self.link_fails {
            return Err(SessionError::PadLink {
                pad: pad.name.clone(),
                sink: "music-convert".to_string(),
            });
        }
        self.linked.set(true);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MockPlayerEngine {
    pub position: Option<Ticks>,
    pub duration: Option<Ticks>,
    pub refuse_phase: bool,
    pub requested_phases: Vec<Phase>,
    pub simple_seeks: Vec<(SeekFlags, Ticks)>,
    pub seek_requests: Vec<SeekRequest>,
    /// Shared so it stays observable after teardown consumes the session.
    pub shutdown_calls: Rc<Cell<usize>>,
}

impl MockPlayerEngine {
    pub fn with_duration(duration: Ticks) -> Self {
        Self {
            duration: Some(duration),
            ..Self::default()
        }
    }
}

impl PipelineEngine for MockPlayerEngine {
    fn set_phase(&mut self, phase: Phase) -> Result<()> {
        self.requested_phases.push(phase);
        if self.refuse_phase {
            return Err(SessionError::StateChange { phase });
        }
        Ok(())
    }

    fn query_position(&self) -> Option<Ticks> {
        self.position
    }

    fn shutdown(&mut self) {
        self.shutdown_calls.set(self.shutdown_calls.get() + 1);
    }
}

impl PlayerEngine for MockPlayerEngine {
    fn query_duration(&self) -> Option<Ticks> {
        self.duration
    }

    fn seek_simple(&mut self, flags: SeekFlags, position: Ticks) -> Result<()> {
        self.simple_seeks.push((flags, position));
        Ok(())
    }

    fn send_seek(&mut self, request: &SeekRequest) -> Result<()> {
        self.seek_requests.push(*request);
        Ok(())
    }
}
