use common::engine::PipelineEngine;
use common::{Result, SeekFlags, SeekRequest, Ticks};

/// Negotiated media description of a newly exposed pad.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaDescriptor {
    pub media_type: String,
    /// Number of structures in the pad's capabilities.
    pub structure_count: usize,
}

/// Links runtime pads to the converter.
///
/// Runs on the engine's streaming thread inside the pad-added callback, so
/// the pad has a peer before any buffer is pushed through it.
pub trait PadLinker {
    /// Output pad exposed by the source at runtime.
    type Pad;

    fn pad_name(&self, pad: &Self::Pad) -> String;

    /// Whether the converter's input pad already has a peer.
    fn sink_pad_linked(&self) -> bool;

    fn describe_pad(&self, pad: &Self::Pad) -> Option<MediaDescriptor>;

    /// Link `pad` to the converter's input pad.
    fn link_pad(&self, pad: &Self::Pad) -> Result<()>;
}

/// What happened to a pad when the source exposed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PadOutcome {
    AlreadyLinked { pad: String },
    NoCaps { pad: String },
    /// Media type outside the accepted prefix.
    Ignored { pad: String, media_type: String },
    Linked { pad: String, descriptor: MediaDescriptor },
    LinkFailed {
        pad: String,
        media_type: String,
        error: String,
    },
}

/// Dynamic link handler: links `pad` when the converter is still free and
/// the pad carries `accepted_prefix` media.
pub fn link_new_pad<L: PadLinker>(linker: &L, pad: &L::Pad, accepted_prefix: &str) -> PadOutcome {
    let pad_name = linker.pad_name(pad);

    if linker.sink_pad_linked() {
        return PadOutcome::AlreadyLinked { pad: pad_name };
    }

    let Some(descriptor) = linker.describe_pad(pad) else {
        return PadOutcome::NoCaps { pad: pad_name };
    };

    if !descriptor.media_type.starts_with(accepted_prefix) {
        return PadOutcome::Ignored {
            pad: pad_name,
            media_type: descriptor.media_type,
        };
    }

    match linker.link_pad(pad) {
        Ok(()) => PadOutcome::Linked {
            pad: pad_name,
            descriptor,
        },
        Err(e) => PadOutcome::LinkFailed {
            pad: pad_name,
            media_type: descriptor.media_type,
            error: e.to_string(),
        },
    }
}

/// Engine operations the player needs on top of [`PipelineEngine`].
pub trait PlayerEngine: PipelineEngine {
    fn query_duration(&self) -> Option<Ticks>;

    /// Seek to `position` at the current rate.
    fn seek_simple(&mut self, flags: SeekFlags, position: Ticks) -> Result<()>;

    /// Dispatch a seek event to the sink without waiting for completion.
    fn send_seek(&mut self, request: &SeekRequest) -> Result<()>;
}
