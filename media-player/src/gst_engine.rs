//! GStreamer implementation of [`PlayerEngine`] and [`PadLinker`].

use common::engine::PipelineEngine;
use common::gst_bridge;
use common::{EngineEvent, Phase, Result, SeekBound, SeekFlags, SeekRequest, SessionError, Ticks};
use gstreamer as gst;
use gst::prelude::*;
use tokio::sync::mpsc;
use tracing::debug;

use crate::config::PlayerElements;
use crate::engine::{self, MediaDescriptor, PadLinker, PadOutcome, PlayerEngine};

pub struct GstPlayerEngine {
    pipeline: gst::Pipeline,
    source: gst::Element,
    sink: gst::Element,
    bus: gst::Bus,
    released: bool,
}

impl GstPlayerEngine {
    /// Creates `source ~> convert -> sink`. The source side is linked from the
    /// pad-added callback once the decoder exposes a pad.
    pub fn build(
        uri: &str,
        elements: &PlayerElements,
    ) -> Result<(Self, mpsc::UnboundedReceiver<EngineEvent<PadOutcome>>)> {
        let source = gst_bridge::make_element(&elements.source_factory, &elements.source_name)?;
        let convert = gst_bridge::make_element(&elements.convert_factory, &elements.convert_name)?;
        let sink = gst_bridge::make_element(&elements.sink_factory, &elements.sink_name)?;

        let pipeline = gst::Pipeline::with_name(&elements.pipeline_name);
        pipeline
            .add_many([&source, &convert, &sink])
            .map_err(|e| SessionError::Init {
                message: e.to_string(),
            })?;
        gst_bridge::link_chain(&[&convert, &sink])?;

        source.set_property("uri", uri);

        let bus = pipeline.bus().ok_or_else(|| SessionError::Init {
            message: "Pipeline has no bus".to_string(),
        })?;

        let (tx, rx) = mpsc::unbounded_channel();
        gst_bridge::forward_bus(&bus, tx.clone());

        // 在流线程上立即链接，避免首个缓冲区遇到未链接的 pad
        let linker = GstPadLinker { convert };
        let accepted_prefix = elements.accepted_media_prefix.clone();
        source.connect_pad_added(move |_source, pad| {
            let outcome = engine::link_new_pad(&linker, pad, &accepted_prefix);
            if tx.send(EngineEvent::PadAdded(outcome)).is_err() {
                debug!("Run loop gone, dropping pad report");
            }
        });

        Ok((
            Self {
                pipeline,
                source,
                sink,
                bus,
                released: false,
            },
            rx,
        ))
    }
}

/// Owns a handle to the converter so it can link from the pad-added callback.
struct GstPadLinker {
    convert: gst::Element,
}

impl GstPadLinker {
    fn convert_sink_pad(&self) -> Result<gst::Pad> {
        self.convert.static_pad("sink").ok_or_else(|| SessionError::PadLink {
            pad: "sink".to_string(),
            sink: self.convert.name().to_string(),
        })
    }
}

impl PadLinker for GstPadLinker {
    type Pad = gst::Pad;

    fn pad_name(&self, pad: &gst::Pad) -> String {
        pad.name().to_string()
    }

    fn sink_pad_linked(&self) -> bool {
        self.convert
            .static_pad("sink")
            .map(|pad| pad.is_linked())
            .unwrap_or(false)
    }

    fn describe_pad(&self, pad: &gst::Pad) -> Option<MediaDescriptor> {
        let caps = pad.current_caps().unwrap_or_else(|| pad.query_caps(None));
        let structure = caps.structure(0)?;
        Some(MediaDescriptor {
            media_type: structure.name().to_string(),
            structure_count: caps.size() as usize,
        })
    }

    fn link_pad(&self, pad: &gst::Pad) -> Result<()> {
        let sink_pad = self.convert_sink_pad()?;
        pad.link(&sink_pad).map(|_| ()).map_err(|_| SessionError::PadLink {
            pad: pad.name().to_string(),
            sink: self.convert.name().to_string(),
        })
    }
}

impl PipelineEngine for GstPlayerEngine {
    fn set_phase(&mut self, phase: Phase) -> Result<()> {
        gst_bridge::set_phase(&self.pipeline, phase)
    }

    fn query_position(&self) -> Option<Ticks> {
        gst_bridge::query_position(&self.source)
    }

    fn shutdown(&mut self) {
        if self.released {
            return;
        }
        gst_bridge::release(&self.pipeline, &self.bus);
        self.released = true;
    }
}

impl PlayerEngine for GstPlayerEngine {
    fn query_duration(&self) -> Option<Ticks> {
        gst_bridge::query_duration(&self.sink)
    }

    fn seek_simple(&mut self, flags: SeekFlags, position: Ticks) -> Result<()> {
        gst_bridge::seek_simple(&self.sink, flags, position)
    }

    fn send_seek(&mut self, request: &SeekRequest) -> Result<()> {
        if self.sink.send_event(gst_bridge::seek_event(request)) {
            return Ok(());
        }

        let target = match request.start {
            SeekBound::Set(ticks) if !request.is_reverse() => ticks,
            _ => match request.stop {
                SeekBound::Set(ticks) => ticks,
                SeekBound::Open => 0,
            },
        };
        Err(SessionError::SeekRejected { target })
    }
}

impl Drop for GstPlayerEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}
