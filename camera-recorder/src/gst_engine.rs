//! GStreamer implementation of [`CaptureEngine`].

use std::convert::Infallible;
use std::path::Path;

use common::engine::PipelineEngine;
use common::gst_bridge;
use common::{EngineEvent, Phase, Result, SessionError, Ticks};
use gstreamer as gst;
use gst::prelude::*;
use tokio::sync::mpsc;

use crate::config::RecorderConfig;
use crate::engine::CaptureEngine;

pub struct GstCaptureEngine {
    pipeline: gst::Pipeline,
    video_source: gst::Element,
    bus: gst::Bus,
    released: bool,
}

impl GstCaptureEngine {
    /// audio: source -> encoder -> queue -> muxer
    /// video: source -> encoder -> muxer -> file sink
    pub fn build(
        output: &Path,
        config: &RecorderConfig,
    ) -> Result<(Self, mpsc::UnboundedReceiver<EngineEvent<Infallible>>)> {
        let names = &config.elements;
        let audio_source = gst_bridge::make_element(&names.audio_source_factory, &names.audio_source_name)?;
        let video_source = gst_bridge::make_element(&names.video_source_factory, &names.video_source_name)?;
        let audio_encoder = gst_bridge::make_element(&names.audio_encoder_factory, &names.audio_encoder_name)?;
        let video_encoder = gst_bridge::make_element(&names.video_encoder_factory, &names.video_encoder_name)?;
        let queue = gst_bridge::make_element(&names.queue_factory, &names.queue_name)?;
        let muxer = gst_bridge::make_element(&names.muxer_factory, &names.muxer_name)?;
        let sink = gst_bridge::make_element(&names.sink_factory, &names.sink_name)?;

        let pipeline = gst::Pipeline::with_name(&names.pipeline_name);
        pipeline
            .add_many([
                &video_source,
                &audio_source,
                &queue,
                &audio_encoder,
                &video_encoder,
                &muxer,
                &sink,
            ])
            .map_err(|e| SessionError::Init {
                message: e.to_string(),
            })?;

        gst_bridge::link_chain(&[&audio_source, &audio_encoder, &queue, &muxer])?;
        gst_bridge::link_chain(&[&video_source, &video_encoder, &muxer, &sink])?;

        sink.set_property("location", output.to_string_lossy().to_string());
        audio_source.set_property("device", config.devices.audio.as_str());
        video_source.set_property("device", config.devices.video.as_str());

        let bus = pipeline.bus().ok_or_else(|| SessionError::Init {
            message: "Pipeline has no bus".to_string(),
        })?;
        let (tx, rx) = mpsc::unbounded_channel();
        gst_bridge::forward_bus(&bus, tx);

        Ok((
            Self {
                pipeline,
                video_source,
                bus,
                released: false,
            },
            rx,
        ))
    }
}

impl PipelineEngine for GstCaptureEngine {
    fn set_phase(&mut self, phase: Phase) -> Result<()> {
        gst_bridge::set_phase(&self.pipeline, phase)
    }

    fn query_position(&self) -> Option<Ticks> {
        gst_bridge::query_position(&self.video_source)
    }

    fn shutdown(&mut self) {
        if self.released {
            return;
        }
        gst_bridge::release(&self.pipeline, &self.bus);
        self.released = true;
    }
}

impl CaptureEngine for GstCaptureEngine {
    fn finish(&mut self) -> Result<()> {
        if self.pipeline.send_event(gst::event::Eos::new()) {
            Ok(())
        } else {
            Err(SessionError::EndOfStreamRejected)
        }
    }
}

impl Drop for GstCaptureEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}
