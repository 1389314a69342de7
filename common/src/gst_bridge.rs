//! Glue between GStreamer and the engine-agnostic session types.

use gstreamer as gst;
use gst::prelude::*;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::error::{Result, SessionError};
use crate::events::{BusEvent, EngineEvent};
use crate::types::{Phase, SeekBound, SeekFlags, SeekRequest, Ticks};

impl From<gst::State> for Phase {
    fn from(state: gst::State) -> Self {
        match state {
            gst::State::Ready => Phase::Ready,
            gst::State::Paused => Phase::Paused,
            gst::State::Playing => Phase::Playing,
            _ => Phase::Null,
        }
    }
}

impl From<Phase> for gst::State {
    fn from(phase: Phase) -> Self {
        match phase {
            Phase::Null => gst::State::Null,
            Phase::Ready => gst::State::Ready,
            Phase::Paused => gst::State::Paused,
            Phase::Playing => gst::State::Playing,
        }
    }
}

impl From<SeekFlags> for gst::SeekFlags {
    fn from(flags: SeekFlags) -> Self {
        let mut result = gst::SeekFlags::empty();
        if flags.flush {
            result |= gst::SeekFlags::FLUSH;
        }
        if flags.accurate {
            result |= gst::SeekFlags::ACCURATE;
        }
        if flags.key_unit {
            result |= gst::SeekFlags::KEY_UNIT;
        }
        result
    }
}

pub fn init() -> Result<()> {
    gst::init().map_err(|e| SessionError::Init {
        message: e.to_string(),
    })
}

pub fn make_element(factory: &str, name: &str) -> Result<gst::Element> {
    gst::ElementFactory::make(factory)
        .name(name)
        .build()
        .map_err(|_| SessionError::ElementCreation {
            factory: factory.to_string(),
            name: name.to_string(),
        })
}

/// Links `elements` in order, reporting the first pair that refuses.
pub fn link_chain(elements: &[&gst::Element]) -> Result<()> {
    for pair in elements.windows(2) {
        pair[0].link(pair[1]).map_err(|_| SessionError::Link {
            from: pair[0].name().to_string(),
            to: pair[1].name().to_string(),
        })?;
    }
    Ok(())
}

pub fn set_phase(pipeline: &gst::Pipeline, phase: Phase) -> Result<()> {
    pipeline
        .set_state(gst::State::from(phase))
        .map(|_| ())
        .map_err(|_| SessionError::StateChange { phase })
}

pub fn query_position(element: &gst::Element) -> Option<Ticks> {
    element
        .query_position::<gst::ClockTime>()
        .map(|position| position.nseconds())
}

pub fn query_duration(element: &gst::Element) -> Option<Ticks> {
    element
        .query_duration::<gst::ClockTime>()
        .map(|duration| duration.nseconds())
}

fn seek_bound(bound: SeekBound) -> (gst::SeekType, Option<gst::ClockTime>) {
    match bound {
        SeekBound::Open => (gst::SeekType::None, gst::ClockTime::NONE),
        SeekBound::Set(ticks) => (gst::SeekType::Set, Some(gst::ClockTime::from_nseconds(ticks))),
    }
}

pub fn seek_event(request: &SeekRequest) -> gst::Event {
    let (start_type, start) = seek_bound(request.start);
    let (stop_type, stop) = seek_bound(request.stop);
    gst::event::Seek::new(
        request.rate,
        request.flags.into(),
        start_type,
        start,
        stop_type,
        stop,
    )
}

/// Flush-seeks `element` to `position` without changing the rate.
pub fn seek_simple(element: &gst::Element, flags: SeekFlags, position: Ticks) -> Result<()> {
    element
        .seek_simple(gst::SeekFlags::from(flags), gst::ClockTime::from_nseconds(position))
        .map_err(|_| SessionError::SeekRejected { target: position })
}

pub fn bus_event(message: &gst::Message) -> BusEvent {
    match message.view() {
        gst::MessageView::Error(err) => BusEvent::Error {
            message: err.error().to_string(),
            debug: err.debug().map(|d| d.to_string()),
        },
        gst::MessageView::Eos(_) => BusEvent::EndOfStream,
        gst::MessageView::StateChanged(change) => BusEvent::StateChanged {
            old: change.old().into(),
            new: change.current().into(),
            source: message
                .src()
                .map(|src| src.name().to_string())
                .unwrap_or_default(),
        },
        _ => BusEvent::Other {
            kind: format!("{:?}", message.type_()),
        },
    }
}

/// Forwards every bus message into the run loop channel from whichever
/// thread posts it.
pub fn forward_bus<P>(bus: &gst::Bus, tx: mpsc::UnboundedSender<EngineEvent<P>>)
where
    P: Send + 'static,
{
    bus.set_sync_handler(move |_bus, message| {
        if tx.send(EngineEvent::Bus(bus_event(message))).is_err() {
            debug!("Run loop gone, dropping bus message");
        }
        gst::BusSyncReply::Drop
    });
}

/// Forces the pipeline to NULL and detaches the bus forwarder.
pub fn release(pipeline: &gst::Pipeline, bus: &gst::Bus) {
    if pipeline.set_state(gst::State::Null).is_err() {
        warn!("{}", SessionError::StateChange { phase: Phase::Null });
    }
    bus.unset_sync_handler();
}
