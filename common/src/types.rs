use serde::{Deserialize, Serialize};
use std::fmt;

/// 时间单位（纳秒），与引擎的时钟单位一致
pub type Ticks = u64;

pub const TICKS_PER_SECOND: Ticks = 1_000_000_000;

/// 管线生命周期阶段，镜像引擎上报的状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Phase {
    #[default]
    Null,
    Ready,
    Paused,
    Playing,
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Null => "NULL",
            Phase::Ready => "READY",
            Phase::Paused => "PAUSED",
            Phase::Playing => "PLAYING",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of a handler or monitor invocation: keep the run loop going or end it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

impl Flow {
    pub fn is_stop(&self) -> bool {
        matches!(self, Flow::Stop)
    }
}

/// Seek behaviour flags understood by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SeekFlags {
    /// Discard buffered-but-unplayed data.
    pub flush: bool,
    /// Exact frame positioning.
    pub accurate: bool,
    /// Snap to the nearest key unit.
    pub key_unit: bool,
}

impl SeekFlags {
    pub const FLUSH_KEY_UNIT: SeekFlags = SeekFlags {
        flush: true,
        accurate: false,
        key_unit: true,
    };

    pub const FLUSH_ACCURATE: SeekFlags = SeekFlags {
        flush: true,
        accurate: true,
        key_unit: false,
    };
}

/// One end of a seek range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekBound {
    /// Leave this end untouched (play to end of stream).
    Open,
    Set(Ticks),
}

/// A rate-aware seek request dispatched to the sink.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeekRequest {
    pub rate: f64,
    pub flags: SeekFlags,
    pub start: SeekBound,
    pub stop: SeekBound,
}

impl SeekRequest {
    /// Forward rates play `[position, end)`; reverse (and zero) rates play
    /// backwards over `[0, position]`.
    pub fn for_rate(rate: f64, position: Ticks) -> Self {
        if rate > 0.0 {
            Self {
                rate,
                flags: SeekFlags::FLUSH_ACCURATE,
                start: SeekBound::Set(position),
                stop: SeekBound::Open,
            }
        } else {
            Self {
                rate,
                flags: SeekFlags::FLUSH_ACCURATE,
                start: SeekBound::Set(0),
                stop: SeekBound::Set(position),
            }
        }
    }

    pub fn is_reverse(&self) -> bool {
        self.rate <= 0.0
    }
}

/// Formats ticks the way the engine prints clock times: `H:MM:SS.NNNNNNNNN`.
pub fn format_ticks(ticks: Ticks) -> String {
    let hours = ticks / (3600 * TICKS_PER_SECOND);
    let minutes = (ticks / (60 * TICKS_PER_SECOND)) % 60;
    let seconds = (ticks / TICKS_PER_SECOND) % 60;
    let nanos = ticks % TICKS_PER_SECOND;
    format!("{}:{:02}:{:02}.{:09}", hours, minutes, seconds, nanos)
}
