use crate::types::Phase;

/// Bus notification delivered by the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum BusEvent {
    Error {
        message: String,
        debug: Option<String>,
    },
    EndOfStream,
    StateChanged {
        old: Phase,
        new: Phase,
        /// Name of the element whose state changed.
        source: String,
    },
    /// Any message kind the controllers do not act on.
    Other { kind: String },
}

/// Everything the engine pushes into the run loop, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent<P> {
    /// A source element exposed a new output pad. Carries whatever the
    /// engine observed or did about it on its own thread.
    PadAdded(P),
    Bus(BusEvent),
}

impl<P> From<BusEvent> for EngineEvent<P> {
    fn from(event: BusEvent) -> Self {
        EngineEvent::Bus(event)
    }
}
