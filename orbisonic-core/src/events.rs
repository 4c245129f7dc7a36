//! Event types for Orbisonic

use crate::binding::EmitterId;

#[derive(Debug, Clone, PartialEq)]
pub enum OrbisonicEvent {
    /// A stream started playing (via `start_stream` or `activate`).
    StreamStarted { emitter_id: EmitterId },
    /// A stream was stopped via `stop_stream`.
    StreamStopped { emitter_id: EmitterId },
    /// A `LoopMode::Once` stream finished.
    StreamCompleted { emitter_id: EmitterId },
    /// A `LoopMode::Infinite` stream wrapped around.
    StreamLooped { emitter_id: EmitterId },
    /// An emitter's node left the scene graph; its parameters were held at
    /// their last-known values this frame. Non-fatal.
    StaleBinding { emitter_id: EmitterId },
    /// The listener node left the scene graph; output was silenced.
    StaleListener,
    EngineStarted,
    EngineStopped,
    EngineError { error: String },
}

impl OrbisonicEvent {
    pub fn emitter_id(&self) -> Option<EmitterId> {
        match self {
            Self::StreamStarted { emitter_id }
            | Self::StreamStopped { emitter_id }
            | Self::StreamCompleted { emitter_id }
            | Self::StreamLooped { emitter_id }
            | Self::StaleBinding { emitter_id } => Some(*emitter_id),
            _ => None,
        }
    }

    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            Self::StaleBinding { .. } | Self::StaleListener | Self::EngineError { .. }
        )
    }
}
