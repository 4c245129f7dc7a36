//! Configuration descriptors for the stage and per-emitter bindings.

use crate::error::{OrbisonicError, Result};
use crate::stream::LoopMode;

/// Configuration descriptor for an [`AudioStage`](crate::binding::AudioStage)
/// and its engine.
#[derive(Debug, Clone)]
pub struct StageDesc {
    /// Sample rate for stage processing (streams are resampled to match).
    pub sample_rate: u32,
    /// Number of frames per audio processing chunk.
    pub block_size: usize,
    /// Number of output channels (2 for stereo panning).
    pub channels: u16,
    /// Maximum number of concurrently bound emitters.
    pub max_emitters: usize,
}

impl Default for StageDesc {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            block_size: 1024,
            channels: 2,
            max_emitters: 64,
        }
    }
}

/// Per-emitter configuration recognized by
/// [`bind_emitter`](crate::binding::AudioStage::bind_emitter).
#[derive(Debug, Clone, Copy)]
pub struct EmitterDesc {
    /// Distance at which rolloff begins. Gain is unity anywhere inside this
    /// radius. Must be strictly positive.
    pub ref_distance: f32,
    /// Optional hard cutoff: gain is zero at and beyond this distance.
    /// `None` keeps the pure reference-distance rolloff.
    pub max_distance: Option<f32>,
    /// Volume multiplier applied on top of distance attenuation.
    pub volume: f32,
    /// Whether the stream restarts on completion.
    pub loop_mode: LoopMode,
}

impl Default for EmitterDesc {
    fn default() -> Self {
        Self {
            ref_distance: 1.0,
            max_distance: None,
            volume: 1.0,
            loop_mode: LoopMode::Once,
        }
    }
}

impl EmitterDesc {
    pub fn new(ref_distance: f32) -> Self {
        Self {
            ref_distance,
            ..Default::default()
        }
    }

    pub fn max_distance(mut self, distance: f32) -> Self {
        self.max_distance = Some(distance);
        self
    }

    pub fn volume(mut self, volume: f32) -> Self {
        self.volume = volume;
        self
    }

    pub fn loop_mode(mut self, mode: LoopMode) -> Self {
        self.loop_mode = mode;
        self
    }

    /// Fails fast with `InvalidConfiguration`; callers create no state on error.
    pub(crate) fn validate(&self) -> Result<()> {
        if !self.ref_distance.is_finite() || self.ref_distance <= 0.0 {
            return Err(OrbisonicError::InvalidConfiguration(format!(
                "ref_distance must be > 0, got {}",
                self.ref_distance
            )));
        }
        if let Some(max) = self.max_distance {
            if !max.is_finite() || max <= self.ref_distance {
                return Err(OrbisonicError::InvalidConfiguration(format!(
                    "max_distance must exceed ref_distance ({} <= {})",
                    max, self.ref_distance
                )));
            }
        }
        if !self.volume.is_finite() || self.volume < 0.0 {
            return Err(OrbisonicError::InvalidConfiguration(format!(
                "volume must be >= 0, got {}",
                self.volume
            )));
        }
        Ok(())
    }
}
