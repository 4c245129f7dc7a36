//! Decoded audio data and file loading.

mod load_options;
mod resampler;
mod symphonia_loader;

pub use load_options::LoadOptions;
pub use resampler::AudioResampler;
pub use symphonia_loader::load_audio_file;

use crate::error::{OrbisonicError, Result};
use std::sync::Arc;
use std::time::Duration;

/// Immutable decoded audio: interleaved f32 samples plus format metadata.
///
/// Cheap to clone (the sample buffer is shared).
#[derive(Debug, Clone)]
pub struct AudioData {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    samples: Vec<f32>,
    sample_rate: u32,
    channels: u16,
    total_frames: usize,
}

impl AudioData {
    /// Wraps interleaved samples. Useful for synthesized audio as well as the
    /// loader's output.
    pub fn from_samples(samples: Vec<f32>, sample_rate: u32, channels: u16) -> Result<Self> {
        if sample_rate == 0 || channels == 0 {
            return Err(OrbisonicError::AudioFormat(
                "sample rate and channel count must be non-zero".to_string(),
            ));
        }
        let total_frames = samples.len() / channels as usize;
        Ok(Self {
            inner: Arc::new(Inner {
                samples,
                sample_rate,
                channels,
                total_frames,
            }),
        })
    }

    /// Loads and decodes a file with default options.
    pub fn from_path(path: &str) -> Result<Self> {
        load_audio_file(path, &LoadOptions::default())
    }

    pub fn sample_rate(&self) -> u32 {
        self.inner.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.inner.channels
    }

    pub fn samples(&self) -> &[f32] {
        &self.inner.samples
    }

    pub fn total_frames(&self) -> usize {
        self.inner.total_frames
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.inner.total_frames as f64 / self.inner.sample_rate as f64)
    }

    pub fn is_empty(&self) -> bool {
        self.inner.samples.is_empty()
    }

    /// Downmixes all channels to mono. Returns a clone when already mono.
    pub fn to_mono(&self) -> Self {
        if self.inner.channels == 1 {
            return self.clone();
        }
        let channels = self.inner.channels as usize;
        let mono: Vec<f32> = self
            .inner
            .samples
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect();
        Self::from_samples(mono, self.inner.sample_rate, 1)
            .expect("mono downmix preserves a valid format")
    }

    /// Resamples to `target_rate`. Returns a clone when the rate already
    /// matches.
    pub fn resample(&self, target_rate: u32) -> Result<Self> {
        if target_rate == self.inner.sample_rate {
            return Ok(self.clone());
        }
        let resampler =
            AudioResampler::new(self.inner.sample_rate, target_rate, self.inner.channels, None)?;
        let resampled = resampler.resample_interleaved(&self.inner.samples)?;
        Self::from_samples(resampled, target_rate, self.inner.channels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_samples_computes_frames_and_duration() {
        let data = AudioData::from_samples(vec![0.0; 96000], 48000, 2).unwrap();
        assert_eq!(data.total_frames(), 48000);
        assert_eq!(data.duration(), Duration::from_secs(1));
    }

    #[test]
    fn zero_rate_or_channels_rejected() {
        assert!(AudioData::from_samples(vec![], 0, 2).is_err());
        assert!(AudioData::from_samples(vec![], 48000, 0).is_err());
    }

    #[test]
    fn stereo_downmix_averages_channels() {
        let data = AudioData::from_samples(vec![1.0, 0.0, 0.5, 0.5], 48000, 2).unwrap();
        let mono = data.to_mono();
        assert_eq!(mono.channels(), 1);
        assert_eq!(mono.samples(), &[0.5, 0.5]);
    }

    #[test]
    fn resample_to_same_rate_is_identity() {
        let data = AudioData::from_samples(vec![0.1, 0.2, 0.3], 48000, 1).unwrap();
        let same = data.resample(48000).unwrap();
        assert_eq!(same.samples(), data.samples());
    }
}
