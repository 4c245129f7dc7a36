use crate::error::{OrbisonicError, Result};
use rubato::{FftFixedIn, Resampler};

/// Offline sample-rate converter for decoded audio.
pub struct AudioResampler {
    source_sample_rate: u32,
    target_sample_rate: u32,
    channels: u16,
    chunk_size: usize,
}

impl AudioResampler {
    pub fn new(
        source_sample_rate: u32,
        target_sample_rate: u32,
        channels: u16,
        chunk_size: Option<usize>,
    ) -> Result<Self> {
        if source_sample_rate == 0 || target_sample_rate == 0 {
            return Err(OrbisonicError::AudioFormat(
                "sample rates must be greater than 0".to_string(),
            ));
        }
        if channels == 0 {
            return Err(OrbisonicError::AudioFormat(
                "channel count must be greater than 0".to_string(),
            ));
        }

        Ok(Self {
            source_sample_rate,
            target_sample_rate,
            channels,
            chunk_size: chunk_size.unwrap_or(1024),
        })
    }

    /// Resamples a single channel of samples.
    pub fn resample_channel(&self, channel_samples: &[f32]) -> Result<Vec<f32>> {
        if self.source_sample_rate == self.target_sample_rate {
            return Ok(channel_samples.to_vec());
        }

        let mut resampler = FftFixedIn::new(
            self.source_sample_rate as usize,
            self.target_sample_rate as usize,
            self.chunk_size,
            2,
            1,
        )
        .map_err(|e| OrbisonicError::AudioLoading(format!("failed to create resampler: {}", e)))?;

        let mut output = Vec::new();
        let mut index = 0;

        while index < channel_samples.len() {
            let take = (channel_samples.len() - index).min(self.chunk_size);
            // rubato expects full chunks; pad the tail with silence.
            let mut chunk = vec![0.0f32; self.chunk_size];
            chunk[..take].copy_from_slice(&channel_samples[index..index + take]);

            let waves_out = resampler
                .process(&[chunk], None)
                .map_err(|e| OrbisonicError::AudioLoading(format!("resampling error: {}", e)))?;
            if let Some(first) = waves_out.first() {
                output.extend_from_slice(first);
            }

            index += take;
        }

        Ok(output)
    }

    /// Resamples interleaved samples, preserving channel layout.
    pub fn resample_interleaved(&self, interleaved: &[f32]) -> Result<Vec<f32>> {
        if self.source_sample_rate == self.target_sample_rate {
            return Ok(interleaved.to_vec());
        }

        let channels = self.channels as usize;
        let mut resampled_channels = Vec::with_capacity(channels);
        for ch in 0..channels {
            let channel_data: Vec<f32> = interleaved
                .chunks(channels)
                .map(|frame| frame.get(ch).copied().unwrap_or(0.0))
                .collect();
            resampled_channels.push(self.resample_channel(&channel_data)?);
        }

        let frames = resampled_channels[0].len();
        let mut out = Vec::with_capacity(frames * channels);
        for frame in 0..frames {
            for channel in &resampled_channels {
                out.push(channel.get(frame).copied().unwrap_or(0.0));
            }
        }
        Ok(out)
    }

    pub fn ratio(&self) -> f64 {
        self.target_sample_rate as f64 / self.source_sample_rate as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creation_validates_rates_and_channels() {
        assert!(AudioResampler::new(44100, 48000, 2, None).is_ok());
        assert!(AudioResampler::new(0, 48000, 2, None).is_err());
        assert!(AudioResampler::new(44100, 0, 2, None).is_err());
        assert!(AudioResampler::new(44100, 48000, 0, None).is_err());
    }

    #[test]
    fn identity_rate_passes_through() {
        let resampler = AudioResampler::new(48000, 48000, 1, None).unwrap();
        let samples = vec![0.1, 0.2, 0.3, 0.4];
        assert_eq!(resampler.resample_channel(&samples).unwrap(), samples);
    }

    #[test]
    fn ratio_reflects_rates() {
        let resampler = AudioResampler::new(24000, 48000, 1, None).unwrap();
        assert_eq!(resampler.ratio(), 2.0);
    }
}
