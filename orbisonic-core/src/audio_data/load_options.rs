use std::time::Duration;

/// Options for [`load_audio_file`](super::load_audio_file).
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Resample to this rate after decoding (`None` keeps the original).
    pub target_sample_rate: Option<u32>,
    /// Downmix to mono after decoding.
    pub convert_to_mono: bool,
    /// Stop decoding after this much audio (`None` loads the whole file).
    pub max_duration: Option<Duration>,
}

impl LoadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn target_sample_rate(mut self, rate: u32) -> Self {
        self.target_sample_rate = Some(rate);
        self
    }

    pub fn convert_to_mono(mut self, convert: bool) -> Self {
        self.convert_to_mono = convert;
        self
    }

    pub fn max_duration(mut self, duration: Duration) -> Self {
        self.max_duration = Some(duration);
        self
    }
}
