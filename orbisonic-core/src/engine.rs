//! Real-time audio output through cpal.

use crate::binding::AudioStage;
use crate::config::StageDesc;
use crate::error::{OrbisonicError, Result};
use crate::events::OrbisonicEvent;
use crate::mixer;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, SizedSample};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Drives the default output device, pulling mixed audio from an
/// [`AudioStage`] from the device callback.
pub struct OrbisonicEngine {
    desc: StageDesc,
    stage: Arc<AudioStage>,
    stream: Option<cpal::Stream>,
    is_running: Arc<AtomicBool>,
    frames_processed: Arc<AtomicUsize>,
}

impl OrbisonicEngine {
    pub fn new(desc: StageDesc, stage: Arc<AudioStage>) -> Self {
        Self {
            desc,
            stage,
            stream: None,
            is_running: Arc::new(AtomicBool::new(false)),
            frames_processed: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Opens the default output device and starts the callback stream.
    /// Idempotent while running.
    pub fn start(&mut self) -> Result<()> {
        if self.is_running.load(Ordering::Relaxed) {
            return Ok(());
        }

        let host = cpal::default_host();
        let device = host.default_output_device().ok_or_else(|| {
            OrbisonicError::AudioDevice("No default output device available".into())
        })?;

        let config = cpal::StreamConfig {
            channels: self.desc.channels,
            sample_rate: cpal::SampleRate(self.desc.sample_rate),
            buffer_size: cpal::BufferSize::Fixed(self.desc.block_size as u32),
        };

        let default_config = device.default_output_config().map_err(|e| {
            OrbisonicError::AudioDevice(format!("Failed to get default config: {}", e))
        })?;

        let stream = match default_config.sample_format() {
            cpal::SampleFormat::F32 => self.create_stream::<f32>(&device, &config)?,
            cpal::SampleFormat::I16 => self.create_stream::<i16>(&device, &config)?,
            cpal::SampleFormat::U16 => self.create_stream::<u16>(&device, &config)?,
            _ => {
                return Err(OrbisonicError::AudioFormat(
                    "Unsupported sample format".into(),
                ));
            }
        };

        stream
            .play()
            .map_err(|e| OrbisonicError::AudioDevice(format!("Failed to start stream: {}", e)))?;

        self.stream = Some(stream);
        self.is_running.store(true, Ordering::Relaxed);
        self.stage.send_event(OrbisonicEvent::EngineStarted);
        log::debug!(
            "Engine started: {} Hz, {} channels, block size {}",
            self.desc.sample_rate,
            self.desc.channels,
            self.desc.block_size
        );

        Ok(())
    }

    /// Stops and drops the output stream.
    pub fn stop(&mut self) -> Result<()> {
        if let Some(stream) = self.stream.take() {
            self.is_running.store(false, Ordering::Relaxed);
            drop(stream);
            self.stage.send_event(OrbisonicEvent::EngineStopped);
            log::debug!("Engine stopped");
        }
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::Relaxed)
    }

    /// Number of audio frames processed since start.
    pub fn frames_processed(&self) -> usize {
        self.frames_processed.load(Ordering::Relaxed)
    }

    pub fn config(&self) -> &StageDesc {
        &self.desc
    }

    fn create_stream<T>(
        &self,
        device: &cpal::Device,
        config: &cpal::StreamConfig,
    ) -> Result<cpal::Stream>
    where
        T: SizedSample + FromSample<f32>,
    {
        let stage = self.stage.clone();
        let is_running = self.is_running.clone();
        let frames_processed = self.frames_processed.clone();
        let channels = self.desc.channels;
        let stage_err = self.stage.clone();

        let stream = device
            .build_output_stream(
                config,
                move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                    if !is_running.load(Ordering::Relaxed) {
                        for sample in data.iter_mut() {
                            *sample = T::from_sample(0.0f32);
                        }
                        return;
                    }

                    let mut temp_buffer = vec![0.0f32; data.len()];
                    let result = mixer::mix_emitters(&mut temp_buffer, channels, &stage);

                    for (sample, value) in data.iter_mut().zip(temp_buffer.iter()) {
                        *sample = T::from_sample(*value);
                    }

                    frames_processed.fetch_add(result.frames_filled, Ordering::Relaxed);
                },
                move |err| {
                    log::error!("Audio stream error: {}", err);
                    stage_err.send_event(OrbisonicEvent::EngineError {
                        error: err.to_string(),
                    });
                },
                None,
            )
            .map_err(|e| OrbisonicError::AudioDevice(format!("Failed to build stream: {}", e)))?;

        Ok(stream)
    }
}

impl Drop for OrbisonicEngine {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}
