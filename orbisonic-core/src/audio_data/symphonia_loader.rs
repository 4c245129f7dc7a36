use super::{AudioData, LoadOptions};
use crate::error::{OrbisonicError, Result};
use std::fs::File;
use std::path::Path;
use symphonia::{
    core::{
        audio::SampleBuffer, codecs::DecoderOptions, errors::Error, formats::FormatOptions,
        io::MediaSourceStream, meta::MetadataOptions, probe::Hint,
    },
    default::{get_codecs, get_probe},
};

/// Decodes an audio file into an [`AudioData`], applying the requested
/// mono conversion and resampling.
pub fn load_audio_file(path: &str, options: &LoadOptions) -> Result<AudioData> {
    let file = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = Path::new(path).extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| OrbisonicError::AudioLoading(format!("failed to probe format: {:?}", e)))?;

    let mut format = probed.format;
    let track = format
        .default_track()
        .ok_or_else(|| OrbisonicError::AudioLoading("no default audio track".to_string()))?;

    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| OrbisonicError::AudioLoading("sample rate not found".to_string()))?;
    let channels = track
        .codec_params
        .channels
        .ok_or_else(|| OrbisonicError::AudioLoading("channel count not found".to_string()))?
        .count() as u16;

    let mut decoder = get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| OrbisonicError::AudioLoading(format!("failed to create decoder: {:?}", e)))?;

    let max_frames = options
        .max_duration
        .map(|d| (d.as_secs_f64() * sample_rate as f64) as usize)
        .unwrap_or(usize::MAX);

    let mut samples: Vec<f32> = Vec::new();
    let mut frames_decoded = 0usize;

    while frames_decoded < max_frames {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(Error::IoError(_)) => break, // end of stream
            Err(e) => {
                return Err(OrbisonicError::AudioLoading(format!(
                    "error reading packet: {:?}",
                    e
                )));
            }
        };

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(Error::IoError(_)) => break,
            Err(Error::DecodeError(_)) => continue, // recoverable corruption
            Err(e) => {
                return Err(OrbisonicError::AudioLoading(format!(
                    "error decoding packet: {:?}",
                    e
                )));
            }
        };

        let spec = *decoded.spec();
        let capacity = decoded.capacity();
        let mut buf = SampleBuffer::<f32>::new(capacity as u64, spec);
        buf.copy_interleaved_ref(decoded);
        samples.extend_from_slice(buf.samples());

        frames_decoded += capacity / channels as usize;
    }

    log::debug!(
        "Loaded {}: {} frames, {} Hz, {} channel(s)",
        path,
        samples.len() / channels as usize,
        sample_rate,
        channels
    );

    let mut audio = AudioData::from_samples(samples, sample_rate, channels)?;
    if options.convert_to_mono && channels > 1 {
        audio = audio.to_mono();
    }
    if let Some(target_rate) = options.target_sample_rate {
        audio = audio.resample(target_rate)?;
    }

    Ok(audio)
}
