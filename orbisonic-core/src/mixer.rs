//! Audio-thread mixing of emitter streams into the output buffer.
//!
//! Runs inside the device callback, so it must never block: the stage state
//! is taken with `try_lock`, and a missed lock yields one silent block.

use crate::binding::AudioStage;
use crate::binding::EmitterId;
use crate::events::OrbisonicEvent;
use crate::spatial;

/// Result of mixing one output block.
pub struct MixResult {
    pub frames_filled: usize,
    pub completed_emitters: Vec<EmitterId>,
    pub looped_emitters: Vec<EmitterId>,
}

/// Mixes every playing emitter into `out` (interleaved, `channels` wide).
///
/// Each emitter contributes its mono block scaled by the gain computed on the
/// last `update_frame` and split across the stereo pair by equal-power
/// panning. Completed and looped streams are reported in the result so the
/// caller can emit events outside the hot path.
pub fn mix_emitters(out: &mut [f32], channels: u16, stage: &AudioStage) -> MixResult {
    out.fill(0.0);
    let channels = channels as usize;
    let frames = out.len() / channels;
    let mut result = MixResult {
        frames_filled: frames,
        completed_emitters: Vec::new(),
        looped_emitters: Vec::new(),
    };

    let Ok(inner) = stage.try_lock_inner() else {
        log::warn!("Stage lock contended in audio callback; emitting silence");
        result.frames_filled = 0;
        return result;
    };

    let mut scratch = vec![0.0f32; frames];
    for (id, emitter) in inner.emitters.iter() {
        scratch.fill(0.0);
        let block = emitter.stream.next_block(&mut scratch);
        if block.completed {
            result.completed_emitters.push(*id);
        }
        if block.looped {
            result.looped_emitters.push(*id);
        }
        if block.frames == 0 {
            continue;
        }

        let gain = emitter.params.gain;
        if gain <= 0.0 {
            continue;
        }

        if channels >= 2 {
            let (left, right) = spatial::pan_gains(emitter.params.pan);
            for (frame, sample) in scratch[..block.frames].iter().enumerate() {
                out[frame * channels] += sample * gain * left;
                out[frame * channels + 1] += sample * gain * right;
            }
        } else {
            for (frame, sample) in scratch[..block.frames].iter().enumerate() {
                out[frame] += sample * gain;
            }
        }
    }
    drop(inner);

    for id in &result.completed_emitters {
        stage.send_event(OrbisonicEvent::StreamCompleted { emitter_id: *id });
    }
    for id in &result.looped_emitters {
        stage.send_event(OrbisonicEvent::StreamLooped { emitter_id: *id });
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio_data::AudioData;
    use crate::config::{EmitterDesc, StageDesc};
    use crate::math::Vec3;
    use crate::scene::{SceneGraph, Transform};
    use crate::stream::LoopMode;

    fn staged_scene() -> (AudioStage, SceneGraph, crate::scene::NodeId) {
        let stage = AudioStage::new(StageDesc::default()).unwrap();
        let mut scene = SceneGraph::new();
        let listener = scene.add_node(Transform::default());
        stage.set_listener_node(listener);
        (stage, scene, listener)
    }

    #[test]
    fn full_gain_emitter_splits_equal_power_centered() {
        let (stage, mut scene, _) = staged_scene();
        // Straight ahead of the listener at exactly the reference distance.
        let node = scene.add_node(Transform::from_position(Vec3::new(0.0, 0.0, -20.0)));
        let audio = AudioData::from_samples(vec![1.0; 64], 48000, 1).unwrap();
        let id = stage
            .bind_audio(node, audio, EmitterDesc::new(20.0).loop_mode(LoopMode::Infinite))
            .unwrap();
        stage.activate();
        stage.start_stream(id).unwrap();
        stage.update_frame(&scene);

        let mut out = vec![0.0f32; 16];
        let result = mix_emitters(&mut out, 2, &stage);
        assert_eq!(result.frames_filled, 8);

        // Center pan: both channels at cos(45 deg).
        let expected = std::f32::consts::FRAC_1_SQRT_2;
        assert!((out[0] - expected).abs() < 1e-5);
        assert!((out[1] - expected).abs() < 1e-5);
    }

    #[test]
    fn stopped_and_silenced_emitters_contribute_nothing() {
        let (stage, mut scene, _) = staged_scene();
        let node = scene.add_node(Transform::from_position(Vec3::new(0.0, 0.0, -20.0)));
        let audio = AudioData::from_samples(vec![1.0; 64], 48000, 1).unwrap();
        let id = stage.bind_audio(node, audio, EmitterDesc::new(20.0)).unwrap();
        stage.activate();
        stage.update_frame(&scene);

        // Never started: silence.
        let mut out = vec![1.0f32; 16];
        mix_emitters(&mut out, 2, &stage);
        assert!(out.iter().all(|s| *s == 0.0));

        // Playing but the listener is unbound: silence again.
        stage.start_stream(id).unwrap();
        stage.clear_listener();
        stage.update_frame(&scene);
        let mut out = vec![0.0f32; 16];
        mix_emitters(&mut out, 2, &stage);
        assert!(out.iter().all(|s| *s == 0.0));
    }

    #[test]
    fn once_streams_report_completion() {
        let (stage, mut scene, _) = staged_scene();
        let node = scene.add_node(Transform::from_position(Vec3::new(0.0, 0.0, -20.0)));
        let audio = AudioData::from_samples(vec![0.5; 4], 48000, 1).unwrap();
        let id = stage
            .bind_audio(node, audio, EmitterDesc::new(20.0))
            .unwrap();
        stage.activate();
        stage.start_stream(id).unwrap();
        stage.update_frame(&scene);

        let mut out = vec![0.0f32; 16];
        let result = mix_emitters(&mut out, 2, &stage);
        assert_eq!(result.completed_emitters, vec![id]);
        assert!(stage
            .poll_events()
            .contains(&OrbisonicEvent::StreamCompleted { emitter_id: id }));
    }

    #[test]
    fn infinite_streams_report_loops_and_keep_playing() {
        let (stage, mut scene, _) = staged_scene();
        let node = scene.add_node(Transform::from_position(Vec3::new(0.0, 0.0, -20.0)));
        let audio = AudioData::from_samples(vec![0.5; 4], 48000, 1).unwrap();
        let id = stage
            .bind_audio(node, audio, EmitterDesc::new(20.0).loop_mode(LoopMode::Infinite))
            .unwrap();
        stage.activate();
        stage.start_stream(id).unwrap();
        stage.update_frame(&scene);

        let mut out = vec![0.0f32; 16];
        let result = mix_emitters(&mut out, 2, &stage);
        assert_eq!(result.looped_emitters, vec![id]);
        assert!(result.completed_emitters.is_empty());
        // Every frame filled: the stream wrapped mid-block.
        assert!(out.iter().all(|s| *s != 0.0));
    }
}
