//! Playback streams for emitter bindings.
//!
//! The binding model is decoupled from any particular media mechanism through
//! the [`StreamHandle`] trait: an opaque playable resource with a state, a
//! position, and a way to produce mono sample blocks. [`BufferStream`] is the
//! in-memory implementation over decoded [`AudioData`].

use crate::audio_data::AudioData;
use std::sync::Mutex;
use std::time::Duration;

/// Loop mode for stream playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopMode {
    /// Play once and stop.
    #[default]
    Once,
    /// Restart from the beginning on completion.
    Infinite,
}

/// Playback state of a stream. Transitions happen only through
/// `play`/`pause`/`stop` and end-of-data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// Result of pulling one block of samples from a stream.
#[derive(Debug, Clone, Copy, Default)]
pub struct StreamBlock {
    /// Frames actually written to the output slice.
    pub frames: usize,
    /// The stream finished this block (`LoopMode::Once`).
    pub completed: bool,
    /// The stream wrapped around this block (`LoopMode::Infinite`).
    pub looped: bool,
}

/// An external playable audio resource referenced by an emitter.
///
/// Implementations must be callable from both the main thread (state control)
/// and the audio callback thread (`next_block`), and must never block on I/O.
pub trait StreamHandle: Send + Sync {
    /// Starts or resumes playback. Idempotent while playing; restarts from
    /// the beginning after completion.
    fn play(&self);
    /// Pauses, retaining the playback position. No-op unless playing.
    fn pause(&self);
    /// Stops and rewinds. Idempotent while stopped.
    fn stop(&self);
    fn state(&self) -> PlayState;
    /// Current playback position on the stream's own timeline.
    fn position(&self) -> Duration;
    fn set_loop_mode(&self, mode: LoopMode);
    fn sample_rate(&self) -> u32;
    /// False when the stream cannot produce audio (missing or empty source).
    fn is_available(&self) -> bool;
    /// Writes up to `out.len()` mono samples at the cursor, advancing it.
    /// Returns silence (zero frames) unless playing.
    fn next_block(&self, out: &mut [f32]) -> StreamBlock;
}

struct StreamState {
    play_state: PlayState,
    loop_mode: LoopMode,
    cursor: usize,
}

/// In-memory stream over decoded audio, downmixed to mono at construction.
pub struct BufferStream {
    audio: AudioData,
    state: Mutex<StreamState>,
}

impl BufferStream {
    pub fn new(audio: AudioData, loop_mode: LoopMode) -> Self {
        let audio = audio.to_mono();
        Self {
            audio,
            state: Mutex::new(StreamState {
                play_state: PlayState::Stopped,
                loop_mode,
                cursor: 0,
            }),
        }
    }

    pub fn audio(&self) -> &AudioData {
        &self.audio
    }

    fn total_frames(&self) -> usize {
        self.audio.total_frames()
    }
}

impl StreamHandle for BufferStream {
    fn play(&self) {
        let mut state = self.state.lock().unwrap();
        if state.play_state == PlayState::Playing {
            return;
        }
        if state.cursor >= self.total_frames() {
            state.cursor = 0;
        }
        log::debug!("Stream resuming from frame {}", state.cursor);
        state.play_state = PlayState::Playing;
    }

    fn pause(&self) {
        let mut state = self.state.lock().unwrap();
        if state.play_state == PlayState::Playing {
            log::debug!("Stream paused at frame {}", state.cursor);
            state.play_state = PlayState::Paused;
        }
    }

    fn stop(&self) {
        let mut state = self.state.lock().unwrap();
        if state.play_state == PlayState::Stopped && state.cursor == 0 {
            return;
        }
        log::debug!("Stream stopped at frame {}", state.cursor);
        state.play_state = PlayState::Stopped;
        state.cursor = 0;
    }

    fn state(&self) -> PlayState {
        self.state.lock().unwrap().play_state
    }

    fn position(&self) -> Duration {
        let cursor = self.state.lock().unwrap().cursor;
        Duration::from_secs_f64(cursor as f64 / self.audio.sample_rate() as f64)
    }

    fn set_loop_mode(&self, mode: LoopMode) {
        self.state.lock().unwrap().loop_mode = mode;
    }

    fn sample_rate(&self) -> u32 {
        self.audio.sample_rate()
    }

    fn is_available(&self) -> bool {
        !self.audio.is_empty()
    }

    fn next_block(&self, out: &mut [f32]) -> StreamBlock {
        let mut state = self.state.lock().unwrap();
        if state.play_state != PlayState::Playing {
            return StreamBlock::default();
        }

        let samples = self.audio.samples();
        let total = self.total_frames();
        let mut block = StreamBlock::default();

        while block.frames < out.len() {
            if state.cursor >= total {
                match state.loop_mode {
                    LoopMode::Once => {
                        log::debug!("Stream completed at frame {}", state.cursor);
                        state.play_state = PlayState::Stopped;
                        block.completed = true;
                        break;
                    }
                    LoopMode::Infinite => {
                        state.cursor = 0;
                        block.looped = true;
                        if total == 0 {
                            break;
                        }
                    }
                }
            }
            out[block.frames] = samples[state.cursor];
            state.cursor += 1;
            block.frames += 1;
        }

        block
    }
}
