//! The spatial audio binding model.
//!
//! [`AudioStage`] associates audio streams with scene-graph nodes and a single
//! listener with another node (typically the camera). Once per rendered frame,
//! after the host has finalized transforms, [`AudioStage::update_frame`]
//! resolves world positions and recomputes each emitter's gain and pan. The
//! audio engine reads those parameters from its callback thread.
//!
//! # Architecture
//!
//! - **Main thread**: owns the `SceneGraph`, binds emitters, drives
//!   `update_frame` once per render tick.
//! - **Audio thread**: mixes streams through [`mixer`](crate::mixer) using the
//!   parameters published here; a missed `try_lock` yields one silent block,
//!   never a blocked callback.

use crate::audio_data::AudioData;
use crate::config::{EmitterDesc, StageDesc};
use crate::error::{OrbisonicError, Result};
use crate::events::OrbisonicEvent;
use crate::math::Pose;
use crate::scene::{NodeId, SceneGraph};
use crate::spatial;
use crate::stream::{BufferStream, StreamHandle};
use crossbeam_channel::{Receiver, Sender, unbounded};
use glam::Vec3;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, TryLockError};

/// Lightweight, type-safe handle for bound emitters.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct EmitterId(u64);

impl std::fmt::Display for EmitterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EmitterId({})", self.0)
    }
}

/// Per-frame audio parameters computed for one emitter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmitterParams {
    /// Gain multiplier: distance attenuation x emitter volume. Zero until the
    /// first `update_frame` with a bound listener.
    pub gain: f32,
    /// Stereo pan: -1.0 full left, 1.0 full right.
    pub pan: f32,
}

impl Default for EmitterParams {
    fn default() -> Self {
        Self { gain: 0.0, pan: 0.0 }
    }
}

pub(crate) struct Emitter {
    pub(crate) node: NodeId,
    pub(crate) stream: Arc<dyn StreamHandle>,
    pub(crate) desc: EmitterDesc,
    pub(crate) params: EmitterParams,
    pub(crate) last_position: Option<Vec3>,
    stale: bool,
}

pub(crate) struct StageInner {
    pub(crate) emitters: HashMap<EmitterId, Emitter>,
    listener_node: Option<NodeId>,
    activated: bool,
    pending_start: Vec<EmitterId>,
    next_emitter_id: u64,
}

/// Central object of the binding model. Shared with the engine via `Arc`.
pub struct AudioStage {
    desc: StageDesc,
    inner: Mutex<StageInner>,
    event_sender: Sender<OrbisonicEvent>,
    event_receiver: Receiver<OrbisonicEvent>,
}

impl AudioStage {
    pub fn new(desc: StageDesc) -> Result<Self> {
        if desc.sample_rate == 0 || desc.channels == 0 || desc.block_size == 0 {
            return Err(OrbisonicError::InvalidConfiguration(
                "sample_rate, channels and block_size must be non-zero".to_string(),
            ));
        }
        let (event_sender, event_receiver) = unbounded();
        Ok(Self {
            desc,
            inner: Mutex::new(StageInner {
                emitters: HashMap::new(),
                listener_node: None,
                activated: false,
                pending_start: Vec::new(),
                next_emitter_id: 0,
            }),
            event_sender,
            event_receiver,
        })
    }

    pub fn desc(&self) -> &StageDesc {
        &self.desc
    }

    pub fn sample_rate(&self) -> u32 {
        self.desc.sample_rate
    }

    /// Attaches a new emitter to `node`, wrapping `stream`.
    ///
    /// Fails fast with `InvalidConfiguration` for a non-positive
    /// `ref_distance` (or otherwise malformed descriptor); no emitter is
    /// created on error. The stream is left untouched until it is started.
    pub fn bind_emitter(
        &self,
        node: NodeId,
        stream: Arc<dyn StreamHandle>,
        desc: EmitterDesc,
    ) -> Result<EmitterId> {
        desc.validate()?;

        let mut inner = self.inner.lock().unwrap();
        if inner.emitters.len() >= self.desc.max_emitters {
            return Err(OrbisonicError::InvalidConfiguration(format!(
                "emitter limit of {} reached",
                self.desc.max_emitters
            )));
        }

        if stream.sample_rate() != self.desc.sample_rate {
            log::warn!(
                "Stream sample rate {} differs from stage rate {}; playback will be pitched",
                stream.sample_rate(),
                self.desc.sample_rate
            );
        }

        stream.set_loop_mode(desc.loop_mode);

        let id = EmitterId(inner.next_emitter_id);
        inner.next_emitter_id += 1;
        inner.emitters.insert(
            id,
            Emitter {
                node,
                stream,
                desc,
                params: EmitterParams::default(),
                last_position: None,
                stale: false,
            },
        );

        log::debug!("Bound emitter {} to node {}", id, node);
        Ok(id)
    }

    /// Convenience binding for decoded audio: resamples to the stage rate,
    /// wraps it in a [`BufferStream`], and binds it.
    pub fn bind_audio(
        &self,
        node: NodeId,
        audio: AudioData,
        desc: EmitterDesc,
    ) -> Result<EmitterId> {
        let audio = audio.resample(self.desc.sample_rate)?;
        let stream = Arc::new(BufferStream::new(audio, desc.loop_mode));
        self.bind_emitter(node, stream, desc)
    }

    /// Detaches an emitter, stopping its stream. Returns the stream if the
    /// emitter existed.
    pub fn unbind_emitter(&self, id: EmitterId) -> Option<Arc<dyn StreamHandle>> {
        let mut inner = self.inner.lock().unwrap();
        inner.pending_start.retain(|pending| *pending != id);
        inner.emitters.remove(&id).map(|emitter| {
            emitter.stream.stop();
            log::debug!("Unbound emitter {}", id);
            emitter.stream
        })
    }

    /// Designates `node` as the pose source for the single listener.
    /// Replaces any prior binding; last write wins.
    pub fn set_listener_node(&self, node: NodeId) {
        self.inner.lock().unwrap().listener_node = Some(node);
    }

    /// Unbinds the listener. Subsequent frames silence every emitter.
    pub fn clear_listener(&self) {
        self.inner.lock().unwrap().listener_node = None;
    }

    pub fn listener_node(&self) -> Option<NodeId> {
        self.inner.lock().unwrap().listener_node
    }

    pub fn emitter_ids(&self) -> Vec<EmitterId> {
        self.inner.lock().unwrap().emitters.keys().copied().collect()
    }

    /// Current per-frame parameters of an emitter, as of the last
    /// `update_frame`.
    pub fn emitter_params(&self, id: EmitterId) -> Option<EmitterParams> {
        self.inner.lock().unwrap().emitters.get(&id).map(|e| e.params)
    }

    /// Recomputes gain and pan for every emitter from current scene-graph
    /// transforms.
    ///
    /// Call once per rendered frame, after transforms are finalized and
    /// before the frame is presented. Never fails and never blocks on I/O;
    /// per-emitter problems are logged and reported as events so one broken
    /// binding cannot halt the frame loop.
    pub fn update_frame(&self, scene: &SceneGraph) {
        let mut inner = self.inner.lock().unwrap();

        let listener = match inner.listener_node {
            None => {
                // Unbound listener: silence, not an error.
                Self::silence_all(&mut inner);
                return;
            }
            Some(node) => match scene.world_pose(node) {
                Some(pose) => pose,
                None => {
                    log::warn!("Listener node {} is gone from the scene graph", node);
                    let _ = self.event_sender.send(OrbisonicEvent::StaleListener);
                    Self::silence_all(&mut inner);
                    return;
                }
            },
        };

        for (id, emitter) in inner.emitters.iter_mut() {
            match scene.world_position(emitter.node) {
                Some(position) => {
                    if emitter.stale {
                        log::debug!("Emitter {} binding recovered", id);
                        emitter.stale = false;
                    }
                    emitter.last_position = Some(position);
                    emitter.params = Self::compute_params(&listener, position, &emitter.desc);
                }
                None => {
                    // Stale binding: hold the last-known parameters for this
                    // frame and report, without touching the other emitters.
                    if !emitter.stale {
                        log::warn!(
                            "Emitter {} node {} is gone from the scene graph; holding last-known parameters",
                            id,
                            emitter.node
                        );
                        emitter.stale = true;
                    }
                    let _ = self
                        .event_sender
                        .send(OrbisonicEvent::StaleBinding { emitter_id: *id });
                }
            }
        }
    }

    fn compute_params(listener: &Pose, position: Vec3, desc: &EmitterDesc) -> EmitterParams {
        let distance = listener.position.distance(position);
        let mut gain = spatial::distance_attenuation(distance, desc.ref_distance);
        if let Some(max_distance) = desc.max_distance {
            if distance >= max_distance {
                gain = 0.0;
            }
        }
        EmitterParams {
            gain: gain * desc.volume,
            pan: spatial::pan_toward(position, listener),
        }
    }

    fn silence_all(inner: &mut StageInner) {
        for emitter in inner.emitters.values_mut() {
            emitter.params.gain = 0.0;
        }
    }

    /// Starts an emitter's stream. Before [`activate`](Self::activate) the
    /// request is recorded and honored on activation.
    ///
    /// Idempotent if already playing. Fails with `StreamUnavailable` for an
    /// unknown emitter or a stream that cannot produce audio, leaving the
    /// stream stopped.
    pub fn start_stream(&self, id: EmitterId) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.emitters.contains_key(&id) {
            return Err(OrbisonicError::StreamUnavailable(format!(
                "no emitter {}",
                id
            )));
        }

        if !inner.activated {
            log::debug!("Stage not activated; deferring start of emitter {}", id);
            if !inner.pending_start.contains(&id) {
                inner.pending_start.push(id);
            }
            return Ok(());
        }

        let emitter = inner
            .emitters
            .get(&id)
            .ok_or_else(|| OrbisonicError::StreamUnavailable(format!("no emitter {}", id)))?;

        if !emitter.stream.is_available() {
            return Err(OrbisonicError::StreamUnavailable(format!(
                "emitter {} stream cannot produce audio",
                id
            )));
        }

        emitter.stream.play();
        let _ = self
            .event_sender
            .send(OrbisonicEvent::StreamStarted { emitter_id: id });
        Ok(())
    }

    /// Stops an emitter's stream synchronously, rewinding it. Idempotent if
    /// already stopped.
    pub fn stop_stream(&self, id: EmitterId) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.pending_start.retain(|pending| *pending != id);
        let emitter = inner
            .emitters
            .get(&id)
            .ok_or_else(|| OrbisonicError::StreamUnavailable(format!("no emitter {}", id)))?;

        emitter.stream.stop();
        let _ = self
            .event_sender
            .send(OrbisonicEvent::StreamStopped { emitter_id: id });
        Ok(())
    }

    /// User-gesture gate: no stream starts before this is called. Starts all
    /// deferred streams; per-emitter failures are logged, never propagated.
    /// Idempotent.
    pub fn activate(&self) {
        let mut inner = self.inner.lock().unwrap();
        if inner.activated {
            return;
        }
        inner.activated = true;
        log::info!(
            "Stage activated; starting {} pending stream(s)",
            inner.pending_start.len()
        );

        let pending = std::mem::take(&mut inner.pending_start);
        for id in pending {
            match inner.emitters.get(&id) {
                Some(emitter) if emitter.stream.is_available() => {
                    emitter.stream.play();
                    let _ = self
                        .event_sender
                        .send(OrbisonicEvent::StreamStarted { emitter_id: id });
                }
                Some(_) => log::error!("Emitter {} stream unavailable at activation", id),
                None => log::error!("Emitter {} was unbound before activation", id),
            }
        }
    }

    pub fn is_activated(&self) -> bool {
        self.inner.lock().unwrap().activated
    }

    /// Drains events emitted by the binding model and the mixer.
    pub fn poll_events(&self) -> Vec<OrbisonicEvent> {
        self.event_receiver.try_iter().collect()
    }

    pub(crate) fn try_lock_inner(
        &self,
    ) -> std::result::Result<MutexGuard<'_, StageInner>, TryLockError<MutexGuard<'_, StageInner>>>
    {
        self.inner.try_lock()
    }

    pub(crate) fn send_event(&self, event: OrbisonicEvent) {
        let _ = self.event_sender.send(event);
    }
}
