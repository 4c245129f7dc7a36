//! # Orbisonic Core
//!
//! Positional audio bound to scene-graph nodes, with listener-relative
//! attenuation and stereo panning recomputed once per rendered frame.
//!
//! Orbisonic separates what moves from what plays: a host application keeps
//! its transforms in a [`SceneGraph`], binds audio streams to nodes through an
//! [`AudioStage`], and designates one node (usually the camera) as the
//! listener. Each frame, after transforms are finalized, a single
//! [`AudioStage::update_frame`] call resolves world positions and publishes
//! gain and pan to the audio thread.
//!
//! ## Quick Start
//!
//! ```no_run
//! use orbisonic_core::*;
//! use std::sync::Arc;
//!
//! let desc = StageDesc::default();
//! let stage = Arc::new(AudioStage::new(desc.clone())?);
//!
//! // Build a scene: a camera and a sound source 20 units ahead of it.
//! let mut scene = SceneGraph::new();
//! let camera = scene.add_node(Transform::from_position(Vec3::new(10.0, 5.0, 0.0)));
//! let sphere = scene.add_node(Transform::from_position(Vec3::new(70.0, 0.0, 0.0)));
//! stage.set_listener_node(camera);
//!
//! // Bind decoded audio to the sphere.
//! let audio = audio_data::AudioData::from_path("audio.ogg")?;
//! let emitter = stage.bind_audio(
//!     sphere,
//!     audio,
//!     EmitterDesc::new(20.0).loop_mode(LoopMode::Infinite),
//! )?;
//! stage.start_stream(emitter)?;
//!
//! // Start output, then gate audio on a user gesture.
//! let mut engine = OrbisonicEngine::new(desc, stage.clone());
//! engine.start()?;
//! stage.activate();
//!
//! // Per rendered frame, after transforms settle:
//! scene.set_position(camera, Vec3::new(12.0, 5.0, 3.0));
//! stage.update_frame(&scene);
//!
//! for event in stage.poll_events() {
//!     if let OrbisonicEvent::StreamCompleted { emitter_id } = event {
//!         println!("finished: {emitter_id}");
//!     }
//! }
//! # Ok::<(), OrbisonicError>(())
//! ```
//!
//! ## Key Components
//!
//! - **[`AudioStage`]**: binds emitters and the listener to nodes, recomputes
//!   spatial parameters on `update_frame`
//! - **[`SceneGraph`]**: hierarchical transforms with world-matrix resolution
//! - **[`OrbisonicEngine`]**: cpal output device driving the mixer
//! - **[`StreamHandle`]**: playback abstraction; [`BufferStream`] plays
//!   decoded [`AudioData`](audio_data::AudioData)
//! - **[`OrbisonicEvent`]**: completion, loop, and stale-binding notifications
//!
//! ## Threading
//!
//! The main thread owns the scene graph and drives `update_frame`; the audio
//! callback mixes with `try_lock` and never blocks. A contended lock costs
//! one silent block.

pub mod audio_data;
pub mod binding;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod math;
pub mod mixer;
pub mod scene;
pub mod spatial;
pub mod stream;

pub use binding::{AudioStage, EmitterId, EmitterParams};
pub use config::{EmitterDesc, StageDesc};
pub use engine::OrbisonicEngine;
pub use error::OrbisonicError;
pub use events::OrbisonicEvent;
pub use math::{Pose, Quat, Vec3};
pub use scene::{NodeId, SceneGraph, Transform};
pub use stream::{BufferStream, LoopMode, PlayState, StreamBlock, StreamHandle};
