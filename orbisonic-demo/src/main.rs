//! Orbiting-camera demo: three looping emitters placed around the origin,
//! with the listener bound to a camera that circles the scene.
//!
//! Pass up to three audio file paths as arguments to hear your own sounds;
//! without arguments each sphere gets a synthesized tone.

use anyhow::{Context, Result};
use orbisonic_core::audio_data::AudioData;
use orbisonic_core::{
    AudioStage, EmitterDesc, EmitterId, LoopMode, NodeId, OrbisonicEngine, OrbisonicEvent,
    SceneGraph, StageDesc, Transform, Vec3,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

const FRAME_INTERVAL: Duration = Duration::from_millis(16);
const ORBIT_RADIUS: f32 = 100.0;
const ORBIT_PERIOD_SECS: f32 = 20.0;

/// Everything the demo frame loop touches, threaded explicitly instead of
/// living in globals.
struct SceneContext {
    scene: SceneGraph,
    stage: Arc<AudioStage>,
    camera: NodeId,
    emitters: Vec<EmitterId>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let desc = StageDesc {
        sample_rate: 48000,
        block_size: 1024,
        ..Default::default()
    };
    let stage = Arc::new(AudioStage::new(desc.clone())?);

    let mut scene = SceneGraph::new();
    let camera = scene.add_node(Transform::from_position(Vec3::new(10.0, 5.0, 0.0)));
    stage.set_listener_node(camera);

    // Three sources around the origin, rolloff starting at 20 units.
    let positions = [
        Vec3::new(70.0, 0.0, 0.0),
        Vec3::new(-70.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 70.0),
    ];
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut emitters = Vec::new();
    for (i, position) in positions.iter().enumerate() {
        let node = scene.add_node(Transform::from_position(*position));
        let audio = match args.get(i) {
            Some(path) => AudioData::from_path(path)
                .with_context(|| format!("failed to load {}", path))?,
            None => sine_tone(desc.sample_rate, 180.0 + 90.0 * i as f32, 2.0),
        };
        let id = stage.bind_audio(
            node,
            audio,
            EmitterDesc::new(20.0).loop_mode(LoopMode::Infinite),
        )?;
        // Recorded as pending until the stage is activated below.
        stage.start_stream(id)?;
        log::info!("Emitter {} bound at {:?}", id, position);
        emitters.push(id);
    }

    let mut context = SceneContext {
        scene,
        stage: stage.clone(),
        camera,
        emitters,
    };

    let mut engine = OrbisonicEngine::new(desc, stage.clone());
    engine.start()?;

    // Audio starts only after an explicit user gesture; Enter stands in.
    println!("Press Enter to start audio...");
    wait_for_enter()?;
    stage.activate();

    let stop = Arc::new(AtomicBool::new(false));
    spawn_stop_listener(stop.clone());
    println!("Playing. Press Enter again to stop.");

    run_orbit_loop(&mut context, &stop);

    for id in &context.emitters {
        context.stage.stop_stream(*id)?;
    }
    engine.stop()?;
    log::info!(
        "Done after {} frames of audio",
        engine.frames_processed()
    );
    Ok(())
}

/// Fixed-cadence frame loop: move the camera, face the origin, then publish
/// the frame's transforms to the stage.
fn run_orbit_loop(context: &mut SceneContext, stop: &AtomicBool) {
    let start = Instant::now();
    while !stop.load(Ordering::Relaxed) {
        let t = start.elapsed().as_secs_f32();
        let angle = t * std::f32::consts::TAU / ORBIT_PERIOD_SECS;
        let position = Vec3::new(
            ORBIT_RADIUS * angle.cos(),
            5.0,
            ORBIT_RADIUS * angle.sin(),
        );
        let mut pose = orbisonic_core::Pose::from_position(position);
        pose.look_at(Vec3::ZERO);
        context.scene.set_transform(
            context.camera,
            Transform::from_position_rotation(pose.position, pose.rotation),
        );

        context.stage.update_frame(&context.scene);

        for event in context.stage.poll_events() {
            match event {
                OrbisonicEvent::StreamLooped { .. } => {}
                other if other.is_warning() => log::warn!("{:?}", other),
                other => log::info!("{:?}", other),
            }
        }

        std::thread::sleep(FRAME_INTERVAL);
    }
}

fn sine_tone(sample_rate: u32, frequency: f32, seconds: f32) -> AudioData {
    let frames = (sample_rate as f32 * seconds) as usize;
    let samples: Vec<f32> = (0..frames)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            0.3 * (std::f32::consts::TAU * frequency * t).sin()
        })
        .collect();
    AudioData::from_samples(samples, sample_rate, 1)
        .expect("synthesized tone parameters are valid")
}

fn wait_for_enter() -> Result<()> {
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(())
}

fn spawn_stop_listener(stop: Arc<AtomicBool>) {
    std::thread::spawn(move || {
        let _ = wait_for_enter();
        stop.store(true, Ordering::Relaxed);
    });
}
