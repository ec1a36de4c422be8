//! Offline drive simulation
//!
//! Runs a [`ThrottleScript`] through an [`EngineSession`] backed by a
//! [`SoftwareMixer`], advancing a manual clock one frame at a time and
//! rendering exactly one frame's worth of audio between updates.

use log::{debug, info};

use crate::clock::{Clock, ManualClock};
use crate::config::EngineAudioConfig;
use crate::engine::{AudioBuffer, ChannelLayout};
use crate::error::{EngineAudioError, Result};
use crate::playback::SoftwareMixer;
use crate::script::ThrottleScript;
use crate::session::{EngineSession, FrameOutcome};

/// Simulation parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationOptions {
    /// Update rate in frames per second
    pub fps: f64,
    /// Extra seconds simulated after the last keyframe
    pub tail_secs: f64,
    pub sample_rate: u32,
    pub layout: ChannelLayout,
}

impl Default for SimulationOptions {
    fn default() -> Self {
        Self {
            fps: 60.0,
            tail_secs: 8.0,
            sample_rate: 48000,
            layout: ChannelLayout::Stereo,
        }
    }
}

/// Result of a simulation run
#[derive(Debug, Clone)]
pub struct SimulationReport {
    /// Rendered mix
    pub audio: AudioBuffer,
    /// Outcome of every frame, in order, with its simulated time
    pub frames: Vec<(f64, FrameOutcome)>,
}

impl SimulationReport {
    /// Number of frames with the given outcome
    pub fn count(&self, outcome: FrameOutcome) -> usize {
        self.frames.iter().filter(|(_, o)| *o == outcome).count()
    }

    /// Simulated times at which the given outcome occurred
    pub fn times_of(&self, outcome: FrameOutcome) -> Vec<f64> {
        self.frames
            .iter()
            .filter(|(_, o)| *o == outcome)
            .map(|(t, _)| *t)
            .collect()
    }
}

/// Drive a session through `script` and render the result
pub fn simulate(
    config: EngineAudioConfig,
    script: &ThrottleScript,
    options: SimulationOptions,
) -> Result<SimulationReport> {
    if !(options.fps.is_finite() && options.fps > 0.0) {
        return Err(EngineAudioError::InvalidConfig {
            field: "fps",
            reason: format!("{} must be positive", options.fps),
        });
    }
    config.validate()?;

    let mut mixer = SoftwareMixer::new();
    mixer.initialize(options.sample_rate, options.layout);
    let clock = ManualClock::new();
    let mut session = EngineSession::new(config, mixer, clock.clone());

    let mut audio = AudioBuffer::new(0, options.layout, options.sample_rate);
    let mut frames = Vec::new();
    let mut rendered: usize = 0;

    for (t, throttle) in script.frames(options.fps, options.tail_secs) {
        clock.set(t);
        let outcome = session.update(throttle);
        match outcome {
            FrameOutcome::Driving | FrameOutcome::Holding | FrameOutcome::Idle => {}
            other => debug!("t={:.3}s throttle={:.2}: {}", t, throttle, other),
        }
        frames.push((t, outcome));

        // Render up to the start of the next frame
        let next = session.backend().frames_for(t + 1.0 / options.fps);
        let block = session.backend_mut().render(next.saturating_sub(rendered));
        rendered += block.num_samples();
        audio.append(&block)?;
    }
    session.shutdown();

    info!(
        "Simulated {:.2}s ({} frames) ending at t={:.2}s",
        audio.duration_secs(),
        frames.len(),
        session.clock().now_secs()
    );
    Ok(SimulationReport { audio, frames })
}
