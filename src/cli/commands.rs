//! CLI Command Implementations

use std::fs;
use std::path::Path;

use log::{info, warn};

use crate::config::EngineAudioConfig;
use crate::crossfade::CrossfadeCurve;
use crate::engine::{export_audio, generate_engine_loop};
use crate::error::Result;
use crate::script::ThrottleScript;
use crate::session::FrameOutcome;
use crate::simulate::{simulate, SimulationOptions};

/// Fundamental frequencies of the generated loops (Hz)
const IDLE_HZ: f32 = 30.0;
const MID_HZ: f32 = 55.0;
const HIGH_HZ: f32 = 95.0;

/// Length of the generated loops
const LOOP_SECS: f32 = 2.0;

/// Print the crossfade curve as a table.
pub fn print_curve(steps: usize, config: Option<&Path>) -> Result<()> {
    let curve = match config {
        Some(path) => load_config(path)?.curve,
        None => CrossfadeCurve::default(),
    };
    let steps = steps.max(1);

    println!(
        "{:>8} {:>4} {:>7} {:>7} {:>7} {:>8}",
        "throttle", "zone", "idle", "mid", "high", "overall"
    );
    println!("{:-<48}", "");
    for i in 0..=steps {
        let throttle = i as f64 / steps as f64;
        let target = curve.target_volumes(throttle);
        println!(
            "{:>8.3} {:>4} {:>7.3} {:>7.3} {:>7.3} {:>8.3}",
            throttle,
            curve.zone(throttle).to_string(),
            target.idle,
            target.mid,
            target.high,
            curve.overall_volume(throttle)
        );
    }

    Ok(())
}

/// Write synthetic engine loops into `dir`.
pub fn generate_samples(dir: &Path, sample_rate: u32) -> Result<()> {
    fs::create_dir_all(dir)?;

    for (name, hz) in [("idle", IDLE_HZ), ("mid", MID_HZ), ("high", HIGH_HZ)] {
        let path = dir.join(format!("{}.wav", name));
        let buffer = generate_engine_loop(hz, LOOP_SECS, sample_rate);
        export_audio(&buffer, &path, 16)?;
        info!("Wrote {} ({} Hz)", path.display(), hz);
        println!("Generated: {}", path.display());
    }

    Ok(())
}

/// Render a throttle script to a WAV file.
pub fn run_simulation(
    config: &Path,
    script: &Path,
    output: &Path,
    options: SimulationOptions,
    bit_depth: u16,
) -> Result<()> {
    let config = load_config(config)?;
    let script = ThrottleScript::load(script)?;
    info!(
        "Simulating {:.2}s script at {} fps",
        script.duration_secs(),
        options.fps
    );

    let report = simulate(config, &script, options)?;
    if report.count(FrameOutcome::Disabled) > 0 {
        warn!("Engine audio was disabled; output is silent");
    }

    export_audio(&report.audio, output, bit_depth)?;

    println!("Rendered: {}", output.display());
    println!("Duration: {:.2}s", report.audio.duration_secs());
    println!("Peak: {:.3}", report.audio.peak());
    for t in report.times_of(FrameOutcome::Engaged) {
        println!("  engaged   at {:>7.3}s", t);
    }
    for t in report.times_of(FrameOutcome::FadedOut) {
        println!("  faded out at {:>7.3}s", t);
    }

    Ok(())
}

/// A JSON config file, or a directory of samples.
fn load_config(path: &Path) -> Result<EngineAudioConfig> {
    if path.is_dir() {
        let config = EngineAudioConfig::from_asset_dir(path)?;
        config.validate()?;
        Ok(config)
    } else {
        EngineAudioConfig::load(path)
    }
}
