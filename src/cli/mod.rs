//! CLI Module
//!
//! Command-line interface for inspecting the crossfade curve and rendering
//! simulated drives.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Engine audio tools - throttle-driven engine sound crossfading
#[derive(Parser, Debug)]
#[command(name = "engine-audio")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print target volumes across the throttle range
    #[command(name = "curve")]
    Curve {
        /// Number of throttle steps between 0 and 1
        #[arg(short, long, default_value_t = 20)]
        steps: usize,

        /// Config file to take the curve from (defaults otherwise)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Write synthetic idle/mid/high engine loops
    #[command(name = "generate-samples")]
    GenerateSamples {
        /// Output directory
        dir: PathBuf,

        /// Sample rate of the generated files
        #[arg(long, default_value_t = 48000)]
        sample_rate: u32,
    },

    /// Render a throttle script through an engine session
    #[command(name = "simulate")]
    Simulate {
        /// Config JSON, or a directory holding idle*/mid*/high* WAV files
        #[arg(short, long)]
        config: PathBuf,

        /// Throttle script JSON
        #[arg(short, long)]
        script: PathBuf,

        /// Output WAV file
        #[arg(short, long)]
        output: PathBuf,

        /// Update rate in frames per second
        #[arg(long, default_value_t = 60.0)]
        fps: f64,

        /// Seconds simulated after the last keyframe
        #[arg(long, default_value_t = 8.0)]
        tail_secs: f64,

        /// Output bit depth (16, 24 or 32)
        #[arg(long, default_value_t = 16)]
        bit_depth: u16,
    },
}
