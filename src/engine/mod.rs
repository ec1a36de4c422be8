//! Audio Engine Module
//!
//! Buffer type and WAV I/O shared by the mixer and the CLI.

pub mod buffer;
pub mod io;

pub use buffer::{AudioBuffer, ChannelLayout, DEFAULT_SAMPLE_RATE};
pub use io::{export_audio, generate_engine_loop, import_audio};
