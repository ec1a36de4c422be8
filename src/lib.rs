//! engine-audio - Throttle-Driven Engine Sound
//!
//! Turns a per-frame throttle value into a three-layer engine sound. Idle,
//! mid and high RPM loops play on their own channels; their volumes follow a
//! piecewise-linear crossfade curve, smoothed frame to frame and scaled by an
//! overall dynamics term.
//!
//! # Architecture
//!
//! - [`crossfade`]: pure throttle-to-volume math
//! - [`session`]: per-vehicle state machine driving a playback backend
//! - [`playback`]: backend trait, software mixer, recording backend
//! - [`engine`]: audio buffers and WAV I/O
//! - [`simulate`]: offline drive rendering from a [`script::ThrottleScript`]

pub mod cli;
pub mod clock;
pub mod config;
pub mod crossfade;
pub mod engine;
pub mod error;
pub mod playback;
pub mod script;
pub mod session;
pub mod simulate;

pub use config::EngineAudioConfig;
pub use crossfade::{Band, BandVolumes, CrossfadeCurve, Zone};
pub use error::{EngineAudioError, Result};
pub use session::{EngineSession, FrameOutcome, SessionState};
