//! Playback backend seam
//!
//! The session never talks to an audio device directly. It drives a
//! [`PlaybackBackend`], which provides the primitives an engine sound needs:
//! sample loading, channel acquisition, looped playback, volume and timed
//! fade-out.
//!
//! Two implementations ship with the crate:
//! - [`SoftwareMixer`]: offline mixer rendering into an `AudioBuffer`
//! - [`RecordingBackend`]: records every command, for tests and dry runs

mod mixer;
mod mock;

pub use mixer::SoftwareMixer;
pub use mock::{PlaybackCommand, RecordingBackend};

use std::fmt;
use std::path::Path;
use std::time::Duration;

use crate::error::Result;

/// Handle to a sample loaded into a backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SampleId(pub(crate) usize);

/// Handle to a playback channel owned by one session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelId(pub(crate) usize);

impl fmt::Display for SampleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sample#{}", self.0)
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "channel#{}", self.0)
    }
}

/// Audio playback primitives used by an engine session
///
/// Channel semantics:
/// - A channel is *busy* while it is playing and not fading out.
/// - `play_looped` on a fading or idle channel (re)starts the loop from the
///   beginning at the channel's current volume.
/// - A fade ramps the channel down to silence over `duration`, then stops it.
pub trait PlaybackBackend {
    /// Whether the backend can load samples and play yet
    fn is_ready(&self) -> bool;

    /// Load a sample from disk
    ///
    /// # Errors
    /// `SampleNotFound` if the file is missing; other variants if it cannot
    /// be decoded or the backend is not ready.
    fn load_sample(&mut self, path: &Path) -> Result<SampleId>;

    /// Reserve a channel for the caller's exclusive use
    fn acquire_channel(&mut self) -> Result<ChannelId>;

    /// Stop a channel and return it to the backend; unknown handles are ignored
    fn release_channel(&mut self, channel: ChannelId);

    /// Loop `sample` on `channel` indefinitely
    fn play_looped(&mut self, channel: ChannelId, sample: SampleId) -> Result<()>;

    /// Whether `channel` is playing and not fading out
    fn is_busy(&self, channel: ChannelId) -> bool;

    /// Set a channel's volume, clamped to [0, 1]
    fn set_volume(&mut self, channel: ChannelId, volume: f32) -> Result<()>;

    /// Fade `channel` to silence over `duration`, then stop it
    fn fade_out(&mut self, channel: ChannelId, duration: Duration) -> Result<()>;
}
