//! Recording playback backend
//!
//! Produces no sound. Every command is appended to a log that tests (and the
//! CLI's dry runs) can inspect. Samples "exist" only if registered with
//! [`RecordingBackend::with_sample`].

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::{ChannelId, PlaybackBackend, SampleId};
use crate::error::{EngineAudioError, Result};

/// A command issued to the backend
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackCommand {
    Play { channel: ChannelId, sample: SampleId },
    SetVolume { channel: ChannelId, volume: f32 },
    FadeOut { channel: ChannelId, duration: Duration },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChannelActivity {
    Stopped,
    Playing,
    Fading,
}

#[derive(Debug, Clone)]
struct MockChannel {
    activity: ChannelActivity,
    volume: f32,
    released: bool,
}

/// Backend that records commands instead of playing audio
#[derive(Debug, Clone, Default)]
pub struct RecordingBackend {
    ready: bool,
    available: HashSet<PathBuf>,
    samples: Vec<PathBuf>,
    channels: Vec<MockChannel>,
    commands: Vec<PlaybackCommand>,
    channel_limit: Option<usize>,
    fail_playback: bool,
}

impl RecordingBackend {
    /// A backend that reports ready immediately
    pub fn ready() -> Self {
        Self {
            ready: true,
            ..Default::default()
        }
    }

    /// A backend that reports not-ready until [`set_ready`](Self::set_ready)
    pub fn not_ready() -> Self {
        Self::default()
    }

    /// Register a path that `load_sample` will accept
    pub fn with_sample(mut self, path: impl Into<PathBuf>) -> Self {
        self.available.insert(path.into());
        self
    }

    /// Refuse to hand out more than `limit` channels at once
    pub fn with_channel_limit(mut self, limit: usize) -> Self {
        self.channel_limit = Some(limit);
        self
    }

    pub fn set_ready(&mut self, ready: bool) {
        self.ready = ready;
    }

    /// Make every `play_looped` call fail while set
    pub fn set_playback_failing(&mut self, failing: bool) {
        self.fail_playback = failing;
    }

    /// Every command issued so far
    pub fn commands(&self) -> &[PlaybackCommand] {
        &self.commands
    }

    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    /// Number of `Play` commands issued
    pub fn play_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, PlaybackCommand::Play { .. }))
            .count()
    }

    /// Number of `FadeOut` commands issued
    pub fn fade_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, PlaybackCommand::FadeOut { .. }))
            .count()
    }

    /// Paths loaded so far, in load order
    pub fn loaded_paths(&self) -> &[PathBuf] {
        &self.samples
    }

    /// Path a sample handle was loaded from
    pub fn sample_path(&self, sample: SampleId) -> Option<&Path> {
        self.samples.get(sample.0).map(|p| p.as_path())
    }

    /// Last volume set on a channel
    pub fn volume(&self, channel: ChannelId) -> Option<f32> {
        self.channels.get(channel.0).map(|c| c.volume)
    }

    /// Channels ever acquired, released ones included
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Channels acquired and not yet released
    pub fn held_channels(&self) -> usize {
        self.channels.iter().filter(|c| !c.released).count()
    }

    /// Let every pending fade run to completion
    pub fn finish_fades(&mut self) {
        for channel in &mut self.channels {
            if channel.activity == ChannelActivity::Fading {
                channel.activity = ChannelActivity::Stopped;
            }
        }
    }

    fn channel_mut(&mut self, channel: ChannelId) -> Result<&mut MockChannel> {
        self.channels
            .get_mut(channel.0)
            .filter(|c| !c.released)
            .ok_or_else(|| EngineAudioError::UnknownHandle {
                handle: channel.to_string(),
            })
    }
}

impl PlaybackBackend for RecordingBackend {
    fn is_ready(&self) -> bool {
        self.ready
    }

    fn load_sample(&mut self, path: &Path) -> Result<SampleId> {
        if !self.ready {
            return Err(EngineAudioError::BackendNotReady);
        }
        if !self.available.contains(path) {
            return Err(EngineAudioError::SampleNotFound {
                path: path.display().to_string(),
                source: None,
            });
        }
        self.samples.push(path.to_path_buf());
        Ok(SampleId(self.samples.len() - 1))
    }

    fn acquire_channel(&mut self) -> Result<ChannelId> {
        if !self.ready {
            return Err(EngineAudioError::BackendNotReady);
        }
        if let Some(limit) = self.channel_limit {
            if self.held_channels() >= limit {
                return Err(EngineAudioError::ChannelsExhausted { limit });
            }
        }
        self.channels.push(MockChannel {
            activity: ChannelActivity::Stopped,
            volume: 1.0,
            released: false,
        });
        Ok(ChannelId(self.channels.len() - 1))
    }

    fn release_channel(&mut self, channel: ChannelId) {
        if let Some(state) = self.channels.get_mut(channel.0) {
            state.activity = ChannelActivity::Stopped;
            state.released = true;
        }
    }

    fn play_looped(&mut self, channel: ChannelId, sample: SampleId) -> Result<()> {
        if sample.0 >= self.samples.len() {
            return Err(EngineAudioError::UnknownHandle {
                handle: sample.to_string(),
            });
        }
        if self.fail_playback {
            self.channel_mut(channel)?;
            return Err(EngineAudioError::PlaybackFailed {
                reason: format!("{} refused to start", channel),
            });
        }
        self.channel_mut(channel)?.activity = ChannelActivity::Playing;
        self.commands.push(PlaybackCommand::Play { channel, sample });
        Ok(())
    }

    fn is_busy(&self, channel: ChannelId) -> bool {
        self.channels
            .get(channel.0)
            .map(|c| c.activity == ChannelActivity::Playing)
            .unwrap_or(false)
    }

    fn set_volume(&mut self, channel: ChannelId, volume: f32) -> Result<()> {
        let volume = volume.clamp(0.0, 1.0);
        self.channel_mut(channel)?.volume = volume;
        self.commands
            .push(PlaybackCommand::SetVolume { channel, volume });
        Ok(())
    }

    fn fade_out(&mut self, channel: ChannelId, duration: Duration) -> Result<()> {
        let state = self.channel_mut(channel)?;
        if state.activity == ChannelActivity::Playing {
            state.activity = if duration.is_zero() {
                ChannelActivity::Stopped
            } else {
                ChannelActivity::Fading
            };
        }
        self.commands
            .push(PlaybackCommand::FadeOut { channel, duration });
        Ok(())
    }
}
