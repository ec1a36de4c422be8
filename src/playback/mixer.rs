//! Offline software mixer
//!
//! Loops loaded samples on any number of channels and renders the sum into an
//! [`AudioBuffer`]. Starts uninitialized, mirroring a device that comes up
//! after the engine sound has been constructed; call
//! [`SoftwareMixer::initialize`] to make it ready.

use std::path::Path;
use std::time::Duration;

use log::debug;

use super::{ChannelId, PlaybackBackend, SampleId};
use crate::engine::{import_audio, AudioBuffer, ChannelLayout};
use crate::error::{EngineAudioError, Result};

/// Output format, fixed at initialization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MixerSpec {
    sample_rate: u32,
    layout: ChannelLayout,
}

/// Linear fade to silence
#[derive(Debug, Clone, Copy)]
struct Fade {
    total: usize,
    remaining: usize,
}

impl Fade {
    /// Gain for the next frame
    fn gain(&self) -> f32 {
        self.remaining as f32 / self.total as f32
    }
}

#[derive(Debug, Clone, Default)]
struct MixerChannel {
    sample: Option<SampleId>,
    position: usize,
    volume: f32,
    fade: Option<Fade>,
    released: bool,
}

impl MixerChannel {
    fn stop(&mut self) {
        self.sample = None;
        self.position = 0;
        self.fade = None;
    }
}

/// Software mixer implementing [`PlaybackBackend`]
#[derive(Debug, Default)]
pub struct SoftwareMixer {
    spec: Option<MixerSpec>,
    samples: Vec<AudioBuffer>,
    channels: Vec<MixerChannel>,
    frames_rendered: u64,
}

impl SoftwareMixer {
    /// An uninitialized mixer
    pub fn new() -> Self {
        Self::default()
    }

    /// Bring the mixer up; loading and playback are refused until then
    pub fn initialize(&mut self, sample_rate: u32, layout: ChannelLayout) {
        debug!(
            "Mixer initialized at {} Hz, {} channel(s)",
            sample_rate,
            layout.num_channels()
        );
        self.spec = Some(MixerSpec {
            sample_rate,
            layout,
        });
    }

    pub fn sample_rate(&self) -> Option<u32> {
        self.spec.map(|s| s.sample_rate)
    }

    /// Total frames rendered since initialization
    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    /// Number of channels currently producing sound, fading ones included
    pub fn active_channels(&self) -> usize {
        self.channels.iter().filter(|c| c.sample.is_some()).count()
    }

    /// Frames covering `secs` at the mixer rate
    pub fn frames_for(&self, secs: f64) -> usize {
        self.sample_rate()
            .map(|rate| (secs * rate as f64).round() as usize)
            .unwrap_or(0)
    }

    /// Mix `frames` frames of every active channel
    ///
    /// Returns an empty buffer if the mixer is not initialized.
    pub fn render(&mut self, frames: usize) -> AudioBuffer {
        let spec = match self.spec {
            Some(spec) => spec,
            None => return AudioBuffer::new(0, ChannelLayout::Stereo, 0),
        };
        let mut out = AudioBuffer::new(frames, spec.layout, spec.sample_rate);

        for channel in &mut self.channels {
            let sample = match channel.sample {
                Some(id) => &self.samples[id.0],
                None => continue,
            };
            let len = sample.num_samples();
            if len == 0 {
                channel.stop();
                continue;
            }

            for frame in 0..frames {
                let gain = match channel.fade.as_mut() {
                    Some(fade) if fade.remaining == 0 => {
                        channel.sample = None;
                        break;
                    }
                    Some(fade) => {
                        let g = fade.gain();
                        fade.remaining -= 1;
                        g
                    }
                    None => 1.0,
                } * channel.volume;

                for ch in 0..out.num_channels() {
                    out.samples[ch][frame] += sample.samples[ch][channel.position] * gain;
                }
                channel.position = (channel.position + 1) % len;
            }

            if channel.sample.is_none()
                || channel.fade.map(|f| f.remaining == 0).unwrap_or(false)
            {
                channel.stop();
            }
        }

        self.frames_rendered += frames as u64;
        out
    }

    fn channel_mut(&mut self, channel: ChannelId) -> Result<&mut MixerChannel> {
        self.channels
            .get_mut(channel.0)
            .filter(|c| !c.released)
            .ok_or_else(|| EngineAudioError::UnknownHandle {
                handle: channel.to_string(),
            })
    }
}

impl PlaybackBackend for SoftwareMixer {
    fn is_ready(&self) -> bool {
        self.spec.is_some()
    }

    fn load_sample(&mut self, path: &Path) -> Result<SampleId> {
        let spec = self.spec.ok_or(EngineAudioError::BackendNotReady)?;
        let buffer = import_audio(path, spec.sample_rate)?.to_layout(spec.layout);
        debug!(
            "Loaded {} ({:.2}s) into mixer",
            path.display(),
            buffer.duration_secs()
        );
        self.samples.push(buffer);
        Ok(SampleId(self.samples.len() - 1))
    }

    fn acquire_channel(&mut self) -> Result<ChannelId> {
        if self.spec.is_none() {
            return Err(EngineAudioError::BackendNotReady);
        }
        let fresh = MixerChannel {
            volume: 1.0,
            ..Default::default()
        };
        if let Some(index) = self.channels.iter().position(|c| c.released) {
            self.channels[index] = fresh;
            return Ok(ChannelId(index));
        }
        self.channels.push(fresh);
        Ok(ChannelId(self.channels.len() - 1))
    }

    fn release_channel(&mut self, channel: ChannelId) {
        if let Some(state) = self.channels.get_mut(channel.0) {
            state.stop();
            state.released = true;
        }
    }

    fn play_looped(&mut self, channel: ChannelId, sample: SampleId) -> Result<()> {
        if sample.0 >= self.samples.len() {
            return Err(EngineAudioError::UnknownHandle {
                handle: sample.to_string(),
            });
        }
        let state = self.channel_mut(channel)?;
        state.sample = Some(sample);
        state.position = 0;
        state.fade = None;
        Ok(())
    }

    fn is_busy(&self, channel: ChannelId) -> bool {
        self.channels
            .get(channel.0)
            .map(|c| c.sample.is_some() && c.fade.is_none())
            .unwrap_or(false)
    }

    fn set_volume(&mut self, channel: ChannelId, volume: f32) -> Result<()> {
        self.channel_mut(channel)?.volume = volume.clamp(0.0, 1.0);
        Ok(())
    }

    fn fade_out(&mut self, channel: ChannelId, duration: Duration) -> Result<()> {
        let total = self.frames_for(duration.as_secs_f64());
        let state = self.channel_mut(channel)?;
        if state.sample.is_none() || state.fade.is_some() {
            return Ok(());
        }
        if total == 0 {
            state.stop();
        } else {
            state.fade = Some(Fade {
                total,
                remaining: total,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::export_audio;
    use tempfile::{tempdir, TempDir};

    /// Mono file of constant 0.5
    fn constant_sample(dir: &TempDir) -> std::path::PathBuf {
        let path = dir.path().join("dc.wav");
        let buffer = AudioBuffer::from_interleaved(&[0.5; 480], ChannelLayout::Mono, 48000).unwrap();
        export_audio(&buffer, &path, 32).unwrap();
        path
    }

    fn ready_mixer() -> SoftwareMixer {
        let mut mixer = SoftwareMixer::new();
        mixer.initialize(48000, ChannelLayout::Mono);
        mixer
    }

    #[test]
    fn test_uninitialized_mixer() {
        let mut mixer = SoftwareMixer::new();
        assert!(!mixer.is_ready());
        assert!(matches!(
            mixer.acquire_channel(),
            Err(EngineAudioError::BackendNotReady)
        ));
        assert!(mixer.render(64).is_empty());
    }

    #[test]
    fn test_loop_applies_volume() {
        let dir = tempdir().unwrap();
        let mut mixer = ready_mixer();
        let sample = mixer.load_sample(&constant_sample(&dir)).unwrap();
        let channel = mixer.acquire_channel().unwrap();

        mixer.play_looped(channel, sample).unwrap();
        mixer.set_volume(channel, 0.5).unwrap();

        // Longer than the sample, so it must wrap
        let out = mixer.render(1000);
        assert!(out.channel(0).iter().all(|s| (s - 0.25).abs() < 1e-6));
        assert!(mixer.is_busy(channel));
    }

    #[test]
    fn test_channels_sum() {
        let dir = tempdir().unwrap();
        let mut mixer = ready_mixer();
        let sample = mixer.load_sample(&constant_sample(&dir)).unwrap();
        let a = mixer.acquire_channel().unwrap();
        let b = mixer.acquire_channel().unwrap();
        mixer.play_looped(a, sample).unwrap();
        mixer.play_looped(b, sample).unwrap();

        let out = mixer.render(10);
        assert!((out.channel(0)[5] - 1.0).abs() < 1e-6);
        assert_eq!(mixer.active_channels(), 2);
    }

    #[test]
    fn test_fade_ramps_down_then_stops() {
        let dir = tempdir().unwrap();
        let mut mixer = ready_mixer();
        let sample = mixer.load_sample(&constant_sample(&dir)).unwrap();
        let channel = mixer.acquire_channel().unwrap();
        mixer.play_looped(channel, sample).unwrap();

        // 10 ms = 480 frames
        mixer
            .fade_out(channel, Duration::from_millis(10))
            .unwrap();
        assert!(!mixer.is_busy(channel));

        let out = mixer.render(960);
        let data = out.channel(0);
        assert!((data[0] - 0.5).abs() < 1e-6);
        assert!((data[240] - 0.25).abs() < 1e-3);
        assert!(data[479] < 0.01);
        assert!(data[480..].iter().all(|&s| s == 0.0));
        assert_eq!(mixer.active_channels(), 0);
    }

    #[test]
    fn test_play_during_fade_restarts() {
        let dir = tempdir().unwrap();
        let mut mixer = ready_mixer();
        let sample = mixer.load_sample(&constant_sample(&dir)).unwrap();
        let channel = mixer.acquire_channel().unwrap();
        mixer.play_looped(channel, sample).unwrap();
        mixer.fade_out(channel, Duration::from_millis(10)).unwrap();
        mixer.render(100);

        mixer.play_looped(channel, sample).unwrap();
        assert!(mixer.is_busy(channel));
        let out = mixer.render(1000);
        assert!(out.channel(0).iter().all(|s| (s - 0.5).abs() < 1e-6));
    }

    #[test]
    fn test_unknown_channel() {
        let mut mixer = ready_mixer();
        let err = mixer.set_volume(ChannelId(7), 0.5).unwrap_err();
        assert_eq!(err.error_code(), "UNKNOWN_HANDLE");
    }

    #[test]
    fn test_released_channel_is_reused() {
        let dir = tempdir().unwrap();
        let mut mixer = ready_mixer();
        let sample = mixer.load_sample(&constant_sample(&dir)).unwrap();
        let a = mixer.acquire_channel().unwrap();
        let b = mixer.acquire_channel().unwrap();
        mixer.play_looped(a, sample).unwrap();

        mixer.release_channel(a);
        assert!(!mixer.is_busy(a));
        assert!(mixer.set_volume(a, 0.5).is_err());
        assert_eq!(mixer.active_channels(), 0);

        assert_eq!(mixer.acquire_channel().unwrap(), a);
        assert_ne!(mixer.acquire_channel().unwrap(), b);
    }

    #[test]
    fn test_frames_rendered_accumulates() {
        let mut mixer = ready_mixer();
        mixer.render(100);
        mixer.render(380);
        assert_eq!(mixer.frames_rendered(), 480);
        assert_eq!(mixer.frames_for(0.01), 480);
    }
}
