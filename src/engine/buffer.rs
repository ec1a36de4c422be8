//! Audio Buffer
//!
//! Planar 32-bit float buffer used for loaded engine samples and for mixer
//! output.

use crate::error::{EngineAudioError, Result};

// ============================================================================
// Constants
// ============================================================================

/// Default mixer sample rate
pub const DEFAULT_SAMPLE_RATE: u32 = 48000;

// ============================================================================
// Helper Functions
// ============================================================================

/// Convert linear amplitude to decibels
///
/// Returns `f32::NEG_INFINITY` for zero input.
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    if linear <= 0.0 {
        f32::NEG_INFINITY
    } else {
        20.0 * linear.log10()
    }
}

// ============================================================================
// Channel Layout
// ============================================================================

/// Audio channel configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChannelLayout {
    Mono,
    #[default]
    Stereo,
}

impl ChannelLayout {
    /// Returns the number of channels for this layout
    pub fn num_channels(&self) -> usize {
        match self {
            ChannelLayout::Mono => 1,
            ChannelLayout::Stereo => 2,
        }
    }

    /// Create a ChannelLayout from a channel count
    pub fn from_count(count: usize) -> Option<Self> {
        match count {
            1 => Some(ChannelLayout::Mono),
            2 => Some(ChannelLayout::Stereo),
            _ => None,
        }
    }
}

// ============================================================================
// Audio Buffer
// ============================================================================

/// Non-interleaved audio: one `Vec<f32>` per channel
///
/// # Example
/// ```
/// use engine_audio::engine::{AudioBuffer, ChannelLayout};
///
/// let buffer = AudioBuffer::new(48000, ChannelLayout::Stereo, 48000);
/// assert_eq!(buffer.num_channels(), 2);
/// assert_eq!(buffer.duration_secs(), 1.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    /// Sample data: outer Vec is channels, inner Vec is samples
    pub samples: Vec<Vec<f32>>,
    /// Sample rate in Hz
    pub sample_rate: u32,
}

impl AudioBuffer {
    /// Create a silent buffer
    pub fn new(num_samples: usize, layout: ChannelLayout, sample_rate: u32) -> Self {
        Self {
            samples: vec![vec![0.0_f32; num_samples]; layout.num_channels()],
            sample_rate,
        }
    }

    /// Build a buffer from interleaved data (L, R, L, R, ... for stereo)
    pub fn from_interleaved(
        interleaved: &[f32],
        layout: ChannelLayout,
        sample_rate: u32,
    ) -> Result<Self> {
        let num_channels = layout.num_channels();
        if interleaved.len() % num_channels != 0 {
            return Err(EngineAudioError::InvalidAudio {
                reason: format!(
                    "Interleaved data length {} is not divisible by channel count {}",
                    interleaved.len(),
                    num_channels
                ),
                source: None,
            });
        }

        let frames = interleaved.len() / num_channels;
        let mut samples = vec![Vec::with_capacity(frames); num_channels];
        for (i, sample) in interleaved.iter().enumerate() {
            samples[i % num_channels].push(*sample);
        }
        Ok(Self {
            samples,
            sample_rate,
        })
    }

    /// Interleave the channels into a single Vec
    pub fn to_interleaved(&self) -> Vec<f32> {
        let frames = self.num_samples();
        let mut out = Vec::with_capacity(frames * self.num_channels());
        for frame in 0..frames {
            for channel in &self.samples {
                out.push(channel[frame]);
            }
        }
        out
    }

    pub fn num_channels(&self) -> usize {
        self.samples.len()
    }

    /// Samples per channel
    pub fn num_samples(&self) -> usize {
        self.samples.first().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.num_samples() == 0
    }

    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.num_samples() as f64 / self.sample_rate as f64
    }

    pub fn channel(&self, index: usize) -> &[f32] {
        &self.samples[index]
    }

    /// Append another buffer with the same channel count
    pub fn append(&mut self, other: &AudioBuffer) -> Result<()> {
        if other.num_channels() != self.num_channels() {
            return Err(EngineAudioError::UnsupportedFormat {
                format: format!(
                    "cannot append {}-channel audio to {}-channel buffer",
                    other.num_channels(),
                    self.num_channels()
                ),
            });
        }
        for (dst, src) in self.samples.iter_mut().zip(&other.samples) {
            dst.extend_from_slice(src);
        }
        Ok(())
    }

    /// Convert to another channel layout
    ///
    /// Mono is duplicated to stereo; stereo is averaged down to mono.
    pub fn to_layout(&self, layout: ChannelLayout) -> AudioBuffer {
        let samples = match (self.num_channels(), layout) {
            (1, ChannelLayout::Stereo) => vec![self.samples[0].clone(), self.samples[0].clone()],
            (2, ChannelLayout::Mono) => vec![self.samples[0]
                .iter()
                .zip(&self.samples[1])
                .map(|(l, r)| 0.5 * (l + r))
                .collect()],
            _ => self.samples.clone(),
        };
        AudioBuffer {
            samples,
            sample_rate: self.sample_rate,
        }
    }

    /// Peak absolute sample value across all channels
    pub fn peak(&self) -> f32 {
        self.samples
            .iter()
            .flat_map(|c| c.iter())
            .map(|s| s.abs())
            .fold(0.0_f32, f32::max)
    }

    /// RMS level of one channel over a sample range, in dB
    pub fn rms_db_range(&self, channel: usize, start: usize, end: usize) -> f32 {
        let data = &self.samples[channel];
        let end = end.min(data.len());
        if start >= end {
            return f32::NEG_INFINITY;
        }
        let sum: f64 = data[start..end].iter().map(|&s| (s as f64) * (s as f64)).sum();
        linear_to_db((sum / (end - start) as f64).sqrt() as f32)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_silent() {
        let buffer = AudioBuffer::new(100, ChannelLayout::Mono, 48000);
        assert_eq!(buffer.num_samples(), 100);
        assert_eq!(buffer.peak(), 0.0);
        assert_eq!(buffer.rms_db_range(0, 0, 100), f32::NEG_INFINITY);
    }

    #[test]
    fn test_interleave_layout() {
        let buffer =
            AudioBuffer::from_interleaved(&[0.1, 0.2, 0.3, 0.4], ChannelLayout::Stereo, 48000)
                .unwrap();
        assert_eq!(buffer.channel(0), &[0.1, 0.3]);
        assert_eq!(buffer.channel(1), &[0.2, 0.4]);
        assert_eq!(buffer.to_interleaved(), vec![0.1, 0.2, 0.3, 0.4]);
    }

    #[test]
    fn test_interleaved_length_mismatch() {
        let result = AudioBuffer::from_interleaved(&[0.1, 0.2, 0.3], ChannelLayout::Stereo, 48000);
        assert!(result.is_err());
    }

    #[test]
    fn test_mono_to_stereo() {
        let mono = AudioBuffer::from_interleaved(&[0.5, -0.5], ChannelLayout::Mono, 48000).unwrap();
        let stereo = mono.to_layout(ChannelLayout::Stereo);
        assert_eq!(stereo.num_channels(), 2);
        assert_eq!(stereo.channel(1), &[0.5, -0.5]);
    }

    #[test]
    fn test_stereo_to_mono_averages() {
        let stereo =
            AudioBuffer::from_interleaved(&[1.0, 0.0, 0.5, 0.5], ChannelLayout::Stereo, 48000)
                .unwrap();
        let mono = stereo.to_layout(ChannelLayout::Mono);
        assert_eq!(mono.channel(0), &[0.5, 0.5]);
    }

    #[test]
    fn test_append_checks_channels() {
        let mut a = AudioBuffer::new(10, ChannelLayout::Stereo, 48000);
        let b = AudioBuffer::new(5, ChannelLayout::Stereo, 48000);
        a.append(&b).unwrap();
        assert_eq!(a.num_samples(), 15);

        let mono = AudioBuffer::new(5, ChannelLayout::Mono, 48000);
        assert!(a.append(&mono).is_err());
    }
}
