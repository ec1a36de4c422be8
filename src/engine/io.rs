//! WAV I/O for engine samples and rendered output
//!
//! Samples are converted to 32-bit float and resampled to the mixer rate on
//! import. Resampling is linear interpolation, which is fine for looping
//! engine drones.

use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::engine::buffer::{AudioBuffer, ChannelLayout};
use crate::error::{EngineAudioError, Result};

/// Import a WAV file as float audio at `target_rate`
///
/// # Errors
/// * `SampleNotFound` - the file does not exist
/// * `InvalidAudio` - the file is not a readable WAV, or holds no samples
/// * `UnsupportedFormat` - more than two channels, or an odd bit depth
pub fn import_audio(path: &Path, target_rate: u32) -> Result<AudioBuffer> {
    if !path.exists() {
        return Err(EngineAudioError::SampleNotFound {
            path: path.display().to_string(),
            source: None,
        });
    }

    let reader = WavReader::open(path).map_err(|e| EngineAudioError::InvalidAudio {
        reason: format!("Failed to open WAV file {}: {}", path.display(), e),
        source: Some(Box::new(e)),
    })?;

    let spec = reader.spec();
    let layout = ChannelLayout::from_count(spec.channels as usize).ok_or_else(|| {
        EngineAudioError::UnsupportedFormat {
            format: format!("{}-channel audio (only mono/stereo supported)", spec.channels),
        }
    })?;

    let interleaved = read_samples_as_f32(reader, spec.bits_per_sample, spec.sample_format)?;
    let buffer = AudioBuffer::from_interleaved(&interleaved, layout, spec.sample_rate)?;
    if buffer.is_empty() {
        return Err(EngineAudioError::InvalidAudio {
            reason: format!("{} contains no samples", path.display()),
            source: None,
        });
    }

    if spec.sample_rate == target_rate {
        return Ok(buffer);
    }
    Ok(resample(&buffer, target_rate))
}

/// Write a buffer as WAV with the given bit depth (16, 24 or 32-bit float)
pub fn export_audio(buffer: &AudioBuffer, path: &Path, bit_depth: u16) -> Result<()> {
    let sample_format = match bit_depth {
        16 | 24 => SampleFormat::Int,
        32 => SampleFormat::Float,
        _ => {
            return Err(EngineAudioError::UnsupportedFormat {
                format: format!("{}-bit audio (only 16, 24, 32 supported)", bit_depth),
            })
        }
    };
    let spec = WavSpec {
        channels: buffer.num_channels() as u16,
        sample_rate: buffer.sample_rate,
        bits_per_sample: bit_depth,
        sample_format,
    };

    let mut writer = WavWriter::create(path, spec).map_err(hound_to_io)?;
    for sample in buffer.to_interleaved() {
        match bit_depth {
            16 => writer
                .write_sample((sample * 32767.0).clamp(-32768.0, 32767.0) as i16)
                .map_err(hound_to_io)?,
            // 24-bit is stored as i32 in hound
            24 => writer
                .write_sample((sample * 8388607.0).clamp(-8388608.0, 8388607.0) as i32)
                .map_err(hound_to_io)?,
            _ => writer.write_sample(sample).map_err(hound_to_io)?,
        }
    }
    writer.finalize().map_err(hound_to_io)?;
    Ok(())
}

/// Synthesize a loopable engine drone
///
/// A sum of the first six harmonics of `fundamental` with a slow firing-pulse
/// amplitude modulation. The duration is rounded to a whole number of
/// fundamental periods so the loop point is click-free.
pub fn generate_engine_loop(fundamental: f32, duration_secs: f32, sample_rate: u32) -> AudioBuffer {
    let periods = (duration_secs * fundamental).round().max(1.0);
    let num_samples = (periods / fundamental * sample_rate as f32).round() as usize;
    let mut buffer = AudioBuffer::new(num_samples, ChannelLayout::Mono, sample_rate);

    let two_pi = 2.0 * std::f32::consts::PI;
    let step = two_pi * fundamental / sample_rate as f32;
    for (i, sample) in buffer.samples[0].iter_mut().enumerate() {
        let phase = step * i as f32;
        let mut value = 0.0;
        for harmonic in 1..=6 {
            value += (phase * harmonic as f32).sin() / harmonic as f32;
        }
        let pulse = 0.75 + 0.25 * (phase * 0.5).sin().abs();
        *sample = 0.35 * value * pulse;
    }

    buffer
}

// ============================================================================
// Internal helper functions
// ============================================================================

fn hound_to_io(e: hound::Error) -> EngineAudioError {
    match e {
        hound::Error::IoError(io) => EngineAudioError::Io(io),
        other => EngineAudioError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            other.to_string(),
        )),
    }
}

/// Read samples from WAV reader and convert to f32
fn read_samples_as_f32<R: std::io::Read>(
    mut reader: WavReader<R>,
    bits_per_sample: u16,
    sample_format: SampleFormat,
) -> Result<Vec<f32>> {
    let scale = match (sample_format, bits_per_sample) {
        (SampleFormat::Float, _) => {
            return reader
                .samples::<f32>()
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map_err(|e| EngineAudioError::InvalidAudio {
                    reason: format!("Failed to read float samples: {}", e),
                    source: Some(Box::new(e)),
                })
        }
        (SampleFormat::Int, 8) => 128.0,
        (SampleFormat::Int, 16) => 32768.0,
        (SampleFormat::Int, 24) => 8388608.0,
        (SampleFormat::Int, 32) => 2147483648.0,
        (SampleFormat::Int, bits) => {
            return Err(EngineAudioError::UnsupportedFormat {
                format: format!("{}-bit integer audio", bits),
            })
        }
    };

    reader
        .samples::<i32>()
        .map(|s| s.map(|v| (v as f64 / scale) as f32))
        .collect::<std::result::Result<Vec<f32>, _>>()
        .map_err(|e| EngineAudioError::InvalidAudio {
            reason: format!("Failed to read {}-bit samples: {}", bits_per_sample, e),
            source: Some(Box::new(e)),
        })
}

/// Linear interpolation resampling
fn resample(buffer: &AudioBuffer, target_rate: u32) -> AudioBuffer {
    let ratio = target_rate as f64 / buffer.sample_rate as f64;
    let samples = buffer
        .samples
        .iter()
        .map(|channel| {
            let source_len = channel.len();
            let target_len = ((source_len as f64) * ratio).ceil() as usize;
            (0..target_len)
                .map(|i| {
                    let src_pos = i as f64 / ratio;
                    let idx = src_pos.floor() as usize;
                    let frac = (src_pos - idx as f64) as f32;
                    match (channel.get(idx), channel.get(idx + 1)) {
                        (Some(a), Some(b)) => a * (1.0 - frac) + b * frac,
                        (Some(a), None) => *a,
                        _ => 0.0,
                    }
                })
                .collect()
        })
        .collect();

    AudioBuffer {
        samples,
        sample_rate: target_rate,
    }
}
