//! Throttle scripts
//!
//! A script is a list of `(time, throttle)` keyframes, linearly interpolated
//! and held after the last one. The simulator samples it at a fixed frame
//! rate to drive a session without a live input device.
//!
//! ```json
//! { "keyframes": [
//!     { "time_secs": 0.0, "throttle": 0.0 },
//!     { "time_secs": 1.0, "throttle": 0.8 },
//!     { "time_secs": 3.0, "throttle": 0.0 }
//! ] }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EngineAudioError, Result};

/// One point on the throttle timeline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub time_secs: f64,
    pub throttle: f64,
}

/// Piecewise-linear throttle timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThrottleScript {
    keyframes: Vec<Keyframe>,
}

impl ThrottleScript {
    /// Build a script from keyframes
    ///
    /// # Errors
    /// `InvalidScript` if there are no keyframes, a time is negative or not
    /// finite, times decrease, or a throttle is outside [0, 1].
    pub fn new(keyframes: Vec<Keyframe>) -> Result<Self> {
        let script = Self { keyframes };
        script.validate()?;
        Ok(script)
    }

    /// Parse and validate a JSON script file
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let script: ThrottleScript = serde_json::from_str(&text)?;
        script.validate()?;
        Ok(script)
    }

    fn validate(&self) -> Result<()> {
        if self.keyframes.is_empty() {
            return Err(EngineAudioError::InvalidScript {
                reason: "script has no keyframes".to_string(),
            });
        }
        let mut previous = 0.0;
        for (i, k) in self.keyframes.iter().enumerate() {
            if !k.time_secs.is_finite() || k.time_secs < previous {
                return Err(EngineAudioError::InvalidScript {
                    reason: format!(
                        "keyframe {} time {} is not a finite, non-decreasing time",
                        i, k.time_secs
                    ),
                });
            }
            if !(0.0..=1.0).contains(&k.throttle) {
                return Err(EngineAudioError::InvalidScript {
                    reason: format!("keyframe {} throttle {} is outside [0, 1]", i, k.throttle),
                });
            }
            previous = k.time_secs;
        }
        Ok(())
    }

    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    /// Time of the last keyframe
    pub fn duration_secs(&self) -> f64 {
        self.keyframes.last().map(|k| k.time_secs).unwrap_or(0.0)
    }

    /// Throttle at time `t`
    pub fn throttle_at(&self, t: f64) -> f64 {
        let first = self.keyframes[0];
        if t <= first.time_secs {
            return first.throttle;
        }
        for pair in self.keyframes.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if t < b.time_secs {
                let span = b.time_secs - a.time_secs;
                if span <= 0.0 {
                    return b.throttle;
                }
                let frac = (t - a.time_secs) / span;
                return a.throttle + (b.throttle - a.throttle) * frac;
            }
        }
        self.keyframes[self.keyframes.len() - 1].throttle
    }

    /// `(time, throttle)` for every frame at `fps` up to the end plus `tail_secs`
    pub fn frames(&self, fps: f64, tail_secs: f64) -> impl Iterator<Item = (f64, f64)> + '_ {
        let end = self.duration_secs() + tail_secs.max(0.0);
        let count = (end * fps).floor() as usize + 1;
        (0..count).map(move |i| {
            let t = i as f64 / fps;
            (t, self.throttle_at(t))
        })
    }
}
