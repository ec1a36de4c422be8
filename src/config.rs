//! Engine audio configuration
//!
//! Constructor-time settings for an [`EngineSession`](crate::session::EngineSession):
//! sample paths per band, fade timing and the crossfade curve. Stored as JSON.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::debug;
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::crossfade::{Band, CrossfadeCurve};
use crate::error::{EngineAudioError, Result};

// ============================================================================
// Defaults
// ============================================================================

/// Default master level (only applied when `apply_base_volume` is set)
pub const DEFAULT_BASE_VOLUME: f32 = 0.75;

/// Default fade-out duration in milliseconds
pub const DEFAULT_FADEOUT_MS: u64 = 1500;

/// Default zero-throttle delay before fading out, in seconds
pub const DEFAULT_STOP_DELAY_SECS: f64 = 5.0;

fn default_base_volume() -> f32 {
    DEFAULT_BASE_VOLUME
}

fn default_fadeout_ms() -> u64 {
    DEFAULT_FADEOUT_MS
}

fn default_stop_delay_secs() -> f64 {
    DEFAULT_STOP_DELAY_SECS
}

// ============================================================================
// Config
// ============================================================================

/// Settings for one engine sound source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineAudioConfig {
    /// Idle loop; mandatory
    pub idle_sample: PathBuf,

    /// Mid RPM loop; falls back to the idle sample
    #[serde(default)]
    pub mid_sample: Option<PathBuf>,

    /// High RPM loop; falls back to the mid sample
    #[serde(default)]
    pub high_sample: Option<PathBuf>,

    /// Master level in [0, 1]
    #[serde(default = "default_base_volume")]
    pub base_volume: f32,

    /// Multiply `base_volume` into every applied channel volume
    ///
    /// Off by default, in which case `base_volume` is carried but inert.
    #[serde(default)]
    pub apply_base_volume: bool,

    /// Fade-out duration in milliseconds
    #[serde(default = "default_fadeout_ms")]
    pub fadeout_ms: u64,

    /// Seconds of zero throttle before the engine fades out
    #[serde(default = "default_stop_delay_secs")]
    pub stop_delay_secs: f64,

    #[serde(default)]
    pub curve: CrossfadeCurve,
}

impl EngineAudioConfig {
    /// Create a config with only the idle sample set and defaults elsewhere
    pub fn new(idle_sample: impl Into<PathBuf>) -> Self {
        Self {
            idle_sample: idle_sample.into(),
            mid_sample: None,
            high_sample: None,
            base_volume: DEFAULT_BASE_VOLUME,
            apply_base_volume: false,
            fadeout_ms: DEFAULT_FADEOUT_MS,
            stop_delay_secs: DEFAULT_STOP_DELAY_SECS,
            curve: CrossfadeCurve::default(),
        }
    }

    pub fn with_mid_sample(mut self, path: impl Into<PathBuf>) -> Self {
        self.mid_sample = Some(path.into());
        self
    }

    pub fn with_high_sample(mut self, path: impl Into<PathBuf>) -> Self {
        self.high_sample = Some(path.into());
        self
    }

    pub fn with_fadeout_ms(mut self, fadeout_ms: u64) -> Self {
        self.fadeout_ms = fadeout_ms;
        self
    }

    pub fn with_stop_delay_secs(mut self, secs: f64) -> Self {
        self.stop_delay_secs = secs;
        self
    }

    pub fn with_curve(mut self, curve: CrossfadeCurve) -> Self {
        self.curve = curve;
        self
    }

    /// Enable `base_volume` as a master multiplier
    pub fn with_base_volume(mut self, base_volume: f32) -> Self {
        self.base_volume = base_volume;
        self.apply_base_volume = true;
        self
    }

    /// Requested sample path for a band, before fallback
    pub fn sample_path(&self, band: Band) -> Option<&Path> {
        match band {
            Band::Idle => Some(self.idle_sample.as_path()),
            Band::Mid => self.mid_sample.as_deref(),
            Band::High => self.high_sample.as_deref(),
        }
    }

    /// Fade-out duration
    pub fn fadeout(&self) -> Duration {
        Duration::from_millis(self.fadeout_ms)
    }

    /// Level multiplied into every channel volume on top of the curve
    pub fn master_gain(&self) -> f64 {
        if self.apply_base_volume {
            self.base_volume as f64
        } else {
            1.0
        }
    }

    /// Validate all fields
    pub fn validate(&self) -> Result<()> {
        if self.idle_sample.as_os_str().is_empty() {
            return Err(EngineAudioError::InvalidConfig {
                field: "idle_sample",
                reason: "path is empty".to_string(),
            });
        }
        if !(self.base_volume.is_finite() && (0.0..=1.0).contains(&self.base_volume)) {
            return Err(EngineAudioError::InvalidConfig {
                field: "base_volume",
                reason: format!("{} is not inside [0, 1]", self.base_volume),
            });
        }
        if !(self.stop_delay_secs.is_finite() && self.stop_delay_secs >= 0.0) {
            return Err(EngineAudioError::InvalidConfig {
                field: "stop_delay_secs",
                reason: format!("{} must be a non-negative number", self.stop_delay_secs),
            });
        }
        self.curve.validate()
    }

    /// Load and validate a JSON config file
    ///
    /// Relative sample paths are resolved against the config file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let mut config: EngineAudioConfig = serde_json::from_str(&text)?;

        if let Some(base) = path.parent() {
            config.resolve_relative_to(base);
        }
        config.validate()?;
        debug!("Loaded engine audio config from {}", path.display());
        Ok(config)
    }

    /// Write this config as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text)?;
        Ok(())
    }

    /// Build a config from `idle*`, `mid*` and `high*` WAV files in `dir`
    ///
    /// Only the top level of `dir` is searched. When several files match a
    /// band, the alphabetically first wins.
    pub fn from_asset_dir(dir: &Path) -> Result<Self> {
        let mut found: [Option<PathBuf>; 3] = [None, None, None];

        let mut entries: Vec<PathBuf> = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| {
                p.extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| ext.eq_ignore_ascii_case("wav"))
                    .unwrap_or(false)
            })
            .collect();
        entries.sort();

        for path in entries {
            let stem = match path.file_stem().and_then(|s| s.to_str()) {
                Some(s) => s.to_ascii_lowercase(),
                None => continue,
            };
            for (slot, band) in Band::ALL.iter().enumerate() {
                if found[slot].is_none() && stem.starts_with(&band.to_string()) {
                    found[slot] = Some(path.clone());
                }
            }
        }

        let [idle, mid, high] = found;
        let idle = idle.ok_or_else(|| EngineAudioError::SampleNotFound {
            path: dir.join("idle*.wav").display().to_string(),
            source: None,
        })?;

        let mut config = EngineAudioConfig::new(idle);
        config.mid_sample = mid;
        config.high_sample = high;
        Ok(config)
    }

    fn resolve_relative_to(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        resolve(&mut self.idle_sample);
        if let Some(p) = self.mid_sample.as_mut() {
            resolve(p);
        }
        if let Some(p) = self.high_sample.as_mut() {
            resolve(p);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
