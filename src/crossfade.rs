//! Throttle-to-volume crossfade curve
//!
//! Pure functions mapping a throttle value onto target volumes for the three
//! RPM bands, plus the exponential smoothing and dynamics scaling applied on
//! top. Nothing here touches playback; the session feeds these numbers to the
//! backend.
//!
//! The throttle range is split into three zones, each with a local progress
//! variable `p` running from 0 to 1:
//!
//! | zone | range | idle | mid | high |
//! |------|-------|------|-----|------|
//! | A | `[0, 0.33)` | `1.0` | `0.5p` | `0` |
//! | B | `[0.33, 0.66)` | `1 - 0.5p` | `0.5 + 0.5p` | `0.3p` |
//! | C | `[0.66, 1.0]` | `0.5(1 - p)` | `1 - 0.7p` | `0.3 + 0.7p` |
//!
//! The formulas meet at the seams, so the curve is continuous in value.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{EngineAudioError, Result};

// ============================================================================
// Constants
// ============================================================================

/// Throttle at which zone B starts
pub const DEFAULT_IDLE_MID_BOUNDARY: f64 = 0.33;

/// Throttle at which zone C starts
pub const DEFAULT_MID_HIGH_BOUNDARY: f64 = 0.66;

/// Fraction of the previous volume retained per update (0 = instant)
pub const DEFAULT_SMOOTHING: f64 = 0.15;

/// Overall level at the smallest positive throttle
pub const DEFAULT_DYNAMICS_FLOOR: f64 = 0.5;

/// Exponent shaping the overall level against throttle
pub const DEFAULT_DYNAMICS_EXPONENT: f64 = 1.5;

// ============================================================================
// RPM Bands
// ============================================================================

/// One of the three engine-sound layers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    Idle,
    Mid,
    High,
}

impl Band {
    /// All bands, lowest first
    pub const ALL: [Band; 3] = [Band::Idle, Band::Mid, Band::High];

    /// The band whose sample stands in when this one is missing
    pub fn fallback(self) -> Option<Band> {
        match self {
            Band::Idle => None,
            Band::Mid => Some(Band::Idle),
            Band::High => Some(Band::Mid),
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Band::Idle => write!(f, "idle"),
            Band::Mid => write!(f, "mid"),
            Band::High => write!(f, "high"),
        }
    }
}

/// Crossfade zone a throttle value falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    /// Idle dominant, mid fading in
    A,
    /// Idle fading out, mid rising, high creeping in
    B,
    /// Mid fading out, high taking over
    C,
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Zone::A => write!(f, "A"),
            Zone::B => write!(f, "B"),
            Zone::C => write!(f, "C"),
        }
    }
}

// ============================================================================
// Band Volumes
// ============================================================================

/// A volume per RPM band
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BandVolumes {
    pub idle: f64,
    pub mid: f64,
    pub high: f64,
}

impl BandVolumes {
    /// All three bands silent
    pub const SILENT: BandVolumes = BandVolumes {
        idle: 0.0,
        mid: 0.0,
        high: 0.0,
    };

    pub fn new(idle: f64, mid: f64, high: f64) -> Self {
        Self { idle, mid, high }
    }

    /// Volume of a single band
    pub fn get(&self, band: Band) -> f64 {
        match band {
            Band::Idle => self.idle,
            Band::Mid => self.mid,
            Band::High => self.high,
        }
    }

    /// Blend `target` into these volumes in place
    ///
    /// `current = current * smoothing + target * (1 - smoothing)`
    pub fn smooth_toward(&mut self, target: &BandVolumes, smoothing: f64) {
        let keep = smoothing;
        let take = 1.0 - smoothing;
        self.idle = self.idle * keep + target.idle * take;
        self.mid = self.mid * keep + target.mid * take;
        self.high = self.high * keep + target.high * take;
    }

    /// Multiply every band by `factor`
    pub fn scaled(&self, factor: f64) -> BandVolumes {
        BandVolumes {
            idle: self.idle * factor,
            mid: self.mid * factor,
            high: self.high * factor,
        }
    }

    /// Largest absolute per-band difference to `other`
    pub fn max_abs_diff(&self, other: &BandVolumes) -> f64 {
        (self.idle - other.idle)
            .abs()
            .max((self.mid - other.mid).abs())
            .max((self.high - other.high).abs())
    }
}

// ============================================================================
// Crossfade Curve
// ============================================================================

/// Shape of the throttle-to-volume crossfade
///
/// The per-zone coefficients are fixed; the breakpoints, smoothing and
/// dynamics scaling are injectable so the curve can be tuned and tested on its
/// own.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrossfadeCurve {
    /// Start of zone B
    pub idle_mid_boundary: f64,
    /// Start of zone C
    pub mid_high_boundary: f64,
    /// Retained fraction of the previous volume per update
    pub smoothing: f64,
    /// Overall level at throttle 0
    pub dynamics_floor: f64,
    /// Exponent of the throttle term in the overall level
    pub dynamics_exponent: f64,
}

impl Default for CrossfadeCurve {
    fn default() -> Self {
        Self {
            idle_mid_boundary: DEFAULT_IDLE_MID_BOUNDARY,
            mid_high_boundary: DEFAULT_MID_HIGH_BOUNDARY,
            smoothing: DEFAULT_SMOOTHING,
            dynamics_floor: DEFAULT_DYNAMICS_FLOOR,
            dynamics_exponent: DEFAULT_DYNAMICS_EXPONENT,
        }
    }
}

impl CrossfadeCurve {
    /// Check the curve parameters
    ///
    /// # Errors
    /// `InvalidConfig` if the boundaries are not strictly increasing inside
    /// (0, 1), smoothing is outside [0, 1), or the dynamics terms are out of
    /// range.
    pub fn validate(&self) -> Result<()> {
        let b1 = self.idle_mid_boundary;
        let b2 = self.mid_high_boundary;
        if !(b1.is_finite() && b1 > 0.0 && b1 < 1.0) {
            return Err(EngineAudioError::InvalidConfig {
                field: "curve.idle_mid_boundary",
                reason: format!("{} is not inside (0, 1)", b1),
            });
        }
        if !(b2.is_finite() && b2 > b1 && b2 < 1.0) {
            return Err(EngineAudioError::InvalidConfig {
                field: "curve.mid_high_boundary",
                reason: format!("{} is not inside ({}, 1)", b2, b1),
            });
        }
        if !(self.smoothing.is_finite() && (0.0..1.0).contains(&self.smoothing)) {
            return Err(EngineAudioError::InvalidConfig {
                field: "curve.smoothing",
                reason: format!("{} is not inside [0, 1)", self.smoothing),
            });
        }
        if !(self.dynamics_floor.is_finite() && (0.0..=1.0).contains(&self.dynamics_floor)) {
            return Err(EngineAudioError::InvalidConfig {
                field: "curve.dynamics_floor",
                reason: format!("{} is not inside [0, 1]", self.dynamics_floor),
            });
        }
        if !(self.dynamics_exponent.is_finite() && self.dynamics_exponent > 0.0) {
            return Err(EngineAudioError::InvalidConfig {
                field: "curve.dynamics_exponent",
                reason: format!("{} must be positive", self.dynamics_exponent),
            });
        }
        Ok(())
    }

    /// Zone for a throttle value; a value on a boundary belongs to the upper zone
    pub fn zone(&self, throttle: f64) -> Zone {
        if throttle < self.idle_mid_boundary {
            Zone::A
        } else if throttle < self.mid_high_boundary {
            Zone::B
        } else {
            Zone::C
        }
    }

    /// Zone and local progress `p` for a throttle value
    pub fn zone_progress(&self, throttle: f64) -> (Zone, f64) {
        let b1 = self.idle_mid_boundary;
        let b2 = self.mid_high_boundary;
        match self.zone(throttle) {
            Zone::A => (Zone::A, throttle / b1),
            Zone::B => (Zone::B, (throttle - b1) / (b2 - b1)),
            Zone::C => (Zone::C, (throttle - b2) / (1.0 - b2)),
        }
    }

    /// Target volumes for a throttle value, before smoothing and dynamics
    pub fn target_volumes(&self, throttle: f64) -> BandVolumes {
        let (zone, p) = self.zone_progress(throttle);
        match zone {
            Zone::A => BandVolumes::new(1.0, 0.5 * p, 0.0),
            Zone::B => BandVolumes::new(1.0 - 0.5 * p, 0.5 + 0.5 * p, 0.3 * p),
            Zone::C => BandVolumes::new(0.5 * (1.0 - p), 1.0 - 0.7 * p, 0.3 + 0.7 * p),
        }
    }

    /// Overall level multiplied into every band, recomputed each frame
    ///
    /// `floor + throttle^exponent * (1 - floor)`; 0.5 + t^1.5 * 0.5 by default.
    pub fn overall_volume(&self, throttle: f64) -> f64 {
        let floor = self.dynamics_floor;
        floor + throttle.powf(self.dynamics_exponent) * (1.0 - floor)
    }
}

/// Clamp a raw throttle reading into [0, 1]; non-finite readings count as released
pub fn sanitize_throttle(throttle: f64) -> f64 {
    if throttle.is_finite() {
        throttle.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_zone_a_targets() {
        let curve = CrossfadeCurve::default();
        for i in 0..33 {
            let t = i as f64 / 100.0;
            let v = curve.target_volumes(t);
            assert_relative_eq!(v.idle, 1.0, epsilon = EPS);
            assert_relative_eq!(v.mid, 0.5 * t / 0.33, epsilon = EPS);
            assert_relative_eq!(v.high, 0.0, epsilon = EPS);
        }
    }

    #[test]
    fn test_boundaries_belong_to_upper_zone() {
        let curve = CrossfadeCurve::default();
        assert_eq!(curve.zone(0.0), Zone::A);
        assert_eq!(curve.zone(0.3299), Zone::A);
        assert_eq!(curve.zone(0.33), Zone::B);
        assert_eq!(curve.zone(0.6599), Zone::B);
        assert_eq!(curve.zone(0.66), Zone::C);
        assert_eq!(curve.zone(1.0), Zone::C);
    }

    #[test]
    fn test_seams_are_continuous() {
        let curve = CrossfadeCurve::default();

        // Zone A formula evaluated at p = 1 against zone B at its start
        let a_end = BandVolumes::new(1.0, 0.5, 0.0);
        let b_start = curve.target_volumes(0.33);
        assert!(a_end.max_abs_diff(&b_start) < EPS);

        // Just below the seam approaches the same point
        let below = curve.target_volumes(0.33 - 1e-12);
        assert!(below.max_abs_diff(&b_start) < 1e-9);

        let b_end = BandVolumes::new(0.5, 1.0, 0.3);
        let c_start = curve.target_volumes(0.66);
        assert!(b_end.max_abs_diff(&c_start) < EPS);
        let below = curve.target_volumes(0.66 - 1e-12);
        assert!(below.max_abs_diff(&c_start) < 1e-9);
    }

    #[test]
    fn test_full_throttle_targets() {
        let v = CrossfadeCurve::default().target_volumes(1.0);
        assert_relative_eq!(v.idle, 0.0, epsilon = EPS);
        assert_relative_eq!(v.mid, 0.3, epsilon = EPS);
        assert_relative_eq!(v.high, 1.0, epsilon = EPS);
    }

    #[test]
    fn test_mid_zone_midpoint() {
        let curve = CrossfadeCurve::default();
        let v = curve.target_volumes(0.495);
        assert_relative_eq!(v.idle, 0.75, epsilon = EPS);
        assert_relative_eq!(v.mid, 0.75, epsilon = EPS);
        assert_relative_eq!(v.high, 0.15, epsilon = EPS);
    }

    #[test]
    fn test_smoothing_converges_geometrically() {
        let curve = CrossfadeCurve::default();
        let target = BandVolumes::new(1.0, 0.6, 0.2);
        let mut current = BandVolumes::SILENT;
        let initial_error = current.max_abs_diff(&target);

        let mut previous_error = initial_error;
        for n in 1..=12 {
            current.smooth_toward(&target, curve.smoothing);
            let error = current.max_abs_diff(&target);
            assert!(error < previous_error, "error must shrink every step");
            assert_relative_eq!(
                error,
                initial_error * curve.smoothing.powi(n),
                max_relative = 1e-6
            );
            previous_error = error;
        }
    }

    #[test]
    fn test_zero_smoothing_is_instant() {
        let target = BandVolumes::new(0.4, 0.3, 0.2);
        let mut current = BandVolumes::new(1.0, 1.0, 1.0);
        current.smooth_toward(&target, 0.0);
        assert_eq!(current, target);
    }

    #[test]
    fn test_overall_volume() {
        let curve = CrossfadeCurve::default();
        assert_relative_eq!(curve.overall_volume(0.0), 0.5, epsilon = EPS);
        assert_relative_eq!(curve.overall_volume(1.0), 1.0, epsilon = EPS);
        assert_relative_eq!(
            curve.overall_volume(0.25),
            0.5 + 0.125 * 0.5,
            epsilon = EPS
        );
    }

    #[test]
    fn test_validate_rejects_bad_boundaries() {
        let mut curve = CrossfadeCurve::default();
        assert!(curve.validate().is_ok());

        curve.mid_high_boundary = 0.2;
        assert!(curve.validate().is_err());

        let curve = CrossfadeCurve {
            smoothing: 1.0,
            ..Default::default()
        };
        assert!(curve.validate().is_err());
    }

    #[test]
    fn test_custom_boundaries() {
        let curve = CrossfadeCurve {
            idle_mid_boundary: 0.25,
            mid_high_boundary: 0.75,
            ..Default::default()
        };
        assert_eq!(curve.zone(0.5), Zone::B);
        let v = curve.target_volumes(0.5);
        assert_relative_eq!(v.mid, 0.75, epsilon = EPS);
    }

    #[test]
    fn test_sanitize_throttle() {
        assert_eq!(sanitize_throttle(-0.2), 0.0);
        assert_eq!(sanitize_throttle(1.7), 1.0);
        assert_eq!(sanitize_throttle(f64::NAN), 0.0);
        assert_eq!(sanitize_throttle(0.4), 0.4);
    }

    #[test]
    fn test_band_fallback_chain() {
        assert_eq!(Band::High.fallback(), Some(Band::Mid));
        assert_eq!(Band::Mid.fallback(), Some(Band::Idle));
        assert_eq!(Band::Idle.fallback(), None);
    }
}
