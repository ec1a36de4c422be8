//! Engine sound session
//!
//! One [`EngineSession`] per vehicle. Call [`EngineSession::update`] once per
//! frame with the current throttle; the session crossfades three looping
//! layers (idle, mid, high) and handles engagement and the delayed fade-out
//! after the throttle is released.
//!
//! # Lifecycle
//!
//! ```text
//! Uninitialized --(backend ready, idle sample loads)--> Ready
//!       |
//!       +--(backend ready, idle sample missing)--> Disabled (permanent)
//! ```
//!
//! Every update first checks that the backend is up; while it is not, the
//! frame does nothing, before or after initialization.

use std::fmt;

use log::{debug, info, warn};
use uuid::Uuid;

use crate::clock::Clock;
use crate::config::EngineAudioConfig;
use crate::crossfade::{sanitize_throttle, Band, BandVolumes};
use crate::playback::{ChannelId, PlaybackBackend, SampleId};

// ============================================================================
// Frame Outcome
// ============================================================================

/// What a single `update` call did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// The session is permanently inert
    Disabled,
    /// The backend is not up; nothing happened
    NotReady,
    /// Positive throttle started the loops this frame
    Engaged,
    /// Positive throttle while already playing; volumes updated
    Driving,
    /// Zero throttle inside the stop delay; channels keep their last volume
    Holding,
    /// Zero throttle and nothing playing
    Idle,
    /// The stop delay elapsed and the channels were faded out this frame
    FadedOut,
    /// Positive throttle, but no loop could be started
    StartFailed,
}

impl fmt::Display for FrameOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FrameOutcome::Disabled => "disabled",
            FrameOutcome::NotReady => "not-ready",
            FrameOutcome::Engaged => "engaged",
            FrameOutcome::Driving => "driving",
            FrameOutcome::Holding => "holding",
            FrameOutcome::Idle => "idle",
            FrameOutcome::FadedOut => "faded-out",
            FrameOutcome::StartFailed => "start-failed",
        };
        write!(f, "{}", name)
    }
}

// ============================================================================
// Initialization State
// ============================================================================

/// Sample and channel handles for one band
#[derive(Debug, Clone, Copy)]
struct BandVoice {
    sample: SampleId,
    channel: ChannelId,
}

/// Initialization lifecycle of a session
#[derive(Debug, Clone)]
enum InitState {
    Uninitialized,
    Ready([BandVoice; 3]),
    Disabled,
}

/// Public view of [`InitState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Ready,
    Disabled,
}

// ============================================================================
// Engine Session
// ============================================================================

/// Throttle-driven engine sound for one vehicle
pub struct EngineSession<B: PlaybackBackend, C: Clock> {
    id: Uuid,
    config: EngineAudioConfig,
    backend: B,
    clock: C,
    init: InitState,
    /// Smoothed per-band volumes, before dynamics scaling
    volumes: BandVolumes,
    /// Volumes last sent to the backend
    applied: BandVolumes,
    playing: bool,
    last_throttle_time: f64,
}

impl<B: PlaybackBackend, C: Clock> EngineSession<B, C> {
    /// Create a session; no backend calls are made until the first update
    pub fn new(config: EngineAudioConfig, backend: B, clock: C) -> Self {
        let id = Uuid::new_v4();
        debug!(
            "[engine {}] created (idle={}, stop_delay={}s, fadeout={}ms)",
            id,
            config.idle_sample.display(),
            config.stop_delay_secs,
            config.fadeout_ms
        );
        Self {
            id,
            config,
            backend,
            clock,
            init: InitState::Uninitialized,
            volumes: BandVolumes::SILENT,
            applied: BandVolumes::SILENT,
            playing: false,
            last_throttle_time: 0.0,
        }
    }

    // ========================================================================
    // Per-frame Update
    // ========================================================================

    /// Advance one frame with the current throttle in [0, 1]
    ///
    /// Out-of-range throttle is clamped; NaN counts as released.
    pub fn update(&mut self, throttle: f64) -> FrameOutcome {
        let voices = match self.ensure_ready() {
            Ok(voices) => voices,
            Err(outcome) => return outcome,
        };

        let throttle = sanitize_throttle(throttle);
        let now = self.clock.now_secs();

        if throttle > 0.0 {
            self.last_throttle_time = now;

            let outcome = if self.playing {
                FrameOutcome::Driving
            } else if self.start_loops(&voices) > 0 {
                self.playing = true;
                info!("[engine {}] engaged at throttle {:.2}", self.id, throttle);
                FrameOutcome::Engaged
            } else {
                // Nothing is running; retry on the next positive frame
                return FrameOutcome::StartFailed;
            };

            let curve = self.config.curve;
            let target = curve.target_volumes(throttle);
            self.volumes.smooth_toward(&target, curve.smoothing);

            let overall = curve.overall_volume(throttle) * self.config.master_gain();
            self.applied = self.volumes.scaled(overall);
            self.apply_volumes(&voices);

            outcome
        } else if !self.playing {
            FrameOutcome::Idle
        } else if now - self.last_throttle_time >= self.config.stop_delay_secs {
            self.fade_out_all(&voices);
            FrameOutcome::FadedOut
        } else {
            FrameOutcome::Holding
        }
    }

    /// Fade out anything still playing; the session can be dropped afterwards
    pub fn shutdown(&mut self) {
        if let InitState::Ready(voices) = self.init {
            if self.playing {
                self.fade_out_all(&voices);
            }
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Session id used in log lines
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &EngineAudioConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        match self.init {
            InitState::Uninitialized => SessionState::Uninitialized,
            InitState::Ready(_) => SessionState::Ready,
            InitState::Disabled => SessionState::Disabled,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Smoothed band volumes before dynamics scaling
    pub fn volumes(&self) -> BandVolumes {
        self.volumes
    }

    /// Band volumes last applied to the channels
    pub fn applied_volumes(&self) -> BandVolumes {
        self.applied
    }

    /// Clock reading of the last positive-throttle frame
    pub fn last_throttle_time(&self) -> f64 {
        self.last_throttle_time
    }

    /// Channel handle for a band, once the session is ready
    pub fn channel(&self, band: Band) -> Option<ChannelId> {
        match &self.init {
            InitState::Ready(voices) => Some(voices[band_index(band)].channel),
            _ => None,
        }
    }

    /// Sample handle for a band, after fallback substitution
    pub fn sample(&self, band: Band) -> Option<SampleId> {
        match &self.init {
            InitState::Ready(voices) => Some(voices[band_index(band)].sample),
            _ => None,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Voices if ready, otherwise the outcome to report for this frame
    fn ensure_ready(&mut self) -> std::result::Result<[BandVoice; 3], FrameOutcome> {
        if let InitState::Disabled = self.init {
            return Err(FrameOutcome::Disabled);
        }

        if !self.backend.is_ready() {
            debug!("[engine {}] playback backend not ready", self.id);
            return Err(FrameOutcome::NotReady);
        }

        if let InitState::Ready(voices) = self.init {
            return Ok(voices);
        }

        match self.acquire_voices() {
            Some(voices) => {
                self.init = InitState::Ready(voices);
                Ok(voices)
            }
            None => {
                self.init = InitState::Disabled;
                Err(FrameOutcome::Disabled)
            }
        }
    }

    /// Load the three band samples and reserve three channels
    ///
    /// Returns `None` when the idle sample or a channel is unavailable, in
    /// which case the session is disabled and any channels it did get are
    /// handed back.
    fn acquire_voices(&mut self) -> Option<[BandVoice; 3]> {
        let idle = match self.backend.load_sample(&self.config.idle_sample) {
            Ok(id) => {
                info!(
                    "[engine {}] idle sample loaded: {}",
                    self.id,
                    self.config.idle_sample.display()
                );
                id
            }
            Err(e) => {
                warn!(
                    "[engine {}] idle sample unavailable, engine audio disabled: {}",
                    self.id, e
                );
                return None;
            }
        };

        let mid = self.load_optional(Band::Mid, idle);
        let high = self.load_optional(Band::High, mid);
        let samples = [idle, mid, high];

        let mut voices = Vec::with_capacity(3);
        for (band, sample) in Band::ALL.iter().zip(samples) {
            match self.backend.acquire_channel() {
                Ok(channel) => voices.push(BandVoice { sample, channel }),
                Err(e) => {
                    warn!(
                        "[engine {}] no playback channel for {} band, engine audio disabled: {}",
                        self.id, band, e
                    );
                    for voice in voices {
                        self.backend.release_channel(voice.channel);
                    }
                    return None;
                }
            }
        }

        info!("[engine {}] engine sounds ready", self.id);
        Some([voices[0], voices[1], voices[2]])
    }

    /// Load an optional band sample, substituting `fallback` when absent
    fn load_optional(&mut self, band: Band, fallback: SampleId) -> SampleId {
        let lower = band.fallback().unwrap_or(Band::Idle);
        let path = match self.config.sample_path(band) {
            Some(path) => path.to_path_buf(),
            None => {
                debug!("[engine {}] no {} sample configured, using {}", self.id, band, lower);
                return fallback;
            }
        };

        match self.backend.load_sample(&path) {
            Ok(id) => {
                info!("[engine {}] {} sample loaded: {}", self.id, band, path.display());
                id
            }
            Err(e) => {
                info!(
                    "[engine {}] {} sample unavailable ({}), using {}",
                    self.id, band, e, lower
                );
                fallback
            }
        }
    }

    /// Start every loop that is not already running
    ///
    /// Returns the number of channels busy afterwards.
    fn start_loops(&mut self, voices: &[BandVoice; 3]) -> usize {
        let mut busy = 0;
        for (band, voice) in Band::ALL.iter().zip(voices) {
            if !self.backend.is_busy(voice.channel) {
                if let Err(e) = self.backend.play_looped(voice.channel, voice.sample) {
                    warn!("[engine {}] failed to start {} loop: {}", self.id, band, e);
                }
            }
            if self.backend.is_busy(voice.channel) {
                busy += 1;
            }
        }
        busy
    }

    fn apply_volumes(&mut self, voices: &[BandVoice; 3]) {
        for (band, voice) in Band::ALL.iter().zip(voices) {
            let volume = self.applied.get(*band) as f32;
            if let Err(e) = self.backend.set_volume(voice.channel, volume) {
                warn!("[engine {}] failed to set {} volume: {}", self.id, band, e);
            }
        }
    }

    fn fade_out_all(&mut self, voices: &[BandVoice; 3]) {
        let fadeout = self.config.fadeout();
        for (band, voice) in Band::ALL.iter().zip(voices) {
            if let Err(e) = self.backend.fade_out(voice.channel, fadeout) {
                warn!("[engine {}] failed to fade out {} loop: {}", self.id, band, e);
            }
        }
        self.playing = false;
        self.volumes = BandVolumes::SILENT;
        self.applied = BandVolumes::SILENT;
        info!(
            "[engine {}] throttle released, fading out over {}ms",
            self.id, self.config.fadeout_ms
        );
    }
}

impl<B: PlaybackBackend, C: Clock> fmt::Debug for EngineSession<B, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineSession")
            .field("id", &self.id)
            .field("state", &self.state())
            .field("playing", &self.playing)
            .field("volumes", &self.volumes)
            .field("last_throttle_time", &self.last_throttle_time)
            .finish()
    }
}

fn band_index(band: Band) -> usize {
    match band {
        Band::Idle => 0,
        Band::Mid => 1,
        Band::High => 2,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::playback::{PlaybackCommand, RecordingBackend};
    use approx::assert_relative_eq;
    use std::path::Path;

    const FRAME: f64 = 1.0 / 60.0;

    fn full_backend() -> RecordingBackend {
        RecordingBackend::ready()
            .with_sample("idle.wav")
            .with_sample("mid.wav")
            .with_sample("high.wav")
    }

    fn full_config() -> EngineAudioConfig {
        EngineAudioConfig::new("idle.wav")
            .with_mid_sample("mid.wav")
            .with_high_sample("high.wav")
    }

    fn session(
        config: EngineAudioConfig,
        backend: RecordingBackend,
    ) -> (EngineSession<RecordingBackend, ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        (EngineSession::new(config, backend, clock.clone()), clock)
    }

    #[test]
    fn test_no_backend_calls_before_update() {
        let (session, _) = session(full_config(), full_backend());
        assert_eq!(session.state(), SessionState::Uninitialized);
        assert!(session.backend().loaded_paths().is_empty());
        assert_eq!(session.backend().channel_count(), 0);
    }

    #[test]
    fn test_zero_throttle_never_starts() {
        let (mut session, clock) = session(full_config(), full_backend());
        for _ in 0..600 {
            assert_eq!(session.update(0.0), FrameOutcome::Idle);
            clock.advance(FRAME);
        }
        assert!(!session.is_playing());
        assert_eq!(session.backend().play_count(), 0);
        assert!(session.backend().commands().is_empty());
    }

    #[test]
    fn test_engagement_starts_each_channel_once() {
        let (mut session, clock) = session(full_config(), full_backend());

        assert_eq!(session.update(0.4), FrameOutcome::Engaged);
        for _ in 0..10 {
            clock.advance(FRAME);
            assert_eq!(session.update(0.4), FrameOutcome::Driving);
        }

        assert!(session.is_playing());
        assert_eq!(session.backend().play_count(), 3);
    }

    #[test]
    fn test_first_frame_volumes() {
        let (mut session, _) = session(full_config(), full_backend());
        session.update(0.5);

        let target = session.config().curve.target_volumes(0.5);
        let v = session.volumes();
        assert_relative_eq!(v.idle, target.idle * 0.85, epsilon = 1e-12);
        assert_relative_eq!(v.mid, target.mid * 0.85, epsilon = 1e-12);
        assert_relative_eq!(v.high, target.high * 0.85, epsilon = 1e-12);

        let overall = 0.5 + 0.5_f64.powf(1.5) * 0.5;
        let applied = session.applied_volumes();
        assert_relative_eq!(applied.mid, v.mid * overall, epsilon = 1e-12);

        let channel = session.channel(Band::Mid).unwrap();
        assert_relative_eq!(
            session.backend().volume(channel).unwrap(),
            (v.mid * overall) as f32,
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_smoothing_carries_across_zones() {
        let (mut session, clock) = session(full_config(), full_backend());
        session.update(0.2);
        let before = session.volumes();

        clock.advance(FRAME);
        session.update(0.9);
        let target = session.config().curve.target_volumes(0.9);
        let v = session.volumes();
        assert_relative_eq!(v.high, before.high * 0.15 + target.high * 0.85, epsilon = 1e-12);
        assert_relative_eq!(v.idle, before.idle * 0.15 + target.idle * 0.85, epsilon = 1e-12);
    }

    #[test]
    fn test_hold_then_fade_exactly_once() {
        let (mut session, clock) = session(full_config(), full_backend());
        session.update(0.5);

        // 4.9 s of released throttle
        while clock.now_secs() + FRAME < 4.9 {
            clock.advance(FRAME);
            assert_eq!(session.update(0.0), FrameOutcome::Holding);
        }
        clock.set(4.9);
        assert_eq!(session.update(0.0), FrameOutcome::Holding);
        assert_eq!(session.backend().fade_count(), 0);

        clock.set(5.1);
        assert_eq!(session.update(0.0), FrameOutcome::FadedOut);
        assert_eq!(session.backend().fade_count(), 3);
        assert!(!session.is_playing());
        assert_eq!(session.volumes(), BandVolumes::SILENT);

        clock.set(6.0);
        assert_eq!(session.update(0.0), FrameOutcome::Idle);
        assert_eq!(session.backend().fade_count(), 3);
    }

    #[test]
    fn test_fade_at_exact_delay() {
        let (mut session, clock) = session(full_config(), full_backend());
        clock.set(10.0);
        session.update(1.0);
        clock.set(15.0);
        assert_eq!(session.update(0.0), FrameOutcome::FadedOut);
    }

    #[test]
    fn test_fade_uses_configured_duration() {
        let config = full_config().with_fadeout_ms(400).with_stop_delay_secs(1.0);
        let (mut session, clock) = session(config, full_backend());
        session.update(0.3);
        clock.advance(1.5);
        session.update(0.0);

        let fades: Vec<_> = session
            .backend()
            .commands()
            .iter()
            .filter_map(|c| match c {
                PlaybackCommand::FadeOut { duration, .. } => Some(duration.as_millis()),
                _ => None,
            })
            .collect();
        assert_eq!(fades, vec![400, 400, 400]);
    }

    #[test]
    fn test_throttle_resets_stop_timer() {
        let (mut session, clock) = session(full_config(), full_backend());
        session.update(0.5);
        clock.set(4.0);
        session.update(0.1);
        assert_relative_eq!(session.last_throttle_time(), 4.0);
        clock.set(8.5);
        assert_eq!(session.update(0.0), FrameOutcome::Holding);
        assert_relative_eq!(session.last_throttle_time(), 4.0);
        clock.set(9.0);
        assert_eq!(session.update(0.0), FrameOutcome::FadedOut);
    }

    #[test]
    fn test_reengage_after_fade() {
        let (mut session, clock) = session(full_config(), full_backend());
        session.update(0.5);
        clock.set(6.0);
        session.update(0.0);
        assert_eq!(session.backend().play_count(), 3);

        // Fade still running: channels are not busy, so they restart
        clock.set(6.5);
        assert_eq!(session.update(0.5), FrameOutcome::Engaged);
        assert_eq!(session.backend().play_count(), 6);
        assert!(session.is_playing());
    }

    #[test]
    fn test_not_ready_defers_engagement() {
        let (mut session, clock) = session(full_config(), full_backend());
        session.backend_mut().set_ready(false);

        assert_eq!(session.update(0.8), FrameOutcome::NotReady);
        assert_eq!(session.state(), SessionState::Uninitialized);
        assert!(!session.is_playing());

        session.backend_mut().set_ready(true);
        clock.advance(FRAME);
        assert_eq!(session.update(0.8), FrameOutcome::Engaged);
        assert_eq!(session.state(), SessionState::Ready);
    }

    #[test]
    fn test_missing_idle_disables() {
        let backend = RecordingBackend::ready()
            .with_sample("mid.wav")
            .with_sample("high.wav");
        let (mut session, clock) = session(full_config(), backend);

        for throttle in [0.0, 0.5, 1.0, 0.0, 0.7] {
            assert_eq!(session.update(throttle), FrameOutcome::Disabled);
            clock.advance(FRAME);
        }
        assert_eq!(session.state(), SessionState::Disabled);
        assert!(session.backend().commands().is_empty());
        assert_eq!(session.volumes(), BandVolumes::SILENT);
        assert_eq!(session.channel(Band::Idle), None);
    }

    #[test]
    fn test_missing_optional_samples_fall_back() {
        let backend = RecordingBackend::ready().with_sample("idle.wav");
        let (mut session, _) = session(full_config(), backend);
        session.update(0.5);

        let idle = session.sample(Band::Idle).unwrap();
        assert_eq!(session.sample(Band::Mid), Some(idle));
        assert_eq!(session.sample(Band::High), Some(idle));
        assert_eq!(
            session.backend().sample_path(idle),
            Some(Path::new("idle.wav"))
        );
        assert_eq!(session.backend().play_count(), 3);
    }

    #[test]
    fn test_high_falls_back_to_mid() {
        let backend = RecordingBackend::ready()
            .with_sample("idle.wav")
            .with_sample("mid.wav");
        let (mut session, _) = session(full_config(), backend);
        session.update(0.5);

        assert_ne!(session.sample(Band::Mid), session.sample(Band::Idle));
        assert_eq!(session.sample(Band::High), session.sample(Band::Mid));
    }

    #[test]
    fn test_unconfigured_bands_use_lower_sample() {
        let backend = RecordingBackend::ready().with_sample("idle.wav");
        let (mut session, _) = session(EngineAudioConfig::new("idle.wav"), backend);
        session.update(0.2);
        assert_eq!(session.backend().loaded_paths().len(), 1);
        assert_eq!(session.sample(Band::High), session.sample(Band::Idle));
    }

    #[test]
    fn test_base_volume_applied_when_enabled() {
        let config = full_config().with_base_volume(0.5);
        let (mut session, _) = session(config, full_backend());
        session.update(1.0);

        let v = session.volumes();
        let applied = session.applied_volumes();
        assert_relative_eq!(applied.high, v.high * 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_shutdown_fades_playing_channels() {
        let (mut session, _) = session(full_config(), full_backend());
        session.shutdown();
        assert_eq!(session.backend().fade_count(), 0);

        session.update(0.6);
        session.shutdown();
        assert_eq!(session.backend().fade_count(), 3);
        assert!(!session.is_playing());
    }

    #[test]
    fn test_out_of_range_throttle_is_clamped() {
        let (mut session, _) = session(full_config(), full_backend());
        assert_eq!(session.update(f64::NAN), FrameOutcome::Idle);
        assert_eq!(session.update(3.0), FrameOutcome::Engaged);
        let target = session.config().curve.target_volumes(1.0);
        assert_relative_eq!(session.volumes().high, target.high * 0.85, epsilon = 1e-12);
    }

    #[test]
    fn test_reengage_after_fade_completed() {
        let (mut session, clock) = session(full_config(), full_backend());
        session.update(0.5);
        clock.set(6.0);
        assert_eq!(session.update(0.0), FrameOutcome::FadedOut);
        session.backend_mut().finish_fades();

        clock.set(20.0);
        session.backend_mut().clear_commands();
        assert_eq!(session.update(0.3), FrameOutcome::Engaged);
        assert_eq!(session.backend().play_count(), 3);
        assert_relative_eq!(session.last_throttle_time(), 20.0);
    }

    #[test]
    fn test_failed_start_is_not_playing() {
        let (mut session, clock) = session(full_config(), full_backend());
        session.backend_mut().set_playback_failing(true);

        assert_eq!(session.update(0.6), FrameOutcome::StartFailed);
        assert!(!session.is_playing());
        assert_eq!(session.backend().play_count(), 0);

        // Released throttle must not fade loops that never started
        clock.set(6.0);
        assert_eq!(session.update(0.0), FrameOutcome::Idle);
        assert_eq!(session.backend().fade_count(), 0);

        session.backend_mut().set_playback_failing(false);
        clock.advance(FRAME);
        assert_eq!(session.update(0.6), FrameOutcome::Engaged);
        assert!(session.is_playing());
        assert_eq!(session.backend().play_count(), 3);
    }

    #[test]
    fn test_backend_going_down_pauses_ready_session() {
        let (mut session, clock) = session(full_config(), full_backend());
        assert_eq!(session.update(0.5), FrameOutcome::Engaged);
        let volumes = session.volumes();

        session.backend_mut().clear_commands();
        session.backend_mut().set_ready(false);
        clock.advance(FRAME);
        assert_eq!(session.update(0.5), FrameOutcome::NotReady);
        clock.set(30.0);
        assert_eq!(session.update(0.0), FrameOutcome::NotReady);
        assert!(session.backend().commands().is_empty());
        assert_eq!(session.volumes(), volumes);
        assert_eq!(session.state(), SessionState::Ready);

        session.backend_mut().set_ready(true);
        clock.advance(FRAME);
        assert_eq!(session.update(0.5), FrameOutcome::Driving);
    }

    #[test]
    fn test_channel_shortage_releases_partial_channels() {
        let backend = full_backend().with_channel_limit(2);
        let (mut session, _) = session(full_config(), backend);

        assert_eq!(session.update(0.5), FrameOutcome::Disabled);
        assert_eq!(session.state(), SessionState::Disabled);
        assert_eq!(session.backend().channel_count(), 2);
        assert_eq!(session.backend().held_channels(), 0);
        assert_eq!(session.backend().play_count(), 0);
    }
}
