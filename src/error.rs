//! Error handling for engine-audio
//!
//! Errors carry recovery suggestions so the CLI can print something useful.
//! Note that a missing idle sample is *not* an error for a running session:
//! the session disables itself and keeps going silently.

use thiserror::Error;

/// Result type alias for engine-audio operations
pub type Result<T> = std::result::Result<T, EngineAudioError>;

/// Main error type for engine-audio operations
#[derive(Error, Debug)]
pub enum EngineAudioError {
    // Asset Errors
    #[error("Sample not found: {path}")]
    SampleNotFound {
        path: String,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("Invalid audio file: {reason}")]
    InvalidAudio {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Unsupported audio format: {format}")]
    UnsupportedFormat { format: String },

    // Configuration Errors
    #[error("Invalid configuration: {field}: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("Invalid throttle script: {reason}")]
    InvalidScript { reason: String },

    // Playback Errors
    #[error("Playback backend not ready")]
    BackendNotReady,

    #[error("Unknown playback handle: {handle}")]
    UnknownHandle { handle: String },

    #[error("No free playback channel (limit {limit})")]
    ChannelsExhausted { limit: usize },

    #[error("Playback failed: {reason}")]
    PlaybackFailed { reason: String },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl EngineAudioError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            EngineAudioError::SampleNotFound { .. } => "SAMPLE_NOT_FOUND",
            EngineAudioError::InvalidAudio { .. } => "INVALID_AUDIO",
            EngineAudioError::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            EngineAudioError::InvalidConfig { .. } => "INVALID_CONFIG",
            EngineAudioError::InvalidScript { .. } => "INVALID_SCRIPT",
            EngineAudioError::BackendNotReady => "BACKEND_NOT_READY",
            EngineAudioError::UnknownHandle { .. } => "UNKNOWN_HANDLE",
            EngineAudioError::ChannelsExhausted { .. } => "CHANNELS_EXHAUSTED",
            EngineAudioError::PlaybackFailed { .. } => "PLAYBACK_FAILED",
            EngineAudioError::Io(_) => "IO_ERROR",
            EngineAudioError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Check if this error is recoverable
    ///
    /// Recoverable errors leave the session usable: a later call may succeed
    /// or a lower band can stand in.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            EngineAudioError::SampleNotFound { .. }
                | EngineAudioError::InvalidAudio { .. }
                | EngineAudioError::UnsupportedFormat { .. }
                | EngineAudioError::BackendNotReady
                | EngineAudioError::PlaybackFailed { .. }
        )
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            EngineAudioError::SampleNotFound { .. } => vec![
                "Check the sample path in the configuration",
                "Run 'engine-audio-cli generate-samples <dir>' to create placeholder loops",
            ],
            EngineAudioError::InvalidAudio { .. } => vec![
                "Convert the sample to 16/24-bit PCM or 32-bit float WAV",
                "Check if the file plays in another application",
            ],
            EngineAudioError::UnsupportedFormat { .. } => {
                vec!["Use a mono or stereo WAV file"]
            }
            EngineAudioError::InvalidConfig { .. } => vec![
                "Zone boundaries must increase strictly inside (0, 1)",
                "Smoothing must be in [0, 1)",
            ],
            EngineAudioError::InvalidScript { .. } => vec![
                "Keyframes need finite, non-decreasing times",
                "Throttle values must be within [0, 1]",
            ],
            EngineAudioError::BackendNotReady => {
                vec!["Initialize the mixer before starting playback"]
            }
            EngineAudioError::ChannelsExhausted { .. } => {
                vec!["Each engine session needs three playback channels"]
            }
            _ => vec![],
        }
    }
}
