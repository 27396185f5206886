use std::time::Duration;

use thiserror::Error;

/// Configuration validation errors.
///
/// These are the only fatal, caller-visible errors in the crate: an invalid
/// configuration is rejected at construction or update time and never
/// partially applied. Everything else the detector encounters at runtime
/// (blank segments, late timer fires, completion while idle) is expected
/// noise and is handled by ignoring or discarding, never by erroring.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("silence timeout must be greater than zero")]
    ZeroSilenceTimeout,

    #[error(
        "max turn duration ({max_turn_duration:?}) must be at least the silence timeout ({silence_timeout:?})"
    )]
    MaxTurnShorterThanSilence {
        max_turn_duration: Duration,
        silence_timeout: Duration,
    },

    #[error("minimum speech length must be at least one character")]
    ZeroMinSpeechChars,
}
