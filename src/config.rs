//! Detector configuration.
//!
//! `VadConfig` is an immutable parameter set supplied at detector
//! construction. It can be hot-swapped later via
//! [`VoiceActivityDetector::update_config`](crate::detector::VoiceActivityDetector::update_config),
//! but only as a whole value that has passed validation; individual fields
//! are never mutated in place.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How long the detector waits after the last real speech before treating the
/// turn as finished.
pub const DEFAULT_SILENCE_TIMEOUT: Duration = Duration::from_millis(2500);

/// Minimum trimmed character count for a buffered turn to count as speech
/// rather than noise.
pub const DEFAULT_MIN_SPEECH_CHARS: usize = 3;

/// Hard ceiling on a single turn, bounding worst-case latency for speakers
/// who never pause.
pub const DEFAULT_MAX_TURN_DURATION: Duration = Duration::from_secs(60);

/// Timing and validity thresholds for turn segmentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VadConfig {
    /// Trailing silence after which an in-progress turn is considered
    /// complete.
    pub silence_timeout: Duration,

    /// Minimum accumulated content (trimmed character count) required for a
    /// buffered turn to be emitted rather than discarded as noise.
    ///
    /// This is a content gate, not a duration gate: a rapid short utterance
    /// like "yes" should pass, while a long stretch of near-empty recognizer
    /// output should not.
    pub min_speech_chars: usize,

    /// Hard ceiling on turn length. Once an active turn has been running this
    /// long, it is force-completed even though the speaker has not paused.
    pub max_turn_duration: Duration,

    /// Emit per-segment debug traces. Diagnostic only; never changes
    /// detector behavior.
    pub debug_logging: bool,
}

impl Default for VadConfig {
    fn default() -> Self {
        Self {
            silence_timeout: DEFAULT_SILENCE_TIMEOUT,
            min_speech_chars: DEFAULT_MIN_SPEECH_CHARS,
            max_turn_duration: DEFAULT_MAX_TURN_DURATION,
            debug_logging: false,
        }
    }
}

impl VadConfig {
    /// Check the configuration's internal consistency.
    ///
    /// All rules are checked before any error is returned, and callers apply
    /// a config only after validation succeeds, so an invalid update is
    /// rejected as a whole rather than applied field-by-field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.silence_timeout.is_zero() {
            return Err(ConfigError::ZeroSilenceTimeout);
        }

        if self.max_turn_duration < self.silence_timeout {
            return Err(ConfigError::MaxTurnShorterThanSilence {
                max_turn_duration: self.max_turn_duration,
                silence_timeout: self.silence_timeout,
            });
        }

        // A zero threshold would let a whitespace-only buffer validate and
        // emit an empty turn.
        if self.min_speech_chars == 0 {
            return Err(ConfigError::ZeroMinSpeechChars);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        VadConfig::default().validate().expect("default must pass");
    }

    #[test]
    fn rejects_zero_silence_timeout() {
        let config = VadConfig {
            silence_timeout: Duration::ZERO,
            ..VadConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroSilenceTimeout));
    }

    #[test]
    fn rejects_max_turn_shorter_than_silence() {
        let config = VadConfig {
            silence_timeout: Duration::from_secs(5),
            max_turn_duration: Duration::from_secs(2),
            ..VadConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MaxTurnShorterThanSilence { .. })
        ));
    }

    #[test]
    fn rejects_zero_min_speech_chars() {
        let config = VadConfig {
            min_speech_chars: 0,
            ..VadConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroMinSpeechChars));
    }

    #[test]
    fn max_turn_equal_to_silence_is_allowed() {
        let config = VadConfig {
            silence_timeout: Duration::from_secs(2),
            max_turn_duration: Duration::from_secs(2),
            ..VadConfig::default()
        };
        config.validate().expect("boundary must pass");
    }

    #[test]
    fn round_trips_through_json() -> anyhow::Result<()> {
        let config = VadConfig {
            silence_timeout: Duration::from_secs(3),
            min_speech_chars: 5,
            max_turn_duration: Duration::from_secs(90),
            debug_logging: true,
        };

        let json = serde_json::to_string(&config)?;
        let back: VadConfig = serde_json::from_str(&json)?;
        assert_eq!(back, config);
        Ok(())
    }
}
