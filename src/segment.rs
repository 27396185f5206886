//! The recognizer event model.
//!
//! A `SpeechSegment` is one event from a streaming speech recognizer: either a
//! provisional ("partial") hypothesis for ongoing speech, or a settled
//! ("final") transcription for a sub-span of it. Final segments may still be
//! empty; many recognizers emit blank finals as silence keep-alives.
//!
//! Segments are created by the recognizer adapter, handed to the detector
//! once, and not retained after their text has been merged into a turn.

use tokio::time::Instant;

/// A single speech recognizer event.
#[derive(Debug, Clone)]
pub struct SpeechSegment {
    /// The recognized text. May be empty (silence marker).
    pub text: String,

    /// Whether this is a settled transcription rather than a provisional
    /// hypothesis. Only final segments ever contribute to a turn.
    pub is_final: bool,

    /// Monotonic arrival timestamp.
    ///
    /// We use `tokio::time::Instant` so that under a paused test clock the
    /// detector's duration math follows the virtual time source.
    pub arrived_at: Instant,
}

impl SpeechSegment {
    /// Create a final segment stamped with the current time.
    pub fn final_text(text: impl Into<String>) -> Self {
        Self::final_at(text, Instant::now())
    }

    /// Create a partial segment stamped with the current time.
    pub fn partial(text: impl Into<String>) -> Self {
        Self::partial_at(text, Instant::now())
    }

    /// Create a final segment with an explicit arrival time.
    ///
    /// Useful for adapters that stamp events as they come off the wire rather
    /// than when they reach the detector.
    pub fn final_at(text: impl Into<String>, arrived_at: Instant) -> Self {
        Self {
            text: text.into(),
            is_final: true,
            arrived_at,
        }
    }

    /// Create a partial segment with an explicit arrival time.
    pub fn partial_at(text: impl Into<String>, arrived_at: Instant) -> Self {
        Self {
            text: text.into(),
            is_final: false,
            arrived_at,
        }
    }

    /// Whether the segment carries no real content (empty or whitespace-only).
    pub(crate) fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_detection_covers_whitespace() {
        assert!(SpeechSegment::final_text("").is_blank());
        assert!(SpeechSegment::final_text("   \t\n").is_blank());
        assert!(!SpeechSegment::final_text(" hi ").is_blank());
    }

    #[test]
    fn constructors_set_finality() {
        assert!(SpeechSegment::final_text("hello").is_final);
        assert!(!SpeechSegment::partial("hel").is_final);
    }
}
