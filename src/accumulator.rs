//! Turn assembly.
//!
//! The accumulator owns the in-progress turn: the merged text of every final
//! segment since the last reset, and the moment the first real content
//! arrived. It is deliberately a plain synchronous value; the detector wraps
//! it in whatever mutual exclusion the runtime requires.
//!
//! Invariant: a turn is active iff `started_at` is set, and only non-blank
//! input can set it. Blank input while idle must never start a turn, which is
//! what keeps recognizer silence keep-alives from creating spurious turns.

use std::time::Duration;

use tokio::time::Instant;

use crate::config::VadConfig;

/// Buffers final-segment text for the turn currently being assembled.
#[derive(Debug, Default)]
pub(crate) struct TurnAccumulator {
    text: String,
    started_at: Option<Instant>,
}

impl TurnAccumulator {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Whether a turn is currently in progress.
    pub(crate) fn is_active(&self) -> bool {
        self.started_at.is_some()
    }

    /// Merge `text` into the buffer, joining pieces with a single space.
    ///
    /// The first non-blank append starts the turn at `now`. Blank input is a
    /// no-op either way: it neither starts a turn nor pads the buffer.
    pub(crate) fn append(&mut self, text: &str, now: Instant) {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return;
        }

        if self.started_at.is_none() {
            self.started_at = Some(now);
        }

        if !self.text.is_empty() {
            self.text.push(' ');
        }
        self.text.push_str(trimmed);
    }

    /// Time elapsed between the start of the turn and `now`.
    ///
    /// Zero while inactive, and saturating if `now` predates the turn start
    /// (out-of-order timestamps are tolerated, not enforced against).
    pub(crate) fn elapsed_since(&self, now: Instant) -> Duration {
        match self.started_at {
            Some(started_at) => now.duration_since(started_at),
            None => Duration::ZERO,
        }
    }

    /// The single gate for "was this real speech or noise": the trimmed
    /// buffer must reach the configured minimum character count.
    pub(crate) fn is_valid(&self, config: &VadConfig) -> bool {
        self.text.trim().chars().count() >= config.min_speech_chars
    }

    /// The merged turn text so far.
    pub(crate) fn text(&self) -> &str {
        &self.text
    }

    /// Return to idle, clearing the buffer and the turn start. Idempotent.
    pub(crate) fn reset(&mut self) {
        self.text.clear();
        self.started_at = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_min_chars(min_speech_chars: usize) -> VadConfig {
        VadConfig {
            min_speech_chars,
            ..VadConfig::default()
        }
    }

    #[test]
    fn blank_append_never_starts_a_turn() {
        let mut acc = TurnAccumulator::new();
        acc.append("", Instant::now());
        acc.append("   \t", Instant::now());

        assert!(!acc.is_active());
        assert_eq!(acc.text(), "");
    }

    #[test]
    fn first_real_content_starts_the_turn() {
        let mut acc = TurnAccumulator::new();
        let now = Instant::now();
        acc.append("  hello  ", now);

        assert!(acc.is_active());
        assert_eq!(acc.text(), "hello");
    }

    #[test]
    fn appends_join_with_a_single_space() {
        let mut acc = TurnAccumulator::new();
        let now = Instant::now();
        acc.append("So this is", now);
        acc.append("going to be hard", now);

        assert_eq!(acc.text(), "So this is going to be hard");
    }

    #[test]
    fn blank_append_on_active_turn_does_not_pad_text() {
        let mut acc = TurnAccumulator::new();
        let now = Instant::now();
        acc.append("hello", now);
        acc.append("", now);
        acc.append("there", now);

        assert_eq!(acc.text(), "hello there");
    }

    #[test]
    fn validity_is_a_character_count_gate() {
        let mut acc = TurnAccumulator::new();
        let now = Instant::now();

        acc.append("hi", now);
        assert!(!acc.is_valid(&config_with_min_chars(3)));

        acc.append("!", now);
        // "hi !" trims to 4 chars.
        assert!(acc.is_valid(&config_with_min_chars(3)));
    }

    #[test]
    fn elapsed_is_zero_while_inactive() {
        let acc = TurnAccumulator::new();
        assert_eq!(acc.elapsed_since(Instant::now()), Duration::ZERO);
    }

    #[test]
    fn reset_is_idempotent() {
        let mut acc = TurnAccumulator::new();
        acc.append("hello", Instant::now());

        acc.reset();
        acc.reset();

        assert!(!acc.is_active());
        assert_eq!(acc.text(), "");
    }
}
