//! The turn-segmentation state machine.
//!
//! `VoiceActivityDetector` ties the accumulator and the silence timer
//! together: recognizer events go in through [`VoiceActivityDetector::ingest`],
//! completed turns come out on a bounded channel handed back at construction.
//!
//! The detector has exactly two states. `Idle`: no turn exists. `Accumulating`:
//! exactly one turn exists. A turn is created by the first non-blank final
//! segment, grown by every subsequent one, and destroyed the moment it is
//! either emitted or discarded. That single-active-turn invariant must hold
//! under arbitrary interleavings of segment arrival and timer expiry, so
//! `ingest`, `force_complete`, and the timer's fire path all serialize
//! through one lock around the detector state.
//!
//! One detector instance per conversation/session. Sessions share nothing,
//! so there is no cross-session locking to think about; cloning a detector
//! clones a handle to the same session, not a new session.

use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::accumulator::TurnAccumulator;
use crate::config::VadConfig;
use crate::error::ConfigError;
use crate::segment::SpeechSegment;
use crate::timer::SilenceTimer;

/// Default capacity of the completed-turn channel.
///
/// Turns are produced at human speaking pace, so a small buffer is plenty;
/// if the consumer falls this far behind, dropping is preferable to blocking
/// the timer task.
pub const DEFAULT_TURN_QUEUE_CAPACITY: usize = 16;

/// One complete, validated unit of speaker utterance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletedTurn {
    /// Space-joined text of every final segment in the turn.
    pub text: String,

    /// Seconds from the first real content to turn completion.
    pub duration_seconds: f32,
}

/// Read-only detector counters, updated on every successful emission.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VadStats {
    pub turns_completed: u64,
    pub total_speech_seconds: f32,
    pub average_turn_seconds: f32,

    /// Whether a turn is currently being assembled.
    pub active_turn: bool,

    /// Character count of the in-progress turn text.
    pub preview_chars: usize,
}

/// Streaming voice-activity and turn-segmentation engine for one session.
///
/// Construction validates the configuration up front; once `new` succeeds
/// there are no recoverable runtime errors left in this type. Malformed
/// input (blank finals, partials, late timer fires) is ignored or discarded
/// per the turn rules, never surfaced to the caller.
///
/// All methods must be called from within a tokio runtime, since ingesting
/// speech arms a timer task on the current runtime.
#[derive(Debug, Clone)]
pub struct VoiceActivityDetector {
    shared: Arc<Shared>,
}

#[derive(Debug)]
struct Shared {
    state: Mutex<DetectorState>,
    turns_tx: mpsc::Sender<CompletedTurn>,
}

#[derive(Debug)]
struct DetectorState {
    config: VadConfig,
    accumulator: TurnAccumulator,
    timer: SilenceTimer,
    turns_completed: u64,
    total_speech: Duration,
}

impl VoiceActivityDetector {
    /// Create a detector with the default completed-turn queue capacity.
    ///
    /// Returns the detector handle and the receiving end of the turn channel.
    /// The calling layer owns the receiver and is responsible for forwarding
    /// turns to whatever processes them (an AI pipeline, a WebSocket, a test).
    pub fn new(
        config: VadConfig,
    ) -> Result<(Self, mpsc::Receiver<CompletedTurn>), ConfigError> {
        Self::with_queue_capacity(config, DEFAULT_TURN_QUEUE_CAPACITY)
    }

    /// Create a detector with an explicit turn queue capacity.
    ///
    /// We fail fast on an invalid config so that no detector instance and no
    /// timer task ever exists with inconsistent thresholds.
    pub fn with_queue_capacity(
        config: VadConfig,
        capacity: usize,
    ) -> Result<(Self, mpsc::Receiver<CompletedTurn>), ConfigError> {
        config.validate()?;

        let (turns_tx, turns_rx) = mpsc::channel(capacity.max(1));
        let shared = Arc::new(Shared {
            state: Mutex::new(DetectorState {
                config,
                accumulator: TurnAccumulator::new(),
                timer: SilenceTimer::new(),
                turns_completed: 0,
                total_speech: Duration::ZERO,
            }),
            turns_tx,
        });

        Ok((Self { shared }, turns_rx))
    }

    /// Feed one recognizer event into the state machine.
    ///
    /// Partial segments never touch turn state; they exist only so a UI can
    /// show live feedback, and the core must behave identically with or
    /// without them. Blank finals are silence keep-alives: ignored while
    /// idle, and never treated as evidence of continued speech while a turn
    /// is active (so they do not push the silence deadline out). Non-blank
    /// finals grow the turn and re-arm the silence timer, unless the turn has
    /// already hit `max_turn_duration`, in which case it completes right now.
    pub fn ingest(&self, segment: SpeechSegment) {
        if !segment.is_final {
            let state = self.shared.lock_state();
            if state.config.debug_logging {
                debug!(text = %segment.text, "partial segment");
            }
            return;
        }

        let mut state = self.shared.lock_state();

        if segment.is_blank() {
            if state.config.debug_logging {
                if state.accumulator.is_active() {
                    debug!("blank final segment during active turn; silence timer left alone");
                } else {
                    debug!("blank final segment while idle; ignored");
                }
            }
            return;
        }

        state.accumulator.append(&segment.text, segment.arrived_at);
        if state.config.debug_logging {
            debug!(
                segment = %segment.text.trim(),
                turn = %state.accumulator.text(),
                "accumulated final segment"
            );
        }

        if state.accumulator.elapsed_since(segment.arrived_at) >= state.config.max_turn_duration {
            if state.config.debug_logging {
                debug!("max turn duration reached; forcing completion");
            }
            self.shared.complete_locked(&mut state, Instant::now());
            return;
        }

        let silence_timeout = state.config.silence_timeout;
        let weak = Arc::downgrade(&self.shared);
        state.timer.arm(silence_timeout, move |generation| {
            Shared::on_silence_timeout(&weak, generation);
        });
    }

    /// Immediately finish the current turn, bypassing the silence timer.
    ///
    /// Used for external triggers like a "done" button or session teardown.
    /// The same validity gate applies as on a silence timeout, so an invalid
    /// turn is still discarded. A no-op while idle, and safe to call
    /// repeatedly.
    pub fn force_complete(&self) {
        let mut state = self.shared.lock_state();
        self.shared.complete_locked(&mut state, Instant::now());
    }

    /// Atomically replace the configuration.
    ///
    /// The update is validated first and applied as a whole, or not at all.
    /// An in-progress turn keeps running; the new thresholds take effect from
    /// the next timer arm and validity check.
    pub fn update_config(&self, config: VadConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.shared.lock_state().config = config;
        Ok(())
    }

    /// Snapshot of the current configuration.
    pub fn config(&self) -> VadConfig {
        self.shared.lock_state().config.clone()
    }

    /// Text of the turn currently being assembled, for live preview.
    ///
    /// Read-only; surfacing this to a UI has no effect on the state machine.
    pub fn preview(&self) -> String {
        self.shared.lock_state().accumulator.text().to_owned()
    }

    /// Snapshot of the detector's counters.
    pub fn stats(&self) -> VadStats {
        let state = self.shared.lock_state();
        let total_speech_seconds = state.total_speech.as_secs_f32();
        let average_turn_seconds = if state.turns_completed > 0 {
            total_speech_seconds / state.turns_completed as f32
        } else {
            0.0
        };

        VadStats {
            turns_completed: state.turns_completed,
            total_speech_seconds,
            average_turn_seconds,
            active_turn: state.accumulator.is_active(),
            preview_chars: state.accumulator.text().chars().count(),
        }
    }

    /// Discard any in-progress turn and zero the counters.
    pub fn reset(&self) {
        let mut state = self.shared.lock_state();
        state.timer.cancel();
        state.accumulator.reset();
        state.turns_completed = 0;
        state.total_speech = Duration::ZERO;
    }
}

impl Shared {
    /// Serialize all state access through one lock.
    ///
    /// A poisoned lock means another thread panicked inside a critical
    /// section, which breaks the single-writer contract; continuing would
    /// risk emitting a duplicate or truncated turn, so we treat it as fatal.
    fn lock_state(&self) -> MutexGuard<'_, DetectorState> {
        self.state
            .lock()
            .expect("detector state lock poisoned by a panicking writer")
    }

    /// Entry point for the timer task.
    ///
    /// The generation check happens under the state lock, after any racing
    /// `ingest` has finished re-arming, so a superseded schedule observes the
    /// newer generation and backs off. The weak upgrade keeps a torn-down
    /// session from being revived by a timer that was already in flight.
    fn on_silence_timeout(shared: &Weak<Shared>, generation: u64) {
        let Some(shared) = shared.upgrade() else {
            return;
        };

        let mut state = shared.lock_state();
        if !state.timer.is_current(generation) {
            debug!("silence timer fired but was superseded; ignoring");
            return;
        }

        if state.config.debug_logging {
            debug!("silence timeout elapsed");
        }
        shared.complete_locked(&mut state, Instant::now());
    }

    /// Complete-or-discard the current turn, then return to idle.
    ///
    /// Shared by the silence-timeout path and `force_complete`. Cancels the
    /// pending timer in every case so nothing can fire against the next turn.
    /// A no-op while idle, which also covers a timer that fired after a late
    /// cancel.
    fn complete_locked(&self, state: &mut DetectorState, now: Instant) {
        state.timer.cancel();

        if !state.accumulator.is_active() {
            return;
        }

        if state.accumulator.is_valid(&state.config) {
            let duration = state.accumulator.elapsed_since(now);
            let turn = CompletedTurn {
                text: state.accumulator.text().to_owned(),
                duration_seconds: duration.as_secs_f32(),
            };

            state.turns_completed += 1;
            state.total_speech += duration;

            if state.config.debug_logging {
                debug!(
                    text = %turn.text,
                    duration_seconds = turn.duration_seconds,
                    turns_completed = state.turns_completed,
                    "turn complete"
                );
            }

            self.emit(turn);
        } else if state.config.debug_logging {
            debug!(
                chars = state.accumulator.text().trim().chars().count(),
                min = state.config.min_speech_chars,
                "discarding turn below minimum speech length"
            );
        }

        state.accumulator.reset();
    }

    /// Hand a completed turn to the consumer without ever blocking.
    ///
    /// `try_send` on the bounded channel preserves emission order and keeps
    /// the timer task non-blocking. A full queue means the consumer has
    /// stalled for many turns; we log and drop rather than wedge the session.
    fn emit(&self, turn: CompletedTurn) {
        match self.turns_tx.try_send(turn) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(turn)) => {
                warn!(text = %turn.text, "turn queue full; dropping completed turn");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                debug!("turn consumer gone; dropping completed turn");
            }
        }
    }
}
