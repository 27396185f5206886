//! `cadence` — streaming voice-activity detection and turn segmentation.
//!
//! This crate provides:
//! - A `SpeechSegment` model for partial/final recognizer events
//! - A validated, hot-swappable timing configuration
//! - A per-session `VoiceActivityDetector` state machine that merges final
//!   segments into turns and emits each completed turn exactly once
//!
//! The library sits between a streaming speech recognizer and whatever
//! consumes finished utterances (typically an AI pipeline), with an emphasis
//! on tolerating noisy, bursty, occasionally-empty recognizer output without
//! ever producing a duplicate, empty, or truncated turn.

// High-level API (most consumers should start here).
pub mod detector;

// Recognizer event model and configuration.
pub mod config;
pub mod segment;

// Configuration error taxonomy.
pub mod error;

// Turn assembly and silence-timer internals.
mod accumulator;
mod timer;

// Logging configuration and control.
#[cfg(feature = "logging")]
pub mod logging;
