//! Voice-cloning engines.
//!
//! This module contains implementations of [`VoiceCloneEngine`](crate::VoiceCloneEngine).
//!
//! # Available Engines
//!
//! Enable engines via Cargo features:
//! - `xtts` - Coqui XTTS v2 via the `tts` program (enabled by default)

#[cfg(feature = "xtts")]
pub mod xtts;
