//! Audio system for playing sounds and music
//!
//! Built on top of the rodio audio library.
//! Supports WAV, MP3, OGG, and FLAC formats.

mod bank;
mod source;

pub use bank::AudioBank;
pub use source::{AudioChannel, AudioError};
