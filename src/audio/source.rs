//! Audio channels for one-shot and looping playback

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use rodio::source::SineWave;
use rodio::{Decoder, Sink, Source, mixer::Mixer};

/// A persistent playback channel backed by one sink.
///
/// Clips are appended per play with their own volume and speed, so the
/// same channel serves both the enemy's shared one-shot source (busy
/// until the clip ends) and the looping music layer.
pub struct AudioChannel {
    /// The audio sink for playback control
    sink: Sink,
    /// Channel name for debugging
    name: String,
}

impl AudioChannel {
    /// Create an idle channel connected to a mixer
    pub fn new(mixer: &Mixer, name: impl Into<String>) -> Self {
        Self {
            sink: Sink::connect_new(mixer),
            name: name.into(),
        }
    }

    /// Start a clip at the given volume and playback speed.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes cannot be decoded
    pub fn play_bytes(
        &mut self,
        bytes: Arc<[u8]>,
        volume: f32,
        speed: f32,
    ) -> Result<(), AudioError> {
        let cursor = Cursor::new(bytes);
        let source = Decoder::new(cursor).map_err(|e| AudioError::DecodeError(e.to_string()))?;

        self.sink.set_volume(volume.max(0.0));
        self.sink.set_speed(speed.max(0.1));
        self.sink.append(source);
        self.sink.play();
        Ok(())
    }

    /// Start a clip that repeats until stopped
    pub fn play_bytes_looping(
        &mut self,
        bytes: Arc<[u8]>,
        volume: f32,
    ) -> Result<(), AudioError> {
        let cursor = Cursor::new(bytes);
        let source = Decoder::new(cursor).map_err(|e| AudioError::DecodeError(e.to_string()))?;

        self.sink.set_volume(volume.max(0.0));
        self.sink.set_speed(1.0);
        self.sink.append(source.repeat_infinite());
        self.sink.play();
        Ok(())
    }

    /// Start a synthesized tone. Stands in for clips that are not loaded
    /// so playback timing (and the busy gate) behaves like the real thing.
    pub fn play_tone(&mut self, frequency: f32, seconds: f32, volume: f32, speed: f32) {
        let source = SineWave::new(frequency).take_duration(Duration::from_secs_f32(seconds));

        self.sink.set_volume(volume.max(0.0));
        self.sink.set_speed(speed.max(0.1));
        self.sink.append(source);
        self.sink.play();
    }

    /// Start a synthesized tone that repeats until stopped
    pub fn play_tone_looping(&mut self, frequency: f32, volume: f32) {
        let source = SineWave::new(frequency)
            .take_duration(Duration::from_secs_f32(2.0))
            .repeat_infinite();

        self.sink.set_volume(volume.max(0.0));
        self.sink.set_speed(1.0);
        self.sink.append(source);
        self.sink.play();
    }

    /// Whether the channel is still playing something
    #[must_use]
    pub fn is_busy(&self) -> bool {
        !self.sink.empty()
    }

    /// Stop playback and clear anything queued
    pub fn stop(&mut self) {
        self.sink.stop();
    }

    /// Set the channel volume (0.0 = silent, 1.0 = normal)
    pub fn set_volume(&mut self, volume: f32) {
        self.sink.set_volume(volume.max(0.0));
    }

    /// Get the channel name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for AudioChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioChannel")
            .field("name", &self.name)
            .field("busy", &self.is_busy())
            .field("volume", &self.sink.volume())
            .finish()
    }
}

/// Errors that can occur during audio operations
#[derive(Debug, Clone)]
pub enum AudioError {
    /// IO error reading file
    IoError(String),
    /// Error decoding audio data
    DecodeError(String),
    /// No audio device available
    NoDevice,
}

impl std::fmt::Display for AudioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IoError(e) => write!(f, "IO error: {e}"),
            Self::DecodeError(e) => write!(f, "Decode error: {e}"),
            Self::NoDevice => write!(f, "No audio output device available"),
        }
    }
}

impl std::error::Error for AudioError {}
