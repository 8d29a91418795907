//! Audio bank: output stream, clip storage, and the game's two channels
//!
//! One channel is the enemy's shared one-shot source (a cue is skipped
//! while it is busy), the other is the looping music layer. Clips are
//! grouped by sound band and picked at random per play; bands with no
//! clips loaded fall back to synthesized tones so timing still behaves
//! like real playback.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use rand::Rng;
use rodio::{OutputStream, OutputStreamBuilder, mixer::Mixer};

use super::source::{AudioChannel, AudioError};
use crate::ai::sound::{MusicCue, SoundBand, SoundCue};

/// Fallback tone per band: frequency and length in seconds
fn band_tone(band: SoundBand) -> (f32, f32) {
    match band {
        SoundBand::Distant => (110.0, 2.5),
        SoundBand::Closer => (220.0, 1.6),
        SoundBand::Chase => (440.0, 0.9),
    }
}

/// Fallback hum per music layer
fn music_tone(cue: MusicCue) -> f32 {
    match cue {
        MusicCue::Calm => 55.0,
        MusicCue::Tense => 82.5,
        MusicCue::Chase => 110.0,
    }
}

const MUSIC_VOLUME: f32 = 0.25;

/// Manages audio output, loaded clips, and the two playback channels
pub struct AudioBank {
    /// The output stream (must be kept alive)
    _stream: OutputStream,
    /// The mixer for creating sinks
    mixer: Mixer,
    /// The enemy's shared one-shot channel
    ambient: AudioChannel,
    /// The looping music layer
    music: AudioChannel,
    /// Ambient clips grouped by band
    clips: HashMap<SoundBand, Vec<Arc<[u8]>>>,
    /// Music clips per layer
    music_clips: HashMap<MusicCue, Arc<[u8]>>,
    /// The layer currently looping, if any
    current_music: Option<MusicCue>,
    /// Master volume applied on top of per-cue volume
    master_volume: f32,
}

impl AudioBank {
    /// Create a new audio bank
    ///
    /// # Errors
    ///
    /// Returns an error if no audio output device is available
    pub fn new() -> Result<Self, AudioError> {
        let stream = OutputStreamBuilder::from_default_device()
            .map_err(|_| AudioError::NoDevice)?
            .open_stream()
            .map_err(|_| AudioError::NoDevice)?;
        let mixer = stream.mixer().clone();
        let ambient = AudioChannel::new(&mixer, "ambient");
        let music = AudioChannel::new(&mixer, "music");

        Ok(Self {
            _stream: stream,
            mixer,
            ambient,
            music,
            clips: HashMap::new(),
            music_clips: HashMap::new(),
            current_music: None,
            master_volume: 1.0,
        })
    }

    /// Load an ambient clip file into a band
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read
    pub fn load_clip(&mut self, band: SoundBand, path: impl AsRef<Path>) -> Result<(), AudioError> {
        let bytes = std::fs::read(path).map_err(|e| AudioError::IoError(e.to_string()))?;
        self.load_clip_bytes(band, Arc::from(bytes));
        Ok(())
    }

    /// Add an ambient clip from bytes
    pub fn load_clip_bytes(&mut self, band: SoundBand, bytes: Arc<[u8]>) {
        self.clips.entry(band).or_default().push(bytes);
    }

    /// Load a music layer from a file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read
    pub fn load_music(&mut self, cue: MusicCue, path: impl AsRef<Path>) -> Result<(), AudioError> {
        let bytes = std::fs::read(path).map_err(|e| AudioError::IoError(e.to_string()))?;
        self.music_clips.insert(cue, Arc::from(bytes));
        Ok(())
    }

    /// Whether the one-shot channel is still playing the previous clip
    #[must_use]
    pub fn ambient_busy(&self) -> bool {
        self.ambient.is_busy()
    }

    /// Play an ambient cue on the one-shot channel.
    ///
    /// A random clip is drawn from the cue's band; with no clips loaded a
    /// synthesized tone of comparable length plays instead.
    pub fn play_cue(&mut self, cue: SoundCue, rng: &mut impl Rng) {
        let volume = cue.volume * self.master_volume;

        let clip = self
            .clips
            .get(&cue.band)
            .filter(|clips| !clips.is_empty())
            .map(|clips| Arc::clone(&clips[rng.gen_range(0..clips.len())]));

        match clip {
            Some(bytes) => {
                if let Err(e) = self.ambient.play_bytes(bytes, volume, cue.pitch) {
                    log::warn!("dropping undecodable {:?} clip: {e}", cue.band);
                }
            }
            None => {
                let (frequency, seconds) = band_tone(cue.band);
                self.ambient.play_tone(frequency, seconds, volume, cue.pitch);
            }
        }
    }

    /// Switch the looping music layer. No-op when the layer is unchanged.
    pub fn play_music(&mut self, cue: MusicCue) {
        if self.current_music == Some(cue) {
            return;
        }
        self.current_music = Some(cue);
        self.music.stop();

        let volume = MUSIC_VOLUME * self.master_volume;
        match self.music_clips.get(&cue) {
            Some(bytes) => {
                if let Err(e) = self.music.play_bytes_looping(Arc::clone(bytes), volume) {
                    log::warn!("dropping undecodable {cue:?} music: {e}");
                }
            }
            None => self.music.play_tone_looping(music_tone(cue), volume),
        }
    }

    /// Set the master volume (affects subsequent plays)
    pub fn set_master_volume(&mut self, volume: f32) {
        self.master_volume = volume.max(0.0);
    }

    /// Get the master volume
    #[must_use]
    pub const fn master_volume(&self) -> f32 {
        self.master_volume
    }

    /// Stop both channels
    pub fn stop_all(&mut self) {
        self.ambient.stop();
        self.music.stop();
        self.current_music = None;
    }

    /// Get the mixer for creating custom channels
    #[must_use]
    pub fn mixer(&self) -> &Mixer {
        &self.mixer
    }
}

impl std::fmt::Debug for AudioBank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioBank")
            .field("ambient_busy", &self.ambient.is_busy())
            .field("current_music", &self.current_music)
            .field("master_volume", &self.master_volume)
            .finish()
    }
}
