//! Ambient sound scheduling for the enemy
//!
//! A self-rescheduling decision loop, polled once per frame. Each time its
//! deadline passes it rolls a trigger chance; on success it emits a cue in
//! a distance band (distant growl, closer growl, or chase scream) and
//! decides again next frame, otherwise it re-arms after a randomized
//! delay. The loop never terminates: branches that play nothing still
//! re-arm.
//!
//! The scheduler is pure. It never touches an output device, so it can be
//! driven with a seeded RNG and asserted on exactly.

use std::ops::Range;

use rand::Rng;

/// Success threshold for a patrol roll, inclusive, rolled on [0, 100)
const PATROL_TRIGGER_CHANCE: i32 = 50;
/// Success threshold for a chase roll, inclusive
const CHASE_TRIGGER_CHANCE: i32 = 90;

/// Beyond this distance the distant band plays. Also the radius at which
/// the music turns tense.
pub const DISTANT_RANGE: f32 = 20.0;

const DISTANT_VOLUME: f32 = 0.5;
const CLOSER_VOLUME: f32 = 0.8;
const CHASE_VOLUME: f32 = 1.0;

/// Every clip plays at a randomized pitch from this range
const PITCH_RANGE: Range<f32> = 0.5..1.5;

/// Re-arm delay after an unsuccessful patrol roll
const PATROL_REARM_SECS: Range<f32> = 2.0..10.0;
/// Re-arm delay after an unsuccessful chase roll
const CHASE_REARM_SECS: Range<f32> = 0.5..2.0;

/// Distance band of an ambient cue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundBand {
    /// Player is far away; quiet, unsettling
    Distant,
    /// Player is near but not yet detected
    Closer,
    /// Enemy is chasing
    Chase,
}

/// One ambient clip to play: band plus per-play volume and pitch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SoundCue {
    pub band: SoundBand,
    pub volume: f32,
    pub pitch: f32,
}

/// Background music layers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MusicCue {
    Calm,
    Tense,
    Chase,
}

/// Pick the music layer for the current situation
#[must_use]
pub fn music_cue(chasing: bool, distance_to_player: f32) -> MusicCue {
    if chasing {
        MusicCue::Chase
    } else if distance_to_player < DISTANT_RANGE {
        MusicCue::Tense
    } else {
        MusicCue::Calm
    }
}

/// What the scheduler needs to know about the world this frame
#[derive(Debug, Clone, Copy)]
pub struct SoundContext {
    /// Whether the enemy is currently chasing
    pub chasing: bool,
    /// Distance from the enemy to the player
    pub distance_to_player: f32,
    /// The enemy's blind detection radius; inside it no ambient band applies
    pub detection_dist: f32,
    /// Whether the one-shot source is still playing the previous clip
    pub source_busy: bool,
}

/// The enemy's ambient sound decision loop
#[derive(Debug, Clone, Copy)]
pub struct SoundScheduler {
    /// Next moment, in session seconds, a decision is due
    next_decision_at: f64,
}

impl SoundScheduler {
    /// Create a scheduler whose first decision fires on the first poll
    pub fn new() -> Self {
        Self {
            next_decision_at: 0.0,
        }
    }

    /// Run at most one decision. Returns a cue when a clip should start.
    ///
    /// A successful roll with a free source emits a cue and decides again
    /// on the next frame; every other outcome re-arms after a randomized
    /// delay, so the loop is perpetual.
    pub fn poll(&mut self, now: f64, ctx: &SoundContext, rng: &mut impl Rng) -> Option<SoundCue> {
        if now < self.next_decision_at {
            return None;
        }

        let chance: i32 = rng.gen_range(0..100);

        if ctx.chasing {
            if chance <= CHASE_TRIGGER_CHANCE && !ctx.source_busy {
                self.next_decision_at = now;
                log::debug!("ambient cue: chase (roll {chance})");
                return Some(SoundCue {
                    band: SoundBand::Chase,
                    volume: CHASE_VOLUME,
                    pitch: rng.gen_range(PITCH_RANGE),
                });
            }
            self.next_decision_at = now + f64::from(rng.gen_range(CHASE_REARM_SECS));
            return None;
        }

        if chance <= PATROL_TRIGGER_CHANCE && !ctx.source_busy {
            if ctx.distance_to_player > DISTANT_RANGE {
                self.next_decision_at = now;
                log::debug!("ambient cue: distant (roll {chance})");
                return Some(SoundCue {
                    band: SoundBand::Distant,
                    volume: DISTANT_VOLUME,
                    pitch: rng.gen_range(PITCH_RANGE),
                });
            }
            if ctx.distance_to_player > ctx.detection_dist
                && ctx.distance_to_player < DISTANT_RANGE
            {
                self.next_decision_at = now;
                log::debug!("ambient cue: closer (roll {chance})");
                return Some(SoundCue {
                    band: SoundBand::Closer,
                    volume: CLOSER_VOLUME,
                    pitch: rng.gen_range(PITCH_RANGE),
                });
            }
            // Player is inside the detection radius (or exactly on a band
            // edge): no band applies, but the loop must survive the frame.
            self.next_decision_at = now + f64::from(rng.gen_range(PATROL_REARM_SECS));
            return None;
        }

        self.next_decision_at = now + f64::from(rng.gen_range(PATROL_REARM_SECS));
        None
    }
}

impl Default for SoundScheduler {
    fn default() -> Self {
        Self::new()
    }
}
