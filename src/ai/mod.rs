//! Enemy AI: grid pathfinding, the async navigator, the pursuit agent,
//! and the ambient sound scheduler

pub mod agent;
pub mod navigator;
pub mod pathfinding;
pub mod sound;

pub use agent::{ARRIVAL_RADIUS, EnemyAgent, EnemyFrame, EnemyUpdate, Mode, PatrolRoute};
pub use navigator::{Navigator, PathReply, PathRequestId};
pub use pathfinding::{NavError, NavGrid, NavPath};
pub use sound::{MusicCue, SoundBand, SoundContext, SoundCue, SoundScheduler, music_cue};
