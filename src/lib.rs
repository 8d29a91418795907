//! Gameplay core for a 2D top-down stealth/horror game
//!
//! Two behaviors drive the game: a player controller (movement, pointer
//! facing, flashlight placement) and an enemy agent (patrol, detection,
//! chase, pathfinding, ambient sounds). Everything around them is the
//! minimal headless host they need:
//! - Entity world built on hecs
//! - Physics queries and movement via rapier2d
//! - Asynchronous grid pathfinding on a worker thread
//! - Audio playback with rodio, behind a testable decision layer

pub mod ai;
pub mod audio;
pub mod core;
pub mod ecs;
pub mod game;
pub mod input;
pub mod physics;
pub mod player;

// Re-exports for convenience
pub use glam;
pub use hecs;
pub use rapier2d;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::ai::{EnemyAgent, Mode, MusicCue, Navigator, PatrolRoute, SoundCue};
    pub use crate::core::{EventQueue, GameEvent, SceneDef, SceneError, Time};
    pub use crate::ecs::{Name, SpriteAnim, Transform, Velocity, World};
    pub use crate::game::{NullSceneChanger, SceneChanger, Session};
    pub use crate::input::Input;
    pub use crate::physics::{ColliderHandle, Physics, RigidBodyHandle};
    pub use crate::player::PlayerController;
    pub use glam::Vec2;
}
