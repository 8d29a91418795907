//! Core module: frame timing, the event queue, and scene loading

mod events;
pub mod scene;
pub mod time;

pub use events::{EventQueue, GameEvent};
pub use scene::{SceneDef, SceneError, Tuning};
pub use time::{FIXED_TIMESTEP, MAX_FRAME_TIME, Time};
