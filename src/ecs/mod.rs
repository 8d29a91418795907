//! Entity Component System module
//!
//! Built on top of the hecs ECS library

mod components;
pub mod hierarchy;
mod world;

pub use components::{Name, SpriteAnim, Transform, Velocity};
pub use hierarchy::{Children, LocalTransform, Parent};
pub use world::World;
