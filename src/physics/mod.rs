//! Physics simulation module
//!
//! Built on top of rapier2d

mod world;

pub use world::{
    ColliderHandle, LAYER_ENEMY, LAYER_PLAYER, LAYER_WALLS, Physics, RaycastHit, RigidBodyHandle,
};
