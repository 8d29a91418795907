//! Session composition: world, physics, navigation, behaviors, audio

mod session;

pub use session::{NullSceneChanger, SceneChanger, Session};
