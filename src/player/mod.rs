//! Player module

mod controller;

pub use controller::PlayerController;
