//! Input handling module

mod state;

pub use state::Input;
