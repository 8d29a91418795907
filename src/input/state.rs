//! Input handling
//!
//! A polled snapshot the host writes into each frame: smoothed movement
//! axes, the sprint button, and the pointer position in world space.
//! Gameplay code only ever reads it, so scripted hosts and tests can
//! drive a session without a window.

use glam::Vec2;

/// Input state manager
#[derive(Debug, Clone, Copy)]
pub struct Input {
    /// Smoothed movement axes, each in [-1, 1]
    move_axis: Vec2,
    /// Whether the sprint button is held
    sprint_held: bool,
    /// Pointer position in world space
    pointer_world: Vec2,
    /// World-space point the view is centered on, used as the facing origin
    view_center: Vec2,
}

impl Input {
    /// Create a new input snapshot with everything at rest
    pub fn new() -> Self {
        Self {
            move_axis: Vec2::ZERO,
            sprint_held: false,
            pointer_world: Vec2::ZERO,
            view_center: Vec2::ZERO,
        }
    }

    /// Set the movement axes; each component is clamped to [-1, 1]
    pub fn set_move_axis(&mut self, axis: Vec2) {
        self.move_axis = axis.clamp(Vec2::splat(-1.0), Vec2::splat(1.0));
    }

    /// Set whether the sprint button is held
    pub fn set_sprint_held(&mut self, held: bool) {
        self.sprint_held = held;
    }

    /// Set the pointer position in world space
    pub fn set_pointer_world(&mut self, position: Vec2) {
        self.pointer_world = position;
    }

    /// Set the world-space point the view is centered on
    pub fn set_view_center(&mut self, center: Vec2) {
        self.view_center = center;
    }

    /// Get the movement axes
    pub fn move_axis(&self) -> Vec2 {
        self.move_axis
    }

    /// Check if the sprint button is held
    pub fn sprint_held(&self) -> bool {
        self.sprint_held
    }

    /// Get the pointer position in world space
    pub fn pointer_world(&self) -> Vec2 {
        self.pointer_world
    }

    /// Get the view center in world space
    pub fn view_center(&self) -> Vec2 {
        self.view_center
    }
}

impl Default for Input {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axes_are_clamped() {
        let mut input = Input::new();
        input.set_move_axis(Vec2::new(3.0, -7.5));
        assert_eq!(input.move_axis(), Vec2::new(1.0, -1.0));
    }

    #[test]
    fn defaults_are_at_rest() {
        let input = Input::default();
        assert_eq!(input.move_axis(), Vec2::ZERO);
        assert!(!input.sprint_held());
    }
}
