//! Common ECS components

use glam::Vec2;

/// Transform component for 2D position and facing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Position in world space
    pub position: Vec2,
    /// Facing angle in degrees, counter-clockwise from +X
    pub rotation_deg: f32,
}

impl Transform {
    /// Create a new transform at the origin
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transform with just a position
    pub fn from_position(position: Vec2) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Facing angle in radians
    pub fn rotation_rad(&self) -> f32 {
        self.rotation_deg.to_radians()
    }

    /// Get the forward direction (unit vector along the facing angle)
    pub fn forward(&self) -> Vec2 {
        Vec2::from_angle(self.rotation_rad())
    }

    /// Translate by a delta
    pub fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }

    /// Face along a direction vector; zero vectors leave the facing unchanged
    pub fn look_along(&mut self, direction: Vec2) {
        if direction != Vec2::ZERO {
            self.rotation_deg = direction.y.atan2(direction.x).to_degrees();
        }
    }

    /// Distance to a world-space point
    pub fn distance_to(&self, point: Vec2) -> f32 {
        self.position.distance(point)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            rotation_deg: 0.0,
        }
    }
}

/// Velocity component, mirrored from the physics body after each step
#[derive(Debug, Clone, Copy, Default)]
pub struct Velocity {
    pub linear: Vec2,
}

/// Sprite state a renderer would consume: the walk-cycle flag and the
/// view angle of the sprite, which turns independently of the root
/// transform.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpriteAnim {
    /// Whether the walk cycle is playing
    pub walking: bool,
    /// Sprite orientation in degrees
    pub angle_deg: f32,
}

/// Name component for debugging
#[derive(Debug, Clone)]
pub struct Name(pub String);

impl Name {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_tracks_rotation() {
        let mut tf = Transform::new();
        assert!(tf.forward().abs_diff_eq(Vec2::X, 1e-6));
        tf.rotation_deg = 90.0;
        assert!(tf.forward().abs_diff_eq(Vec2::Y, 1e-6));
    }

    #[test]
    fn look_along_ignores_zero() {
        let mut tf = Transform::new();
        tf.look_along(Vec2::new(0.0, -1.0));
        assert!((tf.rotation_deg - (-90.0)).abs() < 1e-4);
        tf.look_along(Vec2::ZERO);
        assert!((tf.rotation_deg - (-90.0)).abs() < 1e-4);
    }
}
