//! Player movement, facing, and the flashlight mount
//!
//! Per-frame work (axis capture, pointer facing, flashlight placement)
//! runs on the frame clock; velocity is applied on the fixed step.

use glam::Vec2;
use hecs::Entity;

use crate::ecs::hierarchy::LocalTransform;
use crate::ecs::{SpriteAnim, World};
use crate::input::Input;

/// Scale applied to both axes when both are held, so diagonal movement
/// isn't faster than cardinal movement
const MOVE_LIMITER: f32 = 0.7;
/// Axis magnitude beyond which the walk cycle plays
const WALK_ANIM_THRESHOLD: f32 = 0.5;
/// Radius of the orbit the flashlight rides around the player
const LIGHT_ORBIT_RADIUS: f32 = 0.225;
/// Phase offset of the flashlight along its orbit, in degrees
const LIGHT_PHASE_DEG: f32 = 30.0;
/// Flashlight angle relative to the facing angle, in degrees
const LIGHT_ANGLE_OFFSET_DEG: f32 = 90.0;
/// Body sprite angle relative to the facing angle, in degrees
const SPRITE_ANGLE_OFFSET_DEG: f32 = -90.0;

/// Drives the player's body, sprite, and flashlight from input
#[derive(Debug)]
pub struct PlayerController {
    /// Default movement speed, units per second
    pub run_speed: f32,
    /// Speed while the sprint button is held
    pub sprint_speed: f32,
    /// Whether the exit key has been picked up
    pub picked_up_exit_key: bool,
    /// Axes captured on the frame clock, consumed by the fixed step
    move_axis: Vec2,
}

impl PlayerController {
    pub fn new(run_speed: f32, sprint_speed: f32) -> Self {
        Self {
            run_speed,
            sprint_speed,
            picked_up_exit_key: false,
            move_axis: Vec2::ZERO,
        }
    }

    /// Per-frame update: capture the movement axes, drive the walk
    /// animation, face away from the pointer, and place the flashlight
    /// on its orbit.
    pub fn update(&mut self, input: &Input, world: &mut World, player: Entity, flashlight: Entity) {
        self.move_axis = input.move_axis();

        let walking = self.move_axis.x.abs() > WALK_ANIM_THRESHOLD
            || self.move_axis.y.abs() > WALK_ANIM_THRESHOLD;

        // Facing runs from the pointer toward the view center, so the
        // character turns its back to the cursor and the light falls ahead.
        let diff = input.view_center() - input.pointer_world();
        let angle_rad = diff.y.atan2(diff.x);
        let angle_deg = angle_rad.to_degrees();

        if let Ok(mut anim) = world.get_mut::<SpriteAnim>(player) {
            anim.walking = walking;
            anim.angle_deg = angle_deg + SPRITE_ANGLE_OFFSET_DEG;
        }

        if let Ok(mut local) = world.get_mut::<LocalTransform>(flashlight) {
            local.rotation_deg = angle_deg + LIGHT_ANGLE_OFFSET_DEG;
            local.position = Self::light_orbit_position(angle_rad);
        }
    }

    /// Where the light sits for a facing angle, in the player's local frame
    #[must_use]
    pub fn light_orbit_position(angle_rad: f32) -> Vec2 {
        let phase = angle_rad + LIGHT_PHASE_DEG.to_radians();
        Vec2::new(
            -LIGHT_ORBIT_RADIUS * phase.cos(),
            -LIGHT_ORBIT_RADIUS * phase.sin(),
        )
    }

    /// Velocity to apply to the body this fixed step
    #[must_use]
    pub fn fixed_velocity(&self, input: &Input) -> Vec2 {
        let mut axis = self.move_axis;
        if axis.x != 0.0 && axis.y != 0.0 {
            axis *= MOVE_LIMITER;
        }

        let speed = if input.sprint_held() {
            self.sprint_speed
        } else {
            self.run_speed
        };
        axis * speed
    }
}
