//! Entity hierarchy components
//!
//! Provides parent-child relationships between entities for transform propagation.
//! The flashlight rides the player this way: its local offset and angle are
//! rewritten every frame and folded into a world transform here.

use glam::Vec2;
use hecs::Entity;
use smallvec::SmallVec;

use crate::ecs::components::Transform;
use crate::ecs::world::World;

/// Parent component - indicates this entity has a parent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parent(pub Entity);

impl Parent {
    /// Create a new parent reference
    #[must_use]
    pub const fn new(entity: Entity) -> Self {
        Self(entity)
    }

    /// Get the parent entity
    #[must_use]
    pub const fn entity(&self) -> Entity {
        self.0
    }
}

/// Children component - tracks all children of this entity
#[derive(Debug, Clone, Default)]
pub struct Children(pub SmallVec<[Entity; 4]>);

impl Children {
    /// Create an empty children list
    #[must_use]
    pub fn new() -> Self {
        Self(SmallVec::new())
    }

    /// Create from a single child
    #[must_use]
    pub fn single(child: Entity) -> Self {
        let mut children = SmallVec::new();
        children.push(child);
        Self(children)
    }

    /// Add a child
    pub fn add(&mut self, child: Entity) {
        if !self.0.contains(&child) {
            self.0.push(child);
        }
    }

    /// Remove a child
    pub fn remove(&mut self, child: Entity) -> bool {
        if let Some(pos) = self.0.iter().position(|&e| e == child) {
            self.0.remove(pos);
            true
        } else {
            false
        }
    }

    /// Check if this entity has children
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get the number of children
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over children
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.0.iter()
    }
}

/// Offset and angle relative to the parent entity
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LocalTransform {
    /// Offset from the parent, in the parent's frame
    pub position: Vec2,
    /// Angle added on top of the parent's facing, in degrees
    pub rotation_deg: f32,
}

impl LocalTransform {
    /// Create from an offset with no extra rotation
    #[must_use]
    pub fn from_position(position: Vec2) -> Self {
        Self {
            position,
            rotation_deg: 0.0,
        }
    }
}

/// Recompute world transforms of parented entities.
///
/// Single-level: a child's world transform is its parent's transform with
/// the local offset rotated into the parent's frame. Runs after physics
/// sync so children trail their parent by zero frames.
pub fn propagate(world: &mut World) {
    let mut updates: Vec<(Entity, Vec2, f32)> = Vec::new();
    {
        let mut query = world.query::<(&Parent, &LocalTransform)>();
        for (entity, (parent, local)) in query.iter() {
            if let Ok(parent_tf) = world.get::<Transform>(parent.0) {
                let offset = Vec2::from_angle(parent_tf.rotation_rad()).rotate(local.position);
                updates.push((
                    entity,
                    parent_tf.position + offset,
                    parent_tf.rotation_deg + local.rotation_deg,
                ));
            }
        }
    }
    for (entity, position, rotation_deg) in updates {
        if let Ok(mut tf) = world.get_mut::<Transform>(entity) {
            tf.position = position;
            tf.rotation_deg = rotation_deg;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_children_add_remove() {
        let mut world = hecs::World::new();
        let entity1 = world.spawn(());
        let entity2 = world.spawn(());

        let mut children = Children::new();

        children.add(entity1);
        children.add(entity2);
        assert_eq!(children.len(), 2);

        // No duplicates
        children.add(entity1);
        assert_eq!(children.len(), 2);

        children.remove(entity1);
        assert_eq!(children.len(), 1);
    }

    #[test]
    fn test_propagate_offsets_child() {
        let mut world = World::new();
        let parent = world.spawn((Transform::from_position(Vec2::new(10.0, 5.0)),));
        let child = world.spawn((
            Transform::new(),
            Parent::new(parent),
            LocalTransform::from_position(Vec2::new(1.0, 0.0)),
        ));
        world
            .get_mut::<Children>(parent)
            .map(|mut c| c.add(child))
            .ok();

        propagate(&mut world);

        let tf = world.get::<Transform>(child).unwrap();
        assert!(tf.position.abs_diff_eq(Vec2::new(11.0, 5.0), 1e-5));
    }

    #[test]
    fn test_propagate_rotates_offset_into_parent_frame() {
        let mut world = World::new();
        let mut parent_tf = Transform::from_position(Vec2::ZERO);
        parent_tf.rotation_deg = 90.0;
        let parent = world.spawn((parent_tf,));
        let child = world.spawn((
            Transform::new(),
            Parent::new(parent),
            LocalTransform {
                position: Vec2::new(2.0, 0.0),
                rotation_deg: 45.0,
            },
        ));

        propagate(&mut world);

        let tf = world.get::<Transform>(child).unwrap();
        assert!(tf.position.abs_diff_eq(Vec2::new(0.0, 2.0), 1e-5));
        assert!((tf.rotation_deg - 135.0).abs() < 1e-4);
    }
}
