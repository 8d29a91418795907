//! Physics simulation using rapier2d
//!
//! Top-down world: gravity is zero, actors are velocity-driven dynamic
//! bodies with rotation locked, and colliders carry layer groups so
//! raycasts can be masked to walls and the player.

use glam::Vec2;
use rapier2d::prelude::*;

/// Handle to a rigid body in the physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RigidBodyHandle(pub rapier2d::dynamics::RigidBodyHandle);

/// Handle to a collider in the physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColliderHandle(pub rapier2d::geometry::ColliderHandle);

/// Collision layer of level geometry
pub const LAYER_WALLS: Group = Group::GROUP_1;
/// Collision layer of the player body
pub const LAYER_PLAYER: Group = Group::GROUP_2;
/// Collision layer of enemy bodies
pub const LAYER_ENEMY: Group = Group::GROUP_3;

/// Physics world manager
pub struct Physics {
    /// Gravity vector; zero in a top-down world
    pub gravity: Vec2,
    /// Physics pipeline
    pipeline: PhysicsPipeline,
    /// Island manager
    island_manager: IslandManager,
    /// Broad phase
    broad_phase: DefaultBroadPhase,
    /// Narrow phase
    narrow_phase: NarrowPhase,
    /// Rigid body set
    rigid_body_set: RigidBodySet,
    /// Collider set
    collider_set: ColliderSet,
    /// Impulse joint set
    impulse_joint_set: ImpulseJointSet,
    /// Multibody joint set
    multibody_joint_set: MultibodyJointSet,
    /// CCD solver
    ccd_solver: CCDSolver,
    /// Query pipeline for raycasting
    query_pipeline: QueryPipeline,
    /// Integration parameters
    integration_parameters: IntegrationParameters,
}

impl Physics {
    /// Create a new physics world with no gravity
    pub fn new() -> Self {
        Self::with_gravity(Vec2::ZERO)
    }

    /// Create a new physics world with custom gravity
    pub fn with_gravity(gravity: Vec2) -> Self {
        Self {
            gravity,
            pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            integration_parameters: IntegrationParameters::default(),
        }
    }

    /// Step the physics simulation
    pub fn step(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;

        self.pipeline.step(
            &vector![self.gravity.x, self.gravity.y],
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
    }

    /// Create a static rigid body (doesn't move)
    pub fn create_static_body(&mut self, position: Vec2) -> RigidBodyHandle {
        let body = RigidBodyBuilder::fixed()
            .translation(vector![position.x, position.y])
            .build();

        RigidBodyHandle(self.rigid_body_set.insert(body))
    }

    /// Create a velocity-driven actor body with rotation locked
    pub fn create_character_body(&mut self, position: Vec2) -> RigidBodyHandle {
        let body = RigidBodyBuilder::dynamic()
            .translation(vector![position.x, position.y])
            .lock_rotations()
            .build();

        RigidBodyHandle(self.rigid_body_set.insert(body))
    }

    /// Add a box collider to a rigid body, tagged with a collision layer
    pub fn add_cuboid_collider(
        &mut self,
        body: RigidBodyHandle,
        half_extents: Vec2,
        layer: Group,
    ) -> ColliderHandle {
        let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y)
            .collision_groups(InteractionGroups::new(layer, Group::ALL))
            .build();

        ColliderHandle(self.collider_set.insert_with_parent(
            collider,
            body.0,
            &mut self.rigid_body_set,
        ))
    }

    /// Add a circle collider to a rigid body, tagged with a collision layer.
    ///
    /// Actor colliders are frictionless so bodies slide along walls
    /// instead of sticking to them.
    pub fn add_ball_collider(
        &mut self,
        body: RigidBodyHandle,
        radius: f32,
        layer: Group,
    ) -> ColliderHandle {
        let collider = ColliderBuilder::ball(radius)
            .collision_groups(InteractionGroups::new(layer, Group::ALL))
            .friction(0.0)
            .build();

        ColliderHandle(self.collider_set.insert_with_parent(
            collider,
            body.0,
            &mut self.rigid_body_set,
        ))
    }

    /// Get the position of a rigid body
    pub fn position(&self, body: RigidBodyHandle) -> Option<Vec2> {
        self.rigid_body_set.get(body.0).map(|rb| {
            let pos = rb.translation();
            Vec2::new(pos.x, pos.y)
        })
    }

    /// Teleport a rigid body to a position
    pub fn set_position(&mut self, body: RigidBodyHandle, position: Vec2) {
        if let Some(rb) = self.rigid_body_set.get_mut(body.0) {
            rb.set_translation(vector![position.x, position.y], true);
        }
    }

    /// Set the linear velocity of a body
    pub fn set_linear_velocity(&mut self, body: RigidBodyHandle, velocity: Vec2) {
        if let Some(rb) = self.rigid_body_set.get_mut(body.0) {
            rb.set_linvel(vector![velocity.x, velocity.y], true);
        }
    }

    /// Get the linear velocity of a body
    pub fn linear_velocity(&self, body: RigidBodyHandle) -> Option<Vec2> {
        self.rigid_body_set.get(body.0).map(|rb| {
            let vel = rb.linvel();
            Vec2::new(vel.x, vel.y)
        })
    }

    /// Cast a ray and return the first hit among colliders whose layer
    /// intersects `mask`.
    ///
    /// Returns `None` for a zero direction.
    pub fn cast_ray(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        mask: Group,
    ) -> Option<RaycastHit> {
        let direction = direction.normalize_or_zero();
        if direction == Vec2::ZERO {
            return None;
        }
        let ray = Ray::new(
            point![origin.x, origin.y],
            vector![direction.x, direction.y],
        );
        let filter = QueryFilter::default().groups(InteractionGroups::new(Group::ALL, mask));

        self.query_pipeline
            .cast_ray(
                &self.rigid_body_set,
                &self.collider_set,
                &ray,
                max_distance,
                true,
                filter,
            )
            .map(|(handle, distance)| {
                let point = ray.point_at(distance);
                RaycastHit {
                    collider: ColliderHandle(handle),
                    point: Vec2::new(point.x, point.y),
                    distance,
                }
            })
    }

    /// Check whether two colliders are currently touching
    pub fn in_contact(&self, a: ColliderHandle, b: ColliderHandle) -> bool {
        self.narrow_phase
            .contact_pair(a.0, b.0)
            .is_some_and(|pair| pair.has_any_active_contact)
    }
}

impl Default for Physics {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of a raycast
#[derive(Debug, Clone)]
pub struct RaycastHit {
    /// The collider that was hit
    pub collider: ColliderHandle,
    /// The point of intersection
    pub point: Vec2,
    /// Distance from ray origin
    pub distance: f32,
}
