//! The composed headless host
//!
//! A session owns everything one level needs: the entity world, the
//! physics world, the navigator worker, the two behavior controllers, the
//! event queue, and (optionally) the audio bank. The embedding shell
//! writes the input snapshot, calls [`Session::frame`] once per frame,
//! and reads the event queue; nothing else crosses the boundary.

use std::sync::Arc;

use glam::Vec2;
use hecs::Entity;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::ai::agent::{EnemyAgent, EnemyFrame, PatrolRoute};
use crate::ai::navigator::Navigator;
use crate::ai::sound::{MusicCue, music_cue};
use crate::audio::AudioBank;
use crate::core::scene::{SceneDef, SceneError};
use crate::core::time::{FIXED_TIMESTEP, Time};
use crate::core::{EventQueue, GameEvent};
use crate::ecs::hierarchy::{self, Children, LocalTransform, Parent};
use crate::ecs::{Name, SpriteAnim, Transform, Velocity, World};
use crate::input::Input;
use crate::physics::{
    ColliderHandle, LAYER_ENEMY, LAYER_PLAYER, LAYER_WALLS, Physics, RigidBodyHandle,
};
use crate::player::PlayerController;

/// Radius of the player and enemy bodies
const ACTOR_RADIUS: f32 = 0.5;
/// How close the player must be to pick up the exit key
const KEY_PICKUP_RADIUS: f32 = 1.0;

/// The scene-transition seam. Called exactly once when the enemy catches
/// the player.
pub trait SceneChanger {
    /// Switch to the failure scene
    fn fail_scene(&mut self);
}

/// A [`SceneChanger`] that only records the transition, for headless runs
#[derive(Debug, Default)]
pub struct NullSceneChanger {
    /// Whether the failure transition fired
    pub failed: bool,
}

impl SceneChanger for NullSceneChanger {
    fn fail_scene(&mut self) {
        self.failed = true;
        log::info!("fail scene triggered");
    }
}

/// One running level
pub struct Session {
    /// The entity world
    pub world: World,
    /// The input snapshot the shell writes into
    pub input: Input,
    physics: Physics,
    time: Time,
    events: EventQueue,
    navigator: Navigator,
    rng: ChaCha8Rng,
    audio: Option<AudioBank>,
    scene_changer: Box<dyn SceneChanger>,

    player: Entity,
    flashlight: Entity,
    enemy: Entity,
    exit_key: Option<Entity>,
    player_body: RigidBodyHandle,
    player_collider: ColliderHandle,
    enemy_body: RigidBodyHandle,
    enemy_collider: ColliderHandle,

    controller: PlayerController,
    agent: EnemyAgent,
    current_music: Option<MusicCue>,
    game_over: bool,
}

impl Session {
    /// Build a session from a scene description.
    ///
    /// # Errors
    ///
    /// Returns an error if the scene fails validation
    pub fn new(
        scene: &SceneDef,
        seed: u64,
        scene_changer: Box<dyn SceneChanger>,
    ) -> Result<Self, SceneError> {
        scene.validate()?;

        let mut world = World::new();
        let mut physics = Physics::new();
        let navigator = Navigator::new(Arc::new(scene.nav_grid()));

        let half_cell = Vec2::splat(scene.cell_size / 2.0);
        for center in scene.wall_cells() {
            let body = physics.create_static_body(center);
            physics.add_cuboid_collider(body, half_cell, LAYER_WALLS);
        }

        let player_body = physics.create_character_body(scene.player_spawn);
        let player_collider = physics.add_ball_collider(player_body, ACTOR_RADIUS, LAYER_PLAYER);
        let player = world.spawn((
            Transform::from_position(scene.player_spawn),
            Velocity::default(),
            SpriteAnim::default(),
            Name::new("Player"),
        ));
        let flashlight = world.spawn((
            Transform::from_position(scene.player_spawn),
            Parent::new(player),
            LocalTransform::default(),
            Name::new("Flashlight"),
        ));
        let _ = world.inner.insert_one(player, Children::single(flashlight));

        let enemy_body = physics.create_character_body(scene.enemy_spawn);
        let enemy_collider = physics.add_ball_collider(enemy_body, ACTOR_RADIUS, LAYER_ENEMY);
        let enemy = world.spawn((
            Transform::from_position(scene.enemy_spawn),
            Velocity::default(),
            SpriteAnim::default(),
            Name::new("Enemy"),
        ));

        let exit_key = scene.exit_key.map(|position| {
            world.spawn((Transform::from_position(position), Name::new("ExitKey")))
        });

        let controller = PlayerController::new(
            scene.tuning.player_run_speed,
            scene.tuning.player_sprint_speed,
        );
        let agent = EnemyAgent::new(
            scene.tuning.enemy_run_speed,
            scene.tuning.detection_dist,
            scene.tuning.vision_dist,
            PatrolRoute::new(scene.patrol_route.clone()),
        );

        let mut session = Self {
            world,
            input: Input::new(),
            physics,
            time: Time::new(),
            events: EventQueue::new(),
            navigator,
            rng: ChaCha8Rng::seed_from_u64(seed),
            audio: None,
            scene_changer,
            player,
            flashlight,
            enemy,
            exit_key,
            player_body,
            player_collider,
            enemy_body,
            enemy_collider,
            controller,
            agent,
            current_music: None,
            game_over: false,
        };
        session
            .agent
            .start_pathfinding(scene.enemy_spawn, &mut session.navigator);
        Ok(session)
    }

    /// Connect an audio bank; without one the session runs silent and the
    /// scheduler's busy gate reads as always free
    pub fn attach_audio(&mut self, audio: AudioBank) {
        self.audio = Some(audio);
    }

    /// Advance one frame: behaviors on the frame clock, movement and
    /// physics on the fixed step, then contact and event handling.
    pub fn frame(&mut self, dt: f32) {
        self.time.advance(dt);
        self.events.swap();

        self.adopt_paths();
        self.controller
            .update(&self.input, &mut self.world, self.player, self.flashlight);
        self.update_enemy();
        self.fixed_steps();
        self.sync_transforms();
        hierarchy::propagate(&mut self.world);
        self.check_contact();
        self.check_key_pickup();
        self.update_music();
    }

    /// Drain navigator completions into the agent
    fn adopt_paths(&mut self) {
        for reply in self.navigator.poll() {
            let request = reply.id;
            let waypoints = reply.result.as_ref().map_or(0, |path| path.len());
            if self.agent.handle_reply(reply) {
                self.events.push(GameEvent::PathAssigned {
                    enemy: self.enemy,
                    request,
                    waypoints,
                });
            }
        }
    }

    fn update_enemy(&mut self) {
        let position = self.physics.position(self.enemy_body).unwrap_or_default();
        let player_position = self.physics.position(self.player_body).unwrap_or_default();

        // The vision ray runs along the current movement direction and is
        // masked to the player layer alone, so walls do not block it; that
        // matches the blind-but-sharp-eared original.
        let sees_player = self
            .physics
            .cast_ray(
                position,
                self.agent.facing_dir(),
                self.agent.vision_dist,
                LAYER_PLAYER,
            )
            .is_some();

        let frame = EnemyFrame {
            position,
            player_position,
            sees_player,
            now: self.time.elapsed_seconds(),
            ambient_busy: self
                .audio
                .as_ref()
                .is_some_and(AudioBank::ambient_busy),
        };
        let report = self
            .agent
            .update(&frame, &mut self.navigator, &mut self.rng);

        if report.entered_chase {
            self.events.push(GameEvent::ModeChanged {
                enemy: self.enemy,
                chasing: true,
                last_known: Some(player_position),
            });
        }
        if report.gave_up {
            self.events.push(GameEvent::ModeChanged {
                enemy: self.enemy,
                chasing: false,
                last_known: None,
            });
        }
        if let Some(cue) = report.cue {
            self.events.push(GameEvent::SoundPlayed {
                enemy: self.enemy,
                cue,
            });
            if let Some(audio) = &mut self.audio {
                audio.play_cue(cue, &mut self.rng);
            }
        }
    }

    fn fixed_steps(&mut self) {
        while self.time.consume_fixed_step() {
            self.physics
                .set_linear_velocity(self.player_body, self.controller.fixed_velocity(&self.input));
            self.physics
                .set_linear_velocity(self.enemy_body, self.agent.fixed_velocity());
            self.physics.step(FIXED_TIMESTEP);
        }
    }

    /// Mirror body state back into the entity world
    fn sync_transforms(&mut self) {
        for (entity, body) in [(self.player, self.player_body), (self.enemy, self.enemy_body)] {
            if let Some(position) = self.physics.position(body) {
                self.world.set_position(entity, position);
            }
            if let Some(linear) = self.physics.linear_velocity(body) {
                if let Ok(mut velocity) = self.world.get_mut::<Velocity>(entity) {
                    velocity.linear = linear;
                }
            }
        }

        let facing = self.agent.facing_dir();
        if let Ok(mut tf) = self.world.get_mut::<Transform>(self.enemy) {
            tf.look_along(facing);
        }
        if let Ok(mut anim) = self.world.get_mut::<SpriteAnim>(self.enemy) {
            anim.walking = facing != Vec2::ZERO;
            if facing != Vec2::ZERO {
                anim.angle_deg = self.agent.sprite_angle_deg();
            }
        }
    }

    /// Physical contact between enemy and player ends the level
    fn check_contact(&mut self) {
        if self.game_over {
            return;
        }
        if self.physics.in_contact(self.player_collider, self.enemy_collider) {
            self.game_over = true;
            log::info!("the enemy caught the player");
            self.events.push(GameEvent::PlayerCaught {
                enemy: self.enemy,
                player: self.player,
            });
            self.scene_changer.fail_scene();
        }
    }

    fn check_key_pickup(&mut self) {
        let Some(key) = self.exit_key else { return };
        let Some(key_position) = self.world.position_of(key) else {
            return;
        };
        let Some(player_position) = self.world.position_of(self.player) else {
            return;
        };
        if player_position.distance(key_position) < KEY_PICKUP_RADIUS {
            self.controller.picked_up_exit_key = true;
            self.exit_key = None;
            let _ = self.world.despawn(key);
            log::info!("player picked up the exit key");
            self.events.push(GameEvent::KeyPickedUp {
                player: self.player,
            });
        }
    }

    fn update_music(&mut self) {
        let enemy = self.physics.position(self.enemy_body).unwrap_or_default();
        let player = self.physics.position(self.player_body).unwrap_or_default();
        let cue = music_cue(self.agent.mode().is_chasing(), enemy.distance(player));
        if self.current_music != Some(cue) {
            self.current_music = Some(cue);
            self.events.push(GameEvent::MusicChanged { cue });
            if let Some(audio) = &mut self.audio {
                audio.play_music(cue);
            }
        }
    }

    /// Events from the previous frame
    pub fn events(&self) -> impl Iterator<Item = &GameEvent> {
        self.events.iter()
    }

    /// The enemy behavior, for inspection
    #[must_use]
    pub fn enemy_agent(&self) -> &EnemyAgent {
        &self.agent
    }

    /// The player behavior, for inspection
    #[must_use]
    pub fn player_controller(&self) -> &PlayerController {
        &self.controller
    }

    /// The player entity
    #[must_use]
    pub fn player(&self) -> Entity {
        self.player
    }

    /// The enemy entity
    #[must_use]
    pub fn enemy(&self) -> Entity {
        self.enemy
    }

    /// The player's world position
    #[must_use]
    pub fn player_position(&self) -> Vec2 {
        self.physics.position(self.player_body).unwrap_or_default()
    }

    /// The enemy's world position
    #[must_use]
    pub fn enemy_position(&self) -> Vec2 {
        self.physics.position(self.enemy_body).unwrap_or_default()
    }

    /// Teleport the player body, for scripted scenarios
    pub fn set_player_position(&mut self, position: Vec2) {
        self.physics.set_position(self.player_body, position);
        self.world.set_position(self.player, position);
    }

    /// Teleport the enemy body, for scripted scenarios
    pub fn set_enemy_position(&mut self, position: Vec2) {
        self.physics.set_position(self.enemy_body, position);
        self.world.set_position(self.enemy, position);
    }

    /// Whether the failure transition has fired
    #[must_use]
    pub fn game_over(&self) -> bool {
        self.game_over
    }

    /// Session seconds elapsed
    #[must_use]
    pub fn elapsed_seconds(&self) -> f64 {
        self.time.elapsed_seconds()
    }

    /// The music layer currently selected
    #[must_use]
    pub fn current_music(&self) -> Option<MusicCue> {
        self.current_music
    }
}
