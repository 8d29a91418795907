//! Level description loading and validation
//!
//! A scene is the one piece of durable configuration the gameplay code
//! consumes: an ASCII wall map, the two spawn points, the patrol route,
//! and the tuning constants. Supports RON (Rusty Object Notation) and
//! JSON. Routes are validated at load time so the patrol selection's
//! empty-slot skipping always terminates at runtime.

use std::fs;
use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::ai::pathfinding::NavGrid;

/// Map glyph for a blocked cell; every other glyph is open floor
const WALL_GLYPH: char = '#';

/// Movement and perception tuning, loaded with the scene
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Tuning {
    /// Player movement speed, units per second
    pub player_run_speed: f32,
    /// Player speed while the sprint button is held
    pub player_sprint_speed: f32,
    /// Enemy movement speed, units per second
    pub enemy_run_speed: f32,
    /// Radius within which the enemy senses the player without seeing them
    pub detection_dist: f32,
    /// Maximum line-of-sight raycast length
    pub vision_dist: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            player_run_speed: 20.0,
            player_sprint_speed: 5.0,
            enemy_run_speed: 2.0,
            detection_dist: 5.0,
            vision_dist: 12.0,
        }
    }
}

/// A loadable level: walls, spawns, patrol route, tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneDef {
    /// Scene name
    pub name: String,
    /// Scene version for compatibility
    pub version: u32,
    /// Wall map, one string per row; `#` is a wall, anything else is open
    pub map: Vec<String>,
    /// World size of one map cell
    pub cell_size: f32,
    /// Where the player starts
    pub player_spawn: Vec2,
    /// Where the enemy starts
    pub enemy_spawn: Vec2,
    /// Patrol waypoint slots; `None` slots are skipped during play
    pub patrol_route: Vec<Option<Vec2>>,
    /// Where the exit key lies, if the level has one
    #[serde(default)]
    pub exit_key: Option<Vec2>,
    /// Movement and perception constants
    pub tuning: Tuning,
}

impl SceneDef {
    /// Load a scene from a RON file and validate it
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated
    pub fn load_ron(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let content = fs::read_to_string(path).map_err(|e| SceneError::IoError(e.to_string()))?;
        let scene: SceneDef =
            ron::from_str(&content).map_err(|e| SceneError::DeserializeError(e.to_string()))?;
        scene.validate()?;
        Ok(scene)
    }

    /// Save the scene to a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialization fails
    pub fn save_ron(&self, path: impl AsRef<Path>) -> Result<(), SceneError> {
        let ron_string = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| SceneError::SerializeError(e.to_string()))?;
        fs::write(path, ron_string).map_err(|e| SceneError::IoError(e.to_string()))?;
        Ok(())
    }

    /// Load a scene from a JSON file and validate it
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let content = fs::read_to_string(path).map_err(|e| SceneError::IoError(e.to_string()))?;
        let scene: SceneDef = serde_json::from_str(&content)
            .map_err(|e| SceneError::DeserializeError(e.to_string()))?;
        scene.validate()?;
        Ok(scene)
    }

    /// Save the scene to a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialization fails
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), SceneError> {
        let json_string = serde_json::to_string_pretty(self)
            .map_err(|e| SceneError::SerializeError(e.to_string()))?;
        fs::write(path, json_string).map_err(|e| SceneError::IoError(e.to_string()))?;
        Ok(())
    }

    /// Map width in cells
    #[must_use]
    pub fn width(&self) -> usize {
        self.map.first().map_or(0, |row| row.chars().count())
    }

    /// Map height in cells
    #[must_use]
    pub fn height(&self) -> usize {
        self.map.len()
    }

    /// Build the navigation grid from the wall map.
    ///
    /// Row 0 of the map is the bottom of the world, so map rows and world
    /// y increase together.
    #[must_use]
    pub fn nav_grid(&self) -> NavGrid {
        let mut grid = NavGrid::new(self.width(), self.height(), self.cell_size);
        for (y, row) in self.map.iter().enumerate() {
            for (x, glyph) in row.chars().enumerate() {
                if glyph == WALL_GLYPH {
                    grid.set_walkable(x, y, false);
                }
            }
        }
        grid
    }

    /// Centers of every wall cell, for spawning static colliders
    pub fn wall_cells(&self) -> impl Iterator<Item = Vec2> + '_ {
        let cell_size = self.cell_size;
        self.map.iter().enumerate().flat_map(move |(y, row)| {
            row.chars().enumerate().filter_map(move |(x, glyph)| {
                (glyph == WALL_GLYPH).then(|| {
                    Vec2::new(
                        (x as f32 + 0.5) * cell_size,
                        (y as f32 + 0.5) * cell_size,
                    )
                })
            })
        })
    }

    /// Check the scene is playable.
    ///
    /// The patrol rules here are what lets the runtime skip empty slots
    /// with a plain loop: slot 0 must be set, and at least one slot in
    /// [2, len) must be set, so both the decrement walk and the random
    /// jump always find a waypoint.
    ///
    /// # Errors
    ///
    /// Returns the first rule the scene breaks
    pub fn validate(&self) -> Result<(), SceneError> {
        if self.map.is_empty() || self.width() == 0 {
            return Err(SceneError::InvalidMap("map is empty".into()));
        }
        let width = self.width();
        if let Some(bad) = self.map.iter().position(|row| row.chars().count() != width) {
            return Err(SceneError::InvalidMap(format!(
                "row {bad} is not {width} cells wide"
            )));
        }
        if self.cell_size <= 0.0 {
            return Err(SceneError::InvalidMap(format!(
                "cell size {} must be positive",
                self.cell_size
            )));
        }

        let grid = self.nav_grid();
        let mut placed = vec![
            ("player spawn", self.player_spawn),
            ("enemy spawn", self.enemy_spawn),
        ];
        if let Some(key) = self.exit_key {
            placed.push(("exit key", key));
        }
        for (what, pos) in placed {
            if !grid.is_world_walkable(pos) {
                return Err(SceneError::InvalidMap(format!(
                    "{what} ({}, {}) is not on open floor",
                    pos.x, pos.y
                )));
            }
        }

        let route = &self.patrol_route;
        if route.len() < 3 {
            return Err(SceneError::InvalidPatrolRoute(format!(
                "route has {} slots, need at least 3",
                route.len()
            )));
        }
        if route[0].is_none() {
            return Err(SceneError::InvalidPatrolRoute("slot 0 is empty".into()));
        }
        if route[2..].iter().all(Option::is_none) {
            return Err(SceneError::InvalidPatrolRoute(
                "every slot from 2 onward is empty, the random jump has no target".into(),
            ));
        }
        for (index, slot) in route.iter().enumerate() {
            if let Some(pos) = slot {
                if !grid.is_world_walkable(*pos) {
                    return Err(SceneError::InvalidPatrolRoute(format!(
                        "slot {index} ({}, {}) is not on open floor",
                        pos.x, pos.y
                    )));
                }
            }
        }

        Ok(())
    }

    /// The built-in demo level: a room with a dividing wall and a
    /// four-slot patrol route
    #[must_use]
    pub fn demo() -> Self {
        let map = vec![
            "############################".to_string(),
            "#..........................#".to_string(),
            "#..........................#".to_string(),
            "#..........#...............#".to_string(),
            "#..........#...............#".to_string(),
            "#..........#...............#".to_string(),
            "#..........#...............#".to_string(),
            "#..........#...............#".to_string(),
            "#..........................#".to_string(),
            "#..........................#".to_string(),
            "#..........................#".to_string(),
            "############################".to_string(),
        ];
        Self {
            name: "demo".into(),
            version: 1,
            map,
            cell_size: 2.0,
            player_spawn: Vec2::new(5.0, 5.0),
            enemy_spawn: Vec2::new(45.0, 17.0),
            patrol_route: vec![
                Some(Vec2::new(45.0, 5.0)),
                Some(Vec2::new(30.0, 17.0)),
                Some(Vec2::new(5.0, 17.0)),
                Some(Vec2::new(30.0, 5.0)),
            ],
            exit_key: Some(Vec2::new(50.0, 5.0)),
            tuning: Tuning::default(),
        }
    }
}

/// Errors that can occur during scene operations
#[derive(Debug, Clone)]
pub enum SceneError {
    /// IO error
    IoError(String),
    /// Serialization error
    SerializeError(String),
    /// Deserialization error
    DeserializeError(String),
    /// The wall map is malformed or a spawn sits inside a wall
    InvalidMap(String),
    /// The patrol route breaks a load-time rule
    InvalidPatrolRoute(String),
}

impl std::fmt::Display for SceneError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IoError(e) => write!(f, "IO error: {e}"),
            Self::SerializeError(e) => write!(f, "Serialization error: {e}"),
            Self::DeserializeError(e) => write!(f, "Deserialization error: {e}"),
            Self::InvalidMap(e) => write!(f, "Invalid map: {e}"),
            Self::InvalidPatrolRoute(e) => write!(f, "Invalid patrol route: {e}"),
        }
    }
}

impl std::error::Error for SceneError {}
