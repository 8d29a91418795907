//! A* pathfinding on a 2D grid
//!
//! Eight-directional grid navigation. Diagonal steps are only allowed when
//! both adjacent orthogonal cells are open, so routes never clip wall
//! corners. Failures are reported as errors so agents can discard them and
//! keep their previous route.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::f32::consts::SQRT_2;
use std::fmt;

use glam::Vec2;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Why a path request produced no route
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavError {
    /// An endpoint lies outside the grid
    OutOfBounds { x: i32, y: i32 },
    /// An endpoint sits on a blocked cell
    Blocked { x: i32, y: i32 },
    /// Both endpoints are valid but no route connects them
    NoRoute,
}

impl fmt::Display for NavError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfBounds { x, y } => write!(f, "endpoint ({x}, {y}) is outside the grid"),
            Self::Blocked { x, y } => write!(f, "endpoint ({x}, {y}) is on a blocked cell"),
            Self::NoRoute => write!(f, "no route between endpoints"),
        }
    }
}

impl std::error::Error for NavError {}

/// A 2D navigation grid
#[derive(Debug, Clone)]
pub struct NavGrid {
    /// Width in cells
    pub width: usize,
    /// Height in cells
    pub height: usize,
    /// Cell size in world units
    pub cell_size: f32,
    /// Walkable cells (true = walkable)
    cells: Vec<bool>,
    /// World origin offset
    pub origin: Vec2,
}

impl NavGrid {
    /// Create a new grid (all cells walkable by default)
    #[must_use]
    pub fn new(width: usize, height: usize, cell_size: f32) -> Self {
        Self {
            width,
            height,
            cell_size,
            cells: vec![true; width * height],
            origin: Vec2::ZERO,
        }
    }

    /// Set a cell's walkability
    pub fn set_walkable(&mut self, x: usize, y: usize, walkable: bool) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = walkable;
        }
    }

    /// Check if a cell is walkable
    #[must_use]
    pub fn is_walkable(&self, x: usize, y: usize) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        self.cells[y * self.width + x]
    }

    /// Check if a world position falls on a walkable cell
    #[must_use]
    pub fn is_world_walkable(&self, pos: Vec2) -> bool {
        let (x, y) = self.world_to_grid(pos);
        x >= 0 && y >= 0 && self.is_walkable(x as usize, y as usize)
    }

    /// Convert world position to grid coordinates
    #[must_use]
    pub fn world_to_grid(&self, pos: Vec2) -> (i32, i32) {
        let local = pos - self.origin;
        (
            (local.x / self.cell_size).floor() as i32,
            (local.y / self.cell_size).floor() as i32,
        )
    }

    /// Convert grid coordinates to world position (center of cell)
    #[must_use]
    pub fn grid_to_world(&self, x: usize, y: usize) -> Vec2 {
        self.origin
            + Vec2::new(
                (x as f32 + 0.5) * self.cell_size,
                (y as f32 + 0.5) * self.cell_size,
            )
    }

    fn walkable_signed(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && self.is_walkable(x as usize, y as usize)
    }

    /// Open neighbors of a cell with step costs. Diagonal steps require
    /// both adjacent orthogonal cells to be open.
    fn neighbors(&self, x: usize, y: usize) -> SmallVec<[(usize, usize, f32); 8]> {
        const ORTHO: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
        const DIAGONAL: [(i32, i32); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];

        let mut result = SmallVec::new();
        let (x, y) = (x as i32, y as i32);

        for (dx, dy) in ORTHO {
            if self.walkable_signed(x + dx, y + dy) {
                result.push(((x + dx) as usize, (y + dy) as usize, 1.0));
            }
        }
        for (dx, dy) in DIAGONAL {
            if self.walkable_signed(x + dx, y + dy)
                && self.walkable_signed(x + dx, y)
                && self.walkable_signed(x, y + dy)
            {
                result.push(((x + dx) as usize, (y + dy) as usize, SQRT_2));
            }
        }

        result
    }

    /// Find a route between two world positions using A*.
    pub fn find_path(&self, start: Vec2, goal: Vec2) -> Result<NavPath, NavError> {
        let (sx, sy) = self.world_to_grid(start);
        let (gx, gy) = self.world_to_grid(goal);

        for &(x, y) in &[(sx, sy), (gx, gy)] {
            if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
                return Err(NavError::OutOfBounds { x, y });
            }
            if !self.is_walkable(x as usize, y as usize) {
                return Err(NavError::Blocked { x, y });
            }
        }

        let (start_cell, goal_cell) = ((sx as usize, sy as usize), (gx as usize, gy as usize));

        // Octile distance, admissible for unit/sqrt(2) step costs
        let heuristic = |x: usize, y: usize| -> f32 {
            let dx = (x as f32 - goal_cell.0 as f32).abs();
            let dy = (y as f32 - goal_cell.1 as f32).abs();
            dx.max(dy) + (SQRT_2 - 1.0) * dx.min(dy)
        };

        let mut open_set = BinaryHeap::new();
        let mut came_from: FxHashMap<(usize, usize), (usize, usize)> = FxHashMap::default();
        let mut g_score: FxHashMap<(usize, usize), f32> = FxHashMap::default();

        g_score.insert(start_cell, 0.0);
        open_set.push(Node {
            x: start_cell.0,
            y: start_cell.1,
            g_cost: 0.0,
            f_cost: heuristic(start_cell.0, start_cell.1),
        });

        while let Some(current) = open_set.pop() {
            let cell = (current.x, current.y);

            // Superseded queue entry
            if current.g_cost > *g_score.get(&cell).unwrap_or(&f32::MAX) {
                continue;
            }

            if cell == goal_cell {
                let mut cells = vec![cell];
                let mut cursor = cell;
                while let Some(&prev) = came_from.get(&cursor) {
                    cells.push(prev);
                    cursor = prev;
                }
                cells.reverse();

                let waypoints: Vec<Vec2> = cells
                    .iter()
                    .map(|&(x, y)| self.grid_to_world(x, y))
                    .collect();
                let length = path_length(&waypoints);

                return Ok(NavPath { waypoints, length });
            }

            for (nx, ny, step_cost) in self.neighbors(current.x, current.y) {
                let tentative_g = current.g_cost + step_cost;

                if tentative_g < *g_score.get(&(nx, ny)).unwrap_or(&f32::MAX) {
                    came_from.insert((nx, ny), cell);
                    g_score.insert((nx, ny), tentative_g);

                    open_set.push(Node {
                        x: nx,
                        y: ny,
                        g_cost: tentative_g,
                        f_cost: tentative_g + heuristic(nx, ny),
                    });
                }
            }
        }

        Err(NavError::NoRoute)
    }
}

/// A computed route in world coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct NavPath {
    /// Waypoints in world coordinates, from the start cell to the goal cell
    pub waypoints: Vec<Vec2>,
    /// Total route length
    pub length: f32,
}

impl NavPath {
    /// Number of waypoints
    #[must_use]
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Check if the route has no waypoints
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }
}

/// A* node for priority queue
#[derive(Debug, Clone)]
struct Node {
    x: usize,
    y: usize,
    g_cost: f32, // Cost from start
    f_cost: f32, // g_cost + heuristic
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.x == other.x && self.y == other.y
    }
}

impl Eq for Node {}

impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse for min-heap
        other
            .f_cost
            .partial_cmp(&self.f_cost)
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Total polyline length
fn path_length(waypoints: &[Vec2]) -> f32 {
    let mut length = 0.0;
    for i in 1..waypoints.len() {
        length += waypoints[i].distance(waypoints[i - 1]);
    }
    length
}
