//! The enemy: detection, mode switching, path following, patrol selection
//!
//! The agent is deliberately engine-blind. Each frame the session hands it
//! what it perceives (its own position, the player's position, whether the
//! vision ray hit) and it answers with a movement direction and any events
//! that fired. Navigation goes through the [`Navigator`]; completions are
//! matched by request id so a stale route can never overwrite the one that
//! superseded it.

use glam::Vec2;
use rand::Rng;

use crate::ai::navigator::{Navigator, PathReply, PathRequestId};
use crate::ai::pathfinding::NavPath;
use crate::ai::sound::{SoundContext, SoundCue, SoundScheduler};

/// Distance at which a waypoint counts as reached
pub const ARRIVAL_RADIUS: f32 = 3.0;

/// Behavior mode. The last-known player position lives inside `Chase` so
/// it cannot outlive the mode that needs it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mode {
    /// Walking the patrol route
    Patrol,
    /// Heading for where the player was last seen or sensed
    Chase {
        /// Player position at the most recent frame the detection held
        last_known: Vec2,
    },
}

impl Mode {
    /// Whether the agent is currently chasing
    #[must_use]
    pub fn is_chasing(&self) -> bool {
        matches!(self, Self::Chase { .. })
    }
}

/// The patrol route and its cursor.
///
/// Selection is asymmetric on purpose: the cursor walks backward toward
/// slot 0, then jumps to a random slot at index 2 or beyond. Empty slots
/// are skipped with a plain loop; scene validation guarantees slot 0 is
/// set and the jump always has a candidate, so both walks terminate.
#[derive(Debug, Clone)]
pub struct PatrolRoute {
    slots: Vec<Option<Vec2>>,
    cursor: usize,
}

impl PatrolRoute {
    /// Wrap a validated slot list; the cursor starts at slot 0
    #[must_use]
    pub fn new(slots: Vec<Option<Vec2>>) -> Self {
        Self { slots, cursor: 0 }
    }

    /// Current cursor index
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of slots, counting empty ones
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the route has no slots
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// The waypoint under the cursor. The cursor only ever rests on a set
    /// slot, so the fallback is unreachable on a validated route.
    #[must_use]
    pub fn current(&self) -> Vec2 {
        self.slots.get(self.cursor).copied().flatten().unwrap_or_default()
    }

    /// Pick the next patrol waypoint after an end-of-path.
    ///
    /// Cursor above 0: step backward to the nearest set slot. Cursor at 0
    /// with a non-player target: jump to a uniformly random set slot at
    /// index 2 or beyond. Cursor at 0 while the target was the player (a
    /// chase that just ended there): stay on slot 0.
    pub fn advance(&mut self, target_was_player: bool, rng: &mut impl Rng) -> Vec2 {
        if self.cursor > 0 {
            loop {
                self.cursor -= 1;
                if self.cursor == 0 || self.slots[self.cursor].is_some() {
                    break;
                }
            }
        } else if !target_was_player {
            let candidates: Vec<usize> = (2..self.slots.len())
                .filter(|&index| self.slots[index].is_some())
                .collect();
            if let Some(&jump) = candidates.get(rng.gen_range(0..candidates.len().max(1))) {
                self.cursor = jump;
            }
        }
        self.current()
    }
}

/// What the agent perceives this frame, assembled by the session
#[derive(Debug, Clone, Copy)]
pub struct EnemyFrame {
    /// The agent's own world position
    pub position: Vec2,
    /// The player's world position
    pub player_position: Vec2,
    /// Whether the vision raycast hit the player this frame
    pub sees_player: bool,
    /// Session seconds, drives the sound scheduler's deadlines
    pub now: f64,
    /// Whether the agent's one-shot audio source is still playing
    pub ambient_busy: bool,
}

/// What changed during one update, for the session to turn into events
#[derive(Debug, Clone, Copy, Default)]
pub struct EnemyUpdate {
    /// The agent switched from patrol to chase this frame
    pub entered_chase: bool,
    /// The agent reached the end of a chase path and gave up
    pub gave_up: bool,
    /// The ambient scheduler fired a clip
    pub cue: Option<SoundCue>,
}

/// The pursuing enemy
#[derive(Debug)]
pub struct EnemyAgent {
    /// Movement speed, units per second
    pub run_speed: f32,
    /// Radius within which the player is sensed without line of sight
    pub detection_dist: f32,
    /// Maximum vision raycast length
    pub vision_dist: f32,
    route: PatrolRoute,
    mode: Mode,
    /// Current navigation goal; `None` until the agent is armed
    target: Option<Vec2>,
    path: Option<NavPath>,
    waypoint_cursor: usize,
    /// Latched on final-waypoint arrival, cleared when a path is adopted
    reached_end: bool,
    pending_request: Option<PathRequestId>,
    /// Direction captured on the frame clock, consumed by the fixed step
    move_dir: Vec2,
    /// Ease-in factor, below 1.0 only on an arrival frame
    speed_factor: f32,
    scheduler: SoundScheduler,
}

impl EnemyAgent {
    /// Create an inert agent; call [`start_pathfinding`](Self::start_pathfinding)
    /// once the scene is ready
    #[must_use]
    pub fn new(run_speed: f32, detection_dist: f32, vision_dist: f32, route: PatrolRoute) -> Self {
        Self {
            run_speed,
            detection_dist,
            vision_dist,
            route,
            mode: Mode::Patrol,
            target: None,
            path: None,
            waypoint_cursor: 0,
            reached_end: false,
            pending_request: None,
            move_dir: Vec2::ZERO,
            speed_factor: 0.0,
            scheduler: SoundScheduler::new(),
        }
    }

    /// Arm the agent: target the first patrol waypoint and request a route
    pub fn start_pathfinding(&mut self, position: Vec2, navigator: &mut Navigator) {
        let goal = self.route.current();
        self.set_target(goal, position, navigator);
    }

    /// Current behavior mode
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Current patrol cursor index
    #[must_use]
    pub fn patrol_cursor(&self) -> usize {
        self.route.cursor()
    }

    /// Index of the waypoint the agent is heading for
    #[must_use]
    pub fn waypoint_cursor(&self) -> usize {
        self.waypoint_cursor
    }

    /// Whether the agent is holding at the end of its route
    #[must_use]
    pub fn reached_end(&self) -> bool {
        self.reached_end
    }

    /// Id of the outstanding path request, if any
    #[must_use]
    pub fn pending_request(&self) -> Option<PathRequestId> {
        self.pending_request
    }

    /// Current navigation goal
    #[must_use]
    pub fn current_target(&self) -> Option<Vec2> {
        self.target
    }

    /// Direction the agent is looking, the vision ray runs along this
    #[must_use]
    pub fn facing_dir(&self) -> Vec2 {
        self.move_dir
    }

    /// Sprite orientation in degrees: movement angle plus 90
    #[must_use]
    pub fn sprite_angle_deg(&self) -> f32 {
        self.move_dir.y.atan2(self.move_dir.x).to_degrees() + 90.0
    }

    /// Velocity to apply to the body this fixed step
    #[must_use]
    pub fn fixed_velocity(&self) -> Vec2 {
        self.move_dir * self.run_speed * self.speed_factor
    }

    /// Offer a pathfinding completion.
    ///
    /// Only the reply matching the outstanding request id is considered;
    /// anything else is stale and dropped. Errored results are discarded
    /// and the current route stays in use.
    pub fn handle_reply(&mut self, reply: PathReply) -> bool {
        if self.pending_request != Some(reply.id) {
            log::debug!("dropping stale path reply {}", reply.id);
            return false;
        }
        self.pending_request = None;
        match reply.result {
            Ok(path) if !path.is_empty() => {
                self.path = Some(path);
                self.waypoint_cursor = 0;
                self.reached_end = false;
                true
            }
            Ok(_) => {
                log::debug!("discarding empty path from request {}", reply.id);
                false
            }
            Err(error) => {
                log::debug!("discarding failed path from request {}: {error}", reply.id);
                false
            }
        }
    }

    /// One frame of behavior: detection, path following, target
    /// re-selection, and the ambient sound decision.
    pub fn update(
        &mut self,
        frame: &EnemyFrame,
        navigator: &mut Navigator,
        rng: &mut impl Rng,
    ) -> EnemyUpdate {
        let mut report = EnemyUpdate::default();

        self.detect(frame, navigator, &mut report);
        self.follow_path(frame, navigator, rng, &mut report);

        let cue = self.scheduler.poll(
            frame.now,
            &SoundContext {
                chasing: self.mode.is_chasing(),
                distance_to_player: frame.position.distance(frame.player_position),
                detection_dist: self.detection_dist,
                source_busy: frame.ambient_busy,
            },
            rng,
        );
        report.cue = cue;

        report
    }

    /// Detection ORs the blind radius with the vision ray. Either keeps
    /// refreshing the last-known position while it holds.
    fn detect(&mut self, frame: &EnemyFrame, navigator: &mut Navigator, report: &mut EnemyUpdate) {
        let distance = frame.position.distance(frame.player_position);
        if distance < self.detection_dist || frame.sees_player {
            if !self.mode.is_chasing() {
                report.entered_chase = true;
                log::info!(
                    "enemy spotted the player at ({:.1}, {:.1})",
                    frame.player_position.x,
                    frame.player_position.y
                );
            }
            self.mode = Mode::Chase {
                last_known: frame.player_position,
            };
            self.set_target(frame.player_position, frame.position, navigator);
        } else if !self.mode.is_chasing() && self.target.is_some() {
            // Patrol re-target; a no-op unless the route cursor moved
            self.set_target(self.route.current(), frame.position, navigator);
        }
    }

    /// Walk the current route. Consumes every waypoint within the arrival
    /// radius in one frame; final-waypoint arrival latches `reached_end`
    /// once, picks the next patrol target, and ends any chase.
    fn follow_path(
        &mut self,
        frame: &EnemyFrame,
        navigator: &mut Navigator,
        rng: &mut impl Rng,
        report: &mut EnemyUpdate,
    ) {
        let len = self.path.as_ref().map_or(0, NavPath::len);
        if len == 0 || self.reached_end {
            // No route yet, or holding until the replacement is adopted
            self.move_dir = Vec2::ZERO;
            self.speed_factor = 0.0;
            return;
        }

        self.speed_factor = 1.0;
        let Some(mut waypoint) = self.waypoint_at(self.waypoint_cursor) else {
            return;
        };
        loop {
            let remaining = frame.position.distance(waypoint);
            if remaining >= ARRIVAL_RADIUS {
                break;
            }
            if self.waypoint_cursor + 1 < len {
                self.waypoint_cursor += 1;
                match self.waypoint_at(self.waypoint_cursor) {
                    Some(next) => waypoint = next,
                    None => break,
                }
            } else {
                self.reached_end = true;
                // Ease in on the arrival frame to avoid overshoot jitter
                self.speed_factor = (remaining / ARRIVAL_RADIUS).sqrt();

                let was_chasing = self.mode.is_chasing();
                if was_chasing {
                    report.gave_up = true;
                    log::info!("enemy reached the last known position, giving up");
                }
                let next = self.route.advance(was_chasing, rng);
                self.mode = Mode::Patrol;
                self.set_target(next, frame.position, navigator);
                break;
            }
        }

        self.move_dir = (waypoint - frame.position).normalize_or_zero();
    }

    fn waypoint_at(&self, index: usize) -> Option<Vec2> {
        self.path
            .as_ref()
            .and_then(|path| path.waypoints.get(index).copied())
    }

    /// Re-aim navigation. Issues a request only when the goal actually
    /// changed, so a stationary target does not spam the worker.
    fn set_target(&mut self, goal: Vec2, position: Vec2, navigator: &mut Navigator) {
        if self.target == Some(goal) {
            return;
        }
        self.target = Some(goal);
        self.pending_request = Some(navigator.request(position, goal));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::pathfinding::NavGrid;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::sync::Arc;

    fn route4() -> PatrolRoute {
        PatrolRoute::new(vec![
            Some(Vec2::new(0.0, 0.0)),
            Some(Vec2::new(10.0, 0.0)),
            Some(Vec2::new(20.0, 0.0)),
            Some(Vec2::new(30.0, 0.0)),
        ])
    }

    fn open_navigator() -> Navigator {
        Navigator::new(Arc::new(NavGrid::new(64, 64, 1.0)))
    }

    fn agent() -> EnemyAgent {
        EnemyAgent::new(2.0, 5.0, 12.0, route4())
    }

    fn quiet_frame(position: Vec2, player: Vec2) -> EnemyFrame {
        EnemyFrame {
            position,
            player_position: player,
            sees_player: false,
            now: 0.0,
            ambient_busy: true,
        }
    }

    /// Install a route directly through the reply path
    fn install_path(agent: &mut EnemyAgent, waypoints: Vec<Vec2>) {
        let id = agent.pending_request().expect("no outstanding request");
        let length = waypoints
            .windows(2)
            .map(|pair| pair[0].distance(pair[1]))
            .sum();
        assert!(agent.handle_reply(PathReply {
            id,
            result: Ok(NavPath { waypoints, length }),
        }));
    }

    #[test]
    fn distance_detection_enters_chase_same_frame() {
        let mut agent = agent();
        let mut navigator = open_navigator();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        agent.start_pathfinding(Vec2::new(30.0, 30.0), &mut navigator);

        let player = Vec2::new(33.0, 30.0);
        let report = agent.update(
            &quiet_frame(Vec2::new(30.0, 30.0), player),
            &mut navigator,
            &mut rng,
        );

        assert!(report.entered_chase);
        assert_eq!(agent.mode(), Mode::Chase { last_known: player });
        assert_eq!(agent.current_target(), Some(player));
    }

    #[test]
    fn raycast_detection_is_sufficient_alone() {
        let mut agent = agent();
        let mut navigator = open_navigator();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        agent.start_pathfinding(Vec2::new(30.0, 30.0), &mut navigator);

        // Player far outside the blind radius, but the ray hit
        let player = Vec2::new(40.0, 30.0);
        let mut frame = quiet_frame(Vec2::new(30.0, 30.0), player);
        frame.sees_player = true;
        let report = agent.update(&frame, &mut navigator, &mut rng);

        assert!(report.entered_chase);
        assert!(agent.mode().is_chasing());
    }

    #[test]
    fn last_known_refreshes_while_detection_holds() {
        let mut agent = agent();
        let mut navigator = open_navigator();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        agent.start_pathfinding(Vec2::new(30.0, 30.0), &mut navigator);

        let here = Vec2::new(30.0, 30.0);
        agent.update(&quiet_frame(here, Vec2::new(32.0, 30.0)), &mut navigator, &mut rng);
        agent.update(&quiet_frame(here, Vec2::new(32.0, 31.0)), &mut navigator, &mut rng);

        assert_eq!(
            agent.mode(),
            Mode::Chase {
                last_known: Vec2::new(32.0, 31.0)
            }
        );

        // Out of range: the mode persists and the last-known freezes
        let report = agent.update(&quiet_frame(here, Vec2::new(60.0, 60.0)), &mut navigator, &mut rng);
        assert!(!report.entered_chase);
        assert_eq!(
            agent.mode(),
            Mode::Chase {
                last_known: Vec2::new(32.0, 31.0)
            }
        );
    }

    #[test]
    fn waypoints_advance_within_arrival_radius() {
        let mut agent = agent();
        let mut navigator = open_navigator();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        agent.start_pathfinding(Vec2::new(30.0, 30.0), &mut navigator);
        install_path(
            &mut agent,
            vec![
                Vec2::new(30.0, 30.0),
                Vec2::new(34.0, 30.0),
                Vec2::new(40.0, 30.0),
            ],
        );

        // Within the radius of waypoints 0 and 1 at once: both consumed
        let player = Vec2::new(60.0, 60.0);
        agent.update(&quiet_frame(Vec2::new(32.0, 30.0), player), &mut navigator, &mut rng);
        assert_eq!(agent.waypoint_cursor(), 2);
        assert!(!agent.reached_end());
        assert!(agent.facing_dir().abs_diff_eq(Vec2::X, 1e-5));
        assert_eq!(agent.fixed_velocity(), Vec2::new(2.0, 0.0));
    }

    #[test]
    fn reached_end_fires_once_and_holds() {
        let mut agent = agent();
        let mut navigator = open_navigator();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        agent.start_pathfinding(Vec2::new(30.0, 30.0), &mut navigator);
        install_path(&mut agent, vec![Vec2::new(31.0, 30.0), Vec2::new(34.0, 30.0)]);

        let position = Vec2::new(33.0, 30.0);
        let player = Vec2::new(60.0, 60.0);
        agent.update(&quiet_frame(position, player), &mut navigator, &mut rng);
        assert!(agent.reached_end());

        // Arrival-frame ease-in: sqrt(1/3) of full speed toward the goal
        let speed = agent.fixed_velocity().length();
        assert!((speed - 2.0 * (1.0f32 / 3.0).sqrt()).abs() < 1e-4);

        // Following frames hold position; the latch stays down
        agent.update(&quiet_frame(position, player), &mut navigator, &mut rng);
        assert!(agent.reached_end());
        assert_eq!(agent.fixed_velocity(), Vec2::ZERO);

        // Adopting the replacement route clears the latch
        install_path(&mut agent, vec![Vec2::new(33.0, 30.0), Vec2::new(20.0, 30.0)]);
        assert!(!agent.reached_end());
    }

    #[test]
    fn chase_ends_only_at_end_of_path() {
        let mut agent = agent();
        let mut navigator = open_navigator();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        agent.start_pathfinding(Vec2::new(30.0, 30.0), &mut navigator);

        // Detect, then install the chase route
        let player = Vec2::new(33.0, 30.0);
        agent.update(&quiet_frame(Vec2::new(30.0, 30.0), player), &mut navigator, &mut rng);
        install_path(&mut agent, vec![Vec2::new(30.0, 30.0), Vec2::new(40.0, 30.0)]);

        // Player gone, agent mid-route: still chasing
        let far = Vec2::new(60.0, 60.0);
        agent.update(&quiet_frame(Vec2::new(30.5, 30.0), far), &mut navigator, &mut rng);
        assert!(agent.mode().is_chasing());

        // Arriving at the last known position gives up
        let report = agent.update(&quiet_frame(Vec2::new(38.0, 30.0), far), &mut navigator, &mut rng);
        assert!(report.gave_up);
        assert_eq!(agent.mode(), Mode::Patrol);
    }

    #[test]
    fn stale_reply_is_dropped() {
        let mut agent = agent();
        let mut navigator = open_navigator();
        agent.start_pathfinding(Vec2::new(30.0, 30.0), &mut navigator);
        let stale = agent.pending_request().unwrap() - 1;

        let adopted = agent.handle_reply(PathReply {
            id: stale,
            result: Ok(NavPath {
                waypoints: vec![Vec2::ZERO],
                length: 0.0,
            }),
        });
        assert!(!adopted);
        assert!(agent.pending_request().is_some());
    }

    #[test]
    fn errored_reply_keeps_the_old_route() {
        use crate::ai::pathfinding::NavError;

        let mut agent = agent();
        let mut navigator = open_navigator();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        agent.start_pathfinding(Vec2::new(30.0, 30.0), &mut navigator);
        install_path(&mut agent, vec![Vec2::new(30.0, 30.0), Vec2::new(40.0, 30.0)]);

        // Force a fresh request, then fail it
        let player = Vec2::new(33.0, 30.0);
        agent.update(&quiet_frame(Vec2::new(30.0, 30.0), player), &mut navigator, &mut rng);
        let id = agent.pending_request().unwrap();
        assert!(!agent.handle_reply(PathReply {
            id,
            result: Err(NavError::NoRoute),
        }));

        // The stale route is still walked
        agent.update(&quiet_frame(Vec2::new(35.0, 30.0), player), &mut navigator, &mut rng);
        assert!(agent.facing_dir().abs_diff_eq(Vec2::X, 1e-5));
    }

    #[test]
    fn patrol_cursor_decrements_then_jumps() {
        let mut rng = ChaCha8Rng::seed_from_u64(17);
        let mut route = route4();

        // Pretend a jump landed on 3, then walk back down
        route.advance(false, &mut rng); // 0 -> jump to 2 or 3
        let jumped_to = route.cursor();
        assert!(jumped_to == 2 || jumped_to == 3);

        for expected in (0..jumped_to).rev() {
            route.advance(false, &mut rng);
            assert_eq!(route.cursor(), expected);
        }

        // At 0 again: the next advance jumps forward again
        route.advance(false, &mut rng);
        assert!(route.cursor() >= 2);
    }

    #[test]
    fn decrement_skips_empty_slots() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut route = PatrolRoute::new(vec![
            Some(Vec2::new(0.0, 0.0)),
            None,
            None,
            Some(Vec2::new(30.0, 0.0)),
        ]);
        route.advance(false, &mut rng);
        assert_eq!(route.cursor(), 3);

        // Walking back from 3 skips the two empty slots straight to 0
        route.advance(false, &mut rng);
        assert_eq!(route.cursor(), 0);
    }

    #[test]
    fn chase_end_at_slot_zero_does_not_jump() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut route = route4();
        assert_eq!(route.cursor(), 0);

        let target = route.advance(true, &mut rng);
        assert_eq!(route.cursor(), 0);
        assert_eq!(target, Vec2::new(0.0, 0.0));
    }

    #[test]
    fn random_jump_only_lands_on_set_slots() {
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let mut route = PatrolRoute::new(vec![
            Some(Vec2::ZERO),
            Some(Vec2::new(1.0, 0.0)),
            None,
            Some(Vec2::new(3.0, 0.0)),
            None,
        ]);

        for _ in 0..100 {
            route.advance(false, &mut rng); // jump from 0
            assert_eq!(route.cursor(), 3, "only slot 3 is a legal jump target");
            while route.cursor() > 0 {
                route.advance(false, &mut rng);
            }
        }
    }
}
