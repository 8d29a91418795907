//! Scenario tests for the stealth behaviors: detection, pursuit, patrol
//! selection, and the ambient sound scheduler

use std::sync::Arc;

use blackout::ai::{
    EnemyAgent, EnemyFrame, Mode, NavGrid, NavPath, Navigator, PathReply, PatrolRoute, SoundBand,
    SoundContext, SoundScheduler,
};
use blackout::glam::Vec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn open_navigator() -> Navigator {
    Navigator::new(Arc::new(NavGrid::new(64, 64, 1.0)))
}

fn route4() -> Vec<Option<Vec2>> {
    vec![
        Some(Vec2::new(5.0, 5.0)),
        Some(Vec2::new(20.0, 5.0)),
        Some(Vec2::new(35.0, 5.0)),
        Some(Vec2::new(50.0, 5.0)),
    ]
}

fn agent_with(route: Vec<Option<Vec2>>) -> EnemyAgent {
    EnemyAgent::new(2.0, 5.0, 12.0, PatrolRoute::new(route))
}

fn frame(position: Vec2, player: Vec2) -> EnemyFrame {
    EnemyFrame {
        position,
        player_position: player,
        sees_player: false,
        now: 0.0,
        ambient_busy: true,
    }
}

/// Answer the agent's outstanding request with a straight-line route
fn install_path(agent: &mut EnemyAgent, waypoints: Vec<Vec2>) {
    let id = agent.pending_request().expect("no outstanding request");
    let length = waypoints
        .windows(2)
        .map(|pair| pair[0].distance(pair[1]))
        .sum();
    assert!(
        agent.handle_reply(PathReply {
            id,
            result: Ok(NavPath { waypoints, length }),
        }),
        "reply for the live request must be adopted"
    );
}

#[test]
fn detection_distance_enters_chase_within_the_frame() {
    let mut agent = agent_with(route4());
    let mut navigator = open_navigator();
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    agent.start_pathfinding(Vec2::new(30.0, 30.0), &mut navigator);

    // One frame earlier the player is just outside the radius: no chase
    agent.update(
        &frame(Vec2::new(30.0, 30.0), Vec2::new(36.0, 30.0)),
        &mut navigator,
        &mut rng,
    );
    assert_eq!(agent.mode(), Mode::Patrol);

    // Inside the radius: chase the very same frame, regardless of prior mode
    let player = Vec2::new(34.0, 30.0);
    agent.update(&frame(Vec2::new(30.0, 30.0), player), &mut navigator, &mut rng);
    assert_eq!(agent.mode(), Mode::Chase { last_known: player });
}

#[test]
fn raycast_hit_alone_is_enough() {
    let mut agent = agent_with(route4());
    let mut navigator = open_navigator();
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    agent.start_pathfinding(Vec2::new(30.0, 30.0), &mut navigator);

    let mut sighted = frame(Vec2::new(30.0, 30.0), Vec2::new(41.0, 30.0));
    sighted.sees_player = true;
    agent.update(&sighted, &mut navigator, &mut rng);
    assert!(agent.mode().is_chasing());
}

#[test]
fn last_known_tracks_the_most_recent_detection_frame() {
    let mut agent = agent_with(route4());
    let mut navigator = open_navigator();
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let here = Vec2::new(30.0, 30.0);
    agent.start_pathfinding(here, &mut navigator);

    // Three detected frames with the player on the move
    for step in 0..3 {
        let player = Vec2::new(33.0, 30.0 + step as f32);
        agent.update(&frame(here, player), &mut navigator, &mut rng);
        assert_eq!(agent.mode(), Mode::Chase { last_known: player });
    }

    // The player breaks contact: the last observation freezes
    agent.update(&frame(here, Vec2::new(99.0, 99.0)), &mut navigator, &mut rng);
    assert_eq!(
        agent.mode(),
        Mode::Chase {
            last_known: Vec2::new(33.0, 32.0)
        }
    );
}

/// Drive the agent along its current route until the end-of-path fires,
/// teleporting it waypoint to waypoint. Returns the patrol cursor after
/// the target re-selection.
fn run_route_to_end(agent: &mut EnemyAgent, navigator: &mut Navigator, rng: &mut ChaCha8Rng) -> usize {
    let target = agent.current_target().expect("agent is armed");
    install_path(agent, vec![target]);
    let report = agent.update(&frame(target, Vec2::new(999.0, 999.0)), navigator, rng);
    assert!(!report.entered_chase);
    assert!(agent.reached_end());
    agent.patrol_cursor()
}

#[test]
fn patrol_sequence_walks_back_to_zero_then_jumps_forward() {
    let route = vec![
        Some(Vec2::new(5.0, 5.0)),
        None,
        Some(Vec2::new(35.0, 5.0)),
        Some(Vec2::new(50.0, 5.0)),
        None,
        Some(Vec2::new(50.0, 20.0)),
    ];
    let mut agent = agent_with(route.clone());
    let mut navigator = open_navigator();
    let mut rng = ChaCha8Rng::seed_from_u64(1234);
    agent.start_pathfinding(Vec2::new(5.0, 5.0), &mut navigator);

    let mut previous = agent.patrol_cursor();
    for _ in 0..200 {
        let cursor = run_route_to_end(&mut agent, &mut navigator, &mut rng);

        // Never an empty slot, never out of range
        assert!(cursor < route.len());
        assert!(route[cursor].is_some(), "cursor {cursor} rests on an empty slot");

        if previous == 0 {
            assert!(cursor >= 2, "from 0 the cursor must jump to 2 or beyond");
        } else {
            assert!(cursor < previous, "above 0 the cursor only walks backward");
        }
        previous = cursor;
    }
}

#[test]
fn jump_from_zero_is_uniform_over_the_set_slots() {
    // Patrol route of 4 waypoints, cursor at 0, target not the player:
    // 1000 trials must all land in {2, 3}, roughly evenly.
    let mut rng = ChaCha8Rng::seed_from_u64(2021);
    let mut twos = 0;
    let mut threes = 0;

    for _ in 0..1000 {
        let mut route = PatrolRoute::new(route4());
        route.advance(false, &mut rng);
        match route.cursor() {
            2 => twos += 1,
            3 => threes += 1,
            other => panic!("jump landed on {other}"),
        }
    }

    assert_eq!(twos + threes, 1000);
    assert!((400..=600).contains(&twos), "lopsided split: {twos}/{threes}");
}

#[test]
fn give_up_happens_at_the_end_of_the_pursuit_path_only() {
    let mut agent = agent_with(route4());
    let mut navigator = open_navigator();
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    agent.start_pathfinding(Vec2::new(30.0, 30.0), &mut navigator);

    // Spotted once, then gone
    let last_seen = Vec2::new(33.0, 30.0);
    agent.update(&frame(Vec2::new(30.0, 30.0), last_seen), &mut navigator, &mut rng);
    install_path(&mut agent, vec![Vec2::new(30.0, 30.0), Vec2::new(45.0, 30.0)]);

    let gone = Vec2::new(999.0, 999.0);
    let mut positions = [
        Vec2::new(31.0, 30.0),
        Vec2::new(38.0, 30.0),
        Vec2::new(43.0, 30.0),
    ]
    .into_iter();

    // Mid-route frames: still committed to the chase
    for position in positions.by_ref().take(2) {
        let report = agent.update(&frame(position, gone), &mut navigator, &mut rng);
        assert!(agent.mode().is_chasing());
        assert!(!report.gave_up);
    }

    // Final waypoint within the arrival radius: gives up exactly here
    let arrival = positions.next().unwrap();
    let report = agent.update(&frame(arrival, gone), &mut navigator, &mut rng);
    assert!(report.gave_up);
    assert_eq!(agent.mode(), Mode::Patrol);
}

#[test]
fn reached_end_is_edge_triggered() {
    let mut agent = agent_with(route4());
    let mut navigator = open_navigator();
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    agent.start_pathfinding(Vec2::new(30.0, 30.0), &mut navigator);
    install_path(&mut agent, vec![Vec2::new(30.0, 30.0), Vec2::new(32.0, 30.0)]);

    let position = Vec2::new(31.0, 30.0);
    let player = Vec2::new(999.0, 999.0);

    agent.update(&frame(position, player), &mut navigator, &mut rng);
    assert!(agent.reached_end());
    let cursor_after_end = agent.patrol_cursor();

    // Re-running the same situation must not re-select a patrol target
    for _ in 0..10 {
        agent.update(&frame(position, player), &mut navigator, &mut rng);
        assert!(agent.reached_end());
        assert_eq!(agent.patrol_cursor(), cursor_after_end);
        assert_eq!(agent.fixed_velocity(), Vec2::ZERO);
    }

    // A fresh path re-arms the edge
    install_path(&mut agent, vec![position, Vec2::new(40.0, 30.0)]);
    assert!(!agent.reached_end());
}

#[test]
fn multiple_waypoints_collapse_in_one_frame() {
    let mut agent = agent_with(route4());
    let mut navigator = open_navigator();
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    agent.start_pathfinding(Vec2::new(30.0, 30.0), &mut navigator);
    install_path(
        &mut agent,
        vec![
            Vec2::new(30.0, 30.0),
            Vec2::new(31.0, 30.0),
            Vec2::new(32.0, 30.0),
            Vec2::new(45.0, 30.0),
        ],
    );

    // Within the arrival radius of the first three waypoints at once
    agent.update(
        &frame(Vec2::new(31.0, 30.0), Vec2::new(999.0, 999.0)),
        &mut navigator,
        &mut rng,
    );
    assert_eq!(agent.waypoint_cursor(), 3);
    assert!(!agent.reached_end());
}

#[test]
fn scheduler_bands_match_distance_and_mode_for_a_fixed_seed() {
    let mut rng = ChaCha8Rng::seed_from_u64(404);
    let mut scheduler = SoundScheduler::new();
    let mut now = 0.0;

    let mut observe = |scheduler: &mut SoundScheduler,
                       rng: &mut ChaCha8Rng,
                       now: &mut f64,
                       chasing: bool,
                       distance: f32|
     -> Vec<SoundBand> {
        let ctx = SoundContext {
            chasing,
            distance_to_player: distance,
            detection_dist: 5.0,
            source_busy: false,
        };
        let mut bands = Vec::new();
        for _ in 0..300 {
            *now += 0.1;
            if let Some(cue) = scheduler.poll(*now, &ctx, rng) {
                bands.push(cue.band);
            }
        }
        bands
    };

    let far = observe(&mut scheduler, &mut rng, &mut now, false, 30.0);
    assert!(!far.is_empty());
    assert!(far.iter().all(|&band| band == SoundBand::Distant));

    let near = observe(&mut scheduler, &mut rng, &mut now, false, 12.0);
    assert!(!near.is_empty());
    assert!(near.iter().all(|&band| band == SoundBand::Closer));

    let chase = observe(&mut scheduler, &mut rng, &mut now, true, 12.0);
    assert!(!chase.is_empty());
    assert!(chase.iter().all(|&band| band == SoundBand::Chase));
}

#[test]
fn busy_source_never_double_triggers() {
    let mut rng = ChaCha8Rng::seed_from_u64(404);
    let mut scheduler = SoundScheduler::new();
    let ctx = SoundContext {
        chasing: true,
        distance_to_player: 3.0,
        detection_dist: 5.0,
        source_busy: true,
    };

    let mut now = 0.0;
    for _ in 0..2000 {
        now += 0.05;
        assert!(scheduler.poll(now, &ctx, &mut rng).is_none());
    }
}
