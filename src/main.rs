//! Headless demo: a scripted player walks the demo level while the enemy
//! patrols, hunts, and eventually catches them

use blackout::core::time::FIXED_TIMESTEP;
use blackout::prelude::*;

/// How long the demo runs before giving up, in frames
const MAX_FRAMES: u32 = 60 * 120;

fn main() {
    env_logger::init();

    let scene = SceneDef::demo();
    let seed = 42;
    log::info!("starting session on scene '{}' (seed {seed})", scene.name);

    let mut session = match Session::new(&scene, seed, Box::new(NullSceneChanger::default())) {
        Ok(session) => session,
        Err(error) => {
            eprintln!("scene error: {error}");
            std::process::exit(1);
        }
    };

    match blackout::audio::AudioBank::new() {
        Ok(bank) => session.attach_audio(bank),
        Err(error) => log::warn!("running silent: {error}"),
    }

    for frame in 0..MAX_FRAMES {
        script_player(&mut session, frame);
        session.frame(FIXED_TIMESTEP);

        for event in session.events() {
            log::info!("event: {event:?}");
        }

        if frame % 120 == 0 {
            let player = session.player_position();
            let enemy = session.enemy_position();
            println!(
                "t={:6.1}s  player ({:5.1}, {:5.1})  enemy ({:5.1}, {:5.1})  chasing: {}",
                session.elapsed_seconds(),
                player.x,
                player.y,
                enemy.x,
                enemy.y,
                session.enemy_agent().mode().is_chasing(),
            );
        }

        if session.game_over() {
            println!("caught after {:.1}s", session.elapsed_seconds());
            return;
        }
    }

    println!("the player survived {MAX_FRAMES} frames");
}

/// Walk east along the bottom corridor, then loiter and let the enemy win
fn script_player(session: &mut Session, frame: u32) {
    let axis = match frame {
        0..=600 => Vec2::new(1.0, 0.0),
        601..=900 => Vec2::new(0.0, 1.0),
        _ => Vec2::ZERO,
    };
    session.input.set_move_axis(axis);
    session.input.set_view_center(session.player_position());
    // Pointer trails west of the player so the character faces east
    session
        .input
        .set_pointer_world(session.player_position() - Vec2::new(2.0, 0.0));
}
