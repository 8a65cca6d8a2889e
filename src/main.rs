//! Flap Arena entry point
//!
//! Headless demo driver: runs the simulation at the fixed rate with a
//! scripted autopilot and logs the run. Useful for smoke-testing a
//! tuning file and for watching the director's pacing in the logs.

use std::error::Error;

use flap_arena::consts::FRAME_HZ;
use flap_arena::sim::GamePhase;
use flap_arena::{Game, GameKey, Tuning};

struct Args {
    seed: u64,
    frames: u64,
    tuning: Option<String>,
    dump_state: bool,
}

fn parse_args() -> Result<Args, Box<dyn Error>> {
    let mut args = Args {
        seed: 0x1DE5,
        frames: u64::from(FRAME_HZ) * 120,
        tuning: None,
        dump_state: false,
    };

    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--seed" => args.seed = it.next().ok_or("--seed needs a value")?.parse()?,
            "--frames" => args.frames = it.next().ok_or("--frames needs a value")?.parse()?,
            "--tuning" => args.tuning = Some(it.next().ok_or("--tuning needs a path")?),
            "--dump-state" => args.dump_state = true,
            other => return Err(format!("unknown argument: {other}").into()),
        }
    }
    Ok(args)
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = parse_args()?;

    let tuning = match &args.tuning {
        Some(path) => Tuning::from_json(&std::fs::read_to_string(path)?)?,
        None => Tuning::standard(),
    };

    let mut game = Game::with_tuning(args.seed, tuning).on_event(|event| {
        log::info!("lifecycle event: {event:?}");
    });
    game.new_game();

    // A crude pilot: flap in bursts, sweep left and right. Enough to
    // exercise flight, landings, wraps, and the occasional fatal
    // mistake.
    for frame in 0..args.frames {
        if frame % 6 == 0 {
            game.handle_key_down(GameKey::Spacebar);
        } else if frame % 6 == 3 {
            game.handle_key_up(GameKey::Spacebar);
        }
        if frame % 256 == 0 {
            game.handle_key_down(GameKey::RightArrow);
            game.handle_key_up(GameKey::LeftArrow);
        } else if frame % 256 == 128 {
            game.handle_key_down(GameKey::LeftArrow);
            game.handle_key_up(GameKey::RightArrow);
        }

        game.update();

        if frame % (u64::from(FRAME_HZ) * 10) == 0 {
            let s = game.state();
            log::info!(
                "frame {frame}: score {}, lives {}, level {}, {} live enemies",
                s.score(),
                s.lives_left,
                s.level_on,
                s.num_enemies
            );
        }
        if game.state().phase == GamePhase::Attract {
            break;
        }
    }

    let s = game.state();
    println!(
        "seed {:#x}: score {}, reached level {}, {} frames simulated",
        s.seed,
        s.score(),
        s.level_on,
        s.time_frames
    );
    if args.dump_state {
        println!("{}", serde_json::to_string_pretty(s)?);
    }
    Ok(())
}
