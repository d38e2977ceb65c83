//! Shifting Maze headless driver
//!
//! Runs a dungeon session with a simulated player and prints the maze as
//! ASCII. Handy for eyeballing generator settings and watching the corridor
//! engine rewire a level.

mod walker;

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;

use sm_core::transition::TransitionState;
use sm_core::{DungeonSession, MutationFlags, SessionConfig};
use walker::Walker;

/// Shifting Maze - procedural dungeon with live corridors
#[derive(Parser, Debug)]
#[command(name = "shifting-maze")]
#[command(author, version, about = "Shifting Maze - run the dungeon engine headless", long_about = None)]
struct Args {
    /// RNG seed (random if omitted)
    #[arg(short = 's', long = "seed")]
    seed: Option<u64>,

    /// Grid size in cells
    #[arg(short = 'g', long = "grid-size")]
    grid_size: Option<usize>,

    /// JSON config file; flags override its values
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Number of frames to simulate
    #[arg(short = 'f', long = "frames", default_value_t = 2000)]
    frames: u64,

    /// Game time per frame in milliseconds
    #[arg(long = "frame-ms", default_value_t = 50)]
    frame_ms: u64,

    /// Number of levels in the run
    #[arg(short = 'l', long = "levels")]
    levels: Option<u32>,

    /// Write the first level as JSON to this file and exit
    #[arg(long = "dump-level")]
    dump_level: Option<PathBuf>,

    /// Print the maze every N frames (0 prints only level changes)
    #[arg(long = "show-every", default_value_t = 0)]
    show_every: u64,

    /// More logging (-v debug, -vv trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_logging(args.verbose)?;

    let config = build_config(&args)?;
    let mut session = DungeonSession::new(config)?;
    log::info!("seed {}", session.seed());

    if let Some(path) = &args.dump_level {
        let json = serde_json::to_string_pretty(session.level_data())?;
        std::fs::write(path, json)?;
        log::info!("level written to {}", path.display());
        return Ok(());
    }

    println!("level {}", session.level());
    println!("{}", session.render_ascii(Some(session.level_data().entrance())));

    let mut walker = Walker::new(session.seed());
    let mut player = session.level_data().entrance();
    let mut now = 0u64;

    for frame in 0..args.frames {
        let (px, py) = session.cell_center(player);
        let result = session.tick_pixels(now, px, py);
        player = result.player;
        now += args.frame_ms;

        if result.flags.contains(MutationFlags::PLAYER_RESCUED) {
            log::info!("frame {frame}: rescued to {player}");
        }
        if let Some(level) = &result.new_level {
            println!("level {} ({} rooms)", session.level(), level.rooms.len());
            println!("{}", session.render_ascii(Some(player)));
        }
        if result.flags.contains(MutationFlags::RUN_COMPLETE) {
            println!("run complete after {frame} frames");
            break;
        }
        if args.show_every > 0 && frame % args.show_every == 0 {
            println!("frame {frame}");
            println!("{}", session.render_ascii(Some(player)));
        }

        if session.transition_state() != TransitionState::Idle {
            continue;
        }
        for kind in session.pick_up(player) {
            log::info!("picked up {kind}");
        }
        player = walker.step(&mut session, player);
    }

    let state = session.state();
    println!(
        "level {}, {} connections, {} doors, {} walls queued, {} openings queued",
        session.level(),
        state.connections().len(),
        state.doors().len(),
        state.queues().add_len(),
        state.queues().remove_len(),
    );
    Ok(())
}

fn init_logging(verbose: u8) -> Result<(), Box<dyn Error>> {
    use simplelog::LevelFilter::{Debug, Info, Off, Trace};
    let level = match verbose {
        0 => Info,
        1 => Debug,
        _ => Trace,
    };
    simplelog::TermLogger::init(
        level,
        simplelog::ConfigBuilder::new()
            .set_target_level(Off)
            .set_location_level(Off)
            .build(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    )?;
    Ok(())
}

fn build_config(args: &Args) -> Result<SessionConfig, Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => SessionConfig::load_from_file(path)?,
        None => SessionConfig::default(),
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if let Some(size) = args.grid_size {
        config.generator.grid_size = size;
    }
    if let Some(levels) = args.levels {
        config.total_levels = levels;
    }
    config.validate()?;
    Ok(config)
}
