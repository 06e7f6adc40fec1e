//! Isometric client front end: loads the profiles, wires a world feed to the
//! game scene and runs the frame loop headless or in a raylib window.
#![forbid(unsafe_code)]

mod app;

use std::path::PathBuf;

use clap::Parser;

use app::{Session, SessionPaths};

#[derive(Debug, Parser)]
#[command(author, version, about = "Isometric tile world viewer", long_about = None)]
struct Args {
    /// Client profile (lighting, camera, movement, timing).
    #[arg(long, default_value = "assets/client.toml")]
    config: PathBuf,

    /// Tile definitions and light colors.
    #[arg(long, default_value = "assets/tiles.toml")]
    tiles: PathBuf,

    /// Procedural map parameters.
    #[arg(long, default_value = "assets/worldgen.toml")]
    worldgen: PathBuf,

    /// Overrides the worldgen seed.
    #[arg(long)]
    seed: Option<i32>,

    /// Frames to run headless before exiting.
    #[arg(long, default_value_t = 600)]
    frames: u32,

    /// Simulated milliseconds per headless frame.
    #[arg(long, default_value_t = 16, value_parser = clap::value_parser!(u64).range(1..=1000))]
    frame_ms: u64,

    /// Reload the client profile when it changes on disk.
    #[arg(long, default_value_t = false)]
    watch_config: bool,

    /// Open a window instead of running headless.
    #[arg(long, default_value_t = false)]
    window: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let paths = SessionPaths {
        config: args.config,
        tiles: args.tiles,
        worldgen: args.worldgen,
    };
    let mut session = Session::load(&paths, args.seed);
    let reloads = if args.watch_config {
        Some(app::watch::spawn_config_watcher(paths.config.clone()))
    } else {
        None
    };

    if args.window {
        #[cfg(feature = "window")]
        {
            app::window::run(&mut session, reloads.as_ref());
            session.shutdown();
            return;
        }
        #[cfg(not(feature = "window"))]
        log::warn!("built without the `window` feature; running headless");
    }

    let report = app::headless::run(&mut session, reloads.as_ref(), args.frames, args.frame_ms);
    log::info!(
        "headless run finished: {} frames, {} drawn, {} skipped, peak {} lights, {} journal lines",
        report.frames,
        report.drawn,
        report.skipped,
        report.peak_lights,
        report.journal_lines
    );
    session.shutdown();
}
