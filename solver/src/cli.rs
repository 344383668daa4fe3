use std::path::PathBuf;

use clap::{Parser, Subcommand};
use log::LevelFilter;

#[derive(Parser, Debug)]
#[command(name = "mdp-maze-robot")]
#[command(about = "Maze-robot exploration and fastest-path control loop")]
pub struct Args {
    /// Sets the logger's verbosity level
    #[arg(short, long, value_name = "VERBOSITY", default_value_t = LevelFilter::Info)]
    pub verbosity: LevelFilter,

    /// Stored map file to load at boot (`P1|P2` MDF line); omit to start
    /// from an empty arena.
    #[arg(long)]
    pub map: Option<PathBuf>,

    /// Start from the canned sample obstacle layout instead of an empty
    /// arena or a loaded map file.
    #[arg(short, long)]
    pub generate: bool,

    /// Delay between simulated moves in milliseconds (0 = no delay).
    #[arg(short, long, default_value_t = 0)]
    pub delay: u64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the right-hug exploration engine to full coverage.
    Explore,

    /// Run the image-recognition exploration variant (explore plus
    /// per-obstacle face photography).
    ImageRecognition,

    /// Run a standalone fastest-path plan against a waypoint and print
    /// the resulting motion payload.
    FastestPath {
        /// Waypoint x coordinate, external frame.
        waypoint_x: i32,
        /// Waypoint y coordinate, external frame.
        waypoint_y: i32,
    },
}
