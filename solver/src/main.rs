mod cli;

use clap::Parser;
use eyre::Result;
use log::{debug, info};

use cli::{Args, Command as CliCommand};
use solver::arena::Arena;
use solver::config::Config;
use solver::exploration::image_recognition::ImageRecognitionExploration;
use solver::exploration::{Exploration, ExplorationHost};
use solver::geometry::{Direction, GOAL_POINT, Movement, Point, START_POINT};
use solver::logging::Logger;
use solver::robot::Robot;
use solver::{mapfile, planner, wire};

#[tokio::main]
#[macros::with_node]
async fn main() -> Result<()> {
    let args = Args::parse();
    Logger::init(args.verbosity);

    let config = Config::default();
    config.validate().map_err(|error| eyre::eyre!(error))?;

    let mut arena = load_arena(&args)?;
    let mut robot = Robot::new(START_POINT, Direction::East, config.robot_speed);
    let mut host = ConsoleHost::new(args.delay);

    match args.command {
        CliCommand::Explore => {
            info!("running exploration to completion");
            let mut engine = Exploration::new(&config);
            engine.run(&mut arena, &mut robot, &mut host)?;
            report_coverage(&engine, &arena);
        }
        CliCommand::ImageRecognition => {
            info!("running image-recognition exploration to completion");
            let mut engine = ImageRecognitionExploration::new(&config);
            engine.run(&mut arena, &mut robot, &mut host)?;
        }
        CliCommand::FastestPath { waypoint_x, waypoint_y } => {
            let waypoint = wire::from_external(waypoint_x, waypoint_y);
            info!("planning fastest path through waypoint {waypoint:?}");
            run_fastest_path(&config, &arena, &mut robot, waypoint)?;
        }
    }

    let (p1, p2) = arena.encode_mdf();
    info!("final MDF: {p1} {p2}");

    Ok(())
}

fn load_arena(args: &Args) -> Result<Arena> {
    if let Some(path) = &args.map {
        debug!("loading map file {path:?}");
        Ok(mapfile::load(path)?)
    } else if args.generate {
        debug!("generating the canned sample arena");
        Ok(Arena::sample())
    } else {
        debug!("starting from an empty arena");
        Ok(Arena::new())
    }
}

fn run_fastest_path(config: &Config, arena: &Arena, robot: &mut Robot, waypoint: Point) -> Result<()> {
    let grid = arena.planning_grid(false);
    let path = planner::plan(&grid, robot.pose.point, robot.pose.direction, Some(waypoint), GOAL_POINT)?;
    let movements = planner::path_to_movements(&path);
    let consolidated = planner::consolidate_movements(&movements);
    let chunks = planner::split_into_chunks(&consolidated, config.motion_chunk_char_budget);

    info!("{}", wire::motion_burst_header());
    for chunk in &chunks {
        info!("{}", wire::format_motion(chunk));
    }

    for movement in movements {
        robot.step(movement);
    }
    Ok(())
}

fn report_coverage(engine: &Exploration<'_>, arena: &Arena) {
    info!("final coverage: {:.1}%", engine.coverage(arena) * 100.0);
}

/// A simulation host for local CLI runs: sensor readings are fabricated
/// against the same arena the engine is updating (ground truth and
/// belief map coincide in this mode), and moves are paced by `--delay`.
struct ConsoleHost {
    delay: std::time::Duration,
}

impl ConsoleHost {
    fn new(delay_ms: u64) -> Self {
        Self {
            delay: std::time::Duration::from_millis(delay_ms),
        }
    }
}

impl ExplorationHost for ConsoleHost {
    fn report_move(&mut self, movement: Movement, point: Point, facing: Direction) {
        debug!("{movement:?} -> {point:?} facing {facing:?}");
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
    }

    fn report_cell_explored(&mut self, _point: Point) {}

    fn request_sensors(&mut self, robot: &Robot, arena: &Arena) -> Vec<Option<i32>> {
        robot
            .sensors
            .iter()
            .map(|sensor| robot.simulate_sensor(sensor, arena))
            .collect()
    }

    fn request_photo(&mut self, obstacle: Point, face: Direction) {
        info!("{}", wire::format_photo_request(obstacle));
        let _ = face;
    }

    fn request_calibration(&mut self) {
        debug!("calibration requested");
    }
}
