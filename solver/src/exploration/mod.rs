//! The right-hug exploration state machine: coverage/time-budgeted
//! frontier following, loop escape, a targeted sweep of leftover
//! unexplored cells, and a guaranteed return-home phase.

pub mod image_recognition;

use std::collections::VecDeque;
use std::time::Instant;

use crate::arena::Arena;
use crate::config::Config;
use crate::error::{CoreError, CoreResult};
use crate::geometry::{Direction, Movement, Point, ARENA_HEIGHT, ARENA_WIDTH, START_POINT};
use crate::planner;
use crate::robot::Robot;

/// The loop-detection signature from spec.md §4.3: six movements of
/// [Forward, Right, Forward, Right, Forward, Right] in a row indicates the
/// right-hug heuristic is circling a pillar.
const LOOP_SIGNATURE: [Movement; 6] = [
    Movement::Forward,
    Movement::Right,
    Movement::Forward,
    Movement::Right,
    Movement::Forward,
    Movement::Right,
];

/// Everything the exploration engine reports back to or requests from its
/// caller, replacing the teacher's ad hoc callback parameters with one
/// capability the engine holds a single reference to.
pub trait ExplorationHost {
    /// Called after every movement is applied to the robot's pose.
    fn report_move(&mut self, movement: Movement, point: Point, facing: Direction);
    /// Called whenever a cell transitions to Explored.
    fn report_cell_explored(&mut self, point: Point);
    /// Requests one reading per sensor, in `robot.sensors` order. An
    /// empty vec means the sensor transport is unavailable.
    fn request_sensors(&mut self, robot: &Robot, arena: &Arena) -> Vec<Option<i32>>;
    /// Requests a photo of `obstacle` from the direction of `face`. Only
    /// used by the image-recognition variant.
    fn request_photo(&mut self, obstacle: Point, face: Direction);
    /// Requests the robot perform its startup calibration routine.
    fn request_calibration(&mut self);
}

/// Drives a sensor reading across every sensor and folds the result into
/// the arena and host, marking newly-sensed cells Explored.
pub(crate) fn sense_and_update(
    arena: &mut Arena,
    robot: &Robot,
    host: &mut dyn ExplorationHost,
) -> CoreResult<()> {
    let readings = host.request_sensors(robot, arena);
    if readings.is_empty() {
        return Err(CoreError::SensorUnavailable);
    }

    for (sensor, reading) in robot.sensors.iter().zip(readings.into_iter()) {
        let origin = sensor.world_point(robot.pose.point, robot.pose.direction);
        let direction = sensor.world_direction(robot.pose.direction);
        let (dr, dc) = direction.offset();
        let (_, upper) = sensor.kind.range();

        match reading {
            None => {
                for i in 1..upper {
                    mark_explored_free(arena, host, origin.offset(dr * i, dc * i));
                }
            }
            Some(i) if i >= 1 => {
                // Never place a reading past the sensor's own physical
                // coverage: a raw value from an external transport can
                // exceed `upper`, in which case only the in-range prefix
                // is trustworthy and no obstacle is placed.
                let capped = i.min(upper);
                for step in 1..capped {
                    mark_explored_free(arena, host, origin.offset(dr * step, dc * step));
                }
                if i < upper {
                    let obstacle_point = origin.offset(dr * capped, dc * capped);
                    if obstacle_point.is_within_range() {
                        arena.mark_obstacle(obstacle_point);
                        arena.mark_explored(obstacle_point);
                        host.report_cell_explored(obstacle_point);
                    }
                }
            }
            Some(_) => {} // reading below the sensor's lower bound: discarded
        }
    }

    Ok(())
}

fn mark_explored_free(arena: &mut Arena, host: &mut dyn ExplorationHost, point: Point) {
    if point.is_within_range() {
        arena.mark_free(point);
        arena.mark_explored(point);
        host.report_cell_explored(point);
    }
}

fn mark_footprint_explored(arena: &mut Arena, host: &mut dyn ExplorationHost, centre: Point) {
    for point in centre.footprint() {
        mark_explored_free(arena, host, point);
    }
}

/// A 3-cell strip, two cells ahead of `centre` along `x_direction`,
/// spanning the perpendicular axis — the corridor-width check the
/// right-hug heuristic uses to decide whether a turn is safe, per
/// spec.md §4.3.
fn strip_is_free(arena: &Arena, centre: Point, x_direction: Direction) -> bool {
    let (xdr, xdc) = x_direction.offset();
    let (pdr, pdc) = x_direction.clockwise().offset();
    let base = centre.offset(xdr * 2, xdc * 2);
    (-1..=1).all(|k| {
        let point = base.offset(pdr * k, pdc * k);
        point.is_within_range() && !arena.is_obstacle(point)
    })
}

/// Top-level engine state, owned by the orchestrator for the lifetime of
/// one exploration run.
pub struct Exploration<'a> {
    config: &'a Config,
    start_time: Instant,
    recent_movements: VecDeque<Movement>,
    is_running: bool,
}

impl<'a> Exploration<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            start_time: Instant::now(),
            recent_movements: VecDeque::with_capacity(config.loop_escape_signature_length),
            is_running: true,
        }
    }

    pub fn stop(&mut self) {
        self.is_running = false;
    }

    pub fn coverage(&self, arena: &Arena) -> f64 {
        let total = ARENA_HEIGHT * ARENA_WIDTH;
        1.0 - (arena.unexplored_count() as f64 / total as f64)
    }

    fn return_budget_seconds(&self, robot: &Robot) -> f64 {
        robot.pose.point.manhattan_distance(START_POINT) as f64 / self.config.robot_speed
    }

    pub fn limit_exceeded(&self, arena: &Arena, robot: &Robot) -> bool {
        if !self.is_running {
            return true;
        }
        if self.coverage(arena) > self.config.coverage_limit {
            return true;
        }
        let elapsed = self.start_time.elapsed().as_secs_f64();
        (elapsed + self.return_budget_seconds(robot)) > self.config.time_limit_seconds
    }

    fn record_movement(&mut self, movement: Movement) {
        if self.recent_movements.len() == self.config.loop_escape_signature_length {
            self.recent_movements.pop_front();
        }
        self.recent_movements.push_back(movement);
    }

    fn signature_matches_loop(&self) -> bool {
        self.recent_movements.len() == LOOP_SIGNATURE.len()
            && self.recent_movements.iter().eq(LOOP_SIGNATURE.iter())
    }

    /// Applies one movement to the robot, reports it to the host, and
    /// re-senses from the new pose.
    fn apply_movement(
        &mut self,
        arena: &mut Arena,
        robot: &mut Robot,
        host: &mut dyn ExplorationHost,
        movement: Movement,
    ) -> CoreResult<()> {
        robot.step(movement);
        self.record_movement(movement);
        host.report_move(movement, robot.pose.point, robot.pose.direction);
        if movement == Movement::Forward || movement == Movement::Backward {
            mark_footprint_explored(arena, host, robot.pose.point);
        }
        sense_and_update(arena, robot, host)
    }

    fn right_is_free(&self, arena: &Arena, robot: &Robot, previous_point: Option<Point>) -> bool {
        let right = robot.pose.direction.clockwise();
        if !strip_is_free(arena, robot.pose.point, right) {
            return false;
        }
        let (dr, dc) = right.offset();
        Some(robot.pose.point.offset(dr, dc)) != previous_point
    }

    fn front_is_free(&self, arena: &Arena, robot: &Robot) -> bool {
        strip_is_free(arena, robot.pose.point, robot.pose.direction)
    }

    fn left_is_free(&self, arena: &Arena, robot: &Robot) -> bool {
        strip_is_free(arena, robot.pose.point, robot.pose.direction.anticlockwise())
    }

    /// Phase 1: a single sensor sweep plus marking the robot's footprint
    /// Explored.
    fn initial_sense(
        &mut self,
        arena: &mut Arena,
        robot: &Robot,
        host: &mut dyn ExplorationHost,
    ) -> CoreResult<()> {
        sense_and_update(arena, robot, host)?;
        mark_footprint_explored(arena, host, robot.pose.point);
        Ok(())
    }

    /// Phase 2: the right-hug loop.
    fn right_hug_loop(
        &mut self,
        arena: &mut Arena,
        robot: &mut Robot,
        host: &mut dyn ExplorationHost,
    ) -> CoreResult<()> {
        let mut entered_goal = false;
        let mut previous_point: Option<Point> = None;

        while !self.limit_exceeded(arena, robot) && !(entered_goal && robot.pose.point == START_POINT) {
            if robot.pose.point == crate::geometry::GOAL_POINT {
                entered_goal = true;
            }

            let current_point = robot.pose.point;

            if self.signature_matches_loop() {
                self.apply_movement(arena, robot, host, Movement::Right)?;
                self.apply_movement(arena, robot, host, Movement::Right)?;
            } else if self.right_is_free(arena, robot, previous_point) {
                self.apply_movement(arena, robot, host, Movement::Right)?;
            } else if self.front_is_free(arena, robot) {
                self.apply_movement(arena, robot, host, Movement::Forward)?;
            } else if self.left_is_free(arena, robot) {
                self.apply_movement(arena, robot, host, Movement::Left)?;
            } else {
                self.apply_movement(arena, robot, host, Movement::Right)?;
                self.apply_movement(arena, robot, host, Movement::Right)?;
            }

            previous_point = Some(current_point);
        }
        Ok(())
    }

    /// Up to 12 candidate neighbours of an unexplored cell: offsets of
    /// (±2,0), (0,±2), and the four diagonal ±1 variants of those.
    fn sweep_candidates(point: Point) -> Vec<(Point, Direction)> {
        let axis_offsets: [((i32, i32), Direction); 4] = [
            ((-2, 0), Direction::South),
            ((2, 0), Direction::North),
            ((0, -2), Direction::East),
            ((0, 2), Direction::West),
        ];

        let mut candidates = Vec::with_capacity(12);
        for (base, required_facing) in axis_offsets {
            // The ±1 variants shift along the axis perpendicular to the
            // base offset, not the base's own axis: a vertical base
            // (±2,0) gets column variants, a horizontal base (0,±2) gets
            // row variants, so all three candidates per base clear the
            // target's own footprint instead of two of them landing
            // inside it.
            let perpendicular = if base.0 != 0 { (0, 1) } else { (1, 0) };
            for variant in [(0, 0), perpendicular, (-perpendicular.0, -perpendicular.1)] {
                let offset = (base.0 + variant.0, base.1 + variant.1);
                candidates.push((point.offset(offset.0, offset.1), required_facing));
            }
        }
        candidates
    }

    /// Phase 3: sweep remaining unexplored cells by driving to a nearby
    /// vantage point for each.
    fn targeted_sweep(
        &mut self,
        arena: &mut Arena,
        robot: &mut Robot,
        host: &mut dyn ExplorationHost,
    ) -> CoreResult<()> {
        loop {
            if self.limit_exceeded(arena, robot) {
                return Ok(());
            }

            let unexplored: Vec<Point> = crate::arena::Grid::<crate::arena::Cell>::iter_points()
                .filter(|&point| !arena.is_explored(point))
                .collect();
            if unexplored.is_empty() {
                return Ok(());
            }

            let mut best: Option<(Point, Direction, i32)> = None;
            for target in &unexplored {
                for (candidate, facing) in Self::sweep_candidates(*target) {
                    if !candidate.is_within_inner_range() || arena.is_obstacle(candidate) {
                        continue;
                    }
                    if candidate.footprint().any(|p| p.is_within_range() && !arena.is_explored(p)) {
                        continue;
                    }
                    let distance = candidate.manhattan_distance(robot.pose.point);
                    if best.map(|(_, _, best_distance)| distance < best_distance).unwrap_or(true) {
                        best = Some((candidate, facing, distance));
                    }
                }
            }

            let Some((candidate, required_facing, _)) = best else {
                return Ok(()); // no reachable candidate: phase 3 terminates
            };

            let grid = arena.planning_grid(false);
            let path = planner::plan(&grid, robot.pose.point, robot.pose.direction, None, candidate)?;
            self.replay_path(arena, robot, host, &path)?;

            let rotations = robot.pose.direction.right_rotations_to(required_facing);
            self.rotate_by(arena, robot, host, rotations)?;
        }
    }

    /// Phase 4: plan home and replay, facing East on arrival.
    fn return_home(
        &mut self,
        arena: &mut Arena,
        robot: &mut Robot,
        host: &mut dyn ExplorationHost,
    ) -> CoreResult<()> {
        let grid = arena.planning_grid(false);
        match planner::plan(&grid, robot.pose.point, robot.pose.direction, None, START_POINT) {
            Ok(path) => {
                self.replay_path(arena, robot, host, &path)?;
                let rotations = robot.pose.direction.right_rotations_to(Direction::East);
                self.rotate_by(arena, robot, host, rotations)?;
                Ok(())
            }
            Err(error) => {
                log::error!("return-home planning failed: {error}");
                Ok(())
            }
        }
    }

    fn replay_path(
        &mut self,
        arena: &mut Arena,
        robot: &mut Robot,
        host: &mut dyn ExplorationHost,
        path: &[planner::PathStep],
    ) -> CoreResult<()> {
        for step in &planner::path_to_movements(path) {
            self.apply_movement(arena, robot, host, *step)?;
        }
        Ok(())
    }

    fn rotate_by(
        &mut self,
        arena: &mut Arena,
        robot: &mut Robot,
        host: &mut dyn ExplorationHost,
        rotations: i32,
    ) -> CoreResult<()> {
        match rotations {
            0 => Ok(()),
            2 => self.apply_movement(arena, robot, host, Movement::Right),
            4 => {
                self.apply_movement(arena, robot, host, Movement::Right)?;
                self.apply_movement(arena, robot, host, Movement::Right)
            }
            6 => self.apply_movement(arena, robot, host, Movement::Left),
            _ => Ok(()),
        }
    }

    /// Runs all four phases to completion (or until the budget is
    /// exceeded).
    pub fn run(
        &mut self,
        arena: &mut Arena,
        robot: &mut Robot,
        host: &mut dyn ExplorationHost,
    ) -> CoreResult<()> {
        self.initial_sense(arena, robot, host)?;
        self.right_hug_loop(arena, robot, host)?;
        self.targeted_sweep(arena, robot, host)?;
        self.return_home(arena, robot, host)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::START_POINT;

    struct RecordingHost {
        moves: Vec<Movement>,
        explored: Vec<Point>,
    }

    impl RecordingHost {
        fn new() -> Self {
            Self {
                moves: Vec::new(),
                explored: Vec::new(),
            }
        }
    }

    impl ExplorationHost for RecordingHost {
        fn report_move(&mut self, movement: Movement, _point: Point, _facing: Direction) {
            self.moves.push(movement);
        }
        fn report_cell_explored(&mut self, point: Point) {
            self.explored.push(point);
        }
        fn request_sensors(&mut self, robot: &Robot, arena: &Arena) -> Vec<Option<i32>> {
            robot
                .sensors
                .iter()
                .map(|sensor| robot.simulate_sensor(sensor, arena))
                .collect()
        }
        fn request_photo(&mut self, _obstacle: Point, _face: Direction) {}
        fn request_calibration(&mut self) {}
    }

    #[test]
    fn coverage_is_monotonic_after_initial_sense() {
        let config = Config::default();
        let arena = Arena::new();
        let mut arena = arena;
        let mut robot = Robot::new(START_POINT, Direction::East, config.robot_speed);
        let mut host = RecordingHost::new();
        let mut engine = Exploration::new(&config);

        let before = engine.coverage(&arena);
        engine.initial_sense(&mut arena, &mut robot, &mut host).unwrap();
        let after = engine.coverage(&arena);
        assert!(after >= before);
    }

    #[test]
    fn loop_signature_is_recognised() {
        let config = Config::default();
        let mut engine = Exploration::new(&config);
        for movement in LOOP_SIGNATURE {
            engine.record_movement(movement);
        }
        assert!(engine.signature_matches_loop());
    }

    #[test]
    fn strip_is_free_rejects_out_of_range() {
        let arena = Arena::new();
        assert!(!strip_is_free(&arena, Point::new(0, 0), Direction::North));
    }

    #[test]
    fn sweep_candidates_returns_twelve_points() {
        let candidates = Exploration::sweep_candidates(Point::new(10, 7));
        assert_eq!(candidates.len(), 12);
    }

    #[test]
    fn sweep_candidates_are_all_distinct_and_outside_the_target_footprint() {
        let target = Point::new(10, 7);
        let candidates = Exploration::sweep_candidates(target);

        let mut seen = std::collections::HashSet::new();
        for (candidate, _) in &candidates {
            assert!(seen.insert(*candidate), "duplicate candidate {candidate:?}");
            assert!(
                !target.footprint().any(|cell| cell == *candidate),
                "candidate {candidate:?} falls inside the target's own footprint"
            );
        }
    }
}
