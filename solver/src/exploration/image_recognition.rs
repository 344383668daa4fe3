//! Image-recognition exploration: the same right-hug/targeted-sweep shell,
//! plus per-obstacle face-photography bookkeeping.

use std::collections::{HashMap, HashSet};

use crate::arena::{Arena, Grid};
use crate::config::Config;
use crate::error::CoreResult;
use crate::geometry::{Direction, Point};
use crate::planner;
use crate::robot::Robot;

use super::{Exploration, ExplorationHost};

/// Tracks, per obstacle cell, which cardinal faces have not yet been
/// photographed.
#[derive(Debug, Default)]
pub struct FaceTracker {
    unphotographed: HashMap<Point, HashSet<Direction>>,
}

impl FaceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an obstacle cell, seeding it with every cardinal face
    /// that isn't against the arena edge and isn't shared with another
    /// already-registered obstacle (opposite-face pruning between
    /// adjacent obstacles), per spec.md §4.3.
    pub fn register_obstacle(&mut self, arena: &Arena, point: Point) {
        let mut faces: HashSet<Direction> = Direction::cardinal().into_iter().collect();

        faces.retain(|&face| {
            let (dr, dc) = face.offset();
            let neighbour = point.offset(dr, dc);
            neighbour.is_within_range()
        });

        for face in Direction::cardinal() {
            let (dr, dc) = face.offset();
            let neighbour = point.offset(dr, dc);
            if neighbour.is_within_range() && arena.is_obstacle(neighbour) {
                faces.remove(&face);
                if let Some(neighbour_faces) = self.unphotographed.get_mut(&neighbour) {
                    neighbour_faces.remove(&face.opposite());
                }
            }
        }

        self.unphotographed.insert(point, faces);
    }

    pub fn mark_photographed(&mut self, point: Point, face: Direction) {
        if let Some(faces) = self.unphotographed.get_mut(&point) {
            faces.remove(&face);
        }
    }

    pub fn remaining(&self) -> impl Iterator<Item = (Point, Direction)> + '_ {
        self.unphotographed.iter().flat_map(|(&point, faces)| {
            faces.iter().map(move |&face| (point, face))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.unphotographed.values().all(|faces| faces.is_empty())
    }
}

/// The photo-taking exploration variant: runs the same shell as
/// `Exploration` but layers face-tracking and photo requests on top.
pub struct ImageRecognitionExploration<'a> {
    inner: Exploration<'a>,
    faces: FaceTracker,
}

impl<'a> ImageRecognitionExploration<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            inner: Exploration::new(config),
            faces: FaceTracker::new(),
        }
    }

    fn refresh_faces(&mut self, arena: &Arena) {
        for point in Grid::<crate::arena::Cell>::iter_points() {
            if arena.is_obstacle(point) {
                self.faces.register_obstacle(arena, point);
            }
        }
    }

    /// Phase: hug any obstacle whose faces are still unphotographed,
    /// requesting a photo whenever a face becomes visible from the
    /// robot's current pose (it is one cardinal step away, unobstructed).
    fn photograph_faces(
        &mut self,
        arena: &mut Arena,
        robot: &mut Robot,
        host: &mut dyn ExplorationHost,
    ) -> CoreResult<()> {
        let entry = robot.pose.point;
        loop {
            self.refresh_faces(arena);
            if self.faces.is_empty() || self.inner.limit_exceeded(arena, robot) {
                return Ok(());
            }

            let remaining: Vec<(Point, Direction)> = self.faces.remaining().collect();
            let Some(&(obstacle, face)) = remaining
                .iter()
                .min_by_key(|(obstacle, _)| obstacle.manhattan_distance(robot.pose.point))
            else {
                return Ok(());
            };

            let (dr, dc) = face.offset();
            let vantage = obstacle.offset(dr, dc);
            if !vantage.is_within_range() || arena.is_obstacle(vantage) {
                self.faces.mark_photographed(obstacle, face);
                continue;
            }

            let grid = arena.planning_grid(false);
            match planner::plan(&grid, robot.pose.point, robot.pose.direction, None, vantage) {
                Ok(path) => {
                    for movement in planner::path_to_movements(&path) {
                        self.inner.apply_movement(arena, robot, host, movement)?;
                    }
                    host.request_photo(obstacle, face);
                    self.faces.mark_photographed(obstacle, face);
                }
                Err(_) => {
                    self.faces.mark_photographed(obstacle, face); // unreachable face, give up on it
                }
            }

            if robot.pose.point == entry {
                return Ok(());
            }
        }
    }

    pub fn run(
        &mut self,
        arena: &mut Arena,
        robot: &mut Robot,
        host: &mut dyn ExplorationHost,
    ) -> CoreResult<()> {
        self.inner.initial_sense(arena, robot, host)?;
        self.refresh_faces(arena);
        self.inner.right_hug_loop(arena, robot, host)?;
        self.photograph_faces(arena, robot, host)?;
        self.inner.targeted_sweep(arena, robot, host)?;
        self.photograph_faces(arena, robot, host)?;
        self.inner.return_home(arena, robot, host)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn isolated_obstacle_starts_with_four_unphotographed_faces() {
        let mut arena = Arena::new();
        let point = Point::new(10, 7);
        arena.mark_obstacle(point);

        let mut tracker = FaceTracker::new();
        tracker.register_obstacle(&arena, point);
        assert_eq!(tracker.remaining().count(), 4);
    }

    #[test]
    fn adjacent_obstacles_prune_their_shared_faces() {
        let mut arena = Arena::new();
        let a = Point::new(10, 7);
        let b = Point::new(10, 8);
        arena.mark_obstacle(a);
        arena.mark_obstacle(b);

        let mut tracker = FaceTracker::new();
        tracker.register_obstacle(&arena, a);
        tracker.register_obstacle(&arena, b);

        let a_faces: HashSet<_> = tracker.unphotographed[&a].clone();
        let b_faces: HashSet<_> = tracker.unphotographed[&b].clone();
        assert!(!a_faces.contains(&Direction::East));
        assert!(!b_faces.contains(&Direction::West));
    }

    #[test]
    fn mark_photographed_removes_the_face() {
        let mut arena = Arena::new();
        let point = Point::new(10, 7);
        arena.mark_obstacle(point);
        let mut tracker = FaceTracker::new();
        tracker.register_obstacle(&arena, point);
        tracker.mark_photographed(point, Direction::North);
        assert!(!tracker.unphotographed[&point].contains(&Direction::North));
    }
}
