//! Fastest-path planning: turn-cost-aware A*, waypoint chaining, and
//! lowering a point path into a movement sequence.

mod motion;

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use crate::arena::{Arena, Cell, Grid};
use crate::error::{CoreError, CoreResult};
use crate::geometry::{Direction, Movement, Point};

pub use motion::{consolidate_movements, split_into_chunks};

const STRAIGHT_TURN_COST: i32 = 0;
const PERPENDICULAR_TURN_COST: i32 = 2;
const OPPOSITE_TURN_COST: i32 = 4;
const MOVE_COST: i32 = 1;

fn turn_cost(from: Direction, to: Direction) -> i32 {
    match from.right_rotations_to(to) {
        0 => STRAIGHT_TURN_COST,
        2 | 6 => PERPENDICULAR_TURN_COST,
        4 => OPPOSITE_TURN_COST,
        _ => PERPENDICULAR_TURN_COST,
    }
}

/// A node as the reference A* sees it: equality and hashing are over
/// `point` alone, so the open/closed set never treats the same cell
/// reached via two different facings as two nodes. `facing` rides along
/// as the arrival heading, used only for this node's own turn-cost
/// bookkeeping — it never participates in identity.
#[derive(Debug, Clone, Copy)]
struct NodeInfo {
    facing: Direction,
    g: i32,
    came_from: Option<Point>,
}

#[derive(Debug, Clone, Copy)]
struct OpenEntry {
    point: Point,
    facing: Direction,
    g: i32,
    f: i32,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.f == other.f
    }
}
impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap, we want the lowest f first.
        other.f.cmp(&self.f)
    }
}

/// One step of a planned path: the cell reached and the facing the robot
/// holds upon reaching it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathStep {
    pub point: Point,
    pub facing: Direction,
}

/// Runs a single A* search from `start` (at `start_facing`) to `goal`.
/// Returns the full step sequence including the starting cell.
fn find_fastest_path(
    grid: &Grid<Cell>,
    start: Point,
    start_facing: Direction,
    goal: Point,
) -> CoreResult<Vec<PathStep>> {
    if !start.is_within_inner_range() || Arena::is_not_free(grid, start) {
        return Err(CoreError::Validation(format!("invalid start point {start:?}")));
    }
    if !goal.is_within_inner_range() || Arena::is_not_free(grid, goal) {
        return Err(CoreError::Validation(format!("invalid goal point {goal:?}")));
    }

    let mut open = BinaryHeap::new();
    let mut nodes: HashMap<Point, NodeInfo> = HashMap::new();

    nodes.insert(
        start,
        NodeInfo {
            facing: start_facing,
            g: 0,
            came_from: None,
        },
    );
    open.push(OpenEntry {
        point: start,
        facing: start_facing,
        g: 0,
        f: start.manhattan_distance(goal),
    });

    while let Some(current) = open.pop() {
        if let Some(recorded) = nodes.get(&current.point) {
            if recorded.g < current.g {
                continue; // stale entry, a cheaper one already closed this point
            }
        }

        if current.point == goal {
            return Ok(reconstruct_path(&nodes, current.point));
        }

        for direction in Direction::cardinal() {
            let (dr, dc) = direction.offset();
            let neighbour_point = current.point.offset(dr, dc);
            if !neighbour_point.is_within_inner_range() || Arena::is_not_free(grid, neighbour_point) {
                continue;
            }

            let tentative_g = current.g + MOVE_COST + turn_cost(current.facing, direction);

            let is_better = nodes
                .get(&neighbour_point)
                .map(|existing| tentative_g < existing.g)
                .unwrap_or(true);

            if is_better {
                nodes.insert(
                    neighbour_point,
                    NodeInfo {
                        facing: direction,
                        g: tentative_g,
                        came_from: Some(current.point),
                    },
                );
                let h = neighbour_point.manhattan_distance(goal);
                open.push(OpenEntry {
                    point: neighbour_point,
                    facing: direction,
                    g: tentative_g,
                    f: tentative_g + h,
                });
            }
        }
    }

    Err(CoreError::Planning {
        from: start,
        to: goal,
    })
}

fn reconstruct_path(nodes: &HashMap<Point, NodeInfo>, mut current: Point) -> Vec<PathStep> {
    let mut path = vec![PathStep {
        point: current,
        facing: nodes[&current].facing,
    }];
    while let Some(previous) = nodes[&current].came_from {
        current = previous;
        path.push(PathStep {
            point: current,
            facing: nodes[&current].facing,
        });
    }
    path.reverse();
    path
}

/// Plans from `start` to `goal`, optionally routing through `waypoint`
/// first (two sequential A* runs chained at the waypoint's arrival
/// facing), per the waypoint-chaining redesign.
pub fn plan(
    grid: &Grid<Cell>,
    start: Point,
    start_facing: Direction,
    waypoint: Option<Point>,
    goal: Point,
) -> CoreResult<Vec<PathStep>> {
    match waypoint {
        None => find_fastest_path(grid, start, start_facing, goal),
        Some(waypoint) => {
            let mut first_leg = find_fastest_path(grid, start, start_facing, waypoint)?;
            let arrival_facing = first_leg.last().expect("path always has at least one step").facing;
            let second_leg = find_fastest_path(grid, waypoint, arrival_facing, goal)?;
            first_leg.extend(second_leg.into_iter().skip(1));
            Ok(first_leg)
        }
    }
}

/// Lowers a point/facing path into the sequence of relative movements the
/// robot must execute to traverse it.
pub fn path_to_movements(path: &[PathStep]) -> Vec<Movement> {
    let mut movements = Vec::new();
    for window in path.windows(2) {
        let (from, to) = (window[0], window[1]);
        let turn = from.facing.right_rotations_to(to.facing);
        match turn {
            0 => {}
            2 => movements.push(Movement::Right),
            6 => movements.push(Movement::Left),
            4 => {
                movements.push(Movement::Right);
                movements.push(Movement::Right);
            }
            _ => unreachable!("cardinal turns are always multiples of 2"),
        }
        let _ = to.point; // step is always one forward cell after facing the right way
        movements.push(Movement::Forward);
    }
    movements
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;

    #[test]
    fn straight_line_path_has_no_turns() {
        let arena = Arena::new();
        let grid = arena.planning_grid(false);
        let path = find_fastest_path(&grid, Point::new(10, 5), Direction::North, Point::new(5, 5)).unwrap();
        let movements = path_to_movements(&path);
        assert!(movements.iter().all(|&m| m == Movement::Forward));
        assert_eq!(movements.len(), 5);
    }

    #[test]
    fn unreachable_goal_returns_planning_error() {
        let mut arena = Arena::new();
        // A solid obstacle wall spanning the full inner width seals the
        // arena into two halves without blocking the goal cell itself.
        for col in 1..14 {
            arena.mark_obstacle(Point::new(9, col));
        }
        let grid = arena.planning_grid(false);
        let result = find_fastest_path(&grid, Point::new(18, 1), Direction::North, Point::new(1, 13));
        assert!(matches!(result, Err(CoreError::Planning { .. })));
    }

    #[test]
    fn waypoint_chaining_visits_the_waypoint() {
        let arena = Arena::new();
        let grid = arena.planning_grid(false);
        let path = plan(
            &grid,
            Point::new(18, 1),
            Direction::North,
            Some(Point::new(10, 5)),
            Point::new(1, 13),
        )
        .unwrap();
        assert!(path.iter().any(|step| step.point == Point::new(10, 5)));
    }

    #[test]
    fn turn_cost_buckets_match_spec() {
        assert_eq!(turn_cost(Direction::North, Direction::North), 0);
        assert_eq!(turn_cost(Direction::North, Direction::East), 2);
        assert_eq!(turn_cost(Direction::North, Direction::South), 4);
    }
}
