//! The arena model: obstacle + exploration grids, virtual-wall derivation,
//! and MDF serialization.

mod mdf;

use crate::geometry::{Point, ARENA_HEIGHT, ARENA_WIDTH};

/// The state of a single cell in the obstacle / planning grids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Free,
    Obstacle,
    VirtualWall,
}

/// Whether a cell has been covered by the robot's sensors yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExplorationState {
    Unexplored,
    Explored,
}

/// A flat, row-major grid over the fixed 20x15 arena.
#[derive(Debug, Clone)]
pub struct Grid<T> {
    cells: Vec<T>,
}

impl<T: Copy> Grid<T> {
    pub fn filled(value: T) -> Self {
        Self {
            cells: vec![value; ARENA_HEIGHT * ARENA_WIDTH],
        }
    }

    fn index(point: Point) -> usize {
        debug_assert!(point.is_within_range());
        point.row as usize * ARENA_WIDTH + point.col as usize
    }

    pub fn get(&self, point: Point) -> T {
        self.cells[Self::index(point)]
    }

    pub fn set(&mut self, point: Point, value: T) {
        let idx = Self::index(point);
        self.cells[idx] = value;
    }

    /// All points in the arena, row-major, top-to-bottom.
    pub fn iter_points() -> impl Iterator<Item = Point> {
        (0..ARENA_HEIGHT as i32).flat_map(|row| (0..ARENA_WIDTH as i32).map(move |col| Point::new(row, col)))
    }
}

/// All points in row-reversed, column-ascending scan order: the order the
/// MDF wire format encodes cells in.
pub(super) fn row_reversed_scan() -> impl Iterator<Item = Point> {
    (0..ARENA_HEIGHT as i32)
        .rev()
        .flat_map(|row| (0..ARENA_WIDTH as i32).map(move |col| Point::new(row, col)))
}

/// The mutable arena state owned by the orchestrator: the obstacle grid
/// (ground truth / sensed obstacles) and the exploration grid (coverage).
#[derive(Debug, Clone)]
pub struct Arena {
    obstacle: Grid<Cell>,
    exploration: Grid<ExplorationState>,
}

/// A fixed 20x15 obstacle layout used by `--generate`, row-major from the
/// top (row 0), 1 meaning Obstacle. Ported from the reference
/// implementation's canned arena used for bring-up testing without a
/// saved map file.
const SAMPLE_ARENA: [[u8; ARENA_WIDTH]; ARENA_HEIGHT] = [
    [0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [1, 1, 1, 1, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 0, 0, 0, 0, 1],
    [0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 1],
    [0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0],
    [0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [1, 1, 1, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [0, 0, 0, 0, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 1],
    [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 1],
    [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
];

impl Arena {
    pub fn new() -> Self {
        let mut arena = Self {
            obstacle: Grid::filled(Cell::Free),
            exploration: Grid::filled(ExplorationState::Unexplored),
        };
        arena.mark_start_and_goal_regions();
        arena
    }

    /// An arena pre-populated with the canned `--generate` obstacle
    /// layout, unexplored, per spec.md's map/obstacle invariants (start
    /// and goal regions stay Free and Explored regardless of the table).
    pub fn sample() -> Self {
        let mut arena = Self::new();
        for (row, cells) in SAMPLE_ARENA.iter().enumerate() {
            for (col, &value) in cells.iter().enumerate() {
                if value == 1 {
                    arena.mark_obstacle(Point::new(row as i32, col as i32));
                }
            }
        }
        arena
    }

    fn mark_start_and_goal_regions(&mut self) {
        for point in crate::geometry::START_REGION_ORIGIN
            .footprint_from_origin()
            .chain(crate::geometry::GOAL_REGION_ORIGIN.footprint_from_origin())
        {
            self.obstacle.set(point, Cell::Free);
            self.exploration.set(point, ExplorationState::Explored);
        }
    }

    pub fn obstacle_grid(&self) -> &Grid<Cell> {
        &self.obstacle
    }

    pub fn exploration_grid(&self) -> &Grid<ExplorationState> {
        &self.exploration
    }

    pub fn is_obstacle(&self, point: Point) -> bool {
        point.is_within_range() && matches!(self.obstacle.get(point), Cell::Obstacle)
    }

    pub fn is_explored(&self, point: Point) -> bool {
        point.is_within_range() && matches!(self.exploration.get(point), ExplorationState::Explored)
    }

    /// Marks a cell as an obstacle. The start/goal regions are never
    /// mutated to Obstacle, per the arena invariant.
    pub fn mark_obstacle(&mut self, point: Point) {
        if point.is_within_range() && !point.is_in_start_region() && !point.is_in_goal_region() {
            self.obstacle.set(point, Cell::Obstacle);
        }
    }

    pub fn mark_free(&mut self, point: Point) {
        if point.is_within_range() {
            self.obstacle.set(point, Cell::Free);
        }
    }

    pub fn mark_explored(&mut self, point: Point) {
        if point.is_within_range() {
            self.exploration.set(point, ExplorationState::Explored);
        }
    }

    pub fn mark_footprint_explored(&mut self, centre: Point) {
        for point in centre.footprint() {
            self.mark_explored(point);
        }
    }

    pub fn reset_exploration(&mut self) {
        self.obstacle = Grid::filled(Cell::Free);
        self.exploration = Grid::filled(ExplorationState::Unexplored);
        self.mark_start_and_goal_regions();
    }

    pub fn unexplored_count(&self) -> usize {
        Grid::<ExplorationState>::iter_points()
            .filter(|&point| matches!(self.exploration.get(point), ExplorationState::Unexplored))
            .count()
    }

    /// Writes VirtualWall into `target` for: ring cells that are not
    /// Obstacle, Free neighbours (8-connected) of every Obstacle, and (if
    /// `explored` is given) every cell Unexplored in `explored`.
    pub fn set_virtual_walls(&self, target: &mut Grid<Cell>, explored: Option<&Grid<ExplorationState>>) {
        for point in Grid::<Cell>::iter_points() {
            let is_ring = point.row == 0
                || point.row as usize == ARENA_HEIGHT - 1
                || point.col == 0
                || point.col as usize == ARENA_WIDTH - 1;
            if is_ring && !matches!(target.get(point), Cell::Obstacle) {
                target.set(point, Cell::VirtualWall);
            }
        }

        for point in Grid::<Cell>::iter_points() {
            if !matches!(target.get(point), Cell::Obstacle) {
                continue;
            }
            for dr in -1..=1 {
                for dc in -1..=1 {
                    if dr == 0 && dc == 0 {
                        continue;
                    }
                    let neighbour = point.offset(dr, dc);
                    if neighbour.is_within_range() && matches!(target.get(neighbour), Cell::Free) {
                        target.set(neighbour, Cell::VirtualWall);
                    }
                }
            }
        }

        if let Some(explored) = explored {
            for point in Grid::<Cell>::iter_points() {
                if matches!(explored.get(point), ExplorationState::Unexplored) {
                    target.set(point, Cell::VirtualWall);
                }
            }
        }
    }

    /// Produces a fresh virtual-walled copy of the obstacle grid for
    /// planning. `exploration_aware` treats Unexplored cells as
    /// VirtualWall, per spec.md §3's arena invariant.
    pub fn planning_grid(&self, exploration_aware: bool) -> Grid<Cell> {
        let mut target = self.obstacle.clone();
        let explored = exploration_aware.then_some(&self.exploration);
        self.set_virtual_walls(&mut target, explored);
        target
    }

    pub fn is_not_free(grid: &Grid<Cell>, point: Point) -> bool {
        matches!(grid.get(point), Cell::Obstacle | Cell::VirtualWall)
    }

    pub fn encode_mdf(&self) -> (String, String) {
        mdf::encode(&self.exploration, &self.obstacle)
    }

    pub fn decode_mdf(p1: &str, p2: &str) -> Result<Self, String> {
        let (exploration, obstacle) = mdf::decode(p1, p2)?;
        Ok(Self {
            obstacle,
            exploration,
        })
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_arena_marks_start_and_goal_explored_and_free() {
        let arena = Arena::new();
        assert!(arena.is_explored(crate::geometry::START_POINT));
        assert!(arena.is_explored(crate::geometry::GOAL_POINT));
        assert!(!arena.is_obstacle(crate::geometry::START_POINT));
        assert!(!arena.is_obstacle(crate::geometry::GOAL_POINT));
    }

    #[test]
    fn mark_obstacle_is_a_no_op_inside_protected_regions() {
        let mut arena = Arena::new();
        arena.mark_obstacle(crate::geometry::START_POINT);
        assert!(!arena.is_obstacle(crate::geometry::START_POINT));
    }

    #[test]
    fn virtual_walls_surround_every_obstacle() {
        let mut arena = Arena::new();
        arena.mark_obstacle(Point::new(10, 7));
        let grid = arena.planning_grid(false);

        for dr in -1..=1 {
            for dc in -1..=1 {
                if dr == 0 && dc == 0 {
                    continue;
                }
                let neighbour = Point::new(10, 7).offset(dr, dc);
                assert!(!matches!(grid.get(neighbour), Cell::Free));
            }
        }
    }

    #[test]
    fn ring_is_virtual_wall_unless_obstacle() {
        let arena = Arena::new();
        let grid = arena.planning_grid(false);
        assert!(matches!(grid.get(Point::new(0, 5)), Cell::VirtualWall));
        assert!(matches!(
            grid.get(Point::new(19, 5)),
            Cell::VirtualWall
        ));
    }

    #[test]
    fn exploration_aware_planning_treats_unexplored_as_wall() {
        let arena = Arena::new();
        let grid = arena.planning_grid(true);
        // A cell far from start/goal regions, never marked explored.
        assert!(Arena::is_not_free(&grid, Point::new(10, 7)));
    }

    #[test]
    fn sample_arena_marks_obstacles_and_keeps_regions_clear() {
        let arena = Arena::sample();
        assert!(arena.is_obstacle(Point::new(3, 0)));
        assert!(arena.is_obstacle(Point::new(14, 7)));
        assert!(!arena.is_obstacle(crate::geometry::START_POINT));
        assert!(!arena.is_obstacle(crate::geometry::GOAL_POINT));
    }

    #[test]
    fn reset_exploration_clears_both_grids() {
        let mut arena = Arena::new();
        arena.mark_obstacle(Point::new(5, 5));
        arena.mark_explored(Point::new(5, 5));
        arena.reset_exploration();
        assert!(!arena.is_obstacle(Point::new(5, 5)));
        assert!(!arena.is_explored(Point::new(5, 5)));
        assert!(arena.is_explored(crate::geometry::START_POINT));
    }
}
