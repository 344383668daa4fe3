//! Direction/movement enums, the grid point type, and the arena constants.
//!
//! Per the redesign guidance, `Direction` is a closed sum type with
//! dedicated rotation functions. No call site is allowed to do raw integer
//! arithmetic on a direction's ordinal.

/// Height of the arena in rows.
pub const ARENA_HEIGHT: usize = 20;
/// Width of the arena in columns.
pub const ARENA_WIDTH: usize = 15;

/// Canonical robot start cell (bottom-left start region anchor).
pub const START_POINT: Point = Point::new(18, 1);
/// Canonical goal cell (top-right goal region anchor).
pub const GOAL_POINT: Point = Point::new(1, 13);

/// Top-left corner of the 3x3 start region.
pub const START_REGION_ORIGIN: Point = Point::new(17, 0);
/// Top-left corner of the 3x3 goal region.
pub const GOAL_REGION_ORIGIN: Point = Point::new(0, 12);

/// A cell coordinate: (row, col), row 0 at the top of the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Point {
    pub row: i32,
    pub col: i32,
}

impl Point {
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// True if within the outer (0,0)..(H,W) bounds, inclusive-exclusive.
    pub fn is_within_range(self) -> bool {
        self.row >= 0
            && self.col >= 0
            && (self.row as usize) < ARENA_HEIGHT
            && (self.col as usize) < ARENA_WIDTH
    }

    /// True if within the strict inner arena: (0,0) exclusive up to
    /// (H-1, W-1) exclusive. Used by the A* planner and the targeted
    /// sweep's candidate filter.
    pub fn is_within_inner_range(self) -> bool {
        self.row > 0
            && self.col > 0
            && (self.row as usize) < ARENA_HEIGHT - 1
            && (self.col as usize) < ARENA_WIDTH - 1
    }

    pub fn manhattan_distance(self, other: Self) -> i32 {
        (self.row - other.row).abs() + (self.col - other.col).abs()
    }

    pub fn offset(self, d_row: i32, d_col: i32) -> Self {
        Self::new(self.row + d_row, self.col + d_col)
    }

    /// The 3x3 footprint centred on this point.
    pub fn footprint(self) -> impl Iterator<Item = Point> {
        let this = self;
        (-1..=1).flat_map(move |dr| (-1..=1).map(move |dc| this.offset(dr, dc)))
    }

    /// The 3x3 block with this point as its top-left corner.
    pub fn footprint_from_origin(self) -> impl Iterator<Item = Point> {
        let this = self;
        (0..3).flat_map(move |dr| (0..3).map(move |dc| this.offset(dr, dc)))
    }

    pub fn is_in_start_region(self) -> bool {
        region_contains(START_REGION_ORIGIN, self)
    }

    pub fn is_in_goal_region(self) -> bool {
        region_contains(GOAL_REGION_ORIGIN, self)
    }
}

fn region_contains(origin: Point, point: Point) -> bool {
    point.row >= origin.row
        && point.row < origin.row + 3
        && point.col >= origin.col
        && point.col < origin.col + 3
}

/// One of the eight compass bearings. Only N/E/S/W are used by the
/// planner and exploration engine; the diagonals exist for completeness
/// of the enum algebra (mirroring the original firmware's bearing table)
/// but no operation here produces them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Direction {
    North = 0,
    NorthEast = 1,
    East = 2,
    SouthEast = 3,
    South = 4,
    SouthWest = 5,
    West = 6,
    NorthWest = 7,
}

impl Direction {
    const ORDER: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    fn from_ordinal(ordinal: i32) -> Self {
        Self::ORDER[ordinal.rem_euclid(8) as usize]
    }

    fn ordinal(self) -> i32 {
        self as i32
    }

    /// Rotate 90 degrees clockwise (adds 2 mod 8).
    pub fn clockwise(self) -> Self {
        Self::from_ordinal(self.ordinal() + 2)
    }

    /// Rotate 90 degrees anti-clockwise (adds 6 mod 8).
    pub fn anticlockwise(self) -> Self {
        Self::from_ordinal(self.ordinal() + 6)
    }

    /// The reverse bearing (adds 4 mod 8).
    pub fn opposite(self) -> Self {
        Self::from_ordinal(self.ordinal() + 4)
    }

    /// (delta_row, delta_col) for one step in this direction. Only
    /// meaningful for the four cardinal directions.
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::North => (-1, 0),
            Direction::East => (0, 1),
            Direction::South => (1, 0),
            Direction::West => (0, -1),
            Direction::NorthEast => (-1, 1),
            Direction::SouthEast => (1, 1),
            Direction::SouthWest => (1, -1),
            Direction::NorthWest => (-1, -1),
        }
    }

    /// Number of clockwise quarter-turns (in units of 2, i.e. 0/2/4/6)
    /// needed to rotate `self` onto `destination`.
    pub fn right_rotations_to(self, destination: Direction) -> i32 {
        (destination.ordinal() - self.ordinal()).rem_euclid(8)
    }

    pub fn cardinal() -> [Direction; 4] {
        [
            Direction::North,
            Direction::East,
            Direction::South,
            Direction::West,
        ]
    }
}

/// A relative motion the robot can be commanded to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Movement {
    Forward,
    Backward,
    Left,
    Right,
}

impl Movement {
    pub fn as_char(self) -> char {
        match self {
            Movement::Forward => 'F',
            Movement::Backward => 'B',
            Movement::Left => 'L',
            Movement::Right => 'R',
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clockwise_and_anticlockwise_are_inverse() {
        for dir in Direction::cardinal() {
            assert_eq!(dir.clockwise().anticlockwise(), dir);
        }
    }

    #[test]
    fn opposite_is_two_clockwise_turns() {
        assert_eq!(Direction::North.opposite(), Direction::South);
        assert_eq!(Direction::East.opposite(), Direction::West);
    }

    #[test]
    fn right_rotations_to_matches_turn_cost_buckets() {
        assert_eq!(Direction::North.right_rotations_to(Direction::North), 0);
        assert_eq!(Direction::North.right_rotations_to(Direction::East), 2);
        assert_eq!(Direction::North.right_rotations_to(Direction::South), 4);
        assert_eq!(Direction::North.right_rotations_to(Direction::West), 6);
    }

    #[test]
    fn footprint_is_nine_cells() {
        let count = Point::new(5, 5).footprint().count();
        assert_eq!(count, 9);
    }

    #[test]
    fn inner_range_excludes_outer_ring() {
        assert!(!Point::new(0, 5).is_within_inner_range());
        assert!(!Point::new(19, 5).is_within_inner_range());
        assert!(!Point::new(5, 0).is_within_inner_range());
        assert!(!Point::new(5, 14).is_within_inner_range());
        assert!(Point::new(1, 1).is_within_inner_range());
        assert!(Point::new(18, 13).is_within_inner_range());
    }
}
