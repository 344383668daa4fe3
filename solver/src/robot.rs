//! Robot pose, movement semantics, and sensor-ray projection.

use crate::arena::{Arena, Cell};
use crate::geometry::{Direction, Movement, Point};

/// Sensing range, inclusive at the lower bound, exclusive at the upper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorKind {
    Short,
    Long,
}

impl SensorKind {
    pub fn range(self) -> (i32, i32) {
        match self {
            SensorKind::Short => (1, 2),
            SensorKind::Long => (1, 7),
        }
    }
}

/// A single sensor mounted on the robot's body.
#[derive(Debug, Clone, Copy)]
pub struct SensorDescriptor {
    pub kind: SensorKind,
    /// Offset relative to the robot centre, in the robot's own frame.
    pub body_offset: (i32, i32),
    pub mount_direction: Direction,
}

impl SensorDescriptor {
    /// Where this sensor's ray originates, in world coordinates, given
    /// the robot's current pose.
    pub fn world_point(self, robot_point: Point, robot_direction: Direction) -> Point {
        let (a, b) = self.body_offset;
        match robot_direction {
            Direction::North => robot_point.offset(-a, b),
            Direction::East => robot_point.offset(b, a),
            Direction::South => robot_point.offset(a, -b),
            Direction::West => robot_point.offset(-b, -a),
            _ => robot_point,
        }
    }

    /// This sensor's absolute ray direction, given the robot's current
    /// facing: the mount direction rotated by however far the robot has
    /// turned from North.
    pub fn world_direction(self, robot_direction: Direction) -> Direction {
        let turns = Direction::North.right_rotations_to(robot_direction);
        let mut direction = self.mount_direction;
        for _ in (0..turns).step_by(2) {
            direction = direction.clockwise();
        }
        direction
    }
}

/// The default 6-sensor loadout, mirroring the physical sensor placement
/// described in spec.md §3 (the original checklist's SR1..SR3/LR1, SR5
/// layout around the robot's front and sides).
pub fn default_sensor_loadout() -> Vec<SensorDescriptor> {
    vec![
        SensorDescriptor {
            kind: SensorKind::Short,
            body_offset: (1, -1),
            mount_direction: Direction::North,
        },
        SensorDescriptor {
            kind: SensorKind::Short,
            body_offset: (1, 0),
            mount_direction: Direction::North,
        },
        SensorDescriptor {
            kind: SensorKind::Short,
            body_offset: (1, 1),
            mount_direction: Direction::North,
        },
        SensorDescriptor {
            kind: SensorKind::Long,
            body_offset: (1, -1),
            mount_direction: Direction::West,
        },
        SensorDescriptor {
            kind: SensorKind::Short,
            body_offset: (1, 1),
            mount_direction: Direction::East,
        },
        SensorDescriptor {
            kind: SensorKind::Short,
            body_offset: (-1, 1),
            mount_direction: Direction::East,
        },
    ]
}

/// Pose + sensor loadout + speed. The on-move callback and sensor-read
/// function are injected by the caller (the exploration engine or the
/// fastest-path replayer), per the `ExplorationHost` capability described
/// in spec.md §9 rather than ad hoc callbacks stored on the robot itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pose {
    pub point: Point,
    pub direction: Direction,
}

impl Pose {
    pub fn new(point: Point, direction: Direction) -> Self {
        Self { point, direction }
    }
}

#[derive(Debug, Clone)]
pub struct Robot {
    pub pose: Pose,
    pub sensors: Vec<SensorDescriptor>,
    pub speed: f64,
}

impl Robot {
    pub fn new(point: Point, direction: Direction, speed: f64) -> Self {
        Self {
            pose: Pose::new(point, direction),
            sensors: default_sensor_loadout(),
            speed,
        }
    }

    /// Applies a relative movement to the pose.
    pub fn step(&mut self, movement: Movement) {
        let (dr, dc) = self.pose.direction.offset();
        match movement {
            Movement::Forward => self.pose.point = self.pose.point.offset(dr, dc),
            Movement::Backward => self.pose.point = self.pose.point.offset(-dr, -dc),
            Movement::Right => self.pose.direction = self.pose.direction.clockwise(),
            Movement::Left => self.pose.direction = self.pose.direction.anticlockwise(),
        }
    }

    /// Applies an absolute direction as a one-cell step. Used only by the
    /// fastest-path replayer, per spec.md §4.2.
    pub fn step_towards(&mut self, direction: Direction) {
        let (dr, dc) = direction.offset();
        self.pose.point = self.pose.point.offset(dr, dc);
    }

    /// Simulates a single sensor ray against `reference`, returning the
    /// raw reading the real sensor hardware would produce: `Some(i)` for a
    /// block distance, `None` if nothing was found in range, matching
    /// spec.md §4.2. A reading below the sensor's lower bound is
    /// discarded by the caller (mapped to -1 on the wire), not here.
    pub fn simulate_sensor(&self, sensor: &SensorDescriptor, reference: &Arena) -> Option<i32> {
        let origin = sensor.world_point(self.pose.point, self.pose.direction);
        let direction = sensor.world_direction(self.pose.direction);
        let (dr, dc) = direction.offset();
        let (lower, upper) = sensor.kind.range();

        for i in 1..upper {
            let point = origin.offset(dr * i, dc * i);
            if !point.is_within_range() || matches!(reference.obstacle_grid().get(point), Cell::Obstacle) {
                return Some(if i >= lower { i } else { -1 });
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::START_POINT;

    #[test]
    fn forward_then_backward_is_identity() {
        let mut robot = Robot::new(START_POINT, Direction::East, 1.0);
        let original = robot.pose;
        robot.step(Movement::Forward);
        robot.step(Movement::Backward);
        assert_eq!(robot.pose, original);
    }

    #[test]
    fn right_then_left_is_identity() {
        let mut robot = Robot::new(START_POINT, Direction::North, 1.0);
        let original = robot.pose;
        robot.step(Movement::Right);
        robot.step(Movement::Left);
        assert_eq!(robot.pose, original);
    }

    #[test]
    fn sensor_world_point_matches_spec_table() {
        let sensor = SensorDescriptor {
            kind: SensorKind::Long,
            body_offset: (1, 1),
            mount_direction: Direction::East,
        };
        let point = sensor.world_point(Point::new(10, 7), Direction::East);
        assert_eq!(point, Point::new(11, 8));
    }
}
