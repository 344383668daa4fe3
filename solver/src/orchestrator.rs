//! Dispatches inbound frames to exploration/image-recognition/fastest-path
//! and emits outbound MDF/motion frames, per spec.md §4.5.

use tokio::sync::mpsc;
use tokio::time::sleep;

use crate::arena::Arena;
use crate::config::Config;
use crate::error::{CoreError, CoreResult};
use crate::exploration::image_recognition::ImageRecognitionExploration;
use crate::exploration::{Exploration, ExplorationHost};
use crate::geometry::{Direction, GOAL_POINT, Movement, Point, START_POINT};
use crate::planner;
use crate::robot::Robot;
use crate::wire::InboundFrame;

/// One message crossing from the transport reader task (T1) into the
/// orchestrator task (T2). `Shutdown` is the explicit sentinel the
/// reader pushes on transport failure or a `QQQQQQ` frame, per the
/// redesign guidance (the channel closes rather than the orchestrator
/// polling an `is_running` flag at this layer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundMessage {
    Frame(InboundFrame),
    Shutdown,
}

/// An outbound frame the orchestrator hands to the transport writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundFrame {
    Mdf { p1: String, p2: String },
    MotionBurstHeader,
    MotionChunk(String),
    PhotoRequest(Point),
    Log(String),
}

/// Anything the orchestrator needs from the outside world besides the
/// inbound queue: sensor polling and outbound frame delivery. A real
/// binary implements this over the transport collaborator; tests use an
/// in-memory double.
pub trait Transport {
    fn send(&mut self, frame: OutboundFrame);
    fn poll_sensors(&mut self) -> Vec<Option<i32>>;
}

struct TransportHost<'a, T: Transport> {
    transport: &'a mut T,
}

impl<'a, T: Transport> ExplorationHost for TransportHost<'a, T> {
    fn report_move(&mut self, movement: Movement, point: Point, facing: Direction) {
        log::debug!("moved {movement:?} -> {point:?} facing {facing:?}");
    }

    fn report_cell_explored(&mut self, _point: Point) {}

    fn request_sensors(&mut self, robot: &Robot, _arena: &Arena) -> Vec<Option<i32>> {
        let readings = self.transport.poll_sensors();
        if readings.len() != robot.sensors.len() {
            log::warn!(
                "sensor reading count {} does not match sensor loadout {}",
                readings.len(),
                robot.sensors.len()
            );
        }
        readings
    }

    fn request_photo(&mut self, obstacle: Point, _face: Direction) {
        self.transport.send(OutboundFrame::PhotoRequest(obstacle));
    }

    fn request_calibration(&mut self) {
        log::info!("calibration requested");
    }
}

/// Owns the arena/robot and drains the inbound queue, dispatching each
/// frame and writing outbound frames through `Transport`.
pub struct Orchestrator<T: Transport> {
    config: Config,
    arena: Arena,
    robot: Robot,
    waypoint: Option<Point>,
    transport: T,
}

impl<T: Transport> Orchestrator<T> {
    pub fn new(config: Config, arena: Arena, transport: T) -> Self {
        Self {
            robot: Robot::new(START_POINT, Direction::East, config.robot_speed),
            config,
            arena,
            waypoint: None,
            transport,
        }
    }

    fn emit_mdf(&mut self) {
        let (p1, p2) = self.arena.encode_mdf();
        self.transport.send(OutboundFrame::Mdf { p1, p2 });
    }

    async fn run_exploration(&mut self) -> CoreResult<()> {
        log::info!("starting exploration");
        let mut engine = Exploration::new(&self.config);
        let mut host = TransportHost {
            transport: &mut self.transport,
        };
        let result = engine.run(&mut self.arena, &mut self.robot, &mut host);
        self.emit_mdf();
        result
    }

    async fn run_image_recognition_exploration(&mut self) -> CoreResult<()> {
        log::info!("starting image-recognition exploration");
        let mut engine = ImageRecognitionExploration::new(&self.config);
        let mut host = TransportHost {
            transport: &mut self.transport,
        };
        let result = engine.run(&mut self.arena, &mut self.robot, &mut host);
        self.emit_mdf();
        result
    }

    async fn run_fastest_path(&mut self) -> CoreResult<()> {
        let Some(waypoint) = self.waypoint else {
            log::warn!("FP requested with no waypoint set; discarding");
            return Ok(());
        };

        let grid = self.arena.planning_grid(false);
        let path = match planner::plan(
            &grid,
            self.robot.pose.point,
            self.robot.pose.direction,
            Some(waypoint),
            GOAL_POINT,
        ) {
            Ok(path) => path,
            Err(error) => {
                log::error!("fastest-path planning failed: {error}");
                return Ok(());
            }
        };

        let movements = planner::path_to_movements(&path);
        let consolidated = planner::consolidate_movements(&movements);
        let chunks = planner::split_into_chunks(&consolidated, self.config.motion_chunk_char_budget);

        self.transport.send(OutboundFrame::MotionBurstHeader);
        for chunk in chunks {
            self.transport.send(OutboundFrame::MotionChunk(chunk));
            sleep(std::time::Duration::from_secs_f64(
                self.config.motion_chunk_pacing_seconds,
            ))
            .await;
        }

        for movement in movements {
            self.robot.step(movement);
        }
        Ok(())
    }

    async fn dispatch(&mut self, frame: InboundFrame) -> CoreResult<()> {
        match frame {
            InboundFrame::StartExploration => self.run_exploration().await,
            InboundFrame::StartImageRecognitionExploration => {
                self.run_image_recognition_exploration().await
            }
            InboundFrame::SetWaypoint(point) => {
                if !point.is_within_inner_range() || self.arena.is_obstacle(point) {
                    log::warn!("rejecting waypoint at invalid point {point:?}");
                    return Err(CoreError::Validation(format!("invalid waypoint {point:?}")));
                }
                self.waypoint = Some(point);
                Ok(())
            }
            InboundFrame::SetStart(point) => {
                if !point.is_within_inner_range() || self.arena.is_obstacle(point) {
                    log::warn!("rejecting start pose at invalid point {point:?}");
                    return Err(CoreError::Validation(format!("invalid start pose {point:?}")));
                }
                self.robot.pose.point = point;
                Ok(())
            }
            InboundFrame::StartFastestPath => self.run_fastest_path().await,
            InboundFrame::SensorReadings(_) => Ok(()), // consumed directly by Transport::poll_sensors
            InboundFrame::Terminate => Err(CoreError::Transport),
        }
    }

    /// Drains `inbound` until it closes or a `Terminate`/`Shutdown`
    /// message arrives. Returns normally on clean shutdown; propagates
    /// only `CoreError::Transport`, per the propagation policy in
    /// spec.md §7.
    pub async fn run(&mut self, mut inbound: mpsc::Receiver<InboundMessage>) -> CoreResult<()> {
        while let Some(message) = inbound.recv().await {
            match message {
                InboundMessage::Shutdown => break,
                InboundMessage::Frame(frame) => match self.dispatch(frame).await {
                    Ok(()) => {}
                    Err(error) if error.is_fatal() => return Err(error),
                    Err(error) => log::warn!("recoverable error, continuing: {error}"),
                },
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct RecordingTransport {
        sent: Vec<OutboundFrame>,
        sensor_script: Vec<Vec<Option<i32>>>,
    }

    impl RecordingTransport {
        fn new() -> Self {
            Self {
                sent: Vec::new(),
                sensor_script: Vec::new(),
            }
        }
    }

    impl Transport for RecordingTransport {
        fn send(&mut self, frame: OutboundFrame) {
            self.sent.push(frame);
        }
        fn poll_sensors(&mut self) -> Vec<Option<i32>> {
            self.sensor_script.pop().unwrap_or_default()
        }
    }

    #[tokio::test]
    async fn unset_waypoint_discards_fastest_path_request() {
        let config = Config::default();
        let arena = Arena::new();
        let transport = RecordingTransport::new();
        let mut orchestrator = Orchestrator::new(config, arena, transport);

        orchestrator.dispatch(InboundFrame::StartFastestPath).await.unwrap();
        assert!(orchestrator.transport.sent.is_empty());
    }

    #[tokio::test]
    async fn terminate_frame_is_fatal() {
        let config = Config::default();
        let arena = Arena::new();
        let transport = RecordingTransport::new();
        let mut orchestrator = Orchestrator::new(config, arena, transport);

        let result = orchestrator.dispatch(InboundFrame::Terminate).await;
        assert!(matches!(result, Err(CoreError::Transport)));
    }

    #[tokio::test]
    async fn shutdown_sentinel_ends_the_run_loop_cleanly() {
        let config = Config::default();
        let arena = Arena::new();
        let transport = RecordingTransport::new();
        let mut orchestrator = Orchestrator::new(config, arena, transport);

        let (tx, rx) = mpsc::channel(4);
        tx.send(InboundMessage::Shutdown).await.unwrap();
        drop(tx);
        assert!(orchestrator.run(rx).await.is_ok());
    }

    #[tokio::test]
    async fn rejects_waypoint_outside_inner_range() {
        let config = Config::default();
        let arena = Arena::new();
        let transport = RecordingTransport::new();
        let mut orchestrator = Orchestrator::new(config, arena, transport);

        let result = orchestrator
            .dispatch(InboundFrame::SetWaypoint(Point::new(0, 0)))
            .await;
        assert!(result.is_err());
    }
}
