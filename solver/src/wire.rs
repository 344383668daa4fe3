//! Inbound/outbound frame parsing and the internal/external coordinate
//! transform, mirroring the teacher's `ros::types` conversions and the
//! original `utils/message_conversion.py` regex-validated parsing.

use regex::Regex;

use crate::error::{CoreError, CoreResult};
use crate::geometry::{Point, ARENA_HEIGHT};

/// Converts an internal (row, col) point into the external (x, y) wire
/// frame: `x = col`, `y = (H-1) − row`.
pub fn to_external(point: Point) -> (i32, i32) {
    (point.col, ARENA_HEIGHT as i32 - 1 - point.row)
}

/// Inverse of [`to_external`]: `row = (H-1) − y`, `col = x`.
pub fn from_external(x: i32, y: i32) -> Point {
    Point::new(ARENA_HEIGHT as i32 - 1 - y, x)
}

/// A parsed inbound control frame, per spec.md §6.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundFrame {
    StartExploration,
    StartImageRecognitionExploration,
    SetWaypoint(Point),
    SetStart(Point),
    StartFastestPath,
    SensorReadings([Option<i32>; 6]),
    Terminate,
}

fn coordinate_pattern() -> Regex {
    Regex::new(r"^\d+\s+\d+$").expect("static regex is always valid")
}

fn sensor_pattern() -> Regex {
    Regex::new(r"^-?\d+(\s+-?\d+){5}$").expect("static regex is always valid")
}

fn parse_coordinate_payload(payload: &str) -> CoreResult<Point> {
    if !coordinate_pattern().is_match(payload) {
        return Err(CoreError::Validation(format!(
            "coordinate payload does not match `\\d+ \\d+`: {payload:?}"
        )));
    }
    let mut parts = payload.split_whitespace();
    let x: i32 = parts.next().unwrap().parse().map_err(|_| {
        CoreError::Validation(format!("non-integer x in coordinate payload: {payload:?}"))
    })?;
    let y: i32 = parts.next().unwrap().parse().map_err(|_| {
        CoreError::Validation(format!("non-integer y in coordinate payload: {payload:?}"))
    })?;
    Ok(from_external(x, y))
}

fn parse_sensor_payload(payload: &str) -> CoreResult<[Option<i32>; 6]> {
    if !sensor_pattern().is_match(payload) {
        return Err(CoreError::Validation(format!(
            "sensor payload does not match six whitespace-separated integers: {payload:?}"
        )));
    }
    let mut readings = [None; 6];
    for (slot, token) in readings.iter_mut().zip(payload.split_whitespace()) {
        let value: i32 = token
            .parse()
            .map_err(|_| CoreError::Validation(format!("non-integer sensor reading: {token:?}")))?;
        *slot = if value == 0 {
            None
        } else if value < 0 {
            Some(-1)
        } else {
            Some(value)
        };
    }
    Ok(readings)
}

/// Parses one inbound frame. `raw` is the whole line, fields separated by
/// `$`: header, then an optional payload.
pub fn parse_inbound(raw: &str) -> CoreResult<InboundFrame> {
    let mut fields = raw.splitn(2, '$');
    let header = fields.next().unwrap_or("").trim();
    let payload = fields.next().map(str::trim);

    match header {
        "EXP" => Ok(InboundFrame::StartExploration),
        "IR" => Ok(InboundFrame::StartImageRecognitionExploration),
        "FP" => Ok(InboundFrame::StartFastestPath),
        "QQQQQQ" => Ok(InboundFrame::Terminate),
        "WP" => {
            let payload = payload.ok_or_else(|| CoreError::Validation("WP frame missing payload".into()))?;
            Ok(InboundFrame::SetWaypoint(parse_coordinate_payload(payload)?))
        }
        "START" => {
            let payload =
                payload.ok_or_else(|| CoreError::Validation("START frame missing payload".into()))?;
            Ok(InboundFrame::SetStart(parse_coordinate_payload(payload)?))
        }
        "P" => {
            let payload = payload.ok_or_else(|| CoreError::Validation("P frame missing payload".into()))?;
            Ok(InboundFrame::SensorReadings(parse_sensor_payload(payload)?))
        }
        other => Err(CoreError::Validation(format!("unrecognised frame header: {other:?}"))),
    }
}

/// Formats an outbound MDF frame: `a MDF <P1> <P2>`.
pub fn format_mdf(p1: &str, p2: &str) -> String {
    format!("a MDF {p1} {p2}")
}

/// Formats an outbound motion frame from a consolidated movement payload.
pub fn format_motion(consolidated: &str) -> String {
    format!("h {consolidated}")
}

/// The leading frame that must precede a fastest-path motion burst.
pub fn motion_burst_header() -> &'static str {
    "hF|"
}

/// Formats an outbound photo request, target cell in the Imaging frame
/// (external mapping returned as integers).
pub fn format_photo_request(point: Point) -> String {
    let (x, y) = to_external(point);
    format!("p {x} {y}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn external_round_trips_internal() {
        let point = Point::new(5, 9);
        let (x, y) = to_external(point);
        assert_eq!(from_external(x, y), point);
    }

    #[test]
    fn parses_waypoint_frame() {
        let frame = parse_inbound("WP$4 7").unwrap();
        assert_eq!(frame, InboundFrame::SetWaypoint(from_external(4, 7)));
    }

    #[test]
    fn rejects_malformed_waypoint_payload() {
        assert!(parse_inbound("WP$not-a-number").is_err());
    }

    #[test]
    fn parses_sensor_frame_mapping_zero_to_none_and_negative_to_discarded() {
        let frame = parse_inbound("P$1 0 -3 5 0 2").unwrap();
        assert_eq!(
            frame,
            InboundFrame::SensorReadings([Some(1), None, Some(-1), Some(5), None, Some(2)])
        );
    }

    #[test]
    fn parses_no_payload_frames() {
        assert_eq!(parse_inbound("EXP").unwrap(), InboundFrame::StartExploration);
        assert_eq!(parse_inbound("QQQQQQ").unwrap(), InboundFrame::Terminate);
    }

    #[test]
    fn rejects_unknown_header() {
        assert!(parse_inbound("BOGUS$1 2").is_err());
    }
}
