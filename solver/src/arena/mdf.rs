//! Map Descriptor Format encode/decode (spec.md §4.1, §6).
//!
//! P1 is the explored bitmap (with a "11" sentinel prefix/suffix), P2 is
//! the obstacle bitmap restricted to explored cells. Both are packed into
//! uppercase hex.

use super::{row_reversed_scan, Cell, ExplorationState, Grid};
use crate::geometry::{ARENA_HEIGHT, ARENA_WIDTH};

const CELL_COUNT: usize = ARENA_HEIGHT * ARENA_WIDTH;
/// "11" prefix + one bit per cell + "11" suffix.
const P1_MEANINGFUL_BITS: usize = 2 + CELL_COUNT + 2;

fn pack_bits(bits: &[bool]) -> String {
    debug_assert_eq!(bits.len() % 4, 0);
    bits.chunks(4)
        .map(|chunk| {
            let nibble = chunk.iter().fold(0u8, |acc, &bit| (acc << 1) | bit as u8);
            std::char::from_digit(nibble as u32, 16)
                .expect("nibble is always 0..=15")
                .to_ascii_uppercase()
        })
        .collect()
}

fn unpack_hex(hex: &str) -> Result<Vec<bool>, String> {
    let mut bits = Vec::with_capacity(hex.len() * 4);
    for ch in hex.chars() {
        let nibble = ch
            .to_digit(16)
            .ok_or_else(|| format!("invalid hex digit: {ch}"))?;
        for shift in (0..4).rev() {
            bits.push((nibble >> shift) & 1 == 1);
        }
    }
    Ok(bits)
}

fn front_pad_to_multiple_of(bits: &mut Vec<bool>, multiple: usize) {
    let remainder = bits.len() % multiple;
    if remainder != 0 {
        let mut padded = vec![false; multiple - remainder];
        padded.append(bits);
        *bits = padded;
    }
}

fn back_pad_to_multiple_of(bits: &mut Vec<bool>, multiple: usize) {
    let remainder = bits.len() % multiple;
    if remainder != 0 {
        bits.extend(std::iter::repeat(false).take(multiple - remainder));
    }
}

pub fn encode(exploration: &Grid<ExplorationState>, obstacle: &Grid<Cell>) -> (String, String) {
    let scan: Vec<_> = row_reversed_scan().collect();

    let mut p1_bits = vec![true, true];
    for &point in &scan {
        p1_bits.push(matches!(exploration.get(point), ExplorationState::Explored));
    }
    p1_bits.push(true);
    p1_bits.push(true);
    front_pad_to_multiple_of(&mut p1_bits, 4);
    let p1 = pack_bits(&p1_bits);

    let mut p2_bits = Vec::new();
    for &point in &scan {
        if matches!(exploration.get(point), ExplorationState::Explored) {
            p2_bits.push(matches!(obstacle.get(point), Cell::Obstacle));
        }
    }
    back_pad_to_multiple_of(&mut p2_bits, 8);
    let p2 = pack_bits(&p2_bits);

    (p1, p2)
}

pub fn decode(p1: &str, p2: &str) -> Result<(Grid<ExplorationState>, Grid<Cell>), String> {
    let p1_bits = unpack_hex(p1)?;
    if p1_bits.len() < P1_MEANINGFUL_BITS {
        return Err(format!(
            "P1 too short: decoded {} bits, need at least {}",
            p1_bits.len(),
            P1_MEANINGFUL_BITS
        ));
    }
    let front_padding = p1_bits.len() - P1_MEANINGFUL_BITS;
    let body = &p1_bits[front_padding + 2..front_padding + 2 + CELL_COUNT];

    let p2_bits = unpack_hex(p2)?;
    let mut p2_cursor = p2_bits.into_iter();

    let mut exploration = Grid::filled(ExplorationState::Unexplored);
    let mut obstacle = Grid::filled(Cell::Free);

    for (point, &is_explored) in row_reversed_scan().zip(body.iter()) {
        if is_explored {
            exploration.set(point, ExplorationState::Explored);
            let is_obstacle = p2_cursor
                .next()
                .ok_or_else(|| "P2 ran out of bits for an explored cell".to_string())?;
            obstacle.set(point, if is_obstacle { Cell::Obstacle } else { Cell::Free });
        }
    }

    Ok((exploration, obstacle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_fully_explored_empty_arena() {
        let exploration = Grid::filled(ExplorationState::Explored);
        let obstacle = Grid::filled(Cell::Free);

        let (p1, p2) = encode(&exploration, &obstacle);
        assert!(p1.starts_with("F")); // leading nibble is 1111 = F given no front padding beyond nibble alignment
        let (decoded_exploration, decoded_obstacle) = decode(&p1, &p2).unwrap();

        for point in Grid::<Cell>::iter_points() {
            assert_eq!(
                matches!(decoded_exploration.get(point), ExplorationState::Explored),
                matches!(exploration.get(point), ExplorationState::Explored)
            );
            assert_eq!(
                matches!(decoded_obstacle.get(point), Cell::Obstacle),
                matches!(obstacle.get(point), Cell::Obstacle)
            );
        }
    }

    #[test]
    fn round_trips_obstacle_bits_on_explored_cells_only() {
        let mut exploration = Grid::filled(ExplorationState::Unexplored);
        let mut obstacle = Grid::filled(Cell::Free);

        for point in crate::geometry::START_REGION_ORIGIN.footprint_from_origin() {
            exploration.set(point, ExplorationState::Explored);
        }
        obstacle.set(crate::geometry::START_POINT, Cell::Obstacle);

        let (p1, p2) = encode(&exploration, &obstacle);
        let (decoded_exploration, decoded_obstacle) = decode(&p1, &p2).unwrap();

        assert!(matches!(
            decoded_exploration.get(crate::geometry::START_POINT),
            ExplorationState::Explored
        ));
        assert!(matches!(
            decoded_obstacle.get(crate::geometry::START_POINT),
            Cell::Obstacle
        ));
        assert!(matches!(
            decoded_exploration.get(crate::geometry::GOAL_POINT),
            ExplorationState::Unexplored
        ));
    }

    #[test]
    fn p1_has_prefix_and_suffix_sentinel_bits() {
        let exploration = Grid::filled(ExplorationState::Unexplored);
        let obstacle = Grid::filled(Cell::Free);
        let (p1, _) = encode(&exploration, &obstacle);

        let bits = unpack_hex(&p1).unwrap();
        let padding = bits.len() - P1_MEANINGFUL_BITS;
        assert!(bits[padding] && bits[padding + 1]);
        assert!(bits[bits.len() - 1] && bits[bits.len() - 2]);
    }
}
