//! Lowering a movement sequence into the wire motion payload.

use crate::geometry::Movement;

/// Collapses consecutive identical movements into `<letter><count>|`
/// tokens, e.g. `[F,F,F,R,F,F]` -> `"F3|R1|F2|"`.
pub fn consolidate_movements(movements: &[Movement]) -> String {
    let mut out = String::new();
    let mut iter = movements.iter().peekable();

    while let Some(&movement) = iter.next() {
        let mut count = 1;
        while iter.peek() == Some(&&movement) {
            iter.next();
            count += 1;
        }
        out.push(movement.as_char());
        out.push_str(&count.to_string());
        out.push('|');
    }

    out
}

/// Splits a consolidated motion payload into chunks no longer than
/// `budget` characters, never splitting a token in the middle (a token is
/// everything up to and including its trailing `|`).
pub fn split_into_chunks(payload: &str, budget: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for token in payload.split_inclusive('|') {
        if !current.is_empty() && current.len() + token.len() > budget {
            chunks.push(std::mem::take(&mut current));
        }
        current.push_str(token);
    }
    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consolidates_runs_of_identical_movements() {
        let movements = vec![
            Movement::Forward,
            Movement::Forward,
            Movement::Right,
            Movement::Forward,
        ];
        assert_eq!(consolidate_movements(&movements), "F2|R1|F1|");
    }

    #[test]
    fn empty_movement_list_yields_empty_payload() {
        assert_eq!(consolidate_movements(&[]), "");
    }

    #[test]
    fn chunking_never_splits_a_token() {
        let payload = "F3|R1|F10|L1|F2|";
        let chunks = split_into_chunks(payload, 6);
        assert_eq!(chunks.join(""), payload);
        assert!(chunks.iter().all(|chunk| chunk.len() <= 6));
    }
}
