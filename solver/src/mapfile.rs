//! Loading a canned arena from disk, per spec.md §6's map file format:
//! a single line `P1|P2` of the two MDF strings, read once at boot.

use std::path::Path;

use crate::arena::Arena;
use crate::error::{CoreError, CoreResult};

/// Parses a map file's contents (already read into memory).
pub fn parse(contents: &str) -> CoreResult<Arena> {
    let line = contents
        .lines()
        .find(|line| !line.trim().is_empty())
        .ok_or_else(|| CoreError::Validation("map file is empty".into()))?;

    let (p1, p2) = line
        .split_once('|')
        .ok_or_else(|| CoreError::Validation(format!("map file line missing `|` separator: {line:?}")))?;

    Arena::decode_mdf(p1.trim(), p2.trim())
        .map_err(|error| CoreError::Validation(format!("malformed map file MDF: {error}")))
}

/// Loads and parses a map file from disk. A missing path is not an error
/// at the call site (the map file is optional, per spec.md §6); callers
/// should fall back to [`Arena::new`] themselves when this returns an
/// `Err` from a missing file.
pub fn load(path: &Path) -> CoreResult<Arena> {
    let contents = std::fs::read_to_string(path)
        .map_err(|error| CoreError::Validation(format!("could not read map file {path:?}: {error}")))?;
    parse(&contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_encode_and_parse() {
        let arena = Arena::new();
        let (p1, p2) = arena.encode_mdf();
        let line = format!("{p1}|{p2}\n");
        let parsed = parse(&line).unwrap();
        assert_eq!(parsed.encode_mdf(), (p1, p2));
    }

    #[test]
    fn rejects_a_line_without_a_separator() {
        assert!(parse("not-a-valid-map-line").is_err());
    }

    #[test]
    fn rejects_an_empty_file() {
        assert!(parse("\n\n").is_err());
    }
}
