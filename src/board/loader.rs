//! Board file loading.
//!
//! A board file has one line per region, in index order. Each line is a
//! `;`-separated list of neighbor indices; an empty line means the region has
//! no neighbors. The region count is the number of lines.
//!
//! ```text
//! 1
//! 0;2
//! 1
//! ```

use std::fs;
use std::path::Path;

use super::graph::RegionGraph;
use super::region::{Region, MAX_NEIGHBORS};

/// Separator between neighbor indices on a board line.
pub const NEIGHBOR_SEPARATOR: char = ';';

/// Errors that can occur while loading a board.
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("cannot read board file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("exceeded max neighbor count ({max}) on line {line}")]
    TooManyNeighbors { line: usize, max: usize },

    #[error("invalid neighbor index '{token}' on line {line}")]
    InvalidNeighbor { line: usize, token: String },

    #[error("neighbor {neighbor} on line {line} is outside the board ({regions} regions)")]
    NeighborOutOfRange {
        line: usize,
        neighbor: usize,
        regions: usize,
    },
}

/// Reads and parses a board file.
pub fn load_regions<P: AsRef<Path>>(path: P) -> Result<RegionGraph, BoardError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| BoardError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_regions(&text)
}

/// Parses board text into a graph with every region unclaimed.
///
/// Line numbers in errors are zero-based and equal the region index.
pub fn parse_regions(text: &str) -> Result<RegionGraph, BoardError> {
    let lines: Vec<&str> = text.lines().collect();
    let count = lines.len();
    let mut regions = Vec::with_capacity(count);

    for (line_no, line) in lines.iter().enumerate() {
        let mut region = Region::new();
        for token in line.split(NEIGHBOR_SEPARATOR) {
            let token = token.trim();
            if token.is_empty() {
                continue;
            }
            let neighbor: usize = token.parse().map_err(|_| BoardError::InvalidNeighbor {
                line: line_no,
                token: token.to_string(),
            })?;
            if neighbor >= count {
                return Err(BoardError::NeighborOutOfRange {
                    line: line_no,
                    neighbor,
                    regions: count,
                });
            }
            if !region.push_neighbor(neighbor) {
                return Err(BoardError::TooManyNeighbors {
                    line: line_no,
                    max: MAX_NEIGHBORS,
                });
            }
        }
        regions.push(region);
    }

    Ok(RegionGraph::from_regions(regions))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::region::Owner;

    #[test]
    fn parses_chain() {
        let g = parse_regions("1\n0;2\n1\n").unwrap();
        assert_eq!(g.len(), 3);
        assert_eq!(g.neighbors(0), &[1]);
        assert_eq!(g.neighbors(1), &[0, 2]);
        assert_eq!(g.neighbors(2), &[1]);
        assert!(g.regions().iter().all(|r| r.owner == Owner::Unclaimed));
    }

    #[test]
    fn empty_line_means_no_neighbors() {
        let g = parse_regions("1\n\n0\n").unwrap();
        assert_eq!(g.len(), 3);
        assert!(g.neighbors(1).is_empty());
    }

    #[test]
    fn last_line_without_newline_counts() {
        let g = parse_regions("1\n0").unwrap();
        assert_eq!(g.len(), 2);
        assert_eq!(g.neighbors(1), &[0]);
    }

    #[test]
    fn crlf_and_whitespace_are_tolerated() {
        let g = parse_regions("1 ; 2\r\n0\r\n0;\r\n").unwrap();
        assert_eq!(g.len(), 3);
        assert_eq!(g.neighbors(0), &[1, 2]);
        assert_eq!(g.neighbors(2), &[0]);
    }

    #[test]
    fn self_loops_and_asymmetry_are_kept() {
        let g = parse_regions("0;1\n\n").unwrap();
        assert_eq!(g.neighbors(0), &[0, 1]);
        assert!(g.neighbors(1).is_empty());
    }

    #[test]
    fn region_count_equals_line_count() {
        let text = "1;2;3\n0\n0\n0\n\n\n";
        let g = parse_regions(text).unwrap();
        assert_eq!(g.len(), text.lines().count());
        assert!(g.regions().iter().all(|r| r.num_neighbors() <= MAX_NEIGHBORS));
    }

    #[test]
    fn six_neighbors_is_allowed() {
        let mut text = String::from("1;2;3;4;5;6\n");
        for _ in 0..6 {
            text.push_str("0\n");
        }
        let g = parse_regions(&text).unwrap();
        assert_eq!(g.neighbors(0).len(), 6);
    }

    #[test]
    fn seven_neighbors_is_fatal() {
        let mut text = String::from("0\n1;2;3;4;5;6;7\n");
        for _ in 0..6 {
            text.push_str("0\n");
        }
        let err = parse_regions(&text).unwrap_err();
        assert!(matches!(err, BoardError::TooManyNeighbors { line: 1, max: 6 }));
    }

    #[test]
    fn garbage_token_is_fatal() {
        let err = parse_regions("x\n").unwrap_err();
        assert!(matches!(err, BoardError::InvalidNeighbor { line: 0, .. }));
        let err = parse_regions("-1\n").unwrap_err();
        assert!(matches!(err, BoardError::InvalidNeighbor { .. }));
    }

    #[test]
    fn out_of_range_neighbor_is_fatal() {
        let err = parse_regions("1\n5\n").unwrap_err();
        assert!(matches!(
            err,
            BoardError::NeighborOutOfRange {
                line: 1,
                neighbor: 5,
                regions: 2
            }
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_regions("/nonexistent/board.risk").unwrap_err();
        assert!(matches!(err, BoardError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/board.risk"));
    }

    #[test]
    fn empty_text_gives_empty_graph() {
        let g = parse_regions("").unwrap();
        assert!(g.is_empty());
    }
}
