//! Error types for board parsing and search setup.
//!
//! The three search outcomes (`Success`, `Full`, `Unreachable`) are not errors and are
//! reported through [`crate::solver::SearchResult`]. `SearchError` only covers failures
//! that prevent the search from running at all.

use crate::engine::{MAX_COLORS, MAX_SIZE};

/// Problems found while reading or validating a board description.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("failed to read board file: {0}")]
    Io(#[from] std::io::Error),

    #[error("board is empty")]
    EmptyBoard,

    #[error("board is {0}x{0}, larger than the maximum of {max}", max = MAX_SIZE)]
    TooLarge(usize),

    #[error("row {row} has {found} cells, expected {expected}")]
    NotSquare {
        row: usize,
        found: usize,
        expected: usize,
    },

    #[error("unrecognized character '{ch}' in row {row} col {col}")]
    UnrecognizedCharacter { ch: char, row: usize, col: usize },

    #[error("color '{0}' appears more than twice")]
    ColorOverused(char),

    #[error("color '{0}' has only one endpoint")]
    UnpairedColor(char),

    #[error("board uses {0} colors, at most {max} are supported", max = MAX_COLORS)]
    TooManyColors(usize),

    #[error("endpoint of color '{ch}' at cell {pos} is outside the {size}x{size} board")]
    EndpointOffBoard { ch: char, pos: usize, size: usize },

    #[error("endpoint of color '{ch}' at cell {pos} is already taken")]
    EndpointOverlap { ch: char, pos: usize },

    #[error("cannot place {colors} color pairs on a {size}x{size} board")]
    BoardTooSmall { size: usize, colors: usize },
}

/// Fatal failures that abort a search before or during setup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    /// Neither `max_nodes` nor the memory budget leaves room for a single node.
    #[error("node budget is zero; raise max_nodes or max_mb")]
    ZeroNodeBudget,

    /// Backing storage for the node arena or the frontier could not be allocated.
    #[error("failed to allocate {what} storage for {count} entries")]
    OutOfMemory { what: &'static str, count: usize },
}
