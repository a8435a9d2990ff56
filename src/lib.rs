//! # Flow Solver Library
//!
//! This library provides the rules of the Flow connection puzzle and a
//! memory-bounded uniform-cost search that finds a cheapest sequence of moves
//! connecting every pair of same-colored endpoints while filling the whole board.
//!
//! It is used by the `flow_solver` binary, which reads board files (or generates a
//! random board), runs the search, and prints or animates the result.
//!
//! ## Modules
//! - `engine`: board description (`GameInfo`), board snapshots (`GameState`), cells,
//!   directions, and the move rules.
//! - `heuristics`: dead-end detection and move counting used for pruning and ordering.
//! - `solver`: the `Rules` trait, the goal test, and the `solve` search driver.
//! - `frontier`: the bounded min-priority queue of pending nodes.
//! - `node`: search nodes and the arena that owns them.
//! - `utils`: board parsing from strings and files, move replay and formatting.
//! - `error`: parse and search error types.

pub mod engine;
pub mod error;
pub mod frontier;
pub mod heuristics;
pub mod node;
pub mod solver;
pub mod utils;

pub use error::{ParseError, SearchError};
pub use solver::{
    is_solved, solve, Rules, SearchConfig, SearchOutcome, SearchResult, SearchStats, Solution,
};
