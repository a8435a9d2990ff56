//! Pruning and move-ordering heuristics for the Flow engine.
//!
//! Dead-end detection is allowed to miss dead ends (the search stays correct, it
//! just prunes less) but must never flag a cell that could still be filled.

use crate::engine::{Color, Direction, GameInfo, GameState, Pos};

/// Counts the directions in which `color` can currently move.
///
/// Used by the most-constrained color ordering: a color with zero legal moves
/// makes the state unsolvable, one with a single move is forced.
pub fn count_free_moves(info: &GameInfo, state: &GameState, color: Color) -> usize {
    Direction::ALL
        .into_iter()
        .filter(|&direction| info.can_move(state, color, direction))
        .count()
}

/// Whether `pos` is an exit for a free neighbor: a free cell itself, or the current
/// head or goal of a color that is still open.
fn is_exit(info: &GameInfo, state: &GameState, pos: Pos) -> bool {
    if state.cell(pos).is_free() {
        return true;
    }
    (0..info.num_colors()).any(|color| {
        !state.is_completed(color) && (state.head(color) == pos || info.goal_pos(color) == pos)
    })
}

/// Whether the free cell at `pos` can no longer be filled.
///
/// A path passing through a free cell needs one way in and one way out, so a free
/// cell with at most one exit among its neighbors is a dead end.
pub fn is_dead_end_cell(info: &GameInfo, state: &GameState, pos: Pos) -> bool {
    debug_assert!(state.cell(pos).is_free());
    let exits = info
        .neighbors(pos)
        .filter(|&neighbor| is_exit(info, state, neighbor))
        .count();
    exits <= 1
}

/// Checks the free cells around the most recently moved head for dead ends.
///
/// Only the neighborhood of the last move can have changed since the parent state
/// was checked, so the rest of the board is not examined.
///
/// # Returns
/// `true` if at least one free cell next to the last-moved head is a dead end.
/// Always `false` for a state in which no move has been made yet.
pub fn check_dead_ends(info: &GameInfo, state: &GameState) -> bool {
    let Some(color) = state.last_color() else {
        return false;
    };
    let head = state.head(color);
    info.neighbors(head)
        .any(|pos| state.cell(pos).is_free() && is_dead_end_cell(info, state, pos))
}
