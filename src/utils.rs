use std::fs;
use std::path::Path;

use crate::engine::{Color, Direction, GameInfo, GameState, Pos, MAX_COLORS, MAX_SIZE};
use crate::error::ParseError;

/// Parses an array of string slices into a puzzle and its starting state.
///
/// Each string slice is one row of the board, starting from row 0. The board must be
/// square: as many rows as each row has characters.
///
/// Valid characters are:
/// - '.': a free cell
/// - any ASCII letter or digit: an endpoint of the color named by that character
///
/// Every color must appear exactly twice. The first occurrence in row-major order is
/// where the color's path starts; the second is its goal. Colors are numbered in
/// order of first appearance.
///
/// # Returns
/// * `Ok((GameInfo, GameState))` if parsing is successful.
/// * `Err(ParseError)` if the board is empty, not square, too large, contains an
///   unrecognized character, has a color that does not appear exactly twice, or
///   uses more than `MAX_COLORS` colors.
///
/// # Examples
/// ```
/// use flow_solver::utils::game_from_str_array;
///
/// let (info, state) = game_from_str_array(&["A.B", "...", "A.B"]).unwrap();
/// assert_eq!(info.num_colors(), 2);
/// assert_eq!(state.num_free(), 5);
///
/// assert!(game_from_str_array(&["A#", "A."]).is_err());
/// assert!(game_from_str_array(&["A.", "B."]).is_err());
/// ```
pub fn game_from_str_array(rows: &[&str]) -> Result<(GameInfo, GameState), ParseError> {
    let size = rows.len();
    if size == 0 {
        return Err(ParseError::EmptyBoard);
    }
    if size > MAX_SIZE {
        return Err(ParseError::TooLarge(size));
    }

    // (char, first position, second position) in order of first appearance.
    let mut endpoints: Vec<(char, Pos, Option<Pos>)> = Vec::new();

    for (r, row) in rows.iter().enumerate() {
        let found = row.chars().count();
        if found != size {
            return Err(ParseError::NotSquare {
                row: r,
                found,
                expected: size,
            });
        }

        for (c, ch) in row.chars().enumerate() {
            if ch == '.' {
                continue;
            }
            if !ch.is_ascii_alphanumeric() {
                return Err(ParseError::UnrecognizedCharacter { ch, row: r, col: c });
            }
            let pos = r * size + c;
            match endpoints.iter().position(|(existing, _, _)| *existing == ch) {
                Some(i) if endpoints[i].2.is_none() => endpoints[i].2 = Some(pos),
                Some(_) => return Err(ParseError::ColorOverused(ch)),
                None => endpoints.push((ch, pos, None)),
            }
        }
    }

    if endpoints.len() > MAX_COLORS {
        return Err(ParseError::TooManyColors(endpoints.len()));
    }

    let mut pairs = Vec::with_capacity(endpoints.len());
    for (ch, init, goal) in endpoints {
        let goal = goal.ok_or(ParseError::UnpairedColor(ch))?;
        pairs.push((ch, init, goal));
    }

    let info = GameInfo::new(size, pairs)?;
    let state = info.initial_state();
    Ok((info, state))
}

/// Reads a board file and parses it with [`game_from_str_array`].
///
/// Lines are trimmed and blank lines are ignored.
pub fn game_from_file(path: &Path) -> Result<(GameInfo, GameState), ParseError> {
    let content = fs::read_to_string(path)?;
    let lines: Vec<&str> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    game_from_str_array(&lines)
}

/// Plays `moves` from `initial` and returns the state after each one.
///
/// Moves that are not legal in the state they are applied to are skipped, so the
/// returned vector can be shorter than `moves`.
pub fn replay_moves(
    info: &GameInfo,
    initial: &GameState,
    moves: &[(Color, Direction)],
) -> Vec<GameState> {
    let mut states = Vec::with_capacity(moves.len());
    let mut current = initial.clone();
    for &(color, direction) in moves {
        if !info.can_move(&current, color, direction) {
            continue;
        }
        info.apply_move(&mut current, color, direction);
        states.push(current.clone());
    }
    states
}

/// Formats a move list as `A>`, `Bv`, ... separated by spaces.
pub fn format_moves(info: &GameInfo, moves: &[(Color, Direction)]) -> String {
    moves
        .iter()
        .map(|&(color, direction)| format!("{}{}", info.color_char(color), direction.to_char()))
        .collect::<Vec<_>>()
        .join(" ")
}
