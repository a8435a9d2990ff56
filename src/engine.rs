//! Core game engine for the Flow puzzle.
//!
//! This module defines the game's fundamental components:
//! - `Direction`: the four moves a path head can make.
//! - `Cell`: the contents of one board square.
//! - `GameInfo`: the immutable puzzle description (size, endpoint pairs, rule options).
//! - `GameState`: a snapshot of the board during a solve, with its derived counters.
//!
//! A color's path grows from its init endpoint one cell at a time until it steps onto
//! its goal endpoint. A puzzle is solved when every color is connected and no free
//! cell remains.
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::fmt;

use crate::error::ParseError;
use crate::heuristics;
use crate::solver::Rules;

/// Index of a color in `0..GameInfo::num_colors()`.
pub type Color = usize;

/// Row-major cell index, `row * size + col`.
pub type Pos = usize;

/// Maximum number of colors on one board. Completion is tracked in a `u32` bitmask.
pub const MAX_COLORS: usize = 16;

/// Maximum board side length.
pub const MAX_SIZE: usize = 15;

/// Characters used for colors on generated boards, in color-index order.
pub const COLOR_CHARS: [char; MAX_COLORS] = [
    'R', 'B', 'Y', 'G', 'O', 'C', 'M', 'm', 'P', 'A', 'W', 'g', 'T', 'b', 'c', 'p',
];

/// 256-color palette entries used as backgrounds when rendering with ANSI codes.
const ANSI_PALETTE: [u8; MAX_COLORS] = [
    196, 21, 226, 34, 208, 51, 201, 88, 93, 250, 231, 118, 180, 19, 30, 213,
];

/// A move direction. The order of [`Direction::ALL`] is the order in which the
/// solver generates children.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    /// All directions in canonical expansion order.
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];

    /// Row and column offset of one step in this direction.
    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
        }
    }

    /// Arrow character used in move listings.
    ///
    /// ```
    /// use flow_solver::engine::Direction;
    /// assert_eq!(Direction::Up.to_char(), '^');
    /// ```
    pub fn to_char(self) -> char {
        match self {
            Direction::Left => '<',
            Direction::Right => '>',
            Direction::Up => '^',
            Direction::Down => 'v',
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Up => "up",
            Direction::Down => "down",
        };
        f.write_str(name)
    }
}

/// Contents of one board square.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cell {
    Free,
    /// Starting endpoint of a color.
    Init(Color),
    /// Target endpoint of a color.
    Goal(Color),
    /// A path cell, entered from its predecessor by moving in the given direction.
    Path(Color, Direction),
}

impl Cell {
    /// The color occupying this cell, if any.
    pub fn color(&self) -> Option<Color> {
        match *self {
            Cell::Free => None,
            Cell::Init(color) | Cell::Goal(color) | Cell::Path(color, _) => Some(color),
        }
    }

    pub fn is_free(&self) -> bool {
        matches!(self, Cell::Free)
    }
}

/// Rule switches that change how moves are generated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RuleOptions {
    /// Expand the color with the fewest legal moves first, instead of
    /// continuing with the last moved color.
    pub most_constrained: bool,
    /// Forbid moves that would make a path touch itself.
    pub check_touch: bool,
}

impl Default for RuleOptions {
    fn default() -> Self {
        RuleOptions {
            most_constrained: true,
            check_touch: true,
        }
    }
}

/// Immutable description of a puzzle: board size, endpoint pairs, and rule options.
#[derive(Clone, Debug, PartialEq)]
pub struct GameInfo {
    size: usize,
    init_pos: Vec<Pos>,
    goal_pos: Vec<Pos>,
    color_chars: Vec<char>,
    options: RuleOptions,
}

/// A board snapshot. `num_free` and `completed` always agree with `cells`; only
/// [`GameInfo::apply_move`] changes a state.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct GameState {
    cells: Vec<Cell>,
    pos: Vec<Pos>,
    num_free: usize,
    last_color: Option<Color>,
    completed: u32,
}

impl GameState {
    pub fn cell(&self, pos: Pos) -> Cell {
        self.cells[pos]
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Current head position of `color`'s path.
    pub fn head(&self, color: Color) -> Pos {
        self.pos[color]
    }

    /// Number of cells not yet covered by any color.
    pub fn num_free(&self) -> usize {
        self.num_free
    }

    /// Bitmask with bit `c` set once color `c` reached its goal.
    pub fn completed(&self) -> u32 {
        self.completed
    }

    /// The color moved most recently, if any move has been made.
    pub fn last_color(&self) -> Option<Color> {
        self.last_color
    }

    pub fn is_completed(&self, color: Color) -> bool {
        self.completed & (1 << color) != 0
    }
}

impl GameInfo {
    /// Creates a puzzle from its endpoint pairs.
    ///
    /// # Arguments
    /// * `size`: side length of the square board.
    /// * `endpoints`: one `(display char, init position, goal position)` per color,
    ///   in color-index order.
    ///
    /// # Returns
    /// * `Err(ParseError)` if the board is empty, larger than `MAX_SIZE`, has more
    ///   than `MAX_COLORS` colors, or an endpoint is off the board or shares a cell
    ///   with another endpoint.
    pub fn new(size: usize, endpoints: Vec<(char, Pos, Pos)>) -> Result<Self, ParseError> {
        if size == 0 {
            return Err(ParseError::EmptyBoard);
        }
        if size > MAX_SIZE {
            return Err(ParseError::TooLarge(size));
        }
        if endpoints.len() > MAX_COLORS {
            return Err(ParseError::TooManyColors(endpoints.len()));
        }

        let mut taken = vec![false; size * size];
        for &(ch, init, goal) in &endpoints {
            for pos in [init, goal] {
                if pos >= taken.len() {
                    return Err(ParseError::EndpointOffBoard { ch, pos, size });
                }
                if taken[pos] {
                    return Err(ParseError::EndpointOverlap { ch, pos });
                }
                taken[pos] = true;
            }
        }

        let mut info = GameInfo {
            size,
            init_pos: Vec::with_capacity(endpoints.len()),
            goal_pos: Vec::with_capacity(endpoints.len()),
            color_chars: Vec::with_capacity(endpoints.len()),
            options: RuleOptions::default(),
        };
        for (ch, init, goal) in endpoints {
            info.color_chars.push(ch);
            info.init_pos.push(init);
            info.goal_pos.push(goal);
        }
        Ok(info)
    }

    /// Generates a board with `num_colors` endpoint pairs placed at random.
    ///
    /// The same seed always yields the same board. Random layouts are not
    /// guaranteed to be solvable.
    pub fn random_with_seed(size: usize, num_colors: usize, seed: u64) -> Result<Self, ParseError> {
        if size == 0 {
            return Err(ParseError::EmptyBoard);
        }
        if size > MAX_SIZE {
            return Err(ParseError::TooLarge(size));
        }
        if num_colors > MAX_COLORS {
            return Err(ParseError::TooManyColors(num_colors));
        }
        if 2 * num_colors > size * size {
            return Err(ParseError::BoardTooSmall {
                size,
                colors: num_colors,
            });
        }

        let mut rng = SmallRng::seed_from_u64(seed);
        let mut positions: Vec<Pos> = (0..size * size).collect();
        positions.shuffle(&mut rng);

        let endpoints = (0..num_colors)
            .map(|c| (COLOR_CHARS[c], positions[2 * c], positions[2 * c + 1]))
            .collect();
        GameInfo::new(size, endpoints)
    }

    /// Returns a copy of this puzzle using `options`.
    pub fn with_options(mut self, options: RuleOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> RuleOptions {
        self.options
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn num_colors(&self) -> usize {
        self.color_chars.len()
    }

    pub fn color_char(&self, color: Color) -> char {
        self.color_chars[color]
    }

    pub fn init_pos(&self, color: Color) -> Pos {
        self.init_pos[color]
    }

    pub fn goal_pos(&self, color: Color) -> Pos {
        self.goal_pos[color]
    }

    pub fn pos_of(&self, row: usize, col: usize) -> Pos {
        row * self.size + col
    }

    /// `(row, col)` of a position.
    pub fn coords(&self, pos: Pos) -> (usize, usize) {
        (pos / self.size, pos % self.size)
    }

    /// The position one step from `pos` in `direction`, or `None` off the board.
    pub fn offset(&self, pos: Pos, direction: Direction) -> Option<Pos> {
        let (row, col) = self.coords(pos);
        let (dr, dc) = direction.delta();
        let nr = row as isize + dr;
        let nc = col as isize + dc;
        let size = self.size as isize;
        if nr < 0 || nc < 0 || nr >= size || nc >= size {
            return None;
        }
        Some(self.pos_of(nr as usize, nc as usize))
    }

    /// On-board orthogonal neighbors of `pos`.
    pub fn neighbors(&self, pos: Pos) -> impl Iterator<Item = Pos> + '_ {
        Direction::ALL
            .into_iter()
            .filter_map(move |direction| self.offset(pos, direction))
    }

    /// Builds the starting state: endpoints placed, every other cell free.
    pub fn initial_state(&self) -> GameState {
        let mut cells = vec![Cell::Free; self.size * self.size];
        for color in 0..self.num_colors() {
            cells[self.init_pos[color]] = Cell::Init(color);
            cells[self.goal_pos[color]] = Cell::Goal(color);
        }
        let num_free = cells.iter().filter(|cell| cell.is_free()).count();
        GameState {
            cells,
            pos: self.init_pos.clone(),
            num_free,
            last_color: None,
            completed: 0,
        }
    }

    /// Whether `color` may extend its path one step in `direction`.
    ///
    /// A move is legal when the color is not yet connected and the target cell is
    /// either the color's goal or a free cell. With touch checking enabled, a free
    /// target must not border the color's own path except at the current head.
    pub fn can_move(&self, state: &GameState, color: Color, direction: Direction) -> bool {
        if state.is_completed(color) {
            return false;
        }
        let cur = state.pos[color];
        let Some(target) = self.offset(cur, direction) else {
            return false;
        };
        if target == self.goal_pos[color] {
            return true;
        }
        if !state.cells[target].is_free() {
            return false;
        }
        !(self.options.check_touch && self.touches_own_path(state, color, cur, target))
    }

    fn touches_own_path(&self, state: &GameState, color: Color, cur: Pos, target: Pos) -> bool {
        self.neighbors(target).any(|n| {
            n != cur
                && matches!(state.cells[n], Cell::Init(c) | Cell::Path(c, _) if c == color)
        })
    }

    /// Extends `color`'s path one step in `direction`.
    ///
    /// Must only be called when [`GameInfo::can_move`] returned `true` for the same
    /// arguments.
    pub fn apply_move(&self, state: &mut GameState, color: Color, direction: Direction) {
        let cur = state.pos[color];
        let Some(target) = self.offset(cur, direction) else {
            return;
        };
        if target == self.goal_pos[color] {
            state.completed |= 1 << color;
        } else {
            state.cells[target] = Cell::Path(color, direction);
            state.num_free = state.num_free.saturating_sub(1);
        }
        state.pos[color] = target;
        state.last_color = Some(color);
    }

    /// Chooses which color to move next, or `None` once every color is connected.
    pub fn next_move_color(&self, state: &GameState) -> Option<Color> {
        let mut open = (0..self.num_colors()).filter(|&color| !state.is_completed(color));

        if self.options.most_constrained {
            return open.min_by_key(|&color| heuristics::count_free_moves(self, state, color));
        }
        match state.last_color {
            Some(last) if !state.is_completed(last) => Some(last),
            _ => open.next(),
        }
    }

    /// Renders `state` one row per line.
    ///
    /// Without ANSI codes, every colored cell shows its color character and free
    /// cells show `.`, which is the same format the board parser reads. With ANSI
    /// codes, colored cells get a background from the palette, endpoints show their
    /// color character in bold, and path cells show the arrow of the move that
    /// entered them.
    pub fn render(&self, state: &GameState, ansi: bool) -> String {
        let mut output = String::new();
        for row in 0..self.size {
            for col in 0..self.size {
                let cell = state.cells[self.pos_of(row, col)];
                match cell {
                    Cell::Free => output.push('.'),
                    Cell::Path(color, direction) if ansi => {
                        output.push_str(&ansi_cell("", color, direction.to_char()));
                    }
                    Cell::Init(color) | Cell::Goal(color) if ansi => {
                        output.push_str(&ansi_cell("1;", color, self.color_chars[color]));
                    }
                    Cell::Init(color) | Cell::Goal(color) | Cell::Path(color, _) => {
                        output.push(self.color_chars[color]);
                    }
                }
            }
            if row + 1 < self.size {
                output.push('\n');
            }
        }
        output
    }

    /// A `Display` adapter for `state`.
    pub fn view<'a>(&'a self, state: &'a GameState, ansi: bool) -> BoardView<'a> {
        BoardView {
            info: self,
            state,
            ansi,
        }
    }
}

fn ansi_cell(weight: &str, color: Color, ch: char) -> String {
    format!(
        "\x1b[{}38;5;16;48;5;{}m{}\x1b[m",
        weight,
        ANSI_PALETTE[color % MAX_COLORS],
        ch
    )
}

/// Displays a [`GameState`] through its [`GameInfo`].
pub struct BoardView<'a> {
    info: &'a GameInfo,
    state: &'a GameState,
    ansi: bool,
}

impl fmt::Display for BoardView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.info.render(self.state, self.ansi))
    }
}

impl Rules for GameInfo {
    type State = GameState;

    fn num_colors(&self) -> usize {
        GameInfo::num_colors(self)
    }

    fn num_free(&self, state: &GameState) -> usize {
        state.num_free
    }

    fn completed(&self, state: &GameState) -> u32 {
        state.completed
    }

    fn next_move_color(&self, state: &GameState) -> Option<Color> {
        GameInfo::next_move_color(self, state)
    }

    fn can_move(&self, state: &GameState, color: Color, direction: Direction) -> bool {
        GameInfo::can_move(self, state, color, direction)
    }

    fn apply_move(&self, state: &mut GameState, color: Color, direction: Direction) {
        GameInfo::apply_move(self, state, color, direction)
    }

    fn has_dead_end(&self, state: &GameState) -> bool {
        heuristics::check_dead_ends(self, state)
    }

    fn state_heap_bytes(&self, state: &GameState) -> usize {
        state.cells.len() * std::mem::size_of::<Cell>()
            + state.pos.len() * std::mem::size_of::<Pos>()
    }
}
