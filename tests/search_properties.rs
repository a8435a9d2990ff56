//! Search driver properties checked against small hand-built rule sets.
//!
//! `Lattice` is a walk over a grid where every move increases `row + col`, so the
//! move graph is acyclic and shortest paths can be found by brute force. Moves have
//! different strides, which gives solutions of different lengths to choose from.

use flow_solver::engine::{Color, Direction};
use flow_solver::{is_solved, solve, Rules, SearchConfig, SearchResult};
use proptest::prelude::*;
use std::cell::Cell;
use std::rc::Rc;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Spot {
    row: usize,
    col: usize,
}

const START: Spot = Spot { row: 0, col: 0 };

#[derive(Clone, Debug)]
struct Lattice {
    size: usize,
    blocked: Vec<bool>,
}

impl Lattice {
    fn open(size: usize) -> Self {
        Lattice {
            size,
            blocked: vec![false; size * size],
        }
    }

    /// Blocks cell `i` when bit `i` of `bits` is set; start and target stay open.
    fn with_blocked(size: usize, bits: u64) -> Self {
        let mut lattice = Lattice::open(size);
        for i in 0..size * size {
            lattice.blocked[i] = (bits >> (i % 64)) & 1 == 1;
        }
        lattice.blocked[0] = false;
        lattice.blocked[size * size - 1] = false;
        lattice
    }

    /// Blocks every cell whose `row + col` is 2 or 3. No move strides over both.
    fn walled(size: usize) -> Self {
        let mut lattice = Lattice::open(size);
        for row in 0..size {
            for col in 0..size {
                if row + col == 2 || row + col == 3 {
                    lattice.blocked[row * size + col] = true;
                }
            }
        }
        lattice
    }

    fn target(&self) -> Spot {
        Spot {
            row: self.size - 1,
            col: self.size - 1,
        }
    }

    fn step(&self, from: Spot, direction: Direction) -> Option<Spot> {
        let (row, col) = match direction {
            Direction::Left => (from.row + 1, from.col + 1),
            Direction::Right => (from.row, from.col + 1),
            Direction::Up => (from.row, from.col + 2),
            Direction::Down => (from.row + 1, from.col),
        };
        if row >= self.size || col >= self.size || self.blocked[row * self.size + col] {
            return None;
        }
        Some(Spot { row, col })
    }

    fn shortest(&self, from: Spot) -> Option<usize> {
        if from == self.target() {
            return Some(0);
        }
        Direction::ALL
            .iter()
            .filter_map(|&direction| self.step(from, direction))
            .filter_map(|next| self.shortest(next).map(|d| d + 1))
            .min()
    }

    fn is_stuck(&self, spot: Spot) -> bool {
        spot != self.target()
            && Direction::ALL
                .iter()
                .all(|&direction| self.step(spot, direction).is_none())
    }
}

impl Rules for Lattice {
    type State = Spot;

    fn num_colors(&self) -> usize {
        1
    }

    fn num_free(&self, state: &Spot) -> usize {
        usize::from(*state != self.target())
    }

    fn completed(&self, state: &Spot) -> u32 {
        u32::from(*state == self.target())
    }

    fn next_move_color(&self, _state: &Spot) -> Option<Color> {
        Some(0)
    }

    fn can_move(&self, state: &Spot, _color: Color, direction: Direction) -> bool {
        self.step(*state, direction).is_some()
    }

    fn apply_move(&self, state: &mut Spot, _color: Color, direction: Direction) {
        if let Some(next) = self.step(*state, direction) {
            *state = next;
        }
    }

    fn has_dead_end(&self, state: &Spot) -> bool {
        self.is_stuck(*state)
    }
}

/// Counts every state built and every state dropped.
#[derive(Debug, Default)]
struct Ledger {
    created: Cell<usize>,
    released: Cell<usize>,
}

impl Ledger {
    fn live(&self) -> usize {
        self.created.get() - self.released.get()
    }
}

#[derive(Debug)]
struct Tracked {
    spot: Spot,
    ledger: Rc<Ledger>,
}

impl Tracked {
    fn new(spot: Spot, ledger: &Rc<Ledger>) -> Self {
        ledger.created.set(ledger.created.get() + 1);
        Tracked {
            spot,
            ledger: Rc::clone(ledger),
        }
    }
}

impl Clone for Tracked {
    fn clone(&self) -> Self {
        Tracked::new(self.spot, &self.ledger)
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.ledger.released.set(self.ledger.released.get() + 1);
    }
}

struct TrackedLattice(Lattice);

impl Rules for TrackedLattice {
    type State = Tracked;

    fn num_colors(&self) -> usize {
        1
    }

    fn num_free(&self, state: &Tracked) -> usize {
        self.0.num_free(&state.spot)
    }

    fn completed(&self, state: &Tracked) -> u32 {
        self.0.completed(&state.spot)
    }

    fn next_move_color(&self, state: &Tracked) -> Option<Color> {
        self.0.next_move_color(&state.spot)
    }

    fn can_move(&self, state: &Tracked, color: Color, direction: Direction) -> bool {
        self.0.can_move(&state.spot, color, direction)
    }

    fn apply_move(&self, state: &mut Tracked, color: Color, direction: Direction) {
        self.0.apply_move(&mut state.spot, color, direction)
    }

    fn has_dead_end(&self, state: &Tracked) -> bool {
        self.0.has_dead_end(&state.spot)
    }
}

fn budget(max_nodes: usize) -> SearchConfig {
    SearchConfig {
        max_nodes,
        ..SearchConfig::default()
    }
}

fn replay(lattice: &Lattice, moves: &[(Color, Direction)]) -> Spot {
    let mut spot = START;
    for &(color, direction) in moves {
        assert!(lattice.can_move(&spot, color, direction));
        lattice.apply_move(&mut spot, color, direction);
    }
    spot
}

#[test]
fn test_open_lattice_takes_diagonals() {
    let lattice = Lattice::open(4);
    let outcome = solve(&lattice, &START, &budget(1 << 16)).unwrap();

    assert_eq!(outcome.result, SearchResult::Success);
    let solution = outcome.solution.unwrap();
    assert_eq!(solution.moves, vec![(0, Direction::Left); 3]);
    assert_eq!(solution.cost, 3.0);
    assert_eq!(outcome.final_state, Some(lattice.target()));
}

#[test]
fn test_walled_lattice_is_unreachable() {
    let lattice = Lattice::walled(4);
    assert_eq!(lattice.shortest(START), None);

    for check_dead_ends in [true, false] {
        let config = SearchConfig {
            check_dead_ends,
            ..budget(1 << 16)
        };
        let outcome = solve(&lattice, &START, &config).unwrap();
        assert_eq!(outcome.result, SearchResult::Unreachable);
        assert_eq!(outcome.nodes_processed, 0);
        assert!(outcome.final_state.is_none());
        assert!(outcome.solution.is_none());
        assert!(outcome.stats.nodes_created > 1);
        if check_dead_ends {
            assert_eq!(outcome.stats.dead_ends_pruned, 2);
        }
    }
}

#[test]
fn test_start_on_target_is_success_without_moves() {
    let lattice = Lattice::open(3);
    let target = lattice.target();
    assert!(is_solved(&lattice, &target));

    let outcome = solve(&lattice, &target, &budget(1)).unwrap();
    assert_eq!(outcome.result, SearchResult::Success);
    assert_eq!(outcome.final_state, Some(target));
    assert_eq!(outcome.solution.unwrap().cost, 0.0);
}

#[test]
fn test_budget_of_one_is_full() {
    let lattice = Lattice::open(5);
    let outcome = solve(&lattice, &START, &budget(1)).unwrap();
    assert_eq!(outcome.result, SearchResult::Full);
    assert!(outcome.lowest_pending.is_none());
    assert_eq!(outcome.nodes_processed, 0);
}

#[test]
fn test_full_stops_before_remaining_siblings() {
    // The first child fits; the second would bring the frontier up to the budget.
    let lattice = Lattice::open(5);
    let outcome = solve(&lattice, &START, &budget(2)).unwrap();

    assert_eq!(outcome.result, SearchResult::Full);
    assert_eq!(outcome.nodes_processed, 1);
    assert_eq!(outcome.stats.nodes_expanded, 1);
    assert_eq!(outcome.stats.nodes_created, 3);
    let pending = outcome.lowest_pending.unwrap();
    assert_eq!(pending.state, Spot { row: 1, col: 1 });
    assert_eq!(pending.cost_to_node, 1.0);
}

fn assert_released(lattice: Lattice, config: SearchConfig, expected: SearchResult) {
    let ledger = Rc::new(Ledger::default());
    let initial = Tracked::new(START, &ledger);
    let rules = TrackedLattice(lattice);

    let outcome = solve(&rules, &initial, &config).unwrap();
    assert_eq!(outcome.result, expected);
    assert!(ledger.created.get() > 1, "search should have built states");

    // Only the caller's initial state and the copies handed back may survive the call.
    let handed_back =
        usize::from(outcome.final_state.is_some()) + usize::from(outcome.lowest_pending.is_some());
    assert_eq!(ledger.live(), 1 + handed_back);

    drop(outcome);
    drop(initial);
    assert_eq!(ledger.created.get(), ledger.released.get());
}

#[test]
fn test_no_leak_on_success() {
    assert_released(Lattice::open(4), budget(1 << 16), SearchResult::Success);
}

#[test]
fn test_no_leak_on_full() {
    assert_released(Lattice::open(5), budget(2), SearchResult::Full);
}

#[test]
fn test_no_leak_on_unreachable() {
    assert_released(Lattice::walled(4), budget(1 << 16), SearchResult::Unreachable);
}

#[test]
fn test_no_leak_on_unreachable_without_pruning() {
    let config = SearchConfig {
        check_dead_ends: false,
        ..budget(1 << 16)
    };
    assert_released(Lattice::walled(5), config, SearchResult::Unreachable);
}

proptest! {
    #[test]
    fn test_solution_is_shortest(size in 2usize..=5, bits in any::<u64>()) {
        let lattice = Lattice::with_blocked(size, bits);
        let outcome = solve(&lattice, &START, &budget(1 << 20)).unwrap();

        match lattice.shortest(START) {
            Some(best) => {
                prop_assert_eq!(outcome.result, SearchResult::Success);
                let solution = outcome.solution.unwrap();
                prop_assert_eq!(solution.moves.len(), best);
                prop_assert_eq!(solution.cost, best as f64);
                prop_assert_eq!(replay(&lattice, &solution.moves), lattice.target());
                prop_assert_eq!(outcome.final_state, Some(lattice.target()));
            }
            None => {
                prop_assert_eq!(outcome.result, SearchResult::Unreachable);
                prop_assert_eq!(outcome.nodes_processed, 0);
            }
        }
    }

    #[test]
    fn test_frontier_stays_under_budget(
        size in 3usize..=5,
        bits in any::<u64>(),
        max_nodes in 1usize..40,
    ) {
        let lattice = Lattice::with_blocked(size, bits);
        let outcome = solve(&lattice, &START, &budget(max_nodes)).unwrap();

        prop_assert!(outcome.stats.peak_frontier <= max_nodes);
        prop_assert!(outcome.nodes_processed <= max_nodes);
        prop_assert_eq!(outcome.stats.max_nodes, max_nodes);
    }

    #[test]
    fn test_outcome_fields_match_classification(
        size in 2usize..=5,
        bits in any::<u64>(),
        max_nodes in 1usize..64,
        check_dead_ends in any::<bool>(),
    ) {
        let lattice = Lattice::with_blocked(size, bits);
        let config = SearchConfig { check_dead_ends, ..budget(max_nodes) };
        let outcome = solve(&lattice, &START, &config).unwrap();

        match outcome.result {
            SearchResult::Success => {
                prop_assert!(outcome.final_state.is_some());
                prop_assert!(outcome.solution.is_some());
                prop_assert!(outcome.lowest_pending.is_none());
                prop_assert!(is_solved(&lattice, outcome.final_state.as_ref().unwrap()));
            }
            SearchResult::Full => {
                prop_assert!(outcome.final_state.is_none());
                prop_assert!(outcome.solution.is_none());
                prop_assert_eq!(outcome.lowest_pending.is_some(), outcome.nodes_processed > 0);
            }
            SearchResult::Unreachable => {
                prop_assert!(outcome.final_state.is_none());
                prop_assert!(outcome.solution.is_none());
                prop_assert_eq!(outcome.nodes_processed, 0);
                prop_assert_eq!(lattice.shortest(START), None);
            }
        }
    }

    #[test]
    fn test_goal_test_is_pure(size in 2usize..=5, row in 0usize..5, col in 0usize..5) {
        let lattice = Lattice::open(size);
        let spot = Spot { row: row % size, col: col % size };
        let first = is_solved(&lattice, &spot);
        let second = is_solved(&lattice, &spot);
        prop_assert_eq!(first, second);
        prop_assert_eq!(first, spot == lattice.target());
    }
}
