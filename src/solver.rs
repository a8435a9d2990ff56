//! Memory-bounded uniform-cost search over puzzle states.
//!
//! [`solve`] pops the cheapest pending node, lets the rules pick one color to move,
//! and generates one child per legal direction in [`Direction::ALL`] order. Every
//! move costs the same, so the first goal state produced is a cheapest solution.
//!
//! The node budget (`max_nodes`) bounds the frontier. When an insert would bring the
//! frontier up to the budget the whole search stops with [`SearchResult::Full`]
//! rather than growing further.
use log::{debug, info, trace};
use std::fmt;
use std::mem::size_of;
use std::time::{Duration, Instant};

use crate::engine::{Color, Direction};
use crate::error::SearchError;
use crate::frontier::Frontier;
use crate::node::{Node, NodeArena, NodeId};

/// Bytes per megabyte for the memory budget.
pub const MEGABYTE: f64 = 1024.0 * 1024.0;

/// Memory budget used when no explicit node count is configured.
pub const DEFAULT_MAX_MB: f64 = 128.0;

/// Cost of a single move.
pub const MOVE_COST: f64 = 1.0;

/// Arena slots reserved up front; the arena grows on demand past this.
const ARENA_INITIAL_CAPACITY: usize = 4096;

/// The rule collaborator the search drives.
///
/// Implementations must be deterministic: the same state always yields the same
/// color, legality answers, and successor.
pub trait Rules {
    type State: Clone;

    fn num_colors(&self) -> usize;

    /// Number of cells not yet covered by any color.
    fn num_free(&self, state: &Self::State) -> usize;

    /// Bitmask of connected colors.
    fn completed(&self, state: &Self::State) -> u32;

    /// The color to expand from `state`, or `None` if no color can move any more.
    fn next_move_color(&self, state: &Self::State) -> Option<Color>;

    fn can_move(&self, state: &Self::State, color: Color, direction: Direction) -> bool;

    /// Applies a move for which [`Rules::can_move`] returned `true`.
    fn apply_move(&self, state: &mut Self::State, color: Color, direction: Direction);

    /// Whether `state` provably cannot lead to a goal. May miss dead ends.
    fn has_dead_end(&self, state: &Self::State) -> bool;

    /// Heap memory owned by a state, added to the node size when the node budget
    /// is derived from a memory limit.
    fn state_heap_bytes(&self, _state: &Self::State) -> usize {
        0
    }
}

/// Bitmask with one bit set per color.
pub fn full_mask(num_colors: usize) -> u32 {
    if num_colors >= 32 {
        u32::MAX
    } else {
        (1u32 << num_colors) - 1
    }
}

/// A state is solved when no free cell remains and every color is connected.
pub fn is_solved<R: Rules>(rules: &R, state: &R::State) -> bool {
    rules.num_free(state) == 0 && rules.completed(state) == full_mask(rules.num_colors())
}

/// Search limits and pruning switches.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchConfig {
    /// Hard cap on frontier occupancy. `0` derives the cap from `max_mb`.
    pub max_nodes: usize,
    /// Memory budget in megabytes, used when `max_nodes` is `0`.
    pub max_mb: f64,
    /// Discard children that the rules report as dead ends.
    pub check_dead_ends: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            max_nodes: 0,
            max_mb: DEFAULT_MAX_MB,
            check_dead_ends: true,
        }
    }
}

impl SearchConfig {
    /// The node budget for nodes of `node_bytes` bytes each.
    pub fn node_budget(&self, node_bytes: usize) -> usize {
        if self.max_nodes > 0 {
            return self.max_nodes;
        }
        let budget = (self.max_mb * MEGABYTE / node_bytes.max(1) as f64).floor();
        if budget.is_finite() && budget > 0.0 {
            budget as usize
        } else {
            0
        }
    }
}

/// How a search ended. Exactly one applies to every completed call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SearchResult {
    /// A goal state was reached.
    Success,
    /// The node budget was reached first.
    Full,
    /// The frontier ran dry without reaching a goal.
    Unreachable,
}

impl fmt::Display for SearchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SearchResult::Success => "SUCCESS",
            SearchResult::Full => "FULL",
            SearchResult::Unreachable => "UNREACHABLE",
        };
        f.write_str(label)
    }
}

/// The move sequence leading from the initial state to the goal.
#[derive(Clone, Debug, PartialEq)]
pub struct Solution {
    /// `(color, direction)` pairs in play order.
    pub moves: Vec<(Color, Direction)>,
    /// Accumulated cost of the goal node.
    pub cost: f64,
}

/// Counters collected during one search.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// The node budget in force.
    pub max_nodes: usize,
    /// States built, including the root, pruned dead ends, and the child that hit the budget.
    pub nodes_created: usize,
    /// Nodes taken off the frontier and expanded.
    pub nodes_expanded: usize,
    /// Children discarded as dead ends.
    pub dead_ends_pruned: usize,
    /// Largest frontier occupancy observed.
    pub peak_frontier: usize,
}

/// The cheapest node still pending when the budget ran out.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingNode<S> {
    pub state: S,
    pub cost_to_node: f64,
}

/// Everything [`solve`] reports back.
#[derive(Clone, Debug)]
pub struct SearchOutcome<S> {
    pub result: SearchResult,
    /// Wall-clock time spent in the search loop.
    pub elapsed: Duration,
    /// Frontier occupancy at the moment the search returned.
    pub nodes_processed: usize,
    /// Copy of the goal state, on success.
    pub final_state: Option<S>,
    /// Moves from the initial state to `final_state`, on success.
    pub solution: Option<Solution>,
    /// Lowest-cost pending node, when the result is `Full` and the frontier is not empty.
    pub lowest_pending: Option<PendingNode<S>>,
    pub stats: SearchStats,
}

/// Runs a uniform-cost search from `initial_state`.
///
/// # Arguments
/// * `rules`: the puzzle rules driving move generation.
/// * `initial_state`: the state to solve; it is cloned into the root node.
/// * `config`: node budget and pruning switches.
///
/// # Returns
/// * `Ok(SearchOutcome)` for every terminal result (`Success`, `Full`, `Unreachable`).
/// * `Err(SearchError)` if the node budget is zero or node storage cannot be allocated.
///
/// All nodes are owned by an arena local to this call and are released before it
/// returns, on every exit path.
pub fn solve<R: Rules>(
    rules: &R,
    initial_state: &R::State,
    config: &SearchConfig,
) -> Result<SearchOutcome<R::State>, SearchError> {
    let node_bytes = size_of::<Node<R::State>>() + rules.state_heap_bytes(initial_state);
    let max_nodes = config.node_budget(node_bytes);
    if max_nodes == 0 {
        return Err(SearchError::ZeroNodeBudget);
    }
    info!(
        "searching up to {} nodes ({:.2} MB), {} free cells at start",
        max_nodes,
        max_nodes as f64 * node_bytes as f64 / MEGABYTE,
        rules.num_free(initial_state)
    );

    let mut arena = NodeArena::with_capacity(max_nodes.min(ARENA_INITIAL_CAPACITY))?;
    let mut frontier = Frontier::with_capacity(max_nodes)?;
    let mut stats = SearchStats {
        max_nodes,
        ..SearchStats::default()
    };

    let start = Instant::now();
    let root = arena.push(Node::root(initial_state.clone()))?;
    stats.nodes_created = 1;

    let mut result = None;
    let mut solution_node: Option<NodeId> = None;

    if is_solved(rules, initial_state) {
        result = Some(SearchResult::Success);
        solution_node = Some(root);
    } else {
        frontier.insert(root, 0.0);
        stats.peak_frontier = 1;
    }

    'search: while result.is_none() {
        let Some(current) = frontier.extract_min() else {
            break;
        };
        stats.nodes_expanded += 1;

        let Some(color) = rules.next_move_color(&arena.get(current).state) else {
            continue;
        };

        for direction in Direction::ALL {
            let (child_state, cost) = {
                let parent = arena.get(current);
                if !rules.can_move(&parent.state, color, direction) {
                    continue;
                }
                let mut state = parent.state.clone();
                rules.apply_move(&mut state, color, direction);
                (state, parent.cost_to_node + MOVE_COST)
            };
            stats.nodes_created += 1;

            if frontier.len() + 1 >= max_nodes {
                result = Some(SearchResult::Full);
                break 'search;
            }

            if config.check_dead_ends && rules.has_dead_end(&child_state) {
                stats.dead_ends_pruned += 1;
                continue;
            }

            let solved = is_solved(rules, &child_state);
            let child = arena.push(Node::child(child_state, current, cost, color, direction))?;
            if solved {
                result = Some(SearchResult::Success);
                solution_node = Some(child);
                break 'search;
            }

            trace!("enqueue node {} at cost {}", child.index(), cost);
            frontier.insert(child, cost);
            stats.peak_frontier = stats.peak_frontier.max(frontier.len());
        }
    }

    let result = result.unwrap_or(SearchResult::Unreachable);
    let elapsed = start.elapsed();
    let nodes_processed = frontier.len();

    let (final_state, solution) = match solution_node {
        Some(id) => {
            let node = arena.get(id);
            let solution = Solution {
                moves: arena.moves_to(id),
                cost: node.cost_to_node,
            };
            (Some(node.state.clone()), Some(solution))
        }
        None => (None, None),
    };

    let lowest_pending = match result {
        SearchResult::Full => frontier.peek_min().map(|id| {
            let node = arena.get(id);
            debug!(
                "lowest cost pending node: cost {}, {} free cells",
                node.cost_to_node,
                rules.num_free(&node.state)
            );
            PendingNode {
                state: node.state.clone(),
                cost_to_node: node.cost_to_node,
            }
        }),
        _ => None,
    };

    info!(
        "search finished: {} in {:.3}s, {} nodes pending, {} created, {} expanded",
        result,
        elapsed.as_secs_f64(),
        nodes_processed,
        stats.nodes_created,
        stats.nodes_expanded
    );

    Ok(SearchOutcome {
        result,
        elapsed,
        nodes_processed,
        final_state,
        solution,
        lowest_pending,
        stats,
    })
}
