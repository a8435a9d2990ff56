//! Search nodes and the arena that owns them.
//!
//! Every node created during a search lives in a single [`NodeArena`]. Parents are
//! referenced by [`NodeId`] (an index into the arena), never by pointer, so the
//! frontier and the solution walk only ever hold non-owning handles. Dropping the
//! arena releases every node at once.

use crate::engine::{Color, Direction};
use crate::error::SearchError;

/// Index of a node inside its [`NodeArena`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Returns the raw arena slot.
    pub fn index(self) -> usize {
        self.0
    }
}

/// A search-tree vertex: a state plus the bookkeeping needed to order the frontier
/// and to rebuild the move sequence that produced it.
#[derive(Clone, Debug)]
pub struct Node<S> {
    /// Board state at this point of the solve.
    pub state: S,
    /// Node this one was expanded from (`None` for the root).
    pub parent: Option<NodeId>,
    /// Accumulated move cost from the root.
    pub cost_to_node: f64,
    /// The move that turned the parent's state into this one.
    pub action: Option<(Color, Direction)>,
}

impl<S> Node<S> {
    /// Creates the root node: zero cost, no parent, no producing move.
    pub fn root(state: S) -> Self {
        Node {
            state,
            parent: None,
            cost_to_node: 0.0,
            action: None,
        }
    }

    /// Creates a child of `parent` produced by moving `color` in `direction`.
    pub fn child(
        state: S,
        parent: NodeId,
        cost_to_node: f64,
        color: Color,
        direction: Direction,
    ) -> Self {
        Node {
            state,
            parent: Some(parent),
            cost_to_node,
            action: Some((color, direction)),
        }
    }
}

/// Owning store for every node created by one search call.
#[derive(Debug)]
pub struct NodeArena<S> {
    nodes: Vec<Node<S>>,
}

impl<S> NodeArena<S> {
    /// Creates an empty arena with room for `capacity` nodes.
    ///
    /// # Errors
    /// Returns [`SearchError::OutOfMemory`] if the initial storage cannot be reserved.
    pub fn with_capacity(capacity: usize) -> Result<Self, SearchError> {
        let mut nodes = Vec::new();
        nodes.try_reserve_exact(capacity).map_err(|_| SearchError::OutOfMemory {
            what: "node arena",
            count: capacity,
        })?;
        Ok(NodeArena { nodes })
    }

    /// Moves `node` into the arena and returns its handle.
    ///
    /// # Errors
    /// Returns [`SearchError::OutOfMemory`] if the arena has to grow and cannot.
    pub fn push(&mut self, node: Node<S>) -> Result<NodeId, SearchError> {
        if self.nodes.len() == self.nodes.capacity() {
            let count = self.nodes.len() + 1;
            self.nodes.try_reserve(1).map_err(|_| SearchError::OutOfMemory {
                what: "node arena",
                count,
            })?;
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        Ok(id)
    }

    /// Returns the node stored under `id`.
    ///
    /// # Panics
    /// Panics if `id` was not produced by this arena.
    pub fn get(&self, id: NodeId) -> &Node<S> {
        &self.nodes[id.0]
    }

    /// Number of nodes currently owned by the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Walks parent links from `id` back to the root and returns the moves in
    /// play order (root first).
    pub fn moves_to(&self, id: NodeId) -> Vec<(Color, Direction)> {
        let mut moves = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let node = self.get(current);
            if let Some(action) = node.action {
                moves.push(action);
            }
            cursor = node.parent;
        }
        moves.reverse();
        moves
    }
}
