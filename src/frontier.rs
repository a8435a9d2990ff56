//! Bounded binary min-heap of pending search nodes.
//!
//! The frontier stores [`NodeId`] handles only; the nodes themselves stay in the
//! [`NodeArena`](crate::node::NodeArena). Entries are ordered by accumulated cost, and
//! entries of equal cost come out in insertion order so that children generated
//! earlier in direction order are expanded first.
//!
//! The capacity given to [`Frontier::with_capacity`] sizes the backing array up front.
//! It is not enforced by [`Frontier::insert`]: the search driver checks occupancy
//! against its node budget before every insert and stops the search instead.

use std::cmp::Ordering;

use crate::error::SearchError;
use crate::node::NodeId;

#[derive(Clone, Copy, Debug)]
struct Entry {
    cost: f64,
    seq: u64,
    node: NodeId,
}

impl Entry {
    /// Whether `self` must be extracted before `other`.
    fn precedes(&self, other: &Entry) -> bool {
        match self.cost.total_cmp(&other.cost) {
            Ordering::Less => true,
            Ordering::Greater => false,
            Ordering::Equal => self.seq < other.seq,
        }
    }
}

/// Array-backed min-priority queue keyed by node cost.
#[derive(Debug)]
pub struct Frontier {
    heap: Vec<Entry>,
    capacity: usize,
    next_seq: u64,
}

impl Frontier {
    /// Creates an empty frontier with backing storage for `capacity` entries.
    ///
    /// # Errors
    /// Returns [`SearchError::OutOfMemory`] if the storage cannot be reserved.
    pub fn with_capacity(capacity: usize) -> Result<Self, SearchError> {
        let mut heap = Vec::new();
        heap.try_reserve_exact(capacity).map_err(|_| SearchError::OutOfMemory {
            what: "frontier",
            count: capacity,
        })?;
        Ok(Frontier {
            heap,
            capacity,
            next_seq: 0,
        })
    }

    /// The capacity the frontier was created with.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Current occupancy.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Adds `node` with priority `cost`. The caller is responsible for the capacity check.
    pub fn insert(&mut self, node: NodeId, cost: f64) {
        let entry = Entry {
            cost,
            seq: self.next_seq,
            node,
        };
        self.next_seq += 1;
        self.heap.push(entry);
        self.sift_up(self.heap.len() - 1);
    }

    /// Removes and returns the lowest-cost node.
    pub fn extract_min(&mut self) -> Option<NodeId> {
        if self.heap.is_empty() {
            return None;
        }
        let last = self.heap.len() - 1;
        self.heap.swap(0, last);
        let min = self.heap.pop();
        if !self.heap.is_empty() {
            self.sift_down(0);
        }
        min.map(|entry| entry.node)
    }

    /// Returns the lowest-cost node without removing it.
    pub fn peek_min(&self) -> Option<NodeId> {
        self.heap.first().map(|entry| entry.node)
    }

    fn sift_up(&mut self, mut index: usize) {
        while index > 0 {
            let parent = (index - 1) / 2;
            if self.heap[index].precedes(&self.heap[parent]) {
                self.heap.swap(index, parent);
                index = parent;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, mut index: usize) {
        let len = self.heap.len();
        loop {
            let left = 2 * index + 1;
            let right = left + 1;
            let mut smallest = index;

            if left < len && self.heap[left].precedes(&self.heap[smallest]) {
                smallest = left;
            }
            if right < len && self.heap[right].precedes(&self.heap[smallest]) {
                smallest = right;
            }
            if smallest == index {
                break;
            }
            self.heap.swap(index, smallest);
            index = smallest;
        }
    }
}
