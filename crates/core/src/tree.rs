//! Huffman tree construction.
//!
//! Nodes are a tagged union with exclusive `Box` ownership of children. The
//! builder repeatedly merges the two lowest-frequency nodes from a min-heap
//! until a single root remains.
//!
//! # Tie Breaking
//!
//! Every push onto the heap gets an increasing sequence number. Among nodes
//! of equal frequency the one pushed first is popped first, so leaves keep
//! their first-occurrence order and merged nodes queue behind them.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::error::{HuffmanError, Result};
use crate::frequency::FrequencyTable;

/// A node of the Huffman tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Leaf {
        symbol: char,
        freq: u64,
    },
    Internal {
        freq: u64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    pub fn freq(&self) -> u64 {
        match self {
            Node::Leaf { freq, .. } | Node::Internal { freq, .. } => *freq,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }

    /// Combine two subtrees; `left` is the first one popped.
    fn merge(left: Node, right: Node) -> Node {
        Node::Internal {
            freq: left.freq() + right.freq(),
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}

/// Heap entry ordered by (freq, seq), reversed for min-heap behavior.
#[derive(Debug)]
struct QueuedNode {
    freq: u64,
    seq: u64,
    node: Node,
}

impl PartialEq for QueuedNode {
    fn eq(&self, other: &Self) -> bool {
        self.freq == other.freq && self.seq == other.seq
    }
}

impl Eq for QueuedNode {}

impl PartialOrd for QueuedNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap (lower freq, then earlier seq = higher priority)
        other
            .freq
            .cmp(&self.freq)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Min-priority queue of subtrees with insertion-order tie breaking.
struct NodeQueue {
    heap: BinaryHeap<QueuedNode>,
    next_seq: u64,
}

impl NodeQueue {
    fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    fn push(&mut self, node: Node) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(QueuedNode {
            freq: node.freq(),
            seq,
            node,
        });
    }

    fn pop(&mut self) -> Option<Node> {
        self.heap.pop().map(|queued| queued.node)
    }

    fn len(&self) -> usize {
        self.heap.len()
    }
}

/// Build a Huffman tree and hand ownership of its root to the caller.
///
/// # Errors
/// `HuffmanError::EmptyFrequencyTable` if `freqs` has no entries.
pub fn build_tree(freqs: &FrequencyTable) -> Result<Node> {
    let mut queue = NodeQueue::new();
    for (symbol, freq) in freqs.iter() {
        queue.push(Node::Leaf { symbol, freq });
    }

    while queue.len() > 1 {
        // len > 1, so both pops succeed
        if let (Some(left), Some(right)) = (queue.pop(), queue.pop()) {
            queue.push(Node::merge(left, right));
        }
    }

    queue
        .pop()
        .ok_or_else(|| HuffmanError::EmptyFrequencyTable.into())
}
