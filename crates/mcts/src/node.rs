//! Search tree node types.
//!
//! Nodes live in an arena and reference each other by index, which keeps
//! the tree free of Rc/RefCell plumbing and cheap to drop between searches.

use gambit_core::Move;

/// Index into the node arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// The root node is always at index 0.
    pub const ROOT: NodeId = NodeId(0);
}

/// Accumulated search statistics for a single node.
#[derive(Clone, Debug)]
pub struct NodeStats {
    /// Number of backpropagation passes that touched this node.
    pub visit_count: u32,

    /// Sum of backpropagated values (for computing Q).
    pub value_sum: f32,

    /// Prior probability assigned when the parent expanded.
    pub prior: f32,
}

impl NodeStats {
    /// Create fresh stats with the given prior probability.
    pub fn new(prior: f32) -> Self {
        Self {
            visit_count: 0,
            value_sum: 0.0,
            prior,
        }
    }

    /// Mean backpropagated value (Q).
    ///
    /// Returns 0.0 for an unvisited node.
    pub fn mean_value(&self) -> f32 {
        if self.visit_count == 0 {
            0.0
        } else {
            self.value_sum / self.visit_count as f32
        }
    }
}

/// A node in the search tree.
///
/// Owns its position so simulations never have to replay move sequences.
/// Values stored here are from the perspective of the player who moved
/// into the node.
#[derive(Clone, Debug)]
pub struct Node<P> {
    /// Position reached at this node.
    pub position: P,

    /// Move that led here (None for the root).
    pub mv: Option<Move>,

    /// Visit count, value sum, and prior.
    pub stats: NodeStats,

    /// Children in legal-move order: (move, node id) pairs.
    pub children: Vec<(Move, NodeId)>,

    /// Whether children have been generated. A node is a leaf iff false.
    pub expanded: bool,
}

impl<P> Node<P> {
    /// Create the root node for a search.
    pub fn new_root(position: P) -> Self {
        Self {
            position,
            mv: None,
            stats: NodeStats::new(1.0),
            children: Vec::new(),
            expanded: false,
        }
    }

    /// Create an unexpanded child reached by `mv`.
    pub fn new_child(position: P, mv: Move, prior: f32) -> Self {
        Self {
            position,
            mv: Some(mv),
            stats: NodeStats::new(prior),
            children: Vec::new(),
            expanded: false,
        }
    }

    /// A node is a leaf until it has been expanded.
    pub fn is_leaf(&self) -> bool {
        !self.expanded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gambit_core::Square;

    #[test]
    fn test_node_stats_mean_value() {
        let mut stats = NodeStats::new(0.5);

        // Unvisited node has Q = 0
        assert_eq!(stats.mean_value(), 0.0);

        // After visits
        stats.visit_count = 2;
        stats.value_sum = 1.5;
        assert!((stats.mean_value() - 0.75).abs() < 1e-5);
    }

    #[test]
    fn test_child_node() {
        let mv = Move::new(Square::new(12).unwrap(), Square::new(28).unwrap());
        let node = Node::new_child((), mv, 0.3);

        assert_eq!(node.mv, Some(mv));
        assert!((node.stats.prior - 0.3).abs() < 1e-5);
        assert!(node.is_leaf());
        assert!(node.children.is_empty());
    }

    #[test]
    fn test_root_node() {
        let root = Node::new_root(());
        assert_eq!(root.mv, None);
        assert_eq!(root.stats.prior, 1.0);
        assert!(root.is_leaf());
    }
}
