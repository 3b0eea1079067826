//! Arena-allocated search tree.
//!
//! Nodes sit in a contiguous `Vec` and are addressed by `NodeId`, so
//! resetting between searches is a single clear + push.

use crate::node::{Node, NodeId};

/// Arena of search nodes.
///
/// Created empty; `reset` installs a fresh root before each search.
#[derive(Debug)]
pub struct Tree<P> {
    nodes: Vec<Node<P>>,
}

impl<P> Tree<P> {
    /// Create an empty tree. Call `reset` before using it.
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Drop all nodes and install a fresh root for `position`.
    pub fn reset(&mut self, position: P) -> NodeId {
        self.nodes.clear();
        self.nodes.push(Node::new_root(position));
        NodeId::ROOT
    }

    /// Get a reference to a node by ID.
    ///
    /// # Panics
    /// Panics if the NodeId is invalid.
    pub fn get(&self, id: NodeId) -> &Node<P> {
        &self.nodes[id.0]
    }

    /// Get a mutable reference to a node by ID.
    ///
    /// # Panics
    /// Panics if the NodeId is invalid.
    pub fn get_mut(&mut self, id: NodeId) -> &mut Node<P> {
        &mut self.nodes[id.0]
    }

    /// Add a node to the arena, returning its ID.
    pub fn add(&mut self, node: Node<P>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Number of nodes currently in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True before the first `reset`.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get the root node.
    ///
    /// # Panics
    /// Panics if the tree has not been reset yet.
    pub fn root(&self) -> &Node<P> {
        self.get(NodeId::ROOT)
    }

    /// Get a mutable reference to the root node.
    ///
    /// # Panics
    /// Panics if the tree has not been reset yet.
    pub fn root_mut(&mut self) -> &mut Node<P> {
        self.get_mut(NodeId::ROOT)
    }
}

impl<P> Default for Tree<P> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gambit_core::{Move, Square};

    fn mv(from: u8, to: u8) -> Move {
        Move::new(Square::new(from).unwrap(), Square::new(to).unwrap())
    }

    #[test]
    fn test_tree_starts_empty() {
        let tree: Tree<u8> = Tree::new();
        assert!(tree.is_empty());
        assert_eq!(tree.len(), 0);
    }

    #[test]
    fn test_reset_installs_root() {
        let mut tree: Tree<u8> = Tree::new();
        let root = tree.reset(7);

        assert_eq!(root, NodeId::ROOT);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.root().position, 7);
        assert!(tree.root().is_leaf());
    }

    #[test]
    fn test_add_node() {
        let mut tree: Tree<u8> = Tree::new();
        tree.reset(0);
        let id = tree.add(Node::new_child(1, mv(0, 1), 0.5));

        assert_eq!(id.0, 1); // After root
        assert_eq!(tree.get(id).mv, Some(mv(0, 1)));
    }

    #[test]
    fn test_reset_discards_previous_search() {
        let mut tree: Tree<u8> = Tree::new();
        tree.reset(0);
        tree.add(Node::new_child(1, mv(0, 1), 0.5));
        tree.add(Node::new_child(2, mv(0, 2), 0.3));
        tree.root_mut().expanded = true;
        assert_eq!(tree.len(), 3);

        tree.reset(9);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.root().position, 9);
        assert!(!tree.root().expanded);
    }

    #[test]
    fn test_tree_modification() {
        let mut tree: Tree<u8> = Tree::new();
        tree.reset(0);

        tree.root_mut().expanded = true;
        tree.root_mut().stats.visit_count = 10;

        assert!(tree.root().expanded);
        assert_eq!(tree.root().stats.visit_count, 10);
    }
}
