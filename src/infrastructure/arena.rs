//! Arena-backed reference activity tree
//!
//! Canonical implementation of [`ActivityTree`]: the test double for the
//! crate's own suite and the starting point for embedders without a tree
//! of their own. Uses generational arena for memory-safe node references
//! and O(1) lookups.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, PoisonError};

use generational_arena::{Arena, Index};
use termtree::Tree;
use tracing::instrument;

use crate::domain::entities::InjectionMarker;
use crate::infrastructure::traits::{ActivityTree, SlotError};

/// Payload of one activity node.
#[derive(Debug, Clone)]
pub struct ActivityData {
    /// Activity type name, matched by kind conditions
    pub kind: String,
    /// Name shown in reports and used by name lookups
    pub display_name: String,
    /// Injectable sites this activity declares
    pub markers: Vec<InjectionMarker>,
}

impl ActivityData {
    pub fn new(kind: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            display_name: display_name.into(),
            markers: Vec::new(),
        }
    }

    /// Chainable marker declaration.
    pub fn with_marker(mut self, marker: InjectionMarker) -> Self {
        self.markers.push(marker);
        self
    }
}

impl fmt::Display for ActivityData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.display_name, self.kind)
    }
}

/// Node in the arena: payload, structure links, and one slot cell per marker.
pub struct ActivityNode<V> {
    /// Activity payload for this node
    pub data: ActivityData,
    /// Index of the parent node, None for the root
    pub parent: Option<Index>,
    /// Indices of child nodes
    pub children: Vec<Index>,
    // Slot cells are interior-mutable so injection works through &self.
    slots: HashMap<String, Mutex<Option<V>>>,
}

/// Arena-based activity tree.
pub struct ActivityArena<V> {
    /// Arena storage for all nodes
    arena: Arena<ActivityNode<V>>,
    /// Index of the root node, None for empty trees
    root: Option<Index>,
}

impl<V> Default for ActivityArena<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> ActivityArena<V> {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
        }
    }

    /// Insert an activity under `parent`, or as the root when `parent` is None.
    /// One slot cell is created per declared marker.
    #[instrument(level = "trace", skip(self))]
    pub fn insert_activity(&mut self, data: ActivityData, parent: Option<Index>) -> Index {
        let slots = data
            .markers
            .iter()
            .map(|marker| (marker.slot.clone(), Mutex::new(None)))
            .collect();
        let node = ActivityNode {
            data,
            parent,
            children: Vec::new(),
            slots,
        };
        let node_idx = self.arena.insert(node);

        if let Some(parent_idx) = parent {
            if let Some(parent) = self.arena.get_mut(parent_idx) {
                parent.children.push(node_idx);
            }
        } else {
            self.root = Some(node_idx);
        }

        node_idx
    }

    pub fn get_node(&self, idx: Index) -> Option<&ActivityNode<V>> {
        self.arena.get(idx)
    }

    pub fn root(&self) -> Option<Index> {
        self.root
    }

    #[instrument(level = "trace", skip(self))]
    pub fn iter(&self) -> ActivityIter<'_, V> {
        ActivityIter::new(self)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        if let Some(root) = self.root {
            self.calculate_depth(root)
        } else {
            0
        }
    }

    fn calculate_depth(&self, node_idx: Index) -> usize {
        if let Some(node) = self.get_node(node_idx) {
            1 + node
                .children
                .iter()
                .map(|&child| self.calculate_depth(child))
                .max()
                .unwrap_or(0)
        } else {
            0
        }
    }

    /// Display names of all leaf nodes (nodes with no children).
    /// Empty trees return an empty vector.
    #[instrument(level = "debug", skip(self))]
    pub fn leaf_nodes(&self) -> Vec<String> {
        let mut leaves = Vec::new();
        if let Some(root) = self.root {
            self.collect_leaves(root, &mut leaves);
        }
        leaves
    }

    fn collect_leaves(&self, node_idx: Index, leaves: &mut Vec<String>) {
        if let Some(node) = self.get_node(node_idx) {
            if node.children.is_empty() {
                leaves.push(node.data.display_name.clone());
            } else {
                for &child in &node.children {
                    self.collect_leaves(child, leaves);
                }
            }
        }
    }

    /// Render the tree for debugging. Empty trees render as an empty string.
    pub fn to_tree_string(&self) -> String {
        match self.root {
            Some(root) => self.display_subtree(root).to_string(),
            None => String::new(),
        }
    }

    fn display_subtree(&self, idx: Index) -> Tree<String> {
        match self.get_node(idx) {
            Some(node) => {
                let leaves: Vec<Tree<String>> = node
                    .children
                    .iter()
                    .map(|&child| self.display_subtree(child))
                    .collect();
                Tree::new(node.data.to_string()).with_leaves(leaves)
            }
            None => Tree::new(String::new()),
        }
    }
}

impl<V: Clone> ActivityArena<V> {
    /// Read back the value injected into a node's slot, if any.
    pub fn injected_value(&self, idx: Index, slot: &str) -> Option<V> {
        self.get_node(idx)
            .and_then(|node| node.slots.get(slot))
            .and_then(|cell| {
                cell.lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .clone()
            })
    }
}

impl<V> ActivityTree for ActivityArena<V>
where
    V: Clone + Send + Sync + 'static,
{
    type NodeId = Index;
    type Value = V;

    fn contains(&self, node: Index) -> bool {
        self.arena.get(node).is_some()
    }

    fn children(&self, node: Index) -> Vec<Index> {
        self.arena
            .get(node)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    fn kind(&self, node: Index) -> String {
        self.arena
            .get(node)
            .map(|n| n.data.kind.clone())
            .unwrap_or_default()
    }

    fn display_name(&self, node: Index) -> String {
        self.arena
            .get(node)
            .map(|n| n.data.display_name.clone())
            .unwrap_or_default()
    }

    fn markers(&self, node: Index) -> Vec<InjectionMarker> {
        self.arena
            .get(node)
            .map(|n| n.data.markers.clone())
            .unwrap_or_default()
    }

    fn inject(&self, node: Index, slot: &str, value: V) -> Result<(), SlotError> {
        let cell = self
            .arena
            .get(node)
            .and_then(|n| n.slots.get(slot))
            .ok_or_else(|| SlotError::UnknownSlot {
                slot: slot.to_string(),
            })?;
        *cell.lock().unwrap_or_else(PoisonError::into_inner) = Some(value);
        Ok(())
    }
}

/// Pre-order iterator over the arena.
pub struct ActivityIter<'a, V> {
    arena: &'a ActivityArena<V>,
    stack: Vec<Index>,
}

impl<'a, V> ActivityIter<'a, V> {
    fn new(arena: &'a ActivityArena<V>) -> Self {
        let mut stack = Vec::new();
        if let Some(root) = arena.root() {
            stack.push(root);
        }
        Self { arena, stack }
    }
}

impl<'a, V> Iterator for ActivityIter<'a, V> {
    type Item = (Index, &'a ActivityNode<V>);

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}
