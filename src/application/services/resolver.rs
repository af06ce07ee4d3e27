//! Activity resolution strategies
//!
//! A resolver turns a root node into the set of nodes an injection pass
//! considers. Strategies are swappable behind [`ActivityResolver`]; the
//! default caches tree structure and is therefore sensitive to tree
//! mutation (see [`CachedTreeResolver`]).

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, PoisonError};

use tracing::{debug, instrument};

use crate::infrastructure::traits::ActivityTree;

/// Strategy producing the node set for a pass.
pub trait ActivityResolver<T: ActivityTree>: Send + Sync {
    /// Every node considered for injection under `root`, the root
    /// included, each exactly once. Finite and not restartable; a fresh
    /// call re-derives from current strategy state. Order beyond
    /// "exactly once" is unspecified. Unknown roots yield an empty set.
    fn resolve_all(&self, tree: &T, root: T::NodeId) -> Vec<T::NodeId>;

    /// A single node under `root`, found by display name.
    fn resolve_one(&self, tree: &T, root: T::NodeId, name: &str) -> Option<T::NodeId>;

    /// Drop any cached view of the tree. Strategies without caches ignore
    /// this.
    fn invalidate(&self) {}
}

/// Full-tree resolver with a per-root structure cache.
///
/// The first `resolve_all` for a root walks the live tree and snapshots
/// the node set; later calls replay the snapshot. If the tree mutated
/// after the snapshot, results omit added nodes and still list removed
/// ones. Freshness is the caller's responsibility: call
/// [`ActivityResolver::invalidate`] (or [`CachedTreeResolver::invalidate_root`])
/// after mutating the tree. Cache hits are logged at debug level.
///
/// Snapshots are keyed by root id alone, and node ids are only
/// meaningful within the tree that minted them (two freshly built trees
/// can hand out identical ids). One resolver therefore serves one tree:
/// to reuse it elsewhere, call [`ActivityResolver::invalidate`] first,
/// or replaying a snapshot from the previous tree goes unnoticed.
pub struct CachedTreeResolver<T: ActivityTree> {
    cache: Mutex<HashMap<T::NodeId, Vec<T::NodeId>>>,
}

impl<T: ActivityTree> CachedTreeResolver<T> {
    pub fn new() -> Self {
        Self {
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Drop the snapshot for one root only.
    pub fn invalidate_root(&self, root: T::NodeId) {
        debug!("invalidate_root: root={:?}", root);
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&root);
    }
}

impl<T: ActivityTree> Default for CachedTreeResolver<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ActivityTree> ActivityResolver<T> for CachedTreeResolver<T> {
    #[instrument(level = "debug", skip(self, tree))]
    fn resolve_all(&self, tree: &T, root: T::NodeId) -> Vec<T::NodeId> {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(nodes) = cache.get(&root) {
            debug!(
                "resolve_all: cache hit for root={:?}, tree changes since the snapshot are not visible",
                root
            );
            return nodes.clone();
        }

        let nodes = collect_subtree(tree, root);
        debug!("resolve_all: cached {} nodes for root={:?}", nodes.len(), root);
        cache.insert(root, nodes.clone());
        nodes
    }

    #[instrument(level = "debug", skip(self, tree))]
    fn resolve_one(&self, tree: &T, root: T::NodeId, name: &str) -> Option<T::NodeId> {
        self.resolve_all(tree, root)
            .into_iter()
            .find(|&node| tree.display_name(node) == name)
    }

    fn invalidate(&self) {
        debug!("invalidate: clearing structure cache");
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

/// Resolver that never expands the tree: a pass covers the root alone.
#[derive(Debug, Default)]
pub struct SingleActivityResolver;

impl<T: ActivityTree> ActivityResolver<T> for SingleActivityResolver {
    #[instrument(level = "debug", skip(self, tree))]
    fn resolve_all(&self, tree: &T, root: T::NodeId) -> Vec<T::NodeId> {
        if tree.contains(root) {
            vec![root]
        } else {
            Vec::new()
        }
    }

    #[instrument(level = "debug", skip(self, tree))]
    fn resolve_one(&self, tree: &T, root: T::NodeId, name: &str) -> Option<T::NodeId> {
        (tree.contains(root) && tree.display_name(root) == name).then_some(root)
    }
}

/// Iterative pre-order walk. The visited set guarantees exactly-once
/// even when the structure is not a strict tree.
fn collect_subtree<T: ActivityTree>(tree: &T, root: T::NodeId) -> Vec<T::NodeId> {
    let mut nodes = Vec::new();
    let mut visited = HashSet::new();
    let mut stack = Vec::new();
    if tree.contains(root) {
        stack.push(root);
    }

    while let Some(current) = stack.pop() {
        if !visited.insert(current) {
            continue;
        }
        nodes.push(current);
        // Push children in reverse order for left-to-right traversal
        for child in tree.children(current).into_iter().rev() {
            stack.push(child);
        }
    }

    nodes
}
