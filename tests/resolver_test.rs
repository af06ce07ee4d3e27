//! Tests for activity resolution strategies

use std::collections::HashSet;

use generational_arena::Index;

use rswire::application::services::{ActivityResolver, CachedTreeResolver, SingleActivityResolver};
use rswire::infrastructure::arena::{ActivityArena, ActivityData};
use rswire::util::testing;

type Tree = ActivityArena<String>;

/// root -> (parse -> read, transform), write
fn five_node_tree() -> (Tree, Index, Vec<Index>) {
    let mut tree = Tree::new();
    let root = tree.insert_activity(ActivityData::new("Workflow", "root"), None);
    let parse = tree.insert_activity(ActivityData::new("ParseActivity", "parse"), Some(root));
    let read = tree.insert_activity(ActivityData::new("ReadActivity", "read"), Some(parse));
    let transform =
        tree.insert_activity(ActivityData::new("TransformActivity", "transform"), Some(parse));
    let write = tree.insert_activity(ActivityData::new("WriteActivity", "write"), Some(root));
    (tree, root, vec![root, parse, read, transform, write])
}

#[test]
fn given_nested_tree_when_resolving_all_then_every_node_listed_exactly_once() {
    // Arrange
    testing::init_test_setup();
    let (tree, root, all_nodes) = five_node_tree();
    let resolver = CachedTreeResolver::new();

    // Act
    let resolved = resolver.resolve_all(&tree, root);

    // Assert
    assert_eq!(resolved.len(), all_nodes.len());
    let unique: HashSet<_> = resolved.iter().copied().collect();
    assert_eq!(unique, all_nodes.iter().copied().collect::<HashSet<_>>());
}

#[test]
fn given_subtree_root_when_resolving_all_then_nodes_outside_subtree_excluded() {
    // Arrange
    let (tree, _root, all_nodes) = five_node_tree();
    let parse = all_nodes[1];
    let resolver = CachedTreeResolver::new();

    // Act
    let resolved = resolver.resolve_all(&tree, parse);

    // Assert - parse, read and transform only
    assert_eq!(resolved.len(), 3);
    assert!(!resolved.contains(&all_nodes[0]));
    assert!(!resolved.contains(&all_nodes[4]));
}

#[test]
fn given_cached_snapshot_when_tree_grows_then_new_node_invisible_until_invalidate() {
    // Arrange
    testing::init_test_setup();
    let (mut tree, root, _) = five_node_tree();
    let resolver = CachedTreeResolver::new();
    let before = resolver.resolve_all(&tree, root);

    // Act - mutate the tree after the snapshot was taken
    let added = tree.insert_activity(ActivityData::new("AuditActivity", "audit"), Some(root));
    let stale = resolver.resolve_all(&tree, root);

    // Assert - the snapshot is replayed as-is
    assert_eq!(stale.len(), before.len());
    assert!(!stale.contains(&added));

    // Act - callers decide when the snapshot is dropped
    resolver.invalidate();
    let fresh = resolver.resolve_all(&tree, root);

    // Assert
    assert_eq!(fresh.len(), before.len() + 1);
    assert!(fresh.contains(&added));
}

#[test]
fn given_root_scoped_invalidate_when_other_roots_cached_then_only_that_snapshot_dropped() {
    // Arrange
    let (mut tree, root, all_nodes) = five_node_tree();
    let parse = all_nodes[1];
    let resolver = CachedTreeResolver::new();
    let _ = resolver.resolve_all(&tree, root);
    let parse_before = resolver.resolve_all(&tree, parse);

    // Act
    let added = tree.insert_activity(ActivityData::new("AuditActivity", "audit"), Some(parse));
    resolver.invalidate_root(parse);

    // Assert - the parse snapshot is rebuilt
    let parse_after = resolver.resolve_all(&tree, parse);
    assert_eq!(parse_after.len(), parse_before.len() + 1);
    assert!(parse_after.contains(&added));

    // Assert - the snapshot for the other root is untouched and still stale
    let root_nodes = resolver.resolve_all(&tree, root);
    assert!(!root_nodes.contains(&added));
}

#[test]
fn given_resolver_reused_across_trees_when_invalidated_between_then_snapshots_stay_per_tree() {
    // Arrange - fresh arenas mint colliding node ids
    let mut tree_a = Tree::new();
    let root_a = tree_a.insert_activity(ActivityData::new("Workflow", "a-root"), None);
    tree_a.insert_activity(ActivityData::new("StepActivity", "a-step"), Some(root_a));
    let mut tree_b = Tree::new();
    let root_b = tree_b.insert_activity(ActivityData::new("Workflow", "b-root"), None);
    tree_b.insert_activity(ActivityData::new("StageActivity", "b-stage"), Some(root_b));
    tree_b.insert_activity(ActivityData::new("StepActivity", "b-step"), Some(root_b));
    assert_eq!(root_a, root_b);
    let resolver = CachedTreeResolver::new();

    // Act - snapshot tree_a, then switch trees without invalidating
    let a_nodes = resolver.resolve_all(&tree_a, root_a);
    let replayed = resolver.resolve_all(&tree_b, root_b);

    // Assert - the colliding root id replays tree_a's snapshot
    assert_eq!(a_nodes.len(), 2);
    assert_eq!(replayed, a_nodes);

    // Act - invalidating scopes the resolver to the new tree
    resolver.invalidate();
    let b_nodes = resolver.resolve_all(&tree_b, root_b);

    // Assert
    assert_eq!(b_nodes.len(), 3);
}

#[test]
fn given_single_activity_resolver_when_resolving_all_then_only_root_returned() {
    let (tree, root, _) = five_node_tree();
    let resolver = SingleActivityResolver;

    let resolved = resolver.resolve_all(&tree, root);

    assert_eq!(resolved, vec![root]);
}

#[test]
fn given_single_activity_resolver_when_resolving_one_then_only_root_name_matches() {
    let (tree, root, _) = five_node_tree();
    let resolver = SingleActivityResolver;

    assert_eq!(resolver.resolve_one(&tree, root, "root"), Some(root));
    assert_eq!(resolver.resolve_one(&tree, root, "parse"), None);
}

#[test]
fn given_display_name_when_resolving_one_then_node_found() {
    let (tree, root, all_nodes) = five_node_tree();
    let resolver = CachedTreeResolver::new();

    assert_eq!(resolver.resolve_one(&tree, root, "transform"), Some(all_nodes[3]));
    assert_eq!(resolver.resolve_one(&tree, root, "missing"), None);
}

#[test]
fn given_foreign_node_id_when_resolving_all_then_empty() {
    // Arrange - an id minted by a different arena
    let (_other_tree, foreign_root, _) = five_node_tree();
    let tree = Tree::new();
    let resolver = CachedTreeResolver::new();

    // Act / Assert
    assert!(resolver.resolve_all(&tree, foreign_root).is_empty());
}
