//! Tests for the injector extension pipeline

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use generational_arena::Index;

use rswire::application::registry::{Binding, BindingRegistry};
use rswire::application::services::{
    CachedTreeResolver, ExtensionError, ExtensionPipeline, Injector, InjectorExtension,
};
use rswire::domain::entities::InjectionMarker;
use rswire::domain::report::FailureKind;
use rswire::infrastructure::arena::{ActivityArena, ActivityData};
use rswire::infrastructure::traits::ActivityTree;

type Tree = ActivityArena<String>;

/// Records which (extension, node) pairs were processed.
struct RecordingExtension {
    name: String,
    only_kind: Option<String>,
    seen: Arc<Mutex<Vec<(String, String)>>>,
}

impl RecordingExtension {
    fn new(name: &str, seen: Arc<Mutex<Vec<(String, String)>>>) -> Self {
        Self {
            name: name.to_string(),
            only_kind: None,
            seen,
        }
    }

    fn for_kind(name: &str, kind: &str, seen: Arc<Mutex<Vec<(String, String)>>>) -> Self {
        Self {
            name: name.to_string(),
            only_kind: Some(kind.to_string()),
            seen,
        }
    }
}

impl InjectorExtension<Tree> for RecordingExtension {
    fn name(&self) -> &str {
        &self.name
    }

    fn can_process(&self, tree: &Tree, node: Index) -> Result<bool, ExtensionError> {
        match &self.only_kind {
            Some(kind) => Ok(tree.kind(node) == *kind),
            None => Ok(true),
        }
    }

    fn process(&self, tree: &Tree, node: Index) -> Result<(), ExtensionError> {
        self.seen
            .lock()
            .unwrap()
            .push((self.name.clone(), tree.display_name(node)));
        Ok(())
    }
}

/// Fails either during the applicability check or during processing.
struct FailingExtension {
    fail_check: bool,
}

impl InjectorExtension<Tree> for FailingExtension {
    fn name(&self) -> &str {
        "failing"
    }

    fn can_process(&self, _tree: &Tree, _node: Index) -> Result<bool, ExtensionError> {
        if self.fail_check {
            Err(ExtensionError::failed("inspection exploded"))
        } else {
            Ok(true)
        }
    }

    fn process(&self, _tree: &Tree, _node: Index) -> Result<(), ExtensionError> {
        let source = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "audit sink unavailable");
        Err(ExtensionError::operation_failed("flushing audit sink", Box::new(source)))
    }
}

/// Workflow root, a parse step with a resolvable marker, a bare write step.
fn pipeline_tree() -> (Tree, Index) {
    let mut tree = Tree::new();
    let root = tree.insert_activity(
        ActivityData::new("FileInputTransformationWorkflow", "import"),
        None,
    );
    tree.insert_activity(
        ActivityData::new("ParseActivity", "parse")
            .with_marker(InjectionMarker::required("parser", "IParser")),
        Some(root),
    );
    tree.insert_activity(ActivityData::new("WriteActivity", "write"), Some(root));
    (tree, root)
}

fn parser_registry() -> BindingRegistry<Tree> {
    let mut registry = BindingRegistry::new();
    registry.register(Binding::constant("IParser", "ParserA".to_string()).labeled("parser-a"));
    registry
}

#[test]
fn given_extensions_registered_in_either_order_then_observed_sets_are_equal() {
    let mut observations: Vec<HashSet<(String, String)>> = Vec::new();

    for flipped in [false, true] {
        // Arrange
        let (tree, root) = pipeline_tree();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let audit: Arc<dyn InjectorExtension<Tree>> =
            Arc::new(RecordingExtension::new("audit", Arc::clone(&seen)));
        let metrics: Arc<dyn InjectorExtension<Tree>> =
            Arc::new(RecordingExtension::new("metrics", Arc::clone(&seen)));
        let extensions = if flipped {
            vec![metrics, audit]
        } else {
            vec![audit, metrics]
        };
        let injector =
            Injector::with_deps(parser_registry(), Arc::new(CachedTreeResolver::new()), extensions);

        // Act
        injector.inject(&tree, root).unwrap();

        observations.push(seen.lock().unwrap().iter().cloned().collect());
    }

    // Assert - ordering is unspecified, the observed set is not
    assert_eq!(observations[0], observations[1]);
    assert_eq!(observations[0].len(), 6); // 2 extensions x 3 nodes
}

#[test]
fn given_failing_extension_when_injecting_then_failure_collected_and_others_run() {
    // Arrange
    let (tree, root) = pipeline_tree();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let extensions: Vec<Arc<dyn InjectorExtension<Tree>>> = vec![
        Arc::new(FailingExtension { fail_check: false }),
        Arc::new(RecordingExtension::new("audit", Arc::clone(&seen))),
    ];
    let injector =
        Injector::with_deps(parser_registry(), Arc::new(CachedTreeResolver::new()), extensions);

    // Act
    let err = injector.inject(&tree, root).unwrap_err();

    // Assert - one failure per node, and the other extension still saw every node
    let extension_failures: Vec<_> = err
        .failures()
        .iter()
        .filter(|f| matches!(&f.kind, FailureKind::Extension { name, .. } if name == "failing"))
        .collect();
    assert_eq!(extension_failures.len(), 3);
    assert_eq!(seen.lock().unwrap().len(), 3);
}

#[test]
fn given_kind_scoped_extension_when_injecting_then_only_matching_nodes_processed() {
    // Arrange
    let (tree, root) = pipeline_tree();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let extensions: Vec<Arc<dyn InjectorExtension<Tree>>> = vec![Arc::new(
        RecordingExtension::for_kind("parse-audit", "ParseActivity", Arc::clone(&seen)),
    )];
    let injector =
        Injector::with_deps(parser_registry(), Arc::new(CachedTreeResolver::new()), extensions);

    // Act
    injector.inject(&tree, root).unwrap();

    // Assert
    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0], ("parse-audit".to_string(), "parse".to_string()));
}

#[test]
fn given_failing_can_process_when_injecting_then_failure_collected() {
    // Arrange
    let (tree, root) = pipeline_tree();
    let extensions: Vec<Arc<dyn InjectorExtension<Tree>>> =
        vec![Arc::new(FailingExtension { fail_check: true })];
    let injector =
        Injector::with_deps(parser_registry(), Arc::new(CachedTreeResolver::new()), extensions);

    // Act
    let err = injector.inject(&tree, root).unwrap_err();

    // Assert
    assert_eq!(err.failures().len(), 3);
    assert!(err
        .failures()
        .iter()
        .all(|f| matches!(f.kind, FailureKind::Extension { .. })));
}

#[test]
fn given_marker_failures_when_injecting_then_extensions_still_observe_every_node() {
    // Arrange - registry left empty so the required marker cannot resolve
    let (tree, root) = pipeline_tree();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let extensions: Vec<Arc<dyn InjectorExtension<Tree>>> =
        vec![Arc::new(RecordingExtension::new("audit", Arc::clone(&seen)))];
    let injector = Injector::with_deps(
        BindingRegistry::new(),
        Arc::new(CachedTreeResolver::new()),
        extensions,
    );

    // Act
    let err = injector.inject(&tree, root).unwrap_err();

    // Assert
    assert!(matches!(err.failures()[0].kind, FailureKind::NoMatch));
    assert_eq!(seen.lock().unwrap().len(), 3);
}

#[test]
fn given_standalone_pipeline_when_running_one_node_then_failures_returned() {
    // Arrange
    let (tree, root) = pipeline_tree();
    let pipeline = ExtensionPipeline::new(vec![
        Arc::new(FailingExtension { fail_check: false }) as Arc<dyn InjectorExtension<Tree>>,
    ]);

    // Act
    let failures = pipeline.run(&tree, root);

    // Assert
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].node, "import");
    assert!(matches!(
        &failures[0].kind,
        FailureKind::Extension { name, message } if name == "failing" && message == "flushing audit sink"
    ));
    assert_eq!(pipeline.len(), 1);
    assert!(!pipeline.is_empty());
}
