//! Injection pass orchestration
//!
//! The injector owns a frozen registry, a resolver strategy, and the
//! extension pipeline. One `inject` call is one resolution pass: discover
//! nodes, resolve and inject every marker, run extensions per node, then
//! succeed with a report or fail with every collected failure.

use std::sync::Arc;

use chrono::Utc;
use rayon::prelude::*;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::application::error::{InjectionError, InjectionResult};
use crate::application::registry::{BindingMatch, BindingRegistry};
use crate::application::services::extension::{ExtensionPipeline, InjectorExtension};
use crate::application::services::resolver::{ActivityResolver, CachedTreeResolver};
use crate::domain::report::{InjectionFailure, InjectionReport};
use crate::infrastructure::container::ResolveContext;
use crate::infrastructure::traits::ActivityTree;

/// Orchestrates resolution passes over one kind of tree.
///
/// Construction freezes the configuration: the registry moves in, the
/// extension set is collected once, and neither changes afterwards.
/// With the default resolver an injector also serves one tree at a
/// time: node ids are tree-scoped, so switching trees without
/// [`Injector::invalidate`] replays the previous tree's cached
/// structure (see [`CachedTreeResolver`]).
pub struct Injector<T: ActivityTree> {
    registry: BindingRegistry<T>,
    resolver: Arc<dyn ActivityResolver<T>>,
    extensions: ExtensionPipeline<T>,
}

impl<T: ActivityTree> Injector<T> {
    /// Injector with the default cache-backed resolver and no extensions.
    pub fn new(registry: BindingRegistry<T>) -> Self {
        Self::with_deps(registry, Arc::new(CachedTreeResolver::new()), Vec::new())
    }

    /// Injector with a custom resolver strategy and extension set.
    pub fn with_deps(
        registry: BindingRegistry<T>,
        resolver: Arc<dyn ActivityResolver<T>>,
        extensions: Vec<Arc<dyn InjectorExtension<T>>>,
    ) -> Self {
        Self {
            registry,
            resolver,
            extensions: ExtensionPipeline::new(extensions),
        }
    }

    /// The frozen binding registry.
    pub fn registry(&self) -> &BindingRegistry<T> {
        &self.registry
    }

    /// The resolver strategy, e.g. for name lookups between passes.
    pub fn resolver(&self) -> &dyn ActivityResolver<T> {
        self.resolver.as_ref()
    }

    /// Drop the resolver's cached view of the tree. Call after mutating
    /// the tree, and before pointing the injector at a different tree,
    /// so the next pass sees current structure.
    pub fn invalidate(&self) {
        self.resolver.invalidate();
    }

    /// Run one resolution pass from `root`.
    ///
    /// Failures never abort the pass: an unresolvable or ambiguous marker
    /// is recorded and processing continues, extensions still observe the
    /// node, and the pass fails at the end carrying every failure found.
    /// Values injected before a failure stay injected.
    #[instrument(level = "debug", skip(self, tree))]
    pub fn inject(&self, tree: &T, root: T::NodeId) -> InjectionResult<InjectionReport> {
        let pass_id = Uuid::new_v4();
        let started_at = Utc::now();

        let nodes = self.resolver.resolve_all(tree, root);
        debug!("inject: pass={} resolved {} nodes", pass_id, nodes.len());

        let mut failures = Vec::new();
        let mut injected = 0;
        for &node in &nodes {
            let (count, node_failures) = self.inject_node(tree, root, node);
            injected += count;
            failures.extend(node_failures);
        }

        let report = InjectionReport {
            pass_id,
            started_at,
            finished_at: Utc::now(),
            nodes: nodes.iter().map(|&node| tree.display_name(node)).collect(),
            injected,
        };

        if failures.is_empty() {
            debug!(
                "inject: pass={} injected {} markers on {} nodes",
                pass_id,
                report.injected,
                report.nodes.len()
            );
            Ok(report)
        } else {
            debug!("inject: pass={} collected {} failures", pass_id, failures.len());
            Err(InjectionError::Pass { failures })
        }
    }

    /// Run one resolution pass with per-node work on the rayon pool.
    ///
    /// Semantics match [`Injector::inject`], including failure collection.
    /// Only use this when providers and extensions tolerate concurrent
    /// invocation.
    #[instrument(level = "debug", skip(self, tree))]
    pub fn inject_parallel(&self, tree: &T, root: T::NodeId) -> InjectionResult<InjectionReport> {
        let pass_id = Uuid::new_v4();
        let started_at = Utc::now();

        let nodes = self.resolver.resolve_all(tree, root);
        debug!(
            "inject_parallel: pass={} resolved {} nodes",
            pass_id,
            nodes.len()
        );

        let results: Vec<(usize, Vec<InjectionFailure>)> = nodes
            .par_iter()
            .map(|&node| self.inject_node(tree, root, node))
            .collect();

        let mut failures = Vec::new();
        let mut injected = 0;
        for (count, node_failures) in results {
            injected += count;
            failures.extend(node_failures);
        }

        let report = InjectionReport {
            pass_id,
            started_at,
            finished_at: Utc::now(),
            nodes: nodes.iter().map(|&node| tree.display_name(node)).collect(),
            injected,
        };

        if failures.is_empty() {
            debug!(
                "inject_parallel: pass={} injected {} markers on {} nodes",
                pass_id,
                report.injected,
                report.nodes.len()
            );
            Ok(report)
        } else {
            debug!(
                "inject_parallel: pass={} collected {} failures",
                pass_id,
                failures.len()
            );
            Err(InjectionError::Pass { failures })
        }
    }

    /// Resolve and inject every marker on one node, then run extensions.
    /// Returns the injected-marker count and the failures recorded.
    fn inject_node(
        &self,
        tree: &T,
        root: T::NodeId,
        node: T::NodeId,
    ) -> (usize, Vec<InjectionFailure>) {
        let node_name = tree.display_name(node);
        let mut failures = Vec::new();
        let mut injected = 0;

        for marker in tree.markers(node) {
            match self.registry.resolve(tree, root, node, &marker.capability) {
                BindingMatch::NoMatch => {
                    if marker.required {
                        failures.push(InjectionFailure::no_match(
                            &node_name,
                            marker.capability.clone(),
                        ));
                    } else {
                        debug!(
                            "inject_node: optional marker {} on '{}' left empty",
                            marker, node_name
                        );
                    }
                }
                BindingMatch::Ambiguous(bindings) => {
                    let labels = bindings
                        .iter()
                        .map(|binding| binding.label().to_string())
                        .collect();
                    failures.push(InjectionFailure::ambiguous(
                        &node_name,
                        marker.capability.clone(),
                        labels,
                    ));
                }
                BindingMatch::Single(binding) => {
                    let ctx = ResolveContext {
                        tree,
                        root,
                        node,
                        capability: marker.capability.clone(),
                    };
                    match binding.provider().provide(&ctx) {
                        Ok(value) => match tree.inject(node, &marker.slot, value) {
                            Ok(()) => injected += 1,
                            Err(e) => failures.push(InjectionFailure::slot(
                                &node_name,
                                marker.capability.clone(),
                                e.to_string(),
                            )),
                        },
                        Err(e) => failures.push(InjectionFailure::provider(
                            &node_name,
                            marker.capability.clone(),
                            e.to_string(),
                        )),
                    }
                }
            }
        }

        // Extensions see the node even when markers above failed.
        failures.extend(self.extensions.run(tree, node));

        (injected, failures)
    }
}
