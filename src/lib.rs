//! Tree-scoped dependency injection for activity trees.
//!
//! `rswire` resolves dependencies for nodes of an externally-owned
//! activity tree. One resolution pass discovers the injectable nodes
//! below a root, matches each node's injection markers against
//! conditional bindings, writes the resolved values into the node slots,
//! and hands every processed node to a set of injector extensions.
//!
//! Bindings are conditional on tree position: the same capability can
//! resolve to different values depending on which workflow root the
//! candidate node descends from. All conditions for a capability are
//! evaluated on every resolution; more than one match in the winning
//! precedence tier is reported as ambiguous, never tie-broken.
//!
//! Failures within a pass are collected, not short-circuited: the pass
//! runs to completion and either returns a report or an error carrying
//! every failure found.
//!
//! The default resolver caches tree structure per root. After mutating
//! the tree, call [`Injector::invalidate`] or the next pass replays the
//! stale snapshot (logged at debug level). The cache is keyed by node
//! id, and node ids are only meaningful within the tree that minted
//! them, so an injector serves one tree at a time; invalidate before
//! reusing it on another tree.
//!
//! ```
//! use rswire::application::condition::root_is;
//! use rswire::application::registry::{Binding, BindingRegistry};
//! use rswire::application::services::Injector;
//! use rswire::domain::entities::InjectionMarker;
//! use rswire::infrastructure::arena::{ActivityArena, ActivityData};
//!
//! let mut tree: ActivityArena<String> = ActivityArena::new();
//! let root = tree.insert_activity(
//!     ActivityData::new("FileInputTransformationWorkflow", "import"),
//!     None,
//! );
//! let parse = tree.insert_activity(
//!     ActivityData::new("ParseActivity", "parse")
//!         .with_marker(InjectionMarker::required("parser", "IParser")),
//!     Some(root),
//! );
//!
//! let mut registry = BindingRegistry::new();
//! registry.register(
//!     Binding::from_fn("IParser", |_ctx| Ok("ParserA".to_string()))
//!         .when(root_is("FileInputTransformationWorkflow"))
//!         .labeled("parser-a"),
//! );
//!
//! let injector = Injector::new(registry);
//! let report = injector.inject(&tree, root)?;
//!
//! assert_eq!(report.injected, 1);
//! assert_eq!(
//!     tree.injected_value(parse, "parser"),
//!     Some("ParserA".to_string()),
//! );
//! # Ok::<(), rswire::application::error::InjectionError>(())
//! ```

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod util;

pub use application::error::{InjectionError, InjectionResult};
pub use application::registry::{Binding, BindingMatch, BindingRegistry};
pub use application::services::{
    ActivityResolver, CachedTreeResolver, ExtensionError, Injector, InjectorExtension,
    SingleActivityResolver,
};
pub use domain::entities::{BindingPrecedence, CapabilityId, InjectionMarker};
pub use domain::report::{FailureKind, InjectionFailure, InjectionReport};
pub use infrastructure::traits::{ActivityTree, SlotError};
