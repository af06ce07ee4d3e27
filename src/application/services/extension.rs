//! Injector extension pipeline
//!
//! Extensions observe injected nodes without participating in binding
//! resolution. The set is fixed when the injector is built and runs in no
//! guaranteed order; callers must not couple to a sequence.

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::domain::report::InjectionFailure;
use crate::infrastructure::traits::ActivityTree;

/// Error raised by an extension during `can_process` or `process`.
#[derive(Error, Debug)]
pub enum ExtensionError {
    #[error("{message}")]
    Failed { message: String },

    #[error("{context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ExtensionError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }

    pub fn operation_failed(
        context: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::OperationFailed {
            context: context.into(),
            source,
        }
    }
}

/// Observer invoked once per processed node, after that node's markers
/// were resolved. Extensions run even when some of those markers failed.
pub trait InjectorExtension<T: ActivityTree>: Send + Sync {
    /// Name used in failure reports.
    fn name(&self) -> &str;

    /// Whether this extension applies to the node.
    fn can_process(&self, tree: &T, node: T::NodeId) -> Result<bool, ExtensionError>;

    /// React to the node.
    fn process(&self, tree: &T, node: T::NodeId) -> Result<(), ExtensionError>;
}

/// The fixed, unordered extension set of one injector.
pub struct ExtensionPipeline<T: ActivityTree> {
    extensions: Vec<Arc<dyn InjectorExtension<T>>>,
}

impl<T: ActivityTree> ExtensionPipeline<T> {
    pub fn new(extensions: Vec<Arc<dyn InjectorExtension<T>>>) -> Self {
        Self { extensions }
    }

    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    /// Run every applicable extension for one node. A failing extension is
    /// recorded and does not stop the others.
    pub fn run(&self, tree: &T, node: T::NodeId) -> Vec<InjectionFailure> {
        let mut failures = Vec::new();
        let node_name = tree.display_name(node);

        for extension in &self.extensions {
            match extension.can_process(tree, node) {
                Ok(true) => {
                    if let Err(e) = extension.process(tree, node) {
                        failures.push(InjectionFailure::extension(
                            &node_name,
                            extension.name(),
                            e.to_string(),
                        ));
                    }
                }
                Ok(false) => {
                    debug!(
                        "run: extension '{}' skipped node '{}'",
                        extension.name(),
                        node_name
                    );
                }
                Err(e) => {
                    failures.push(InjectionFailure::extension(
                        &node_name,
                        extension.name(),
                        e.to_string(),
                    ));
                }
            }
        }

        failures
    }
}
