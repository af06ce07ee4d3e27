//! Boundary trait for the externally-owned activity tree
//!
//! The core never owns nodes. It reads structure and writes marker slots
//! through this trait, so any runtime's task tree can be injected without
//! being copied into the crate's own data structures.

use std::fmt;
use std::hash::Hash;

use thiserror::Error;

use crate::domain::entities::InjectionMarker;

/// Read/write access to one activity tree.
///
/// Structure is read-only to the core; the only mutation it performs is
/// writing resolved values into marker slots via [`ActivityTree::inject`].
/// Node ids are opaque handles minted by the implementor. Passing an id
/// that no longer refers to a live node must be tolerated: query methods
/// return empty defaults for such ids.
pub trait ActivityTree: Send + Sync + 'static {
    /// Opaque node handle.
    type NodeId: Copy + Eq + Hash + fmt::Debug + Send + Sync + 'static;
    /// Currency stored in marker slots. Tree and providers must agree on it.
    type Value: Clone + Send + Sync + 'static;

    /// Whether the id refers to a live node in this tree.
    fn contains(&self, node: Self::NodeId) -> bool;

    /// Direct children of a node. Empty for leaves and unknown ids.
    fn children(&self, node: Self::NodeId) -> Vec<Self::NodeId>;

    /// The node's declared kind, e.g. its activity type name.
    fn kind(&self, node: Self::NodeId) -> String;

    /// Human-readable name used in reports and name lookups.
    fn display_name(&self, node: Self::NodeId) -> String;

    /// Injection markers declared by the node. Empty when not injectable.
    fn markers(&self, node: Self::NodeId) -> Vec<InjectionMarker>;

    /// Write a resolved value into one of the node's marker slots.
    fn inject(&self, node: Self::NodeId, slot: &str, value: Self::Value) -> Result<(), SlotError>;
}

/// Rejection of a marker slot write.
#[derive(Error, Debug)]
pub enum SlotError {
    #[error("unknown slot: {slot}")]
    UnknownSlot { slot: String },

    #[error("slot '{slot}' rejected value: {message}")]
    Rejected { slot: String, message: String },
}
