//! Pass outcome data: reports and the collected failure taxonomy

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::entities::CapabilityId;

/// Outcome of a successful resolution pass.
#[derive(Debug, Clone, Serialize)]
pub struct InjectionReport {
    /// Unique id of this pass
    pub pass_id: Uuid,
    /// When the pass started
    pub started_at: DateTime<Utc>,
    /// When the pass finished
    pub finished_at: DateTime<Utc>,
    /// Display names of every processed node, in traversal order
    pub nodes: Vec<String>,
    /// Number of marker slots that received a value
    pub injected: usize,
}

/// One failure recorded during a resolution pass.
///
/// Failures never abort the pass; they are collected and reported together
/// so a single run surfaces every misconfiguration.
#[derive(Debug, Clone, Serialize)]
pub struct InjectionFailure {
    /// Display name of the node the failure occurred on
    pub node: String,
    /// Capability involved, absent for extension failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capability: Option<CapabilityId>,
    /// What went wrong
    pub kind: FailureKind,
}

/// Classification of a recorded failure.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FailureKind {
    /// A required marker had no matching binding.
    NoMatch,
    /// More than one binding matched in the winning precedence tier.
    /// Always a configuration defect, never tie-broken.
    Ambiguous { labels: Vec<String> },
    /// The matched provider failed to produce a value.
    Provider { message: String },
    /// The tree rejected the slot write.
    Slot { message: String },
    /// An extension raised during `can_process` or `process`.
    Extension { name: String, message: String },
}

impl InjectionFailure {
    pub fn no_match(node: impl Into<String>, capability: CapabilityId) -> Self {
        Self {
            node: node.into(),
            capability: Some(capability),
            kind: FailureKind::NoMatch,
        }
    }

    pub fn ambiguous(node: impl Into<String>, capability: CapabilityId, labels: Vec<String>) -> Self {
        Self {
            node: node.into(),
            capability: Some(capability),
            kind: FailureKind::Ambiguous { labels },
        }
    }

    pub fn provider(node: impl Into<String>, capability: CapabilityId, message: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            capability: Some(capability),
            kind: FailureKind::Provider {
                message: message.into(),
            },
        }
    }

    pub fn slot(node: impl Into<String>, capability: CapabilityId, message: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            capability: Some(capability),
            kind: FailureKind::Slot {
                message: message.into(),
            },
        }
    }

    pub fn extension(node: impl Into<String>, name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            capability: None,
            kind: FailureKind::Extension {
                name: name.into(),
                message: message.into(),
            },
        }
    }
}

impl fmt::Display for InjectionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.capability {
            Some(capability) => write!(f, "node '{}' ({}): {}", self.node, capability, self.kind),
            None => write!(f, "node '{}': {}", self.node, self.kind),
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::NoMatch => write!(f, "no matching binding"),
            FailureKind::Ambiguous { labels } => {
                write!(f, "ambiguous bindings: {}", labels.join(", "))
            }
            FailureKind::Provider { message } => write!(f, "provider failed: {message}"),
            FailureKind::Slot { message } => write!(f, "slot rejected value: {message}"),
            FailureKind::Extension { name, message } => {
                write!(f, "extension '{name}' failed: {message}")
            }
        }
    }
}
