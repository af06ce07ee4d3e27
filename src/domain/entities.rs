//! Domain entities: capabilities, markers, and binding precedence

use std::fmt;

use serde::{Deserialize, Serialize};

/// Key a marker requests and a binding supplies, e.g. `"IParser"`.
///
/// # Examples
///
/// ```
/// use rswire::domain::entities::CapabilityId;
///
/// let cap = CapabilityId::new("IParser");
/// assert_eq!(cap.as_str(), "IParser");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilityId(String);

impl CapabilityId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CapabilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CapabilityId {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for CapabilityId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Declared priority tier of a binding.
///
/// A fallback binding is consulted only when no specific binding matched
/// the same capability. Within one tier, more than one match is ambiguous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingPrecedence {
    /// Participates in the primary match round.
    Specific,
    /// Consulted only when the specific tier produced no match.
    Fallback,
}

/// One injectable site on a node: a named slot expecting a capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjectionMarker {
    /// Name of the slot the resolved value is written into
    pub slot: String,
    /// Capability the slot expects
    pub capability: CapabilityId,
    /// Whether a missing binding fails the pass
    pub required: bool,
}

impl InjectionMarker {
    /// Marker whose capability must resolve for the pass to succeed.
    pub fn required(slot: impl Into<String>, capability: impl Into<CapabilityId>) -> Self {
        Self {
            slot: slot.into(),
            capability: capability.into(),
            required: true,
        }
    }

    /// Marker whose slot may stay empty when nothing matches.
    ///
    /// # Examples
    ///
    /// ```
    /// use rswire::domain::entities::InjectionMarker;
    ///
    /// let marker = InjectionMarker::optional("tracer", "ITracer");
    /// assert!(!marker.required);
    /// ```
    pub fn optional(slot: impl Into<String>, capability: impl Into<CapabilityId>) -> Self {
        Self {
            slot: slot.into(),
            capability: capability.into(),
            required: false,
        }
    }
}

impl fmt::Display for InjectionMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.slot, self.capability)
    }
}
