//! Binding predicate registry
//!
//! Stores the conditional bindings per capability and resolves a
//! capability for one candidate node. Registration happens before an
//! injector is built (`register` takes `&mut self`); resolution during a
//! pass is read-only.

use std::collections::HashMap;
use std::sync::Arc;

use itertools::Itertools;
use tracing::{debug, instrument};

use crate::application::condition::{BindingCondition, MatchContext};
use crate::domain::entities::{BindingPrecedence, CapabilityId};
use crate::infrastructure::container::{ConstProvider, ProviderError, ResolveContext, ValueProvider};
use crate::infrastructure::traits::ActivityTree;

/// One conditional binding: a capability, an optional condition, a
/// declared precedence, and the provider invoked when it wins.
pub struct Binding<T: ActivityTree> {
    capability: CapabilityId,
    condition: Option<Box<dyn BindingCondition<T>>>,
    precedence: BindingPrecedence,
    provider: Arc<dyn ValueProvider<T>>,
    label: String,
}

impl<T: ActivityTree> Binding<T> {
    /// Binding backed by an explicit provider. Without a condition it
    /// matches every candidate.
    pub fn new(capability: impl Into<CapabilityId>, provider: Arc<dyn ValueProvider<T>>) -> Self {
        Self {
            capability: capability.into(),
            condition: None,
            precedence: BindingPrecedence::Specific,
            provider,
            label: String::new(),
        }
    }

    /// Binding backed by a plain closure.
    pub fn from_fn<F>(capability: impl Into<CapabilityId>, provide: F) -> Self
    where
        F: Fn(&ResolveContext<'_, T>) -> Result<T::Value, ProviderError> + Send + Sync + 'static,
    {
        Self::new(capability, Arc::new(provide))
    }

    /// Binding that injects a clone of a fixed value.
    pub fn constant(capability: impl Into<CapabilityId>, value: T::Value) -> Self {
        Self::new(capability, Arc::new(ConstProvider::new(value)))
    }

    /// Restrict the binding to candidates the condition accepts.
    /// A binding carries at most one condition; compose with
    /// [`crate::application::condition::all`] and friends.
    pub fn when<C>(mut self, condition: C) -> Self
    where
        C: BindingCondition<T> + 'static,
    {
        self.condition = Some(Box::new(condition));
        self
    }

    /// Demote the binding to the fallback tier: it is consulted only when
    /// no specific binding matched the capability.
    pub fn fallback(mut self) -> Self {
        self.precedence = BindingPrecedence::Fallback;
        self
    }

    /// Name used in ambiguity reports. Defaults to `<capability>#<n>` at
    /// registration when not set.
    pub fn labeled(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn capability(&self) -> &CapabilityId {
        &self.capability
    }

    pub fn precedence(&self) -> BindingPrecedence {
        self.precedence
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub(crate) fn provider(&self) -> &dyn ValueProvider<T> {
        self.provider.as_ref()
    }

    fn matches(&self, ctx: &MatchContext<'_, T>) -> bool {
        match &self.condition {
            Some(condition) => condition.evaluate(ctx),
            None => true,
        }
    }
}

/// Outcome of resolving one capability for one candidate node.
pub enum BindingMatch<'a, T: ActivityTree> {
    /// No binding matched.
    NoMatch,
    /// Exactly one binding won.
    Single(&'a Binding<T>),
    /// More than one binding matched in the winning tier.
    Ambiguous(Vec<&'a Binding<T>>),
}

/// Registry of conditional bindings, keyed by capability.
pub struct BindingRegistry<T: ActivityTree> {
    bindings: HashMap<CapabilityId, Vec<Binding<T>>>,
}

impl<T: ActivityTree> Default for BindingRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ActivityTree> BindingRegistry<T> {
    pub fn new() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    /// Register a binding. Unlabeled bindings get a `<capability>#<n>`
    /// label so ambiguity reports can always name the culprits.
    pub fn register(&mut self, binding: Binding<T>) {
        let mut binding = binding;
        let entry = self.bindings.entry(binding.capability.clone()).or_default();
        if binding.label.is_empty() {
            binding.label = format!("{}#{}", binding.capability, entry.len());
        }
        debug!(
            "register: capability={} label={} precedence={:?}",
            binding.capability, binding.label, binding.precedence
        );
        entry.push(binding);
    }

    /// Resolve a capability for one candidate under a pass root.
    ///
    /// Every registered condition is evaluated; there is no short-circuit
    /// on the first match because ambiguity detection needs the full match
    /// set. Matches in the specific tier win; the fallback tier is
    /// consulted only when the specific tier is empty. Registration order
    /// never affects the outcome.
    #[instrument(level = "debug", skip(self, tree))]
    pub fn resolve<'a>(
        &'a self,
        tree: &T,
        root: T::NodeId,
        candidate: T::NodeId,
        capability: &CapabilityId,
    ) -> BindingMatch<'a, T> {
        let Some(bindings) = self.bindings.get(capability) else {
            debug!("resolve: no bindings registered for {}", capability);
            return BindingMatch::NoMatch;
        };

        let ctx = MatchContext {
            tree,
            root,
            candidate,
        };
        let (specific, fallback): (Vec<&Binding<T>>, Vec<&Binding<T>>) = bindings
            .iter()
            .filter(|binding| binding.matches(&ctx))
            .partition(|binding| binding.precedence == BindingPrecedence::Specific);

        let tier = if specific.is_empty() { fallback } else { specific };
        match tier.len() {
            0 => BindingMatch::NoMatch,
            1 => BindingMatch::Single(tier[0]),
            _ => {
                debug!(
                    "resolve: {} ambiguous bindings for {}: {}",
                    tier.len(),
                    capability,
                    tier.iter().map(|binding| binding.label()).join(", ")
                );
                BindingMatch::Ambiguous(tier)
            }
        }
    }

    /// Total number of registered bindings.
    pub fn len(&self) -> usize {
        self.bindings.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Registered capabilities, sorted for stable output.
    pub fn capabilities(&self) -> Vec<&CapabilityId> {
        self.bindings.keys().sorted().collect()
    }
}
