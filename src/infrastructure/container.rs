//! Value providers and the external container seam
//!
//! Bindings produce values through [`ValueProvider`]. Embedders with a real
//! DI container adapt it via [`ScopedContainer`] + [`ContainerProvider`];
//! [`StaticContainer`] is the shipped reference implementation.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use thiserror::Error;

use crate::domain::entities::CapabilityId;
use crate::infrastructure::traits::ActivityTree;

/// Context handed to a provider when a binding resolved.
pub struct ResolveContext<'a, T: ActivityTree> {
    /// The tree being injected
    pub tree: &'a T,
    /// Root the current pass started from
    pub root: T::NodeId,
    /// Node receiving the value
    pub node: T::NodeId,
    /// Capability being resolved
    pub capability: CapabilityId,
}

/// Produces the value a matched binding injects.
pub trait ValueProvider<T: ActivityTree>: Send + Sync {
    fn provide(&self, ctx: &ResolveContext<'_, T>) -> Result<T::Value, ProviderError>;
}

impl<T, F> ValueProvider<T> for F
where
    T: ActivityTree,
    F: Fn(&ResolveContext<'_, T>) -> Result<T::Value, ProviderError> + Send + Sync,
{
    fn provide(&self, ctx: &ResolveContext<'_, T>) -> Result<T::Value, ProviderError> {
        self(ctx)
    }
}

/// Provider-side error.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("no value for capability {capability}: {message}")]
    Unresolvable {
        capability: CapabilityId,
        message: String,
    },

    #[error("provider failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ProviderError {
    /// The provider has no value for this capability.
    pub fn unresolvable(capability: CapabilityId, message: impl Into<String>) -> Self {
        Self::Unresolvable {
            capability,
            message: message.into(),
        }
    }

    /// Wrap an underlying failure with context.
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

/// Provider returning a clone of a fixed value on every resolution.
pub struct ConstProvider<V> {
    value: V,
}

impl<V> ConstProvider<V> {
    pub fn new(value: V) -> Self {
        Self { value }
    }
}

impl<T> ValueProvider<T> for ConstProvider<T::Value>
where
    T: ActivityTree,
{
    fn provide(&self, _ctx: &ResolveContext<'_, T>) -> Result<T::Value, ProviderError> {
        Ok(self.value.clone())
    }
}

/// Provider that resolves through an inner provider once and then serves
/// clones of the cached value. Singleton scope for one binding.
pub struct SingletonProvider<T: ActivityTree> {
    inner: Arc<dyn ValueProvider<T>>,
    cell: OnceCell<T::Value>,
}

impl<T: ActivityTree> SingletonProvider<T> {
    pub fn new(inner: Arc<dyn ValueProvider<T>>) -> Self {
        Self {
            inner,
            cell: OnceCell::new(),
        }
    }

    pub fn from_fn<F>(provide: F) -> Self
    where
        F: Fn(&ResolveContext<'_, T>) -> Result<T::Value, ProviderError> + Send + Sync + 'static,
    {
        Self::new(Arc::new(provide))
    }
}

impl<T: ActivityTree> ValueProvider<T> for SingletonProvider<T> {
    fn provide(&self, ctx: &ResolveContext<'_, T>) -> Result<T::Value, ProviderError> {
        self.cell
            .get_or_try_init(|| self.inner.provide(ctx))
            .map(|value| value.clone())
    }
}

/// Seam for an external DI container that owns binding storage and
/// object construction. The core only asks it to resolve a capability
/// under a context; lifetimes and scopes stay the container's business.
pub trait ScopedContainer<T: ActivityTree>: Send + Sync {
    fn resolve(
        &self,
        capability: &CapabilityId,
        ctx: &ResolveContext<'_, T>,
    ) -> Result<T::Value, ProviderError>;
}

/// Minimal in-crate container: a capability-to-value map.
pub struct StaticContainer<V> {
    values: HashMap<CapabilityId, V>,
}

impl<V> StaticContainer<V> {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Chainable registration.
    pub fn with(mut self, capability: impl Into<CapabilityId>, value: V) -> Self {
        self.values.insert(capability.into(), value);
        self
    }

    pub fn insert(&mut self, capability: impl Into<CapabilityId>, value: V) {
        self.values.insert(capability.into(), value);
    }
}

impl<V> Default for StaticContainer<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ScopedContainer<T> for StaticContainer<T::Value>
where
    T: ActivityTree,
{
    fn resolve(
        &self,
        capability: &CapabilityId,
        _ctx: &ResolveContext<'_, T>,
    ) -> Result<T::Value, ProviderError> {
        self.values.get(capability).cloned().ok_or_else(|| {
            ProviderError::unresolvable(capability.clone(), "capability not present in container")
        })
    }
}

/// Adapts a [`ScopedContainer`] as the provider of a binding.
pub struct ContainerProvider<T: ActivityTree> {
    container: Arc<dyn ScopedContainer<T>>,
}

impl<T: ActivityTree> ContainerProvider<T> {
    pub fn new(container: Arc<dyn ScopedContainer<T>>) -> Self {
        Self { container }
    }
}

impl<T: ActivityTree> ValueProvider<T> for ContainerProvider<T> {
    fn provide(&self, ctx: &ResolveContext<'_, T>) -> Result<T::Value, ProviderError> {
        self.container.resolve(&ctx.capability, ctx)
    }
}
