//! Conditional binding predicates
//!
//! Conditions are pure functions over the match context. The registry
//! evaluates every registered condition for a capability, so
//! implementations must be side-effect free and cheap to call repeatedly
//! in any order.

use regex::Regex;

use crate::domain::error::{DomainError, DomainResult};
use crate::infrastructure::traits::ActivityTree;

/// Context a condition is evaluated against.
pub struct MatchContext<'a, T: ActivityTree> {
    /// The tree being injected
    pub tree: &'a T,
    /// Root the current pass started from
    pub root: T::NodeId,
    /// Node whose marker is being resolved
    pub candidate: T::NodeId,
}

/// Predicate deciding whether a binding applies to a candidate node.
pub trait BindingCondition<T: ActivityTree>: Send + Sync {
    fn evaluate(&self, ctx: &MatchContext<'_, T>) -> bool;
}

impl<T, F> BindingCondition<T> for F
where
    T: ActivityTree,
    F: Fn(&MatchContext<'_, T>) -> bool + Send + Sync,
{
    fn evaluate(&self, ctx: &MatchContext<'_, T>) -> bool {
        self(ctx)
    }
}

/// Matches when the candidate node's kind equals the given name.
pub fn node_kind_is(kind: impl Into<String>) -> NodeKindIs {
    NodeKindIs { kind: kind.into() }
}

pub struct NodeKindIs {
    kind: String,
}

impl<T: ActivityTree> BindingCondition<T> for NodeKindIs {
    fn evaluate(&self, ctx: &MatchContext<'_, T>) -> bool {
        ctx.tree.kind(ctx.candidate) == self.kind
    }
}

/// Matches when the candidate node's kind matches the given regex.
pub fn kind_matches(pattern: &str) -> DomainResult<KindMatches> {
    let regex = Regex::new(pattern).map_err(|e| DomainError::InvalidKindPattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })?;
    Ok(KindMatches { regex })
}

pub struct KindMatches {
    regex: Regex,
}

impl KindMatches {
    /// Use a pre-compiled regex.
    pub fn new(regex: Regex) -> Self {
        Self { regex }
    }
}

impl<T: ActivityTree> BindingCondition<T> for KindMatches {
    fn evaluate(&self, ctx: &MatchContext<'_, T>) -> bool {
        self.regex.is_match(&ctx.tree.kind(ctx.candidate))
    }
}

/// Matches when the pass root's kind equals the given name.
/// This is how a binding scopes itself to one workflow.
pub fn root_is(kind: impl Into<String>) -> RootIs {
    RootIs { kind: kind.into() }
}

pub struct RootIs {
    kind: String,
}

impl<T: ActivityTree> BindingCondition<T> for RootIs {
    fn evaluate(&self, ctx: &MatchContext<'_, T>) -> bool {
        ctx.tree.kind(ctx.root) == self.kind
    }
}

/// Matches when the pass root's kind is one of the given names.
pub fn root_in<I, S>(kinds: I) -> RootIn
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    RootIn {
        kinds: kinds.into_iter().map(Into::into).collect(),
    }
}

pub struct RootIn {
    kinds: Vec<String>,
}

impl<T: ActivityTree> BindingCondition<T> for RootIn {
    fn evaluate(&self, ctx: &MatchContext<'_, T>) -> bool {
        let root_kind = ctx.tree.kind(ctx.root);
        self.kinds.iter().any(|kind| *kind == root_kind)
    }
}

/// Wraps a plain closure as a condition. The general escape hatch.
pub fn predicate<T, F>(test: F) -> Predicate<T>
where
    T: ActivityTree,
    F: Fn(&MatchContext<'_, T>) -> bool + Send + Sync + 'static,
{
    Predicate {
        test: Box::new(test),
    }
}

pub struct Predicate<T: ActivityTree> {
    test: Box<dyn Fn(&MatchContext<'_, T>) -> bool + Send + Sync>,
}

impl<T: ActivityTree> BindingCondition<T> for Predicate<T> {
    fn evaluate(&self, ctx: &MatchContext<'_, T>) -> bool {
        (self.test)(ctx)
    }
}

/// All conditions must match. An empty set matches everything.
pub fn all<T: ActivityTree>(conditions: Vec<Box<dyn BindingCondition<T>>>) -> AllOf<T> {
    AllOf { conditions }
}

pub struct AllOf<T: ActivityTree> {
    conditions: Vec<Box<dyn BindingCondition<T>>>,
}

impl<T: ActivityTree> BindingCondition<T> for AllOf<T> {
    fn evaluate(&self, ctx: &MatchContext<'_, T>) -> bool {
        self.conditions.iter().all(|condition| condition.evaluate(ctx))
    }
}

/// At least one condition must match. An empty set matches nothing.
pub fn any<T: ActivityTree>(conditions: Vec<Box<dyn BindingCondition<T>>>) -> AnyOf<T> {
    AnyOf { conditions }
}

pub struct AnyOf<T: ActivityTree> {
    conditions: Vec<Box<dyn BindingCondition<T>>>,
}

impl<T: ActivityTree> BindingCondition<T> for AnyOf<T> {
    fn evaluate(&self, ctx: &MatchContext<'_, T>) -> bool {
        self.conditions.iter().any(|condition| condition.evaluate(ctx))
    }
}

/// Inverts a condition.
pub fn not<C>(condition: C) -> Not<C> {
    Not { condition }
}

pub struct Not<C> {
    condition: C,
}

impl<T, C> BindingCondition<T> for Not<C>
where
    T: ActivityTree,
    C: BindingCondition<T>,
{
    fn evaluate(&self, ctx: &MatchContext<'_, T>) -> bool {
        !self.condition.evaluate(ctx)
    }
}
