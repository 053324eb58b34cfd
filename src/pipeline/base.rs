use std::{fmt, iter::FromIterator, marker::PhantomData, slice, sync::Arc};

use crate::{Middleware, Monoid, Semigroup};

use super::Strategy;

/// The container shared by every strategy.
///
/// `TContext` is what `process` accepts and `TResult` is what it produces. Appending a middleware
/// with [`pipe`](Self::pipe) or a whole pipeline with [`concat`](Self::concat) turns the result type
/// of the existing chain into the input of the appended part.
///
/// Pipelines are immutable, every operation returns a new one. Cloning only bumps a reference count.
pub struct BasePipeline<S: Strategy, TContext, TResult = TContext> {
    middleware: Arc<[Middleware<S>]>,
    phantom: PhantomData<fn(TContext) -> TResult>,
}

impl<S: Strategy, TContext, TResult> BasePipeline<S, TContext, TResult> {
    fn new(middleware: Arc<[Middleware<S>]>) -> Self {
        Self {
            middleware,
            phantom: PhantomData,
        }
    }

    /// Lifts one or more middleware into a pipeline, in argument order.
    ///
    /// A single [`Middleware`] is accepted as is, several are passed as an array.
    pub fn of<I: IntoIterator<Item = Middleware<S>>>(middleware: I) -> Self {
        Self::new(middleware.into_iter().collect())
    }

    /// Creates a pipeline running `middleware` in iteration order.
    ///
    /// Invalid entries are accepted here and only rejected by `process`.
    pub fn from<I: IntoIterator<Item = Middleware<S>>>(middleware: I) -> Self {
        Self::new(middleware.into_iter().collect())
    }

    /// A pipeline without middleware, the identity of [`concat`](Self::concat).
    pub fn empty() -> Self {
        Self::new(Vec::new().into())
    }

    /// The identity pipeline of the same strategy, reachable from a value without naming its type.
    pub fn empty_like(&self) -> BasePipeline<S, TResult, TResult> {
        BasePipeline::empty()
    }

    /// Returns a new pipeline running this one followed by `other`.
    pub fn concat<TNewResult>(
        &self,
        other: &BasePipeline<S, TResult, TNewResult>,
    ) -> BasePipeline<S, TContext, TNewResult> {
        BasePipeline::new(
            self.middleware
                .iter()
                .chain(other.middleware.iter())
                .cloned()
                .collect(),
        )
    }

    /// Returns a new pipeline with `middleware` appended.
    pub fn pipe<TNewResult>(
        &self,
        middleware: Middleware<S>,
    ) -> BasePipeline<S, TContext, TNewResult> {
        BasePipeline::new(
            self.middleware
                .iter()
                .cloned()
                .chain(Some(middleware))
                .collect(),
        )
    }

    /// The stored middleware in execution order.
    ///
    /// This is a read-only view, pipelines never change after construction.
    pub fn middleware(&self) -> &[Middleware<S>] {
        &self.middleware
    }

    /// Same as [`middleware`](Self::middleware).
    pub fn to_array(&self) -> &[Middleware<S>] {
        &self.middleware
    }

    pub fn is_empty(&self) -> bool {
        self.middleware.is_empty()
    }

    pub fn len(&self) -> usize {
        self.middleware.len()
    }

    pub fn iter(&self) -> slice::Iter<'_, Middleware<S>> {
        self.middleware.iter()
    }
}

impl<S: Strategy, TContext, TResult> Clone for BasePipeline<S, TContext, TResult> {
    fn clone(&self) -> Self {
        Self::new(self.middleware.clone())
    }
}

impl<S: Strategy, TContext, TResult> Default for BasePipeline<S, TContext, TResult> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<S: Strategy, TContext, TResult> PartialEq for BasePipeline<S, TContext, TResult> {
    fn eq(&self, other: &Self) -> bool {
        self.middleware == other.middleware
    }
}

impl<S: Strategy, TContext, TResult> Eq for BasePipeline<S, TContext, TResult> {}

impl<S: Strategy, TContext, TResult> fmt::Debug for BasePipeline<S, TContext, TResult> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("strategy", &S::NAME)
            .field("middleware", &self.middleware)
            .finish()
    }
}

impl<S: Strategy, TContext, TResult> FromIterator<Middleware<S>>
    for BasePipeline<S, TContext, TResult>
{
    fn from_iter<I: IntoIterator<Item = Middleware<S>>>(iter: I) -> Self {
        Self::from(iter)
    }
}

impl<'a, S: Strategy, TContext, TResult> IntoIterator for &'a BasePipeline<S, TContext, TResult> {
    type Item = &'a Middleware<S>;
    type IntoIter = slice::Iter<'a, Middleware<S>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<S: Strategy, T> Semigroup for BasePipeline<S, T, T> {
    fn concat(&self, other: &Self) -> Self {
        BasePipeline::concat(self, other)
    }
}

impl<S: Strategy, T> Monoid for BasePipeline<S, T, T> {
    fn empty() -> Self {
        BasePipeline::empty()
    }
}

/// Read access shared by every pipeline, for code that is generic over the strategy.
pub trait PipelineLike {
    type Strategy: Strategy;
    type Empty: PipelineLike<Strategy = Self::Strategy>;

    fn middleware(&self) -> &[Middleware<Self::Strategy>];

    fn to_array(&self) -> &[Middleware<Self::Strategy>] {
        self.middleware()
    }

    fn is_empty(&self) -> bool {
        self.middleware().is_empty()
    }

    fn len(&self) -> usize {
        self.middleware().len()
    }

    /// An identity element of the same strategy.
    fn empty_like(&self) -> Self::Empty;
}

impl<S: Strategy, TContext, TResult> PipelineLike for BasePipeline<S, TContext, TResult> {
    type Strategy = S;
    type Empty = BasePipeline<S, TResult, TResult>;

    fn middleware(&self) -> &[Middleware<S>] {
        &self.middleware
    }

    fn empty_like(&self) -> Self::Empty {
        BasePipeline::empty()
    }
}
