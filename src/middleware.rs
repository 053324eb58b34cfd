//! The stored unit of a pipeline.
//!
//! A [`Middleware`] is a single unary step. The constructors for each execution strategy live next
//! to that strategy (see [`SyncMiddleware::new`], [`AsyncMiddleware::new`] and
//! [`IntermediateMiddleware::new`]), this module only holds the shared, type-erased slot.

use std::{any::type_name, fmt, iter, sync::Arc};

use crate::{
    pipeline::{AsyncStrategy, IntermediateStrategy, Strategy, SyncStrategy},
    DynContext, StepError,
};

#[doc(hidden)]
pub type StepResult = Result<Option<DynContext>, StepError>;

/// A middleware for [`SyncPipeline`](crate::SyncPipeline).
pub type SyncMiddleware = Middleware<SyncStrategy>;

/// A middleware for [`Pipeline`](crate::Pipeline).
pub type AsyncMiddleware = Middleware<AsyncStrategy>;

/// A middleware for [`IntermediatePipeline`](crate::IntermediatePipeline) with companion type `C`.
pub type IntermediateMiddleware<C = ()> = Middleware<IntermediateStrategy<C>>;

/// A single transformation step, stored type-erased so pipelines can mix input and output types.
///
/// A slot may also be *invalid* ([`Middleware::invalid`]), the equivalent of storing a non-callable
/// value. Building and composing pipelines never looks at this, the error is only raised by
/// `process` once execution reaches the slot.
///
/// Cloning is cheap and a clone compares equal to the original.
pub struct Middleware<S: Strategy> {
    handler: Option<Arc<S::Handler>>,
    input: &'static str,
}

impl<S: Strategy> Middleware<S> {
    pub(crate) fn from_handler<TIn>(handler: Arc<S::Handler>) -> Self {
        Self {
            handler: Some(handler),
            input: type_name::<TIn>(),
        }
    }

    /// A slot that cannot be invoked.
    pub fn invalid() -> Self {
        Self {
            handler: None,
            input: "!",
        }
    }

    /// Whether this slot holds an invocable middleware.
    pub fn is_valid(&self) -> bool {
        self.handler.is_some()
    }

    /// Name of the type this middleware expects to receive.
    pub fn input_type(&self) -> Option<&'static str> {
        self.handler.as_ref().map(|_| self.input)
    }

    pub(crate) fn handler(&self) -> Option<&S::Handler> {
        self.handler.as_deref()
    }
}

impl<S: Strategy> Default for Middleware<S> {
    fn default() -> Self {
        Self::invalid()
    }
}

impl<S: Strategy> Clone for Middleware<S> {
    fn clone(&self) -> Self {
        Self {
            handler: self.handler.clone(),
            input: self.input,
        }
    }
}

impl<S: Strategy> PartialEq for Middleware<S> {
    fn eq(&self, other: &Self) -> bool {
        match (&self.handler, &other.handler) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl<S: Strategy> Eq for Middleware<S> {}

/// Yields the middleware itself, so a single one can be passed wherever a sequence is expected.
impl<S: Strategy> IntoIterator for Middleware<S> {
    type Item = Self;
    type IntoIter = iter::Once<Self>;

    fn into_iter(self) -> Self::IntoIter {
        iter::once(self)
    }
}

impl<S: Strategy> fmt::Debug for Middleware<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.input_type() {
            Some(input) => f.debug_struct("Middleware").field("input", &input).finish(),
            None => write!(f, "Middleware(invalid)"),
        }
    }
}
