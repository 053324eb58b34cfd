//! Pipelines and their execution strategies.
//!
//! A pipeline is an immutable, ordered sequence of [`Middleware`](crate::Middleware) plus the strategy
//! used to run it. All three strategies share [`BasePipeline`] for construction and composition and
//! only differ in `process`:
//!
//! - [`SyncPipeline`] runs every step on the caller's stack.
//! - [`Pipeline`] awaits each step before handing its result to the next one.
//! - [`IntermediatePipeline`] does the same over an [`Intermediate`](crate::Intermediate) wrapper so
//!   companion data travels with the payload.
//!
//! Composition forms a monoid: `concat` is associative and [`BasePipeline::empty`] is its identity.

mod asynchronous;
mod base;
mod intermediate;
mod strategy;
mod sync;

pub use asynchronous::{AsyncHandler, AsyncStrategy};
pub use base::{BasePipeline, PipelineLike};
pub use intermediate::{IntermediateHandler, IntermediateStrategy};
pub use strategy::Strategy;
pub use sync::{SyncHandler, SyncStrategy};

/// Synchronous pipeline, `process` returns the result directly.
pub type SyncPipeline<TContext, TResult = TContext> = BasePipeline<SyncStrategy, TContext, TResult>;

/// Asynchronous pipeline over the raw context.
pub type Pipeline<TContext, TResult = TContext> = BasePipeline<AsyncStrategy, TContext, TResult>;

/// Asynchronous pipeline over an [`Intermediate`](crate::Intermediate) wrapping the context, with
/// companion data of type `C`.
pub type IntermediatePipeline<TContext, TResult = TContext, C = ()> =
    BasePipeline<IntermediateStrategy<C>, TContext, TResult>;
