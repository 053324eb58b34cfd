//! Composable middleware pipelines.
//!
//! A pipeline is an ordered, immutable sequence of middleware applied to a context value. Pipelines
//! compose as a monoid: [`BasePipeline::concat`] is associative and [`BasePipeline::empty`] is its
//! identity, so chains can be assembled from smaller ones in any grouping.
//!
//! Three execution strategies share the same container:
//!
//! - [`SyncPipeline`] runs on the caller's stack and returns the result directly.
//! - [`Pipeline`] awaits each middleware before passing its value on.
//! - [`IntermediatePipeline`] wraps the context in an [`Intermediate`] so companion data (handles to
//!   collaborating resources, request metadata, ...) travels alongside the payload.
//!
//! ```
//! use middleware_pipeline::{SyncMiddleware, SyncPipeline};
//!
//! let pipeline: SyncPipeline<i32> = SyncPipeline::from([
//!     SyncMiddleware::new(|_: &mut i32| None::<i32>),
//!     SyncMiddleware::from_fn(|x: i32| x + 1),
//! ]);
//!
//! assert_eq!(pipeline.process(1).unwrap(), 2);
//! ```
//!
//! A middleware returning no value leaves the context unchanged. A slot that holds no middleware at
//! all ([`Middleware::invalid`]) is only rejected once `process` reaches it.
#![warn(
    clippy::all,
    clippy::cargo,
    clippy::unwrap_used,
    clippy::panic,
    clippy::todo,
    clippy::panic_in_result_fn,
    // missing_docs
)]
#![forbid(unsafe_code)]
#![allow(clippy::module_inception)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod dyn_context;
mod error;
mod intermediate;
mod monoid;
mod trace;

pub mod middleware;
pub mod pipeline;

pub use error::{BoxError, DowncastError, Error};
pub use intermediate::{is_intermediate, Intermediate, INTERMEDIATE_KEY};
pub use middleware::{AsyncMiddleware, IntermediateMiddleware, Middleware, SyncMiddleware};
pub use monoid::{Monoid, Semigroup};
pub use pipeline::{
    AsyncStrategy, BasePipeline, IntermediatePipeline, IntermediateStrategy, Pipeline,
    PipelineLike, Strategy, SyncPipeline, SyncStrategy,
};

pub(crate) use dyn_context::DynContext;
pub(crate) use error::StepError;
