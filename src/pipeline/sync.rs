use std::{convert::Infallible, sync::Arc};

use crate::{middleware::StepResult, trace, BoxError, DynContext, Error, Middleware, StepError};

use super::{strategy::Sealed, BasePipeline, Strategy};

#[doc(hidden)]
pub type SyncHandler = dyn Fn(&mut DynContext) -> StepResult + Send + Sync;

/// Runs every middleware on the caller's stack, nothing is ever awaited.
#[derive(Debug)]
pub enum SyncStrategy {}

impl Sealed for SyncStrategy {}

impl Strategy for SyncStrategy {
    type Handler = SyncHandler;

    const NAME: &'static str = "sync";
}

impl Middleware<SyncStrategy> {
    /// A middleware that may leave the context untouched by returning `None`.
    ///
    /// The context is handed over by mutable reference so it can also be edited in place.
    pub fn new<TIn, TOut, F>(func: F) -> Self
    where
        TIn: Send + 'static,
        TOut: Send + 'static,
        F: Fn(&mut TIn) -> Option<TOut> + Send + Sync + 'static,
    {
        Self::try_new(move |ctx: &mut TIn| Ok::<_, Infallible>(func(ctx)))
    }

    /// Like [`new`](Self::new) but the middleware can fail, aborting the pipeline with its error.
    pub fn try_new<TIn, TOut, E, F>(func: F) -> Self
    where
        TIn: Send + 'static,
        TOut: Send + 'static,
        E: Into<BoxError>,
        F: Fn(&mut TIn) -> Result<Option<TOut>, E> + Send + Sync + 'static,
    {
        Self::from_handler::<TIn>(Arc::new(move |ctx: &mut DynContext| -> StepResult {
            match func(ctx.downcast_mut::<TIn>()?) {
                Ok(done) => Ok(done.map(DynContext::new)),
                Err(err) => Err(StepError::Raised(err.into())),
            }
        }))
    }

    /// A middleware that consumes its input and always produces the next context.
    pub fn from_fn<TIn, TOut, F>(func: F) -> Self
    where
        TIn: Send + 'static,
        TOut: Send + 'static,
        F: Fn(TIn) -> TOut + Send + Sync + 'static,
    {
        Self::from_handler::<TIn>(Arc::new(move |ctx: &mut DynContext| -> StepResult {
            Ok(Some(DynContext::new(func(ctx.take::<TIn>()?))))
        }))
    }
}

impl<TContext, TResult> BasePipeline<SyncStrategy, TContext, TResult>
where
    TContext: Send + 'static,
    TResult: 'static,
{
    /// Sequentially calls the middleware, starting with `ctx`.
    ///
    /// The value returned by each middleware is passed to the next one. A middleware returning
    /// `None` leaves the context as it was, including any edits it made through its argument.
    ///
    /// Stops at the first invalid slot or failing middleware and returns that error.
    pub fn process(&self, ctx: TContext) -> Result<TResult, Error> {
        #[cfg(feature = "tracing")]
        let _span = trace::span(SyncStrategy::NAME, self.len()).entered();

        let mut result = DynContext::new(ctx);

        for (position, middleware) in self.iter().enumerate() {
            let handler = middleware
                .handler()
                .ok_or_else(|| trace::failed(Error::InvalidMiddleware { position }))?;

            let done = handler(&mut result).map_err(|err| trace::failed(err.at(position)))?;
            trace::step(position, done.is_some());

            if let Some(done) = done {
                result = done;
            }
        }

        result.downcast().map_err(|source| {
            trace::failed(Error::UnexpectedContext {
                position: self.len(),
                source,
            })
        })
    }
}
