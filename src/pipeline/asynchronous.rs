use std::{convert::Infallible, future::Future, sync::Arc};

use futures::{
    future::{self, BoxFuture},
    FutureExt,
};

use crate::{middleware::StepResult, trace, BoxError, DynContext, Error, Middleware, StepError};

use super::{strategy::Sealed, BasePipeline, Strategy};

#[doc(hidden)]
pub type AsyncHandler = dyn for<'a> Fn(&'a mut DynContext) -> BoxFuture<'a, StepResult> + Send + Sync;

/// Awaits every middleware before passing its result to the next one.
///
/// Steps never overlap, the pipeline itself spawns nothing and needs no particular runtime.
#[derive(Debug)]
pub enum AsyncStrategy {}

impl Sealed for AsyncStrategy {}

impl Strategy for AsyncStrategy {
    type Handler = AsyncHandler;

    const NAME: &'static str = "async";
}

fn handler<F>(func: F) -> Arc<AsyncHandler>
where
    F: for<'a> Fn(&'a mut DynContext) -> BoxFuture<'a, StepResult> + Send + Sync + 'static,
{
    Arc::new(func)
}

impl Middleware<AsyncStrategy> {
    /// A middleware that may leave the context untouched by resolving to `None`.
    ///
    /// ```
    /// use middleware_pipeline::AsyncMiddleware;
    ///
    /// let double = AsyncMiddleware::new(|x: &mut i32| Box::pin(async move { Some(*x * 2) }));
    /// ```
    pub fn new<TIn, TOut, F>(func: F) -> Self
    where
        TIn: Send + 'static,
        TOut: Send + 'static,
        F: for<'a> Fn(&'a mut TIn) -> BoxFuture<'a, Option<TOut>> + Send + Sync + 'static,
    {
        Self::try_new(move |ctx: &mut TIn| func(ctx).map(Ok::<_, Infallible>).boxed())
    }

    /// Like [`new`](Self::new) but the returned future can fail, aborting the pipeline with its error.
    pub fn try_new<TIn, TOut, E, F>(func: F) -> Self
    where
        TIn: Send + 'static,
        TOut: Send + 'static,
        E: Into<BoxError> + 'static,
        F: for<'a> Fn(&'a mut TIn) -> BoxFuture<'a, Result<Option<TOut>, E>>
            + Send
            + Sync
            + 'static,
    {
        Self::from_handler::<TIn>(handler(move |ctx| match ctx.downcast_mut::<TIn>() {
            Ok(input) => func(input)
                .map(|result| match result {
                    Ok(done) => Ok(done.map(DynContext::new)),
                    Err(err) => Err(StepError::Raised(err.into())),
                })
                .boxed(),
            Err(err) => future::ready(Err(StepError::from(err))).boxed(),
        }))
    }

    /// A middleware that consumes its input and always resolves to the next context.
    pub fn from_fn<TIn, TOut, Fut, F>(func: F) -> Self
    where
        TIn: Send + 'static,
        TOut: Send + 'static,
        Fut: Future<Output = TOut> + Send + 'static,
        F: Fn(TIn) -> Fut + Send + Sync + 'static,
    {
        Self::from_handler::<TIn>(handler(move |ctx| match ctx.take::<TIn>() {
            Ok(input) => func(input)
                .map(|done| Ok(Some(DynContext::new(done))))
                .boxed(),
            Err(err) => future::ready(Err(StepError::from(err))).boxed(),
        }))
    }
}

impl<TContext, TResult> BasePipeline<AsyncStrategy, TContext, TResult>
where
    TContext: Send + 'static,
    TResult: 'static,
{
    /// Sequentially calls the middleware, starting with `ctx`.
    ///
    /// Each middleware's future is resolved before its value is handed to the next middleware.
    /// Resolving to `None` leaves the context as it was.
    ///
    /// The returned future fails with the first error encountered; no later middleware runs.
    pub async fn process(&self, ctx: TContext) -> Result<TResult, Error> {
        let fold = async move {
            let mut result = DynContext::new(ctx);

            for (position, middleware) in self.iter().enumerate() {
                let handler = middleware
                    .handler()
                    .ok_or_else(|| trace::failed(Error::InvalidMiddleware { position }))?;

                let done = handler(&mut result)
                    .await
                    .map_err(|err| trace::failed(err.at(position)))?;
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
        };

        #[cfg(feature = "tracing")]
        let fold =
            tracing::Instrument::instrument(fold, trace::span(AsyncStrategy::NAME, self.len()));

        fold.await
    }
}
