use std::{convert::Infallible, fmt, future::Future, marker::PhantomData, sync::Arc};

use futures::{
    future::{self, BoxFuture},
    FutureExt,
};

use crate::{
    middleware::StepResult, trace, BoxError, DowncastError, DynContext, Error, Intermediate,
    Middleware, StepError,
};

use super::{strategy::Sealed, BasePipeline, Strategy};

/// Awaits every middleware like [`AsyncStrategy`](super::AsyncStrategy), but over an
/// [`Intermediate`] carrying companion data of type `C` next to the payload.
pub struct IntermediateStrategy<C = ()>(PhantomData<fn() -> C>);

impl<C> fmt::Debug for IntermediateStrategy<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("IntermediateStrategy")
    }
}

impl<C> Sealed for IntermediateStrategy<C> {}

impl<C: Send + 'static> Strategy for IntermediateStrategy<C> {
    type Handler = IntermediateHandler;

    const NAME: &'static str = "intermediate";
}

#[doc(hidden)]
pub struct IntermediateHandler {
    /// Runs the middleware against the boxed wrapper and yields its (boxed) result.
    call: Box<dyn for<'a> Fn(&'a mut DynContext) -> BoxFuture<'a, StepResult> + Send + Sync>,
    /// Writes a result into the payload field of the wrapper, leaving the companion untouched.
    assign: fn(DynContext, DynContext) -> Result<DynContext, DowncastError>,
}

fn call<F>(func: F) -> F
where
    F: for<'a> Fn(&'a mut DynContext) -> BoxFuture<'a, StepResult> + Send + Sync + 'static,
{
    func
}

fn assign<TIn, TOut, C>(wrapper: DynContext, payload: DynContext) -> Result<DynContext, DowncastError>
where
    TIn: 'static,
    TOut: Send + 'static,
    C: Send + 'static,
{
    let wrapper = wrapper.downcast::<Intermediate<TIn, C>>()?;
    let payload = payload.downcast::<TOut>()?;
    Ok(DynContext::new(Intermediate::new(payload, wrapper.companion)))
}

impl<C: Send + 'static> Middleware<IntermediateStrategy<C>> {
    /// A middleware receiving the whole wrapper. Resolving to `Some` replaces the payload, `None`
    /// leaves it as it is (including edits made through the reference).
    ///
    /// ```
    /// use middleware_pipeline::{Intermediate, IntermediateMiddleware};
    ///
    /// let increment = IntermediateMiddleware::new(|ctx: &mut Intermediate<i32>| {
    ///     Box::pin(async move { Some(ctx.intermediate + 1) })
    /// });
    /// ```
    pub fn new<TIn, TOut, F>(func: F) -> Self
    where
        TIn: Send + 'static,
        TOut: Send + 'static,
        F: for<'a> Fn(&'a mut Intermediate<TIn, C>) -> BoxFuture<'a, Option<TOut>>
            + Send
            + Sync
            + 'static,
    {
        Self::try_new(move |ctx: &mut Intermediate<TIn, C>| {
            func(ctx).map(Ok::<_, Infallible>).boxed()
        })
    }

    /// Like [`new`](Self::new) but the returned future can fail, aborting the pipeline with its error.
    pub fn try_new<TIn, TOut, E, F>(func: F) -> Self
    where
        TIn: Send + 'static,
        TOut: Send + 'static,
        E: Into<BoxError> + 'static,
        F: for<'a> Fn(&'a mut Intermediate<TIn, C>) -> BoxFuture<'a, Result<Option<TOut>, E>>
            + Send
            + Sync
            + 'static,
    {
        let call = call(
            move |ctx| match ctx.downcast_mut::<Intermediate<TIn, C>>() {
                Ok(wrapper) => func(wrapper)
                    .map(|result| match result {
                        Ok(done) => Ok(done.map(DynContext::new)),
                        Err(err) => Err(StepError::Raised(err.into())),
                    })
                    .boxed(),
                Err(err) => future::ready(Err(StepError::from(err))).boxed(),
            },
        );

        Self::from_handler::<TIn>(Arc::new(IntermediateHandler {
            call: Box::new(call),
            assign: assign::<TIn, TOut, C>,
        }))
    }
}

impl<TContext, TResult, C> BasePipeline<IntermediateStrategy<C>, TContext, TResult>
where
    TContext: Send + 'static,
    TResult: 'static,
    C: Send + 'static,
{
    /// Sequentially calls the middleware over `ctx` wrapped in an [`Intermediate`].
    ///
    /// `ctx` may be a bare payload, which is wrapped with a default companion, or an
    /// [`Intermediate`] already carrying companion data. A JSON payload that is itself shaped like
    /// an intermediate (see [`is_intermediate`](crate::is_intermediate)) is taken apart instead of
    /// being wrapped again, when the companion is a JSON map. Every middleware receives the wrapper, and
    /// the value its future resolves to is assigned to the payload field only. Resolves to the
    /// final payload.
    pub fn process(
        &self,
        ctx: impl Into<Intermediate<TContext, C>>,
    ) -> impl Future<Output = Result<TResult, Error>> + Send + '_ {
        self.process_wrapped(ctx)
            .map(|result| result.map(Intermediate::into_inner))
    }

    /// Like [`process`](Self::process) but resolves to the final wrapper, companion included.
    pub fn process_wrapped(
        &self,
        ctx: impl Into<Intermediate<TContext, C>>,
    ) -> impl Future<Output = Result<Intermediate<TResult, C>, Error>> + Send + '_ {
        let mut wrapper = DynContext::new(ctx.into());
        crate::intermediate::recognize(&mut wrapper);

        let fold = async move {
            for (position, middleware) in self.iter().enumerate() {
                let handler = middleware
                    .handler()
                    .ok_or_else(|| trace::failed(Error::InvalidMiddleware { position }))?;

                let done = (handler.call)(&mut wrapper)
                    .await
                    .map_err(|err| trace::failed(err.at(position)))?;
                trace::step(position, done.is_some());

                if let Some(payload) = done {
                    wrapper = (handler.assign)(wrapper, payload).map_err(|source| {
                        trace::failed(Error::UnexpectedContext { position, source })
                    })?;
                }
            }

            wrapper.downcast().map_err(|source| {
                trace::failed(Error::UnexpectedContext {
                    position: self.len(),
                    source,
                })
            })
        };

        #[cfg(feature = "tracing")]
        let fold = tracing::Instrument::instrument(
            fold,
            trace::span(IntermediateStrategy::<C>::NAME, self.len()),
        );

        fold
    }
}
