use std::{error, fmt};

/// A type-erased error returned by a fallible middleware.
pub type BoxError = Box<dyn error::Error + Send + Sync + 'static>;

/// The value reaching a middleware (or leaving the pipeline) was not of the type it was built for.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("expected context of type '{to}' but received '{from}'")]
pub struct DowncastError {
    pub from: &'static str,
    pub to: &'static str,
}

/// An error produced by [`process`](crate::BasePipeline).
///
/// Every variant carries the position of the middleware at which execution stopped.
/// No middleware after that position has been invoked.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("middleware at position {position} is not invocable")]
    InvalidMiddleware { position: usize },
    #[error("middleware at position {position}: {source}")]
    UnexpectedContext {
        position: usize,
        source: DowncastError,
    },
    #[error("middleware at position {position} failed: {source}")]
    Middleware { position: usize, source: BoxError },
}

impl Error {
    /// Position in the middleware sequence where processing stopped.
    ///
    /// For [`Error::UnexpectedContext`] raised on the final value this is the length of the pipeline.
    pub fn position(&self) -> usize {
        match self {
            Error::InvalidMiddleware { position }
            | Error::UnexpectedContext { position, .. }
            | Error::Middleware { position, .. } => *position,
        }
    }

    /// The error raised by the middleware itself, if it was of type `E`.
    pub fn downcast_ref<E: error::Error + 'static>(&self) -> Option<&E> {
        match self {
            Error::Middleware { source, .. } => source.downcast_ref::<E>(),
            _ => None,
        }
    }

    /// Returns the error raised by the middleware, untouched.
    pub fn into_source(self) -> Option<BoxError> {
        match self {
            Error::Middleware { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Failure of a single step, before its position is known.
#[doc(hidden)]
pub enum StepError {
    Downcast(DowncastError),
    Raised(BoxError),
}

impl StepError {
    pub(crate) fn at(self, position: usize) -> Error {
        match self {
            StepError::Downcast(source) => Error::UnexpectedContext { position, source },
            StepError::Raised(source) => Error::Middleware { position, source },
        }
    }
}

impl From<DowncastError> for StepError {
    fn from(err: DowncastError) -> Self {
        StepError::Downcast(err)
    }
}

impl fmt::Debug for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepError::Downcast(err) => f.debug_tuple("Downcast").field(err).finish(),
            StepError::Raised(err) => f.debug_tuple("Raised").field(err).finish(),
        }
    }
}
