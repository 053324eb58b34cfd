//! Feature-gated diagnostics. Every function compiles to nothing without the `tracing` feature.

use crate::Error;

#[cfg(feature = "tracing")]
pub(crate) fn span(strategy: &'static str, len: usize) -> tracing::Span {
    tracing::debug_span!("process", strategy, len)
}

#[inline]
pub(crate) fn step(_position: usize, _produced: bool) {
    #[cfg(feature = "tracing")]
    tracing::trace!(
        position = _position,
        produced = _produced,
        "middleware resolved"
    );
}

#[inline]
pub(crate) fn failed(err: Error) -> Error {
    #[cfg(feature = "tracing")]
    tracing::debug!(position = err.position(), "pipeline failed: {}", err);
    err
}
