mod sealed {
    pub trait Sealed {}
}

pub(crate) use sealed::Sealed;

/// How a pipeline runs its middleware.
///
/// Each strategy decides the shape of the stored handler. Because the strategy is a type parameter
/// of [`BasePipeline`](super::BasePipeline), pipelines of different strategies can never be
/// concatenated and every constructor stays within the strategy it was called on.
///
/// This trait is sealed, the three strategies of this crate are the only implementations.
pub trait Strategy: Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    type Handler: ?Sized + Send + Sync;

    /// Human readable name, used in `Debug` output and tracing spans.
    const NAME: &'static str;
}
