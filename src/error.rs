use thiserror::Error;

/// Returned by [`Runtime::block_on`](crate::Runtime::block_on).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error<E> {
    #[error("deferred value was rejected")]
    Rejected(E),
    /// The event loop ran out of work while the deferred value was still
    /// pending. A producer that never settles ends up here.
    #[error("event loop went idle before the deferred value settled")]
    Stalled,
}

/// Scheduling was attempted on a thread that is not inside
/// [`Runtime::run`](crate::Runtime::run) or
/// [`Runtime::block_on`](crate::Runtime::block_on).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("must be called from within a running `Runtime`")]
pub struct NoRuntime;
