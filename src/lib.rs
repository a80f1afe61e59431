//! Deferred values with `then`, `catch` and `finally`, running on a small
//! single-threaded event loop.
//!
//! ```
//! use linked_promise::{Continuation, Deferred, Runtime};
//!
//! let runtime = Runtime::new();
//! let result = runtime.block_on(|| {
//!     Deferred::<i32, String>::resolve(1)
//!         .then(|_| Continuation::Defer(Deferred::<i32, String>::reject("inner".into())))
//!         .finally(|| println!("settled"))
//! });
//! assert_eq!(result, Err(linked_promise::Error::Rejected("inner".to_string())));
//! ```
//!
//! Continuations and producers are plain closures and run on the thread
//! driving the [`Runtime`]. Waiting on a value means attaching a
//! continuation, or awaiting it: [`Deferred`] is also a [`Future`].
//!
//! [`Future`]: std::future::Future
pub mod adapters;
pub mod deferred;
mod error;
pub mod list;
pub mod queue;
pub mod runtime;

pub use deferred::{Continuation, Deferred, Rejecter, Resolver, Settlement, State};
pub use error::{Error, NoRuntime};
pub use runtime::{Clock, FaultPolicy, Runtime, RuntimeBuilder};
