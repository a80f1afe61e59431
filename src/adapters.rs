//! Ready-made producers for the two kinds of deferred work the crate is
//! usually fed with: waiting on a timer and reading a file.
//!
//! Each adapter is just a call to [`Deferred::new`] with a producer, so they
//! need a running [`Runtime`](crate::Runtime) like any other producer.
use crate::deferred::Deferred;
use crate::runtime;

use log::trace;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Rejection reason of [`read_file`] and [`read_to_string`].
///
/// `io::Error` is not `Clone`, and rejection reasons have to be, so this
/// keeps the kind and the message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to read {}: {message}", .path.display())]
pub struct ReadError {
    pub path: PathBuf,
    pub kind: io::ErrorKind,
    pub message: String,
}

impl ReadError {
    fn new(path: PathBuf, err: io::Error) -> Self {
        Self {
            path,
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Fulfills with `value` once `duration` has passed.
pub fn delay<T, E>(duration: Duration, value: T) -> Deferred<T, E>
where
    T: Clone + 'static,
    E: Clone + 'static,
{
    Deferred::new(move |resolver, _| {
        runtime::schedule_after(duration, move || resolver.resolve(value))
    })
}

/// Rejects with `reason` once `duration` has passed.
pub fn delay_reject<T, E>(duration: Duration, reason: E) -> Deferred<T, E>
where
    T: Clone + 'static,
    E: Clone + 'static,
{
    Deferred::new(move |_, rejecter| {
        runtime::schedule_after(duration, move || rejecter.reject(reason))
    })
}

/// Reads the whole file on a later turn.
pub fn read_file(path: impl AsRef<Path>) -> Deferred<Vec<u8>, ReadError> {
    let path = path.as_ref().to_path_buf();
    Deferred::new(move |resolver, rejecter| {
        trace!("reading {}", path.display());
        match fs::read(&path) {
            Ok(bytes) => resolver.resolve(bytes),
            Err(err) => rejecter.reject(ReadError::new(path, err)),
        }
    })
}

/// Like [`read_file`], but the contents must be UTF-8.
pub fn read_to_string(path: impl AsRef<Path>) -> Deferred<String, ReadError> {
    let path = path.as_ref().to_path_buf();
    Deferred::new(move |resolver, rejecter| {
        trace!("reading {}", path.display());
        match fs::read_to_string(&path) {
            Ok(text) => resolver.resolve(text),
            Err(err) => rejecter.reject(ReadError::new(path, err)),
        }
    })
}
