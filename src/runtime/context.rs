use super::Shared;

use std::cell::RefCell;
use std::rc::Rc;

thread_local! {
    /// The event loop the current thread is running, if any.
    static CURRENT: RefCell<Option<Rc<Shared>>> = const { RefCell::new(None) };
}

/// Puts previous context back, also when `f` unwinds.
struct Restore(Option<Rc<Shared>>);

impl Drop for Restore {
    fn drop(&mut self) {
        let previous = self.0.take();
        let _ = CURRENT.try_with(|current| *current.borrow_mut() = previous);
    }
}

/// Installs `shared` as the current event loop for the duration of `f`.
pub(crate) fn enter<R>(shared: Rc<Shared>, f: impl FnOnce() -> R) -> R {
    let _restore = Restore(CURRENT.with(|current| current.replace(Some(shared))));
    f()
}

pub(crate) fn current() -> Option<Rc<Shared>> {
    CURRENT
        .try_with(|current| current.borrow().clone())
        .ok()
        .flatten()
}
