//! The deferred value: a single eventual settlement, either a fulfilled
//! value or a rejection reason, that continuations can be attached to before
//! or after it happens.
//!
//! A `Deferred` starts pending. Its producer (if any) is run on a later turn
//! of the current [`Runtime`](crate::Runtime) with a [`Resolver`] and a
//! [`Rejecter`]; the first of those to be called settles it for good. Every
//! continuation registered with [`then`](Deferred::then),
//! [`catch`](Deferred::catch) or [`finally`](Deferred::finally) gets a new
//! child `Deferred` that is settled from the continuation's result.
//!
//! A producer that never settles leaves its deferred value pending forever.
//! There is no cancellation and no timeout.
use crate::error::NoRuntime;
use crate::queue::Queue;
use crate::runtime;

use log::{debug, trace};
use std::cell::RefCell;
use std::fmt::{self, Debug};
use std::future::Future;
use std::mem;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Pending,
    Fulfilled,
    Rejected,
}

/// The terminal outcome of a deferred value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement<T, E> {
    Fulfilled(T),
    Rejected(E),
}

impl<T, E> Settlement<T, E> {
    pub fn state(&self) -> State {
        match self {
            Settlement::Fulfilled(_) => State::Fulfilled,
            Settlement::Rejected(_) => State::Rejected,
        }
    }

    pub fn into_result(self) -> Result<T, E> {
        match self {
            Settlement::Fulfilled(value) => Ok(value),
            Settlement::Rejected(reason) => Err(reason),
        }
    }
}

impl<T, E> From<Settlement<T, E>> for Result<T, E> {
    fn from(settlement: Settlement<T, E>) -> Self {
        settlement.into_result()
    }
}

/// What a continuation hands back to settle its child.
///
/// `Fulfill` settles the child with a plain value, even when the
/// continuation was a rejection handler. `Reject` keeps (or makes) the chain
/// rejected. `Defer` makes the child mirror another deferred value's eventual
/// settlement instead of wrapping it.
pub enum Continuation<T, E> {
    Fulfill(T),
    Reject(E),
    Defer(Deferred<T, E>),
}

impl<T, E> From<Result<T, E>> for Continuation<T, E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Continuation::Fulfill(value),
            Err(reason) => Continuation::Reject(reason),
        }
    }
}

impl<T, E> From<Deferred<T, E>> for Continuation<T, E> {
    fn from(deferred: Deferred<T, E>) -> Self {
        Continuation::Defer(deferred)
    }
}

/// Boxed fulfillment handler accepted by [`Deferred::then_with`].
pub type OnFulfilled<T, E> = Box<dyn FnOnce(T) -> Continuation<T, E>>;
/// Boxed rejection handler accepted by [`Deferred::then_with`].
pub type OnRejected<T, E> = Box<dyn FnOnce(E) -> Continuation<T, E>>;

/// A registered continuation, already bound to the child it settles.
type Reaction<T, E> = Box<dyn FnOnce(Settlement<T, E>)>;

struct Cleanup<T, E> {
    child: Deferred<T, E>,
    action: Box<dyn FnOnce()>,
}

struct Inner<T, E> {
    settlement: Option<Settlement<T, E>>,
    reactions: Queue<Reaction<T, E>>,
    cleanups: Queue<Cleanup<T, E>>,
    wakers: Vec<Waker>,
    /// Set while `propagate` is working through the queues.
    draining: bool,
    /// Something attached to this value or polled it.
    observed: bool,
}

impl<T, E> Drop for Inner<T, E> {
    fn drop(&mut self) {
        if !self.observed && matches!(self.settlement, Some(Settlement::Rejected(_))) {
            debug!("rejected deferred value dropped without a rejection handler");
        }
    }
}

/// Clears `Inner::draining` when propagation ends, unwinding included.
struct Draining<'a, T, E>(&'a RefCell<Inner<T, E>>);

impl<T, E> Drop for Draining<'_, T, E> {
    fn drop(&mut self) {
        if let Ok(mut inner) = self.0.try_borrow_mut() {
            inner.draining = false;
        }
    }
}

/// A deferred value. Cloning gives another handle to the same value.
///
/// ```
/// use linked_promise::{Continuation, Deferred, Runtime};
///
/// let runtime = Runtime::new();
/// let recovered = runtime.block_on(|| {
///     Deferred::<String, String>::reject("boom".into())
///         .then(|v| Continuation::Fulfill(v))
///         .catch(|e| Continuation::Fulfill(format!("recovered:{e}")))
/// });
/// assert_eq!(recovered, Ok("recovered:boom".to_string()));
/// ```
pub struct Deferred<T, E> {
    inner: Rc<RefCell<Inner<T, E>>>,
}

impl<T, E> Clone for Deferred<T, E> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Debug, E: Debug> Debug for Deferred<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_borrow() {
            Ok(inner) => f
                .debug_struct("Deferred")
                .field("settlement", &inner.settlement)
                .finish(),
            Err(_) => f.debug_struct("Deferred").finish_non_exhaustive(),
        }
    }
}

impl<T: Clone + 'static, E: Clone + 'static> Deferred<T, E> {
    fn detached() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                settlement: None,
                reactions: Queue::new(),
                cleanups: Queue::new(),
                wakers: vec![],
                draining: false,
                observed: false,
            })),
        }
    }

    /// Creates a pending value and schedules `producer` on the current
    /// runtime. The producer never runs during this call, so continuations
    /// attached right after are always in place before it can settle.
    ///
    /// A panic in the producer is handled by the runtime's
    /// [`FaultPolicy`](crate::FaultPolicy); under the default policy the
    /// value stays pending.
    ///
    /// # Panics
    ///
    /// Panics if called outside a running [`Runtime`](crate::Runtime).
    pub fn new<P>(producer: P) -> Self
    where
        P: FnOnce(Resolver<T, E>, Rejecter<T, E>) + 'static,
    {
        match Self::try_new(producer) {
            Ok(deferred) => deferred,
            Err(err) => panic!("{err}"),
        }
    }

    pub fn try_new<P>(producer: P) -> Result<Self, NoRuntime>
    where
        P: FnOnce(Resolver<T, E>, Rejecter<T, E>) + 'static,
    {
        let deferred = Self::detached();
        let resolver = Resolver {
            target: deferred.clone(),
        };
        let rejecter = Rejecter {
            target: deferred.clone(),
        };
        runtime::try_schedule(move || producer(resolver, rejecter))?;
        Ok(deferred)
    }

    /// A pending value with no producer, plus the handles that settle it.
    /// Needs no runtime.
    pub fn pending() -> (Self, Resolver<T, E>, Rejecter<T, E>) {
        let deferred = Self::detached();
        let resolver = Resolver {
            target: deferred.clone(),
        };
        let rejecter = Rejecter {
            target: deferred.clone(),
        };
        (deferred, resolver, rejecter)
    }

    /// Fulfills with `value` on the next turn.
    pub fn resolve(value: T) -> Self {
        Self::new(move |resolver, _| resolver.resolve(value))
    }

    /// Rejects with `reason` on the next turn.
    pub fn reject(reason: E) -> Self {
        Self::new(move |_, rejecter| rejecter.reject(reason))
    }

    pub fn state(&self) -> State {
        match self.inner.borrow().settlement {
            Some(ref settlement) => settlement.state(),
            None => State::Pending,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.state() == State::Pending
    }

    pub fn settlement(&self) -> Option<Settlement<T, E>> {
        self.inner.borrow().settlement.clone()
    }

    pub fn value(&self) -> Option<T> {
        match self.settlement()? {
            Settlement::Fulfilled(value) => Some(value),
            Settlement::Rejected(_) => None,
        }
    }

    pub fn reason(&self) -> Option<E> {
        match self.settlement()? {
            Settlement::Rejected(reason) => Some(reason),
            Settlement::Fulfilled(_) => None,
        }
    }

    /// Registers either handler, both, or neither.
    ///
    /// A missing handler passes the outcome through to the child unchanged,
    /// which is how a rejection travels down a chain of fulfillment-only
    /// links to the nearest `catch`.
    pub fn then_with(
        &self,
        on_fulfilled: Option<OnFulfilled<T, E>>,
        on_rejected: Option<OnRejected<T, E>>,
    ) -> Self {
        self.react(
            move |value| match on_fulfilled {
                Some(handler) => handler(value),
                None => Continuation::Fulfill(value),
            },
            move |reason| match on_rejected {
                Some(handler) => handler(reason),
                None => Continuation::Reject(reason),
            },
        )
    }

    /// Runs `on_fulfilled` with the value; a rejection is passed through.
    pub fn then<U, F>(&self, on_fulfilled: F) -> Deferred<U, E>
    where
        U: Clone + 'static,
        F: FnOnce(T) -> Continuation<U, E> + 'static,
    {
        self.react(on_fulfilled, Continuation::Reject)
    }

    pub fn then_or_else<U, F, R>(&self, on_fulfilled: F, on_rejected: R) -> Deferred<U, E>
    where
        U: Clone + 'static,
        F: FnOnce(T) -> Continuation<U, E> + 'static,
        R: FnOnce(E) -> Continuation<U, E> + 'static,
    {
        self.react(on_fulfilled, on_rejected)
    }

    /// Shorthand for a `then` whose handler always fulfills.
    pub fn map<U, F>(&self, f: F) -> Deferred<U, E>
    where
        U: Clone + 'static,
        F: FnOnce(T) -> U + 'static,
    {
        self.react(move |value| Continuation::Fulfill(f(value)), Continuation::Reject)
    }

    /// Runs `on_rejected` with the reason; a fulfilled value is passed
    /// through.
    pub fn catch<R>(&self, on_rejected: R) -> Self
    where
        R: FnOnce(E) -> Continuation<T, E> + 'static,
    {
        self.react(Continuation::Fulfill, on_rejected)
    }

    /// Runs `on_settled` once this value settles, whichever way. The child
    /// settles exactly like this value; whatever `on_settled` returns is
    /// dropped.
    ///
    /// On an already settled value `on_settled` runs right away and the child
    /// comes back already settled.
    pub fn finally<F, R>(&self, on_settled: F) -> Self
    where
        F: FnOnce() -> R + 'static,
        R: 'static,
    {
        let child = Self::detached();
        let settlement = {
            let mut inner = self.inner.borrow_mut();
            inner.observed = true;
            inner.settlement.clone()
        };
        match settlement {
            Some(settlement) => {
                if runtime::guard(on_settled).is_some() {
                    child.settle(settlement);
                }
            }
            None => self.inner.borrow_mut().cleanups.enqueue(Cleanup {
                child: child.clone(),
                action: Box::new(move || drop(on_settled())),
            }),
        }
        child
    }

    fn react<U, F, R>(&self, on_fulfilled: F, on_rejected: R) -> Deferred<U, E>
    where
        U: Clone + 'static,
        F: FnOnce(T) -> Continuation<U, E> + 'static,
        R: FnOnce(E) -> Continuation<U, E> + 'static,
    {
        let child = Deferred::detached();
        let target = child.clone();
        self.subscribe(Box::new(move |settlement| {
            let continuation = match settlement {
                Settlement::Fulfilled(value) => runtime::guard(move || on_fulfilled(value)),
                Settlement::Rejected(reason) => runtime::guard(move || on_rejected(reason)),
            };
            if let Some(continuation) = continuation {
                target.adopt(continuation);
            }
        }));
        child
    }

    /// Queues `reaction`, and services it right away if already settled.
    fn subscribe(&self, reaction: Reaction<T, E>) {
        let settled = {
            let mut inner = self.inner.borrow_mut();
            inner.observed = true;
            inner.reactions.enqueue(reaction);
            inner.settlement.is_some()
        };
        if settled {
            self.propagate();
        }
    }

    fn adopt(&self, continuation: Continuation<T, E>) {
        match continuation {
            Continuation::Fulfill(value) => self.settle(Settlement::Fulfilled(value)),
            Continuation::Reject(reason) => self.settle(Settlement::Rejected(reason)),
            Continuation::Defer(nested) => {
                let target = self.clone();
                nested.subscribe(Box::new(move |settlement| target.settle(settlement)));
            }
        }
    }

    /// Pending to settled. Only the first call does anything.
    fn settle(&self, settlement: Settlement<T, E>) {
        let wakers = {
            let mut inner = self.inner.borrow_mut();
            if inner.settlement.is_some() {
                trace!("ignoring settlement of an already settled deferred value");
                return;
            }
            trace!("deferred value {:?}", settlement.state());
            inner.settlement = Some(settlement);
            mem::take(&mut inner.wakers)
        };
        for waker in wakers {
            waker.wake();
        }
        self.propagate();
    }

    /// Drains continuations, then cleanups, in registration order.
    ///
    /// The queues are detached before they are drained, so callbacks can
    /// attach more continuations to this value. Those are picked up by the
    /// next round of the loop, after everything attached earlier.
    fn propagate(&self) {
        let settlement = {
            let mut inner = self.inner.borrow_mut();
            if inner.draining {
                return;
            }
            let Some(settlement) = inner.settlement.clone() else {
                return;
            };
            inner.draining = true;
            settlement
        };
        let _draining = Draining(&self.inner);

        loop {
            let (mut reactions, mut cleanups) = {
                let mut inner = self.inner.borrow_mut();
                if inner.reactions.is_empty() && inner.cleanups.is_empty() {
                    break;
                }
                (
                    mem::take(&mut inner.reactions),
                    mem::take(&mut inner.cleanups),
                )
            };
            reactions.drain(|reaction| reaction(settlement.clone()));
            cleanups.drain(|Cleanup { child, action }| {
                if runtime::guard(action).is_some() {
                    child.settle(settlement.clone());
                }
            });
        }
    }
}

impl<T: Clone + 'static, E: Clone + 'static> Future for Deferred<T, E> {
    type Output = Result<T, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut inner = self.inner.borrow_mut();
        let inner = &mut *inner;
        inner.observed = true;
        match inner.settlement {
            Some(ref settlement) => Poll::Ready(settlement.clone().into_result()),
            None => {
                if !inner.wakers.iter().any(|w| w.will_wake(cx.waker())) {
                    inner.wakers.push(cx.waker().clone());
                }
                Poll::Pending
            }
        }
    }
}

/// Fulfills the deferred value it was handed out for. Only the first
/// settlement of that value counts, later ones are ignored.
pub struct Resolver<T, E> {
    target: Deferred<T, E>,
}

impl<T, E> Clone for Resolver<T, E> {
    fn clone(&self) -> Self {
        Self {
            target: self.target.clone(),
        }
    }
}

impl<T: Clone + 'static, E: Clone + 'static> Resolver<T, E> {
    pub fn resolve(self, value: T) {
        self.target.settle(Settlement::Fulfilled(value));
    }

    /// Settles from a continuation result, following a nested deferred
    /// value if there is one.
    pub fn resolve_with(self, continuation: Continuation<T, E>) {
        self.target.adopt(continuation);
    }

    pub fn is_settled(&self) -> bool {
        !self.target.is_pending()
    }
}

/// Rejects the deferred value it was handed out for. Only the first
/// settlement of that value counts, later ones are ignored.
pub struct Rejecter<T, E> {
    target: Deferred<T, E>,
}

impl<T, E> Clone for Rejecter<T, E> {
    fn clone(&self) -> Self {
        Self {
            target: self.target.clone(),
        }
    }
}

impl<T: Clone + 'static, E: Clone + 'static> Rejecter<T, E> {
    pub fn reject(self, reason: E) {
        self.target.settle(Settlement::Rejected(reason));
    }

    pub fn is_settled(&self) -> bool {
        !self.target.is_pending()
    }
}

#[cfg(test)]
mod tests {
use super::{Continuation, Deferred, Settlement, State};
use crate::{Clock, Runtime};
use futures::executor::block_on;
use futures::task::{waker, ArcWake};
use std::cell::{Cell, RefCell};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

type Log = Rc<RefCell<Vec<&'static str>>>;

fn runtime() -> Runtime {
    Runtime::builder().clock(Clock::Virtual).build()
}

#[test]
fn test_producer_is_not_run_synchronously() {
    let ran = Rc::new(Cell::new(false));
    let r = ran.clone();
    runtime().run(|| {
        let deferred = Deferred::<i32, ()>::new(move |resolver, _| {
            r.set(true);
            resolver.resolve(1);
        });
        assert!(!ran.get());
        assert_eq!(deferred.state(), State::Pending);
    });
    assert!(ran.get());
}

#[test]
fn test_first_settlement_wins() {
    let (deferred, resolver, rejecter) = Deferred::<i32, &str>::pending();
    resolver.clone().resolve(1);
    resolver.resolve(2);
    rejecter.clone().reject("late");
    assert!(rejecter.is_settled());
    assert_eq!(deferred.settlement(), Some(Settlement::Fulfilled(1)));
}

#[test]
fn test_reject_then_resolve_stays_rejected() {
    let (deferred, resolver, rejecter) = Deferred::<i32, &str>::pending();
    rejecter.reject("first");
    resolver.resolve(9);
    assert_eq!(deferred.reason(), Some("first"));
    assert_eq!(deferred.value(), None);
}

#[test]
fn test_then_handlers_fire_in_attachment_order() {
    let log: Log = Rc::default();
    let (deferred, resolver, _) = Deferred::<i32, ()>::pending();
    let a = log.clone();
    deferred.then(move |_| {
        a.borrow_mut().push("a");
        Continuation::Fulfill(())
    });
    let b = log.clone();
    deferred.then(move |_| {
        b.borrow_mut().push("b");
        Continuation::Fulfill(())
    });
    assert!(log.borrow().is_empty());
    resolver.resolve(0);
    assert_eq!(*log.borrow(), vec!["a", "b"]);
}

#[test]
fn test_late_registration_is_serviced_immediately() {
    let (deferred, resolver, _) = Deferred::<i32, ()>::pending();
    resolver.resolve(4);
    let child = deferred.map(|v| v * 2);
    assert_eq!(child.value(), Some(8));
}

#[test]
fn test_registration_during_drain_runs_after_earlier_ones() {
    let log: Log = Rc::default();
    let (deferred, resolver, _) = Deferred::<i32, ()>::pending();

    let (l, d) = (log.clone(), deferred.clone());
    deferred.then(move |_| {
        l.borrow_mut().push("first");
        let inner = l.clone();
        d.then(move |_| {
            inner.borrow_mut().push("nested");
            Continuation::Fulfill(())
        });
        Continuation::Fulfill(())
    });
    let l = log.clone();
    deferred.then(move |_| {
        l.borrow_mut().push("second");
        Continuation::Fulfill(())
    });

    resolver.resolve(0);
    assert_eq!(*log.borrow(), vec!["first", "second", "nested"]);
}

#[test]
fn test_missing_rejection_handler_passes_value_through() {
    let (deferred, resolver, _) = Deferred::<i32, i32>::pending();
    let child = deferred.then_with(None, Some(Box::new(|_: i32| Continuation::Fulfill(-1))));
    resolver.resolve(42);
    assert_eq!(child.value(), Some(42));
}

#[test]
fn test_missing_fulfillment_handler_passes_reason_through() {
    let (deferred, _, rejecter) = Deferred::<i32, &str>::pending();
    let child = deferred
        .then_with(Some(Box::new(|v: i32| Continuation::Fulfill(v + 1))), None)
        .then_with(None, None);
    rejecter.reject("nope");
    assert_eq!(child.reason(), Some("nope"));
}

#[test]
fn test_rejection_handler_result_fulfills_child() {
    let (deferred, _, rejecter) = Deferred::<String, String>::pending();
    let child = deferred.then_or_else(
        |v| Continuation::Fulfill(v.len()),
        |e| Continuation::Fulfill(e.len() * 10),
    );
    rejecter.reject("abc".into());
    assert_eq!(child.settlement(), Some(Settlement::Fulfilled(30)));
}

#[test]
fn test_handler_can_reject_explicitly() {
    let (deferred, resolver, _) = Deferred::<i32, String>::pending();
    let child = deferred
        .then(|v| Continuation::<i32, String>::from(Err(format!("bad {v}"))))
        .catch(|e| Continuation::Reject(format!("{e}!")));
    resolver.resolve(3);
    assert_eq!(child.reason(), Some("bad 3!".to_string()));
}

#[test]
fn test_nested_deferred_is_flattened() {
    let (outer, resolver, _) = Deferred::<i32, &str>::pending();
    let (nested, nested_resolver, _) = Deferred::<String, &str>::pending();
    let n = nested.clone();
    let child = outer.then(move |_| Continuation::Defer(n));
    resolver.resolve(1);
    assert!(child.is_pending());
    nested_resolver.resolve("inner".into());
    assert_eq!(child.value(), Some("inner".to_string()));
}

#[test]
fn test_finally_while_pending_mirrors_outcome() {
    let calls = Rc::new(Cell::new(0));
    let (deferred, _, rejecter) = Deferred::<i32, &str>::pending();
    let c = calls.clone();
    let child = deferred.finally(move || {
        c.set(c.get() + 1);
        "ignored"
    });
    assert!(child.is_pending());
    rejecter.reject("why");
    assert_eq!(calls.get(), 1);
    assert_eq!(child.reason(), Some("why"));
}

#[test]
fn test_finally_on_settled_runs_now() {
    let calls = Rc::new(Cell::new(0));
    let (deferred, resolver, _) = Deferred::<i32, ()>::pending();
    resolver.resolve(11);
    let c = calls.clone();
    let child = deferred.finally(move || c.set(c.get() + 1));
    assert_eq!(calls.get(), 1);
    assert_eq!(child.value(), Some(11));
}

#[test]
fn test_finally_runs_after_continuations() {
    let log: Log = Rc::default();
    let (deferred, resolver, _) = Deferred::<i32, ()>::pending();
    let l = log.clone();
    deferred.finally(move || l.borrow_mut().push("finally"));
    let l = log.clone();
    deferred.then(move |_| {
        l.borrow_mut().push("then");
        Continuation::Fulfill(())
    });
    resolver.resolve(0);
    assert_eq!(*log.borrow(), vec!["then", "finally"]);
}

#[test]
fn test_panicking_handler_leaves_child_pending() {
    let (deferred, resolver, _) = Deferred::<i32, ()>::pending();
    let faulty = deferred.then(|_| -> Continuation<i32, ()> { panic!("handler fault") });
    let healthy = deferred.map(|v| v + 1);
    resolver.resolve(1);
    assert!(faulty.is_pending());
    assert_eq!(healthy.value(), Some(2));
}

#[test]
fn test_panicking_finally_on_pending_value_skips_only_its_child() {
    let log: Log = Rc::default();
    let (deferred, resolver, _) = Deferred::<i32, ()>::pending();
    let faulty = deferred.finally(|| panic!("cleanup fault"));
    let l = log.clone();
    let sibling = deferred.finally(move || l.borrow_mut().push("finally"));
    let l = log.clone();
    let then = deferred.then(move |v| {
        l.borrow_mut().push("then");
        Continuation::Fulfill(v * 3)
    });
    resolver.resolve(2);
    assert!(faulty.is_pending());
    assert_eq!(sibling.value(), Some(2));
    assert_eq!(then.value(), Some(6));
    assert_eq!(*log.borrow(), vec!["then", "finally"]);
}

#[test]
fn test_panicking_finally_on_settled_value_leaves_child_pending() {
    let (deferred, _, rejecter) = Deferred::<i32, &str>::pending();
    rejecter.reject("gone");
    let faulty = deferred.finally(|| panic!("cleanup fault"));
    assert!(faulty.is_pending());

    let calls = Rc::new(Cell::new(0));
    let c = calls.clone();
    let sibling = deferred.finally(move || c.set(c.get() + 1));
    let recovered = deferred.catch(|e| Continuation::Fulfill(e.len() as i32));
    assert_eq!(calls.get(), 1);
    assert_eq!(sibling.reason(), Some("gone"));
    assert_eq!(recovered.value(), Some(4));
}

#[test]
fn test_repeated_polls_keep_one_waker() {
    let flag = Arc::new(Flag(AtomicBool::new(false)));
    let waker = waker(flag);
    let mut cx = Context::from_waker(&waker);
    let (mut deferred, _resolver, _) = Deferred::<i32, ()>::pending();

    for _ in 0..5 {
        assert_eq!(Pin::new(&mut deferred).poll(&mut cx), Poll::Pending);
    }
    assert_eq!(deferred.inner.borrow().wakers.len(), 1);
}

#[test]
fn test_panicking_producer_leaves_value_pending() {
    let rt = runtime();
    let deferred = rt.run(|| Deferred::<i32, ()>::new(|_, _| panic!("producer fault")));
    assert_eq!(deferred.state(), State::Pending);
}

#[test]
fn test_settled_value_is_awaitable() {
    let rt = runtime();
    let deferred = rt.run(|| Deferred::<i32, String>::resolve(5).map(|v| v + 1));
    assert_eq!(block_on(deferred), Ok(6));

    let rejected = rt.run(|| Deferred::<i32, String>::reject("x".into()));
    assert_eq!(block_on(rejected), Err("x".to_string()));
}

struct Flag(AtomicBool);

impl ArcWake for Flag {
    fn wake_by_ref(arc_self: &Arc<Self>) {
        arc_self.0.store(true, Ordering::SeqCst);
    }
}

#[test]
fn test_settlement_wakes_pending_poll() {
    let flag = Arc::new(Flag(AtomicBool::new(false)));
    let waker = waker(flag.clone());
    let mut cx = Context::from_waker(&waker);
    let (mut deferred, resolver, _) = Deferred::<i32, ()>::pending();

    assert_eq!(Pin::new(&mut deferred).poll(&mut cx), Poll::Pending);
    resolver.resolve(7);
    assert!(flag.0.load(Ordering::SeqCst));
    assert_eq!(Pin::new(&mut deferred).poll(&mut cx), Poll::Ready(Ok(7)));
}

#[test]
fn test_new_outside_runtime_is_an_error() {
    assert!(Deferred::<i32, ()>::try_new(|resolver, _| resolver.resolve(1)).is_err());
}
}
