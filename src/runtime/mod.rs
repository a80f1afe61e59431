//! A single-threaded cooperative event loop.
//!
//! The loop owns two kinds of pending work:
//! - tasks queued with [`schedule`], run in arrival order on a later turn,
//! - timers queued with [`schedule_after`], run once due, ordered by
//!   deadline and then by registration.
//!
//! Ready tasks always run before any timer fires, and every callback runs to
//! completion before the next one starts. Nothing here is `Send`: deferred
//! values and their callbacks live and die on the thread that runs the loop.
mod builder;
mod context;
mod timer;

pub use builder::{Clock, FaultPolicy, RuntimeBuilder};

use crate::deferred::Deferred;
use crate::error::{Error, NoRuntime};
use crate::queue::Queue;
use timer::TimerEntry;

use log::{debug, trace, warn};
use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::BinaryHeap;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;
use std::thread;
use std::time::{Duration, Instant};

pub(crate) type Task = Box<dyn FnOnce()>;

enum ClockState {
    System(Instant),
    Virtual(Cell<Duration>),
}

pub(crate) struct Shared {
    tasks: RefCell<Queue<Task>>,
    timers: RefCell<BinaryHeap<TimerEntry>>,
    next_seq: Cell<u64>,
    clock: ClockState,
    fault_policy: FaultPolicy,
}

impl Shared {
    fn now(&self) -> Duration {
        match &self.clock {
            ClockState::System(start) => start.elapsed(),
            ClockState::Virtual(now) => now.get(),
        }
    }

    fn push_task(&self, task: Task) {
        let mut tasks = self.tasks.borrow_mut();
        tasks.enqueue(task);
        trace!("task scheduled, {} queued", tasks.len());
    }

    fn push_timer(&self, delay: Duration, task: Task) {
        let seq = self.next_seq.get();
        self.next_seq.set(seq + 1);
        let deadline = self.now() + delay;
        trace!("timer #{seq} scheduled for {deadline:?}");
        self.timers.borrow_mut().push(TimerEntry {
            deadline,
            seq,
            task,
        });
    }

    fn next_task(&self) -> Option<Task> {
        self.tasks.borrow_mut().dequeue()
    }

    /// Pops the earliest timer, first waiting for (or, on a virtual clock,
    /// jumping to) its deadline.
    fn next_timer(&self) -> Option<Task> {
        let entry = self.timers.borrow_mut().pop()?;
        let now = self.now();
        if entry.deadline > now {
            match &self.clock {
                ClockState::System(_) => thread::sleep(entry.deadline - now),
                ClockState::Virtual(clock) => clock.set(entry.deadline),
            }
        }
        trace!("timer #{} fired", entry.seq);
        Some(entry.task)
    }

    fn fault(&self, payload: Box<dyn Any + Send>) {
        apply_fault_policy(self.fault_policy, payload)
    }
}

fn describe(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}

fn apply_fault_policy(policy: FaultPolicy, payload: Box<dyn Any + Send>) {
    match policy {
        FaultPolicy::Swallow => warn!("swallowed callback fault: {}", describe(&*payload)),
        FaultPolicy::Resume => panic::resume_unwind(payload),
    }
}

/// Runs `f`, handing any panic to the current runtime's [`FaultPolicy`].
/// `None` means `f` faulted and the fault was swallowed.
pub(crate) fn guard<R>(f: impl FnOnce() -> R) -> Option<R> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(out) => Some(out),
        Err(payload) => {
            match context::current() {
                Some(shared) => shared.fault(payload),
                None => apply_fault_policy(FaultPolicy::default(), payload),
            }
            None
        }
    }
}

/// Owns an event loop. Deferred values can only be created with a producer
/// while one is running: inside [`run`](Self::run) or
/// [`block_on`](Self::block_on).
///
/// ```
/// use linked_promise::{Continuation, Deferred, Runtime};
///
/// let runtime = Runtime::new();
/// let answer = runtime.block_on(|| {
///     Deferred::<i32, String>::resolve(20).then(|v| Continuation::Fulfill(v + 22))
/// });
/// assert_eq!(answer, Ok(42));
/// ```
pub struct Runtime {
    shared: Rc<Shared>,
}

impl Runtime {
    pub fn new() -> Self {
        RuntimeBuilder::new().build()
    }

    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    pub(crate) fn with_config(clock: Clock, fault_policy: FaultPolicy) -> Self {
        let clock = match clock {
            Clock::System => ClockState::System(Instant::now()),
            Clock::Virtual => ClockState::Virtual(Cell::new(Duration::ZERO)),
        };
        Self {
            shared: Rc::new(Shared {
                tasks: RefCell::new(Queue::new()),
                timers: RefCell::new(BinaryHeap::new()),
                next_seq: Cell::new(0),
                clock,
                fault_policy,
            }),
        }
    }

    /// Time elapsed on this runtime's clock since it was built.
    pub fn elapsed(&self) -> Duration {
        self.shared.now()
    }

    /// Runs `f` as the synchronous phase, then keeps turning the loop until
    /// no task or timer is left.
    pub fn run<R>(&self, f: impl FnOnce() -> R) -> R {
        context::enter(self.shared.clone(), || {
            let out = f();
            while self.turn() {}
            out
        })
    }

    /// Builds a deferred value with `f` and turns the loop until it settles.
    ///
    /// Work left in the loop after the settlement is not run; a later `run`
    /// or `block_on` picks it up.
    pub fn block_on<T, E, F>(&self, f: F) -> Result<T, Error<E>>
    where
        T: Clone + 'static,
        E: Clone + 'static,
        F: FnOnce() -> Deferred<T, E>,
    {
        context::enter(self.shared.clone(), || {
            let deferred = f();
            loop {
                if let Some(settlement) = deferred.settlement() {
                    return settlement.into_result().map_err(Error::Rejected);
                }
                if !self.turn() {
                    debug!("event loop went idle with a pending deferred value");
                    return Err(Error::Stalled);
                }
            }
        })
    }

    /// Runs one task, or else one due timer. `false` when idle.
    fn turn(&self) -> bool {
        let task = match self.shared.next_task() {
            Some(task) => task,
            None => match self.shared.next_timer() {
                Some(task) => task,
                None => return false,
            },
        };
        guard(task);
        true
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

/// Queues `callback` to run on a later turn of the current event loop, after
/// everything queued before it.
///
/// # Panics
///
/// Panics if called outside a running [`Runtime`]. See [`try_schedule`].
pub fn schedule(callback: impl FnOnce() + 'static) {
    if let Err(err) = try_schedule(callback) {
        panic!("{err}");
    }
}

pub fn try_schedule(callback: impl FnOnce() + 'static) -> Result<(), NoRuntime> {
    let shared = context::current().ok_or(NoRuntime)?;
    shared.push_task(Box::new(callback));
    Ok(())
}

/// Queues `callback` to run once `delay` has passed on the current event
/// loop's clock.
///
/// # Panics
///
/// Panics if called outside a running [`Runtime`]. See
/// [`try_schedule_after`].
pub fn schedule_after(delay: Duration, callback: impl FnOnce() + 'static) {
    if let Err(err) = try_schedule_after(delay, callback) {
        panic!("{err}");
    }
}

pub fn try_schedule_after(
    delay: Duration,
    callback: impl FnOnce() + 'static,
) -> Result<(), NoRuntime> {
    let shared = context::current().ok_or(NoRuntime)?;
    shared.push_timer(delay, Box::new(callback));
    Ok(())
}
