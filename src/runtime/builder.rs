use super::Runtime;

/// Where the event loop reads time from when firing timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Clock {
    /// Wall-clock time. The loop sleeps the thread until the next deadline.
    #[default]
    System,
    /// Time only moves when the loop is idle and a timer is waiting: it jumps
    /// straight to that timer's deadline. Ordering is the same as with
    /// `System`, there is just no sleeping.
    Virtual,
}

/// What happens when a producer, continuation or cleanup action panics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FaultPolicy {
    /// Catch the panic and log it. The deferred value that would have been
    /// settled by the faulting callback stays pending forever.
    #[default]
    Swallow,
    /// Let the panic unwind out of the event loop.
    Resume,
}

/// Builder for configuring and creating a [`Runtime`].
///
/// ```
/// use linked_promise::{Clock, FaultPolicy, RuntimeBuilder};
///
/// let runtime = RuntimeBuilder::new()
///     .clock(Clock::Virtual)
///     .fault_policy(FaultPolicy::Swallow)
///     .build();
/// assert_eq!(runtime.run(|| 1 + 1), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RuntimeBuilder {
    clock: Clock,
    fault_policy: FaultPolicy,
}

impl RuntimeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn fault_policy(mut self, policy: FaultPolicy) -> Self {
        self.fault_policy = policy;
        self
    }

    pub fn build(self) -> Runtime {
        Runtime::with_config(self.clock, self.fault_policy)
    }
}
