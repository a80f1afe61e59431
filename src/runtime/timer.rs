use super::Task;

use std::cmp::Ordering;
use std::time::Duration;

/// A callback waiting in the timer heap.
pub(crate) struct TimerEntry {
    /// Offset from the runtime's start at which the callback becomes due.
    pub(crate) deadline: Duration,
    /// Registration order, breaks ties between equal deadlines.
    pub(crate) seq: u64,
    pub(crate) task: Task,
}

impl Eq for TimerEntry {}

impl PartialEq for TimerEntry {
    fn eq(&self, other: &Self) -> bool {
        self.deadline == other.deadline && self.seq == other.seq
    }
}

impl Ord for TimerEntry {
    /// Reversed so that `BinaryHeap<TimerEntry>` pops the earliest deadline,
    /// and among equal deadlines the earliest registration, first.
    fn cmp(&self, other: &Self) -> Ordering {
        (other.deadline, other.seq).cmp(&(self.deadline, self.seq))
    }
}

impl PartialOrd for TimerEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
