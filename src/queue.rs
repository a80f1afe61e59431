//! FIFO queue on top of [`SinglyLinkedList`]: enqueue appends, dequeue
//! removes the head.
use crate::list::{self, SinglyLinkedList};
use std::fmt::{self, Debug};

pub struct Queue<T> {
    list: SinglyLinkedList<T>,
}

impl<T> Queue<T> {
    pub const fn new() -> Self {
        Self {
            list: SinglyLinkedList::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// The element that the next `dequeue` would return.
    pub fn peek(&self) -> Option<&T> {
        self.list.head()
    }

    pub fn enqueue(&mut self, value: T) {
        self.list.append(value);
    }

    /// `None` when empty.
    pub fn dequeue(&mut self) -> Option<T> {
        self.list.remove_head()
    }

    /// Removes every element, handing each one to `visit` in FIFO order.
    ///
    /// Only the elements present when the drain starts are visited; the queue
    /// is empty afterwards.
    pub fn drain<F: FnMut(T)>(&mut self, mut visit: F) {
        let mut remaining = self.len();
        while remaining > 0 {
            match self.dequeue() {
                Some(value) => visit(value),
                None => break,
            }
            remaining -= 1;
        }
    }

    /// Dequeues and drops everything.
    pub fn clear(&mut self) {
        while self.dequeue().is_some() {}
    }

    pub fn iter(&self) -> list::Iter<'_, T> {
        self.list.iter()
    }
}

impl<T> Default for Queue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Debug> Debug for Queue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Queue")
            .field("len", &self.len())
            .field("items", &self.list)
            .finish()
    }
}

impl<T> Extend<T> for Queue<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.list.extend(iter);
    }
}

impl<T> FromIterator<T> for Queue<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            list: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
use super::Queue;

#[test]
fn test_drain_visits_in_order_and_empties() {
    let mut queue = Queue::new();
    queue.enqueue(1);
    queue.enqueue(2);
    queue.enqueue(3);

    let mut visited = vec![];
    queue.drain(|v| visited.push(v));

    assert_eq!(visited, vec![1, 2, 3]);
    assert!(queue.is_empty());
    assert_eq!(queue.len(), 0);
}

#[test]
fn test_peek_does_not_remove() {
    let mut queue: Queue<&str> = vec!["a", "b"].into_iter().collect();
    assert_eq!(queue.peek(), Some(&"a"));
    assert_eq!(queue.len(), 2);
    assert_eq!(queue.dequeue(), Some("a"));
    assert_eq!(queue.peek(), Some(&"b"));
}

#[test]
fn test_dequeue_empty_is_none() {
    let mut queue: Queue<i32> = Queue::default();
    assert!(queue.is_empty());
    assert_eq!(queue.peek(), None);
    assert_eq!(queue.dequeue(), None);
}

#[test]
fn test_interleaved_enqueue_dequeue_keeps_fifo() {
    let mut queue = Queue::new();
    queue.enqueue(1);
    queue.enqueue(2);
    assert_eq!(queue.dequeue(), Some(1));
    queue.enqueue(3);
    assert_eq!(queue.iter().copied().collect::<Vec<_>>(), vec![2, 3]);
}

#[test]
fn test_clear() {
    let mut queue: Queue<String> = (0..5).map(|i| i.to_string()).collect();
    queue.clear();
    assert!(queue.is_empty());
    queue.enqueue("again".into());
    assert_eq!(queue.dequeue().as_deref(), Some("again"));
}
}
