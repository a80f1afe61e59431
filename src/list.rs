//! A singly-linked list whose nodes live in an index-addressed arena.
//!
//! Each node owns the index of its successor, and the list keeps the index
//! of the last node for O(1) appends. Removing from either end moves the
//! value out of its slot and hands it back to the caller; the slot goes on a
//! free list for the next insertion. Removing from an empty list is not an
//! error, it just yields `None`.
use std::fmt::{self, Debug};

struct Node<T> {
    value: T,
    next: Option<usize>,
}

/// `head` and `tail` are slot indices into `slots`.
///
/// `head.is_none() == tail.is_none() == (len == 0)` holds between calls, and
/// the node at `tail` never has a `next`.
pub struct SinglyLinkedList<T> {
    slots: Vec<Option<Node<T>>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl<T> SinglyLinkedList<T> {
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    fn node(&self, index: usize) -> Option<&Node<T>> {
        self.slots.get(index)?.as_ref()
    }

    fn node_mut(&mut self, index: usize) -> Option<&mut Node<T>> {
        self.slots.get_mut(index)?.as_mut()
    }

    fn insert(&mut self, node: Node<T>) -> usize {
        match self.free.pop() {
            Some(index) => {
                self.slots[index] = Some(node);
                index
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        }
    }

    fn release(&mut self, index: usize) -> Option<Node<T>> {
        let node = self.slots.get_mut(index)?.take()?;
        self.len -= 1;
        if self.len == 0 {
            // Nothing is linked any more, so every slot is free.
            self.slots.clear();
            self.free.clear();
        } else {
            self.free.push(index);
        }
        Some(node)
    }

    /// Pushes `value` after the current tail.
    pub fn append(&mut self, value: T) -> &mut Self {
        let index = self.insert(Node { value, next: None });
        match self.tail.and_then(|tail| self.node_mut(tail)) {
            Some(last) => last.next = Some(index),
            None => self.head = Some(index),
        }
        self.tail = Some(index);
        self.len += 1;
        self
    }

    /// Pushes `value` in front of the current head.
    pub fn prepend(&mut self, value: T) -> &mut Self {
        let next = self.head;
        let index = self.insert(Node { value, next });
        self.head = Some(index);
        if self.tail.is_none() {
            self.tail = Some(index);
        }
        self.len += 1;
        self
    }

    pub fn remove_head(&mut self) -> Option<T> {
        let index = self.head?;
        let node = self.release(index)?;
        self.head = node.next;
        if self.head.is_none() {
            self.tail = None;
        }
        Some(node.value)
    }

    /// Removes the last element. There is no back link, so this walks from
    /// the head to the predecessor of the tail: O(n).
    pub fn remove_tail(&mut self) -> Option<T> {
        if self.len <= 1 {
            return self.remove_head();
        }

        let mut pred = self.head?;
        for _ in 0..self.len - 2 {
            pred = self.node(pred)?.next?;
        }
        let last = self.node_mut(pred)?.next.take()?;
        self.tail = Some(pred);
        self.release(last).map(|node| node.value)
    }

    pub fn head(&self) -> Option<&T> {
        self.node(self.head?).map(|node| &node.value)
    }

    pub fn tail(&self) -> Option<&T> {
        self.node(self.tail?).map(|node| &node.value)
    }

    /// Calls `visit` once per element, head to tail.
    pub fn traverse<F: FnMut(&T)>(&self, mut visit: F) {
        let mut current = self.head;
        while let Some(node) = current.and_then(|index| self.node(index)) {
            visit(&node.value);
            current = node.next;
        }
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            next: self.head,
            remaining: self.len,
        }
    }
}

impl<T> Default for SinglyLinkedList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Debug> Debug for SinglyLinkedList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T> Extend<T> for SinglyLinkedList<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.append(value);
        }
    }
}

impl<T> FromIterator<T> for SinglyLinkedList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = Self::new();
        list.extend(iter);
        list
    }
}

pub struct Iter<'a, T> {
    list: &'a SinglyLinkedList<T>,
    next: Option<usize>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let list = self.list;
        let node = list.node(self.next?)?;
        self.next = node.next;
        self.remaining -= 1;
        Some(&node.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<'a, T> IntoIterator for &'a SinglyLinkedList<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct IntoIter<T>(SinglyLinkedList<T>);

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.0.remove_head()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.0.len(), Some(self.0.len()))
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> IntoIterator for SinglyLinkedList<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter(self)
    }
}
