use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

/// An asynchronous load rejected by an external service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadFailure {
    /// What was being loaded (a path, a service name).
    pub target: String,
    pub reason: String,
}

impl LoadFailure {
    pub fn new(target: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for LoadFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to load {}: {}", self.target, self.reason)
    }
}

impl std::error::Error for LoadFailure {}

/// Completion callback handed to external loaders. Invoked exactly once,
/// on the tick thread.
pub type LoadCallback = Box<dyn FnOnce(Result<(), LoadFailure>)>;

/// Shared FIFO that async collaborators use to hand results back to the
/// tick thread.
///
/// Cloning yields another handle onto the same queue; external services keep
/// a clone inside their completion callbacks, and the owner drains it at a
/// point where it holds `&mut` access to its own state.
#[derive(Debug)]
pub struct CompletionQueue<T> {
    items: Rc<RefCell<VecDeque<T>>>,
}

impl<T> Clone for CompletionQueue<T> {
    fn clone(&self) -> Self {
        Self {
            items: Rc::clone(&self.items),
        }
    }
}

impl<T> Default for CompletionQueue<T> {
    fn default() -> Self {
        Self {
            items: Rc::new(RefCell::new(VecDeque::new())),
        }
    }
}

impl<T> CompletionQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, item: T) {
        self.items.borrow_mut().push_back(item);
    }

    /// Pops one item. The borrow is released before returning, so handlers
    /// may push follow-up items while processing.
    pub fn pop(&self) -> Option<T> {
        self.items.borrow_mut().pop_front()
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }
}
