//! Reference-counted readiness tracking for asynchronous setup work.
//!
//! A [`LoadingGate`] counts outstanding loads. Consumers register one-shot
//! callbacks with [`LoadingGate::on_end`]; they run when the count next
//! drops to zero. Registering on an idle gate waits for a *future*
//! completion rather than firing immediately.
//!
//! Gates are single-thread handles (`Rc<RefCell<..>>`) so completion
//! callbacks can hold clones. No borrow is held while callbacks run, which
//! makes it safe for a callback to start, end or register on this gate or
//! any other gate.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, error};

type EndCallback = Box<dyn FnOnce()>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateFault {
    /// `end()` was called with nothing pending. The count stays at zero.
    Unbalanced { gate: String },
}

impl fmt::Display for GateFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateFault::Unbalanced { gate } => {
                write!(f, "loading gate '{gate}' ended more times than started")
            }
        }
    }
}

impl std::error::Error for GateFault {}

struct GateState {
    label: String,
    pending: usize,
    started: bool,
    faults: u64,
    callbacks: Vec<EndCallback>,
    parent: Option<LoadingGate>,
}

#[derive(Clone)]
pub struct LoadingGate {
    state: Rc<RefCell<GateState>>,
}

impl Default for LoadingGate {
    fn default() -> Self {
        Self::named("loading")
    }
}

impl fmt::Debug for LoadingGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.state.borrow();
        f.debug_struct("LoadingGate")
            .field("label", &s.label)
            .field("pending", &s.pending)
            .field("started", &s.started)
            .field("callbacks", &s.callbacks.len())
            .finish()
    }
}

impl LoadingGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(label: impl Into<String>) -> Self {
        Self {
            state: Rc::new(RefCell::new(GateState {
                label: label.into(),
                pending: 0,
                started: false,
                faults: 0,
                callbacks: Vec::new(),
                parent: None,
            })),
        }
    }

    /// Make this gate hold `parent` open while it is itself loading.
    ///
    /// The parent is started on this gate's 0→1 transition and ended on its
    /// 1→0 transition, after this gate's own callbacks have run. Linking a
    /// gate that is already loading starts the parent immediately.
    pub fn link_to(&self, parent: &LoadingGate) {
        let already_loading = {
            let mut s = self.state.borrow_mut();
            s.parent = Some(parent.clone());
            s.pending > 0
        };
        if already_loading {
            parent.start();
        }
    }

    pub fn label(&self) -> String {
        self.state.borrow().label.clone()
    }

    pub fn start(&self) {
        let parent = {
            let mut s = self.state.borrow_mut();
            s.pending += 1;
            s.started = true;
            debug!(gate = %s.label, pending = s.pending, "loading start");
            if s.pending == 1 { s.parent.clone() } else { None }
        };
        if let Some(parent) = parent {
            parent.start();
        }
    }

    /// Finish one pending load.
    ///
    /// On the transition to zero every registered callback runs once, in
    /// registration order, and the list is cleared. Callbacks registered
    /// while that dispatch is in progress wait for the next transition.
    pub fn end(&self) -> Result<(), GateFault> {
        let (callbacks, parent) = {
            let mut s = self.state.borrow_mut();
            if s.pending == 0 {
                s.faults += 1;
                error!(gate = %s.label, "loading gate ended without a matching start");
                return Err(GateFault::Unbalanced {
                    gate: s.label.clone(),
                });
            }
            s.pending -= 1;
            debug!(gate = %s.label, pending = s.pending, "loading end");
            if s.pending > 0 {
                return Ok(());
            }
            (std::mem::take(&mut s.callbacks), s.parent.clone())
        };

        for callback in callbacks {
            callback();
        }

        match parent {
            Some(parent) => parent.end(),
            None => Ok(()),
        }
    }

    pub fn on_end(&self, callback: impl FnOnce() + 'static) {
        self.state.borrow_mut().callbacks.push(Box::new(callback));
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().pending > 0
    }

    pub fn pending(&self) -> usize {
        self.state.borrow().pending
    }

    /// Whether `start()` has ever been called on this gate.
    pub fn has_started(&self) -> bool {
        self.state.borrow().started
    }

    /// Number of unbalanced `end()` calls seen so far.
    pub fn fault_count(&self) -> u64 {
        self.state.borrow().faults
    }
}
