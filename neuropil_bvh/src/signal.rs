// Copyright 2026 the Neuropil Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Synchronous change notification.
//!
//! [`Signal`] is the explicit observer seam between elements and the
//! hierarchy: whoever mutates an element's bounds calls [`Signal::emit`], and
//! every connected callback runs to completion on the calling thread before
//! `emit` returns. The hierarchy connects exactly one callback per leaf and
//! disconnects it when the leaf stops holding the element.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt::Debug;

/// Handle returned by [`Signal::connect`], used to disconnect later.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Subscription(u64);

/// A single-threaded, synchronous notification source.
pub struct Signal {
    inner: RefCell<Inner>,
}

#[derive(Default)]
struct Inner {
    next: u64,
    slots: Vec<(u64, Rc<dyn Fn()>)>,
}

impl Signal {
    /// Create a signal with no subscribers.
    pub fn new() -> Self {
        Self {
            inner: RefCell::new(Inner::default()),
        }
    }

    /// Register `callback` to run on every [`Signal::emit`]. Callbacks run in
    /// registration order.
    pub fn connect(&self, callback: impl Fn() + 'static) -> Subscription {
        let mut inner = self.inner.borrow_mut();
        inner.next += 1;
        let id = inner.next;
        inner.slots.push((id, Rc::new(callback)));
        Subscription(id)
    }

    /// Remove a previously connected callback. Disconnecting twice, or with a
    /// subscription from another signal, is a no-op.
    pub fn disconnect(&self, subscription: Subscription) {
        self.inner
            .borrow_mut()
            .slots
            .retain(|(id, _)| *id != subscription.0);
    }

    /// Invoke every connected callback, synchronously, in registration order.
    ///
    /// Callbacks may connect or disconnect subscribers on this signal; such
    /// changes take effect for positions not yet visited in this emission.
    pub fn emit(&self) {
        let mut i = 0;
        loop {
            let callback = {
                let inner = self.inner.borrow();
                inner.slots.get(i).map(|(_, cb)| Rc::clone(cb))
            };
            match callback {
                Some(cb) => {
                    cb();
                    i += 1;
                }
                None => break,
            }
        }
    }

    /// Number of connected callbacks.
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().slots.len()
    }
}

impl Default for Signal {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for Signal {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Signal")
            .field("subscribers", &self.subscriber_count())
            .finish_non_exhaustive()
    }
}
