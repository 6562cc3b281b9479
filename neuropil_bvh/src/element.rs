// Copyright 2026 the Neuropil Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The contract indexed elements must satisfy.

use alloc::rc::Rc;

use glam::DVec3;

use crate::bounds::Aabb;
use crate::signal::Signal;

/// An item the hierarchy can index.
///
/// Elements are owned by the host; the hierarchy only ever holds shared
/// handles to them and never decides their lifetime. Two rules bind the host:
///
/// - Whichever code path mutates an element's bounds must call
///   [`Signal::emit`] on [`Element::bounds_changed`] afterwards, on the same
///   thread, so the hierarchy can refit the affected branch.
/// - An element must be removed from every hierarchy indexing it before the
///   host drops its last handle. The hierarchy does not track element
///   lifetime at runtime.
pub trait Element {
    /// The element's current bounding box.
    fn bounds(&self) -> Aabb;

    /// Per-element tolerance vector, applied at leaf-level query checks.
    fn spacing(&self) -> DVec3;

    /// Notification emitted after the element's bounds have been mutated.
    fn bounds_changed(&self) -> &Signal;
}

/// Shared handle to a type-erased element.
pub type ElementRef = Rc<dyn Element>;
