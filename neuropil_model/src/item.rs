// Copyright 2026 the Neuropil Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Concrete scene items.

use core::cell::Cell;
use core::fmt::Debug;

use glam::DVec3;
use neuropil_bvh::{Aabb, Element, Signal};

use crate::types::{ItemFlags, ItemKind};

/// A stack or segmentation held by a [`Scene`](crate::Scene).
///
/// Geometry is interior-mutable so shared handles stay usable while the item
/// is indexed; [`SceneItem::set_bounds`] stores the new box and emits the
/// bounds-changed signal in one step, which keeps any indexing locator
/// current without further calls.
pub struct SceneItem {
    kind: ItemKind,
    flags: Cell<ItemFlags>,
    bounds: Cell<Aabb>,
    spacing: Cell<DVec3>,
    changed: Signal,
}

impl SceneItem {
    /// Create an item with default flags.
    pub fn new(kind: ItemKind, bounds: Aabb, spacing: DVec3) -> Self {
        Self {
            kind,
            flags: Cell::new(ItemFlags::default()),
            bounds: Cell::new(bounds),
            spacing: Cell::new(spacing),
            changed: Signal::new(),
        }
    }

    /// What the item represents.
    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    /// Current state flags.
    pub fn flags(&self) -> ItemFlags {
        self.flags.get()
    }

    /// Replace the state flags. Flags do not affect geometry, so no
    /// notification is emitted.
    pub fn set_flags(&self, flags: ItemFlags) {
        self.flags.set(flags);
    }

    /// Store a new bounding box and notify subscribers.
    pub fn set_bounds(&self, bounds: Aabb) {
        self.bounds.set(bounds);
        self.changed.emit();
    }

    /// Replace the per-item spacing. Spacing only widens leaf-level query
    /// checks; the indexed box is unchanged, so nothing is emitted.
    pub fn set_spacing(&self, spacing: DVec3) {
        self.spacing.set(spacing);
    }
}

impl Element for SceneItem {
    fn bounds(&self) -> Aabb {
        self.bounds.get()
    }

    fn spacing(&self) -> DVec3 {
        self.spacing.get()
    }

    fn bounds_changed(&self) -> &Signal {
        &self.changed
    }
}

impl Debug for SceneItem {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SceneItem")
            .field("kind", &self.kind)
            .field("flags", &self.flags.get())
            .field("bounds", &self.bounds.get())
            .field("spacing", &self.spacing.get())
            .finish_non_exhaustive()
    }
}
