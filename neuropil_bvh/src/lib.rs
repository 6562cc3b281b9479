// Copyright 2026 the Neuropil Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Neuropil BVH: a dynamic bounding volume hierarchy for 3D image-stack data.
//!
//! Neuropil BVH answers "which items overlap this point or region" over a
//! changing set of elements, each carrying an axis-aligned bounding box in
//! nanometer space and a per-item spacing tolerance.
//!
//! - Bulk-build from an element list, or insert and remove incrementally.
//! - Elements announce bounds changes through a [`Signal`]; the affected
//!   branch refits automatically, propagating to the root.
//! - Refits that change a box run a local rotation pass (surface-area
//!   heuristic) so incremental edits do not slowly ruin query performance.
//! - Point containment and region intersection queries with per-query and
//!   per-element spacing tolerances.
//!
//! The crate is `no_std` + `alloc` and single-threaded by design: the tree is
//! built for an event-driven host that serializes all mutation on one thread.
//!
//! # Element contract
//!
//! The tree never owns elements. The host must emit the element's
//! [`Element::bounds_changed`] signal after mutating its bounds, and must
//! remove an element from the tree before dropping the last handle to it.
//! See [`Element`] for the full contract.
//!
//! # Example
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! use glam::DVec3;
//! use neuropil_bvh::{Aabb, Dbvh, Element, Signal};
//!
//! struct Region {
//!     bounds: Cell<Aabb>,
//!     changed: Signal,
//! }
//!
//! impl Element for Region {
//!     fn bounds(&self) -> Aabb {
//!         self.bounds.get()
//!     }
//!     fn spacing(&self) -> DVec3 {
//!         DVec3::ZERO
//!     }
//!     fn bounds_changed(&self) -> &Signal {
//!         &self.changed
//!     }
//! }
//!
//! let region = |min: DVec3, max: DVec3| {
//!     Rc::new(Region {
//!         bounds: Cell::new(Aabb::new(min, max)),
//!         changed: Signal::new(),
//!     })
//! };
//!
//! let a = region(DVec3::ZERO, DVec3::ONE);
//! let b = region(DVec3::new(2.0, 0.0, 0.0), DVec3::new(3.0, 1.0, 1.0));
//!
//! let mut tree: Dbvh<Region> = Dbvh::new();
//! tree.insert(a.clone());
//! tree.insert(b.clone());
//!
//! let hits = tree.contains(DVec3::splat(0.5), DVec3::ZERO);
//! assert_eq!(hits.len(), 1);
//! assert!(Rc::ptr_eq(&hits[0], &a));
//!
//! // Moving an element through its setter refits the tree on the spot.
//! a.bounds.set(Aabb::new(DVec3::splat(10.0), DVec3::splat(11.0)));
//! a.changed.emit();
//! assert!(tree.contains(DVec3::splat(0.5), DVec3::ZERO).is_empty());
//! assert_eq!(tree.contains(DVec3::splat(10.5), DVec3::ZERO).len(), 1);
//! ```

#![no_std]

extern crate alloc;

pub mod bounds;
pub mod element;
pub mod signal;
pub mod tree;

pub use bounds::{Aabb, Axis, DEFAULT_SPACING};
pub use element::{Element, ElementRef};
pub use signal::{Signal, Subscription};
pub use tree::Dbvh;
