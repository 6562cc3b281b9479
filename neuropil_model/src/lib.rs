// Copyright 2026 the Neuropil Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Neuropil Model: an item store wired to the Neuropil BVH locator.
//!
//! This crate is the host-side companion to [`neuropil_bvh`]: it owns the
//! actual items (image stacks and the segmentations extracted from them),
//! hands out generational [`ItemId`] handles, and keeps a spatial locator
//! synchronized with every geometry edit.
//!
//! - [`SceneItem`]: bounds, per-item spacing, kind, and state flags, with a
//!   change signal emitted on bounds edits.
//! - [`Scene`]: slot storage, add/remove, locator queries by point or
//!   region using the first stack's spacing as the view spacing, and
//!   [`QueryFilter`] narrowing by kind and visibility.
//!
//! The remove-before-destroy rule of the locator is enforced structurally:
//! [`Scene::remove`] always removes the item from the locator before
//! dropping the stored handle.
//!
//! # Example
//!
//! ```
//! use glam::DVec3;
//! use neuropil_bvh::Aabb;
//! use neuropil_model::{ItemKind, QueryFilter, Scene};
//!
//! let mut scene = Scene::new();
//! let _stack = scene.add(
//!     ItemKind::Stack,
//!     Aabb::new(DVec3::ZERO, DVec3::splat(100.0)),
//!     DVec3::splat(2.0),
//! );
//! let soma = scene.add(
//!     ItemKind::Segmentation,
//!     Aabb::new(DVec3::splat(10.0), DVec3::splat(20.0)),
//!     DVec3::splat(2.0),
//! );
//!
//! let segs = scene.items_at_filtered(
//!     DVec3::splat(15.0),
//!     QueryFilter {
//!         kind: Some(ItemKind::Segmentation),
//!         ..QueryFilter::default()
//!     },
//! );
//! assert_eq!(segs.len(), 1);
//! assert_eq!(scene.id_of(&segs[0]), Some(soma));
//! ```

#![no_std]

extern crate alloc;

pub mod item;
pub mod scene;
pub mod types;

pub use item::SceneItem;
pub use scene::Scene;
pub use types::{ItemFlags, ItemId, ItemKind, QueryFilter};
