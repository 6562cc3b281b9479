// Copyright 2026 the Neuropil Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The item store and its locator queries.

use alloc::rc::Rc;
use alloc::vec::Vec;

use glam::DVec3;
use neuropil_bvh::{Aabb, DEFAULT_SPACING, Dbvh, Element};

use crate::item::SceneItem;
use crate::types::{ItemFlags, ItemId, ItemKind, QueryFilter};

/// Owns stacks and segmentations and keeps a spatial locator over them.
///
/// Items live in generational slots; the returned [`ItemId`]s stay cheap to
/// copy and go stale (never dangle) on removal. Every item is indexed in a
/// [`Dbvh`] the moment it is added, and bounds edits made through
/// [`Scene::set_bounds`] (or directly via [`SceneItem::set_bounds`]) refit
/// the locator through the item's change signal.
pub struct Scene {
    items: Vec<Option<Rc<SceneItem>>>,
    /// Last generation per slot; persists across frees so stale ids cannot
    /// alias reused slots.
    generations: Vec<u32>,
    free_list: Vec<usize>,
    locator: Dbvh<SceneItem>,
}

impl Scene {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            locator: Dbvh::new(),
        }
    }

    /// Add an item and index it. Returns its handle.
    pub fn add(&mut self, kind: ItemKind, bounds: Aabb, spacing: DVec3) -> ItemId {
        let item = Rc::new(SceneItem::new(kind, bounds, spacing));
        let idx = if let Some(idx) = self.free_list.pop() {
            self.generations[idx] = self.generations[idx].saturating_add(1);
            self.items[idx] = Some(Rc::clone(&item));
            idx
        } else {
            self.items.push(Some(Rc::clone(&item)));
            self.generations.push(1);
            self.items.len() - 1
        };
        self.locator.insert(item);
        ItemId::new(idx, self.generations[idx])
    }

    /// Remove an item. The item leaves the locator before the scene drops
    /// its handle. Returns `false` for stale ids.
    pub fn remove(&mut self, id: ItemId) -> bool {
        if !self.is_alive(id) {
            return false;
        }
        let idx = id.idx();
        if let Some(item) = self.items[idx].take() {
            let _ = self.locator.remove(&item);
            self.free_list.push(idx);
            return true;
        }
        false
    }

    /// Whether `id` still refers to a live item.
    pub fn is_alive(&self, id: ItemId) -> bool {
        self.items
            .get(id.idx())
            .is_some_and(|slot| slot.is_some() && self.generations[id.idx()] == id.1)
    }

    /// Shared handle to a live item.
    pub fn item(&self, id: ItemId) -> Option<&Rc<SceneItem>> {
        if !self.is_alive(id) {
            return None;
        }
        self.items[id.idx()].as_ref()
    }

    /// Handle of a held item, by identity.
    pub fn id_of(&self, item: &Rc<SceneItem>) -> Option<ItemId> {
        self.items.iter().enumerate().find_map(|(idx, slot)| {
            slot.as_ref()
                .filter(|held| Rc::ptr_eq(held, item))
                .map(|_| ItemId::new(idx, self.generations[idx]))
        })
    }

    /// Number of live items.
    pub fn len(&self) -> usize {
        self.items.iter().filter(|slot| slot.is_some()).count()
    }

    /// Whether the scene holds no items.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Replace an item's bounding box; the locator refits synchronously.
    pub fn set_bounds(&mut self, id: ItemId, bounds: Aabb) -> bool {
        match self.item(id) {
            Some(item) => {
                item.set_bounds(bounds);
                true
            }
            None => false,
        }
    }

    /// Replace an item's spacing tolerance.
    pub fn set_spacing(&mut self, id: ItemId, spacing: DVec3) -> bool {
        match self.item(id) {
            Some(item) => {
                item.set_spacing(spacing);
                true
            }
            None => false,
        }
    }

    /// Replace an item's flags.
    pub fn set_flags(&mut self, id: ItemId, flags: ItemFlags) -> bool {
        match self.item(id) {
            Some(item) => {
                item.set_flags(flags);
                true
            }
            None => false,
        }
    }

    /// The view spacing: the first live stack's spacing, or one nanometer
    /// per axis when no stack is loaded.
    pub fn view_spacing(&self) -> DVec3 {
        self.items
            .iter()
            .flatten()
            .find(|item| item.kind() == ItemKind::Stack)
            .map(|item| item.spacing())
            .unwrap_or(DEFAULT_SPACING)
    }

    /// Items whose bounds contain `point`, under the view spacing.
    pub fn items_at(&self, point: DVec3) -> Vec<Rc<SceneItem>> {
        self.locator.contains(point, self.view_spacing())
    }

    /// [`Scene::items_at`] narrowed by `filter`.
    pub fn items_at_filtered(&self, point: DVec3, filter: QueryFilter) -> Vec<Rc<SceneItem>> {
        let mut hits = self.items_at(point);
        hits.retain(|item| matches(item, filter));
        hits
    }

    /// Items whose bounds intersect `bounds`, under the view spacing.
    pub fn items_in(&self, bounds: &Aabb) -> Vec<Rc<SceneItem>> {
        self.locator.intersects(bounds, self.view_spacing())
    }

    /// [`Scene::items_in`] narrowed by `filter`.
    pub fn items_in_filtered(&self, bounds: &Aabb, filter: QueryFilter) -> Vec<Rc<SceneItem>> {
        let mut hits = self.items_in(bounds);
        hits.retain(|item| matches(item, filter));
        hits
    }

    /// Rebuild the locator from scratch over the current items. Query
    /// results are unchanged; useful after heavy churn.
    pub fn rebuild_locator(&mut self) {
        self.locator.rebuild();
    }

    /// Drop every item and reset the locator.
    pub fn clear(&mut self) {
        self.locator.clear();
        self.items.clear();
        self.generations.clear();
        self.free_list.clear();
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for Scene {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.items.len();
        let alive = self.len();
        f.debug_struct("Scene")
            .field("slots_total", &total)
            .field("alive", &alive)
            .field("free_list", &self.free_list.len())
            .field("locator", &self.locator)
            .finish_non_exhaustive()
    }
}

fn matches(item: &SceneItem, filter: QueryFilter) -> bool {
    if filter.visible_only && !item.flags().contains(ItemFlags::VISIBLE) {
        return false;
    }
    filter.kind.is_none_or(|kind| item.kind() == kind)
}
