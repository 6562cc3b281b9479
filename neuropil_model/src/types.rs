// Copyright 2026 the Neuropil Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the item store: identifiers, kinds, flags, and query
//! filters.

/// Identifier for an item in a [`Scene`](crate::Scene).
///
/// A small, copyable handle consisting of a slot index and a generation
/// counter. On removal the slot is freed; any `ItemId` that pointed there is
/// stale from then on. Reusing a freed slot bumps its generation, so a stale
/// id never aliases a different live item; check liveness with
/// [`Scene::is_alive`](crate::Scene::is_alive).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ItemId(pub(crate) u32, pub(crate) u32);

impl ItemId {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Item ids are intentionally 32-bit; higher bits are truncated by design."
    )]
    pub(crate) const fn new(idx: usize, generation: u32) -> Self {
        Self(idx as u32, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// What an item represents.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ItemKind {
    /// An acquired image stack. The first stack's spacing doubles as the
    /// scene's view spacing.
    Stack,
    /// A segmented structure extracted from a stack.
    Segmentation,
}

bitflags::bitflags! {
    /// Item state flags used to narrow query results.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ItemFlags: u8 {
        /// Item is shown in views.
        const VISIBLE = 0b0000_0001;
        /// Item accepts edits.
        const ENABLED = 0b0000_0010;
    }
}

impl Default for ItemFlags {
    fn default() -> Self {
        Self::VISIBLE | Self::ENABLED
    }
}

/// Filters applied to [`Scene`](crate::Scene) query results.
///
/// The locator itself matches purely on geometry; filtering happens on the
/// returned set.
#[derive(Clone, Copy, Debug, Default)]
pub struct QueryFilter {
    /// If true, only return items flagged [`ItemFlags::VISIBLE`].
    pub visible_only: bool,
    /// If set, only return items of this kind.
    pub kind: Option<ItemKind>,
}
