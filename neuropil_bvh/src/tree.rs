// Copyright 2026 the Neuropil Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The dynamic bounding volume hierarchy.
//!
//! Nodes live in a slab; children are reached through slot indices and every
//! node keeps a slot reference to its parent for upward refit propagation.
//! A node is in exactly one of three states: a leaf holding one element, an
//! internal node with two children, or empty (the initial root state, and a
//! transient state while a removal is being repaired).
//!
//! Bulk construction median-splits on the longest axis of the combined box.
//! Incremental edits keep the tree queryable but degrade its quality over
//! time, so every refit that actually changes a box also evaluates a small
//! set of local rotations from "Fast, Effective BVH Updates for Animated
//! Scenes" (Kopta et al.) and applies the best one when it wins by a clear
//! margin.

use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::RefCell;
use core::cmp::Ordering;
use core::fmt;
use core::fmt::Debug;

use glam::DVec3;

use crate::bounds::{Aabb, Axis, DEFAULT_SPACING};
use crate::element::Element;
use crate::signal::Subscription;

/// Fraction of the current child-area sum a rotation must save before it is
/// applied. Keeps marginal rotations from thrashing the tree.
const ROTATION_GAIN: f64 = 0.3;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct NodeIdx(usize);

impl NodeIdx {
    const fn get(self) -> usize {
        self.0
    }
}

#[derive(Copy, Clone)]
enum Side {
    Left,
    Right,
}

/// Local rotations: the first four swap one child with a grandchild of the
/// opposite child, the last two swap grandchild pairs. `LRl` reads "swap the
/// left child with the right child's left grandchild", and so on.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Rotation {
    None,
    LRl,
    LRr,
    RLl,
    RLr,
    LlRr,
    LlRl,
}

impl Rotation {
    const CANDIDATES: [Self; 6] = [
        Self::LRl,
        Self::LRr,
        Self::RLl,
        Self::RLr,
        Self::LlRr,
        Self::LlRl,
    ];
}

enum Kind<E: ?Sized> {
    Empty,
    Leaf { element: Rc<E>, watch: Subscription },
    Internal { left: NodeIdx, right: NodeIdx },
}

struct Node<E: ?Sized> {
    parent: Option<NodeIdx>,
    /// Depth at construction time, kept for the tree dump. Rotations do not
    /// maintain it.
    depth: u32,
    size: usize,
    bounds: Aabb,
    kind: Kind<E>,
}

impl<E: ?Sized> Node<E> {
    fn is_leaf(&self) -> bool {
        matches!(self.kind, Kind::Leaf { .. })
    }

    fn children(&self) -> Option<(NodeIdx, NodeIdx)> {
        match self.kind {
            Kind::Internal { left, right } => Some((left, right)),
            _ => None,
        }
    }
}

struct Core<E: ?Sized> {
    nodes: Vec<Node<E>>,
    free: Vec<usize>,
    root: NodeIdx,
    /// Handle to our own cell, captured by leaf subscriptions so external
    /// bounds changes can refit the owning branch.
    self_ref: Weak<RefCell<Core<E>>>,
}

impl<E: Element + ?Sized + 'static> Core<E> {
    fn new(self_ref: Weak<RefCell<Self>>) -> Self {
        let root = Node {
            parent: None,
            depth: 0,
            size: 0,
            bounds: Aabb::INVALID,
            kind: Kind::Empty,
        };
        Self {
            nodes: alloc::vec![root],
            free: Vec::new(),
            root: NodeIdx(0),
            self_ref,
        }
    }

    fn alloc(&mut self, parent: NodeIdx, depth: u32) -> NodeIdx {
        let node = Node {
            parent: Some(parent),
            depth,
            size: 0,
            bounds: Aabb::INVALID,
            kind: Kind::Empty,
        };
        if let Some(i) = self.free.pop() {
            self.nodes[i] = node;
            NodeIdx(i)
        } else {
            self.nodes.push(node);
            NodeIdx(self.nodes.len() - 1)
        }
    }

    /// One callback per leaf; disconnected the moment the leaf stops holding
    /// the element.
    fn subscribe(&self, idx: NodeIdx, element: &Rc<E>) -> Subscription {
        let tree = self.self_ref.clone();
        element.bounds_changed().connect(move || {
            if let Some(core) = tree.upgrade() {
                core.borrow_mut().refit(idx, true);
            }
        })
    }

    fn make_leaf(&mut self, idx: NodeIdx, element: Rc<E>) {
        let bounds = element.bounds();
        let watch = self.subscribe(idx, &element);
        let node = &mut self.nodes[idx.get()];
        node.bounds = bounds;
        node.size = 1;
        node.kind = Kind::Leaf { element, watch };
    }

    /// Turn a leaf or empty node back into an empty one, dropping its
    /// subscription.
    fn release_leaf(&mut self, idx: NodeIdx) {
        let node = &mut self.nodes[idx.get()];
        let old = core::mem::replace(&mut node.kind, Kind::Empty);
        node.bounds = Aabb::INVALID;
        node.size = 0;
        if let Kind::Leaf { element, watch } = old {
            element.bounds_changed().disconnect(watch);
        }
    }

    /// Detach and free the whole subtree below `idx`, leaving `idx` empty.
    fn teardown(&mut self, idx: NodeIdx) {
        let node = &mut self.nodes[idx.get()];
        let old = core::mem::replace(&mut node.kind, Kind::Empty);
        node.bounds = Aabb::INVALID;
        node.size = 0;
        match old {
            Kind::Empty => {}
            Kind::Leaf { element, watch } => {
                element.bounds_changed().disconnect(watch);
            }
            Kind::Internal { left, right } => {
                self.free_subtree(left);
                self.free_subtree(right);
            }
        }
    }

    fn free_subtree(&mut self, idx: NodeIdx) {
        let old = core::mem::replace(&mut self.nodes[idx.get()].kind, Kind::Empty);
        match old {
            Kind::Empty => {}
            Kind::Leaf { element, watch } => {
                element.bounds_changed().disconnect(watch);
            }
            Kind::Internal { left, right } => {
                self.free_subtree(left);
                self.free_subtree(right);
            }
        }
        self.free.push(idx.get());
    }

    /// Bulk construction into an empty node: median split on the longest axis
    /// of the combined box, recursing on both halves.
    fn build_into(&mut self, idx: NodeIdx, mut elements: Vec<Rc<E>>) {
        let n = elements.len();
        match n {
            0 => {}
            1 => {
                if let Some(element) = elements.pop() {
                    self.make_leaf(idx, element);
                }
            }
            _ => {
                let mut bounds = Aabb::INVALID;
                for element in &elements {
                    bounds = bounds.union(&element.bounds());
                }
                let axis = bounds.longest_axis();
                elements.sort_by(|a, b| centroid_cmp(a, b, axis));
                let second = elements.split_off(n / 2);
                let depth = self.nodes[idx.get()].depth;
                let left = self.alloc(idx, depth + 1);
                self.build_into(left, elements);
                let right = self.alloc(idx, depth + 1);
                self.build_into(right, second);
                let node = &mut self.nodes[idx.get()];
                node.bounds = bounds;
                node.size = n;
                node.kind = Kind::Internal { left, right };
            }
        }
    }

    fn insert(&mut self, element: Rc<E>) {
        let root = self.root;
        self.insert_at(root, element);
    }

    fn insert_at(&mut self, idx: NodeIdx, element: Rc<E>) {
        let i = idx.get();
        let ebounds = element.bounds();
        self.nodes[i].size += 1;

        if let Some((left, right)) = self.nodes[i].children() {
            // Greedy descent: grow whichever child gets cheaper, ties left.
            let la = self.nodes[left.get()].bounds.union(&ebounds).surface_area();
            let ra = self
                .nodes[right.get()]
                .bounds
                .union(&ebounds)
                .surface_area();
            let child = if la <= ra { left } else { right };
            self.insert_at(child, element);
            let lb = self.nodes[left.get()].bounds;
            let rb = self.nodes[right.get()].bounds;
            self.nodes[i].bounds = lb.union(&rb);
            return;
        }

        if self.nodes[i].is_leaf() {
            // The leaf splits in two; the resident element keeps the side its
            // centroid ordering assigns it.
            let grown = self.nodes[i].bounds.union(&ebounds);
            let old = core::mem::replace(&mut self.nodes[i].kind, Kind::Empty);
            let Kind::Leaf {
                element: resident,
                watch,
            } = old
            else {
                return;
            };
            resident.bounds_changed().disconnect(watch);
            let axis = grown.longest_axis();
            let resident_first = centroid_cmp(&resident, &element, axis) != Ordering::Greater;
            let (first, second) = if resident_first {
                (resident, element)
            } else {
                (element, resident)
            };
            let depth = self.nodes[i].depth;
            let left = self.alloc(idx, depth + 1);
            self.make_leaf(left, first);
            let right = self.alloc(idx, depth + 1);
            self.make_leaf(right, second);
            let node = &mut self.nodes[i];
            node.bounds = grown;
            node.kind = Kind::Internal { left, right };
            return;
        }

        // Empty node: becomes the leaf itself.
        self.make_leaf(idx, element);
    }

    fn remove(&mut self, element: &Rc<E>) -> bool {
        let root = self.root;
        self.remove_at(root, element)
    }

    fn remove_at(&mut self, idx: NodeIdx, element: &Rc<E>) -> bool {
        let i = idx.get();
        if self.nodes[i].is_leaf() {
            let held = match &self.nodes[i].kind {
                Kind::Leaf { element: held, .. } => Rc::ptr_eq(held, element),
                _ => false,
            };
            if held {
                self.release_leaf(idx);
                return true;
            }
            return false;
        }

        let Some((left, right)) = self.nodes[i].children() else {
            return false;
        };
        let ebounds = element.bounds();
        for child in [left, right] {
            let child_bounds = self.nodes[child.get()].bounds;
            if child_bounds.contains(&ebounds, DEFAULT_SPACING) && self.remove_at(child, element) {
                self.nodes[i].size -= 1;
                if self.nodes[child.get()].size == 0 {
                    // A drained branch leaves a degenerate child behind;
                    // rebuilding this node from the survivors removes it.
                    self.rebuild_at(idx);
                } else {
                    self.refit(idx, false);
                }
                return true;
            }
        }
        false
    }

    fn rebuild_at(&mut self, idx: NodeIdx) {
        if self.nodes[idx.get()].is_leaf() {
            return;
        }
        let mut elements = Vec::new();
        self.collect(idx, &mut elements);
        self.teardown(idx);
        self.build_into(idx, elements);
    }

    fn collect(&self, idx: NodeIdx, out: &mut Vec<Rc<E>>) {
        match &self.nodes[idx.get()].kind {
            Kind::Empty => {}
            Kind::Leaf { element, .. } => out.push(Rc::clone(element)),
            Kind::Internal { left, right } => {
                let (l, r) = (*left, *right);
                self.collect(l, out);
                self.collect(r, out);
            }
        }
    }

    /// Recompute this node's box. A change triggers the local rotation pass,
    /// and with `propagate` the parent chain refits as well.
    fn refit(&mut self, idx: NodeIdx, propagate: bool) {
        let i = idx.get();
        let old = self.nodes[i].bounds;
        let new = match &self.nodes[i].kind {
            Kind::Empty => Aabb::INVALID,
            Kind::Leaf { element, .. } => element.bounds(),
            Kind::Internal { left, right } => self
                .nodes[left.get()]
                .bounds
                .union(&self.nodes[right.get()].bounds),
        };
        self.nodes[i].bounds = new;
        let changed = new != old;
        if old.is_valid() && changed {
            self.optimize(idx);
        }
        if propagate && changed {
            if let Some(parent) = self.nodes[i].parent {
                self.refit(parent, true);
            }
        }
    }

    fn optimize(&mut self, idx: NodeIdx) {
        let Some((left, right)) = self.nodes[idx.get()].children() else {
            return;
        };
        if self.nodes[left.get()].is_leaf() && self.nodes[right.get()].is_leaf() {
            return;
        }

        let current = self.nodes[left.get()].bounds.surface_area()
            + self.nodes[right.get()].bounds.surface_area();
        let mut best = Rotation::None;
        let mut best_cost = f64::MAX;
        for rotation in Rotation::CANDIDATES {
            let cost = self.evaluate(idx, rotation);
            if cost < best_cost {
                best = rotation;
                best_cost = cost;
            }
        }
        if best != Rotation::None && (current - best_cost) / current >= ROTATION_GAIN {
            self.rotate(idx, best);
        }

        if let Some((left, right)) = self.nodes[idx.get()].children() {
            self.optimize(left);
            self.optimize(right);
        }
    }

    /// Child-area sum this node would have after `rotation`, without mutating
    /// anything. Rotations that would need grandchildren of a leaf are
    /// ineligible.
    fn evaluate(&self, idx: NodeIdx, rotation: Rotation) -> f64 {
        let Some((left, right)) = self.nodes[idx.get()].children() else {
            return f64::MAX;
        };
        let bounds = |n: NodeIdx| self.nodes[n.get()].bounds;
        let area = |b: Aabb| b.surface_area();
        match rotation {
            Rotation::None => area(bounds(left)) + area(bounds(right)),
            Rotation::LRl => match self.nodes[right.get()].children() {
                Some((rl, rr)) => area(bounds(rl)) + area(bounds(left).union(&bounds(rr))),
                None => f64::MAX,
            },
            Rotation::LRr => match self.nodes[right.get()].children() {
                Some((rl, rr)) => area(bounds(rr)) + area(bounds(left).union(&bounds(rl))),
                None => f64::MAX,
            },
            Rotation::RLl => match self.nodes[left.get()].children() {
                Some((ll, lr)) => area(bounds(ll)) + area(bounds(right).union(&bounds(lr))),
                None => f64::MAX,
            },
            Rotation::RLr => match self.nodes[left.get()].children() {
                Some((ll, lr)) => area(bounds(lr)) + area(bounds(right).union(&bounds(ll))),
                None => f64::MAX,
            },
            Rotation::LlRr => {
                match (
                    self.nodes[left.get()].children(),
                    self.nodes[right.get()].children(),
                ) {
                    (Some((ll, lr)), Some((rl, rr))) => {
                        area(bounds(rr).union(&bounds(lr))) + area(bounds(rl).union(&bounds(ll)))
                    }
                    _ => f64::MAX,
                }
            }
            Rotation::LlRl => {
                match (
                    self.nodes[left.get()].children(),
                    self.nodes[right.get()].children(),
                ) {
                    (Some((ll, lr)), Some((rl, rr))) => {
                        area(bounds(rl).union(&bounds(lr))) + area(bounds(ll).union(&bounds(rr)))
                    }
                    _ => f64::MAX,
                }
            }
        }
    }

    fn set_child(&mut self, parent: NodeIdx, side: Side, child: NodeIdx) {
        if let Kind::Internal { left, right } = &mut self.nodes[parent.get()].kind {
            match side {
                Side::Left => *left = child,
                Side::Right => *right = child,
            }
        }
        self.nodes[child.get()].parent = Some(parent);
    }

    /// Apply a rotation: swap the subtree links, fix parent slots, recompute
    /// the affected sizes, and refit the structurally changed child(ren)
    /// without cascading upwards. The element set below `idx` is unchanged,
    /// so its own box needs no update here.
    fn rotate(&mut self, idx: NodeIdx, rotation: Rotation) {
        let Some((left, right)) = self.nodes[idx.get()].children() else {
            return;
        };
        match rotation {
            Rotation::None => {}
            Rotation::LRl => {
                let Some((rl, _)) = self.nodes[right.get()].children() else {
                    return;
                };
                self.set_child(idx, Side::Left, rl);
                self.set_child(right, Side::Left, left);
                self.update_sizes(idx);
                self.refit(right, false);
            }
            Rotation::LRr => {
                let Some((_, rr)) = self.nodes[right.get()].children() else {
                    return;
                };
                self.set_child(idx, Side::Left, rr);
                self.set_child(right, Side::Right, left);
                self.update_sizes(idx);
                self.refit(right, false);
            }
            Rotation::RLl => {
                let Some((ll, _)) = self.nodes[left.get()].children() else {
                    return;
                };
                self.set_child(idx, Side::Right, ll);
                self.set_child(left, Side::Left, right);
                self.update_sizes(idx);
                self.refit(left, false);
            }
            Rotation::RLr => {
                let Some((_, lr)) = self.nodes[left.get()].children() else {
                    return;
                };
                self.set_child(idx, Side::Right, lr);
                self.set_child(left, Side::Right, right);
                self.update_sizes(idx);
                self.refit(left, false);
            }
            Rotation::LlRr => {
                let (Some((ll, _)), Some((_, rr))) = (
                    self.nodes[left.get()].children(),
                    self.nodes[right.get()].children(),
                ) else {
                    return;
                };
                self.set_child(left, Side::Left, rr);
                self.set_child(right, Side::Right, ll);
                self.update_sizes(idx);
                self.refit(left, false);
                self.refit(right, false);
            }
            Rotation::LlRl => {
                let (Some((ll, _)), Some((rl, _))) = (
                    self.nodes[left.get()].children(),
                    self.nodes[right.get()].children(),
                ) else {
                    return;
                };
                self.set_child(left, Side::Left, rl);
                self.set_child(right, Side::Left, ll);
                self.update_sizes(idx);
                self.refit(left, false);
                self.refit(right, false);
            }
        }
    }

    fn update_sizes(&mut self, idx: NodeIdx) {
        let Some((left, right)) = self.nodes[idx.get()].children() else {
            return;
        };
        for child in [left, right] {
            if let Some((a, b)) = self.nodes[child.get()].children() {
                self.nodes[child.get()].size =
                    self.nodes[a.get()].size + self.nodes[b.get()].size;
            }
        }
        self.nodes[idx.get()].size =
            self.nodes[left.get()].size + self.nodes[right.get()].size;
    }

    fn contains(&self, idx: NodeIdx, point: DVec3, spacing: DVec3, out: &mut Vec<Rc<E>>) {
        let node = &self.nodes[idx.get()];
        if !node.bounds.contains_point(point, spacing) {
            return;
        }
        match &node.kind {
            Kind::Empty => {}
            Kind::Leaf { element, .. } => {
                if node.bounds.contains_point(point, element.spacing()) {
                    out.push(Rc::clone(element));
                }
            }
            Kind::Internal { left, right } => {
                let (l, r) = (*left, *right);
                self.contains(l, point, spacing, out);
                self.contains(r, point, spacing, out);
            }
        }
    }

    fn intersects(&self, idx: NodeIdx, bounds: &Aabb, spacing: DVec3, out: &mut Vec<Rc<E>>) {
        let node = &self.nodes[idx.get()];
        if !node.bounds.intersects(bounds, spacing) {
            return;
        }
        match &node.kind {
            Kind::Empty => {}
            Kind::Leaf { element, .. } => {
                if node.bounds.intersects(bounds, element.spacing()) {
                    out.push(Rc::clone(element));
                }
            }
            Kind::Internal { left, right } => {
                let (l, r) = (*left, *right);
                self.intersects(l, bounds, spacing, out);
                self.intersects(r, bounds, spacing, out);
            }
        }
    }

    fn write_node(&self, idx: NodeIdx, out: &mut dyn fmt::Write) -> fmt::Result {
        let node = &self.nodes[idx.get()];
        for _ in 0..node.depth {
            out.write_char(' ')?;
        }
        writeln!(
            out,
            "node{}{} depth {} size {} bounds {:?}",
            if node.parent.is_none() { " R" } else { "" },
            if node.is_leaf() { " L" } else { "" },
            node.depth,
            node.size,
            node.bounds,
        )?;
        if let Some((left, right)) = node.children() {
            self.write_node(left, out)?;
            self.write_node(right, out)?;
        }
        Ok(())
    }
}

fn centroid_cmp<E: Element + ?Sized>(a: &Rc<E>, b: &Rc<E>, axis: Axis) -> Ordering {
    let ca = a.bounds().center()[axis];
    let cb = b.bounds().center()[axis];
    ca.partial_cmp(&cb).unwrap_or(Ordering::Equal)
}

/// Dynamic bounding volume hierarchy over externally owned elements.
///
/// The tree indexes shared element handles; it never owns element lifetime.
/// See [`Element`] for the two contract rules the host must keep (emit after
/// mutating bounds, remove before dropping).
///
/// All operations are synchronous and single-threaded. Queries take `&self`
/// and mutate nothing; mutation requires `&mut self` and must not overlap
/// with queries from other code. There is no internal locking; the host's
/// event-driven model provides the serialization.
pub struct Dbvh<E: Element + ?Sized = dyn Element> {
    core: Rc<RefCell<Core<E>>>,
}

impl<E: Element + ?Sized + 'static> Dbvh<E> {
    /// Create an empty hierarchy.
    pub fn new() -> Self {
        let core = Rc::new_cyclic(|weak: &Weak<RefCell<Core<E>>>| {
            RefCell::new(Core::new(weak.clone()))
        });
        Self { core }
    }

    /// Bulk-build a hierarchy from `elements`.
    pub fn from_elements(elements: impl IntoIterator<Item = Rc<E>>) -> Self {
        let tree = Self::new();
        {
            let mut core = tree.core.borrow_mut();
            let root = core.root;
            core.build_into(root, elements.into_iter().collect());
        }
        tree
    }

    /// Insert one element.
    pub fn insert(&mut self, element: Rc<E>) {
        self.core.borrow_mut().insert(element);
    }

    /// Insert every element of `elements`.
    pub fn insert_all(&mut self, elements: impl IntoIterator<Item = Rc<E>>) {
        let mut core = self.core.borrow_mut();
        for element in elements {
            core.insert(element);
        }
    }

    /// Remove `element`, matching by handle identity. Returns `false` when
    /// the element is not indexed; during teardown that is an expected
    /// outcome, not an error.
    ///
    /// The descent is guided by the element's current bounds, so a bounds
    /// mutation must have been notified (see [`Element::bounds_changed`])
    /// before removal.
    pub fn remove(&mut self, element: &Rc<E>) -> bool {
        self.core.borrow_mut().remove(element)
    }

    /// Remove every element of `elements`, ignoring ones not indexed.
    pub fn remove_all(&mut self, elements: &[Rc<E>]) {
        let mut core = self.core.borrow_mut();
        for element in elements {
            let _ = core.remove(element);
        }
    }

    /// Drop every element from the hierarchy, disconnecting all leaf
    /// subscriptions.
    pub fn clear(&mut self) {
        let mut core = self.core.borrow_mut();
        let root = core.root;
        core.teardown(root);
    }

    /// Flatten and re-run bulk construction over the current element set.
    /// Element membership and query results are unchanged; only the internal
    /// shape is.
    pub fn rebuild(&mut self) {
        let mut core = self.core.borrow_mut();
        let root = core.root;
        core.rebuild_at(root);
    }

    /// Run the rotation pass over the whole tree.
    pub fn optimize(&mut self) {
        let mut core = self.core.borrow_mut();
        let root = core.root;
        core.optimize(root);
    }

    /// Number of indexed elements.
    pub fn len(&self) -> usize {
        let core = self.core.borrow();
        core.nodes[core.root.get()].size
    }

    /// Whether the hierarchy indexes no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bounding box of everything indexed; invalid when empty.
    pub fn bounds(&self) -> Aabb {
        let core = self.core.borrow();
        core.nodes[core.root.get()].bounds
    }

    /// Every indexed element, in left-to-right leaf order.
    pub fn elements(&self) -> Vec<Rc<E>> {
        let core = self.core.borrow();
        let mut out = Vec::new();
        core.collect(core.root, &mut out);
        out
    }

    /// Elements whose box contains `point`. The node walk prunes with the
    /// query `spacing`; each surviving leaf re-tests with its element's own
    /// spacing. Results follow left-to-right traversal order and carry no
    /// further ordering guarantee.
    pub fn contains(&self, point: DVec3, spacing: DVec3) -> Vec<Rc<E>> {
        let core = self.core.borrow();
        let mut out = Vec::new();
        core.contains(core.root, point, spacing, &mut out);
        out
    }

    /// Elements whose box intersects `bounds`, with the same spacing and
    /// ordering behavior as [`Dbvh::contains`].
    pub fn intersects(&self, bounds: &Aabb, spacing: DVec3) -> Vec<Rc<E>> {
        let core = self.core.borrow();
        let mut out = Vec::new();
        core.intersects(core.root, bounds, spacing, &mut out);
        out
    }

    /// Write an indented dump of the node structure, for diagnostics.
    pub fn write_tree(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        let core = self.core.borrow();
        core.write_node(core.root, out)
    }
}

impl<E: Element + ?Sized + 'static> Default for Dbvh<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Element + ?Sized> Debug for Dbvh<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let core = self.core.borrow();
        f.debug_struct("Dbvh")
            .field("len", &core.nodes[core.root.get()].size)
            .field("node_slots", &core.nodes.len())
            .field("free", &core.free.len())
            .finish_non_exhaustive()
    }
}

impl<E: Element + ?Sized> Drop for Dbvh<E> {
    fn drop(&mut self) {
        // Host elements outlive the tree; leave no dead subscriptions on
        // them.
        if let Ok(mut inner) = self.core.try_borrow_mut() {
            let root = inner.root;
            let mut stack = alloc::vec![root];
            while let Some(idx) = stack.pop() {
                let old = core::mem::replace(&mut inner.nodes[idx.get()].kind, Kind::Empty);
                match old {
                    Kind::Empty => {}
                    Kind::Leaf { element, watch } => {
                        element.bounds_changed().disconnect(watch);
                    }
                    Kind::Internal { left, right } => {
                        stack.push(left);
                        stack.push(right);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
impl<E: Element + ?Sized + 'static> Dbvh<E> {
    /// Walk the whole tree re-deriving every stored size and box.
    fn check_invariants(&self) {
        let core = self.core.borrow();
        core.check_node(core.root, None);
    }

    fn total_surface_area(&self) -> f64 {
        let core = self.core.borrow();
        core.subtree_area(core.root)
    }
}

#[cfg(test)]
impl<E: Element + ?Sized + 'static> Core<E> {
    fn check_node(&self, idx: NodeIdx, parent: Option<NodeIdx>) -> usize {
        let node = &self.nodes[idx.get()];
        assert_eq!(node.parent, parent, "parent back-reference mismatch");
        match &node.kind {
            Kind::Empty => {
                assert_eq!(node.size, 0, "empty node with nonzero size");
                assert!(!node.bounds.is_valid(), "empty node with valid bounds");
                0
            }
            Kind::Leaf { element, .. } => {
                assert_eq!(node.size, 1, "leaf size must be one");
                assert_eq!(node.bounds, element.bounds(), "stale leaf bounds");
                1
            }
            Kind::Internal { left, right } => {
                let (l, r) = (*left, *right);
                let count = self.check_node(l, Some(idx)) + self.check_node(r, Some(idx));
                assert_eq!(node.size, count, "internal size out of step with leaves");
                let union = self.nodes[l.get()].bounds.union(&self.nodes[r.get()].bounds);
                assert_eq!(node.bounds, union, "internal bounds not the child union");
                count
            }
        }
    }

    fn subtree_area(&self, idx: NodeIdx) -> f64 {
        let node = &self.nodes[idx.get()];
        let mut total = node.bounds.surface_area();
        if let Some((left, right)) = node.children() {
            total += self.subtree_area(left);
            total += self.subtree_area(right);
        }
        total
    }
}
