// Copyright 2026 the Neuropil Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Axis-aligned bounding boxes in nanometer space and the axis helpers the
//! hierarchy splits on.

use core::ops::{Index, IndexMut};

use glam::DVec3;

/// Spacing vector used when a caller has no view spacing at hand: one
/// nanometer of slack per axis.
pub const DEFAULT_SPACING: DVec3 = DVec3::ONE;

/// One of the three world axes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Axis {
    /// The X axis.
    X,
    /// The Y axis.
    Y,
    /// The Z axis.
    Z,
}

impl Axis {
    /// All three axes, in X, Y, Z order.
    pub fn all() -> impl Iterator<Item = Self> {
        [Self::X, Self::Y, Self::Z].into_iter()
    }
}

impl Index<Axis> for DVec3 {
    type Output = f64;

    fn index(&self, axis: Axis) -> &Self::Output {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
            Axis::Z => &self.z,
        }
    }
}

impl IndexMut<Axis> for DVec3 {
    fn index_mut(&mut self, axis: Axis) -> &mut Self::Output {
        match axis {
            Axis::X => &mut self.x,
            Axis::Y => &mut self.y,
            Axis::Z => &mut self.z,
        }
    }
}

/// Axis-aligned bounding box in 3D nanometer space.
///
/// A box is *valid* when `min[axis] <= max[axis]` on every axis. The inverted
/// box ([`Aabb::INVALID`], also the `Default`) is the explicit "no extent"
/// sentinel: it never matches a containment or intersection test, contributes
/// no surface area, and acts as the identity for [`Aabb::union`].
///
/// Coordinates are assumed to be finite; NaNs are out of contract.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb {
    /// Minimum corner.
    pub min: DVec3,
    /// Maximum corner.
    pub max: DVec3,
}

impl Aabb {
    /// The inverted sentinel box.
    pub const INVALID: Self = Self {
        min: DVec3::MAX,
        max: DVec3::MIN,
    };

    /// Create a box from its two corners.
    pub const fn new(min: DVec3, max: DVec3) -> Self {
        Self { min, max }
    }

    /// Create a box centered on `point` with zero extent.
    pub const fn from_point(point: DVec3) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    /// Whether `min <= max` holds on every axis.
    pub fn is_valid(&self) -> bool {
        self.min.cmple(self.max).all()
    }

    /// Centroid of the box. Meaningful only for valid boxes.
    pub fn center(&self) -> DVec3 {
        0.5 * (self.min + self.max)
    }

    /// Per-axis extents.
    pub fn extent(&self) -> DVec3 {
        self.max - self.min
    }

    /// Extent along a single axis.
    pub fn length(&self, axis: Axis) -> f64 {
        self.max[axis] - self.min[axis]
    }

    /// Smallest box covering both inputs. An invalid input acts as the
    /// identity; the union of two invalid boxes is invalid.
    pub fn union(&self, other: &Self) -> Self {
        if !self.is_valid() {
            return *other;
        }
        if !other.is_valid() {
            return *self;
        }
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Whether the two boxes overlap, with `tolerance` of slack per axis.
    /// Invalid boxes never intersect anything.
    pub fn intersects(&self, other: &Self, tolerance: DVec3) -> bool {
        self.is_valid()
            && other.is_valid()
            && (self.max + tolerance).cmpge(other.min).all()
            && (other.max + tolerance).cmpge(self.min).all()
    }

    /// Whether the box contains `point`, with `tolerance` of slack per axis.
    pub fn contains_point(&self, point: DVec3, tolerance: DVec3) -> bool {
        self.is_valid()
            && (self.min - tolerance).cmple(point).all()
            && point.cmple(self.max + tolerance).all()
    }

    /// Whether the box fully contains `other`, with `tolerance` of slack per
    /// axis.
    pub fn contains(&self, other: &Self, tolerance: DVec3) -> bool {
        self.is_valid()
            && other.is_valid()
            && (self.min - tolerance).cmple(other.min).all()
            && other.max.cmple(self.max + tolerance).all()
    }

    /// Total face area, `2 * (dx*dy + dy*dz + dz*dx)`, the cost proxy for the
    /// rotation heuristic. Zero for invalid boxes.
    pub fn surface_area(&self) -> f64 {
        if !self.is_valid() {
            return 0.0;
        }
        let e = self.extent();
        2.0 * (e.x * e.y + e.y * e.z + e.z * e.x)
    }

    /// Axis of greatest extent. Ties fall through the comparison chain: X only
    /// when strictly longest, then Y over Z. Invalid boxes report X.
    pub fn longest_axis(&self) -> Axis {
        if !self.is_valid() {
            return Axis::X;
        }
        let e = self.extent();
        if e.x > e.y && e.x > e.z {
            Axis::X
        } else if e.y > e.z {
            Axis::Y
        } else {
            Axis::Z
        }
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::INVALID
    }
}
