// Copyright 2026 the Neuropil Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Refit on edit.
//!
//! Move a segmentation through the scene API and watch queries follow the
//! new position without any explicit locator maintenance.
//!
//! Run:
//! - `cargo run -p neuropil_demos --example refit_on_edit`

use glam::DVec3;
use neuropil_bvh::Aabb;
use neuropil_model::{ItemKind, QueryFilter, Scene};

fn main() {
    let mut scene = Scene::new();
    scene.add(
        ItemKind::Stack,
        Aabb::new(DVec3::ZERO, DVec3::splat(256.0)),
        DVec3::splat(2.0),
    );
    let segs_only = QueryFilter {
        kind: Some(ItemKind::Segmentation),
        ..QueryFilter::default()
    };

    let mut ids = Vec::new();
    for i in 0..6 {
        let min = DVec3::new(20.0 + 30.0 * i as f64, 40.0, 40.0);
        ids.push(scene.add(
            ItemKind::Segmentation,
            Aabb::new(min, min + DVec3::splat(12.0)),
            DVec3::splat(2.0),
        ));
    }
    let moving = ids[2];

    let old_spot = DVec3::new(86.0, 46.0, 46.0);
    let new_spot = DVec3::new(200.0, 210.0, 220.0);
    assert_eq!(scene.items_at_filtered(old_spot, segs_only).len(), 1);
    assert_eq!(scene.items_at_filtered(new_spot, segs_only).len(), 0);

    // A proofreading edit relocates the segmentation; the item's change
    // signal refits the locator on the spot.
    scene.set_bounds(
        moving,
        Aabb::new(
            new_spot - DVec3::splat(6.0),
            new_spot + DVec3::splat(6.0),
        ),
    );

    assert_eq!(scene.items_at_filtered(old_spot, segs_only).len(), 0);
    let hits = scene.items_at_filtered(new_spot, segs_only);
    assert_eq!(hits.len(), 1);
    assert_eq!(scene.id_of(&hits[0]), Some(moving));
    println!("segmentation {moving:?} found at its edited position {new_spot:?}");
    println!("scene after the edit: {scene:?}");
}
