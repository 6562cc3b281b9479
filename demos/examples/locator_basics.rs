// Copyright 2026 the Neuropil Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Locator basics.
//!
//! Load a stack, add a few segmentations, and run point and region queries.
//!
//! Run:
//! - `cargo run -p neuropil_demos --example locator_basics`

use glam::DVec3;
use neuropil_bvh::Aabb;
use neuropil_model::{ItemKind, QueryFilter, Scene};

fn main() {
    let mut scene = Scene::new();

    // One acquired stack; its spacing becomes the view spacing.
    let _stack = scene.add(
        ItemKind::Stack,
        Aabb::new(DVec3::ZERO, DVec3::new(512.0, 512.0, 128.0)),
        DVec3::new(2.0, 2.0, 8.0),
    );

    // Three segmented structures inside it.
    let soma = scene.add(
        ItemKind::Segmentation,
        Aabb::new(DVec3::new(100.0, 100.0, 40.0), DVec3::new(160.0, 150.0, 70.0)),
        DVec3::new(2.0, 2.0, 8.0),
    );
    let dendrite = scene.add(
        ItemKind::Segmentation,
        Aabb::new(DVec3::new(150.0, 140.0, 50.0), DVec3::new(400.0, 170.0, 60.0)),
        DVec3::new(2.0, 2.0, 8.0),
    );
    let bouton = scene.add(
        ItemKind::Segmentation,
        Aabb::new(DVec3::new(390.0, 150.0, 52.0), DVec3::new(410.0, 168.0, 58.0)),
        DVec3::new(2.0, 2.0, 8.0),
    );

    println!("scene: {scene:?}");
    println!("view spacing: {:?}", scene.view_spacing());

    // Everything under the cursor, stack included.
    let cursor = DVec3::new(155.0, 145.0, 55.0);
    let under_cursor = scene.items_at(cursor);
    println!("{} items under the cursor at {cursor:?}", under_cursor.len());

    // Only segmentations, for a picking UI.
    let segs_only = QueryFilter {
        kind: Some(ItemKind::Segmentation),
        ..QueryFilter::default()
    };
    let picked = scene.items_at_filtered(cursor, segs_only);
    let picked_ids: Vec<_> = picked.iter().filter_map(|i| scene.id_of(i)).collect();
    println!("picked segmentations: {picked_ids:?}");
    assert!(picked_ids.contains(&soma));
    assert!(picked_ids.contains(&dendrite));

    // Region query around the axon terminal.
    let region = Aabb::new(DVec3::new(380.0, 140.0, 45.0), DVec3::new(420.0, 180.0, 65.0));
    let in_region = scene.items_in_filtered(&region, segs_only);
    let region_ids: Vec<_> = in_region.iter().filter_map(|i| scene.id_of(i)).collect();
    println!("segmentations intersecting {region:?}: {region_ids:?}");
    assert!(region_ids.contains(&dendrite));
    assert!(region_ids.contains(&bouton));
    assert!(!region_ids.contains(&soma));
}
