// Copyright 2026 the Neuropil Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! External comparison against `rstar`'s 3D R-tree, behind `compare_rstar`.

use std::cell::Cell;
use std::rc::Rc;

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use glam::DVec3;
use neuropil_bvh::{Aabb, Dbvh, Element, Signal};
use rstar::RTree;
use rstar::primitives::Rectangle;

struct Block {
    bounds: Cell<Aabb>,
    changed: Signal,
}

impl Element for Block {
    fn bounds(&self) -> Aabb {
        self.bounds.get()
    }

    fn spacing(&self) -> DVec3 {
        DVec3::ZERO
    }

    fn bounds_changed(&self) -> &Signal {
        &self.changed
    }
}

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f64(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) / ((1u64 << 53) as f64)
    }
}

fn gen_random_boxes(count: usize, span: f64, extent: f64) -> Vec<Aabb> {
    let mut out = Vec::with_capacity(count);
    let mut rng = Rng(0xCAFE_F00D_DEAD_BEEF);
    for _ in 0..count {
        let min = DVec3::new(
            rng.next_f64() * span,
            rng.next_f64() * span,
            rng.next_f64() * span,
        );
        out.push(Aabb::new(min, min + DVec3::splat(extent)));
    }
    out
}

fn bench_build_and_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("rstar_compare");
    let boxes = gen_random_boxes(4096, 2000.0, 15.0);
    let region_min = [500.0, 500.0, 500.0];
    let region_max = [1100.0, 1100.0, 1100.0];
    group.throughput(Throughput::Elements(boxes.len() as u64));

    group.bench_function("bvh_build_then_region_query", |b| {
        b.iter_batched(
            || {
                boxes
                    .iter()
                    .map(|aabb| {
                        Rc::new(Block {
                            bounds: Cell::new(*aabb),
                            changed: Signal::new(),
                        })
                    })
                    .collect::<Vec<_>>()
            },
            |blocks| {
                let tree: Dbvh<Block> = Dbvh::from_elements(blocks.iter().cloned());
                let region = Aabb::new(
                    DVec3::from_array(region_min),
                    DVec3::from_array(region_max),
                );
                black_box(tree.intersects(&region, DVec3::ZERO).len());
            },
            BatchSize::SmallInput,
        )
    });

    group.bench_function("rstar_build_then_region_query", |b| {
        b.iter_batched(
            || {
                boxes
                    .iter()
                    .map(|aabb| {
                        Rectangle::from_corners(aabb.min.to_array(), aabb.max.to_array())
                    })
                    .collect::<Vec<_>>()
            },
            |rects| {
                let tree = RTree::bulk_load(rects);
                let envelope = rstar::AABB::from_corners(region_min, region_max);
                black_box(tree.locate_in_envelope_intersecting(&envelope).count());
            },
            BatchSize::SmallInput,
        )
    });

    group.finish();
}

criterion_group!(benches, bench_build_and_query);
criterion_main!(benches);
