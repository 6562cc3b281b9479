// Copyright 2026 the Neuropil Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::cell::Cell;
use std::rc::Rc;

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use glam::DVec3;
use neuropil_bvh::{Aabb, Dbvh, Element, Signal};
use neuropil_model::{ItemKind, Scene};

struct Block {
    bounds: Cell<Aabb>,
    changed: Signal,
}

impl Block {
    fn new(aabb: Aabb) -> Rc<Self> {
        Rc::new(Self {
            bounds: Cell::new(aabb),
            changed: Signal::new(),
        })
    }

    fn relocate(&self, aabb: Aabb) {
        self.bounds.set(aabb);
        self.changed.emit();
    }
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
    fn new(seed: u64) -> Self {
        Self(seed)
    }
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

fn gen_grid_boxes(n: usize, cell: f64) -> Vec<Aabb> {
    let mut out = Vec::with_capacity(n * n * n);
    for z in 0..n {
        for y in 0..n {
            for x in 0..n {
                let min = DVec3::new(x as f64 * cell, y as f64 * cell, z as f64 * cell);
                out.push(Aabb::new(min, min + DVec3::splat(cell * 0.8)));
            }
        }
    }
    out
}

fn gen_random_boxes(count: usize, span: f64, extent: f64, seed: u64) -> Vec<Aabb> {
    let mut out = Vec::with_capacity(count);
    let mut rng = Rng::new(seed);
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

fn query_region(span: f64) -> Aabb {
    let lo = span * 0.25;
    let hi = span * 0.55;
    Aabb::new(DVec3::splat(lo), DVec3::splat(hi))
}

fn bench_linear_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("linear_scan");
    for &n in &[8usize, 12, 16] {
        let boxes = gen_grid_boxes(n, 10.0);
        let region = query_region(n as f64 * 10.0);
        group.throughput(Throughput::Elements((n * n * n) as u64));
        group.bench_function(format!("region_query_n{}", n * n * n), |b| {
            b.iter(|| {
                let hits = boxes
                    .iter()
                    .filter(|aabb| aabb.intersects(&region, DVec3::ZERO))
                    .count();
                black_box(hits);
            })
        });
    }
    group.finish();
}

fn bench_bvh_bulk(c: &mut Criterion) {
    let mut group = c.benchmark_group("bvh_bulk");
    for &n in &[8usize, 12, 16] {
        let boxes = gen_grid_boxes(n, 10.0);
        let region = query_region(n as f64 * 10.0);
        group.throughput(Throughput::Elements((n * n * n) as u64));
        group.bench_function(format!("build_then_query_n{}", n * n * n), |b| {
            b.iter_batched(
                || boxes.iter().copied().map(Block::new).collect::<Vec<_>>(),
                |blocks| {
                    let tree: Dbvh<Block> = Dbvh::from_elements(blocks.iter().cloned());
                    let hits = tree.intersects(&region, DVec3::ZERO).len();
                    black_box(hits);
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_bvh_query_heavy(c: &mut Criterion) {
    let mut group = c.benchmark_group("bvh_query_heavy");
    let boxes = gen_random_boxes(4096, 2000.0, 15.0, 0xCAFE_F00D_DEAD_BEEF);
    group.bench_function("build_then_many_point_queries", |b| {
        b.iter_batched(
            || {
                let blocks: Vec<Rc<Block>> = boxes.iter().copied().map(Block::new).collect();
                Dbvh::from_elements(blocks.iter().cloned())
            },
            |tree| {
                let mut rng = Rng::new(0xBADC_F00D_1234_5678);
                let mut total = 0usize;
                for _ in 0..256 {
                    let p = DVec3::new(
                        rng.next_f64() * 2000.0,
                        rng.next_f64() * 2000.0,
                        rng.next_f64() * 2000.0,
                    );
                    total += tree.contains(p, DVec3::ZERO).len();
                }
                black_box(total);
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn bench_bvh_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("bvh_churn");
    let boxes = gen_random_boxes(1024, 1000.0, 12.0, 0xC1A5_7E55_9999_ABCD);
    group.bench_function("remove_insert_cycles", |b| {
        b.iter_batched(
            || {
                let blocks: Vec<Rc<Block>> = boxes.iter().copied().map(Block::new).collect();
                let tree = Dbvh::from_elements(blocks.iter().cloned());
                (tree, blocks)
            },
            |(mut tree, blocks)| {
                for block in blocks.iter().step_by(7) {
                    let _ = tree.remove(block);
                    tree.insert(block.clone());
                }
                black_box(tree.len());
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn bench_bvh_refit(c: &mut Criterion) {
    let mut group = c.benchmark_group("bvh_refit");
    let boxes = gen_random_boxes(1024, 1000.0, 12.0, 0xFACE_FEED_CAFE_BABE);
    let region = query_region(1000.0);
    group.bench_function("relocate_then_query", |b| {
        b.iter_batched(
            || {
                let blocks: Vec<Rc<Block>> = boxes.iter().copied().map(Block::new).collect();
                let tree = Dbvh::from_elements(blocks.iter().cloned());
                (tree, blocks)
            },
            |(tree, blocks)| {
                let mut rng = Rng::new(0x7777_1111_3333_9999);
                for block in blocks.iter().step_by(11) {
                    let min = DVec3::new(
                        rng.next_f64() * 1000.0,
                        rng.next_f64() * 1000.0,
                        rng.next_f64() * 1000.0,
                    );
                    block.relocate(Aabb::new(min, min + DVec3::splat(12.0)));
                }
                let hits = tree.intersects(&region, DVec3::ZERO).len();
                black_box(hits);
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn bench_scene(c: &mut Criterion) {
    let mut group = c.benchmark_group("scene");
    let boxes = gen_random_boxes(2048, 1500.0, 18.0, 0x0BAD_5EED_0BAD_5EED);
    let region = query_region(1500.0);
    group.bench_function("add_all_then_region_queries", |b| {
        b.iter_batched(
            Scene::new,
            |mut scene| {
                scene.add(
                    ItemKind::Stack,
                    Aabb::new(DVec3::ZERO, DVec3::splat(1500.0)),
                    DVec3::ONE,
                );
                for aabb in &boxes {
                    scene.add(ItemKind::Segmentation, *aabb, DVec3::ONE);
                }
                let mut total = 0usize;
                for _ in 0..16 {
                    total += scene.items_in(&region).len();
                }
                black_box(total);
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_linear_scan,
    bench_bvh_bulk,
    bench_bvh_query_heavy,
    bench_bvh_churn,
    bench_bvh_refit,
    bench_scene,
);
criterion_main!(benches);
