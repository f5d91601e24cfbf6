use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use strata_core::{BlendStateKey, DepthStencilStateKey, RasterizerStateKey, DepthBias};
use strata_data::StateCache;

fn rasterizer_key(i: u32) -> RasterizerStateKey {
    RasterizerStateKey {
        depth_bias: DepthBias::new(i as i32, 0.0, 0.0),
        ..RasterizerStateKey::CULL_BACK
    }
}

fn bench_state_cache(c: &mut Criterion) {
    let mut group = c.benchmark_group("State Cache");

    let blend: StateCache<BlendStateKey, u64> = StateCache::new("blend");
    blend.get_or_create(&BlendStateKey::ALPHA_BLEND, |_| 1);

    group.bench_function("Hit", |b| {
        b.iter(|| black_box(blend.get_or_create(black_box(&BlendStateKey::ALPHA_BLEND), |_| 0)));
    });

    let depth: StateCache<DepthStencilStateKey, u64> = StateCache::new("depth/stencil");
    group.bench_function("Miss then hit", |b| {
        b.iter(|| {
            depth.invalidate();
            black_box(depth.get_or_create(&DepthStencilStateKey::DEPTH_READ_WRITE, |_| 1));
            black_box(depth.get_or_create(&DepthStencilStateKey::DEPTH_READ_WRITE, |_| 2));
        });
    });

    // 10,000 requests drawn from 100 distinct keys.
    let keys: Vec<_> = (0..10_000u32).map(|i| rasterizer_key(i % 100)).collect();
    group.bench_function("10k requests over 100 keys", |b| {
        b.iter(|| {
            let cache: StateCache<RasterizerStateKey, u64> = StateCache::new("rasterizer");
            let mut sum = 0;
            for key in &keys {
                sum += cache.get_or_create(key, |k| k.depth_bias.constant as u64);
            }
            black_box(sum);
        });
    });

    group.finish();
}

criterion_group!(benches, bench_state_cache);
criterion_main!(benches);
