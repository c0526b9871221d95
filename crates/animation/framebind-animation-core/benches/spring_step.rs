//! Spring stepping throughput.
//!
//! Run: cargo bench -p framebind-animation-core --bench spring_step

use std::hint::black_box;
use std::time::Duration;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use framebind_animation_core::{SpringConfig, SpringModel};

fn configs() -> Vec<(&'static str, SpringConfig)> {
    vec![
        ("underdamped", SpringConfig::default()),
        (
            "overdamped",
            SpringConfig {
                damping: 40.0,
                ..SpringConfig::default()
            },
        ),
        (
            "clamped",
            SpringConfig {
                damping: 2.0,
                overshoot_clamping: true,
                ..SpringConfig::default()
            },
        ),
    ]
}

fn bench_spring_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("spring/step_60hz");
    for (name, cfg) in configs() {
        group.bench_with_input(BenchmarkId::from_parameter(name), &cfg, |b, cfg| {
            b.iter(|| {
                let mut model = SpringModel::new(cfg.clone());
                for i in 0..240u64 {
                    let s = model.step(Duration::from_micros(16_667 * i));
                    if s.finished {
                        break;
                    }
                }
                black_box(model.position())
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_spring_step);
criterion_main!(benches);
