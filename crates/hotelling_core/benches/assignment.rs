//! Assignment benchmarks for hotelling_core.
//!
//! Run with: `cargo bench -p hotelling_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hotelling_core::assignment::assign_all;
use hotelling_core::components::{PlayerId, Product};
use hotelling_core::math::Fixed;
use hotelling_core::registry::EntityRegistry;
use hotelling_test_utils::fixtures::{point, seeded_rng};

/// Benchmarks one assignment pass at a few product/customer scales.
pub fn assignment_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("assign_all");
    let size = Fixed::from_num(100);

    for (products, customers) in [(2u32, 50u32), (8, 200), (32, 1000)] {
        let mut registry = EntityRegistry::new();
        registry.generate_customers(customers, size, size, &mut seeded_rng(1));
        let mut placed: Vec<Product> = (0..products)
            .map(|i| Product::new(PlayerId(i), point((i * 37 % 100) as i32, (i * 59 % 100) as i32)))
            .collect();
        let mut batch = registry.customers().to_vec();

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{products}x{customers}")),
            &(),
            |b, _| b.iter(|| black_box(assign_all(&mut placed, &mut batch))),
        );
    }

    group.finish();
}

criterion_group!(benches, assignment_benchmark);
criterion_main!(benches);
