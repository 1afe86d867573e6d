use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use dagplot_core::{Dependency, build, layout, parse_all};

/// (label, layers, nodes per layer)
const SHAPES: &[(&str, usize, usize)] = &[
    ("small", 8, 8),
    ("medium", 32, 32),
    ("large", 64, 128),
];

/// Layered DAG: every node links to two nodes of the next layer.
fn layered_lines(layers: usize, width: usize) -> Vec<String> {
    let mut lines = Vec::with_capacity(layers * width * 2);
    for layer in 0..layers.saturating_sub(1) {
        for i in 0..width {
            let from = format!("l{layer}_{i}");
            lines.push(format!("{from}>l{}_{}", layer + 1, i));
            lines.push(format!("{from}>l{}_{}", layer + 1, (i * 7 + 3) % width));
        }
    }
    lines
}

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("forest.layered");

    for &(label, layers, width) in SHAPES {
        let lines = layered_lines(layers, width);
        let deps: Vec<Dependency> = parse_all(&lines).expect("synthetic input parses");
        group.throughput(Throughput::Elements(deps.len() as u64));

        group.bench_with_input(BenchmarkId::new("parse", label), &lines, |b, lines| {
            b.iter(|| black_box(parse_all(lines)));
        });

        group.bench_with_input(BenchmarkId::new("build", label), &deps, |b, deps| {
            b.iter(|| {
                let mut deps = deps.clone();
                black_box(build(&mut deps))
            });
        });

        group.bench_with_input(BenchmarkId::new("build+layout", label), &deps, |b, deps| {
            b.iter(|| {
                let mut deps = deps.clone();
                let mut forest = build(&mut deps).expect("acyclic");
                layout(&mut forest).expect("acyclic");
                black_box(forest.extent())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
