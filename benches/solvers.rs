use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hsmodel::continuous::solve_continuous;
use hsmodel::discrete::solve_discrete;
use hsmodel::{ContinuousOptions, GridOptions, Parameters};

fn bench_solvers(c: &mut Criterion) {
    let params = Parameters::default();

    let mut group = c.benchmark_group("solve");
    group.sample_size(10);
    group.bench_function("discrete_sequential", |b| {
        let grid = GridOptions::default();
        b.iter(|| solve_discrete(black_box(&params), &grid).unwrap())
    });
    group.bench_function("discrete_parallel", |b| {
        let grid = GridOptions::default().with_parallel(true);
        b.iter(|| solve_discrete(black_box(&params), &grid).unwrap())
    });
    group.bench_function("continuous", |b| {
        let options = ContinuousOptions::default();
        b.iter(|| solve_continuous(black_box(&params), &options).unwrap())
    });
    group.finish();
}

criterion_group!(benches, bench_solvers);
criterion_main!(benches);
