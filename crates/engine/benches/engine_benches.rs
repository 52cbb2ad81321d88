use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use parastream::ops::distinct::distinct;
use parastream::ops::matching;
use parastream::ops::reduce::sum;
use parastream::{Engine, EngineConfig, Execution, PipelineHelper, RangeCursor, Source, StageExt, StreamFlags};

fn bench_engine() -> Engine {
    Engine::new(EngineConfig::default()).expect("engine")
}

fn benchmark_sum(c: &mut Criterion) {
    let engine = bench_engine();
    let stages = Source::<i64>::new().filter(|x| x % 3 != 0).map(|x| x.wrapping_mul(31));
    let mut group = c.benchmark_group("sum");
    for size in [10_000_i64, 1_000_000] {
        for (label, execution) in [("sequential", Execution::Sequential), ("parallel", Execution::Parallel(&engine))] {
            let helper = PipelineHelper::new(&stages, StreamFlags::SIZED_ORDERED, execution);
            group.bench_with_input(BenchmarkId::new(label, size), &size, |b, &size| {
                b.iter(|| black_box(sum(&helper, RangeCursor::new(0, size)).expect("sum")));
            });
        }
    }
    group.finish();
}

fn benchmark_any_match(c: &mut Criterion) {
    let engine = bench_engine();
    let stages = Source::<i64>::new();
    let helper = PipelineHelper::new(&stages, StreamFlags::SIZED_ORDERED, Execution::Parallel(&engine));
    c.bench_function("match/any_early_hit", |b| {
        b.iter(|| {
            let hit = matching::any(&helper, RangeCursor::new(0, 10_000_000), |x| *x == black_box(4_242)).expect("any");
            black_box(hit)
        });
    });
    c.bench_function("match/all_full_scan", |b| {
        b.iter(|| black_box(matching::all(&helper, RangeCursor::new(0, 1_000_000), |x| *x >= 0).expect("all")));
    });
}

fn benchmark_distinct(c: &mut Criterion) {
    let engine = bench_engine();
    let stages = Source::<i64>::new().map(|x| x % 1_000);
    let mut group = c.benchmark_group("distinct");
    for (label, execution) in [("sequential", Execution::Sequential), ("parallel", Execution::Parallel(&engine))] {
        let helper = PipelineHelper::new(&stages, StreamFlags::SIZED_ORDERED, execution);
        group.bench_function(label, |b| {
            b.iter(|| black_box(distinct(&helper, RangeCursor::new(0, 200_000)).expect("distinct").len()));
        });
    }
    group.finish();
}

criterion_group!(benches, benchmark_sum, benchmark_any_match, benchmark_distinct);
criterion_main!(benches);
