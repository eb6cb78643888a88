use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use relay_web::router::{RoutePattern, extract_route_params, find_matching_route};
use std::hint::black_box;

fn route_table(size: usize) -> Vec<RoutePattern> {
    let mut patterns: Vec<RoutePattern> =
        (0..size).map(|i| RoutePattern::parse(format!("/comp4537/lab{i}/api/v1/query/:query"))).collect();
    patterns.push(RoutePattern::parse("/comp4537/lab5/api/v1/query"));
    patterns
}

fn benchmark_find_matching_route(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("find_matching_route");

    for size in [2, 16, 128] {
        let patterns = route_table(size);
        group.bench_with_input(BenchmarkId::new("last_registered", size), &patterns, |b, patterns| {
            b.iter(|| black_box(find_matching_route(black_box("/comp4537/lab5/api/v1/query?x=1"), patterns)));
        });
        group.bench_with_input(BenchmarkId::new("miss", size), &patterns, |b, patterns| {
            b.iter(|| black_box(find_matching_route(black_box("/comp4537/nope/api/v1/query/SELECT"), patterns)));
        });
    }

    group.finish();
}

fn benchmark_extract_route_params(criterion: &mut Criterion) {
    let pattern = RoutePattern::parse("/comp4537/lab5/api/v1/query/:query");
    criterion.bench_function("extract_route_params", |b| {
        b.iter(|| {
            black_box(extract_route_params(black_box("/comp4537/lab5/api/v1/query/SELECT%20*%20FROM%20patient"), &pattern))
        });
    });
}

criterion_group!(router, benchmark_find_matching_route, benchmark_extract_route_params);
criterion_main!(router);
