//! Benchmarks for sandboxed checker evaluation.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use quizcheck_core::traits::CheckRequest;
use quizcheck_core::value::Value;
use quizcheck_sandbox::SandboxChecker;

fn bench_check(c: &mut Criterion) {
    let checker = SandboxChecker::new();

    let simple = CheckRequest {
        snippet: "submitted == distance('2km')".into(),
        submitted: "2000m".into(),
        expected: None,
    };
    c.bench_function("check_simple_comparison", |b| {
        b.iter(|| checker.check_blocking(black_box(&simple)))
    });

    let multi = CheckRequest {
        snippet: "d = distance(submitted)\nd >= 1900 && d <= distance(expected)".into(),
        submitted: "1.95км".into(),
        expected: Some(Value::Str("2km".into())),
    };
    c.bench_function("check_multi_statement", |b| {
        b.iter(|| checker.check_blocking(black_box(&multi)))
    });

    let looping = CheckRequest {
        snippet: "i = 0\nwhile i < 100 { i = i + 1 }\ni == 100".into(),
        submitted: String::new(),
        expected: None,
    };
    c.bench_function("check_bounded_loop", |b| {
        b.iter(|| checker.check_blocking(black_box(&looping)))
    });
}

criterion_group!(benches, bench_check);
criterion_main!(benches);
