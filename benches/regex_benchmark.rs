use criterion::{criterion_group, criterion_main, Criterion};
use rxe::{self as re};

const BENCH_INPUT: &str = include_str!("./input_1.txt");

fn compile_benchmark(c: &mut Criterion) {
    c.bench_function("compile_word_pattern", |b| {
        b.iter(|| {
            let pattern = re::seq(vec![re::rep1(re::wordc()), re::rep(re::seq(vec![re::space(), re::rep1(re::wordc())]))]);
            re::compile(pattern).unwrap()
        });
    });
}

fn search_benchmark(c: &mut Criterion) {
    let pattern = re::compile(re::rep1(re::wordc())).unwrap();
    let input = BENCH_INPUT.as_bytes();

    c.bench_function("all_words", |b| {
        b.iter(|| {
            let found: Vec<_> = re::all(&pattern, input).collect();
            found.len()
        });
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(50);
    targets = compile_benchmark, search_benchmark
}

criterion_main!(benches);
