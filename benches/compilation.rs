use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

static INPUT: &str = "\
# exercise every stage: literals, calls, conditionals, recursion
let clamp: int = (x: int, lo: int, hi: int) -> if x < lo then lo else if x > hi then hi else x
let fact: int = (n: int) -> if n <= 1 then 1 else n * fact(n - 1)
let area: float = (w: float, h: float) -> w * h
let shout: int = (s: str) -> str_print(s)
let describe: int = (n: int) -> shout(int_to_str(clamp(n, 0, 100)))
let main: int = () -> describe(fact(5))
";

fn compile(source: &str) -> usize {
    ember::compile_source(source, "bench.em")
        .map(|module| module.to_string().len())
        .unwrap_or(0)
}

fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("compile", |b| b.iter(|| black_box(compile(black_box(INPUT)))));
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
