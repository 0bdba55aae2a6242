use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use lox_parser::parser::Parser;

fn program(source: &str) {
    let source = source.into();
    let _ast = Parser::from_source(&source).parse_program();
    assert!(source.has_no_errors());
}

fn long_expr(c: &mut Criterion) {
    let mut group = c.benchmark_group("long-expr");

    let mut source = "print 1".to_string();
    for _i in 0..1000 {
        source.push_str(" + 1");
    }
    source.push(';');
    group.throughput(Throughput::Bytes(source.len() as u64));
    group.bench_function("long-expr", |b| b.iter(|| program(&source)));
}

fn stress_precedence(c: &mut Criterion) {
    let mut group = c.benchmark_group("stress-precedence");

    let mut source = "print 1".to_string();
    for _i in 0..200 {
        source.push_str(" == 2 < 3 + 5 * 5 or !nil and -4");
    }
    source.push(';');
    group.throughput(Throughput::Bytes(source.len() as u64));
    group.bench_function("stress-precedence", |b| b.iter(|| program(&source)));
}

fn nested_blocks(c: &mut Criterion) {
    let mut group = c.benchmark_group("nested-blocks");

    let mut source = String::new();
    for i in 0..100 {
        source.push_str(&format!("fun f{}(a, b) {{ for (var i = 0; i < a; i = i + 1) {{ ", i));
    }
    source.push_str("print b;");
    for _i in 0..100 {
        source.push_str(" } }");
    }
    group.throughput(Throughput::Bytes(source.len() as u64));
    group.bench_function("nested-blocks", |b| b.iter(|| program(&source)));
}

criterion_group!(benches, long_expr, stress_precedence, nested_blocks);
criterion_main!(benches);
