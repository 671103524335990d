use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rpn_calc::{Parser, evaluate};

const EXPRESSIONS: &[(&str, &str)] = &[
    ("arithmetic", "2+3*4-10/5^2"),
    ("functions", "max(sin(pi/4), cos(pi/4)) * min(3, tan(0.25))"),
    (
        "nested",
        "((-12.5+4.75)*(3.125-0.5))/(max(2.5,-7.25)^2)-sin((1.5*(2.25-0.75)))",
    ),
];

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    for (name, src) in EXPRESSIONS {
        group.bench_function(*name, |b| {
            b.iter(|| rpn_calc::eval(black_box(src)).expect("evaluates"))
        });
    }
    group.finish();
}

fn bench_stages(c: &mut Criterion) {
    let (_, src) = EXPRESSIONS[2];
    c.bench_function("convert", |b| {
        b.iter(|| Parser::new(black_box(src)).parse().expect("converts"))
    });

    let rpn = Parser::new(src).parse().expect("converts");
    c.bench_function("evaluate", |b| {
        b.iter(|| evaluate(black_box(&rpn)).expect("evaluates"))
    });
}

criterion_group!(benches, bench_pipeline, bench_stages);
criterion_main!(benches);
