//! Large Expression Benchmark
//!
//! Parse, differentiate, simplify and evaluate an expression with many mixed
//! terms (N = 300).

use criterion::{Criterion, criterion_group, criterion_main};
use std::collections::HashMap;
use std::fmt::Write;
use std::hint::black_box;
use symb_kernel::{CompiledExpr, Diff, Symbol, diff, eval, parse, simplify};

/// Mixed expression with `n` terms: polynomials, trig, exponentials,
/// fractions and nested calls
fn generate_mixed_complex(n: usize) -> String {
    let mut s = String::with_capacity(n * 32);
    for i in 1..=n {
        if i > 1 {
            s.push_str(if i % 3 == 1 { " - " } else { " + " });
        }
        match i % 5 {
            0 => write!(s, "{}*x^{}", i, i % 10 + 1).unwrap(),
            1 => write!(s, "sin({}*x)*cos(x)", i).unwrap(),
            2 => write!(s, "(exp(x/{}) + ln(x + {}))", i, i).unwrap(),
            3 => write!(s, "(x^2 + {})/(x + {})", i, i).unwrap(),
            4 => write!(s, "sin(exp(x) + {})", i).unwrap(),
            _ => unreachable!(),
        }
    }
    s
}

fn bench_large_expressions(c: &mut Criterion) {
    let mut group = c.benchmark_group("complex_expressions_300");
    group.sample_size(10);
    group.measurement_time(std::time::Duration::from_secs(15));

    let mixed_str = generate_mixed_complex(300);
    let x = Symbol::new("x");

    group.bench_function("parse_mixed_300", |b| b.iter(|| parse(black_box(&mixed_str))));

    let mixed_expr = parse(&mixed_str).unwrap();

    // Single pass, no simplification passes
    group.bench_function("diff_one_pass_mixed_300", |b| {
        b.iter(|| {
            Diff::new()
                .max_passes(1)
                .differentiate(black_box(&mixed_expr), black_box(&x))
        })
    });

    group.bench_function("diff_mixed_300", |b| {
        b.iter(|| Diff::new().differentiate(black_box(&mixed_expr), black_box(&x)))
    });

    group.bench_function("full_mixed_300", |b| {
        b.iter(|| diff(black_box(&mixed_str), "x", None))
    });

    group.bench_function("simplify_mixed_300", |b| {
        b.iter(|| simplify(black_box(&mixed_expr)))
    });

    let derivative = Diff::new().differentiate(&mixed_expr, &x).unwrap();
    let vars = HashMap::from([("x", 2.5)]);

    group.bench_function("eval_deriv_compile_and_run", |b| {
        b.iter(|| eval(black_box(&derivative), black_box(&vars)))
    });

    let compiled = CompiledExpr::compile(&derivative, &["x"]).unwrap();
    group.bench_function("eval_deriv_compiled", |b| {
        b.iter(|| compiled.evaluate(black_box(&[2.5])))
    });

    group.finish();
}

criterion_group!(benches, bench_large_expressions);
criterion_main!(benches);
