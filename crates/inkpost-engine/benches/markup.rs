use criterion::{Criterion, criterion_group, criterion_main};
use inkpost_engine::editing::Document;
mod common;

fn bench_markup(c: &mut Criterion) {
    let mut group = c.benchmark_group("markup");
    group.sample_size(10);

    for sections in [10, 100] {
        let markup = common::generate_post(sections);

        group.bench_function(format!("parse_{sections}"), |b| {
            b.iter(|| {
                let doc = Document::from_markup(std::hint::black_box(&markup));
                std::hint::black_box(doc);
            });
        });

        let doc = Document::from_markup(&markup);
        group.bench_function(format!("serialize_{sections}"), |b| {
            b.iter(|| std::hint::black_box(doc.to_markup()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_markup);
criterion_main!(benches);
