use criterion::{Criterion, criterion_group, criterion_main};
use inkpost_engine::editing::{Cmd, Document, Selection, apply, inspect};
use inkpost_engine::{EditorOptions, InlineFormat};
mod common;

fn bench_command_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("commands");
    group.sample_size(10);

    let markup = common::generate_post(100);
    let end = common::text_len(100);

    group.bench_function("toggle_bold_everything", |b| {
        b.iter(|| {
            let mut doc = Document::from_markup(&markup);
            let selection = Selection::from_text_offsets(&doc, 0, end);
            let patch = apply(
                &mut doc,
                Some(&selection),
                &Cmd::ToggleFormat(InlineFormat::Bold),
            );
            std::hint::black_box(patch.ok());
        });
    });

    let doc = Document::from_markup(&markup);
    let options = EditorOptions::default();
    group.bench_function("toolbar_state", |b| {
        let selection = Selection::from_text_offsets(&doc, end / 2, end / 2 + 40);
        b.iter(|| std::hint::black_box(inspect(&doc, Some(&selection), &options)));
    });

    group.finish();
}

criterion_group!(benches, bench_command_operations);
criterion_main!(benches);
