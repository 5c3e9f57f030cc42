use altre_document::{
    DocumentId, FindEngine, FindQuery, ReplaceEngine, ReplaceOperation, UndoRedo, UndoRedoEngine,
};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use std::time::Duration;

fn sample_text(lines: usize) -> String {
    (0..lines)
        .map(|i| format!("line {} of the Quick brown fox jumps over the lazy dog\n", i))
        .collect()
}

/// 検索のベンチマーク
fn bench_find(c: &mut Criterion) {
    let mut group = c.benchmark_group("find");
    group.measurement_time(Duration::from_secs(10));

    let engine = FindEngine::new();
    let text = sample_text(10_000);

    let query = FindQuery::new("quick", false, false);
    group.bench_function("case_insensitive_10k_lines", |b| {
        b.iter(|| engine.find_all(black_box(&text), &query))
    });

    let query = FindQuery::new("fox", true, true);
    group.bench_function("whole_word_10k_lines", |b| {
        b.iter(|| engine.find_all(black_box(&text), &query))
    });

    group.finish();
}

/// 置換のベンチマーク
fn bench_replace(c: &mut Criterion) {
    let mut group = c.benchmark_group("replace");

    let engine = ReplaceEngine::default();
    let text = sample_text(10_000);
    let op = ReplaceOperation::new(FindQuery::new("lazy", false, false), "sleepy");

    group.bench_function("replace_all_10k_lines", |b| {
        b.iter(|| engine.replace_all(black_box(&text), &op))
    });

    group.bench_function("replace_next_middle", |b| {
        b.iter(|| engine.replace_next_at_or_after(black_box(&text), &op, text.len() / 2))
    });

    group.finish();
}

/// 履歴追加のベンチマーク（全文スナップショット）
fn bench_history(c: &mut Criterion) {
    let text = sample_text(1_000);
    c.bench_function("undo_push_100_snapshots", |b| {
        b.iter_batched(
            || {
                let id = DocumentId::new();
                let mut engine = UndoRedoEngine::new();
                engine.attach(id, &text);
                (id, engine)
            },
            |(id, mut engine)| {
                for _ in 0..100 {
                    engine.push(id, black_box(&text));
                }
                engine
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_find, bench_replace, bench_history);
criterion_main!(benches);
