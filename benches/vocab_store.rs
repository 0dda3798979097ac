use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use noteenglish_rs::{
    DetailFields, MenuGeometry, Rect, Sentence, SessionState, Token, VocabularyEntry, Viewport,
};

const LEMMAS: &[&str] = &["banana", "apple", "orange", "grape", "melon", "cherry"];

fn seeded_state(sentence_count: usize) -> SessionState {
    let sentences = (0..sentence_count)
        .map(|i| {
            Sentence::new(i as u32, format!("I like bananas {i}."), "我喜歡香蕉。").with_tokens(vec![
                Token::new("like", "like", "VERB"),
                Token::new("bananas", "banana", "NOUN"),
            ])
        })
        .collect();
    SessionState::with_sentences(sentences)
}

fn bench_upsert(c: &mut Criterion) {
    for &count in &[1usize, 16, 128] {
        c.bench_with_input(BenchmarkId::new("store::upsert", count), &count, |b, &count| {
            b.iter_batched(
                || seeded_state(count),
                |mut state| {
                    for (i, lemma) in LEMMAS.iter().enumerate() {
                        let entry = VocabularyEntry::new(*lemma, *lemma, "NOUN").with_detail(
                            DetailFields {
                                translation: Some(format!("zh:{lemma}")),
                                ..DetailFields::default()
                            },
                        );
                        state = state.upsert(i % count, entry);
                    }
                    black_box(state)
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }
}

fn bench_repeat_merge(c: &mut Criterion) {
    c.bench_function("store::merge_same_identity", |b| {
        b.iter_batched(
            || seeded_state(1),
            |mut state| {
                for round in 0..32 {
                    let entry = VocabularyEntry::new("bananas", "banana", "NOUN").with_detail(
                        DetailFields {
                            level: Some(format!("A{}", round % 2 + 1)),
                            ..DetailFields::default()
                        },
                    );
                    state = state.upsert(0, entry);
                }
                black_box(state)
            },
            criterion::BatchSize::SmallInput,
        );
    });
}

fn bench_placement(c: &mut Criterion) {
    let geometry = MenuGeometry::default();
    let viewport = Viewport::new(1280.0, 800.0);
    let rects = [
        ("below", Rect::new(100.0, 100.0, 180.0, 120.0)),
        ("flip_above", Rect::new(400.0, 760.0, 460.0, 780.0)),
        ("clamp_right", Rect::new(1250.0, 300.0, 1275.0, 320.0)),
    ];
    for (name, rect) in rects {
        c.bench_with_input(BenchmarkId::new("placement::place", name), &rect, |b, rect| {
            b.iter(|| black_box(geometry.place(black_box(*rect), viewport)));
        });
    }
}

criterion_group!(benches, bench_upsert, bench_repeat_merge, bench_placement);
criterion_main!(benches);
