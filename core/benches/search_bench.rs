use criterion::{criterion_group, criterion_main, Criterion};
use newsrank_core::{normalize_and_tokenize, Article, Catalog, Corpus, IndexSettings, TokenizerOptions};

const WORDS: &[&str] = &[
    "storm", "market", "election", "rain", "stocks", "coast", "minister", "vote", "league", "match",
    "inflation", "bank", "river", "flood", "court", "ruling", "season", "player", "energy", "price",
];

fn synthetic_corpus(n: usize) -> Corpus {
    (0..n)
        .map(|i| {
            let content: Vec<&str> = (0..80).map(|j| WORDS[(i * 7 + j * j) % WORDS.len()]).collect();
            let article = Article { title: format!("article {i}"), content: content.join(" "), url: format!("https://news.example/{i}") };
            (i.to_string(), article)
        })
        .collect()
}

fn bench_tokenize(c: &mut Criterion) {
    let text = "The Supreme Court's ruling on Monday sent energy prices higher, while flood warnings kept the coast on alert.";
    let opts = TokenizerOptions::default();
    c.bench_function("tokenize_sentence", |b| b.iter(|| normalize_and_tokenize(text, &opts)));
}

fn bench_build(c: &mut Criterion) {
    let corpus = synthetic_corpus(2_000);
    c.bench_function("build_catalog_2k", |b| b.iter(|| Catalog::build(corpus.clone(), IndexSettings::default())));
}

fn bench_search(c: &mut Criterion) {
    let catalog = Catalog::build(synthetic_corpus(2_000), IndexSettings::default()).expect("catalog");
    c.bench_function("search_three_terms", |b| b.iter(|| catalog.search("storm flood coast", 20)));
}

criterion_group!(benches, bench_tokenize, bench_build, bench_search);
criterion_main!(benches);
