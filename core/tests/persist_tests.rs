use newsrank_core::persist::{
    first_documents, load_catalog, load_champions, load_corpus, load_index, load_meta, load_or_build,
    save_catalog, IndexPaths,
};
use newsrank_core::{Article, Catalog, Corpus, IndexSettings};
use std::fs;
use tempfile::tempdir;

const CORPUS: &str = r#"{
    "0": {"title": "Storm hits coast", "content": "A storm hit the coast. Storm damage was severe.", "url": "https://news.example/0", "tags": ["weather"]},
    "1": {"title": "Rain forecast", "content": "Heavy rain expected after the storm.", "url": "https://news.example/1"},
    "2": {"title": "Market update", "content": "Stocks rallied on Monday.", "url": "https://news.example/2"}
}"#;

fn write_corpus(dir: &std::path::Path) -> std::path::PathBuf {
    let path = dir.join("corpus.json");
    fs::write(&path, CORPUS).unwrap();
    path
}

#[test]
fn index_and_champions_round_trip() {
    let dir = tempdir().unwrap();
    let corpus = load_corpus(&write_corpus(dir.path())).unwrap();
    assert_eq!(corpus["0"].title, "Storm hits coast");

    let catalog = Catalog::build(corpus.clone(), IndexSettings::default()).unwrap();
    let paths = IndexPaths::new(dir.path().join("index"));
    save_catalog(&paths, &catalog).unwrap();
    assert!(paths.is_complete());

    assert_eq!(&load_index(&paths).unwrap(), catalog.index());
    assert_eq!(&load_champions(&paths).unwrap(), catalog.champions());
    let meta = load_meta(&paths).unwrap();
    assert_eq!(meta.num_docs, 3);
    assert_eq!(meta.settings, IndexSettings::default());

    let loaded = load_catalog(&paths, corpus).unwrap();
    assert_eq!(loaded.search("storm", 20), catalog.search("storm", 20));
}

#[test]
fn persisted_index_is_term_keyed_json() {
    let dir = tempdir().unwrap();
    let corpus = load_corpus(&write_corpus(dir.path())).unwrap();
    let catalog = Catalog::build(corpus, IndexSettings::default()).unwrap();
    let paths = IndexPaths::new(dir.path());
    save_catalog(&paths, &catalog).unwrap();

    let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(paths.index()).unwrap()).unwrap();
    assert_eq!(raw["storm"]["df"], 2);
    assert_eq!(raw["storm"]["doc_tf"]["0"], 2);
    let champs: serde_json::Value = serde_json::from_str(&fs::read_to_string(paths.champions()).unwrap()).unwrap();
    assert_eq!(champs["storm"], serde_json::json!(["0", "1"]));
}

#[test]
fn load_or_build_rebuilds_when_files_are_missing() {
    let dir = tempdir().unwrap();
    let corpus = load_corpus(&write_corpus(dir.path())).unwrap();
    let paths = IndexPaths::new(dir.path().join("index"));
    assert!(!paths.is_complete());

    let built = load_or_build(&paths, corpus.clone(), IndexSettings::default(), false).unwrap();
    assert!(paths.is_complete());
    let loaded = load_or_build(&paths, corpus, IndexSettings::default(), false).unwrap();
    assert_eq!(loaded.index(), built.index());
}

#[test]
fn corrupted_index_fails_with_context() {
    let dir = tempdir().unwrap();
    let corpus = load_corpus(&write_corpus(dir.path())).unwrap();
    let paths = IndexPaths::new(dir.path());
    save_catalog(&paths, &Catalog::build(corpus.clone(), IndexSettings::default()).unwrap()).unwrap();

    fs::write(paths.index(), "{ not json").unwrap();
    let err = load_catalog(&paths, corpus.clone()).unwrap_err();
    assert!(format!("{err:#}").contains("inverted_index.json"));

    fs::write(paths.index(), r#"{"storm": {"df": 5, "doc_tf": {"0": 2}}}"#).unwrap();
    assert!(load_catalog(&paths, corpus).is_err());
}

#[test]
fn missing_corpus_is_an_error() {
    let dir = tempdir().unwrap();
    let err = load_corpus(&dir.path().join("nope.json")).unwrap_err();
    assert!(err.to_string().contains("nope.json"));
}

#[test]
fn forced_rebuild_replaces_persisted_index() {
    let dir = tempdir().unwrap();
    let corpus = load_corpus(&write_corpus(dir.path())).unwrap();
    let paths = IndexPaths::new(dir.path().join("index"));
    save_catalog(&paths, &Catalog::build(corpus, IndexSettings::default()).unwrap()).unwrap();
    assert!(paths.is_complete());

    fs::write(
        dir.path().join("corpus.json"),
        r#"{"7": {"title": "Eclipse", "content": "A solar eclipse tomorrow.", "url": "u"},
            "8": {"title": "Tides", "content": "High tides expected.", "url": "u"}}"#,
    )
    .unwrap();
    let changed = load_corpus(&dir.path().join("corpus.json")).unwrap();

    let stale = load_or_build(&paths, changed.clone(), IndexSettings::default(), false);
    assert!(stale.is_err(), "old postings name documents missing from the new corpus");

    let rebuilt = load_or_build(&paths, changed.clone(), IndexSettings::default(), true).unwrap();
    assert_eq!(rebuilt.search("eclipse", 5).total_hits, 1);
    assert!(!rebuilt.index().contains_term("storm"));
    assert_eq!(rebuilt.num_docs(), 2);

    let on_disk = load_index(&paths).unwrap();
    assert_eq!(&on_disk, rebuilt.index());
    assert_eq!(load_meta(&paths).unwrap().num_docs, 2);
    assert_eq!(load_catalog(&paths, changed).unwrap().search("eclipse", 5).hits[0].doc_id, "7");
}

#[test]
fn limit_keeps_lowest_numeric_ids() {
    let corpus: Corpus = (0..12)
        .map(|i| {
            let article = Article { title: format!("t{i}"), content: format!("story {i}"), url: String::new() };
            (i.to_string(), article)
        })
        .collect();
    let kept = first_documents(corpus, 3);
    let ids: Vec<&str> = kept.keys().map(String::as_str).collect();
    assert_eq!(ids, ["0", "1", "2"]);
}

#[test]
fn limit_falls_back_to_id_order_for_non_numeric_ids() {
    let corpus: Corpus = ["b", "a", "c"]
        .iter()
        .map(|id| (id.to_string(), Article { title: String::new(), content: String::new(), url: String::new() }))
        .collect();
    let ids: Vec<String> = first_documents(corpus, 2).into_keys().collect();
    assert_eq!(ids, ["a", "b"]);
}
