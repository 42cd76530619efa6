//! TF-IDF news search: inverted index, champion lists and cosine-style ranking.

pub mod catalog;
pub mod champions;
pub mod index;
pub mod persist;
pub mod scoring;
pub mod tokenizer;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use catalog::{Catalog, IndexSettings, SearchHit, SearchResults, DEFAULT_TOP_K};
pub use champions::{ChampionLists, DEFAULT_CHAMPION_SIZE};
pub use index::{IndexEntry, InvertedIndex, QUERY_DOC_ID};
pub use scoring::{ScoredDoc, weight};
pub use tokenizer::{normalize_and_tokenize, TokenizerOptions};

pub type Term = String;
pub type DocId = String;

/// One corpus article. Extra fields in the corpus file are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub content: String,
    pub url: String,
}

/// Articles keyed by document id, iterated in id order.
pub type Corpus = BTreeMap<DocId, Article>;
