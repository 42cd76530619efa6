use anyhow::{bail, ensure, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::scoring::{similarity, top_k};
use crate::{
    normalize_and_tokenize, Article, ChampionLists, Corpus, DocId, InvertedIndex, TokenizerOptions,
    DEFAULT_CHAMPION_SIZE, QUERY_DOC_ID,
};

pub const DEFAULT_TOP_K: usize = 20;

/// Settings fixed when an index is built and persisted next to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSettings {
    pub champion_size: usize,
    pub tokenizer: TokenizerOptions,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self { champion_size: DEFAULT_CHAMPION_SIZE, tokenizer: TokenizerOptions::default() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub rank: usize,
    pub doc_id: DocId,
    pub score: f64,
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResults {
    /// Number of candidates that received a score, before the top-k cut.
    pub total_hits: usize,
    pub hits: Vec<SearchHit>,
}

/// Everything needed to answer queries: corpus, index, champion lists and N.
///
/// Built once or loaded from disk, then only read. Construction checks the
/// consistency the ranker relies on.
#[derive(Debug, Clone)]
pub struct Catalog {
    corpus: Corpus,
    index: InvertedIndex,
    champions: ChampionLists,
    num_docs: u32,
    settings: IndexSettings,
}

impl Catalog {
    /// Index every article of `corpus` and derive its champion lists.
    pub fn build(corpus: Corpus, settings: IndexSettings) -> Result<Self> {
        let num_docs = u32::try_from(corpus.len())?;
        let docs: Vec<(DocId, Vec<String>)> = corpus
            .par_iter()
            .map(|(doc_id, article)| {
                let tokens = normalize_and_tokenize(&article.content, &settings.tokenizer);
                (doc_id.clone(), tokens)
            })
            .collect();
        let index = InvertedIndex::build(&docs);
        tracing::info!(num_docs, num_terms = index.len(), "built inverted index");

        let champions = ChampionLists::build(&index, settings.champion_size);
        tracing::info!(r = settings.champion_size, "built champion lists");

        Self::from_parts(corpus, index, champions, num_docs, settings)
    }

    /// Assemble a catalog from previously built parts, rejecting inconsistent data.
    pub fn from_parts(
        corpus: Corpus,
        index: InvertedIndex,
        champions: ChampionLists,
        num_docs: u32,
        settings: IndexSettings,
    ) -> Result<Self> {
        let catalog = Self { corpus, index, champions, num_docs, settings };
        catalog.validate()?;
        Ok(catalog)
    }

    fn validate(&self) -> Result<()> {
        ensure!(
            self.num_docs > 0 || self.index.is_empty(),
            "index holds {} terms but the corpus size is 0",
            self.index.len()
        );
        for (term, entry) in self.index.iter() {
            ensure!(entry.df() >= 1, "term {term:?} has document frequency 0");
            ensure!(
                entry.is_consistent(),
                "term {term:?}: df {} does not match its {} postings",
                entry.df(),
                entry.postings().len()
            );
            ensure!(
                entry.df() <= self.num_docs,
                "term {term:?}: df {} exceeds corpus size {}",
                entry.df(),
                self.num_docs
            );
            if let Some(doc_id) = entry.postings().keys().find(|d| !self.corpus.contains_key(*d)) {
                bail!("term {term:?} posts document {doc_id:?} which is not in the corpus");
            }

            let Some(list) = self.champions.get(term) else {
                bail!("term {term:?} has no champion list");
            };
            let expected = self.settings.champion_size.min(entry.df() as usize);
            ensure!(
                list.len() == expected,
                "champion list of {term:?} has {} entries, expected {expected}",
                list.len()
            );
            if let Some(doc_id) = list.iter().find(|d| entry.tf(d).is_none()) {
                bail!("champion list of {term:?} names {doc_id:?} outside the term's postings");
            }
        }
        ensure!(
            self.champions.len() == self.index.len(),
            "{} champion lists for {} indexed terms",
            self.champions.len(),
            self.index.len()
        );
        Ok(())
    }

    pub fn index(&self) -> &InvertedIndex { &self.index }

    pub fn champions(&self) -> &ChampionLists { &self.champions }

    pub fn corpus(&self) -> &Corpus { &self.corpus }

    pub fn num_docs(&self) -> u32 { self.num_docs }

    pub fn settings(&self) -> &IndexSettings { &self.settings }

    pub fn article(&self, doc_id: &str) -> Option<&Article> { self.corpus.get(doc_id) }

    /// Tokenize `query` the way the corpus was tokenized and rank it.
    pub fn search(&self, query: &str, k: usize) -> SearchResults {
        let tokens = normalize_and_tokenize(query, &self.settings.tokenizer);
        self.rank(&tokens, k)
    }

    /// Rank already-normalized query tokens. Out-of-vocabulary tokens are ignored.
    pub fn rank<S: AsRef<str>>(&self, tokens: &[S], k: usize) -> SearchResults {
        let query = InvertedIndex::from_tokens(QUERY_DOC_ID, tokens);
        let known: Vec<&str> = query
            .iter()
            .map(|(term, _)| term.as_str())
            .filter(|term| self.index.contains_term(term))
            .collect();
        let candidates = self.champions.candidates(known);
        tracing::debug!(candidates = candidates.len(), "collected champion candidates");

        let scores = similarity(&query, &candidates, &self.index, self.num_docs);
        let total_hits = scores.len();
        let hits = top_k(scores, k)
            .into_iter()
            .enumerate()
            .map(|(i, scored)| {
                let (title, url) = match self.corpus.get(&scored.doc_id) {
                    Some(article) => (article.title.clone(), article.url.clone()),
                    None => Default::default(),
                };
                SearchHit { rank: i + 1, doc_id: scored.doc_id, score: scored.score, title, url }
            })
            .collect();
        SearchResults { total_hits, hits }
    }
}
