use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::{DocId, Term};

/// Document id under which a query is folded into its own single-document index.
pub const QUERY_DOC_ID: &str = "query";

/// Document frequency and per-document term frequencies of one term.
///
/// `df` always equals the number of postings; both are only changed together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    df: u32,
    doc_tf: HashMap<DocId, u32>,
}

impl IndexEntry {
    pub fn df(&self) -> u32 { self.df }

    pub fn tf(&self, doc_id: &str) -> Option<u32> { self.doc_tf.get(doc_id).copied() }

    pub fn postings(&self) -> &HashMap<DocId, u32> { &self.doc_tf }

    /// Count one more occurrence of the term in `doc_id`.
    fn record(&mut self, doc_id: &str) {
        match self.doc_tf.get_mut(doc_id) {
            Some(tf) => *tf += 1,
            None => {
                self.doc_tf.insert(doc_id.to_owned(), 1);
                self.df += 1;
            }
        }
    }

    fn absorb(&mut self, other: IndexEntry) {
        for (doc_id, tf) in other.doc_tf {
            match self.doc_tf.entry(doc_id) {
                Entry::Occupied(mut e) => *e.get_mut() += tf,
                Entry::Vacant(e) => {
                    e.insert(tf);
                    self.df += 1;
                }
            }
        }
    }

    /// True when `df` matches the postings and every posting counts at least one occurrence.
    pub fn is_consistent(&self) -> bool {
        self.df as usize == self.doc_tf.len() && self.doc_tf.values().all(|&tf| tf >= 1)
    }
}

/// Term -> (document frequency, postings). Serializes as a plain JSON object keyed by term.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvertedIndex {
    terms: HashMap<Term, IndexEntry>,
}

impl InvertedIndex {
    pub fn new() -> Self { Self::default() }

    /// Build a single-document index, e.g. the term vector of a query under [`QUERY_DOC_ID`].
    pub fn from_tokens<S: AsRef<str>>(doc_id: &str, tokens: &[S]) -> Self {
        let mut index = Self::new();
        index.add_document(doc_id, tokens);
        index
    }

    /// Build the index over a whole corpus of tokenized documents.
    ///
    /// Documents are folded into per-thread partial indexes which are then merged;
    /// the result is identical to adding the documents one by one.
    pub fn build(docs: &[(DocId, Vec<Term>)]) -> Self {
        docs.par_iter()
            .fold(Self::new, |mut index, (doc_id, tokens)| {
                index.add_document(doc_id, tokens);
                index
            })
            .reduce(Self::new, Self::merge)
    }

    /// Fold one document's tokens into the index. An empty token slice is a no-op.
    pub fn add_document<S: AsRef<str>>(&mut self, doc_id: &str, tokens: &[S]) {
        for token in tokens {
            self.entry_or_default(token.as_ref()).record(doc_id);
        }
    }

    /// Get-or-insert: a term seen for the first time starts with df 0 and no postings.
    fn entry_or_default(&mut self, term: &str) -> &mut IndexEntry {
        self.terms.entry(term.to_owned()).or_default()
    }

    /// Merge two partial indexes built over disjoint sets of documents.
    pub fn merge(mut self, mut other: Self) -> Self {
        if other.terms.len() > self.terms.len() {
            std::mem::swap(&mut self, &mut other);
        }
        for (term, entry) in other.terms {
            self.terms.entry(term).or_default().absorb(entry);
        }
        self
    }

    pub fn get(&self, term: &str) -> Option<&IndexEntry> { self.terms.get(term) }

    pub fn contains_term(&self, term: &str) -> bool { self.terms.contains_key(term) }

    pub fn iter(&self) -> impl Iterator<Item = (&Term, &IndexEntry)> { self.terms.iter() }

    pub fn par_iter(&self) -> impl ParallelIterator<Item = (&Term, &IndexEntry)> {
        self.terms.par_iter()
    }

    /// Number of distinct terms.
    pub fn len(&self) -> usize { self.terms.len() }

    pub fn is_empty(&self) -> bool { self.terms.is_empty() }
}
