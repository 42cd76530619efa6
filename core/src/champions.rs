use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::{DocId, IndexEntry, InvertedIndex, Term};

pub const DEFAULT_CHAMPION_SIZE: usize = 300;

/// Per term, the ids of the `r` documents with the highest term frequency.
///
/// Frozen at build time; the query path only reads it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChampionLists {
    lists: HashMap<Term, Vec<DocId>>,
}

impl ChampionLists {
    /// Build the champion list of every term in `index`, in parallel across terms.
    pub fn build(index: &InvertedIndex, r: usize) -> Self {
        let lists = index
            .par_iter()
            .map(|(term, entry)| (term.clone(), champions_for(entry, r)))
            .collect();
        Self { lists }
    }

    pub fn get(&self, term: &str) -> Option<&[DocId]> { self.lists.get(term).map(Vec::as_slice) }

    pub fn iter(&self) -> impl Iterator<Item = (&Term, &Vec<DocId>)> { self.lists.iter() }

    pub fn len(&self) -> usize { self.lists.len() }

    pub fn is_empty(&self) -> bool { self.lists.is_empty() }

    /// Union of the champion lists of `terms`. Terms without a list contribute nothing.
    pub fn candidates<'a, I>(&'a self, terms: I) -> HashSet<&'a str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        terms
            .into_iter()
            .filter_map(|term| self.lists.get(term))
            .flatten()
            .map(String::as_str)
            .collect()
    }
}

/// Highest tf first; equal tf falls back to ascending document id.
fn champions_for(entry: &IndexEntry, r: usize) -> Vec<DocId> {
    let mut postings: Vec<(&DocId, u32)> =
        entry.postings().iter().map(|(d, &tf)| (d, tf)).collect();
    postings.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    postings.into_iter().take(r).map(|(d, _)| d.clone()).collect()
}
