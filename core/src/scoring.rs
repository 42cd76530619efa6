use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::{DocId, InvertedIndex, QUERY_DOC_ID};

/// Log-dampened tf times idf: `(1 + log10(tf)) * log10(N / df)`.
///
/// Requires `tf >= 1` and `1 <= df <= N`. A catalog only hands out counts that
/// satisfy this, so a violation is a bug and panics instead of producing NaN.
pub fn weight(tf: u32, df: u32, num_docs: u32) -> f64 {
    assert!(
        tf >= 1 && df >= 1 && df <= num_docs,
        "tf-idf precondition violated: tf={tf} df={df} N={num_docs}"
    );
    (1.0 + f64::from(tf).log10()) * (f64::from(num_docs) / f64::from(df)).log10()
}

/// Cosine-style score of every candidate that shares at least one term with the query.
///
/// The document norm only covers the dimensions shared with the query, not the
/// full document vector. This is an approximation of true cosine similarity and
/// is kept as such. Query terms absent from `index` are skipped; candidates that
/// match no query term get no entry at all.
pub fn similarity(
    query: &InvertedIndex,
    candidates: &HashSet<&str>,
    index: &InvertedIndex,
    num_docs: u32,
) -> HashMap<DocId, f64> {
    // Fixed term order keeps float summation, and therefore scores, reproducible.
    let mut terms: Vec<_> = query
        .iter()
        .filter_map(|(term, q)| index.get(term).map(|entry| (term, q, entry)))
        .collect();
    terms.sort_unstable_by(|a, b| a.0.cmp(b.0));

    let weighted: Vec<_> = terms
        .into_iter()
        .filter_map(|(_, q, entry)| {
            let q_tf = q.tf(QUERY_DOC_ID)?;
            Some((weight(q_tf, entry.df(), num_docs), entry))
        })
        .collect();

    // Matched-term norm per document. `hypot` keeps a single matched term's
    // norm equal to its weight, so w_td / norm is exactly 1.0 and equal
    // single-term scores tie exactly.
    let mut norms: HashMap<&str, f64> = HashMap::new();
    for (_, entry) in &weighted {
        for &doc_id in candidates {
            let Some(tf) = entry.tf(doc_id) else { continue };
            let norm = norms.entry(doc_id).or_insert(0.0);
            *norm = norm.hypot(weight(tf, entry.df(), num_docs));
        }
    }

    let mut scores: HashMap<DocId, f64> = HashMap::with_capacity(norms.len());
    for (w_tq, entry) in &weighted {
        for (&doc_id, &norm) in &norms {
            let Some(tf) = entry.tf(doc_id) else { continue };
            let score = scores.entry(doc_id.to_owned()).or_insert(0.0);
            // Only terms present in every document matched: idf 0, nothing to normalize.
            if norm > 0.0 {
                *score += w_tq * (weight(tf, entry.df(), num_docs) / norm);
            }
        }
    }
    scores
}

/// A scored document. Orders by score, then prefers the smaller document id.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ScoredDoc {
    pub doc_id: DocId,
    pub score: f64,
}

impl Ord for ScoredDoc {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then_with(|| other.doc_id.cmp(&self.doc_id))
    }
}

impl PartialOrd for ScoredDoc {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl PartialEq for ScoredDoc {
    fn eq(&self, other: &Self) -> bool { self.cmp(other) == Ordering::Equal }
}

impl Eq for ScoredDoc {}

/// The `k` best documents, best first. Returns fewer when fewer are scored.
///
/// Equal scores are ordered by ascending document id.
pub fn top_k(scores: HashMap<DocId, f64>, k: usize) -> Vec<ScoredDoc> {
    if k == 0 {
        return Vec::new();
    }
    // Min-heap of the best k seen so far; its root is the first to be evicted.
    let mut heap = BinaryHeap::with_capacity(k + 1);
    for (doc_id, score) in scores {
        heap.push(Reverse(ScoredDoc { doc_id, score }));
        if heap.len() > k {
            heap.pop();
        }
    }
    heap.into_sorted_vec().into_iter().map(|Reverse(doc)| doc).collect()
}
