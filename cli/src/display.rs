use newsrank_core::SearchResults;
use std::io::{self, Write};

const RULE: &str = "=============================================";

/// Print ranked results: rank, document id, score, title and link of each hit.
pub fn print_results<W: Write>(out: &mut W, results: &SearchResults) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "[[[[[[[Results]]]]]]]:")?;
    writeln!(out, "Total found results: {}", results.total_hits)?;
    for hit in &results.hits {
        writeln!(out, "{RULE}")?;
        writeln!(
            out,
            "{}) [doc_id: {}], [Score: {}], [Title: {}]",
            hit.rank, hit.doc_id, hit.score, hit.title
        )?;
        writeln!(out, "[Link: {} ]", hit.url)?;
    }
    Ok(())
}
