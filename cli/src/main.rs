use anyhow::Result;
use clap::Parser;
use newsrank_core::persist::{first_documents, load_corpus, load_or_build, IndexPaths};
use newsrank_core::{
    Catalog, Corpus, IndexSettings, TokenizerOptions, DEFAULT_CHAMPION_SIZE, DEFAULT_TOP_K,
};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

mod display;

#[derive(Parser)]
#[command(name = "newsrank")]
#[command(
    about = "Build a TF-IDF index with champion lists over a news corpus and query it",
    long_about = None
)]
struct Cli {
    /// Corpus JSON file: document id -> {title, content, url}
    #[arg(long, default_value = "./IR_data_news_12k.json")]
    corpus: PathBuf,
    /// Directory holding the persisted index
    #[arg(long, default_value = "./index")]
    index: PathBuf,
    /// Rebuild the index even if persisted files exist
    #[arg(long = "create-index", alias = "createIndex")]
    create_index: bool,
    /// Champion list size r
    #[arg(long, default_value_t = DEFAULT_CHAMPION_SIZE)]
    champions: usize,
    /// Number of results to print
    #[arg(long, default_value_t = DEFAULT_TOP_K)]
    top_k: usize,
    /// Index only the first n documents (numeric id order when ids are integers)
    #[arg(long)]
    limit: Option<usize>,
    #[arg(long)]
    keep_punctuation: bool,
    #[arg(long)]
    no_normalize: bool,
    #[arg(long)]
    keep_stop_words: bool,
    #[arg(long)]
    no_lemmatize: bool,
    /// Keep reading queries, one per line, until end of input
    #[arg(long)]
    interactive: bool,
}

impl Cli {
    fn settings(&self) -> IndexSettings {
        IndexSettings {
            champion_size: self.champions,
            tokenizer: TokenizerOptions {
                remove_punctuation: !self.keep_punctuation,
                normalize_text: !self.no_normalize,
                keep_stop_words: self.keep_stop_words,
                lemmatize: !self.no_lemmatize,
            },
        }
    }
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(io::stderr).init();
    let cli = Cli::parse();

    let mut corpus: Corpus = load_corpus(&cli.corpus)?;
    if let Some(limit) = cli.limit {
        corpus = first_documents(corpus, limit);
    }
    let paths = IndexPaths::new(&cli.index);
    let catalog = load_or_build(&paths, corpus, cli.settings(), cli.create_index)?;
    tracing::info!(
        num_docs = catalog.num_docs(),
        num_terms = catalog.index().len(),
        "catalog ready"
    );

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "Enter query:")?;
    out.flush()?;

    for line in stdin.lock().lines() {
        let query = line?;
        if let Err(err) = answer(&catalog, &query, cli.top_k, &mut out) {
            if !cli.interactive {
                return Err(err);
            }
            tracing::error!(error = %err, "query failed");
        }
        if !cli.interactive {
            break;
        }
        writeln!(out, "\nEnter query:")?;
        out.flush()?;
    }
    Ok(())
}

fn answer<W: Write>(catalog: &Catalog, query: &str, top_k: usize, out: &mut W) -> Result<()> {
    let results = catalog.search(query, top_k);
    display::print_results(out, &results)?;
    out.flush()?;
    Ok(())
}
