use crate::{Catalog, ChampionLists, Corpus, IndexSettings, InvertedIndex};
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::{create_dir_all, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaFile {
    /// Corpus size N the weights of this index are computed against.
    pub num_docs: u32,
    pub settings: IndexSettings,
    pub created_at: String,
    pub version: u32,
}

pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    pub fn index(&self) -> PathBuf { self.root.join("inverted_index.json") }
    pub fn champions(&self) -> PathBuf { self.root.join("champions_list.json") }
    pub fn meta(&self) -> PathBuf { self.root.join("meta.json") }

    /// All files of a persisted catalog are present.
    pub fn is_complete(&self) -> bool {
        self.index().is_file() && self.champions().is_file() && self.meta().is_file()
    }
}

fn save_json<T: Serialize>(path: &Path, value: &T, pretty: bool) -> Result<()> {
    let f = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut w = BufWriter::new(f);
    if pretty {
        serde_json::to_writer_pretty(&mut w, value)?;
    } else {
        serde_json::to_writer(&mut w, value)?;
    }
    w.flush()?;
    tracing::info!(path = %path.display(), "saved");
    Ok(())
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let f = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let value = serde_json::from_reader(BufReader::new(f))
        .with_context(|| format!("parsing {}", path.display()))?;
    tracing::info!(path = %path.display(), "loaded");
    Ok(value)
}

/// Read a corpus file: a JSON object mapping document id to article.
pub fn load_corpus(path: &Path) -> Result<Corpus> {
    load_json(path)
}

/// Keep the first `limit` documents. Ids are ordered numerically when every id is an
/// integer (news ids "0".."N"), lexicographically otherwise.
pub fn first_documents(corpus: Corpus, limit: usize) -> Corpus {
    let numeric: Option<Vec<(u64, &String)>> =
        corpus.keys().map(|id| id.parse().ok().map(|n| (n, id))).collect();
    let keep: Option<HashSet<String>> = numeric.map(|mut ids| {
        ids.sort_unstable();
        ids.into_iter().take(limit).map(|(_, id)| id.clone()).collect()
    });
    match keep {
        Some(keep) => corpus.into_iter().filter(|(id, _)| keep.contains(id)).collect(),
        None => corpus.into_iter().take(limit).collect(),
    }
}

pub fn save_index(paths: &IndexPaths, index: &InvertedIndex) -> Result<()> {
    create_dir_all(&paths.root)?;
    save_json(&paths.index(), index, false)
}

pub fn load_index(paths: &IndexPaths) -> Result<InvertedIndex> {
    load_json(&paths.index())
}

pub fn save_champions(paths: &IndexPaths, champions: &ChampionLists) -> Result<()> {
    create_dir_all(&paths.root)?;
    save_json(&paths.champions(), champions, false)
}

pub fn load_champions(paths: &IndexPaths) -> Result<ChampionLists> {
    load_json(&paths.champions())
}

pub fn save_meta(paths: &IndexPaths, meta: &MetaFile) -> Result<()> {
    create_dir_all(&paths.root)?;
    save_json(&paths.meta(), meta, true)
}

pub fn load_meta(paths: &IndexPaths) -> Result<MetaFile> {
    load_json(&paths.meta())
}

/// Write index, champion lists and metadata of `catalog`.
pub fn save_catalog(paths: &IndexPaths, catalog: &Catalog) -> Result<()> {
    save_index(paths, catalog.index())?;
    save_champions(paths, catalog.champions())?;
    let meta = MetaFile {
        num_docs: catalog.num_docs(),
        settings: *catalog.settings(),
        created_at: time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_default(),
        version: FORMAT_VERSION,
    };
    save_meta(paths, &meta)
}

/// Load a persisted catalog; `corpus` supplies titles and links.
pub fn load_catalog(paths: &IndexPaths, corpus: Corpus) -> Result<Catalog> {
    let meta = load_meta(paths)?;
    anyhow::ensure!(meta.version == FORMAT_VERSION, "unsupported index version {}", meta.version);
    let index = load_index(paths)?;
    let champions = load_champions(paths)?;
    Catalog::from_parts(corpus, index, champions, meta.num_docs, meta.settings)
        .with_context(|| format!("inconsistent index in {}", paths.root.display()))
}

/// Rebuild when asked to or when no complete persisted catalog exists; load it otherwise.
///
/// `settings` only apply to a rebuild; a loaded catalog keeps the settings it was built with.
pub fn load_or_build(
    paths: &IndexPaths,
    corpus: Corpus,
    settings: IndexSettings,
    rebuild: bool,
) -> Result<Catalog> {
    if rebuild || !paths.is_complete() {
        tracing::info!(root = %paths.root.display(), forced = rebuild, "building index");
        let catalog = Catalog::build(corpus, settings)?;
        save_catalog(paths, &catalog)?;
        Ok(catalog)
    } else {
        let catalog = load_catalog(paths, corpus)?;
        if catalog.settings() != &settings {
            tracing::warn!(
                ?settings,
                persisted = ?catalog.settings(),
                "ignoring settings, index was built with different ones"
            );
        }
        Ok(catalog)
    }
}
