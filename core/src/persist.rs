use crate::{DocumentIndex, IndexMeta, IndexSnapshot, InvertedIndex};
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{create_dir_all, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    pub fn inverted_index(&self) -> PathBuf { self.root.join("inverted_index.json") }
    pub fn document_index(&self) -> PathBuf { self.root.join("document_index.json") }
    pub fn meta(&self) -> PathBuf { self.root.join("meta.json") }
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
    Ok(())
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let f = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let value = serde_json::from_reader(BufReader::new(f)).with_context(|| format!("parsing {}", path.display()))?;
    Ok(value)
}

pub fn save_inverted_index(paths: &IndexPaths, index: &InvertedIndex) -> Result<()> {
    create_dir_all(&paths.root)?;
    save_json(&paths.inverted_index(), index, false)
}

pub fn load_inverted_index(paths: &IndexPaths) -> Result<InvertedIndex> {
    load_json(&paths.inverted_index())
}

pub fn save_document_index(paths: &IndexPaths, index: &DocumentIndex) -> Result<()> {
    create_dir_all(&paths.root)?;
    save_json(&paths.document_index(), index, false)
}

pub fn load_document_index(paths: &IndexPaths) -> Result<DocumentIndex> {
    load_json(&paths.document_index())
}

pub fn save_meta(paths: &IndexPaths, meta: &IndexMeta) -> Result<()> {
    create_dir_all(&paths.root)?;
    save_json(&paths.meta(), meta, true)
}

pub fn load_meta(paths: &IndexPaths) -> Result<IndexMeta> {
    load_json(&paths.meta())
}

pub fn save_snapshot(paths: &IndexPaths, snapshot: &IndexSnapshot) -> Result<()> {
    save_inverted_index(paths, &snapshot.inverted)?;
    save_document_index(paths, &snapshot.documents)?;
    save_meta(paths, &snapshot.meta)?;
    Ok(())
}

/// Load all three documents of a snapshot. The corpus size recorded in the
/// metadata is authoritative.
pub fn load_snapshot(paths: &IndexPaths) -> Result<IndexSnapshot> {
    let meta = load_meta(paths)?;
    let inverted = load_inverted_index(paths)?;
    let documents = load_document_index(paths)?;
    if meta.num_docs as usize != documents.len() {
        tracing::warn!(num_docs = meta.num_docs, documents = documents.len(), "document count differs from metadata");
    }
    tracing::info!(num_docs = meta.num_docs, num_terms = inverted.len(), root = %paths.root.display(), "loaded index");
    Ok(IndexSnapshot { meta, inverted, documents })
}
