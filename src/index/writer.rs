use crate::index::schema::Schema;
use crate::index::types::*;
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Duration;

pub const META_FILE: &str = "meta.json";
pub const DOCS_FILE: &str = "docs.json";
pub const POSTINGS_FILE: &str = "postings.json";

/// Field -> term -> ascending doc ids
pub type Postings = BTreeMap<String, BTreeMap<String, Vec<DocId>>>;

/// Index writer for building one generation of a dataset's index
pub struct IndexWriter<'a> {
    cache_key: CacheKey,
    schema: &'a Schema,
    expire: Duration,
    /// Stored fields of every document, in insertion order
    documents: Vec<Document>,
    postings: Postings,
}

impl<'a> IndexWriter<'a> {
    pub fn new(cache_key: CacheKey, schema: &'a Schema, expire: Duration) -> Self {
        Self {
            cache_key,
            schema,
            expire,
            documents: Vec::new(),
            postings: BTreeMap::new(),
        }
    }

    /// Add one extracted document; returns its doc id
    pub fn add_document(&mut self, doc: &Document) -> DocId {
        let doc_id = self.documents.len() as DocId;

        let mut stored = Document::new();
        for field in self.schema.fields() {
            let Some(value) = doc.get(&field.name) else {
                continue;
            };

            if field.stored {
                stored.insert(field.name.clone(), value);
            }

            if !field.is_indexed() {
                continue;
            }

            let field_postings = self.postings.entry(field.name.clone()).or_default();
            for term in field.index_terms(value) {
                field_postings.entry(term).or_default().push(doc_id);
            }
        }

        self.documents.push(stored);
        doc_id
    }

    /// Write the generation into `dir`, which must not exist yet
    pub fn write(self, dir: &Path) -> Result<IndexMeta> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;

        write_json(&dir.join(DOCS_FILE), &self.documents)?;
        write_json(&dir.join(POSTINGS_FILE), &self.postings)?;

        let meta = IndexMeta {
            version: INDEX_VERSION,
            cache_key: self.cache_key,
            doc_count: self.documents.len() as u32,
            built_at: unix_now(),
            expire_secs: self.expire.as_secs(),
            fields: self.schema.field_names(),
        };

        // meta.json goes last: a directory without it is never treated as an index
        write_json(&dir.join(META_FILE), &meta)?;

        Ok(meta)
    }
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, value)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    writer.flush()?;
    Ok(())
}
