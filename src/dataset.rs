//! Corpus and query file formats.
//!
//! A corpus file is a JSON array of [`Item`] records. A query file is
//! `{"queries": [...], "metadata": {...}, "count": N}`; a bare JSON array of
//! strings is accepted on load for older files.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{BenchError, Result};

/// One corpus record. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: u64,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
    /// Any other top-level fields, carried through to the payload untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Item {
    /// Text fed to the embedding model: `"{title} {description}"`.
    pub fn embedding_text(&self) -> String {
        format!("{} {}", self.title, self.description)
    }

    /// The full record as a JSON object, stored alongside the vector.
    pub fn payload(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

pub fn load_corpus(path: impl AsRef<Path>) -> Result<Vec<Item>> {
    let path = path.as_ref();
    let data = std::fs::read(path)?;
    let items: Vec<Item> = serde_json::from_slice(&data)?;
    info!(path = %path.display(), items = items.len(), "loaded corpus");
    Ok(items)
}

pub fn save_corpus(path: impl AsRef<Path>, items: &[Item]) -> Result<()> {
    let path = path.as_ref();
    write_json(path, &items)?;
    info!(path = %path.display(), items = items.len(), "saved corpus");
    Ok(())
}

/// Persisted query set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryFile {
    pub queries: Vec<String>,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub count: usize,
}

impl QueryFile {
    pub fn new(queries: Vec<String>, metadata: serde_json::Map<String, serde_json::Value>) -> Self {
        let count = queries.len();
        Self {
            queries,
            metadata,
            count,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum QueryFileFormat {
    Current(QueryFile),
    Legacy(Vec<String>),
}

pub fn load_queries(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = path.as_ref();
    let data = std::fs::read(path)?;
    let queries = parse_queries(&data)?;
    info!(path = %path.display(), count = queries.len(), "loaded queries");
    Ok(queries)
}

fn parse_queries(data: &[u8]) -> Result<Vec<String>> {
    match serde_json::from_slice::<QueryFileFormat>(data) {
        Ok(QueryFileFormat::Current(file)) => Ok(file.queries),
        Ok(QueryFileFormat::Legacy(queries)) => Ok(queries),
        Err(e) => Err(BenchError::Validation(format!(
            "invalid query file format: {e}"
        ))),
    }
}

pub fn save_queries(path: impl AsRef<Path>, file: &QueryFile) -> Result<()> {
    let path = path.as_ref();
    write_json(path, file)?;
    info!(path = %path.display(), count = file.count, "saved queries");
    Ok(())
}

/// Pretty-print `value` to `path`, creating parent directories.
pub(crate) fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_vec_pretty(value)?;
    std::fs::write(path, json)?;
    Ok(())
}
