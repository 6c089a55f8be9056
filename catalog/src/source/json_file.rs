//! Batch source reading raw record dumps from a directory.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::error::{CatalogError, CatalogResult};
use crate::source::{BatchSource, RawBatch};

/// Reads `*.json` files from a directory in lexicographic order, one batch
/// per file. Each file holds a JSON array of raw records (a single object is
/// accepted as a one-record batch).
#[derive(Debug)]
pub struct JsonDirSource {
    files: VecDeque<PathBuf>,
}

impl JsonDirSource {
    pub fn new(dir: impl AsRef<Path>) -> CatalogResult<JsonDirSource> {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir.as_ref())? {
            let path = entry?.path();
            if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some("json") {
                files.push(path);
            }
        }
        files.sort();
        debug!(count = files.len(), dir = %dir.as_ref().display(), "discovered batch files");
        Ok(JsonDirSource {
            files: files.into(),
        })
    }
}

impl BatchSource for JsonDirSource {
    async fn next_batch(&mut self) -> CatalogResult<Option<RawBatch>> {
        let Some(path) = self.files.pop_front() else {
            return Ok(None);
        };
        let label = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("batch")
            .to_string();

        let contents = tokio::fs::read_to_string(&path)
            .await
            .map_err(|error| CatalogError::from(error).in_batch(label.as_str(), 0))?;
        let parsed: Value = serde_json::from_str(&contents)
            .map_err(|error| CatalogError::from(error).in_batch(label.as_str(), 0))?;

        let records = match parsed {
            Value::Array(records) => records,
            other => vec![other],
        };

        Ok(Some(RawBatch { label, records }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn write_file(dir: &Path, name: &str, contents: &str) {
        tokio::fs::write(dir.join(name), contents).await.unwrap();
    }

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("catalog-src-{name}-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[tokio::test]
    async fn yields_files_in_lexicographic_order() {
        let dir = temp_dir("order");
        write_file(&dir, "2016.json", r#"[{"id": "b"}]"#).await;
        write_file(&dir, "2015.json", r#"[{"id": "a"}]"#).await;
        write_file(&dir, "notes.txt", "ignored").await;

        let mut source = JsonDirSource::new(&dir).unwrap();
        let first = source.next_batch().await.unwrap().unwrap();
        assert_eq!(first.label, "2015");
        assert_eq!(first.records.len(), 1);
        let second = source.next_batch().await.unwrap().unwrap();
        assert_eq!(second.label, "2016");
        assert!(source.next_batch().await.unwrap().is_none());
        let _ = tokio::fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn single_object_file_is_a_one_record_batch() {
        let dir = temp_dir("single");
        write_file(&dir, "one.json", r#"{"id": "x"}"#).await;

        let mut source = JsonDirSource::new(&dir).unwrap();
        let batch = source.next_batch().await.unwrap().unwrap();
        assert_eq!(batch.records.len(), 1);
        let _ = tokio::fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn malformed_file_reports_its_batch_label() {
        let dir = temp_dir("bad");
        write_file(&dir, "broken.json", "not json").await;

        let mut source = JsonDirSource::new(&dir).unwrap();
        let error = source.next_batch().await.unwrap_err();
        assert!(error.to_string().contains("broken"));
        let _ = tokio::fs::remove_dir_all(&dir).await;
    }
}
