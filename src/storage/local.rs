//! Local filesystem storage.
//!
//! Every pipeline file is a JSON document under a single root directory,
//! which is also the git working tree that gets published.
//!
//! ## Storage Layout
//!
//! ```text
//! {root}/
//! ├── counter.json          # Next record id
//! ├── out.json              # Raw offers from the last extract
//! ├── post.json             # All normalized products so far
//! ├── saved.json            # Append-only published dataset
//! ├── sqlite.db             # Relational copy
//! └── sqlite.json           # Export of the products table
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::Product;
use crate::storage::ProductSink;

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root_dir
    }

    /// Get the full path for a relative key.
    pub fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    pub async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path(key);
        self.ensure_dir(&path).await?;

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    /// Write JSON data, pretty printed with 4-space indentation.
    pub async fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let mut bytes = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut bytes, formatter);
        value.serialize(&mut serializer)?;
        self.write_bytes(key, &bytes).await
    }

    /// Read bytes, returning None if file doesn't exist.
    pub async fn read_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Read JSON data, returning None if the file doesn't exist.
    pub async fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.read_bytes(key).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }
}

/// The append-only JSON dataset that gets published.
#[derive(Debug, Clone)]
pub struct DatasetFile {
    storage: LocalStorage,
    key: String,
}

impl DatasetFile {
    pub fn new(storage: LocalStorage, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Load every record in the dataset.
    pub async fn load(&self) -> Result<Vec<Product>> {
        Ok(self.storage.read_json(&self.key).await?.unwrap_or_default())
    }
}

#[async_trait]
impl ProductSink for DatasetFile {
    fn name(&self) -> &str {
        "dataset file"
    }

    /// Append records whose id is not in the dataset yet.
    ///
    /// A dataset that exists but cannot be parsed is an error; it is never
    /// overwritten.
    async fn persist(&self, products: &[Product]) -> Result<usize> {
        let mut existing = self.load().await?;
        let mut known: HashSet<u64> = existing.iter().map(|p| p.id).collect();

        let before = existing.len();
        for product in products {
            if known.insert(product.id) {
                existing.push(product.clone());
            }
        }
        let appended = existing.len() - before;

        self.storage.write_json(&self.key, &existing).await?;
        log::info!(
            "Dataset: {} appended, {} total in {}",
            appended,
            existing.len(),
            self.key
        );
        Ok(appended)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn product(id: u64, title: &str) -> Product {
        Product {
            id,
            title: title.to_string(),
            price: 58990,
            currency: "HUF".to_string(),
            availability: "http://schema.org/InStock".to_string(),
            rating: Some(4.5),
            reviews_count: 12,
            store_name: "Bolt".to_string(),
            link: format!("https://example.com/jump/{id}"),
            timestamp: "2024-11-20T10:00:00.000000".to_string(),
        }
    }

    #[tokio::test]
    async fn test_write_and_read() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        storage.write_bytes("test.txt", b"hello").await.unwrap();
        let data = storage.read_bytes("test.txt").await.unwrap();
        assert_eq!(data, Some(b"hello".to_vec()));
        assert!(!storage.path("test.tmp").exists());
    }

    #[tokio::test]
    async fn test_read_nonexistent() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        let data = storage.read_bytes("nope.txt").await.unwrap();
        assert!(data.is_none());
        let json: Option<Vec<Product>> = storage.read_json("nope.json").await.unwrap();
        assert!(json.is_none());
    }

    #[tokio::test]
    async fn test_json_keeps_non_ascii_and_indent() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        storage
            .write_json("data.json", &vec!["vélemény"])
            .await
            .unwrap();
        let text = std::fs::read_to_string(storage.path("data.json")).unwrap();
        assert_eq!(text, "[\n    \"vélemény\"\n]");
    }

    #[tokio::test]
    async fn test_dataset_appends_only_unknown_ids() {
        let tmp = TempDir::new().unwrap();
        let dataset = DatasetFile::new(LocalStorage::new(tmp.path()), "saved.json");

        let appended = dataset
            .persist(&[product(1, "first"), product(2, "second")])
            .await
            .unwrap();
        assert_eq!(appended, 2);

        let appended = dataset
            .persist(&[product(2, "second again"), product(3, "third")])
            .await
            .unwrap();
        assert_eq!(appended, 1);

        let all = dataset.load().await.unwrap();
        let ids: Vec<u64> = all.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(all[1].title, "second");
    }

    #[tokio::test]
    async fn test_dataset_refuses_to_overwrite_corrupt_file() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        storage.write_bytes("saved.json", b"{ not json").await.unwrap();

        let dataset = DatasetFile::new(storage.clone(), "saved.json");
        assert!(dataset.persist(&[product(1, "first")]).await.is_err());

        let raw = storage.read_bytes("saved.json").await.unwrap().unwrap();
        assert_eq!(raw, b"{ not json".to_vec());
    }
}
