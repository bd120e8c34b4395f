// src/pipeline/status.rs

//! Snapshot of the working tree for the `info` command.

use serde_json::Value;

use crate::models::Config;
use crate::storage::{IdCounter, LocalStorage, SqliteStore};

/// Record counts of each pipeline file. `None` means missing or unreadable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub next_id: u64,
    pub extracted: Option<usize>,
    pub transformed: Option<usize>,
    pub dataset: Option<usize>,
    pub database: Option<usize>,
}

impl Status {
    /// Rows for `console::summary`.
    pub fn items(&self) -> Vec<(&'static str, String)> {
        fn show(n: Option<usize>) -> String {
            n.map_or_else(|| "-".to_string(), |n| n.to_string())
        }
        vec![
            ("Next record id", self.next_id.to_string()),
            ("Extracted", show(self.extracted)),
            ("Transformed", show(self.transformed)),
            ("Dataset", show(self.dataset)),
            ("Database", show(self.database)),
        ]
    }
}

pub async fn collect_status(config: &Config, storage: &LocalStorage) -> Status {
    let counter = IdCounter::load(storage, &config.paths.counter_file).await;

    let db_path = storage.path(&config.paths.database_file);
    let database = if db_path.exists() {
        SqliteStore::new(db_path)
            .count()
            .map_err(|e| log::warn!("Cannot read database: {}", e))
            .ok()
    } else {
        None
    };

    Status {
        next_id: counter.peek(),
        extracted: array_len(storage, &config.paths.extract_file).await,
        transformed: array_len(storage, &config.paths.transform_file).await,
        dataset: array_len(storage, &config.paths.dataset_file).await,
        database,
    }
}

async fn array_len(storage: &LocalStorage, key: &str) -> Option<usize> {
    match storage.read_json::<Vec<Value>>(key).await {
        Ok(records) => records.map(|r| r.len()),
        Err(e) => {
            log::warn!("Cannot read {}: {}", key, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_status_of_fresh_tree() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.paths.root = tmp.path().to_path_buf();
        let storage = LocalStorage::new(tmp.path());

        let status = collect_status(&config, &storage).await;
        assert_eq!(
            status,
            Status {
                next_id: 1,
                extracted: None,
                transformed: None,
                dataset: None,
                database: None,
            }
        );
        assert!(!storage.path("sqlite.db").exists());
    }

    #[tokio::test]
    async fn test_status_counts_records() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.paths.root = tmp.path().to_path_buf();
        let storage = LocalStorage::new(tmp.path());

        IdCounter::starting_at("counter.json", 42).save(&storage).await.unwrap();
        storage.write_json("out.json", &serde_json::json!([{}, {}])).await.unwrap();
        storage.write_bytes("saved.json", b"{ broken").await.unwrap();

        let status = collect_status(&config, &storage).await;
        assert_eq!(status.next_id, 42);
        assert_eq!(status.extracted, Some(2));
        assert_eq!(status.dataset, None);
        assert_eq!(status.items()[1], ("Extracted", "2".to_string()));
    }
}
