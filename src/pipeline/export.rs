// src/pipeline/export.rs

use crate::error::Result;
use crate::models::Config;
use crate::storage::{LocalStorage, SqliteStore};
use crate::utils::console;

/// Dump the products table to the export file. Returns the row count.
pub async fn run_export(config: &Config, storage: &LocalStorage) -> Result<usize> {
    console::header("Export");

    let db_path = storage.path(&config.paths.database_file);
    if !db_path.exists() {
        log::warn!("Database {} does not exist yet, exporting an empty list", db_path.display());
    }

    let rows = SqliteStore::new(db_path).export_all()?;
    storage.write_json(&config.paths.export_file, &rows).await?;

    console::sub_item(&format!(
        "{} rows exported to {}",
        rows.len(),
        config.paths.export_file
    ));
    Ok(rows.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Product;
    use tempfile::TempDir;

    fn product(id: u64, rating: Option<f64>) -> Product {
        Product {
            id,
            title: format!("Tablet {id}"),
            price: 100 * id as i64,
            currency: "HUF".to_string(),
            availability: "http://schema.org/InStock".to_string(),
            rating,
            reviews_count: id,
            store_name: "Bolt".to_string(),
            link: format!("https://example.com/jump/{id}"),
            timestamp: "2024-11-20T10:00:00.000000".to_string(),
        }
    }

    #[tokio::test]
    async fn test_export_dumps_rows_in_id_order() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.paths.root = tmp.path().to_path_buf();
        let storage = LocalStorage::new(tmp.path());

        SqliteStore::new(storage.path("sqlite.db"))
            .insert(&[product(2, None), product(1, Some(4.5))])
            .unwrap();

        assert_eq!(run_export(&config, &storage).await.unwrap(), 2);

        let rows: Vec<Product> = storage.read_json("sqlite.json").await.unwrap().unwrap();
        assert_eq!(rows, vec![product(1, Some(4.5)), product(2, None)]);

        let raw: serde_json::Value = storage.read_json("sqlite.json").await.unwrap().unwrap();
        assert_eq!(raw[1]["rating"], "N/A");
    }

    #[tokio::test]
    async fn test_export_without_database_writes_empty_list() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.paths.root = tmp.path().to_path_buf();
        let storage = LocalStorage::new(tmp.path());

        assert_eq!(run_export(&config, &storage).await.unwrap(), 0);
        let rows: Vec<Product> = storage.read_json("sqlite.json").await.unwrap().unwrap();
        assert!(rows.is_empty());
    }
}
