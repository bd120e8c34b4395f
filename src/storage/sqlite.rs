//! SQLite copy of the normalized products.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use rusqlite::{Connection, params};

use crate::error::Result;
use crate::models::Product;
use crate::storage::ProductSink;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS products (
        id            INTEGER PRIMARY KEY,
        title         TEXT,
        price         INTEGER,
        currency      TEXT,
        availability  TEXT,
        rating        REAL,
        reviews_count INTEGER,
        store_name    TEXT,
        link          TEXT,
        timestamp     TEXT
    );
";

/// Products table keyed by record id.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    path: PathBuf,
}

impl SqliteStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open the database and make sure the schema exists.
    fn connect(&self) -> Result<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(conn)
    }

    /// Insert products, ignoring ids that already have a row.
    ///
    /// Returns the number of rows actually inserted.
    pub fn insert(&self, products: &[Product]) -> Result<usize> {
        let conn = self.connect()?;
        let tx = conn.unchecked_transaction()?;
        let mut count = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO products
                 (id, title, price, currency, availability, rating, reviews_count, store_name, link, timestamp)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            )?;
            for p in products {
                count += stmt.execute(params![
                    p.id as i64,
                    p.title,
                    p.price,
                    p.currency,
                    p.availability,
                    p.rating,
                    p.reviews_count as i64,
                    p.store_name,
                    p.link,
                    p.timestamp,
                ])?;
            }
        }
        tx.commit()?;
        Ok(count)
    }

    /// Every row, ordered by id.
    pub fn export_all(&self) -> Result<Vec<Product>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT id, title, price, currency, availability, rating, reviews_count, store_name, link, timestamp
             FROM products ORDER BY id",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(Product {
                    id: row.get::<_, i64>(0)? as u64,
                    title: row.get(1)?,
                    price: row.get(2)?,
                    currency: row.get(3)?,
                    availability: row.get(4)?,
                    rating: row.get(5)?,
                    reviews_count: row.get::<_, i64>(6)? as u64,
                    store_name: row.get(7)?,
                    link: row.get(8)?,
                    timestamp: row.get(9)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Number of stored rows.
    pub fn count(&self) -> Result<usize> {
        let conn = self.connect()?;
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM products", [], |row| row.get(0))?;
        Ok(n as usize)
    }
}

#[async_trait]
impl ProductSink for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn persist(&self, products: &[Product]) -> Result<usize> {
        let inserted = self.insert(products)?;
        log::info!(
            "SQLite: {} of {} records inserted into {}",
            inserted,
            products.len(),
            self.path.display()
        );
        Ok(inserted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn product(id: u64, rating: Option<f64>) -> Product {
        Product {
            id,
            title: format!("Offer {id}"),
            price: 123456,
            currency: "HUF".to_string(),
            availability: "http://schema.org/InStock".to_string(),
            rating,
            reviews_count: 3,
            store_name: "Bolt".to_string(),
            link: format!("https://example.com/jump/{id}"),
            timestamp: "2024-11-20T10:00:00.000000".to_string(),
        }
    }

    #[test]
    fn test_insert_and_export() {
        let tmp = TempDir::new().unwrap();
        let store = SqliteStore::new(tmp.path().join("sqlite.db"));

        let inserted = store
            .insert(&[product(2, Some(4.5)), product(1, None)])
            .unwrap();
        assert_eq!(inserted, 2);

        let rows = store.export_all().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], product(1, None));
        assert_eq!(rows[1], product(2, Some(4.5)));
    }

    #[test]
    fn test_existing_ids_are_ignored() {
        let tmp = TempDir::new().unwrap();
        let store = SqliteStore::new(tmp.path().join("sqlite.db"));

        store.insert(&[product(1, None)]).unwrap();
        let inserted = store.insert(&[product(1, Some(5.0)), product(2, None)]).unwrap();

        assert_eq!(inserted, 1);
        assert_eq!(store.count().unwrap(), 2);
        assert_eq!(store.export_all().unwrap()[0].rating, None);
    }

    #[tokio::test]
    async fn test_persist_through_sink() {
        let tmp = TempDir::new().unwrap();
        let store = SqliteStore::new(tmp.path().join("sqlite.db"));

        let sink: &dyn ProductSink = &store;
        assert_eq!(sink.persist(&[product(9, None)]).await.unwrap(), 1);
        assert_eq!(store.count().unwrap(), 1);
    }
}
