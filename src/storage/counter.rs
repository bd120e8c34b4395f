//! Persistent record id counter.
//!
//! Stored as `{"counter": N}` where `N` is the id the next scraped record
//! receives. Ids only move forward. The counter is saved after extraction,
//! so a crash between assigning ids and saving hands the same ids out again
//! on the next run.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::storage::LocalStorage;

/// First id handed out when no counter file exists.
pub const FIRST_ID: u64 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct CounterFile {
    #[serde(default = "first_id")]
    counter: u64,
}

fn first_id() -> u64 {
    FIRST_ID
}

/// Auto-incrementing id source backed by a JSON file.
#[derive(Debug, Clone)]
pub struct IdCounter {
    key: String,
    next: u64,
}

impl IdCounter {
    /// Load the counter, starting at [`FIRST_ID`] if the file is missing or
    /// unreadable.
    pub async fn load(storage: &LocalStorage, key: &str) -> Self {
        let next = match storage.read_json::<CounterFile>(key).await {
            Ok(Some(file)) => file.counter,
            Ok(None) => FIRST_ID,
            Err(e) => {
                log::warn!("Counter file {} is unreadable ({}), starting at {}", key, e, FIRST_ID);
                FIRST_ID
            }
        };

        Self {
            key: key.to_string(),
            next,
        }
    }

    /// Counter starting at an explicit value, not tied to any stored state.
    pub fn starting_at(key: impl Into<String>, next: u64) -> Self {
        Self {
            key: key.into(),
            next,
        }
    }

    /// Hand out the current id and advance by one.
    pub fn assign(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// The id the next record will receive.
    pub fn peek(&self) -> u64 {
        self.next
    }

    /// Persist the counter.
    pub async fn save(&self, storage: &LocalStorage) -> Result<()> {
        storage
            .write_json(&self.key, &CounterFile { counter: self.next })
            .await
    }
}
