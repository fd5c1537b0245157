use std::path::Path;
use std::sync::Arc;

use redb::backends::InMemoryBackend;
use redb::{Database, ReadableTable, TableDefinition};
use tracing::debug;

use crate::error::KVError;
use crate::traits::KVStore;

const TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("kv");

/// RedbStore is a KVStore implementation backed by redb, a pure-Rust embedded
/// key-value database.
///
/// redb serializes write transactions, so a read followed by a write inside one
/// transaction is atomic. `compare_and_swap` relies on that.
pub struct RedbStore {
    db: Arc<Database>,
}

impl RedbStore {
    /// Open or create a redb database at the given path.
    pub fn open(path: &Path) -> Result<Self, KVError> {
        let db = Database::create(path).map_err(KVError::storage)?;
        debug!("opened redb store at {}", path.display());
        Self::init(db)
    }

    /// Create a store that lives only in memory. Used by tests.
    pub fn open_in_memory() -> Result<Self, KVError> {
        let db = Database::builder()
            .create_with_backend(InMemoryBackend::new())
            .map_err(KVError::storage)?;
        Self::init(db)
    }

    fn init(db: Database) -> Result<Self, KVError> {
        // Ensure the table exists by doing a write transaction.
        let write_txn = db.begin_write().map_err(KVError::storage)?;
        {
            let _table = write_txn.open_table(TABLE).map_err(KVError::storage)?;
        }
        write_txn.commit().map_err(KVError::storage)?;

        Ok(Self { db: Arc::new(db) })
    }
}

impl KVStore for RedbStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KVError> {
        let read_txn = self.db.begin_read().map_err(KVError::storage)?;
        let table = read_txn.open_table(TABLE).map_err(KVError::storage)?;

        match table.get(key) {
            Ok(Some(val)) => Ok(Some(val.value().to_vec())),
            Ok(None) => Ok(None),
            Err(e) => Err(KVError::storage(e)),
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), KVError> {
        let write_txn = self.db.begin_write().map_err(KVError::storage)?;
        {
            let mut table = write_txn.open_table(TABLE).map_err(KVError::storage)?;
            table.insert(key, value).map_err(KVError::storage)?;
        }
        write_txn.commit().map_err(KVError::storage)?;
        Ok(())
    }

    fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<&[u8]>,
        value: &[u8],
    ) -> Result<bool, KVError> {
        let write_txn = self.db.begin_write().map_err(KVError::storage)?;
        {
            let mut table = write_txn.open_table(TABLE).map_err(KVError::storage)?;
            let current = table
                .get(key)
                .map_err(KVError::storage)?
                .map(|guard| guard.value().to_vec());

            if current.as_deref() != expected {
                // Dropping the uncommitted transaction aborts it.
                debug!(key, "compare_and_swap rejected: stored value changed");
                return Ok(false);
            }

            table.insert(key, value).map_err(KVError::storage)?;
        }
        write_txn.commit().map_err(KVError::storage)?;
        Ok(true)
    }

    fn delete(&self, key: &str) -> Result<Option<Vec<u8>>, KVError> {
        let write_txn = self.db.begin_write().map_err(KVError::storage)?;
        let removed = {
            let mut table = write_txn.open_table(TABLE).map_err(KVError::storage)?;
            let removed = table
                .remove(key)
                .map_err(KVError::storage)?
                .map(|guard| guard.value().to_vec());
            removed
        };
        write_txn.commit().map_err(KVError::storage)?;
        Ok(removed)
    }

    fn scan(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, KVError> {
        let read_txn = self.db.begin_read().map_err(KVError::storage)?;
        let table = read_txn.open_table(TABLE).map_err(KVError::storage)?;

        let mut results = Vec::new();
        let iter = table.range(prefix..).map_err(KVError::storage)?;

        for entry in iter {
            let entry = entry.map_err(KVError::storage)?;
            let key = entry.0.value().to_string();
            if !key.starts_with(prefix) {
                break;
            }
            let value = entry.1.value().to_vec();
            results.push((key, value));
        }

        Ok(results)
    }
}
