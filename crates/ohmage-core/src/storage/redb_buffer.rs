//! redb-backed stream buffer.
//!
//! Tables:
//! - `stream_records`: key (u64) -> encoded record (see [`crate::formats`])
//! - `buffer_meta`: `"next_key"` -> next key to assign
//!
//! Every operation runs in its own transaction; a crash between append and
//! commit loses only the uncommitted record.

use super::StreamBuffer;
use crate::error::{CoreError, Result};
use crate::formats::{decode_record, encode_record};
use crate::stream::StreamRecord;
use redb::{Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition};
use std::collections::BTreeMap;
use std::path::Path;

const RECORDS: TableDefinition<u64, &[u8]> = TableDefinition::new("stream_records");
const META: TableDefinition<&str, u64> = TableDefinition::new("buffer_meta");
const NEXT_KEY: &str = "next_key";

/// Disk-backed buffer using redb.
pub struct RedbBuffer {
    db: Database,
}

impl std::fmt::Debug for RedbBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbBuffer").finish_non_exhaustive()
    }
}

impl RedbBuffer {
    /// Open (or create) the buffer file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = Database::create(path.as_ref()).map_err(CoreError::storage)?;

        // Create both tables up front so read transactions never miss them.
        let txn = db.begin_write().map_err(CoreError::storage)?;
        {
            txn.open_table(RECORDS).map_err(CoreError::storage)?;
            txn.open_table(META).map_err(CoreError::storage)?;
        }
        txn.commit().map_err(CoreError::storage)?;

        Ok(Self { db })
    }

    /// Visit decodable records in key order until `visit` returns false.
    /// Records that fail to decode are skipped; see [`Self::unreadable_keys`].
    fn for_each_record(&self, mut visit: impl FnMut(u64, StreamRecord) -> bool) -> Result<()> {
        let txn = self.db.begin_read().map_err(CoreError::storage)?;
        let table = txn.open_table(RECORDS).map_err(CoreError::storage)?;
        for entry in table.iter().map_err(CoreError::storage)? {
            let (key, value) = entry.map_err(CoreError::storage)?;
            let Ok(record) = decode_record(value.value()) else {
                continue;
            };
            if !visit(key.value(), record) {
                break;
            }
        }
        Ok(())
    }

    /// Keys of stored entries that no longer decode (foreign bytes or an
    /// unsupported format version).
    pub fn unreadable_keys(&self) -> Result<Vec<u64>> {
        let txn = self.db.begin_read().map_err(CoreError::storage)?;
        let table = txn.open_table(RECORDS).map_err(CoreError::storage)?;
        let mut keys = Vec::new();
        for entry in table.iter().map_err(CoreError::storage)? {
            let (key, value) = entry.map_err(CoreError::storage)?;
            if decode_record(value.value()).is_err() {
                keys.push(key.value());
            }
        }
        Ok(keys)
    }
}

impl StreamBuffer for RedbBuffer {
    fn append(&mut self, record: &StreamRecord) -> Result<u64> {
        let bytes = encode_record(record)?;

        let txn = self.db.begin_write().map_err(CoreError::storage)?;
        let key = {
            let mut meta = txn.open_table(META).map_err(CoreError::storage)?;
            let key = meta
                .get(NEXT_KEY)
                .map_err(CoreError::storage)?
                .map(|guard| guard.value())
                .unwrap_or(0);
            meta.insert(NEXT_KEY, key.saturating_add(1))
                .map_err(CoreError::storage)?;

            let mut records = txn.open_table(RECORDS).map_err(CoreError::storage)?;
            records
                .insert(key, bytes.as_slice())
                .map_err(CoreError::storage)?;
            key
        };
        txn.commit().map_err(CoreError::storage)?;

        Ok(key)
    }

    fn pending(&self, account: &str, limit: usize) -> Result<Vec<(u64, StreamRecord)>> {
        let mut found = Vec::new();
        if limit == 0 {
            return Ok(found);
        }
        self.for_each_record(|key, record| {
            if record.account == account {
                found.push((key, record));
            }
            found.len() < limit
        })?;
        Ok(found)
    }

    fn remove(&mut self, keys: &[u64]) -> Result<usize> {
        let txn = self.db.begin_write().map_err(CoreError::storage)?;
        let mut removed = 0;
        {
            let mut records = txn.open_table(RECORDS).map_err(CoreError::storage)?;
            for key in keys {
                if records.remove(*key).map_err(CoreError::storage)?.is_some() {
                    removed += 1;
                }
            }
        }
        txn.commit().map_err(CoreError::storage)?;
        Ok(removed)
    }

    fn len(&self) -> Result<usize> {
        let txn = self.db.begin_read().map_err(CoreError::storage)?;
        let table = txn.open_table(RECORDS).map_err(CoreError::storage)?;
        let len = table.len().map_err(CoreError::storage)?;
        Ok(len as usize)
    }

    fn purge_unreadable(&mut self) -> Result<usize> {
        let keys = self.unreadable_keys()?;
        if keys.is_empty() {
            return Ok(0);
        }
        self.remove(&keys)
    }

    fn accounts(&self) -> Result<BTreeMap<String, usize>> {
        let mut counts = BTreeMap::new();
        self.for_each_record(|_, record| {
            *counts.entry(record.account).or_insert(0) += 1;
            true
        })?;
        Ok(counts)
    }
}
