//! # Storage Module
//!
//! The local upload buffer for stream data.
//!
//! Two implementations share the [`StreamBuffer`] trait:
//! - [`MemoryBuffer`]: BTreeMap-backed, for tests and short-lived tools.
//! - [`RedbBuffer`]: redb embedded database, crash-safe (copy-on-write
//!   B-trees, ACID transactions) with keys that keep increasing across
//!   restarts.

mod redb_buffer;

pub use redb_buffer::RedbBuffer;

use crate::error::Result;
use crate::stream::StreamRecord;
use std::collections::BTreeMap;

/// An ordered buffer of records waiting to be uploaded.
///
/// Keys are assigned on append and never reused, so key order is arrival
/// order.
pub trait StreamBuffer {
    /// Buffer a record and return its key.
    fn append(&mut self, record: &StreamRecord) -> Result<u64>;

    /// Up to `limit` records of `account`, oldest first.
    fn pending(&self, account: &str, limit: usize) -> Result<Vec<(u64, StreamRecord)>>;

    /// Remove records by key. Unknown keys are ignored. Returns how many
    /// records were removed.
    fn remove(&mut self, keys: &[u64]) -> Result<usize>;

    /// Total number of buffered records.
    fn len(&self) -> Result<usize>;

    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Drop stored entries that can no longer be decoded. Returns how many
    /// were dropped.
    fn purge_unreadable(&mut self) -> Result<usize> {
        Ok(0)
    }

    /// Number of buffered records per account.
    fn accounts(&self) -> Result<BTreeMap<String, usize>>;
}

// =============================================================================
// MEMORY BUFFER
// =============================================================================

/// In-memory buffer.
#[derive(Debug, Clone, Default)]
pub struct MemoryBuffer {
    records: BTreeMap<u64, StreamRecord>,
    next_key: u64,
}

impl MemoryBuffer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StreamBuffer for MemoryBuffer {
    fn append(&mut self, record: &StreamRecord) -> Result<u64> {
        let key = self.next_key;
        self.next_key = self.next_key.saturating_add(1);
        self.records.insert(key, record.clone());
        Ok(key)
    }

    fn pending(&self, account: &str, limit: usize) -> Result<Vec<(u64, StreamRecord)>> {
        Ok(self
            .records
            .iter()
            .filter(|(_, record)| record.account == account)
            .take(limit)
            .map(|(key, record)| (*key, record.clone()))
            .collect())
    }

    fn remove(&mut self, keys: &[u64]) -> Result<usize> {
        Ok(keys
            .iter()
            .filter(|key| self.records.remove(*key).is_some())
            .count())
    }

    fn len(&self) -> Result<usize> {
        Ok(self.records.len())
    }

    fn accounts(&self) -> Result<BTreeMap<String, usize>> {
        let mut counts = BTreeMap::new();
        for record in self.records.values() {
            *counts.entry(record.account.clone()).or_insert(0) += 1;
        }
        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::StreamId;

    fn record(id: &str, account: &str) -> StreamRecord {
        StreamRecord::new(
            id,
            StreamId::new("omh", "step-count", "1.0"),
            account,
            "2024-05-01T10:00:00Z",
            "{}",
        )
    }

    #[test]
    fn pending_is_per_account_and_ordered() {
        let mut buffer = MemoryBuffer::new();
        for (id, account) in [("p1", "alice"), ("p2", "bob"), ("p3", "alice"), ("p4", "alice")] {
            buffer.append(&record(id, account)).expect("append");
        }

        let pending = buffer.pending("alice", 2).expect("pending");
        let ids: Vec<_> = pending.iter().map(|(_, r)| r.point_id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p3"]);
        assert!(buffer.pending("carol", 10).expect("pending").is_empty());
        assert!(buffer.pending("alice", 0).expect("pending").is_empty());
    }

    #[test]
    fn remove_ignores_unknown_keys() {
        let mut buffer = MemoryBuffer::new();
        let a = buffer.append(&record("p1", "alice")).expect("append");
        let b = buffer.append(&record("p2", "alice")).expect("append");

        assert_eq!(buffer.remove(&[a, 99]).expect("remove"), 1);
        assert_eq!(buffer.len().expect("len"), 1);
        assert_eq!(buffer.remove(&[a]).expect("remove"), 0);
        assert_eq!(buffer.remove(&[b]).expect("remove"), 1);
        assert!(buffer.is_empty().expect("is_empty"));
    }

    #[test]
    fn keys_are_not_reused() {
        let mut buffer = MemoryBuffer::new();
        let a = buffer.append(&record("p1", "alice")).expect("append");
        buffer.remove(&[a]).expect("remove");
        let b = buffer.append(&record("p2", "alice")).expect("append");
        assert!(b > a);
    }

    #[test]
    fn accounts_counts_records() {
        let mut buffer = MemoryBuffer::new();
        buffer.append(&record("p1", "alice")).expect("append");
        buffer.append(&record("p2", "bob")).expect("append");
        buffer.append(&record("p3", "alice")).expect("append");

        let counts = buffer.accounts().expect("accounts");
        assert_eq!(counts.get("alice"), Some(&2));
        assert_eq!(counts.get("bob"), Some(&1));
    }
}
