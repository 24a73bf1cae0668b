//! # Stream Module
//!
//! Stream data collected on the device and buffered until it is uploaded.
//!
//! A stream is identified by namespace, name and version (the schema of its
//! payloads). Records are immutable once buffered: producers assign the
//! point id and creation time, and the sync layer either uploads a record
//! or drops it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a data stream.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StreamId {
    pub namespace: String,
    pub name: String,
    pub version: String,
}

impl StreamId {
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.namespace, self.name, self.version)
    }
}

/// One buffered data point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamRecord {
    /// Globally unique id of the data point (used for duplicate detection).
    pub point_id: String,
    pub stream: StreamId,
    /// Account the point belongs to.
    pub account: String,
    /// RFC 3339 creation time.
    pub created_at: String,
    /// Payload body as JSON text.
    pub payload: String,
}

impl StreamRecord {
    pub fn new(
        point_id: impl Into<String>,
        stream: StreamId,
        account: impl Into<String>,
        created_at: impl Into<String>,
        payload: impl Into<String>,
    ) -> Self {
        Self {
            point_id: point_id.into(),
            stream,
            account: account.into(),
            created_at: created_at.into(),
            payload: payload.into(),
        }
    }
}
