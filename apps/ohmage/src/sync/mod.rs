//! # Sync Module
//!
//! Best-effort upload of buffered stream data to a DSU (data storage unit).
//!
//! ```text
//! ┌──────────────┐  pending()   ┌─────────────┐  POST /dataPoints  ┌──────────┐
//! │ StreamBuffer │ ───────────► │ SyncAdapter │ ─────────────────► │   DSU    │
//! │ (redb)       │ ◄─────────── │             │ ◄───────────────── │          │
//! └──────────────┘   remove()   └─────────────┘  401 → /oauth/token └──────────┘
//! ```
//!
//! The adapter runs one linear pass per invocation. On an auth failure it
//! refreshes the account's tokens once and retries the record; there is no
//! parallelism, cancellation or backpressure.

mod account;
mod adapter;
mod client;
mod datapoint;

pub use account::{Account, AccountStore, TokenGrant};
pub use adapter::{SyncAdapter, SyncReport};
pub use client::{DataPointService, DsuClient, UploadStatus};
pub use datapoint::{AcquisitionProvenance, DataPoint, DataPointHeader, SchemaId};
