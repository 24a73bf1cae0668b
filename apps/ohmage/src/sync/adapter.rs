//! The sync loop.

use super::account::{Account, AccountStore};
use super::client::{DataPointService, UploadStatus};
use super::datapoint::DataPoint;
use crate::config::SyncConfig;
use crate::error::{AppError, Result};
use ohmage_core::{StreamBuffer, StreamRecord};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Counters for one sync pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub uploaded: usize,
    pub duplicates: usize,
    pub rejected: usize,
    pub batches: usize,
    pub token_refreshed: bool,
    /// Buffered entries dropped because they could not be decoded.
    pub unreadable: usize,
}

/// Uploads the buffered records of one account.
#[derive(Debug)]
pub struct SyncAdapter<S, B> {
    service: S,
    buffer: B,
    batch_size: usize,
    source_name: String,
}

impl<S: DataPointService, B: StreamBuffer> SyncAdapter<S, B> {
    pub fn new(service: S, buffer: B, config: &SyncConfig) -> Self {
        Self {
            service,
            buffer,
            batch_size: config.batch_size.max(1),
            source_name: config.source_name.clone(),
        }
    }

    pub fn buffer(&self) -> &B {
        &self.buffer
    }

    pub fn into_buffer(self) -> B {
        self.buffer
    }

    /// Upload every pending record of the stored account.
    ///
    /// Tokens are refreshed at most once per call and written back to
    /// `accounts`. On error, records already handled are removed from the
    /// buffer before the error is returned.
    pub async fn perform_sync(&mut self, accounts: &AccountStore) -> Result<SyncReport> {
        let mut account = accounts.load()?;
        let mut report = SyncReport::default();
        info!(account = %account.username, "sync started");

        report.unreadable = self.buffer.purge_unreadable()?;
        if report.unreadable > 0 {
            warn!(count = report.unreadable, "dropped unreadable buffered records");
        }

        loop {
            let batch = self.buffer.pending(&account.username, self.batch_size)?;
            if batch.is_empty() {
                break;
            }
            report.batches += 1;
            debug!(batch = report.batches, records = batch.len(), "uploading batch");

            let mut handled = Vec::with_capacity(batch.len());
            let outcome = self
                .upload_batch(&batch, &mut account, accounts, &mut report, &mut handled)
                .await;
            self.buffer.remove(&handled)?;
            outcome?;
        }

        info!(
            uploaded = report.uploaded,
            duplicates = report.duplicates,
            rejected = report.rejected,
            batches = report.batches,
            "sync finished"
        );
        Ok(report)
    }

    async fn upload_batch(
        &self,
        batch: &[(u64, StreamRecord)],
        account: &mut Account,
        accounts: &AccountStore,
        report: &mut SyncReport,
        handled: &mut Vec<u64>,
    ) -> Result<()> {
        for (key, record) in batch {
            let point = match DataPoint::from_record(record, &self.source_name) {
                Ok(point) => point,
                Err(e) => {
                    warn!(point = %record.point_id, error = %e, "dropping record with invalid payload");
                    report.rejected += 1;
                    handled.push(*key);
                    continue;
                }
            };

            let mut status = self.service.upload(account, &point).await?;
            if status == UploadStatus::Unauthorized && !report.token_refreshed {
                warn!(account = %account.username, "access token rejected, refreshing");
                let grant = self.service.refresh_tokens(account).await?;
                account.apply(grant);
                accounts.save(account)?;
                report.token_refreshed = true;
                status = self.service.upload(account, &point).await?;
            }

            match status {
                UploadStatus::Created => {
                    debug!(point = %record.point_id, stream = %record.stream, "uploaded");
                    report.uploaded += 1;
                }
                UploadStatus::Duplicate => {
                    debug!(point = %record.point_id, "already on server");
                    report.duplicates += 1;
                }
                UploadStatus::Rejected(code) => {
                    warn!(point = %record.point_id, status = code, "server rejected record, dropping");
                    report.rejected += 1;
                }
                UploadStatus::Unauthorized => {
                    return Err(AppError::AuthFailed(format!(
                        "server rejected the tokens of '{}' after refresh",
                        account.username
                    )));
                }
            }
            handled.push(*key);
        }
        Ok(())
    }
}
