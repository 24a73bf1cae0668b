//! HTTP client for the DSU data point and token endpoints.

use super::account::{Account, TokenGrant};
use super::datapoint::DataPoint;
use crate::config::SyncConfig;
use crate::error::{AppError, Result};
use reqwest::StatusCode;
use std::future::Future;
use std::time::Duration;

/// Outcome of uploading a single data point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStatus {
    /// Stored by the server.
    Created,
    /// The server already holds a point with this id.
    Duplicate,
    /// The access token was rejected.
    Unauthorized,
    /// The server refused the point itself (other 4xx). Retrying will not help.
    Rejected(u16),
}

/// Remote side of a sync.
///
/// Transport failures and 5xx responses are errors; everything the adapter
/// can act on is an [`UploadStatus`].
pub trait DataPointService {
    fn upload(
        &self,
        account: &Account,
        point: &DataPoint,
    ) -> impl Future<Output = Result<UploadStatus>> + Send;

    /// Exchange the account's refresh token for new tokens.
    fn refresh_tokens(&self, account: &Account) -> impl Future<Output = Result<TokenGrant>> + Send;
}

/// reqwest-backed [`DataPointService`].
#[derive(Debug, Clone)]
pub struct DsuClient {
    config: SyncConfig,
    client: reqwest::Client,
}

impl DsuClient {
    pub fn new(config: &SyncConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("ohmage/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            config: config.clone(),
            client,
        })
    }
}

impl DataPointService for DsuClient {
    async fn upload(&self, account: &Account, point: &DataPoint) -> Result<UploadStatus> {
        let url = self.config.endpoint("dataPoints");
        let response = self
            .client
            .post(&url)
            .bearer_auth(&account.access_token)
            .json(point)
            .send()
            .await?;

        let status = response.status();
        match status {
            s if s.is_success() => Ok(UploadStatus::Created),
            StatusCode::CONFLICT => Ok(UploadStatus::Duplicate),
            StatusCode::UNAUTHORIZED => Ok(UploadStatus::Unauthorized),
            s if s.is_client_error() => Ok(UploadStatus::Rejected(s.as_u16())),
            s => Err(AppError::Server {
                status: s.as_u16(),
                body: response.text().await.unwrap_or_default(),
            }),
        }
    }

    async fn refresh_tokens(&self, account: &Account) -> Result<TokenGrant> {
        let url = self.config.endpoint("oauth/token");
        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", account.refresh_token.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }
        let body = response.text().await.unwrap_or_default();
        if status.is_client_error() {
            Err(AppError::AuthFailed(format!(
                "token refresh rejected ({}): {}",
                status.as_u16(),
                body
            )))
        } else {
            Err(AppError::Server {
                status: status.as_u16(),
                body,
            })
        }
    }
}
