use std::env::VarError;
use std::future::Future;
use std::sync::Arc;

use anyhow::{Context, Result};
use gcp_auth::{CustomServiceAccount, TokenProvider};
use log::debug;
use reqwest::Client;
use serde::Serialize;

use crate::schedule::WireTimestamp;
use crate::types::{StartManualTransferRunsRequest, StartManualTransferRunsResponse};

const TRANSFER_API: &str = "https://bigquerydatatransfer.googleapis.com/v1";
const SCOPES: &[&str] = &["https://www.googleapis.com/auth/cloud-platform"];

/// Starts manual runs of a transfer configuration.
pub trait TransferService {
    fn start_manual_transfer_runs(
        &self,
        parent: &str,
        requested_run_time: WireTimestamp,
    ) -> impl Future<Output = Result<StartManualTransferRunsResponse>> + Send;
}

const SERVICE_ACCOUNT_KEY_VAR: &str = "GOOGLE_SERVICE_ACCOUNT_KEY";

/// Service account key JSON. Never printed.
struct ServiceAccountKey(String);

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ServiceAccountKey({} bytes)", self.0.len())
    }
}

/// `None` when the variable is unset; a set but unreadable key is an error.
fn service_account_key(value: Result<String, VarError>) -> Result<Option<ServiceAccountKey>> {
    match value {
        Ok(json) => Ok(Some(ServiceAccountKey(json))),
        Err(VarError::NotPresent) => Ok(None),
        Err(e) => Err(e).context("GOOGLE_SERVICE_ACCOUNT_KEY is not valid unicode"),
    }
}

pub struct DataTransferClient {
    token_provider: Arc<dyn TokenProvider>,
    client: Client,
}

impl DataTransferClient {
    pub fn new(token_provider: Arc<dyn TokenProvider>) -> Self {
        Self {
            token_provider,
            client: Client::new(),
        }
    }

    /// Uses the service account key in `GOOGLE_SERVICE_ACCOUNT_KEY` when set, otherwise
    /// Application Default Credentials.
    pub async fn from_env() -> Result<Self> {
        let token_provider: Arc<dyn TokenProvider> =
            match service_account_key(std::env::var(SERVICE_ACCOUNT_KEY_VAR))? {
                Some(key) => {
                    debug!("Using {key:?}");
                    Arc::new(
                        CustomServiceAccount::from_json(&key.0)
                            .context("Invalid GOOGLE_SERVICE_ACCOUNT_KEY")?,
                    )
                }
                None => {
                    debug!("{SERVICE_ACCOUNT_KEY_VAR} not set, using default credentials");
                    gcp_auth::provider()
                        .await
                        .context("No Google credentials available")?
                }
            };

        Ok(Self::new(token_provider))
    }

    async fn post_json<T: Serialize>(&self, url: &str, body: &T) -> Result<reqwest::Response> {
        let token = self
            .token_provider
            .token(SCOPES)
            .await
            .context("Failed to obtain access token")?;

        let response = self
            .client
            .post(url)
            .bearer_auth(token.as_str())
            .json(body)
            .send()
            .await?;

        Ok(response.error_for_status()?)
    }
}

fn start_manual_runs_url(parent: &str) -> String {
    format!("{}/{}:startManualRuns", TRANSFER_API, parent)
}

impl TransferService for DataTransferClient {
    async fn start_manual_transfer_runs(
        &self,
        parent: &str,
        requested_run_time: WireTimestamp,
    ) -> Result<StartManualTransferRunsResponse> {
        let body = StartManualTransferRunsRequest { requested_run_time };
        debug!("Starting manual runs for {parent}: {body:?}");

        let response = self
            .post_json(&start_manual_runs_url(parent), &body)
            .await?;

        Ok(response.json().await?)
    }
}
