//! External notarization ledger clients.
//!
//! [`HttpLedgerClient`] posts content hashes to the configured ledger
//! endpoint with a bounded request timeout. [`DisabledLedger`] stands in
//! when no endpoint is configured: every attempt reports the ledger as
//! unavailable and the engine degrades to its audit-trail guarantee.

use async_trait::async_trait;
use chrono::Utc;
use portgate_core::{LedgerClient, LedgerError, LedgerReceipt};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Serialize)]
struct AnchorRequest<'a> {
    hash: &'a str,
}

#[derive(Debug, Deserialize)]
struct AnchorResponse {
    reference: String,
}

/// Ledger client over HTTP
pub struct HttpLedgerClient {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpLedgerClient {
    /// Creates a client for `endpoint` with a per-request `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Unavailable`] when the underlying HTTP
    /// client cannot be built.
    pub fn new(endpoint: String, timeout: Duration) -> Result<Self, LedgerError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LedgerError::Unavailable(e.to_string()))?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl LedgerClient for HttpLedgerClient {
    async fn submit(&self, content_hash: &str) -> Result<LedgerReceipt, LedgerError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&AnchorRequest { hash: content_hash })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LedgerError::Timeout
                } else {
                    LedgerError::Unavailable(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(LedgerError::Rejected(format!(
                "ledger answered {}",
                response.status()
            )));
        }

        let body: AnchorResponse = response
            .json()
            .await
            .map_err(|e| LedgerError::Rejected(format!("malformed receipt: {e}")))?;
        Ok(LedgerReceipt {
            reference: body.reference,
            recorded_at: Utc::now(),
        })
    }
}

/// Stand-in used when no ledger endpoint is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledLedger;

#[async_trait]
impl LedgerClient for DisabledLedger {
    async fn submit(&self, _content_hash: &str) -> Result<LedgerReceipt, LedgerError> {
        Err(LedgerError::Unavailable(
            "no ledger endpoint configured".to_string(),
        ))
    }
}
