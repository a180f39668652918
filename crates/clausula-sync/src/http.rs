//! HTTP client for the contract management API.

use clausula_core::{AdditionRecord, ContractRecord};
use reqwest::Url;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid API URL `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Read-only client for the contract and additions endpoints.
pub struct ContractClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ContractClient {
    /// Create a client for the given API base URL.
    ///
    /// `base_url` should be like `http://localhost:8000` (a trailing slash is
    /// removed).
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Send `Authorization: Bearer <token>` with every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Fetch a single contract by identifier.
    pub async fn fetch_contract(&self, id: &str) -> Result<ContractRecord, SyncError> {
        let id = id.trim();
        let url = self.endpoint(&["api", "contracts", id])?;
        info!(url = %url, "fetching contract");
        let contract: ContractRecord = self.get_json(url).await?;
        Ok(contract)
    }

    /// Fetch the additions recorded against a contract.
    ///
    /// Records that name a different contract are dropped.
    pub async fn fetch_additions(
        &self,
        contract_id: &str,
    ) -> Result<Vec<AdditionRecord>, SyncError> {
        let contract_id = contract_id.trim();
        let url = self.endpoint(&["api", "contracts", contract_id, "additions"])?;
        info!(url = %url, "fetching additions");
        let additions: Vec<AdditionRecord> = self.get_json(url).await?;
        let additions = retain_contract_additions(additions, contract_id);
        info!(count = additions.len(), "fetched additions");
        Ok(additions)
    }

    /// Base URL extended with percent-encoded path segments.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, SyncError> {
        let invalid = |reason: String| SyncError::InvalidUrl {
            url: self.base_url.clone(),
            reason,
        };
        let mut url = Url::parse(&self.base_url).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| invalid("URL cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, SyncError> {
        let mut request = self.client.get(url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let resp = request.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SyncError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

fn retain_contract_additions(
    additions: Vec<AdditionRecord>,
    contract_id: &str,
) -> Vec<AdditionRecord> {
    let before = additions.len();
    let kept: Vec<AdditionRecord> = additions
        .into_iter()
        .filter(|a| {
            a.contract_id
                .as_deref()
                .is_none_or(|id| id.trim() == contract_id.trim())
        })
        .collect();
    if kept.len() < before {
        warn!(
            dropped = before - kept.len(),
            contract = contract_id,
            "dropped additions belonging to another contract"
        );
    }
    kept
}
