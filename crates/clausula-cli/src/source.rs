//! Where contract and addition records come from: JSON files or the API.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clausula_core::{AdditionRecord, ContractRecord};
use clausula_sync::ContractClient;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::ApiConfig;

pub enum Source {
    /// A JSON file; `-` reads stdin.
    File(PathBuf),
    /// A contract identifier fetched from the API.
    Api(String),
}

impl Source {
    pub fn new(file: Option<PathBuf>, id: Option<String>) -> anyhow::Result<Self> {
        match (file, id) {
            (Some(path), None) => Ok(Source::File(path)),
            (None, Some(id)) => Ok(Source::Api(id)),
            _ => anyhow::bail!("pass exactly one of --file or --id"),
        }
    }

    pub async fn contract(&self, api: &ApiConfig) -> anyhow::Result<ContractRecord> {
        match self {
            Source::File(path) => read_json(path),
            Source::Api(id) => client(api)
                .fetch_contract(id)
                .await
                .with_context(|| format!("fetching contract {id}")),
        }
    }

    /// Additions for the contract. File sources read them from
    /// `additions_file` and have none without it.
    pub async fn additions(
        &self,
        api: &ApiConfig,
        additions_file: Option<&Path>,
    ) -> anyhow::Result<Vec<AdditionRecord>> {
        match (self, additions_file) {
            (_, Some(path)) => read_json(path),
            (Source::File(_), None) => Ok(Vec::new()),
            (Source::Api(id), None) => client(api)
                .fetch_additions(id)
                .await
                .with_context(|| format!("fetching additions of contract {id}")),
        }
    }
}

fn client(api: &ApiConfig) -> ContractClient {
    let client = ContractClient::new(api.base_url.clone());
    match &api.token {
        Some(token) => client.with_token(token.clone()),
        None => client,
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let text = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading stdin")?;
        buf
    } else {
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?
    };
    debug!(path = %path.display(), bytes = text.len(), "read input");
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}
