use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use url::Url;

use crate::config::EnrichConfig;
use crate::core::error::EnrichError;
use crate::core::sources::MetadataSource;
use crate::types::{Address, MetadataRecord};

/// Token metadata over HTTP: POST `{"addresses": [...]}`, answered with
/// either a list of records carrying `address`/`mint` or a map keyed by mint.
#[derive(Clone, Debug)]
pub struct HttpMetadataSource {
    client: Client,
    endpoint: Url,
}

impl HttpMetadataSource {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, EnrichError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|err| EnrichError::config(format!("metadata url {endpoint:?}: {err}")))?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }

    /// `None` when the configuration names no metadata endpoint.
    pub fn from_config(config: &EnrichConfig) -> Result<Option<Self>, EnrichError> {
        config
            .metadata_url
            .as_deref()
            .map(|url| Self::new(url, Duration::from_secs(config.request_timeout_secs)))
            .transpose()
    }
}

#[async_trait]
impl MetadataSource for HttpMetadataSource {
    async fn lookup(
        &self,
        mints: &[Address],
    ) -> Result<HashMap<Address, MetadataRecord>, EnrichError> {
        let resp = self
            .client
            .post(self.endpoint.clone())
            .json(&json!({ "addresses": mints }))
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(EnrichError::metadata(format!(
                "metadata service returned status {}",
                resp.status()
            )));
        }
        let bytes = resp.bytes().await?;
        parse_metadata_response(&bytes)
    }
}

pub fn parse_metadata_response(
    body: &[u8],
) -> Result<HashMap<Address, MetadataRecord>, EnrichError> {
    let response: MetadataResponse = serde_json::from_slice(body)?;
    Ok(match response {
        MetadataResponse::List(entries) => entries
            .into_iter()
            .map(|entry| (entry.address, entry.record))
            .collect(),
        MetadataResponse::Keyed(records) => records,
    })
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MetadataResponse {
    List(Vec<MetadataEntry>),
    Keyed(HashMap<Address, MetadataRecord>),
}

#[derive(Debug, Deserialize)]
struct MetadataEntry {
    #[serde(alias = "mint", alias = "id")]
    address: Address,
    #[serde(flatten)]
    record: MetadataRecord,
}
