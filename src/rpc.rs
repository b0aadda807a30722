use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};
use url::Url;

use crate::config::EnrichConfig;
use crate::core::error::EnrichError;
use crate::core::sources::AccountResolver;
use crate::types::{AccountBlob, Address};

/// Resolves accounts with JSON-RPC `getMultipleAccounts`, base64 encoded.
#[derive(Clone, Debug)]
pub struct RpcAccountResolver {
    client: Client,
    rpc_url: Url,
}

impl RpcAccountResolver {
    pub fn new(rpc_url: &str, timeout: Duration) -> Result<Self, EnrichError> {
        let rpc_url = Url::parse(rpc_url)
            .map_err(|err| EnrichError::config(format!("rpc url {rpc_url:?}: {err}")))?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, rpc_url })
    }

    pub fn from_config(config: &EnrichConfig) -> Result<Self, EnrichError> {
        Self::new(
            &config.rpc_url,
            Duration::from_secs(config.request_timeout_secs),
        )
    }
}

#[async_trait]
impl AccountResolver for RpcAccountResolver {
    async fn resolve(
        &self,
        addresses: &[Address],
    ) -> Result<Vec<Option<AccountBlob>>, EnrichError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "getMultipleAccounts",
            "params": [
                addresses,
                { "encoding": "base64" }
            ]
        });

        let resp = self
            .client
            .post(self.rpc_url.clone())
            .json(&body)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(EnrichError::resolver(format!("rpc returned status {}", resp.status())));
        }

        let bytes = resp.bytes().await?;
        let accounts = parse_multiple_accounts(&bytes)?;
        debug!(
            requested = addresses.len(),
            found = accounts.iter().filter(|account| account.is_some()).count(),
            "getMultipleAccounts"
        );
        Ok(accounts)
    }
}

/// Decode a `getMultipleAccounts` response body into positional blobs.
pub fn parse_multiple_accounts(body: &[u8]) -> Result<Vec<Option<AccountBlob>>, EnrichError> {
    let response: JsonRpcResponse = serde_json::from_slice(body)?;
    if let Some(err) = response.error {
        return Err(EnrichError::resolver(format!(
            "rpc error {}: {}",
            err.code, err.message
        )));
    }
    let result = response
        .result
        .ok_or_else(|| EnrichError::resolver("rpc returned an empty result"))?;

    let accounts = result
        .value
        .into_iter()
        .enumerate()
        .map(|(index, account)| {
            account.and_then(|account| match account.into_blob() {
                Ok(blob) => Some(blob),
                Err(err) => {
                    warn!(index, "dropping account with unusable data: {err}");
                    None
                }
            })
        })
        .collect();
    Ok(accounts)
}

// === RPC Response Structures ===

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    result: Option<MultipleAccountsResult>,
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct MultipleAccountsResult {
    value: Vec<Option<RpcAccount>>,
}

#[derive(Debug, Deserialize)]
struct RpcAccount {
    owner: String,
    data: DataField,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DataField {
    Encoded(Vec<String>), // ["<base64>", "base64"]
    Other(serde_json::Value),
}

impl RpcAccount {
    fn into_blob(self) -> Result<AccountBlob, EnrichError> {
        match self.data {
            DataField::Encoded(mut parts) if parts.len() == 2 && parts[1] == "base64" => {
                Ok(AccountBlob::base64(self.owner, parts.swap_remove(0)))
            }
            DataField::Encoded(parts) if parts.len() == 2 => Err(EnrichError::resolver(format!(
                "expected base64 account data, got encoding {:?}",
                parts[1]
            ))),
            DataField::Encoded(parts) => Err(EnrichError::resolver(format!(
                "expected [<data>, \"base64\"], got {} elements",
                parts.len()
            ))),
            DataField::Other(_) => Err(EnrichError::resolver("account data is not base64 encoded")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AccountData;

    #[test]
    fn parses_positional_accounts() {
        let body = br#"{
            "jsonrpc": "2.0",
            "id": 1,
            "result": {
                "context": { "slot": 1 },
                "value": [
                    null,
                    {
                        "data": ["AQID", "base64"],
                        "executable": false,
                        "lamports": 2039280,
                        "owner": "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA",
                        "rentEpoch": 0
                    }
                ]
            }
        }"#;
        let accounts = parse_multiple_accounts(body).unwrap();
        assert_eq!(accounts.len(), 2);
        assert!(accounts[0].is_none());
        let blob = accounts[1].as_ref().unwrap();
        assert_eq!(blob.owner, "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA");
        assert_eq!(blob.data, AccountData::Base64("AQID".to_string()));
        assert_eq!(blob.data.decode().unwrap().as_ref(), &[1, 2, 3]);
    }

    #[test]
    fn unusable_entry_only_drops_that_account() {
        let body = br#"{
            "jsonrpc": "2.0",
            "id": 1,
            "result": {
                "context": { "slot": 1 },
                "value": [
                    {
                        "data": ["AQID", "base64"],
                        "owner": "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA"
                    },
                    {
                        "data": ["AQID", "base58"],
                        "owner": "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA"
                    },
                    {
                        "data": { "parsed": {} },
                        "owner": "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA"
                    }
                ]
            }
        }"#;
        let accounts = parse_multiple_accounts(body).unwrap();
        assert_eq!(accounts.len(), 3);
        assert_eq!(
            accounts[0].as_ref().map(|blob| blob.data.clone()),
            Some(AccountData::Base64("AQID".to_string()))
        );
        assert!(accounts[1].is_none());
        assert!(accounts[2].is_none());
    }

    #[test]
    fn wrong_encoding_names_the_tag() {
        let account = RpcAccount {
            owner: "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA".to_string(),
            data: DataField::Encoded(vec!["AQID".to_string(), "base58".to_string()]),
        };
        let err = account.into_blob().unwrap_err();
        assert!(err.to_string().contains("\"base58\""), "{err}");
    }

    #[test]
    fn rpc_error_is_reported() {
        let body = br#"{"jsonrpc":"2.0","id":1,"error":{"code":-32005,"message":"rate limited"}}"#;
        let err = parse_multiple_accounts(body).unwrap_err();
        assert!(err.to_string().contains("rate limited"));
    }

    #[test]
    fn rejects_invalid_rpc_url() {
        assert!(matches!(
            RpcAccountResolver::new("not a url", Duration::from_secs(1)),
            Err(EnrichError::Config(_))
        ));
    }
}
