use serde::{Deserialize, Serialize};

use crate::core::constants::{
    BASE58_ADDRESS_PATTERN, DEFAULT_ICON_BASE_URL, DEFAULT_RPC_URL, TOKEN_2022_PROGRAM,
    TOKEN_PROGRAM,
};

/// How many items go into one external request and how many requests may be
/// awaited at the same time.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BatchPolicy {
    pub batch_size: usize,
    #[serde(default = "BatchPolicy::default_max_in_flight")]
    pub max_in_flight: usize,
}

impl BatchPolicy {
    pub const fn sequential(batch_size: usize) -> Self {
        Self {
            batch_size,
            max_in_flight: 1,
        }
    }

    const fn default_max_in_flight() -> usize {
        1
    }
}

/// Strategy used to tell mints from holdings when an extension-capable
/// account is larger than the base holding layout.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum HeuristicKind {
    #[default]
    AuthorityDiscriminant,
    AccountTypeMarker,
}

/// Runtime configuration for the enrichment engine and its HTTP collaborators.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EnrichConfig {
    #[serde(default = "EnrichConfig::default_token_program_id")]
    pub token_program_id: String,
    #[serde(default = "EnrichConfig::default_token_2022_program_id")]
    pub token_2022_program_id: String,
    /// Character class plus length bounds, without anchors.
    #[serde(default = "EnrichConfig::default_address_pattern")]
    pub address_pattern: String,
    #[serde(default = "EnrichConfig::default_icon_base_url")]
    pub icon_base_url: String,
    #[serde(default = "EnrichConfig::default_account_batch")]
    pub account_batch: BatchPolicy,
    #[serde(default = "EnrichConfig::default_metadata_batch")]
    pub metadata_batch: BatchPolicy,
    #[serde(default)]
    pub layout_heuristic: HeuristicKind,
    #[serde(default = "EnrichConfig::default_rpc_url")]
    pub rpc_url: String,
    #[serde(default)]
    pub metadata_url: Option<String>,
    #[serde(default = "EnrichConfig::default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for EnrichConfig {
    fn default() -> Self {
        Self {
            token_program_id: Self::default_token_program_id(),
            token_2022_program_id: Self::default_token_2022_program_id(),
            address_pattern: Self::default_address_pattern(),
            icon_base_url: Self::default_icon_base_url(),
            account_batch: Self::default_account_batch(),
            metadata_batch: Self::default_metadata_batch(),
            layout_heuristic: HeuristicKind::default(),
            rpc_url: Self::default_rpc_url(),
            metadata_url: None,
            request_timeout_secs: Self::default_request_timeout_secs(),
        }
    }
}

impl EnrichConfig {
    fn default_token_program_id() -> String {
        TOKEN_PROGRAM.to_string()
    }

    fn default_token_2022_program_id() -> String {
        TOKEN_2022_PROGRAM.to_string()
    }

    fn default_address_pattern() -> String {
        BASE58_ADDRESS_PATTERN.to_string()
    }

    fn default_icon_base_url() -> String {
        DEFAULT_ICON_BASE_URL.to_string()
    }

    fn default_rpc_url() -> String {
        DEFAULT_RPC_URL.to_string()
    }

    // getMultipleAccounts accepts at most 100 keys.
    const fn default_account_batch() -> BatchPolicy {
        BatchPolicy::sequential(100)
    }

    const fn default_metadata_batch() -> BatchPolicy {
        BatchPolicy::sequential(50)
    }

    const fn default_request_timeout_secs() -> u64 {
        30
    }

    /// Parse a configuration from JSON; missing fields take their defaults.
    pub fn from_json_slice(data: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(data)
    }
}
