#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use solana_account_enricher::{
    AccountBlob, AccountResolver, Address, EnrichError, MetadataRecord, MetadataSource,
};

pub const TOKEN_PROGRAM: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";
pub const TOKEN_2022_PROGRAM: &str = "TokenzQdBNbLqP5VEhdkAS6EPFLC1PHnBqCXEpPxuEb";
pub const SYSTEM_PROGRAM: &str = "11111111111111111111111111111111";

/// 32-byte key filled with `seed`, as base-58.
pub fn key(seed: u8) -> Address {
    bs58::encode([seed; 32]).into_string()
}

pub fn holding_data(mint: &Address, amount: u64) -> Vec<u8> {
    let mut data = vec![0u8; 165];
    let mint = bs58::decode(mint).into_vec().expect("test mint is base58");
    data[..32].copy_from_slice(&mint);
    data[64..72].copy_from_slice(&amount.to_le_bytes());
    data
}

pub fn record(symbol: &str, decimals: u8) -> MetadataRecord {
    MetadataRecord {
        symbol: Some(symbol.to_string()),
        decimals: Some(decimals),
        name: None,
    }
}

/// Resolver backed by a map that records every batch it was asked for and
/// can fail chosen calls.
#[derive(Default)]
pub struct MockResolver {
    pub accounts: HashMap<Address, AccountBlob>,
    pub calls: Mutex<Vec<Vec<Address>>>,
    pub fail_calls: Vec<usize>,
}

impl MockResolver {
    pub fn with(mut self, address: &Address, blob: AccountBlob) -> Self {
        self.accounts.insert(address.clone(), blob);
        self
    }

    pub fn calls(&self) -> Vec<Vec<Address>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AccountResolver for MockResolver {
    async fn resolve(
        &self,
        addresses: &[Address],
    ) -> Result<Vec<Option<AccountBlob>>, EnrichError> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(addresses.to_vec());
            calls.len() - 1
        };
        if self.fail_calls.contains(&call) {
            return Err(EnrichError::resolver("connection reset"));
        }
        Ok(addresses
            .iter()
            .map(|address| self.accounts.get(address).cloned())
            .collect())
    }
}

#[derive(Default)]
pub struct MockMetadata {
    pub records: HashMap<Address, MetadataRecord>,
    pub calls: Mutex<Vec<Vec<Address>>>,
    pub fail: bool,
}

impl MockMetadata {
    pub fn with(mut self, mint: &Address, record: MetadataRecord) -> Self {
        self.records.insert(mint.clone(), record);
        self
    }

    pub fn calls(&self) -> Vec<Vec<Address>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MetadataSource for MockMetadata {
    async fn lookup(
        &self,
        mints: &[Address],
    ) -> Result<HashMap<Address, MetadataRecord>, EnrichError> {
        self.calls.lock().unwrap().push(mints.to_vec());
        if self.fail {
            return Err(EnrichError::metadata("502 Bad Gateway"));
        }
        Ok(mints
            .iter()
            .filter_map(|mint| self.records.get(mint).map(|r| (mint.clone(), r.clone())))
            .collect())
    }
}
