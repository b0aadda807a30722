use std::collections::HashMap;

use async_trait::async_trait;

use crate::core::error::EnrichError;
use crate::types::{AccountBlob, Address, MetadataRecord};

/// Source of raw account data.
#[async_trait]
pub trait AccountResolver: Send + Sync {
    /// One entry per input address, in input order; `None` when the address
    /// holds no account.
    async fn resolve(&self, addresses: &[Address]) -> Result<Vec<Option<AccountBlob>>, EnrichError>;
}

/// Source of token metadata keyed by mint.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    async fn lookup(
        &self,
        mints: &[Address],
    ) -> Result<HashMap<Address, MetadataRecord>, EnrichError>;
}

/// Human labels for addresses.
pub trait LabelLookup: Send + Sync {
    fn label_of(&self, address: &str) -> Option<String>;
}

impl LabelLookup for HashMap<String, String> {
    fn label_of(&self, address: &str) -> Option<String> {
        self.get(address).cloned()
    }
}

/// Adapts a closure into a [`LabelLookup`].
pub struct LabelFn<F>(pub F);

impl<F> LabelLookup for LabelFn<F>
where
    F: Fn(&str) -> Option<String> + Send + Sync,
{
    fn label_of(&self, address: &str) -> Option<String> {
        (self.0)(address)
    }
}

/// In-memory resolver, handy for snapshots and tests.
#[derive(Clone, Debug, Default)]
pub struct StaticAccounts(pub HashMap<Address, AccountBlob>);

#[async_trait]
impl AccountResolver for StaticAccounts {
    async fn resolve(
        &self,
        addresses: &[Address],
    ) -> Result<Vec<Option<AccountBlob>>, EnrichError> {
        Ok(addresses
            .iter()
            .map(|address| self.0.get(address).cloned())
            .collect())
    }
}

/// In-memory metadata; also stands in when no metadata endpoint is set.
#[derive(Clone, Debug, Default)]
pub struct StaticMetadata(pub HashMap<Address, MetadataRecord>);

#[async_trait]
impl MetadataSource for StaticMetadata {
    async fn lookup(
        &self,
        mints: &[Address],
    ) -> Result<HashMap<Address, MetadataRecord>, EnrichError> {
        Ok(mints
            .iter()
            .filter_map(|mint| self.0.get(mint).map(|record| (mint.clone(), record.clone())))
            .collect())
    }
}
