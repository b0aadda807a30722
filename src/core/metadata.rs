use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::BatchPolicy;
use crate::core::batching::run_batches;
use crate::core::sources::MetadataSource;
use crate::types::{Address, MintMetadata};

/// Chunked metadata lookups over a [`MetadataSource`].
#[derive(Clone)]
pub struct MetadataFetcher {
    source: Arc<dyn MetadataSource>,
    policy: BatchPolicy,
    icon_base_url: String,
}

impl MetadataFetcher {
    pub fn new(
        source: Arc<dyn MetadataSource>,
        policy: BatchPolicy,
        icon_base_url: impl Into<String>,
    ) -> Self {
        Self {
            source,
            policy,
            icon_base_url: icon_base_url.into(),
        }
    }

    pub fn icon_base_url(&self) -> &str {
        &self.icon_base_url
    }

    /// Metadata for every mint of every batch that succeeded. Mints missing
    /// from a successful response get the "Unknown" defaults; mints of a
    /// failed batch are left out.
    pub async fn fetch(&self, mints: &[Address]) -> HashMap<Address, MintMetadata> {
        let batches = run_batches(mints, self.policy, |chunk| async move {
            match self.source.lookup(chunk).await {
                Ok(records) => {
                    debug!(requested = chunk.len(), returned = records.len(), "metadata batch");
                    chunk
                        .iter()
                        .map(|mint| {
                            let metadata = MintMetadata::from_record(
                                mint,
                                records.get(mint),
                                &self.icon_base_url,
                            );
                            (mint.clone(), metadata)
                        })
                        .collect::<Vec<_>>()
                }
                Err(err) => {
                    warn!(mints = chunk.len(), "metadata batch skipped: {err}");
                    Vec::new()
                }
            }
        })
        .await;

        batches.into_iter().flatten().collect()
    }
}
