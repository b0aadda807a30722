use std::collections::HashMap;
use std::sync::Arc;

use rustc_hash::FxHashSet;
use tracing::{debug, info, warn};

use crate::config::{BatchPolicy, EnrichConfig};
use crate::core::batching::run_batches;
use crate::core::classifier::{AccountClassifier, LayoutHeuristic};
use crate::core::error::EnrichError;
use crate::core::extractor::AddressMatcher;
use crate::core::formatter::format_amount;
use crate::core::metadata::MetadataFetcher;
use crate::core::sources::{AccountResolver, LabelLookup, MetadataSource};
use crate::core::tree;
use crate::types::{
    Address, ClassifiedAccount, EnrichmentAnnotation, EnrichmentMap, LabeledAnnotation,
    MintMetadata, TokenAnnotation, Value,
};

/// Holding account found in a batch.
#[derive(Debug)]
struct Holding {
    address: Address,
    mint: Address,
    raw_amount: u128,
}

#[derive(Debug, Default)]
struct BatchOutcome {
    holdings: Vec<Holding>,
    mints: Vec<Address>,
    metadata: HashMap<Address, MintMetadata>,
}

/// Turns decoded trees into annotated trees.
///
/// Every call is self-contained: nothing is cached between calls, and lookup
/// failures only shrink the resulting map.
pub struct Enricher {
    matcher: AddressMatcher,
    classifier: AccountClassifier,
    resolver: Arc<dyn AccountResolver>,
    metadata: MetadataFetcher,
    labels: Option<Arc<dyn LabelLookup>>,
    account_batch: BatchPolicy,
}

impl Enricher {
    pub fn new(
        config: &EnrichConfig,
        resolver: Arc<dyn AccountResolver>,
        metadata_source: Arc<dyn MetadataSource>,
    ) -> Result<Self, EnrichError> {
        if config.account_batch.batch_size == 0 || config.metadata_batch.batch_size == 0 {
            return Err(EnrichError::config("batch size must be at least 1"));
        }
        Ok(Self {
            matcher: AddressMatcher::new(&config.address_pattern)?,
            classifier: AccountClassifier::new(config),
            resolver,
            metadata: MetadataFetcher::new(
                metadata_source,
                config.metadata_batch,
                config.icon_base_url.clone(),
            ),
            labels: None,
            account_batch: config.account_batch,
        })
    }

    pub fn with_labels(mut self, labels: Arc<dyn LabelLookup>) -> Self {
        self.labels = Some(labels);
        self
    }

    pub fn with_heuristic(mut self, heuristic: impl LayoutHeuristic + 'static) -> Self {
        self.classifier = self.classifier.with_heuristic(heuristic);
        self
    }

    pub fn matcher(&self) -> &AddressMatcher {
        &self.matcher
    }

    /// Extract, build and inject in one go.
    pub async fn enrich(&self, tree: &Value) -> Value {
        self.enrich_with_map(tree).await.0
    }

    /// Like [`Enricher::enrich`], also handing back the map so the caller can
    /// inject it into historic snapshots without another round of lookups.
    pub async fn enrich_with_map(&self, tree: &Value) -> (Value, EnrichmentMap) {
        let addresses = self.extract(tree);
        let map = self.build(&addresses).await;
        (self.inject(tree, &map), map)
    }

    pub fn extract(&self, tree: &Value) -> Vec<Address> {
        self.matcher.extract(tree)
    }

    pub fn inject(&self, tree: &Value, map: &EnrichmentMap) -> Value {
        tree::inject(&self.matcher, tree, map)
    }

    /// Build the annotation map for `addresses`, processed in account batches
    /// in the given order.
    pub async fn build(&self, addresses: &[Address]) -> EnrichmentMap {
        let mut map = EnrichmentMap::new();
        if addresses.is_empty() {
            return map;
        }

        let outcomes = run_batches(addresses, self.account_batch, |batch| {
            self.process_batch(batch)
        })
        .await;

        for outcome in outcomes {
            self.merge_outcome(&mut map, outcome);
        }
        self.apply_labels(&mut map, addresses);

        info!(
            addresses = addresses.len(),
            annotated = map.len(),
            "enrichment map built"
        );
        map
    }

    async fn process_batch(&self, batch: &[Address]) -> BatchOutcome {
        let blobs = match self.resolver.resolve(batch).await {
            Ok(blobs) => blobs,
            Err(err) => {
                warn!(addresses = batch.len(), "account batch skipped: {err}");
                return BatchOutcome::default();
            }
        };
        if blobs.len() != batch.len() {
            warn!(
                requested = batch.len(),
                returned = blobs.len(),
                "resolver returned a misaligned batch"
            );
        }

        let mut outcome = BatchOutcome::default();
        let mut distinct_mints = FxHashSet::default();
        let mut mint_order = Vec::new();
        for (address, blob) in batch.iter().zip(blobs) {
            let Some(blob) = blob else {
                continue;
            };
            match self.classifier.classify_blob(address, &blob) {
                ClassifiedAccount::TokenHolding { mint, raw_amount } => {
                    if distinct_mints.insert(mint.clone()) {
                        mint_order.push(mint.clone());
                    }
                    outcome.holdings.push(Holding {
                        address: address.clone(),
                        mint,
                        raw_amount,
                    });
                }
                ClassifiedAccount::MintRecord { address: mint } => {
                    if distinct_mints.insert(mint.clone()) {
                        mint_order.push(mint.clone());
                    }
                    outcome.mints.push(mint);
                }
                ClassifiedAccount::Unclassified => {}
            }
        }

        debug!(
            holdings = outcome.holdings.len(),
            mints = outcome.mints.len(),
            "account batch classified"
        );
        if !mint_order.is_empty() {
            outcome.metadata = self.metadata.fetch(&mint_order).await;
        }
        outcome
    }

    fn merge_outcome(&self, map: &mut EnrichmentMap, outcome: BatchOutcome) {
        let BatchOutcome {
            holdings,
            mints,
            metadata,
        } = outcome;
        let resolve = |mint: &str| {
            metadata
                .get(mint)
                .cloned()
                .unwrap_or_else(|| MintMetadata::unknown(mint, self.metadata.icon_base_url()))
        };

        for holding in holdings {
            let meta = resolve(&holding.mint);
            let balance = format_amount(holding.raw_amount, meta.decimals);
            map.insert(
                holding.address.clone(),
                token_annotation(holding.address, holding.mint, meta, Some(balance)),
            );
        }
        for mint in mints {
            let meta = resolve(&mint);
            map.insert(mint.clone(), token_annotation(mint.clone(), mint, meta, None));
        }
    }

    fn apply_labels(&self, map: &mut EnrichmentMap, addresses: &[Address]) {
        let Some(labels) = self.labels.as_ref() else {
            return;
        };
        for address in addresses {
            let Some(label) = labels.label_of(address) else {
                continue;
            };
            match map.get_mut(address) {
                Some(EnrichmentAnnotation::Token(token)) => token.label = Some(label),
                Some(EnrichmentAnnotation::Labeled(labeled)) => labeled.label = label,
                None => {
                    map.insert(
                        address.clone(),
                        EnrichmentAnnotation::Labeled(LabeledAnnotation {
                            address: address.clone(),
                            label,
                        }),
                    );
                }
            }
        }
    }
}

fn token_annotation(
    address: Address,
    mint: Address,
    meta: MintMetadata,
    formatted_balance: Option<String>,
) -> EnrichmentAnnotation {
    EnrichmentAnnotation::Token(TokenAnnotation {
        address,
        mint,
        symbol: meta.symbol,
        decimals: meta.decimals,
        formatted_balance,
        icon_url: Some(meta.icon_url),
        name: meta.name,
        label: None,
    })
}
