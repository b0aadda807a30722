//! Address enrichment for decoded on-chain account trees.

pub mod config;
pub mod core;
pub mod metadata_api;
pub mod rpc;
pub mod types;

pub use crate::config::{BatchPolicy, EnrichConfig, HeuristicKind};
pub use crate::core::classifier::{
    AccountClassifier, AccountTypeMarker, AuthorityDiscriminant, LayoutHeuristic,
};
pub use crate::core::enricher::Enricher;
pub use crate::core::error::{AmbiguousLayout, EnrichError};
pub use crate::core::extractor::{extract_addresses, AddressMatcher};
pub use crate::core::formatter::format_amount;
pub use crate::core::sources::{
    AccountResolver, LabelFn, LabelLookup, MetadataSource, StaticAccounts, StaticMetadata,
};
pub use crate::core::tree::{strip, strip_json};
pub use crate::metadata_api::HttpMetadataSource;
pub use crate::rpc::RpcAccountResolver;
pub use crate::types::{
    AccountBlob, AccountData, Address, ClassifiedAccount, EnrichmentAnnotation, EnrichmentMap,
    LabeledAnnotation, MetadataRecord, MintMetadata, Scalar, TokenAnnotation, Value,
};
