pub mod batching;
pub mod binary_reader;
pub mod classifier;
pub mod constants;
pub mod enricher;
pub mod error;
pub mod extractor;
pub mod formatter;
pub mod metadata;
pub mod sources;
pub mod tree;
