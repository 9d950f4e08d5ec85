//! Per-document vector indexes: building, persistence and top-k retrieval.

pub mod flat;
pub mod index_build;
pub mod manifest;
pub mod search;
pub mod store;

pub use flat::{normalize_l2, FlatIpIndex, Neighbor};
pub use index_build::IndexBuilder;
pub use manifest::Manifest;
pub use search::Retriever;
pub use store::{IndexStore, StoredIndex};
