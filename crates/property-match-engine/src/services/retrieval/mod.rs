//! Text retrieval over listing descriptions
//!
//! - `Embedder` trait: text -> vector, similarity
//! - `HashEmbedder`: deterministic keyword-bucket vectors
//! - `TextRetrievalIndex`: per-listing embeddings and cosine ranking

pub mod embedder;
pub mod text_index;

pub use embedder::{Embedder, HashEmbedder, EMBEDDING_DIM_DEFAULT};
pub use text_index::{ScoredRecord, TextRetrievalIndex, RELEVANCE_FLOOR_DEFAULT};
