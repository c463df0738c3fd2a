use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::utils::similarity::{cosine_similarity, l2_normalize};

/// Default vector length of the hash embedder
pub const EMBEDDING_DIM_DEFAULT: usize = 100;

/// Tokens this short or shorter are dropped before hashing
const KEYWORD_LENGTH_MIN_EXCLUSIVE: usize = 2;

static NON_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s]").expect("non-word pattern is valid"));

/// Text -> vector seam. Swap in a model-backed implementation without
/// touching the store or the hybrid search.
pub trait Embedder: Send + Sync {
    fn dimension(&self) -> usize;

    fn embed(&self, text: &str) -> Vec<f32>;

    /// Cosine similarity; zero-magnitude or mismatched vectors score 0.
    fn similarity(&self, a: &[f32], b: &[f32]) -> f32 {
        match cosine_similarity(a, b) {
            Ok(score) => score,
            Err(e) => {
                debug!("Similarity skipped: {}", e);
                0.0
            }
        }
    }
}

/// Deterministic keyword-bucket embedding.
///
/// Each keyword is hashed into one of `dimension` buckets, the bucket counts
/// form the vector, and the vector is L2-normalized. This is a lexical
/// placeholder, not a semantic model.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    /// Lower-case, strip non-word characters, split on whitespace and drop short tokens.
    pub fn extract_keywords(text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        NON_WORD
            .replace_all(&lowered, "")
            .split_whitespace()
            .filter(|word| word.chars().count() > KEYWORD_LENGTH_MIN_EXCLUSIVE)
            .map(str::to_string)
            .collect()
    }

    /// 31-multiplier string hash over UTF-16 code units, wrapped to 32 bits.
    pub fn hash_keyword(word: &str) -> u32 {
        let hash = word.encode_utf16().fold(0i32, |hash, unit| {
            hash.wrapping_shl(5)
                .wrapping_sub(hash)
                .wrapping_add(i32::from(unit))
        });
        hash.unsigned_abs()
    }

    fn bucket(&self, word: &str) -> usize {
        Self::hash_keyword(word) as usize % self.dimension
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(EMBEDDING_DIM_DEFAULT)
    }
}

impl Embedder for HashEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0f32; self.dimension];
        for keyword in Self::extract_keywords(text) {
            embedding[self.bucket(&keyword)] += 1.0;
        }
        l2_normalize(&mut embedding);
        embedding
    }
}
