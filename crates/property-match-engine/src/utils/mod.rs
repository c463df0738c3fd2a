pub mod error;
pub mod numeric;
pub mod similarity;

pub use error::{EngineError, EngineResult};
pub use numeric::parse_leading_float;
pub use similarity::cosine_similarity;
