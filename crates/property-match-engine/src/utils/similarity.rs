use anyhow::Result;

fn magnitude(vector: &[f32]) -> f32 {
    vector.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Cosine similarity in [-1, 1]. Zero-magnitude input scores 0; mismatched
/// or empty vectors are an error.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        anyhow::bail!("Embedding lengths differ: {} vs {}", a.len(), b.len());
    }
    if a.is_empty() {
        anyhow::bail!("Cannot compare empty embeddings");
    }

    let denominator = magnitude(a) * magnitude(b);
    if denominator == 0.0 {
        return Ok(0.0);
    }

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();

    // Rounding can push normalized vectors slightly past 1
    Ok((dot / denominator).clamp(-1.0, 1.0))
}

/// Scale a vector to unit length in place. A zero vector stays zero.
pub fn l2_normalize(vector: &mut [f32]) {
    let length = magnitude(vector);
    if length == 0.0 {
        return;
    }
    vector.iter_mut().for_each(|value| *value /= length);
}
