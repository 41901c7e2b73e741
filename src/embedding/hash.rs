use xxhash_rust::xxh3::xxh3_64;

use super::Embedder;
use crate::error::Result;

/// Feature-hashing embedder: each lowercase alphanumeric token is hashed into
/// one signed bucket, then the vector is L2-normalized.
///
/// Texts sharing vocabulary land close together under cosine distance, which
/// is enough to exercise a remote index end to end without a model download.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimensions: usize,
}

impl HashEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }
}

impl Embedder for HashEmbedder {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn encode(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0f32; self.dimensions];

        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let h = xxh3_64(token.to_lowercase().as_bytes());
            let bucket = (h % self.dimensions as u64) as usize;
            let sign = if h >> 63 == 1 { -1.0 } else { 1.0 };
            vector[bucket] += sign;
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut vector {
                *x /= norm;
            }
        }
        Ok(vector)
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[test]
    fn test_deterministic() {
        let e = HashEmbedder::new(64);
        assert_eq!(
            e.encode("Rust programming").unwrap(),
            e.encode("Rust programming").unwrap()
        );
    }

    #[test]
    fn test_case_and_punctuation_insensitive() {
        let e = HashEmbedder::new(64);
        assert_eq!(
            e.encode("Machine Learning!").unwrap(),
            e.encode("machine, learning").unwrap()
        );
    }

    #[test]
    fn test_unit_norm() {
        let e = HashEmbedder::new(384);
        let v = e.encode("practical examples best practices").unwrap();
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_empty_text_is_zero_vector() {
        let e = HashEmbedder::new(8);
        assert_eq!(e.encode("  ").unwrap(), vec![0.0; 8]);
    }

    #[test]
    fn test_shared_vocabulary_is_closer() {
        let e = HashEmbedder::new(384);
        let query = e.encode("python machine learning tutorial").unwrap();
        let related = e.encode("machine learning with python").unwrap();
        let unrelated = e.encode("health insurance deductible coverage").unwrap();
        assert!(cosine(&query, &related) > cosine(&query, &unrelated));
    }
}
