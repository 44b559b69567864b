use serde::{Deserialize, Serialize};

/// Dense feature vector in encoded feature space.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Vector {
    data: Vec<f64>,
}

impl Vector {
    #[inline]
    #[must_use]
    pub fn new(data: Vec<f64>) -> Self {
        Self { data }
    }

    /// Concatenate encoded blocks in order (`hstack`).
    #[must_use]
    pub fn concat(parts: &[&[f64]]) -> Self {
        let len = parts.iter().map(|p| p.len()).sum();
        let mut data = Vec::with_capacity(len);
        for part in parts {
            data.extend_from_slice(part);
        }
        Self { data }
    }

    #[inline]
    #[must_use]
    pub fn dim(&self) -> usize {
        self.data.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    #[inline]
    #[must_use]
    pub fn into_inner(self) -> Vec<f64> {
        self.data
    }
}

impl From<Vec<f64>> for Vector {
    fn from(data: Vec<f64>) -> Self {
        Self::new(data)
    }
}

/// Euclidean distance with two accumulators for better pipelining.
pub fn l2_distance(a: &[f64], b: &[f64]) -> f64 {
    let mut sum0 = 0.0f64;
    let mut sum1 = 0.0f64;

    let chunks = a.chunks_exact(4);
    let remainder = chunks.remainder();
    let b_chunks = b.chunks_exact(4);

    for (a_chunk, b_chunk) in chunks.zip(b_chunks) {
        let d0 = a_chunk[0] - b_chunk[0];
        let d1 = a_chunk[1] - b_chunk[1];
        let d2 = a_chunk[2] - b_chunk[2];
        let d3 = a_chunk[3] - b_chunk[3];

        sum0 += d0 * d0 + d1 * d1;
        sum1 += d2 * d2 + d3 * d3;
    }

    for i in (a.len() - remainder.len())..a.len() {
        let diff = a[i] - b[i];
        sum0 += diff * diff;
    }

    (sum0 + sum1).sqrt()
}
