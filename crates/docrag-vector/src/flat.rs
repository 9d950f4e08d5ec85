//! Exact inner-product search over a dense, row-major matrix of vectors.
//!
//! Vectors are expected to be L2-normalized by the caller, which makes the
//! inner product equal to cosine similarity.

use std::cmp::Ordering;

use docrag_core::{Error, Result};

pub const INDEX_MAGIC: &[u8; 4] = b"DRIX";
pub const INDEX_FORMAT_VERSION: u32 = 1;
const HEADER_LEN: usize = 16;

/// Scale `v` to unit length in place. Zero vectors are left untouched.
pub fn normalize_l2(v: &mut [f32]) {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub position: usize,
    pub score: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlatIpIndex {
    dim: usize,
    data: Vec<f32>,
}

impl FlatIpIndex {
    pub fn new(dim: usize) -> Self {
        Self { dim, data: Vec::new() }
    }

    pub fn dim(&self) -> usize { self.dim }

    pub fn len(&self) -> usize {
        if self.dim == 0 { 0 } else { self.data.len() / self.dim }
    }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    pub fn add(&mut self, vector: &[f32]) -> Result<()> {
        if vector.len() != self.dim {
            return Err(Error::Embedding(format!(
                "vector dimension {} does not match index dimension {}",
                vector.len(),
                self.dim
            )));
        }
        self.data.extend_from_slice(vector);
        Ok(())
    }

    pub fn vector(&self, position: usize) -> Option<&[f32]> {
        if position >= self.len() { return None; }
        Some(&self.data[position * self.dim..(position + 1) * self.dim])
    }

    /// The `k` best matches by descending inner product. Equal scores keep
    /// insertion order.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        if query.len() != self.dim {
            return Err(Error::Embedding(format!(
                "query dimension {} does not match index dimension {}",
                query.len(),
                self.dim
            )));
        }
        if k == 0 || self.is_empty() {
            return Ok(Vec::new());
        }
        let mut hits: Vec<Neighbor> = self
            .data
            .chunks_exact(self.dim)
            .enumerate()
            .map(|(position, row)| Neighbor { position, score: dot(row, query) })
            .collect();
        let by_rank = |a: &Neighbor, b: &Neighbor| -> Ordering {
            b.score.total_cmp(&a.score).then(a.position.cmp(&b.position))
        };
        if k < hits.len() {
            hits.select_nth_unstable_by(k - 1, by_rank);
            hits.truncate(k);
        }
        hits.sort_by(by_rank);
        Ok(hits)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_LEN + self.data.len() * 4);
        out.extend_from_slice(INDEX_MAGIC);
        out.extend_from_slice(&INDEX_FORMAT_VERSION.to_le_bytes());
        out.extend_from_slice(&(self.dim as u32).to_le_bytes());
        out.extend_from_slice(&(self.len() as u32).to_le_bytes());
        for x in &self.data {
            out.extend_from_slice(&x.to_le_bytes());
        }
        out
    }

    /// Decode the on-disk form. The error is a human-readable reason.
    pub fn from_bytes(bytes: &[u8]) -> std::result::Result<Self, String> {
        if bytes.len() < HEADER_LEN {
            return Err(format!("index file is {} bytes, shorter than its header", bytes.len()));
        }
        if &bytes[0..4] != INDEX_MAGIC {
            return Err("index file has a bad magic number".into());
        }
        let version = read_u32(&bytes[4..8]);
        if version != INDEX_FORMAT_VERSION {
            return Err(format!("unsupported index format version {version}"));
        }
        let dim = read_u32(&bytes[8..12]) as usize;
        let count = read_u32(&bytes[12..16]) as usize;
        let body = &bytes[HEADER_LEN..];
        let expected = dim
            .checked_mul(count)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| format!("index header overflows: dim {dim}, count {count}"))?;
        if body.len() != expected {
            return Err(format!("index body is {} bytes, header implies {expected}", body.len()));
        }
        if dim == 0 && count > 0 {
            return Err("index holds vectors of dimension 0".into());
        }
        let data = body.chunks_exact(4).map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]])).collect();
        Ok(Self { dim, data })
    }
}

fn read_u32(b: &[u8]) -> u32 {
    u32::from_le_bytes([b[0], b[1], b[2], b[3]])
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_of(rows: &[[f32; 2]]) -> FlatIpIndex {
        let mut index = FlatIpIndex::new(2);
        for row in rows {
            index.add(row).expect("add");
        }
        index
    }

    #[test]
    fn normalize_makes_unit_length() {
        let mut v = vec![3.0, 4.0];
        normalize_l2(&mut v);
        assert!((v[0] - 0.6).abs() < 1e-6 && (v[1] - 0.8).abs() < 1e-6);
        let mut zero = vec![0.0, 0.0];
        normalize_l2(&mut zero);
        assert_eq!(zero, vec![0.0, 0.0]);
    }

    #[test]
    fn search_orders_by_score_then_position() {
        let index = index_of(&[[0.0, 1.0], [1.0, 0.0], [0.6, 0.8], [1.0, 0.0]]);
        let hits = index.search(&[1.0, 0.0], 3).expect("search");
        let positions: Vec<usize> = hits.iter().map(|h| h.position).collect();
        assert_eq!(positions, vec![1, 3, 2]);
        assert!((hits[2].score - 0.6).abs() < 1e-6);
    }

    #[test]
    fn k_beyond_len_returns_everything() {
        let index = index_of(&[[0.0, 1.0], [1.0, 0.0]]);
        assert_eq!(index.search(&[1.0, 0.0], 10).expect("search").len(), 2);
        assert!(index.search(&[1.0, 0.0], 0).expect("search").is_empty());
    }

    #[test]
    fn dimension_mismatch_is_an_embedding_error() {
        let mut index = index_of(&[[0.0, 1.0]]);
        assert!(matches!(index.add(&[1.0]), Err(Error::Embedding(_))));
        assert!(matches!(index.search(&[1.0, 0.0, 0.0], 1), Err(Error::Embedding(_))));
    }

    #[test]
    fn bytes_decode_to_the_same_index() {
        let index = index_of(&[[0.25, -1.5], [3.0, 0.125]]);
        let bytes = index.to_bytes();
        assert_eq!(&bytes[..4], b"DRIX");
        assert_eq!(bytes.len(), 16 + 4 * 4);
        assert_eq!(FlatIpIndex::from_bytes(&bytes).expect("decode"), index);
    }

    #[test]
    fn truncated_or_foreign_bytes_are_rejected() {
        let bytes = index_of(&[[1.0, 0.0]]).to_bytes();
        assert!(FlatIpIndex::from_bytes(&bytes[..bytes.len() - 1]).is_err());
        assert!(FlatIpIndex::from_bytes(b"PK\x03\x04 not an index").is_err());
        assert!(FlatIpIndex::from_bytes(&bytes[..8]).is_err());
    }
}
