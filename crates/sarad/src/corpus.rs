//! Corpus and embedding index loading.
//!
//! Both artifacts are prebuilt by the ingestion tooling and read-only for
//! the life of the process. [`KnowledgeBase`] is the explicit handle: it
//! loads once at construction and is then passed by reference to the
//! retrieval engine, so there is no "is it loaded yet" state anywhere.

use sara_common::{normalize_text, SaraError};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::info;

/// One retrievable excerpt of the college document.
#[derive(Debug, Clone, Deserialize)]
pub struct Chunk {
    pub id: usize,
    pub text: String,
}

#[derive(Deserialize)]
struct CorpusFile {
    chunks: Vec<Chunk>,
}

#[derive(Deserialize)]
struct IndexFile {
    dim: usize,
    vectors: Vec<Vec<f32>>,
}

/// Corpus chunks plus their prebuilt embedding rows, row order matching
/// chunk ids.
pub struct KnowledgeBase {
    chunks: Vec<Chunk>,
    /// Normalized chunk text, precomputed for the lexical tiers
    normalized: Vec<String>,
    vectors: Vec<Vec<f32>>,
    dim: usize,
}

impl KnowledgeBase {
    /// Load corpus and index from their JSON artifacts.
    pub fn load(corpus_path: &Path, index_path: &Path) -> Result<Self, SaraError> {
        let corpus: CorpusFile = serde_json::from_str(&fs::read_to_string(corpus_path)?)?;
        let index: IndexFile = serde_json::from_str(&fs::read_to_string(index_path)?)?;

        if index.vectors.len() != corpus.chunks.len() {
            return Err(SaraError::Knowledge(format!(
                "index rows ({}) do not match corpus chunks ({})",
                index.vectors.len(),
                corpus.chunks.len()
            )));
        }

        let mut vectors = index.vectors;
        for row in &mut vectors {
            l2_normalize(row);
        }

        let normalized = corpus.chunks.iter().map(|c| normalize_text(&c.text)).collect();

        info!(
            "Knowledge base loaded: {} chunks, dim {}",
            corpus.chunks.len(),
            index.dim
        );

        Ok(Self {
            chunks: corpus.chunks,
            normalized,
            vectors,
            dim: index.dim,
        })
    }

    /// Build from already-loaded parts (tests and tools).
    pub fn from_parts(chunks: Vec<Chunk>, mut vectors: Vec<Vec<f32>>, dim: usize) -> Self {
        for row in &mut vectors {
            l2_normalize(row);
        }
        let normalized = chunks.iter().map(|c| normalize_text(&c.text)).collect();
        Self {
            chunks,
            normalized,
            vectors,
            dim,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn chunk(&self, id: usize) -> Option<&Chunk> {
        self.chunks.get(id)
    }

    /// Chunks paired with their precomputed normalized text.
    pub fn iter_normalized(&self) -> impl Iterator<Item = (&Chunk, &str)> {
        self.chunks
            .iter()
            .zip(self.normalized.iter().map(String::as_str))
    }

    /// Top-K chunk ids by inner product against an L2-normalized query.
    /// Rows with a mismatched dimension are skipped.
    pub fn search(&self, query: &[f32], top_k: usize) -> Vec<usize> {
        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .filter(|(_, row)| row.len() == self.dim && query.len() == self.dim)
            .map(|(id, row)| (id, dot(query, row)))
            .collect();

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);
        scored.into_iter().map(|(id, _)| id).collect()
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Scale a vector to unit length in place. Zero vectors are left as-is.
pub fn l2_normalize(v: &mut [f32]) {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}
