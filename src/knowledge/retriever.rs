//! Lexical retrieval by term overlap.
//!
//! Query and chunk text are lowercased, punctuation is stripped, and the
//! result is tokenized on whitespace. A chunk scores one point per distinct
//! query token it contains. Ties keep corpus order, so results are stable.

use std::collections::HashSet;

use super::store::Chunk;

/// Ranks chunks against a query.
pub trait Retriever: Send + Sync {
    /// Return up to `k` chunks with a positive score, best first.
    fn search(&self, query: &str, chunks: &[Chunk], k: usize) -> Vec<Chunk>;
}

/// Term-overlap retriever.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexicalRetriever;

impl LexicalRetriever {
    pub fn new() -> Self {
        Self
    }

    /// Like `search`, but keeps each chunk's score.
    pub fn search_scored<'a>(
        &self,
        query: &str,
        chunks: &'a [Chunk],
        k: usize,
    ) -> Vec<(usize, &'a Chunk)> {
        let query_terms: HashSet<String> = tokenize(query).into_iter().collect();
        if query_terms.is_empty() || chunks.is_empty() || k == 0 {
            return Vec::new();
        }

        let mut scored: Vec<(usize, &Chunk)> = chunks
            .iter()
            .filter_map(|chunk| {
                let chunk_terms: HashSet<String> = tokenize(&chunk.text).into_iter().collect();
                let score = query_terms
                    .iter()
                    .filter(|term| chunk_terms.contains(*term))
                    .count();
                (score > 0).then_some((score, chunk))
            })
            .collect();

        // Stable sort keeps corpus order among equal scores.
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored.truncate(k);
        scored
    }
}

impl Retriever for LexicalRetriever {
    fn search(&self, query: &str, chunks: &[Chunk], k: usize) -> Vec<Chunk> {
        self.search_scored(query, chunks, k)
            .into_iter()
            .map(|(_, chunk)| chunk.clone())
            .collect()
    }
}

/// Lowercase, drop punctuation, split on whitespace.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() || c.is_whitespace() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}
