//! Read-only content store built from the crawler's knowledge file.
//!
//! The file is either a single JSON object or an array of objects, each with
//! a text field (`content` or `text`) and a source locator (`url` or
//! `source`). Loading never fails: any problem is logged and the store comes
//! up empty, which leaves onboarding fully functional.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tokio::fs;
use tracing::{info, warn};

use crate::error::KnowledgeError;

/// An immutable unit of retrievable content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub text: String,
    pub source: String,
    pub title: Option<String>,
}

impl Chunk {
    pub fn new(text: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: source.into(),
            title: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// One crawled page as written by the ingest step.
#[derive(Debug, Deserialize)]
struct PageRecord {
    #[serde(alias = "text", default)]
    content: String,
    #[serde(alias = "source", default)]
    url: String,
    #[serde(default)]
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum KnowledgeFile {
    Many(Vec<PageRecord>),
    One(PageRecord),
}

/// Immutable collection of chunks, shared behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct ContentStore {
    chunks: Vec<Chunk>,
}

impl ContentStore {
    /// An empty store.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a store directly from chunks.
    pub fn from_chunks(chunks: Vec<Chunk>) -> Self {
        Self { chunks }
    }

    /// Load the knowledge file, bounded by `timeout`.
    ///
    /// Always returns a store; failures yield zero chunks.
    pub async fn load(path: &Path, chunk_max_chars: usize, timeout: Duration) -> Self {
        let result = match tokio::time::timeout(timeout, read_pages(path)).await {
            Ok(result) => result,
            Err(_) => Err(KnowledgeError::Timeout {
                path: path.display().to_string(),
                timeout,
            }),
        };

        match result {
            Ok(pages) => {
                let page_count = pages.len();
                let chunks: Vec<Chunk> = pages
                    .into_iter()
                    .flat_map(|page| chunk_page(page, chunk_max_chars))
                    .collect();
                info!(
                    path = %path.display(),
                    pages = page_count,
                    chunks = chunks.len(),
                    "Knowledge base loaded"
                );
                Self { chunks }
            }
            Err(e) => {
                warn!(error = %e, "Knowledge base unavailable, continuing with an empty store");
                Self::empty()
            }
        }
    }

    /// All chunks in corpus order.
    pub fn all(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

async fn read_pages(path: &Path) -> Result<Vec<PageRecord>, KnowledgeError> {
    let raw = match fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(KnowledgeError::NotFound(path.display().to_string()));
        }
        Err(e) => return Err(e.into()),
    };
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    let parsed: KnowledgeFile =
        serde_json::from_str(&raw).map_err(|e| KnowledgeError::Malformed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
    Ok(match parsed {
        KnowledgeFile::Many(pages) => pages,
        KnowledgeFile::One(page) => vec![page],
    })
}

/// Collapse whitespace runs to single spaces and trim.
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split a page into chunks of at most `max_chars` characters.
fn chunk_page(page: PageRecord, max_chars: usize) -> Vec<Chunk> {
    let text = clean_text(&page.content);
    if text.is_empty() {
        return Vec::new();
    }
    let title = page
        .title
        .map(|t| clean_text(&t))
        .filter(|t| !t.is_empty());

    split_text(&text, max_chars.max(1))
        .into_iter()
        .map(|piece| Chunk {
            text: piece,
            source: page.url.clone(),
            title: title.clone(),
        })
        .collect()
}

/// Pack sentences into pieces no longer than `max_chars`.
fn split_text(text: &str, max_chars: usize) -> Vec<String> {
    if text.chars().count() <= max_chars {
        return vec![text.to_string()];
    }

    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for sentence in sentences(text) {
        let sentence_len = sentence.chars().count();

        if sentence_len > max_chars {
            if !current.is_empty() {
                pieces.push(std::mem::take(&mut current));
                current_len = 0;
            }
            pieces.extend(hard_split(sentence, max_chars));
            continue;
        }

        let joined_len = if current.is_empty() {
            sentence_len
        } else {
            current_len + 1 + sentence_len
        };
        if joined_len > max_chars {
            pieces.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if !current.is_empty() {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(sentence);
        current_len += sentence_len;
    }

    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

/// Sentences end at `.`, `!` or `?` followed by a space.
fn sentences(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut prev_terminal = false;
    for (idx, ch) in text.char_indices() {
        if ch == ' ' && prev_terminal {
            let sentence = text[start..idx].trim();
            if !sentence.is_empty() {
                out.push(sentence);
            }
            start = idx + 1;
        }
        prev_terminal = matches!(ch, '.' | '!' | '?');
    }
    let tail = text[start..].trim();
    if !tail.is_empty() {
        out.push(tail);
    }
    out
}

fn hard_split(text: &str, max_chars: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(max_chars)
        .map(|c| c.iter().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
