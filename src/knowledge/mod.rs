//! Knowledge base: crawled site content and lexical retrieval over it.

pub mod retriever;
pub mod store;

pub use retriever::{LexicalRetriever, Retriever};
pub use store::{Chunk, ContentStore};
