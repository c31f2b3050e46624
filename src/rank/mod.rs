//! Persona-driven relevance ranking.

mod embed;
mod options;
mod persona;
mod ranker;
mod snippet;

pub use embed::{cosine_similarity, tokenize, Embedder, HashingEmbedder, WordVectorEmbedder};
pub use options::RankOptions;
pub use persona::{DocumentRef, PersonaDescriptor};
pub use ranker::{Ranker, Subsection};
pub use snippet::{refine_snippet, split_sentences, truncate_chars};
