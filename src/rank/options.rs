//! Ranking configuration.

/// Options for persona-driven section ranking.
#[derive(Debug, Clone)]
pub struct RankOptions {
    /// Number of sections to select
    pub top_k: usize,
    /// Section text is cut to this many characters before embedding
    pub max_embed_chars: usize,
    /// Maximum snippet length in characters
    pub snippet_max_chars: usize,
    /// Maximum number of sentences in a snippet
    pub snippet_max_sentences: usize,
    /// Number of best-matching sentences per subsection analysis entry
    pub subsection_sentences: usize,
}

impl RankOptions {
    /// Create new rank options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of sections to select.
    pub fn with_top_k(mut self, k: usize) -> Self {
        self.top_k = k;
        self
    }

    /// Set the embedding truncation length.
    pub fn with_max_embed_chars(mut self, chars: usize) -> Self {
        self.max_embed_chars = chars.max(1);
        self
    }

    /// Set snippet limits.
    pub fn with_snippet_limits(mut self, max_chars: usize, max_sentences: usize) -> Self {
        self.snippet_max_chars = max_chars.max(1);
        self.snippet_max_sentences = max_sentences.max(1);
        self
    }

    /// Set the number of sentences per subsection analysis entry.
    pub fn with_subsection_sentences(mut self, sentences: usize) -> Self {
        self.subsection_sentences = sentences;
        self
    }
}

impl Default for RankOptions {
    fn default() -> Self {
        Self {
            top_k: 5,
            max_embed_chars: 2000,
            snippet_max_chars: 500,
            snippet_max_sentences: 3,
            subsection_sentences: 1,
        }
    }
}
