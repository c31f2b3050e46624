//! Heading classifier configuration.

/// Options controlling heading classification.
#[derive(Debug, Clone)]
pub struct ClassifierOptions {
    /// Maximum number of size tiers; smaller heading sizes fold into the last
    pub max_tiers: usize,

    /// Sizes within this fraction of a tier's head size join that tier
    pub tier_merge_ratio: f32,

    /// A size must exceed the body size by more than this many points to
    /// count as a heading size
    pub min_heading_delta: f32,

    /// A block left of the body indentation by more than this many points
    /// counts as outdented
    pub indent_tolerance: f32,

    /// Blocks whose alphabetic character share is below this are never headings
    pub min_alpha_ratio: f32,

    /// Minimum number of visible characters for a heading
    pub min_heading_chars: usize,

    /// Maximum number of words for a heading
    pub max_heading_words: usize,

    /// Blocks at least this similar to the title are never headings
    pub title_similarity: f64,

    /// Merge consecutive same-size lines following the title into it
    pub merge_title_lines: bool,
}

impl ClassifierOptions {
    /// Create new classifier options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of size tiers.
    pub fn with_max_tiers(mut self, tiers: usize) -> Self {
        self.max_tiers = tiers.max(1);
        self
    }

    /// Set the tier merge ratio.
    pub fn with_tier_merge_ratio(mut self, ratio: f32) -> Self {
        self.tier_merge_ratio = ratio;
        self
    }

    /// Set the minimum alphabetic ratio for headings.
    pub fn with_min_alpha_ratio(mut self, ratio: f32) -> Self {
        self.min_alpha_ratio = ratio;
        self
    }

    /// Set the maximum heading length in words.
    pub fn with_max_heading_words(mut self, words: usize) -> Self {
        self.max_heading_words = words;
        self
    }

    /// Set the title similarity threshold.
    pub fn with_title_similarity(mut self, threshold: f64) -> Self {
        self.title_similarity = threshold;
        self
    }

    /// Enable or disable multi-line title merging.
    pub fn with_merge_title_lines(mut self, merge: bool) -> Self {
        self.merge_title_lines = merge;
        self
    }
}

impl Default for ClassifierOptions {
    fn default() -> Self {
        Self {
            max_tiers: 3,
            tier_merge_ratio: 0.05,
            min_heading_delta: 0.5,
            indent_tolerance: 2.0,
            min_alpha_ratio: 0.4,
            min_heading_chars: 2,
            max_heading_words: 25,
            title_similarity: 0.85,
            merge_title_lines: true,
        }
    }
}
