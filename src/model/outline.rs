//! Heading classification and outline types.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::TextBlock;

/// Outline heading level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HeadingLevel {
    /// Top-level heading
    H1,
    /// Second-level heading
    H2,
    /// Third-level heading
    H3,
}

impl HeadingLevel {
    /// Map a numbering depth (1-based) to a level, clamping at H3.
    pub fn from_depth(depth: usize) -> Self {
        match depth {
            0 | 1 => HeadingLevel::H1,
            2 => HeadingLevel::H2,
            _ => HeadingLevel::H3,
        }
    }

    /// Map a tier index (0-based, largest first) to a level, clamping at H3.
    pub fn from_tier(tier: usize) -> Self {
        Self::from_depth(tier + 1)
    }

    /// Numeric depth (1-3).
    pub fn depth(self) -> u8 {
        match self {
            HeadingLevel::H1 => 1,
            HeadingLevel::H2 => 2,
            HeadingLevel::H3 => 3,
        }
    }

    /// Parse "H1"/"h2"/"3" style level names.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().trim_start_matches(['H', 'h']) {
            "1" => Some(HeadingLevel::H1),
            "2" => Some(HeadingLevel::H2),
            "3" => Some(HeadingLevel::H3),
            _ => None,
        }
    }
}

impl fmt::Display for HeadingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "H{}", self.depth())
    }
}

/// Classification decided for a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockClass {
    /// The document title (at most one per document)
    Title,
    /// A heading at the given level
    Heading(HeadingLevel),
    /// Body text
    Body,
}

impl BlockClass {
    /// Heading level, if this is a heading.
    pub fn heading_level(self) -> Option<HeadingLevel> {
        match self {
            BlockClass::Heading(level) => Some(level),
            _ => None,
        }
    }
}

/// Kind of evidence a signal evaluator contributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    /// A registry pattern matched the block text
    Pattern,
    /// The block's font size falls in a heading tier
    SizeTier,
    /// The block is bold or outdented relative to body text
    Emphasis,
}

/// One evaluator's reading of a block.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    /// Which evaluator produced it
    pub kind: SignalKind,
    /// Level implied by the signal, if it implies one
    pub level: Option<HeadingLevel>,
    /// Confidence in `0.0..=1.0`
    pub confidence: f32,
}

impl Signal {
    /// Create a new signal.
    pub fn new(kind: SignalKind, level: Option<HeadingLevel>, confidence: f32) -> Self {
        Self {
            kind,
            level,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }
}

/// Which evidence produced the final decision for a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionSource {
    /// Pattern match only
    Pattern,
    /// Size tier (with emphasis) only
    SizeTier,
    /// Pattern and size tier agreed on headingness; pattern level wins
    Both,
    /// Chosen as document title
    Title,
    /// No heading evidence
    None,
}

/// A block with its decided class and the evidence behind it.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadingCandidate<'a> {
    /// Index of the block within the document
    pub block_index: usize,
    /// The originating block
    pub block: &'a TextBlock,
    /// Decided class
    pub class: BlockClass,
    /// Which signals produced the decision
    pub source: DecisionSource,
    /// All signals raised for the block, in evaluator order
    pub signals: Vec<Signal>,
    /// Text to emit (the merged title text for the title candidate)
    pub text: String,
}

impl<'a> HeadingCandidate<'a> {
    /// Create a body candidate.
    pub fn body(block_index: usize, block: &'a TextBlock) -> Self {
        Self {
            block_index,
            block,
            class: BlockClass::Body,
            source: DecisionSource::None,
            signals: Vec::new(),
            text: block.text.trim().to_string(),
        }
    }

    /// Page of the originating block.
    pub fn page(&self) -> u32 {
        self.block.page
    }

    /// Whether the candidate is a heading (not title, not body).
    pub fn is_heading(&self) -> bool {
        matches!(self.class, BlockClass::Heading(_))
    }
}

/// A single outline entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineNode {
    /// Heading level
    pub level: HeadingLevel,
    /// Heading text (never blank)
    pub text: String,
    /// Page number (1-indexed)
    pub page: u32,
    /// Index of the originating block within the document
    #[serde(skip)]
    pub block_index: usize,
}

impl OutlineNode {
    /// Create a new outline node.
    pub fn new(level: HeadingLevel, text: impl Into<String>, page: u32, block_index: usize) -> Self {
        Self {
            level,
            text: text.into(),
            page,
            block_index,
        }
    }
}

/// Document title plus ordered heading list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outline {
    /// Document title
    pub title: String,
    /// Headings in document order
    pub outline: Vec<OutlineNode>,
}

impl Outline {
    /// Create a title-only outline.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            outline: Vec::new(),
        }
    }

    /// Check if the outline has no headings.
    pub fn is_empty(&self) -> bool {
        self.outline.is_empty()
    }

    /// Number of headings.
    pub fn len(&self) -> usize {
        self.outline.len()
    }

    /// Iterate over headings of a given level.
    pub fn headings_at(&self, level: HeadingLevel) -> impl Iterator<Item = &OutlineNode> {
        self.outline.iter().filter(move |n| n.level == level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_from_depth() {
        assert_eq!(HeadingLevel::from_depth(0), HeadingLevel::H1);
        assert_eq!(HeadingLevel::from_depth(1), HeadingLevel::H1);
        assert_eq!(HeadingLevel::from_depth(2), HeadingLevel::H2);
        assert_eq!(HeadingLevel::from_depth(7), HeadingLevel::H3);
        assert_eq!(HeadingLevel::from_tier(1), HeadingLevel::H2);
    }

    #[test]
    fn test_level_parse_and_display() {
        assert_eq!(HeadingLevel::parse("H2"), Some(HeadingLevel::H2));
        assert_eq!(HeadingLevel::parse("h3"), Some(HeadingLevel::H3));
        assert_eq!(HeadingLevel::parse("1"), Some(HeadingLevel::H1));
        assert_eq!(HeadingLevel::parse("H4"), None);
        assert_eq!(HeadingLevel::H2.to_string(), "H2");
    }

    #[test]
    fn test_outline_node_serialization() {
        let node = OutlineNode::new(HeadingLevel::H1, "1. Background", 1, 4);
        let json = serde_json::to_string(&node).unwrap();
        assert_eq!(json, r#"{"level":"H1","text":"1. Background","page":1}"#);
    }

    #[test]
    fn test_outline_headings_at() {
        let mut outline = Outline::new("Doc");
        outline.outline.push(OutlineNode::new(HeadingLevel::H1, "A", 1, 0));
        outline.outline.push(OutlineNode::new(HeadingLevel::H2, "A.1", 1, 1));
        outline.outline.push(OutlineNode::new(HeadingLevel::H1, "B", 2, 2));

        assert_eq!(outline.len(), 3);
        assert_eq!(outline.headings_at(HeadingLevel::H1).count(), 2);
    }
}
