//! Document-level types.

use super::TextBlock;
use serde::{Deserialize, Serialize};

/// A document reduced to its ordered text blocks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayoutDocument {
    /// Document identifier (usually the file name)
    pub id: String,

    /// Number of pages reported by the decoder
    pub page_count: u32,

    /// Blocks in reading order: strictly ordered by (page, vertical position)
    pub blocks: Vec<TextBlock>,
}

impl LayoutDocument {
    /// Create a new document.
    pub fn new(id: impl Into<String>, page_count: u32, blocks: Vec<TextBlock>) -> Self {
        Self {
            id: id.into(),
            page_count,
            blocks,
        }
    }

    /// Check if the document has no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Byte offset of each block within [`body_text`](Self::body_text).
    ///
    /// The returned vector has one more entry than there are blocks; the
    /// last entry is the total length.
    pub fn block_offsets(&self) -> Vec<usize> {
        let mut offsets = Vec::with_capacity(self.blocks.len() + 1);
        let mut pos = 0;
        for block in &self.blocks {
            offsets.push(pos);
            pos += block.text.len() + 1;
        }
        offsets.push(pos);
        offsets
    }

    /// Full reading-order text: every block followed by a newline.
    pub fn body_text(&self) -> String {
        let mut text = String::with_capacity(self.blocks.iter().map(|b| b.text.len() + 1).sum());
        for block in &self.blocks {
            text.push_str(&block.text);
            text.push('\n');
        }
        text
    }

    /// First non-empty block, if any.
    pub fn first_text_block(&self) -> Option<&TextBlock> {
        self.blocks.iter().find(|b| !b.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_new() {
        let doc = LayoutDocument::default();
        assert!(doc.is_empty());
        assert_eq!(doc.body_text(), "");
        assert_eq!(doc.block_offsets(), vec![0]);
    }

    #[test]
    fn test_offsets_match_body_text() {
        let doc = LayoutDocument::new(
            "a.pdf",
            1,
            vec![
                TextBlock::new(1, "Intro", 18.0, true, 72.0, 80.0),
                TextBlock::new(1, "Body text", 11.0, false, 72.0, 100.0),
            ],
        );
        let text = doc.body_text();
        let offsets = doc.block_offsets();
        assert_eq!(text, "Intro\nBody text\n");
        assert_eq!(offsets, vec![0, 6, 16]);
        assert_eq!(&text[offsets[1]..offsets[2]], "Body text\n");
    }
}
