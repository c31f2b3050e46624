//! Section types produced by the segmenter.

use std::ops::Range;

use serde::Serialize;

use super::OutlineNode;

/// Where a section starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SectionStart {
    /// Text preceding the first heading (or the whole document when there is none)
    Preamble,
    /// An outline heading
    Heading(OutlineNode),
}

impl SectionStart {
    /// Block index of the start heading, `None` for the preamble.
    pub fn block_index(&self) -> Option<usize> {
        match self {
            SectionStart::Preamble => None,
            SectionStart::Heading(node) => Some(node.block_index),
        }
    }
}

/// A contiguous span of a document's body text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    /// Document identifier
    pub document: String,
    /// Position of the document in the run's submission order
    pub document_order: usize,
    /// Position of the section within its document
    pub index: usize,
    /// Start boundary
    pub start: SectionStart,
    /// Display title: heading text, or the document title for the preamble
    pub title: String,
    /// Section text, including the heading line
    pub text: String,
    /// First page covered
    pub start_page: u32,
    /// Last page covered
    pub end_page: u32,
    /// Byte range within the document body text
    #[serde(skip)]
    pub byte_range: Range<usize>,
}

impl Section {
    /// Identity used for deduplication: document plus start boundary.
    pub fn key(&self) -> (&str, Option<usize>) {
        (self.document.as_str(), self.start.block_index())
    }

    /// Whether this is the synthetic preamble section.
    pub fn is_preamble(&self) -> bool {
        matches!(self.start, SectionStart::Preamble)
    }

    /// Section text without the leading heading line.
    pub fn body(&self) -> &str {
        match self.start {
            SectionStart::Preamble => &self.text,
            SectionStart::Heading(_) => match self.text.split_once('\n') {
                Some((_, rest)) => rest,
                None => "",
            },
        }
    }
}
