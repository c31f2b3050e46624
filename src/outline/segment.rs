//! Section segmentation.
//!
//! Carves a document's reading-order text into contiguous sections bounded by
//! its outline headings. Concatenating the sections of a document yields its
//! [`body_text`](crate::model::LayoutDocument::body_text) exactly.

use crate::model::{LayoutDocument, Outline, OutlineNode, Section, SectionStart};

/// Split `doc` into sections at the outline's heading blocks.
///
/// Text before the first heading becomes a preamble section titled with the
/// document title; a document without headings is a single preamble.
pub fn segment(doc: &LayoutDocument, outline: &Outline, document_order: usize) -> Vec<Section> {
    if doc.blocks.is_empty() {
        return Vec::new();
    }

    let body = doc.body_text();
    let offsets = doc.block_offsets();
    let block_count = doc.blocks.len();

    // Heading boundaries, strictly increasing and within range
    let mut boundaries: Vec<&OutlineNode> = Vec::with_capacity(outline.len());
    for node in &outline.outline {
        let after_last = boundaries.last().map_or(true, |b| node.block_index > b.block_index);
        if node.block_index < block_count && after_last {
            boundaries.push(node);
        }
    }

    let preamble_title = if outline.title.trim().is_empty() {
        doc.id.clone()
    } else {
        outline.title.clone()
    };

    let mut starts: Vec<(usize, SectionStart, String)> = Vec::with_capacity(boundaries.len() + 1);
    let first_heading = boundaries.first().map_or(block_count, |n| n.block_index);
    if first_heading > 0 {
        starts.push((0, SectionStart::Preamble, preamble_title));
    }
    for node in &boundaries {
        starts.push((
            node.block_index,
            SectionStart::Heading((*node).clone()),
            node.text.clone(),
        ));
    }

    let mut sections = Vec::with_capacity(starts.len());
    for (i, (start_block, start, title)) in starts.iter().enumerate() {
        let end_block = starts.get(i + 1).map_or(block_count, |next| next.0);
        let range = offsets[*start_block]..offsets[end_block];

        sections.push(Section {
            document: doc.id.clone(),
            document_order,
            index: i,
            start: start.clone(),
            title: title.clone(),
            text: body[range.clone()].to_string(),
            start_page: doc.blocks[*start_block].page,
            end_page: doc.blocks[end_block - 1].page,
            byte_range: range,
        });
    }

    log::debug!("{}: {} sections", doc.id, sections.len());
    sections
}
