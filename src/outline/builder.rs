//! Outline assembly from classified blocks.

use crate::classify::Classification;
use crate::model::{LayoutDocument, Outline, OutlineNode};

/// Build the document outline from its classification.
///
/// The title is the title candidate's text, or the first non-empty block
/// when no title was chosen. Headings are emitted in document order with
/// the classifier's levels unchanged, so a jump from H1 to H3 is kept.
pub fn build_outline(doc: &LayoutDocument, classification: &Classification<'_>) -> Outline {
    let title = match classification.title() {
        Some(candidate) => candidate.text.clone(),
        None => doc
            .first_text_block()
            .map(|b| b.text.trim().to_string())
            .unwrap_or_default(),
    };

    let mut outline = Outline::new(title);
    for candidate in classification.headings() {
        let Some(level) = candidate.class.heading_level() else {
            continue;
        };
        let text = candidate.text.trim();
        if text.is_empty() {
            continue;
        }
        outline.outline.push(OutlineNode::new(
            level,
            text,
            candidate.page().max(1),
            candidate.block_index,
        ));
    }

    log::debug!("{}: outline with {} headings", doc.id, outline.len());
    outline
}
