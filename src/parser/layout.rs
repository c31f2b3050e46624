//! Layout feature extraction.
//!
//! Turns decoded text spans into ordered text blocks: one block per run of
//! adjacent spans on the same visual line, annotated with the dominant font
//! size, bold flag and left indentation.

use std::collections::{BTreeMap, HashMap};

use super::backend::{is_spaceless_script_char, SpanSource};
use super::normalize::normalize_text;
use super::options::{ErrorMode, ExtractOptions};
use crate::error::Result;
use crate::model::{LayoutDocument, TextBlock, TextSpan};

/// Layout extractor that groups spans into lines and blocks.
#[derive(Debug, Clone, Default)]
pub struct LayoutExtractor {
    options: ExtractOptions,
}

impl LayoutExtractor {
    /// Create a new extractor.
    pub fn new(options: ExtractOptions) -> Self {
        Self { options }
    }

    /// Extraction options in effect.
    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Decode every page of `source` and build the document's blocks.
    ///
    /// In lenient mode a page that fails to decode is logged and skipped;
    /// the document only fails when no page at all could be decoded.
    pub fn extract<S: SpanSource + ?Sized>(&self, id: &str, source: &S) -> Result<LayoutDocument> {
        let pages = source.page_numbers();
        let mut spans = Vec::new();
        let mut first_error = None;
        let mut failed = 0;

        for &page in &pages {
            match source.page_spans(page) {
                Ok(page_spans) => spans.extend(page_spans),
                Err(e) => {
                    if self.options.error_mode == ErrorMode::Strict {
                        return Err(e);
                    }
                    log::warn!("{}: skipping page {}: {}", id, page, e);
                    failed += 1;
                    first_error.get_or_insert(e);
                }
            }
        }

        if failed > 0 && failed == pages.len() {
            if let Some(e) = first_error {
                return Err(e);
            }
        }

        Ok(self.build_document(id, pages.len() as u32, spans))
    }

    /// Build a document from already decoded spans.
    pub fn build_document(&self, id: &str, page_count: u32, spans: Vec<TextSpan>) -> LayoutDocument {
        let span_total = spans.len();
        let spans = self.prepare_spans(spans);
        let spans = dedup_overprint(spans, self.options.dedup_tolerance);

        let mut by_page: BTreeMap<u32, Vec<TextSpan>> = BTreeMap::new();
        for span in spans {
            by_page.entry(span.page).or_default().push(span);
        }

        let mut blocks = Vec::new();
        for (_, page_spans) in by_page {
            for row in self.group_rows(page_spans) {
                for segment in self.split_row(row) {
                    if let Some(block) = merge_spans(segment) {
                        blocks.push(block);
                    }
                }
            }
        }

        let mut blocks = dedup_lines(blocks, self.options.duplicate_line_tolerance);
        blocks.sort_by(|a, b| {
            a.page
                .cmp(&b.page)
                .then(a.y.total_cmp(&b.y))
                .then(a.x.total_cmp(&b.x))
        });

        log::debug!(
            "{}: {} spans -> {} blocks over {} pages",
            id,
            span_total,
            blocks.len(),
            page_count
        );
        LayoutDocument::new(id, page_count, blocks)
    }

    /// Drop blank spans and normalize the rest.
    fn prepare_spans(&self, spans: Vec<TextSpan>) -> Vec<TextSpan> {
        spans
            .into_iter()
            .filter(|s| !s.is_blank() && s.font_size > 0.0)
            .map(|mut s| {
                if self.options.normalize_text {
                    s.text = normalize_text(&s.text);
                }
                s
            })
            .filter(|s| !s.is_blank())
            .collect()
    }

    /// Group one page's spans into visual rows, top to bottom.
    fn group_rows(&self, mut spans: Vec<TextSpan>) -> Vec<Vec<TextSpan>> {
        spans.sort_by(|a, b| a.y.total_cmp(&b.y).then(a.x.total_cmp(&b.x)));

        let mut rows: Vec<Vec<TextSpan>> = Vec::new();
        let mut anchor_y = f32::NEG_INFINITY;
        let mut anchor_size = 0.0f32;

        for span in spans {
            let tolerance = span.font_size.max(anchor_size) * self.options.y_tolerance_ratio;
            match rows.last_mut() {
                Some(row) if (span.y - anchor_y).abs() <= tolerance => row.push(span),
                _ => {
                    anchor_y = span.y;
                    anchor_size = span.font_size;
                    rows.push(vec![span]);
                }
            }
        }
        rows
    }

    /// Split a row wherever the horizontal gap between spans is too wide.
    fn split_row(&self, mut row: Vec<TextSpan>) -> Vec<Vec<TextSpan>> {
        row.sort_by(|a, b| a.x.total_cmp(&b.x));

        let mut segments: Vec<Vec<TextSpan>> = Vec::new();
        for span in row {
            match segments.last_mut() {
                Some(segment) => {
                    let split = segment.last().is_some_and(|prev| {
                        let gap = span.x - prev.right();
                        gap > prev.font_size.max(span.font_size) * self.options.x_gap_ratio
                    });
                    if split {
                        segments.push(vec![span]);
                    } else {
                        segment.push(span);
                    }
                }
                None => segments.push(vec![span]),
            }
        }
        segments
    }
}

/// Remove glyph runs painted twice at (almost) the same origin.
fn dedup_overprint(spans: Vec<TextSpan>, tolerance: f32) -> Vec<TextSpan> {
    let mut seen: HashMap<(u32, String), Vec<(f32, f32)>> = HashMap::new();
    let mut kept = Vec::with_capacity(spans.len());

    for span in spans {
        let origins = seen.entry((span.page, span.text.trim().to_string())).or_default();
        let duplicate = origins
            .iter()
            .any(|&(x, y)| (x - span.x).abs() <= tolerance && (y - span.y).abs() <= tolerance);
        if duplicate {
            continue;
        }
        origins.push((span.x, span.y));
        kept.push(span);
    }
    kept
}

/// Remove repeated lines on one page that sit within `tolerance` points vertically.
fn dedup_lines(blocks: Vec<TextBlock>, tolerance: f32) -> Vec<TextBlock> {
    let mut seen: HashMap<(u32, String), Vec<f32>> = HashMap::new();
    let mut kept = Vec::with_capacity(blocks.len());

    for block in blocks {
        let ys = seen.entry((block.page, block.text.clone())).or_default();
        if ys.iter().any(|&y| (y - block.y).abs() < tolerance) {
            continue;
        }
        ys.push(block.y);
        kept.push(block);
    }
    kept
}

/// Merge the spans of one segment into a block.
///
/// The block's font size is the size covering the most characters (ties go
/// to the larger size); it is bold when more than half its characters are.
fn merge_spans(spans: Vec<TextSpan>) -> Option<TextBlock> {
    let first = spans.first()?;
    let page = first.page;
    let y = first.y;

    let text = join_span_text(&spans).trim().to_string();
    if text.is_empty() {
        return None;
    }

    // Quantize to tenths of a point so float noise does not split buckets
    let mut size_chars: BTreeMap<i32, usize> = BTreeMap::new();
    let mut bold_chars = 0;
    let mut total_chars = 0;
    let mut x = f32::INFINITY;

    for span in &spans {
        let chars = span.text.trim().chars().count();
        *size_chars
            .entry((span.font_size * 10.0).round() as i32)
            .or_default() += chars;
        if span.is_bold {
            bold_chars += chars;
        }
        total_chars += chars;
        x = x.min(span.x);
    }

    let font_size = size_chars
        .iter()
        .max_by(|a, b| a.1.cmp(b.1).then(a.0.cmp(b.0)))
        .map(|(&size, _)| size as f32 / 10.0)
        .unwrap_or(first.font_size);

    let is_bold = total_chars > 0 && bold_chars * 2 > total_chars;

    let mut block = TextBlock::new(page, text, font_size, is_bold, x, y);
    block.span_count = spans.len();
    Some(block)
}

/// Concatenate span text, inserting spaces at visible gaps.
///
/// No space is inserted between two characters of a script that does not
/// separate words with spaces.
fn join_span_text(spans: &[TextSpan]) -> String {
    let mut result = String::new();

    for (i, span) in spans.iter().enumerate() {
        if i == 0 {
            result.push_str(&span.text);
            continue;
        }

        let prev = &spans[i - 1];
        let gap = span.x - prev.right();

        let char_count = span.text.chars().count();
        let avg_char_width = if char_count > 0 && span.width > 0.0 {
            span.width / char_count as f32
        } else {
            span.font_size * 0.5
        };
        let space_threshold = avg_char_width * 0.2;

        let should_insert_space = gap > space_threshold && {
            let prev_is_cjk = prev
                .text
                .chars()
                .last()
                .is_some_and(is_spaceless_script_char);
            let curr_is_cjk = span.text.chars().next().is_some_and(is_spaceless_script_char);
            !(prev_is_cjk && curr_is_cjk)
        };

        let prev_ends_with_space = result.ends_with(' ') || result.ends_with('\u{00A0}');
        let curr_starts_with_space = span.text.starts_with(' ') || span.text.starts_with('\u{00A0}');

        if should_insert_space && !prev_ends_with_space && !curr_starts_with_space {
            result.push(' ');
        }
        result.push_str(&span.text);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::parser::backend::MemorySpanSource;

    fn span(page: u32, text: &str, x: f32, y: f32, size: f32) -> TextSpan {
        TextSpan::new(page, text, x, y, size, "Helvetica")
    }

    #[test]
    fn test_spans_on_one_baseline_merge() {
        let extractor = LayoutExtractor::default();
        let doc = extractor.build_document(
            "t",
            1,
            vec![
                span(1, "World", 103.0, 100.5, 12.0),
                span(1, "Hello", 70.0, 100.0, 12.0),
            ],
        );
        assert_eq!(doc.blocks.len(), 1);
        assert_eq!(doc.blocks[0].text, "Hello World");
        assert_eq!(doc.blocks[0].x, 70.0);
        assert_eq!(doc.blocks[0].span_count, 2);
    }

    #[test]
    fn test_wide_gap_splits_row() {
        let extractor = LayoutExtractor::default();
        let doc = extractor.build_document(
            "t",
            1,
            vec![span(1, "Left", 72.0, 100.0, 10.0), span(1, "Right", 400.0, 100.0, 10.0)],
        );
        let texts: Vec<&str> = doc.blocks.iter().map(|b| b.text.as_str()).collect();
        assert_eq!(texts, vec!["Left", "Right"]);
    }

    #[test]
    fn test_blank_spans_dropped_and_reading_order() {
        let extractor = LayoutExtractor::default();
        let doc = extractor.build_document(
            "t",
            2,
            vec![
                span(2, "Second page", 72.0, 50.0, 10.0),
                span(1, "   ", 72.0, 10.0, 10.0),
                span(1, "Lower", 72.0, 300.0, 10.0),
                span(1, "Upper", 72.0, 100.0, 10.0),
            ],
        );
        let texts: Vec<&str> = doc.blocks.iter().map(|b| b.text.as_str()).collect();
        assert_eq!(texts, vec!["Upper", "Lower", "Second page"]);
    }

    #[test]
    fn test_dominant_size_and_bold() {
        let extractor = LayoutExtractor::default();
        let doc = extractor.build_document(
            "t",
            1,
            vec![
                span(1, "Chapter", 72.0, 100.0, 18.0).with_bold(true),
                span(1, "1", 142.0, 100.0, 12.0),
            ],
        );
        assert_eq!(doc.blocks.len(), 1);
        assert_eq!(doc.blocks[0].font_size, 18.0);
        assert!(doc.blocks[0].is_bold);
    }

    #[test]
    fn test_overprint_and_duplicate_lines_removed() {
        let extractor = LayoutExtractor::default();
        let doc = extractor.build_document(
            "t",
            1,
            vec![
                span(1, "Bold", 72.0, 100.0, 12.0),
                span(1, "Bold", 72.4, 100.3, 12.0),
                span(1, "Footer", 72.0, 700.0, 8.0),
                span(1, "Footer", 300.0, 701.0, 8.0),
            ],
        );
        let texts: Vec<&str> = doc.blocks.iter().map(|b| b.text.as_str()).collect();
        assert_eq!(texts, vec!["Bold", "Footer"]);
    }

    #[test]
    fn test_cjk_spans_join_without_space() {
        let extractor = LayoutExtractor::default();
        let doc = extractor.build_document(
            "t",
            1,
            vec![span(1, "日本", 72.0, 100.0, 12.0), span(1, "語", 86.0, 100.0, 12.0)],
        );
        assert_eq!(doc.blocks[0].text, "日本語");
    }

    #[test]
    fn test_extract_from_source() {
        let source = MemorySpanSource::new(vec![span(1, "Only line", 72.0, 100.0, 12.0)]).with_page(2);
        let doc = LayoutExtractor::default().extract("mem", &source).unwrap();
        assert_eq!(doc.page_count, 2);
        assert_eq!(doc.blocks.len(), 1);
    }

    struct FailingSource;

    impl SpanSource for FailingSource {
        fn page_numbers(&self) -> Vec<u32> {
            vec![1, 2]
        }

        fn page_spans(&self, page: u32) -> Result<Vec<TextSpan>> {
            if page == 1 {
                Ok(vec![TextSpan::new(1, "Kept", 72.0, 100.0, 12.0, "Helvetica")])
            } else {
                Err(Error::PdfParse("broken page".to_string()))
            }
        }
    }

    #[test]
    fn test_error_modes() {
        let lenient = LayoutExtractor::default().extract("f", &FailingSource).unwrap();
        assert_eq!(lenient.blocks.len(), 1);

        let strict = LayoutExtractor::new(ExtractOptions::new().with_error_mode(ErrorMode::Strict));
        assert!(strict.extract("f", &FailingSource).is_err());
    }
}
