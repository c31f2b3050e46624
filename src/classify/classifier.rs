//! Heading classification.
//!
//! Fuses font-size tiers, emphasis and language patterns into a per-block
//! decision: title, H1-H3 or body.

use std::collections::BTreeSet;

use super::options::ClassifierOptions;
use super::patterns::PatternRegistry;
use super::signals::{default_evaluators, BlockContext, SignalEvaluator};
use super::stats::{size_key, FontStatistics};
use crate::model::{
    BlockClass, DecisionSource, HeadingCandidate, LayoutDocument, Signal, SignalKind, TextBlock,
};

/// Result of classifying one document.
#[derive(Debug, Clone)]
pub struct Classification<'a> {
    /// One candidate per block, in document order
    pub candidates: Vec<HeadingCandidate<'a>>,
    /// Font statistics used for the decisions
    pub stats: FontStatistics,
    /// Language whose patterns were applied (after fallback)
    pub language: String,
}

impl<'a> Classification<'a> {
    /// The title candidate, if one was chosen.
    pub fn title(&self) -> Option<&HeadingCandidate<'a>> {
        self.candidates.iter().find(|c| c.class == BlockClass::Title)
    }

    /// Heading candidates in document order.
    pub fn headings(&self) -> impl Iterator<Item = &HeadingCandidate<'a>> {
        self.candidates.iter().filter(|c| c.is_heading())
    }
}

/// Heading classifier bound to a pattern registry.
pub struct HeadingClassifier<'r> {
    registry: &'r PatternRegistry,
    options: ClassifierOptions,
    evaluators: Vec<Box<dyn SignalEvaluator>>,
}

impl<'r> HeadingClassifier<'r> {
    /// Create a classifier with the default evaluators.
    pub fn new(registry: &'r PatternRegistry, options: ClassifierOptions) -> Self {
        Self {
            registry,
            options,
            evaluators: default_evaluators(),
        }
    }

    /// Append an extra evaluator. Its signals are recorded on the candidates
    /// but do not change the precedence of the built-in signals.
    pub fn with_evaluator(mut self, evaluator: Box<dyn SignalEvaluator>) -> Self {
        self.evaluators.push(evaluator);
        self
    }

    /// Classifier options in effect.
    pub fn options(&self) -> &ClassifierOptions {
        &self.options
    }

    /// Classify every block of `doc` using the patterns of `language`.
    pub fn classify<'a>(&self, doc: &'a LayoutDocument, language: &str) -> Classification<'a> {
        let blocks = &doc.blocks;
        let mut stats = FontStatistics::from_blocks(blocks);

        let title = self.select_title(blocks, &stats);
        let title_blocks: BTreeSet<usize> = title
            .as_ref()
            .map(|t| t.blocks.iter().copied().collect())
            .unwrap_or_default();
        stats.compute_tiers(blocks, &title_blocks, &self.options);

        let resolved = self.registry.resolve(language).to_string();
        let patterns = self.registry.patterns(language);
        let title_text = title.as_ref().map(|t| t.text.to_lowercase());

        let mut candidates = Vec::with_capacity(blocks.len());
        for (index, block) in blocks.iter().enumerate() {
            if let Some(title) = &title {
                // Running headers and cover matter above the title stay body text
                if title.blocks.first().is_some_and(|&anchor| index < anchor) {
                    candidates.push(HeadingCandidate::body(index, block));
                    continue;
                }
                if title.blocks.first() == Some(&index) {
                    candidates.push(HeadingCandidate {
                        block_index: index,
                        block,
                        class: BlockClass::Title,
                        source: DecisionSource::Title,
                        signals: Vec::new(),
                        text: title.text.clone(),
                    });
                    continue;
                }
                if title_blocks.contains(&index) {
                    // Continuation line of a multi-line title
                    let mut candidate = HeadingCandidate::body(index, block);
                    candidate.source = DecisionSource::Title;
                    candidates.push(candidate);
                    continue;
                }
            }

            if !self.passes_shape_gate(block, title_text.as_deref()) {
                candidates.push(HeadingCandidate::body(index, block));
                continue;
            }

            let ctx = BlockContext {
                block,
                stats: &stats,
                patterns,
                options: &self.options,
            };
            let signals: Vec<Signal> = self
                .evaluators
                .iter()
                .filter_map(|e| e.evaluate(&ctx))
                .collect();

            let (class, source) = resolve(&signals);
            candidates.push(HeadingCandidate {
                block_index: index,
                block,
                class,
                source,
                signals,
                text: block.text.trim().to_string(),
            });
        }

        let classification = Classification {
            candidates,
            stats,
            language: resolved,
        };
        log::debug!(
            "{}: title={:?}, {} headings (language {})",
            doc.id,
            classification.title().map(|t| t.text.as_str()),
            classification.headings().count(),
            classification.language
        );
        classification
    }

    /// First block at the maximum font size, when that size exceeds body text.
    fn select_title(&self, blocks: &[TextBlock], stats: &FontStatistics) -> Option<TitleSelection> {
        if !stats.is_heading_size(stats.max_size, &self.options) {
            return None;
        }
        let max_key = size_key(stats.max_size);
        let anchor = blocks
            .iter()
            .position(|b| !b.is_empty() && size_key(b.font_size) == max_key)?;

        let mut selection = TitleSelection {
            blocks: vec![anchor],
            text: blocks[anchor].text.trim().to_string(),
        };

        if self.options.merge_title_lines {
            let mut prev = &blocks[anchor];
            for (index, block) in blocks.iter().enumerate().skip(anchor + 1) {
                let continues = block.page == prev.page
                    && size_key(block.font_size) == max_key
                    && block.y - prev.y <= block.font_size * 2.0;
                if !continues {
                    break;
                }
                selection.blocks.push(index);
                selection.text.push(' ');
                selection.text.push_str(block.text.trim());
                prev = block;
            }
        }

        Some(selection)
    }

    /// Text-shape checks every heading must pass.
    fn passes_shape_gate(&self, block: &TextBlock, title: Option<&str>) -> bool {
        let text = block.text.trim();
        if text.chars().filter(|c| !c.is_whitespace()).count() < self.options.min_heading_chars {
            return false;
        }
        if block.alpha_ratio() < self.options.min_alpha_ratio {
            return false;
        }
        if block.word_count() > self.options.max_heading_words {
            return false;
        }
        if let Some(title) = title {
            let similarity = strsim::normalized_levenshtein(&text.to_lowercase(), title);
            if similarity >= self.options.title_similarity {
                log::trace!("suppressing running title {:?}", text);
                return false;
            }
        }
        true
    }
}

/// Chosen title blocks and their merged text.
struct TitleSelection {
    blocks: Vec<usize>,
    text: String,
}

/// Fixed precedence: a pattern decides the level on its own; otherwise a
/// size tier needs emphasis to make a heading.
fn resolve(signals: &[Signal]) -> (BlockClass, DecisionSource) {
    let find = |kind: SignalKind| signals.iter().find(|s| s.kind == kind);

    let pattern = find(SignalKind::Pattern);
    let tier = find(SignalKind::SizeTier);
    let emphasis = find(SignalKind::Emphasis);

    match (pattern.and_then(|s| s.level), tier.and_then(|s| s.level)) {
        (Some(level), Some(_)) => (BlockClass::Heading(level), DecisionSource::Both),
        (Some(level), None) => (BlockClass::Heading(level), DecisionSource::Pattern),
        (None, Some(level)) if emphasis.is_some() => {
            (BlockClass::Heading(level), DecisionSource::SizeTier)
        }
        _ => (BlockClass::Body, DecisionSource::None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::HeadingLevel;

    fn body_lines(page: u32, count: usize, start_y: f32) -> Vec<TextBlock> {
        (0..count)
            .map(|i| {
                TextBlock::new(
                    page,
                    "plain body text goes here",
                    11.0,
                    false,
                    72.0,
                    start_y + i as f32 * 14.0,
                )
            })
            .collect()
    }

    fn doc(blocks: Vec<TextBlock>) -> LayoutDocument {
        LayoutDocument::new("test.pdf", 3, blocks)
    }

    fn levels(classification: &Classification<'_>) -> Vec<(String, BlockClass)> {
        classification
            .candidates
            .iter()
            .filter(|c| c.class != BlockClass::Body)
            .map(|c| (c.text.clone(), c.class))
            .collect()
    }

    #[test]
    fn test_size_tier_with_emphasis() {
        let mut blocks = vec![TextBlock::new(1, "Annual Report", 24.0, true, 200.0, 60.0)];
        blocks.push(TextBlock::new(1, "Highlights", 16.0, true, 72.0, 120.0));
        blocks.extend(body_lines(1, 5, 140.0));
        blocks.push(TextBlock::new(1, "Large but plain", 16.0, false, 72.0, 300.0));
        blocks.push(TextBlock::new(2, "Details", 13.0, true, 72.0, 60.0));
        blocks.extend(body_lines(2, 5, 80.0));
        let doc = doc(blocks);

        let registry = PatternRegistry::default();
        let classifier = HeadingClassifier::new(&registry, ClassifierOptions::default());
        let result = classifier.classify(&doc, "en");

        // 16pt is split evenly on boldness, so each block keeps its own flag
        assert_eq!(
            levels(&result),
            vec![
                ("Annual Report".to_string(), BlockClass::Title),
                ("Highlights".to_string(), BlockClass::Heading(HeadingLevel::H1)),
                ("Details".to_string(), BlockClass::Heading(HeadingLevel::H2)),
            ]
        );
    }

    #[test]
    fn test_pattern_overrides_size_tier() {
        let mut blocks = vec![TextBlock::new(1, "Guide", 24.0, true, 72.0, 40.0)];
        // Largest heading tier, but the numbering says second level
        blocks.push(TextBlock::new(1, "3.1 Setup", 18.0, true, 72.0, 80.0));
        // Body-sized, not bold, still a pattern hit
        blocks.push(TextBlock::new(1, "4. Results", 11.0, false, 72.0, 100.0));
        blocks.extend(body_lines(1, 6, 120.0));
        let doc = doc(blocks);

        let registry = PatternRegistry::builtin().unwrap();
        let classifier = HeadingClassifier::new(&registry, ClassifierOptions::default());
        let result = classifier.classify(&doc, "en");

        let setup = &result.candidates[1];
        assert_eq!(setup.class, BlockClass::Heading(HeadingLevel::H2));
        assert_eq!(setup.source, DecisionSource::Both);

        let results = &result.candidates[2];
        assert_eq!(results.class, BlockClass::Heading(HeadingLevel::H1));
        assert_eq!(results.source, DecisionSource::Pattern);
    }

    #[test]
    fn test_blocks_before_title_are_body() {
        let mut blocks = vec![
            TextBlock::new(1, "ACME Corporation", 14.0, true, 72.0, 20.0),
            TextBlock::new(1, "1. Confidential", 11.0, false, 72.0, 36.0),
            TextBlock::new(1, "Quarterly Review", 24.0, true, 72.0, 80.0),
            TextBlock::new(1, "Summary", 14.0, true, 72.0, 130.0),
        ];
        blocks.extend(body_lines(1, 6, 150.0));
        let doc = doc(blocks);

        let registry = PatternRegistry::builtin().unwrap();
        let result = HeadingClassifier::new(&registry, ClassifierOptions::default()).classify(&doc, "en");

        assert_eq!(result.candidates[0].class, BlockClass::Body);
        assert_eq!(result.candidates[1].class, BlockClass::Body);
        assert_eq!(
            levels(&result),
            vec![
                ("Quarterly Review".to_string(), BlockClass::Title),
                ("Summary".to_string(), BlockClass::Heading(HeadingLevel::H1)),
            ]
        );
    }

    #[test]
    fn test_single_title_on_tied_max_size() {
        let mut blocks = vec![TextBlock::new(1, "First Big", 20.0, true, 72.0, 40.0)];
        blocks.extend(body_lines(1, 4, 80.0));
        blocks.push(TextBlock::new(2, "Second Big", 20.0, true, 72.0, 40.0));
        blocks.extend(body_lines(2, 4, 80.0));
        let doc = doc(blocks);

        let registry = PatternRegistry::default();
        let result = HeadingClassifier::new(&registry, ClassifierOptions::default()).classify(&doc, "en");

        let titles: Vec<_> = result
            .candidates
            .iter()
            .filter(|c| c.class == BlockClass::Title)
            .collect();
        assert_eq!(titles.len(), 1);
        assert_eq!(titles[0].text, "First Big");
        // The other max-size block becomes a heading in the top tier
        assert_eq!(result.candidates[5].class, BlockClass::Heading(HeadingLevel::H1));
    }

    #[test]
    fn test_multi_line_title_merged() {
        let mut blocks = vec![
            TextBlock::new(1, "Understanding Large", 22.0, true, 100.0, 60.0),
            TextBlock::new(1, "Document Collections", 22.0, true, 100.0, 88.0),
        ];
        blocks.extend(body_lines(1, 5, 140.0));
        let doc = doc(blocks);

        let registry = PatternRegistry::default();
        let result = HeadingClassifier::new(&registry, ClassifierOptions::default()).classify(&doc, "en");

        assert_eq!(
            result.title().map(|t| t.text.as_str()),
            Some("Understanding Large Document Collections")
        );
        assert_eq!(result.candidates[1].class, BlockClass::Body);
        assert_eq!(result.candidates[1].source, DecisionSource::Title);
        assert!(result.stats.tier_sizes.is_empty());
    }

    #[test]
    fn test_shape_gate_rejects_numbers_and_running_titles() {
        let mut blocks = vec![TextBlock::new(1, "Field Manual", 24.0, true, 72.0, 40.0)];
        blocks.push(TextBlock::new(1, "2024-03-01", 16.0, true, 72.0, 70.0));
        blocks.extend(body_lines(1, 5, 90.0));
        blocks.push(TextBlock::new(2, "FIELD MANUAL", 16.0, true, 72.0, 20.0));
        blocks.push(TextBlock::new(2, "Equipment", 16.0, true, 72.0, 60.0));
        blocks.extend(body_lines(2, 5, 80.0));
        let doc = doc(blocks);

        let registry = PatternRegistry::default();
        let result = HeadingClassifier::new(&registry, ClassifierOptions::default()).classify(&doc, "en");

        let headings: Vec<&str> = result.headings().map(|c| c.text.as_str()).collect();
        assert_eq!(headings, vec!["Equipment"]);
    }

    #[test]
    fn test_no_headings_is_not_an_error() {
        let doc = doc(body_lines(1, 8, 50.0));
        let registry = PatternRegistry::builtin().unwrap();
        let result = HeadingClassifier::new(&registry, ClassifierOptions::default()).classify(&doc, "en");

        assert!(result.title().is_none());
        assert_eq!(result.headings().count(), 0);
    }

    #[test]
    fn test_language_fallback_matches_default() {
        let mut blocks = vec![TextBlock::new(1, "Handbook", 24.0, true, 72.0, 40.0)];
        blocks.push(TextBlock::new(1, "1. Scope", 11.0, false, 72.0, 70.0));
        blocks.extend(body_lines(1, 5, 90.0));
        let doc = doc(blocks);

        let registry = PatternRegistry::builtin().unwrap();
        let classifier = HeadingClassifier::new(&registry, ClassifierOptions::default());
        let unknown = classifier.classify(&doc, "zz");
        let english = classifier.classify(&doc, "en");

        assert_eq!(unknown.language, "en");
        assert_eq!(levels(&unknown), levels(&english));
    }
}
