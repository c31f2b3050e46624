//! Independent heading signal evaluators.
//!
//! Each evaluator inspects one block and reports an optional [`Signal`];
//! the classifier resolves them with a fixed precedence.

use super::options::ClassifierOptions;
use super::patterns::{first_match, HeadingPattern};
use super::stats::FontStatistics;
use crate::model::{HeadingLevel, Signal, SignalKind, TextBlock};

/// Everything an evaluator may look at for one block.
#[derive(Debug, Clone, Copy)]
pub struct BlockContext<'a> {
    /// Block under evaluation
    pub block: &'a TextBlock,
    /// Document font statistics
    pub stats: &'a FontStatistics,
    /// Active language patterns
    pub patterns: &'a [HeadingPattern],
    /// Classifier options
    pub options: &'a ClassifierOptions,
}

/// A source of heading evidence.
pub trait SignalEvaluator: Send + Sync {
    /// Kind of signal this evaluator produces.
    fn kind(&self) -> SignalKind;

    /// Evaluate one block.
    fn evaluate(&self, ctx: &BlockContext<'_>) -> Option<Signal>;
}

/// Matches the block text against the language's heading patterns.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternEvaluator;

impl SignalEvaluator for PatternEvaluator {
    fn kind(&self) -> SignalKind {
        SignalKind::Pattern
    }

    fn evaluate(&self, ctx: &BlockContext<'_>) -> Option<Signal> {
        first_match(ctx.patterns, &ctx.block.text).map(|level| Signal::new(self.kind(), Some(level), 0.9))
    }
}

/// Places the block's font size in a heading tier.
#[derive(Debug, Clone, Copy, Default)]
pub struct SizeTierEvaluator;

impl SignalEvaluator for SizeTierEvaluator {
    fn kind(&self) -> SignalKind {
        SignalKind::SizeTier
    }

    fn evaluate(&self, ctx: &BlockContext<'_>) -> Option<Signal> {
        let tier = ctx.stats.tier_of(ctx.block.font_size)?;
        let body = ctx.stats.body_size.max(1.0);
        let confidence = 0.5 + 0.5 * ((ctx.block.font_size - body) / body).min(1.0);
        Some(Signal::new(self.kind(), Some(HeadingLevel::from_tier(tier)), confidence))
    }
}

/// Reports bold (by majority for the block's size) or outdented blocks.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmphasisEvaluator;

impl SignalEvaluator for EmphasisEvaluator {
    fn kind(&self) -> SignalKind {
        SignalKind::Emphasis
    }

    fn evaluate(&self, ctx: &BlockContext<'_>) -> Option<Signal> {
        let block = ctx.block;
        let bold = ctx.stats.majority_bold(block.font_size, block.is_bold);
        let outdented = ctx
            .stats
            .body_indent(block.page)
            .is_some_and(|indent| block.x < indent - ctx.options.indent_tolerance);

        match (bold, outdented) {
            (true, true) => Some(Signal::new(self.kind(), None, 0.8)),
            (true, false) => Some(Signal::new(self.kind(), None, 0.6)),
            (false, true) => Some(Signal::new(self.kind(), None, 0.5)),
            (false, false) => None,
        }
    }
}

/// Evaluators in precedence order: pattern, size tier, emphasis.
pub fn default_evaluators() -> Vec<Box<dyn SignalEvaluator>> {
    vec![
        Box::new(PatternEvaluator),
        Box::new(SizeTierEvaluator),
        Box::new(EmphasisEvaluator),
    ]
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::classify::patterns::PatternRegistry;

    fn document() -> Vec<TextBlock> {
        let mut blocks = Vec::new();
        for i in 0..6 {
            blocks.push(TextBlock::new(1, "body text line", 11.0, false, 72.0, 100.0 + i as f32));
        }
        blocks.push(TextBlock::new(1, "Heading", 16.0, true, 72.0, 50.0));
        blocks.push(TextBlock::new(1, "Side Note", 11.0, false, 40.0, 300.0));
        blocks
    }

    fn evaluate(evaluator: &dyn SignalEvaluator, blocks: &[TextBlock], index: usize) -> Option<Signal> {
        let options = ClassifierOptions::default();
        let mut stats = FontStatistics::from_blocks(blocks);
        stats.compute_tiers(blocks, &BTreeSet::new(), &options);
        let registry = PatternRegistry::builtin().unwrap();
        let ctx = BlockContext {
            block: &blocks[index],
            stats: &stats,
            patterns: registry.patterns("en"),
            options: &options,
        };
        evaluator.evaluate(&ctx)
    }

    #[test]
    fn test_size_tier_signal() {
        let blocks = document();
        let signal = evaluate(&SizeTierEvaluator, &blocks, 6).unwrap();
        assert_eq!(signal.level, Some(HeadingLevel::H1));
        assert!(signal.confidence > 0.5);
        assert!(evaluate(&SizeTierEvaluator, &blocks, 0).is_none());
    }

    #[test]
    fn test_emphasis_signal() {
        let blocks = document();
        assert!(evaluate(&EmphasisEvaluator, &blocks, 6).is_some());
        // Outdented relative to body text
        assert!(evaluate(&EmphasisEvaluator, &blocks, 7).is_some());
        assert!(evaluate(&EmphasisEvaluator, &blocks, 0).is_none());
    }

    #[test]
    fn test_pattern_signal() {
        let mut blocks = document();
        blocks.push(TextBlock::new(1, "2.1 Data", 11.0, false, 72.0, 400.0));
        let signal = evaluate(&PatternEvaluator, &blocks, 8).unwrap();
        assert_eq!(signal.kind, SignalKind::Pattern);
        assert_eq!(signal.level, Some(HeadingLevel::H2));
        assert!(evaluate(&PatternEvaluator, &blocks, 0).is_none());
    }

    #[test]
    fn test_default_evaluator_order() {
        let kinds: Vec<SignalKind> = default_evaluators().iter().map(|e| e.kind()).collect();
        assert_eq!(kinds, vec![SignalKind::Pattern, SignalKind::SizeTier, SignalKind::Emphasis]);
    }
}
