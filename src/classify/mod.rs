//! Heading classification: font statistics, language patterns and signal fusion.

mod classifier;
mod options;
mod patterns;
mod signals;
mod stats;

pub use classifier::{Classification, HeadingClassifier};
pub use options::ClassifierOptions;
pub use patterns::{first_match, numbering_depth, HeadingPattern, PatternRegistry, DEFAULT_LANGUAGE};
pub use signals::{
    default_evaluators, BlockContext, EmphasisEvaluator, PatternEvaluator, SignalEvaluator,
    SizeTierEvaluator,
};
pub use stats::FontStatistics;
