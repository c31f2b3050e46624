//! # outliner
//!
//! PDF outline extraction and persona-driven section ranking.
//!
//! The library turns PDF documents into a heading outline (title plus
//! H1/H2/H3 entries with page numbers) and ranks the resulting document
//! sections against a persona + job-to-be-done query.
//!
//! ## Quick Start
//!
//! ```no_run
//! use outliner::{extract_outline_file, render};
//!
//! fn main() -> outliner::Result<()> {
//!     let outline = extract_outline_file("report.pdf", "en")?;
//!     println!("{}", render::outline_to_json(&outline, render::JsonFormat::Pretty)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Ranking
//!
//! ```no_run
//! use outliner::{HashingEmbedder, Pipeline, PipelineOptions, PersonaQuery, RankOptions, Ranker};
//!
//! fn main() -> outliner::Result<()> {
//!     let pipeline = Pipeline::with_builtin_patterns(PipelineOptions::default())?;
//!     let files = outliner::collect_pdfs("input")?;
//!     let batch = pipeline.process_batch(&files);
//!     let sections = batch.sections();
//!
//!     let query = PersonaQuery::new("Data Scientist", "summarize methodology")?;
//!     let embedder = HashingEmbedder::default();
//!     let ranker = Ranker::new(&embedder, RankOptions::default());
//!     for entry in ranker.rank(&query, &sections)? {
//!         println!("{} {} p.{}", entry.rank, entry.section.title, entry.section.start_page);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Layout extraction**: spans merged into lines with dominant size, weight and indentation
//! - **Multilingual patterns**: heading regexes per language, loaded from `languages.json`
//! - **Signal fusion**: pattern, size-tier and emphasis evaluators with fixed precedence
//! - **Section ranking**: pluggable embedders, deterministic global ordering
//! - **Parallel processing**: uses Rayon across documents

pub mod classify;
pub mod error;
pub mod model;
pub mod outline;
pub mod parser;
pub mod pipeline;
pub mod rank;
pub mod render;

// Re-export commonly used types
pub use classify::{ClassifierOptions, HeadingClassifier, PatternRegistry};
pub use error::{Error, Result};
pub use model::{
    BlockClass, HeadingLevel, LayoutDocument, Outline, OutlineNode, PersonaQuery, RankedSection,
    Section, TextBlock, TextSpan,
};
pub use parser::{ErrorMode, ExtractOptions, LayoutExtractor, LopdfDecoder, SpanSource};
pub use pipeline::{
    collect_pdfs, BatchOutcome, DocumentAnalysis, Pipeline, PipelineOptions, SkippedDocument,
};
pub use rank::{
    Embedder, HashingEmbedder, PersonaDescriptor, RankOptions, Ranker, WordVectorEmbedder,
};
pub use render::{JsonFormat, RankingReport};

use std::path::Path;

/// Extract the outline of a PDF file using the bundled language patterns.
///
/// # Example
///
/// ```no_run
/// let outline = outliner::extract_outline_file("document.pdf", "en").unwrap();
/// println!("{} ({} headings)", outline.title, outline.len());
/// ```
pub fn extract_outline_file<P: AsRef<Path>>(path: P, language: &str) -> Result<Outline> {
    let pipeline = Pipeline::with_builtin_patterns(PipelineOptions::new().with_language(language))?;
    Ok(pipeline.process_file(path, 0)?.outline)
}

/// Extract the outline of a PDF held in memory.
pub fn extract_outline_bytes(data: &[u8], language: &str) -> Result<Outline> {
    let pipeline = Pipeline::with_builtin_patterns(PipelineOptions::new().with_language(language))?;
    Ok(pipeline.process_bytes("document.pdf", data, 0)?.outline)
}

/// Extract an outline from pre-decoded spans.
pub fn extract_outline_spans(spans: Vec<TextSpan>, language: &str) -> Result<Outline> {
    let page_count = spans.iter().map(|s| s.page).max().unwrap_or(0);
    let pipeline = Pipeline::with_builtin_patterns(PipelineOptions::new().with_language(language))?;
    Ok(pipeline.process_spans("document", page_count, spans, 0).outline)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_outline_bytes_rejects_non_pdf() {
        let err = extract_outline_bytes(b"PK\x03\x04 zip archive", "en").unwrap_err();
        assert!(matches!(err, Error::DocumentUnreadable { .. }));
    }

    #[test]
    fn test_extract_outline_spans() {
        let mut spans = vec![TextSpan::new(1, "Handbook", 72.0, 40.0, 22.0, "Times-Bold")];
        spans.push(TextSpan::new(1, "1. Scope", 72.0, 80.0, 11.0, "Times-Roman"));
        for i in 0..4 {
            spans.push(TextSpan::new(
                1,
                "this handbook describes the process",
                72.0,
                100.0 + i as f32 * 14.0,
                11.0,
                "Times-Roman",
            ));
        }
        let outline = extract_outline_spans(spans, "fr").unwrap();
        assert_eq!(outline.title, "Handbook");
        assert_eq!(outline.outline[0].text, "1. Scope");
        assert_eq!(outline.outline[0].level, HeadingLevel::H1);
    }
}
