//! Cross-document section ranking.

use std::cmp::Ordering;
use std::collections::HashSet;

use rayon::prelude::*;

use super::embed::{cosine_similarity, Embedder};
use super::options::RankOptions;
use super::snippet::{char_prefix, refine_snippet, split_sentences};
use crate::error::{Error, Result};
use crate::model::{PersonaQuery, RankedSection, Section};

/// Best-matching sentences of one ranked section.
#[derive(Debug, Clone, PartialEq)]
pub struct Subsection<'a> {
    /// The ranked section the sentences come from
    pub section: &'a Section,
    /// Rank of that section
    pub rank: usize,
    /// Selected sentences, in reading order
    pub text: String,
}

/// Ranks sections from all documents of a run against one query.
pub struct Ranker<'e> {
    embedder: &'e dyn Embedder,
    options: RankOptions,
}

impl<'e> Ranker<'e> {
    /// Create a ranker.
    pub fn new(embedder: &'e dyn Embedder, options: RankOptions) -> Self {
        Self { embedder, options }
    }

    /// Ranking options in effect.
    pub fn options(&self) -> &RankOptions {
        &self.options
    }

    /// Rank `sections` by similarity to `query` and select the top K.
    ///
    /// Sections sharing a document and start boundary are scored once (first
    /// occurrence wins). Ties are broken by document order, then start page,
    /// then section index, so the order is total.
    pub fn rank<'s>(&self, query: &PersonaQuery, sections: &'s [Section]) -> Result<Vec<RankedSection<'s>>> {
        let query_text = query.text();
        if query_text.trim().is_empty() {
            return Err(Error::EmptyQuery);
        }
        let query_vec = self.embedder.embed(&query_text)?;

        let mut seen = HashSet::new();
        let unique: Vec<&Section> = sections.iter().filter(|s| seen.insert(s.key())).collect();
        if unique.len() < sections.len() {
            log::debug!("dropped {} duplicate sections", sections.len() - unique.len());
        }

        let scores: Vec<f32> = unique
            .par_iter()
            .map(|section| -> Result<f32> {
                let text = char_prefix(&section.text, self.options.max_embed_chars);
                let vector = self.embedder.embed(text)?;
                let score = cosine_similarity(&query_vec, &vector);
                Ok(if score.is_nan() { 0.0 } else { score })
            })
            .collect::<Result<Vec<f32>>>()?;

        let mut scored: Vec<(&Section, f32)> = unique.into_iter().zip(scores).collect();
        scored.sort_by(|(a, sa), (b, sb)| compare_scored(a, *sa, b, *sb));

        let ranked: Vec<RankedSection<'s>> = scored
            .into_iter()
            .take(self.options.top_k)
            .enumerate()
            .map(|(i, (section, score))| RankedSection {
                section,
                score,
                rank: i + 1,
                snippet: self.snippet(section),
            })
            .collect();

        log::info!(
            "ranked {} sections with {} embedder, selected {}",
            sections.len(),
            self.embedder.name(),
            ranked.len()
        );
        Ok(ranked)
    }

    /// For each ranked section, pick the sentences most similar to `query`.
    pub fn subsections<'s>(
        &self,
        query: &PersonaQuery,
        ranked: &[RankedSection<'s>],
    ) -> Result<Vec<Subsection<'s>>> {
        let count = self.options.subsection_sentences;
        if count == 0 || ranked.is_empty() {
            return Ok(Vec::new());
        }
        let query_vec = self.embedder.embed(&query.text())?;

        ranked
            .par_iter()
            .map(|entry| -> Result<Subsection<'s>> {
                let sentences = section_sentences(entry.section);
                let text = if sentences.len() <= count {
                    sentences.join(" ")
                } else {
                    let mut scored = Vec::with_capacity(sentences.len());
                    for (i, sentence) in sentences.iter().enumerate() {
                        let vector = self.embedder.embed(sentence)?;
                        scored.push((i, cosine_similarity(&query_vec, &vector)));
                    }
                    scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
                    let mut chosen: Vec<usize> = scored.into_iter().take(count).map(|(i, _)| i).collect();
                    chosen.sort_unstable();
                    chosen
                        .into_iter()
                        .map(|i| sentences[i].as_str())
                        .collect::<Vec<_>>()
                        .join(" ")
                };
                Ok(Subsection {
                    section: entry.section,
                    rank: entry.rank,
                    text,
                })
            })
            .collect()
    }

    fn snippet(&self, section: &Section) -> String {
        let body = section.body();
        let source = if body.trim().is_empty() { section.text.as_str() } else { body };
        refine_snippet(
            source,
            self.options.snippet_max_chars,
            self.options.snippet_max_sentences,
        )
    }
}

/// Body sentences of a section, falling back to the whole text for
/// heading-only sections.
fn section_sentences(section: &Section) -> Vec<String> {
    let sentences = split_sentences(section.body());
    if sentences.is_empty() {
        split_sentences(&section.text)
    } else {
        sentences
    }
}

/// Score descending, then document order, start page and section index.
fn compare_scored(a: &Section, score_a: f32, b: &Section, score_b: f32) -> Ordering {
    score_b
        .total_cmp(&score_a)
        .then(a.document_order.cmp(&b.document_order))
        .then(a.start_page.cmp(&b.start_page))
        .then(a.index.cmp(&b.index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{HeadingLevel, OutlineNode, SectionStart};
    use crate::rank::HashingEmbedder;

    fn section(document: &str, order: usize, index: usize, title: &str, body: &str) -> Section {
        let text = format!("{}\n{}\n", title, body);
        Section {
            document: document.to_string(),
            document_order: order,
            index,
            start: SectionStart::Heading(OutlineNode::new(HeadingLevel::H1, title, 1, index * 10)),
            title: title.to_string(),
            byte_range: 0..text.len(),
            text,
            start_page: 1,
            end_page: 1,
        }
    }

    fn query() -> PersonaQuery {
        PersonaQuery::new("Travel planner", "plan a beach trip").unwrap()
    }

    #[test]
    fn test_rank_ordering_and_dense_ranks() {
        let sections = vec![
            section("a.pdf", 0, 0, "Tax law", "Corporate tax filings and audits."),
            section("a.pdf", 0, 1, "Beaches", "The best beach for a trip is sunny."),
            section("b.pdf", 1, 0, "Trip planning", "Plan your trip with a beach itinerary."),
        ];
        let embedder = HashingEmbedder::default();
        let ranker = Ranker::new(&embedder, RankOptions::default());
        let ranked = ranker.rank(&query(), &sections).unwrap();

        assert_eq!(ranked.len(), 3);
        for (i, entry) in ranked.iter().enumerate() {
            assert_eq!(entry.rank, i + 1);
        }
        for pair in ranked.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        assert_eq!(ranked[2].section.title, "Tax law");
    }

    #[test]
    fn test_duplicates_are_dropped() {
        let first = section("a.pdf", 0, 0, "Beaches", "Beach trip guide.");
        let mut duplicate = first.clone();
        duplicate.text = "Beaches\nBeach trip guide, second copy.\n".to_string();
        let sections = vec![first, duplicate, section("a.pdf", 0, 1, "Other", "Unrelated.")];

        let embedder = HashingEmbedder::default();
        let ranked = Ranker::new(&embedder, RankOptions::default())
            .rank(&query(), &sections)
            .unwrap();

        assert_eq!(ranked.len(), 2);
        let beaches: Vec<_> = ranked.iter().filter(|r| r.section.title == "Beaches").collect();
        assert_eq!(beaches.len(), 1);
        assert!(beaches[0].section.text.ends_with("guide.\n"));
    }

    #[test]
    fn test_ties_follow_document_order() {
        let sections = vec![
            section("b.pdf", 1, 0, "Same", "identical words"),
            section("a.pdf", 0, 0, "Same", "identical words"),
        ];
        let embedder = HashingEmbedder::default();
        let ranked = Ranker::new(&embedder, RankOptions::default())
            .rank(&query(), &sections)
            .unwrap();
        assert_eq!(ranked[0].section.document, "a.pdf");
        assert_eq!(ranked[1].section.document, "b.pdf");
    }

    #[test]
    fn test_top_k_and_empty_query() {
        let sections: Vec<Section> = (0..8)
            .map(|i| section("a.pdf", 0, i, &format!("Part {}", i), "beach"))
            .collect();
        let embedder = HashingEmbedder::default();
        let ranker = Ranker::new(&embedder, RankOptions::default().with_top_k(3));
        assert_eq!(ranker.rank(&query(), &sections).unwrap().len(), 3);

        let blank = PersonaQuery {
            persona: " ".to_string(),
            job: String::new(),
        };
        assert!(matches!(ranker.rank(&blank, &sections), Err(Error::EmptyQuery)));
    }

    #[test]
    fn test_snippet_and_subsections() {
        let sections = vec![section(
            "a.pdf",
            0,
            0,
            "Coast",
            "Museums close early. The beach trip starts at dawn. Parking is limited.",
        )];
        let embedder = HashingEmbedder::default();
        let ranker = Ranker::new(&embedder, RankOptions::default().with_snippet_limits(500, 2));
        let ranked = ranker.rank(&query(), &sections).unwrap();
        assert_eq!(ranked[0].snippet, "Museums close early. The beach trip starts at dawn.");

        let subsections = ranker.subsections(&query(), &ranked).unwrap();
        assert_eq!(subsections.len(), 1);
        assert_eq!(subsections[0].text, "The beach trip starts at dawn.");
        assert_eq!(subsections[0].rank, 1);
    }
}
